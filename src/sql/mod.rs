//! MySQL statement builder: identifiers quoted, values as positional parameters.

mod builder;
pub use builder::*;
