//! Property descriptors, type tags and typed accessors.

mod descriptor;
mod field;
mod types;

pub use descriptor::{ComputeFn, PropertyDescriptor};
pub use field::{Field, PropertyKind};
pub use types::*;
