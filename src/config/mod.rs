//! Runtime settings and declarative entity schemas.

pub mod settings;
pub mod types;
pub mod validator;

pub use settings::*;
pub use types::*;
pub use validator::*;
