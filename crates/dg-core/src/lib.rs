pub mod error;
pub mod types;
pub mod value;

pub use error::{DialogicError, ErrorKind};
pub use types::*;
pub use value::*;
