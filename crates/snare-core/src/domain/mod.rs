//! Domain model (captured values, outcomes, errors).

pub mod captured;
pub mod errors;
pub mod outcome;

pub(crate) use self::captured::Captured;
pub use self::captured::{OPAQUE_PAYLOAD, TypeKey, raise, render};
pub use self::errors::{BoxError, Error, ErrorKind};
pub use self::outcome::Outcome;
