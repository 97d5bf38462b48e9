//! Record model for the user directory.
//!
//! Storage backends work with untyped [`user::Record`] maps; the directory
//! service converts them into [`user::User`] values with the fallible
//! conversions defined here.

pub mod errors;
pub mod user;

pub use errors::ModelError;
pub use user::{NewUser, Record, User, UserPatch};
