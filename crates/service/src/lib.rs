//! Service layer for the user directory.
//! - `storage` holds the whole-document collection stores (keyed KV and local file).
//! - `directory` converts raw records into `models::User` and checks bearer tokens.
//! - `seed` writes the initial document into a backend.

pub mod errors;
pub mod storage;
pub mod directory;
pub mod seed;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use directory::DirectoryService;
pub use errors::ServiceError;
