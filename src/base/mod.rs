//! Base types and error handling.
//!
//! Provides the foundational pieces shared by every other module:
//! - [`StoreError`](error::StoreError): the crate-wide error taxonomy

pub mod error;

pub use error::StoreError;
