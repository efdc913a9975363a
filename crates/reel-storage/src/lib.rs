//! Storage providers.
//!
//! This crate provides:
//! - The `StorageProvider` capability set {put, get, delete, label}
//! - A path-rooted local filesystem backend (`localfs`)
//! - A Google Drive backend (`gdrive`) whose put substitutes the key
//!   with the provider-assigned file id
//! - An environment-keyed factory
//!
//! Callers must persist the effective key returned by `put`; remote
//! backends rewrite it, the local one does not.

pub mod error;
pub mod gdrive;
pub mod localfs;
pub mod provider;

pub use error::{StorageError, StorageResult};
pub use gdrive::{GdriveConfig, GdriveProvider};
pub use localfs::LocalFsProvider;
pub use provider::{
    provider_from_env, ObjectReader, ObjectStream, PutResult, StorageProvider, LOCALFS_LABEL,
};
