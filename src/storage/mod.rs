//! Persistence of configuration documents.

mod file;

pub use file::FileStorage;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::value::Value;

/// A backing store a [`Config`] is loaded from and saved to.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Reads the stored document, validating it against the storage's
    /// schema when `validate` is set.
    fn load(&self, validate: bool) -> Result<Config>;

    /// Writes the serialized form of `config`.
    fn save(&self, config: &Config) -> Result<()>;
}

/// Creates storages by kind name from loosely typed options.
#[derive(Debug, Default, Clone, Copy)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a storage of the given kind.
    ///
    /// The only kind is `"file"`, which reads `path` (a string) and
    /// `createIfNotExists` (a boolean, `true` unless given) from `options`.
    /// Options of the wrong type count as not given.
    pub fn create(&self, kind: &str, options: &Value) -> Result<Box<dyn Storage>> {
        match kind {
            "file" => {
                let path = options.get("path").and_then(Value::as_str).unwrap_or_default();
                let create_if_not_exists = options
                    .get("createIfNotExists")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                Ok(Box::new(FileStorage::new(path, create_if_not_exists)?))
            }
            _ => Err(Error::InvalidStorage(format!(
                "Storage type {kind} doesn't exist."
            ))),
        }
    }
}
