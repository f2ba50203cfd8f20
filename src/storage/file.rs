//! File-backed document storage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Storage;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::Value;

/// Stores a configuration document as a JSON file.
///
/// A missing file is treated as an empty document when `create_if_not_exists`
/// is set; otherwise it is an error like any other read failure.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    create_if_not_exists: bool,
    schema: Option<Arc<Schema>>,
}

impl FileStorage {
    /// Creates a file storage. Fails if `path` is empty.
    pub fn new(path: impl AsRef<Path>, create_if_not_exists: bool) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidResource {
                reason: "File path is not defined.".to_string(),
                source: None,
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            create_if_not_exists,
            schema: None,
        })
    }

    /// Attaches the schema given to every loaded document.
    pub fn with_schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn load(&self, validate: bool) -> Result<Config> {
        let mut config = match &self.schema {
            Some(schema) => Config::with_schema(Arc::clone(schema)),
            None => Config::new(),
        };

        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                tracing::debug!(path = %self.path.display(), "loading configuration file");
                config.set_data(&contents, validate)?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && self.create_if_not_exists => {
                tracing::debug!(
                    path = %self.path.display(),
                    "configuration file missing, starting empty"
                );
                config.set_data(Value::empty_map(), validate)?;
            }
            Err(e) => {
                return Err(Error::InvalidResource {
                    reason: format!("Content from file {} isn't readable.", self.path.display()),
                    source: Some(e),
                });
            }
        }

        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        let contents = config.serialize()?;
        tracing::debug!(
            path = %self.path.display(),
            bytes = contents.len(),
            "saving configuration file"
        );
        std::fs::write(&self.path, contents).map_err(|e| Error::InvalidResource {
            reason: format!("An error occurred during writing to file {}.", self.path.display()),
            source: Some(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Composite;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn schema() -> Schema {
        Schema::builder()
            .string_node("name")
            .default_value("app")
            .end()
            .integer_node("port")
            .default_value(8080)
            .end()
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let result = FileStorage::new("", true);
        assert!(matches!(result, Err(Error::InvalidResource { source: None, .. })));
    }

    #[test]
    fn test_loads_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "svc", "unknown": true}}"#).unwrap();

        let storage = FileStorage::new(file.path(), false).unwrap().with_schema(schema());
        let config = storage.load(true).unwrap();

        assert_eq!(config.get_param("name", ""), Value::from("svc"));
        assert_eq!(config.get_param("port", 0), Value::Int(8080));
        assert_eq!(config.param("unknown"), None);
    }

    #[test]
    fn test_loads_without_validation() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"unknown": true}}"#).unwrap();

        let storage = FileStorage::new(file.path(), false).unwrap();
        let config = storage.load(false).unwrap();

        assert_eq!(config.param("unknown"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_missing_file_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("config.json"), true)
            .unwrap()
            .with_schema(schema());
        let config = storage.load(true).unwrap();

        assert_eq!(config.get_param("name", ""), Value::from("app"));
    }

    #[test]
    fn test_missing_file_without_creation() {
        let storage = FileStorage::new("/nonexistent/path/config.json", false).unwrap();
        let result = storage.load(true);

        assert!(matches!(result, Err(Error::InvalidResource { source: Some(_), .. })));
    }

    #[test]
    fn test_invalid_file_contents() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let storage = FileStorage::new(file.path(), true).unwrap().with_schema(schema());
        assert!(matches!(storage.load(true), Err(Error::InvalidJson { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let storage = FileStorage::new(&path, true).unwrap().with_schema(schema());

        let mut config = storage.load(true).unwrap();
        config.change_data(r#"{"port": 9090}"#, true).unwrap();
        storage.save(&config).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"name":"app","port":9090}"#
        );
        let reloaded = storage.load(true).unwrap();
        assert_eq!(reloaded.data(), config.data());
    }

    #[test]
    fn test_save_to_unwritable_location() {
        let storage = FileStorage::new("/nonexistent/dir/config.json", false)
            .unwrap()
            .with_schema(schema());
        let config = Config::with_schema(schema());

        assert!(matches!(
            storage.save(&config),
            Err(Error::InvalidResource { source: Some(_), .. })
        ));
    }
}
