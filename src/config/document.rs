use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::path::lookup;
use crate::error::{Error, Result};
use crate::merge::merge_maps;
use crate::schema::Schema;
use crate::value::{Map, Value};

const INVALID_FORMAT: &str = "Invalid JSON format.";
const PARSE_FAILED: &str = "An error occurred during configuration JSON parsing.";
const NOT_SERIALIZABLE: &str = "Configuration data cannot be serialized.";

/// Output layout used by [`Config::serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// No insignificant whitespace.
    #[default]
    Compact,
    /// Indented, one entry per line.
    Pretty,
}

/// Input accepted by [`Config::set_data`] and [`Config::change_data`]:
/// an already parsed value or JSON text.
#[derive(Debug, Clone)]
pub enum RawData<'a> {
    Value(Value),
    Json(&'a str),
}

impl From<Value> for RawData<'_> {
    fn from(value: Value) -> Self {
        RawData::Value(value)
    }
}

impl From<Map> for RawData<'_> {
    fn from(map: Map) -> Self {
        RawData::Value(Value::Map(map))
    }
}

impl<'a> From<&'a str> for RawData<'a> {
    fn from(text: &'a str) -> Self {
        RawData::Json(text)
    }
}

impl<'a> From<&'a String> for RawData<'a> {
    fn from(text: &'a String) -> Self {
        RawData::Json(text)
    }
}

/// A configuration document bound to a [`Schema`].
///
/// Every write replaces the whole document, and a failed write leaves the
/// previous document in place.
///
/// ## Example
///
/// ```
/// use conftree::schema::{Composite, Schema};
/// use conftree::{Config, Value};
///
/// let schema = Schema::builder()
///     .integer_node("port")
///     .default_value(8080)
///     .end()
///     .array_node("hosts")
///     .string_items()
///     .end()
///     .end()
///     .build()?;
///
/// let mut config = Config::with_schema(schema);
/// config.set_data(r#"{"hosts": ["a", "b"]}"#, true)?;
/// config.change_data(r#"{"hosts": {"1": null}, "port": 9000}"#, true)?;
///
/// assert_eq!(config.get_param("port", 0), Value::Int(9000));
/// assert_eq!(config.serialize()?, r#"{"hosts":["a"],"port":9000}"#);
/// # Ok::<(), conftree::Error>(())
/// ```
///
/// A `Config` has no internal locking; wrap it in a lock to share it between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Config {
    data: Option<Map>,
    schema: Option<Arc<Schema>>,
    format: Format,
}

impl Config {
    /// Creates a document with no schema and no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document validated against `schema`.
    pub fn with_schema(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::default()
        }
    }

    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Map> {
        self.data.as_ref()
    }

    /// Replaces the document.
    ///
    /// With `validate`, the input is normalized through the schema first and
    /// fails with [`Error::NoSchema`] if none is attached. Otherwise it is
    /// stored as given.
    pub fn set_data<'a>(
        &mut self,
        raw: impl Into<RawData<'a>>,
        validate: bool,
    ) -> Result<&mut Self> {
        tracing::debug!(validate, "setting configuration data");
        let prepared = prepare(raw.into())?;
        self.data = Some(self.validate(prepared, validate)?);
        Ok(self)
    }

    /// Applies a merge patch to the current document.
    ///
    /// `null` entries in the patch delete; see [`deep_merge`](crate::deep_merge).
    /// Fails with [`Error::NoConfig`] when no document has been set yet.
    pub fn change_data<'a>(
        &mut self,
        patch: impl Into<RawData<'a>>,
        validate: bool,
    ) -> Result<&mut Self> {
        let current = self.data.as_ref().ok_or(Error::NoConfig)?;
        tracing::debug!(validate, "patching configuration data");
        let patch = prepare(patch.into())?;
        let merged = merge_maps(current.clone(), patch);
        self.data = Some(self.validate(merged, validate)?);
        Ok(self)
    }

    /// Value stored at a dotted path, e.g. `server.hosts.0`.
    pub fn param(&self, path: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| lookup(data, path))
    }

    /// Value stored at a dotted path, or `default` when there is none.
    pub fn get_param(&self, path: &str, default: impl Into<Value>) -> Value {
        match self.param(path) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    /// The document the schema produces for an empty input.
    pub fn get_defaults(&self) -> Result<Map> {
        self.schema.as_ref().ok_or(Error::NoSchema)?.defaults()
    }

    /// Renders the current document, or the defaults if none is set, as JSON.
    pub fn serialize(&self) -> Result<String> {
        let data = match &self.data {
            Some(data) => Cow::Borrowed(data),
            None => Cow::Owned(self.get_defaults()?),
        };
        let rendered = match self.format {
            Format::Compact => serde_json::to_string(&*data),
            Format::Pretty => serde_json::to_string_pretty(&*data),
        };
        rendered.map_err(|e| Error::invalid_json(NOT_SERIALIZABLE, Some(e)))
    }

    fn validate(&self, data: Map, validate: bool) -> Result<Map> {
        if !validate {
            return Ok(data);
        }
        self.schema.as_ref().ok_or(Error::NoSchema)?.validate(&data)
    }
}

/// Turns raw input into an object-shaped document.
fn prepare(raw: RawData<'_>) -> Result<Map> {
    match raw {
        RawData::Value(Value::Map(map)) => Ok(map),
        RawData::Value(_) => Err(Error::invalid_json(INVALID_FORMAT, None)),
        RawData::Json(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Map(map)) => Ok(map),
            Ok(_) => Err(Error::invalid_json(PARSE_FAILED, None)),
            Err(e) => Err(Error::invalid_json(PARSE_FAILED, Some(e))),
        },
    }
}
