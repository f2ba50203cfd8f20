//! Schema definition and document validation.

mod builder;
mod node;

use crate::error::Result;
use crate::value::Map;

pub use builder::{
    ArrayBuilder, BooleanBuilder, Composite, FloatBuilder, IntegerBuilder, NodeParent,
    ObjectBuilder, SchemaBuilder, StringBuilder,
};
pub use node::{ArrayNode, BooleanNode, FloatNode, IntegerNode, ObjectNode, SchemaNode, StringNode};

/// The root of a schema tree: an ordered set of named top-level nodes.
///
/// Built once through [`Schema::builder`] and immutable afterwards, so it can
/// be shared between any number of [`Config`](crate::Config) documents.
///
/// ## Example
///
/// ```
/// use conftree::schema::{Composite, Schema};
///
/// let schema = Schema::builder()
///     .object_node("server")
///     .string_node("host")
///     .default_value("localhost")
///     .end()
///     .integer_node("port")
///     .min_value(1)
///     .max_value(65535)
///     .end()
///     .end()
///     .array_node("tags")
///     .string_items()
///     .min_length(1)
///     .end()
///     .end()
///     .build()?;
///
/// let defaults = schema.defaults()?;
/// assert_eq!(defaults["server"].get("host").and_then(|v| v.as_str()), Some("localhost"));
/// # Ok::<(), conftree::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    children: Vec<(String, SchemaNode)>,
}

impl Schema {
    /// Starts building a new schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub(crate) fn from_children(children: Vec<(String, SchemaNode)>) -> Self {
        Self { children }
    }

    /// Validates a whole document and returns its normalized form.
    ///
    /// Fields unknown to the schema are discarded and absent fields receive
    /// their defaults. Fails on the first violated constraint.
    pub fn validate(&self, input: &Map) -> Result<Map> {
        tracing::trace!(fields = input.len(), "validating document");
        node::validate_children(&self.children, None, Some(input))
    }

    /// Materializes the document obtained by validating an empty input.
    pub fn defaults(&self) -> Result<Map> {
        self.validate(&Map::new())
    }

    /// Top-level node declared under `name`, if any.
    pub fn node(&self, name: &str) -> Option<&SchemaNode> {
        self.children
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }
}
