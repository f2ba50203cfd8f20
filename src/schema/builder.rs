//! Fluent, depth-first schema construction.
//!
//! Each node builder owns the builder it was opened from. `end()` attaches
//! the finished node to that parent and hands the parent back, so the
//! construction stack lives in the builder types and the finished [`Schema`]
//! carries no back references.
//!
//! Construction errors are collected at the root and reported once by
//! [`SchemaBuilder::build`]. The first error wins.

use regex::Regex;

use super::node::{
    dedup, insert_child, ArrayNode, BooleanNode, FloatNode, IntegerNode, ObjectNode, SchemaNode,
    StringNode,
};
use super::Schema;
use crate::error::{Error, Result};
use crate::value::Value;

/// A builder that finished nodes can be attached to.
pub trait NodeParent: Sized {
    /// Attaches a finished child node.
    fn attach(&mut self, name: String, node: SchemaNode);

    /// Records a construction error, to be reported by the root builder.
    fn fail(&mut self, error: Error);
}

/// Builders that register named children: the schema root and object nodes.
pub trait Composite: NodeParent {
    fn string_node(self, name: impl Into<String>) -> StringBuilder<Self> {
        StringBuilder::new(self, name.into())
    }

    fn integer_node(self, name: impl Into<String>) -> IntegerBuilder<Self> {
        IntegerBuilder::new(self, name.into())
    }

    fn float_node(self, name: impl Into<String>) -> FloatBuilder<Self> {
        FloatBuilder::new(self, name.into())
    }

    fn boolean_node(self, name: impl Into<String>) -> BooleanBuilder<Self> {
        BooleanBuilder::new(self, name.into())
    }

    fn array_node(self, name: impl Into<String>) -> ArrayBuilder<Self> {
        ArrayBuilder::new(self, name.into())
    }

    fn object_node(self, name: impl Into<String>) -> ObjectBuilder<Self> {
        ObjectBuilder::new(self, name.into())
    }
}

/// Root builder returned by [`Schema::builder`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct SchemaBuilder {
    children: Vec<(String, SchemaNode)>,
    error: Option<Error>,
}

impl SchemaBuilder {
    /// Finishes construction.
    ///
    /// Returns the first error recorded while building, such as a duplicate
    /// node name or an array without an item schema.
    pub fn build(self) -> Result<Schema> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(Schema::from_children(self.children)),
        }
    }
}

impl NodeParent for SchemaBuilder {
    fn attach(&mut self, name: String, node: SchemaNode) {
        if let Err(error) = insert_child(&mut self.children, name, node) {
            self.fail(error);
        }
    }

    fn fail(&mut self, error: Error) {
        self.error.get_or_insert(error);
    }
}

impl Composite for SchemaBuilder {}

/// Builder for an object node, opened with [`Composite::object_node`] or
/// [`ArrayBuilder::object_items`].
#[derive(Debug)]
#[must_use = "call .end() to attach the node to its parent"]
pub struct ObjectBuilder<P> {
    parent: P,
    name: String,
    node: ObjectNode,
}

impl<P: NodeParent> ObjectBuilder<P> {
    fn new(parent: P, name: String) -> Self {
        Self {
            parent,
            name,
            node: ObjectNode::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.node.required = true;
        self
    }

    pub fn end(mut self) -> P {
        self.parent.attach(self.name, SchemaNode::Object(self.node));
        self.parent
    }
}

impl<P: NodeParent> NodeParent for ObjectBuilder<P> {
    fn attach(&mut self, name: String, node: SchemaNode) {
        if let Err(error) = insert_child(&mut self.node.children, name, node) {
            self.fail(error);
        }
    }

    fn fail(&mut self, error: Error) {
        self.parent.fail(error);
    }
}

impl<P: NodeParent> Composite for ObjectBuilder<P> {}

/// Builder for an array node. Exactly one item schema is declared with one of
/// the `*_items` methods; declaring another replaces it.
#[derive(Debug)]
#[must_use = "call .end() to attach the node to its parent"]
pub struct ArrayBuilder<P> {
    parent: P,
    name: String,
    required: bool,
    default: Option<Vec<Value>>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    items: Option<SchemaNode>,
}

impl<P: NodeParent> ArrayBuilder<P> {
    fn new(parent: P, name: String) -> Self {
        Self {
            parent,
            name,
            required: false,
            default: None,
            min_length: None,
            max_length: None,
            items: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// List returned when the array is absent from the input.
    pub fn default_value<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.default = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn string_items(self) -> StringBuilder<Self> {
        StringBuilder::new(self, String::new())
    }

    pub fn integer_items(self) -> IntegerBuilder<Self> {
        IntegerBuilder::new(self, String::new())
    }

    pub fn float_items(self) -> FloatBuilder<Self> {
        FloatBuilder::new(self, String::new())
    }

    pub fn boolean_items(self) -> BooleanBuilder<Self> {
        BooleanBuilder::new(self, String::new())
    }

    pub fn array_items(self) -> ArrayBuilder<Self> {
        ArrayBuilder::new(self, String::new())
    }

    pub fn object_items(self) -> ObjectBuilder<Self> {
        ObjectBuilder::new(self, String::new())
    }

    pub fn end(mut self) -> P {
        match self.items {
            Some(items) => {
                let node = ArrayNode {
                    required: self.required,
                    default: self.default,
                    min_length: self.min_length,
                    max_length: self.max_length,
                    items: Box::new(items),
                };
                self.parent.attach(self.name, SchemaNode::Array(node));
            }
            None => self.parent.fail(Error::InvalidSchema(
                "Array items have to be defined.".to_string(),
            )),
        }
        self.parent
    }
}

impl<P: NodeParent> NodeParent for ArrayBuilder<P> {
    fn attach(&mut self, _name: String, node: SchemaNode) {
        self.items = Some(node);
    }

    fn fail(&mut self, error: Error) {
        self.parent.fail(error);
    }
}

/// Builder for a string leaf.
#[derive(Debug)]
#[must_use = "call .end() to attach the node to its parent"]
pub struct StringBuilder<P> {
    parent: P,
    name: String,
    node: StringNode,
}

impl<P: NodeParent> StringBuilder<P> {
    fn new(parent: P, name: String) -> Self {
        Self {
            parent,
            name,
            node: StringNode::default(),
        }
    }

    /// Rejects absent values and empty strings.
    pub fn required(mut self) -> Self {
        self.node.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.node.default = Some(value.into());
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node.allowed = Some(dedup(values.into_iter().map(Into::into)));
        self
    }

    /// Minimum length in characters.
    pub fn min_length(mut self, min: usize) -> Self {
        self.node.min_length = Some(min);
        self
    }

    /// Maximum length in characters.
    pub fn max_length(mut self, max: usize) -> Self {
        self.node.max_length = Some(max);
        self
    }

    /// Regular expression the value must contain a match for.
    pub fn pattern(mut self, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => self.node.pattern = Some(regex),
            Err(e) => self
                .parent
                .fail(Error::InvalidSchema(format!("Invalid pattern {pattern}: {e}"))),
        }
        self
    }

    pub fn end(mut self) -> P {
        self.parent.attach(self.name, SchemaNode::String(self.node));
        self.parent
    }
}

/// Builder for an integer leaf.
#[derive(Debug)]
#[must_use = "call .end() to attach the node to its parent"]
pub struct IntegerBuilder<P> {
    parent: P,
    name: String,
    node: IntegerNode,
}

impl<P: NodeParent> IntegerBuilder<P> {
    fn new(parent: P, name: String) -> Self {
        Self {
            parent,
            name,
            node: IntegerNode::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.node.required = true;
        self
    }

    pub fn default_value(mut self, value: i64) -> Self {
        self.node.default = Some(value);
        self
    }

    pub fn allowed_values(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.node.allowed = Some(dedup(values));
        self
    }

    pub fn min_value(mut self, min: i64) -> Self {
        self.node.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: i64) -> Self {
        self.node.max_value = Some(max);
        self
    }

    pub fn end(mut self) -> P {
        self.parent.attach(self.name, SchemaNode::Integer(self.node));
        self.parent
    }
}

/// Builder for a float leaf.
#[derive(Debug)]
#[must_use = "call .end() to attach the node to its parent"]
pub struct FloatBuilder<P> {
    parent: P,
    name: String,
    node: FloatNode,
}

impl<P: NodeParent> FloatBuilder<P> {
    fn new(parent: P, name: String) -> Self {
        Self {
            parent,
            name,
            node: FloatNode::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.node.required = true;
        self
    }

    pub fn default_value(mut self, value: f64) -> Self {
        self.node.default = Some(value);
        self
    }

    pub fn allowed_values(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.node.allowed = Some(dedup(values));
        self
    }

    pub fn min_value(mut self, min: f64) -> Self {
        self.node.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: f64) -> Self {
        self.node.max_value = Some(max);
        self
    }

    pub fn end(mut self) -> P {
        self.parent.attach(self.name, SchemaNode::Float(self.node));
        self.parent
    }
}

/// Builder for a boolean leaf.
#[derive(Debug)]
#[must_use = "call .end() to attach the node to its parent"]
pub struct BooleanBuilder<P> {
    parent: P,
    name: String,
    node: BooleanNode,
}

impl<P: NodeParent> BooleanBuilder<P> {
    fn new(parent: P, name: String) -> Self {
        Self {
            parent,
            name,
            node: BooleanNode::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.node.required = true;
        self
    }

    pub fn default_value(mut self, value: bool) -> Self {
        self.node.default = Some(value);
        self
    }

    pub fn allowed_values(mut self, values: impl IntoIterator<Item = bool>) -> Self {
        self.node.allowed = Some(dedup(values));
        self
    }

    pub fn end(mut self) -> P {
        self.parent.attach(self.name, SchemaNode::Boolean(self.node));
        self.parent
    }
}
