//! Schema node variants and their validation rules.
//!
//! Every node maps an optional input value at some path to an optional
//! output value. Leaves never transform a present value; they only substitute
//! their default when the input is absent. Composites rebuild their output
//! from the declared children, which drops fields the schema does not know.

use std::borrow::Cow;

use regex::Regex;

use crate::error::{Error, Result};
use crate::value::{Map, Value};

/// A typed constraint-and-default descriptor for one position in a document.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String(StringNode),
    Integer(IntegerNode),
    Float(FloatNode),
    Boolean(BooleanNode),
    Array(ArrayNode),
    Object(ObjectNode),
}

impl SchemaNode {
    /// Validates `input` found at `path`.
    ///
    /// `None` and `Some(Value::Null)` both mean the value is absent. Returns
    /// `Ok(None)` when the value is absent and the node has no default.
    pub fn validate(&self, path: &str, input: Option<&Value>) -> Result<Option<Value>> {
        let input = input.filter(|v| !v.is_null());
        match self {
            SchemaNode::String(node) => node.validate(path, input),
            SchemaNode::Integer(node) => node.validate(path, input),
            SchemaNode::Float(node) => node.validate(path, input),
            SchemaNode::Boolean(node) => node.validate(path, input),
            SchemaNode::Array(node) => node.validate(path, input),
            SchemaNode::Object(node) => node.validate(path, input).map(|map| Some(Value::Map(map))),
        }
    }
}

fn required_error(path: &str) -> Error {
    Error::invalid_data(path, "Value is required.")
}

fn one_of_error(path: &str, allowed: impl IntoIterator<Item = String>) -> Error {
    let listed: Vec<String> = allowed.into_iter().collect();
    Error::invalid_data(
        path,
        format!("Value should be one of \"{}\".", listed.join("\", \"")),
    )
}

fn render_float(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

pub(crate) fn dedup<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[derive(Debug, Clone, Default)]
pub struct StringNode {
    pub(crate) required: bool,
    pub(crate) default: Option<String>,
    pub(crate) allowed: Option<Vec<String>>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<Regex>,
}

impl StringNode {
    fn validate(&self, path: &str, input: Option<&Value>) -> Result<Option<Value>> {
        let input = match input {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(Error::invalid_data(path, "Value is not a string.")),
        };
        // An empty string does not satisfy `required`.
        if self.required && input.map_or(true, |s| s.is_empty()) {
            return Err(required_error(path));
        }
        let Some(s) = input else {
            return Ok(self.default.clone().map(Value::String));
        };

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(s) {
                return Err(one_of_error(path, allowed.iter().cloned()));
            }
        }
        let length = s.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(Error::invalid_data(
                    path,
                    format!("Value length is shorter than {min}."),
                ));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(Error::invalid_data(
                    path,
                    format!("Value length is longer than {max}."),
                ));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                return Err(Error::invalid_data(
                    path,
                    format!("Value doesn't match pattern {}.", pattern.as_str()),
                ));
            }
        }

        Ok(Some(Value::String(s.clone())))
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntegerNode {
    pub(crate) required: bool,
    pub(crate) default: Option<i64>,
    pub(crate) allowed: Option<Vec<i64>>,
    pub(crate) min_value: Option<i64>,
    pub(crate) max_value: Option<i64>,
}

impl IntegerNode {
    fn validate(&self, path: &str, input: Option<&Value>) -> Result<Option<Value>> {
        let input = match input {
            None => None,
            Some(Value::Int(i)) => Some(*i),
            Some(_) => return Err(Error::invalid_data(path, "Value is not an integer.")),
        };
        if self.required && input.is_none() {
            return Err(required_error(path));
        }
        let Some(i) = input else {
            return Ok(self.default.map(Value::Int));
        };

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&i) {
                return Err(one_of_error(path, allowed.iter().map(i64::to_string)));
            }
        }
        if let Some(min) = self.min_value {
            if i < min {
                return Err(Error::invalid_data(path, format!("Value is lower than {min}.")));
            }
        }
        if let Some(max) = self.max_value {
            if i > max {
                return Err(Error::invalid_data(path, format!("Value is greater than {max}.")));
            }
        }

        Ok(Some(Value::Int(i)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatNode {
    pub(crate) required: bool,
    pub(crate) default: Option<f64>,
    pub(crate) allowed: Option<Vec<f64>>,
    pub(crate) min_value: Option<f64>,
    pub(crate) max_value: Option<f64>,
}

impl FloatNode {
    fn validate(&self, path: &str, input: Option<&Value>) -> Result<Option<Value>> {
        let input = match input {
            None => None,
            Some(Value::Float(f)) => Some(*f),
            Some(_) => return Err(Error::invalid_data(path, "Value is not a float.")),
        };
        if self.required && input.is_none() {
            return Err(required_error(path));
        }
        let Some(f) = input else {
            return Ok(self.default.map(Value::Float));
        };

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&f) {
                return Err(one_of_error(path, allowed.iter().copied().map(render_float)));
            }
        }
        if let Some(min) = self.min_value {
            if f < min {
                return Err(Error::invalid_data(path, format!("Value is lower than {min:.6}.")));
            }
        }
        if let Some(max) = self.max_value {
            if f > max {
                return Err(Error::invalid_data(
                    path,
                    format!("Value is greater than {max:.6}."),
                ));
            }
        }

        Ok(Some(Value::Float(f)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BooleanNode {
    pub(crate) required: bool,
    pub(crate) default: Option<bool>,
    pub(crate) allowed: Option<Vec<bool>>,
}

impl BooleanNode {
    fn validate(&self, path: &str, input: Option<&Value>) -> Result<Option<Value>> {
        let input = match input {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => return Err(Error::invalid_data(path, "Value is not a boolean.")),
        };
        if self.required && input.is_none() {
            return Err(required_error(path));
        }
        let Some(b) = input else {
            return Ok(self.default.map(Value::Bool));
        };

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&b) {
                return Err(one_of_error(path, allowed.iter().map(bool::to_string)));
            }
        }

        Ok(Some(Value::Bool(b)))
    }
}

/// A list whose elements all share one anonymous item schema.
#[derive(Debug, Clone)]
pub struct ArrayNode {
    pub(crate) required: bool,
    pub(crate) default: Option<Vec<Value>>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) items: Box<SchemaNode>,
}

impl ArrayNode {
    fn validate(&self, path: &str, input: Option<&Value>) -> Result<Option<Value>> {
        let not_array = || Error::invalid_data(path, "Value is not an array.");
        let items: Option<Cow<'_, [Value]>> = match input {
            None => None,
            Some(Value::List(items)) => Some(Cow::Borrowed(items.as_slice())),
            Some(Value::Map(map)) => Some(Cow::Owned(index_keyed(map).ok_or_else(not_array)?)),
            Some(_) => return Err(not_array()),
        };
        if self.required && items.is_none() {
            return Err(required_error(path));
        }
        let Some(items) = items else {
            return Ok(self.default.clone().map(Value::List));
        };

        if let Some(min) = self.min_length {
            if items.len() < min {
                return Err(Error::invalid_data(
                    path,
                    format!("Array length is shorter than {min}."),
                ));
            }
        }
        if let Some(max) = self.max_length {
            if items.len() > max {
                return Err(Error::invalid_data(
                    path,
                    format!("Array length is longer than {max}."),
                ));
            }
        }

        let mut validated = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            validated.push(self.items.validate(&item_path, Some(item))?.unwrap_or(Value::Null));
        }
        Ok(Some(Value::List(validated)))
    }
}

/// Converts a map whose keys are all list indices into a dense list ordered
/// by index. Returns `None` if any key is not an index.
fn index_keyed(map: &Map) -> Option<Vec<Value>> {
    let mut indexed = map
        .iter()
        .map(|(key, value)| key.parse::<usize>().ok().map(|i| (i, value)))
        .collect::<Option<Vec<_>>>()?;
    indexed.sort_by_key(|(i, _)| *i);
    Some(indexed.into_iter().map(|(_, value)| value.clone()).collect())
}

/// A map with a fixed, ordered set of named children.
#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    pub(crate) required: bool,
    pub(crate) children: Vec<(String, SchemaNode)>,
}

impl ObjectNode {
    /// Always produces a map, even when the input is absent.
    fn validate(&self, path: &str, input: Option<&Value>) -> Result<Map> {
        let input = match input {
            None => None,
            Some(Value::Map(map)) => Some(map),
            Some(_) => return Err(Error::invalid_data(path, "Value is not an object.")),
        };
        if self.required && input.is_none() {
            return Err(required_error(path));
        }
        validate_children(&self.children, Some(path), input)
    }
}

/// Validates every declared child in declaration order. Absent results are
/// left out of the output map rather than stored as `Null`.
pub(crate) fn validate_children(
    children: &[(String, SchemaNode)],
    prefix: Option<&str>,
    input: Option<&Map>,
) -> Result<Map> {
    let mut output = Map::new();
    for (name, child) in children {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };
        let child_input = input.and_then(|map| map.get(name));
        if let Some(value) = child.validate(&path, child_input)? {
            output.insert(name.clone(), value);
        }
    }
    Ok(output)
}

/// Registers `node` under `name`, refusing names already taken.
pub(crate) fn insert_child(
    children: &mut Vec<(String, SchemaNode)>,
    name: String,
    node: SchemaNode,
) -> Result<()> {
    if children.iter().any(|(existing, _)| *existing == name) {
        return Err(Error::NodeDuplication(name));
    }
    children.push((name, node));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    fn message(result: Result<Option<Value>>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_string_type_mismatch() {
        let node = SchemaNode::String(StringNode::default());
        assert_eq!(
            message(node.validate("a.b", Some(&Value::Int(456)))),
            "a.b: Value is not a string."
        );
    }

    #[test]
    fn test_empty_string_counts_as_missing_when_required() {
        let node = SchemaNode::String(StringNode {
            required: true,
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("s", Some(&Value::from("")))),
            "s: Value is required."
        );
        assert_eq!(message(node.validate("s", None)), "s: Value is required.");
    }

    #[test]
    fn test_empty_string_is_fine_when_optional() {
        let node = SchemaNode::String(StringNode::default());
        assert_eq!(
            node.validate("s", Some(&Value::from(""))).unwrap(),
            Some(Value::from(""))
        );
    }

    #[test]
    fn test_zero_integer_satisfies_required() {
        let node = SchemaNode::Integer(IntegerNode {
            required: true,
            ..Default::default()
        });
        assert_eq!(node.validate("i", Some(&Value::Int(0))).unwrap(), Some(Value::Int(0)));
    }

    #[test]
    fn test_absent_returns_default() {
        let node = SchemaNode::String(StringNode {
            default: Some("fallback".into()),
            min_length: Some(20),
            ..Default::default()
        });
        assert_eq!(node.validate("s", None).unwrap(), Some(Value::from("fallback")));
        assert_eq!(
            node.validate("s", Some(&Value::Null)).unwrap(),
            Some(Value::from("fallback"))
        );
    }

    #[test]
    fn test_string_constraints() {
        let node = SchemaNode::String(StringNode {
            min_length: Some(3),
            max_length: Some(5),
            pattern: Some(Regex::new(r"(?i)[a-z](\.[0-9]+)?").unwrap()),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("s", Some(&Value::from("ab")))),
            "s: Value length is shorter than 3."
        );
        assert_eq!(
            message(node.validate("s", Some(&Value::from("abcdef")))),
            "s: Value length is longer than 5."
        );
        assert_eq!(
            message(node.validate("s", Some(&Value::from("1234")))),
            r"s: Value doesn't match pattern (?i)[a-z](\.[0-9]+)?."
        );
        assert_eq!(
            node.validate("s", Some(&Value::from("x.12"))).unwrap(),
            Some(Value::from("x.12"))
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let node = SchemaNode::String(StringNode {
            max_length: Some(3),
            ..Default::default()
        });
        assert!(node.validate("s", Some(&Value::from("äöü"))).is_ok());
    }

    #[test]
    fn test_allowed_strings_listed_in_order() {
        let node = SchemaNode::String(StringNode {
            allowed: Some(vec!["b".into(), "a".into()]),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("s", Some(&Value::from("c")))),
            r#"s: Value should be one of "b", "a"."#
        );
    }

    #[test]
    fn test_integer_bounds() {
        let node = SchemaNode::Integer(IntegerNode {
            min_value: Some(10),
            max_value: Some(20),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("i", Some(&Value::Int(9)))),
            "i: Value is lower than 10."
        );
        assert_eq!(
            message(node.validate("i", Some(&Value::Int(21)))),
            "i: Value is greater than 20."
        );
        assert_eq!(
            message(node.validate("i", Some(&Value::Float(12.0)))),
            "i: Value is not an integer."
        );
    }

    #[test]
    fn test_integer_allowed_values_render_zero() {
        let node = SchemaNode::Integer(IntegerNode {
            allowed: Some(vec![0, 5]),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("i", Some(&Value::Int(3)))),
            r#"i: Value should be one of "0", "5"."#
        );
    }

    #[test]
    fn test_float_allowed_values() {
        let node = SchemaNode::Float(FloatNode {
            allowed: Some(vec![0.3, 4.0, 5.17]),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("f", Some(&Value::Float(8.1)))),
            r#"f: Value should be one of "0.3", "4", "5.17"."#
        );
        assert_eq!(
            node.validate("f", Some(&Value::Float(4.0))).unwrap(),
            Some(Value::Float(4.0))
        );
    }

    #[test]
    fn test_float_renders_negative_zero_as_zero() {
        let node = SchemaNode::Float(FloatNode {
            allowed: Some(vec![-0.0, 1.5]),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("f", Some(&Value::Float(2.0)))),
            r#"f: Value should be one of "0", "1.5"."#
        );
    }

    #[test]
    fn test_float_rejects_integers_and_prints_bounds() {
        let node = SchemaNode::Float(FloatNode {
            min_value: Some(1.5),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("f", Some(&Value::Int(4)))),
            "f: Value is not a float."
        );
        assert_eq!(
            message(node.validate("f", Some(&Value::Float(1.0)))),
            "f: Value is lower than 1.500000."
        );
    }

    #[test]
    fn test_boolean_allowed_values() {
        let node = SchemaNode::Boolean(BooleanNode {
            allowed: Some(vec![true]),
            ..Default::default()
        });
        assert_eq!(
            message(node.validate("b", Some(&Value::Bool(false)))),
            r#"b: Value should be one of "true"."#
        );
        assert_eq!(
            message(node.validate("b", Some(&Value::from("yes")))),
            "b: Value is not a boolean."
        );
    }

    fn int_array() -> SchemaNode {
        SchemaNode::Array(ArrayNode {
            required: false,
            default: Some(vec![Value::Int(11)]),
            min_length: Some(1),
            max_length: Some(3),
            items: Box::new(SchemaNode::Integer(IntegerNode {
                required: true,
                min_value: Some(10),
                ..Default::default()
            })),
        })
    }

    #[test]
    fn test_array_default_and_lengths() {
        let node = int_array();
        assert_eq!(node.validate("a", None).unwrap(), Some(json("[11]")));
        assert_eq!(
            message(node.validate("a", Some(&json("[]")))),
            "a: Array length is shorter than 1."
        );
        assert_eq!(
            message(node.validate("a", Some(&json("[10, 11, 12, 13]")))),
            "a: Array length is longer than 3."
        );
    }

    #[test]
    fn test_array_item_paths() {
        let node = int_array();
        assert_eq!(
            message(node.validate("a", Some(&json("[10, 5]")))),
            "a[1]: Value is lower than 10."
        );
        assert_eq!(
            message(node.validate("a", Some(&json("[10, null]")))),
            "a[1]: Value is required."
        );
    }

    #[test]
    fn test_array_accepts_index_keyed_map() {
        let node = int_array();
        let input = json(r#"{"2": 12, "0": 10, "1": 11}"#);
        assert_eq!(node.validate("a", Some(&input)).unwrap(), Some(json("[10, 11, 12]")));
    }

    #[test]
    fn test_array_rejects_named_keys() {
        let node = int_array();
        assert_eq!(
            message(node.validate("a", Some(&json(r#"{"0": 10, "x": 11}"#)))),
            "a: Value is not an array."
        );
        assert_eq!(
            message(node.validate("a", Some(&Value::Int(1)))),
            "a: Value is not an array."
        );
    }

    #[test]
    fn test_object_drops_unknown_and_absent_fields() {
        let node = SchemaNode::Object(ObjectNode {
            required: false,
            children: vec![
                ("name".into(), SchemaNode::String(StringNode::default())),
                (
                    "port".into(),
                    SchemaNode::Integer(IntegerNode {
                        default: Some(80),
                        ..Default::default()
                    }),
                ),
            ],
        });
        let result = node.validate("server", Some(&json(r#"{"extra": 1}"#))).unwrap();
        assert_eq!(result, Some(json(r#"{"port": 80}"#)));
        assert_eq!(node.validate("server", None).unwrap(), Some(json(r#"{"port": 80}"#)));
    }

    #[test]
    fn test_object_required_and_type() {
        let node = SchemaNode::Object(ObjectNode {
            required: true,
            children: Vec::new(),
        });
        assert_eq!(message(node.validate("o", None)), "o: Value is required.");
        assert_eq!(
            message(node.validate("o", Some(&json("[]")))),
            "o: Value is not an object."
        );
    }

    #[test]
    fn test_insert_child_rejects_duplicates() {
        let mut children = Vec::new();
        let flag = || SchemaNode::Boolean(BooleanNode::default());
        insert_child(&mut children, "a".into(), flag()).unwrap();
        let result = insert_child(&mut children, "a".into(), flag());
        assert!(matches!(result, Err(Error::NodeDuplication(name)) if name == "a"));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(dedup(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
