use serde_json::Value;
use std::fmt;

/// Scalar type tag declared by a schema leaf's `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object,
    Array,
}

impl ScalarType {
    /// Parse a `type` keyword. Unions and unknown tags are untyped.
    pub fn from_keyword(keyword: Option<&Value>) -> Option<Self> {
        match keyword?.as_str()? {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of a schema the loader itself understands. Everything else stays
/// in the raw document and is only seen by the validator.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `type: "object"` with nested properties, in declaration order.
    Composite { properties: Vec<(String, SchemaNode)> },
    Leaf {
        kind: Option<ScalarType>,
        arg: Option<String>,
        env: Option<String>,
    },
}

impl SchemaNode {
    /// Build the node tree from a raw schema document.
    ///
    /// An `object` node that names an `env` or `arg` source and declares no
    /// `properties` is a leaf whose value arrives as JSON text.
    pub fn parse(schema: &Value) -> Self {
        let kind = ScalarType::from_keyword(schema.get("type"));
        let arg = string_field(schema, "arg");
        let env = string_field(schema, "env");
        let properties = schema.get("properties").and_then(Value::as_object);

        let is_composite = kind == Some(ScalarType::Object)
            && (properties.is_some() || (arg.is_none() && env.is_none()));

        if is_composite {
            let properties = properties
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, child)| (name.clone(), SchemaNode::parse(child)))
                        .collect()
                })
                .unwrap_or_default();
            SchemaNode::Composite { properties }
        } else {
            SchemaNode::Leaf { kind, arg, env }
        }
    }

    /// Every leaf that names an `env` or `arg` source, with its dotted path.
    pub fn bindings(&self) -> Vec<SourceBinding> {
        let mut out = Vec::new();
        self.collect_bindings(String::new(), &mut out);
        out
    }

    fn collect_bindings(&self, path: String, out: &mut Vec<SourceBinding>) {
        match self {
            SchemaNode::Composite { properties } => {
                for (name, child) in properties {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    child.collect_bindings(child_path, out);
                }
            }
            SchemaNode::Leaf { kind, arg, env } => {
                if arg.is_some() || env.is_some() {
                    out.push(SourceBinding {
                        path,
                        kind: *kind,
                        arg: arg.clone(),
                        env: env.clone(),
                    });
                }
            }
        }
    }
}

fn string_field(schema: &Value, key: &str) -> Option<String> {
    schema
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A schema leaf together with the sources that can supply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBinding {
    pub path: String,
    pub kind: Option<ScalarType>,
    pub arg: Option<String>,
    pub env: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_properties_in_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "server": {
                    "type": "object",
                    "properties": {
                        "port": {"type": "integer", "env": "PORT", "arg": "port"},
                        "host": {"type": "string"}
                    }
                },
                "debug": {"type": "boolean", "env": "DEBUG"}
            }
        });
        let node = SchemaNode::parse(&schema);
        let SchemaNode::Composite { properties } = &node else {
            panic!("root should be composite");
        };
        let names: Vec<_> = properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["server", "debug"]);

        let bindings = node.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].path, "server.port");
        assert_eq!(bindings[0].kind, Some(ScalarType::Integer));
        assert_eq!(bindings[0].arg.as_deref(), Some("port"));
        assert_eq!(bindings[1].path, "debug");
        assert_eq!(bindings[1].env.as_deref(), Some("DEBUG"));
    }

    #[test]
    fn object_with_source_and_no_properties_is_a_leaf() {
        let node = SchemaNode::parse(&json!({"type": "object", "env": "LIMITS"}));
        assert_eq!(
            node,
            SchemaNode::Leaf {
                kind: Some(ScalarType::Object),
                arg: None,
                env: Some("LIMITS".into()),
            }
        );
    }

    #[test]
    fn bare_object_is_an_empty_composite() {
        let node = SchemaNode::parse(&json!({"type": "object"}));
        assert_eq!(node, SchemaNode::Composite { properties: vec![] });
    }

    #[test]
    fn union_type_is_untyped() {
        let node = SchemaNode::parse(&json!({"type": ["string", "null"], "arg": "name"}));
        assert_eq!(
            node,
            SchemaNode::Leaf {
                kind: None,
                arg: Some("name".into()),
                env: None,
            }
        );
    }
}
