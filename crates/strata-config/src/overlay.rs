//! Environment and argument overlay.
//!
//! [`build_overlay`] walks the schema and returns a sparse tree holding only
//! values found in the environment or on the command line. [`apply_overlay`]
//! then grafts that tree onto the merged state. An absent value never erases
//! anything; a present value always replaces what is at its path.

use serde_json::{Map, Value};
use strata_core::Result;
use tracing::debug;

use crate::args::FlagLookup;
use crate::coerce::coerce;
use crate::env::EnvLookup;
use crate::schema::{ScalarType, SchemaNode};

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// A leaf value resolved from env/args.
    Value(Value),
    /// A composite node. Present even when empty so that untouched sections
    /// still materialise as `{}` in the state.
    Section(Vec<(String, Overlay)>),
}

impl Overlay {
    /// True when the section (recursively) carries at least one value.
    pub fn has_values(&self) -> bool {
        match self {
            Overlay::Value(_) => true,
            Overlay::Section(entries) => entries.iter().any(|(_, o)| o.has_values()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Overlay::Value(v) => v,
            Overlay::Section(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, o)| (k, o.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Resolve one leaf: the environment first, then an argument flag which wins
/// when present. Found values are coerced to `kind`.
pub fn resolve_leaf(
    arg: Option<&str>,
    env: Option<&str>,
    kind: Option<ScalarType>,
    env_lookup: &dyn EnvLookup,
    flags: &dyn FlagLookup,
) -> Result<Option<Value>> {
    let mut found: Option<(Value, String)> = None;

    if let Some(name) = env {
        if let Some(raw) = env_lookup.var(name) {
            found = Some((Value::String(raw), format!("env {name}")));
        }
    }
    if let Some(name) = arg {
        if let Some(raw) = flags.flag(name) {
            found = Some((raw, format!("arg --{name}")));
        }
    }

    match found {
        Some((raw, source_name)) => {
            debug!(source = %source_name, "resolved configuration value");
            coerce(raw, kind, &source_name).map(Some)
        }
        None => Ok(None),
    }
}

/// Build the sparse overlay for `node`.
pub fn build_overlay(
    node: &SchemaNode,
    env_lookup: &dyn EnvLookup,
    flags: &dyn FlagLookup,
) -> Result<Option<Overlay>> {
    match node {
        SchemaNode::Composite { properties } => {
            let mut entries = Vec::new();
            for (name, child) in properties {
                if let Some(overlay) = build_overlay(child, env_lookup, flags)? {
                    entries.push((name.clone(), overlay));
                }
            }
            Ok(Some(Overlay::Section(entries)))
        }
        SchemaNode::Leaf { kind, arg, env } => Ok(resolve_leaf(
            arg.as_deref(),
            env.as_deref(),
            *kind,
            env_lookup,
            flags,
        )?
        .map(Overlay::Value)),
    }
}

/// Graft `overlay` onto `state`.
///
/// A section over a non-object value replaces it only when the section
/// carries values; an empty section never clobbers existing data.
pub fn apply_overlay(state: &mut Value, overlay: Overlay) {
    match overlay {
        Overlay::Value(v) => *state = v,
        Overlay::Section(entries) => match state {
            Value::Object(map) => {
                for (key, child) in entries {
                    match map.get_mut(&key) {
                        Some(existing) => apply_overlay(existing, child),
                        None => {
                            map.insert(key, child.into_value());
                        }
                    }
                }
            }
            other => {
                let section = Overlay::Section(entries);
                if section.has_values() {
                    *other = section.into_value();
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn no_flags() -> HashMap<String, Value> {
        HashMap::new()
    }

    #[test]
    fn argument_beats_environment() {
        let e = env(&[("PORT", "1000")]);
        let flags: HashMap<String, Value> = [("port".to_string(), json!("2000"))].into();
        let v = resolve_leaf(Some("port"), Some("PORT"), Some(ScalarType::Integer), &e, &flags)
            .unwrap();
        assert_eq!(v, Some(json!(2000)));
    }

    #[test]
    fn nothing_found_is_none_not_null() {
        let v = resolve_leaf(None, Some("UNSET"), Some(ScalarType::Null), &env(&[]), &no_flags())
            .unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn overlay_fills_fresh_sections() {
        let schema = SchemaNode::parse(&json!({
            "type": "object",
            "properties": {
                "db": {
                    "type": "object",
                    "properties": {
                        "host": {"type": "string", "env": "DB_HOST"},
                        "port": {"type": "integer", "env": "DB_PORT"}
                    }
                },
                "cache": {"type": "object", "properties": {"ttl": {"env": "TTL"}}}
            }
        }));
        let e = env(&[("DB_HOST", "db.local")]);
        let overlay = build_overlay(&schema, &e, &no_flags()).unwrap().unwrap();

        let mut state = json!({});
        apply_overlay(&mut state, overlay);
        assert_eq!(state, json!({"db": {"host": "db.local"}, "cache": {}}));
    }

    #[test]
    fn overlay_keeps_siblings_of_merged_sections() {
        let schema = SchemaNode::parse(&json!({
            "type": "object",
            "properties": {
                "db": {
                    "type": "object",
                    "properties": {
                        "host": {"type": "string", "env": "DB_HOST"},
                        "port": {"type": "integer", "env": "DB_PORT"}
                    }
                }
            }
        }));
        let e = env(&[("DB_PORT", "6543")]);
        let overlay = build_overlay(&schema, &e, &no_flags()).unwrap().unwrap();

        let mut state = json!({"db": {"host": "primary", "port": 5432, "user": "app"}});
        apply_overlay(&mut state, overlay);
        assert_eq!(state, json!({"db": {"host": "primary", "port": 6543, "user": "app"}}));
    }

    #[test]
    fn empty_section_does_not_clobber_scalar() {
        let mut state = json!({"db": "sqlite://memory"});
        apply_overlay(
            &mut state,
            Overlay::Section(vec![("db".into(), Overlay::Section(vec![]))]),
        );
        assert_eq!(state, json!({"db": "sqlite://memory"}));
    }

    #[test]
    fn populated_section_replaces_scalar() {
        let mut state = json!({"db": "sqlite://memory"});
        apply_overlay(
            &mut state,
            Overlay::Section(vec![(
                "db".into(),
                Overlay::Section(vec![("host".into(), Overlay::Value(json!("h")))]),
            )]),
        );
        assert_eq!(state, json!({"db": {"host": "h"}}));
    }

    #[test]
    fn value_overlay_replaces_object() {
        let mut state = json!({"limits": {"cpu": 1}});
        apply_overlay(
            &mut state,
            Overlay::Section(vec![("limits".into(), Overlay::Value(json!([1, 2])))]),
        );
        assert_eq!(state, json!({"limits": [1, 2]}));
    }

    #[test]
    fn malformed_json_env_propagates() {
        let schema = SchemaNode::parse(&json!({
            "type": "object",
            "properties": {"hosts": {"type": "array", "env": "HOSTS"}}
        }));
        let e = env(&[("HOSTS", "[not json")]);
        let err = build_overlay(&schema, &e, &no_flags()).unwrap_err();
        assert!(matches!(err, strata_core::StrataError::Parse { .. }));
    }
}
