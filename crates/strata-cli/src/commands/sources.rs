use std::fmt::Write as _;
use strata_config::{FileResolver, ResourceResolver, SchemaNode};

pub(super) fn cmd_sources(schema: &str) -> strata_core::Result<()> {
    print!("{}", sources_table(&FileResolver::current_dir(), schema)?);
    Ok(())
}

/// Render the env/arg bindings of a schema. Only the schema is read; no
/// environment variable or flag is looked up.
fn sources_table(resolver: &dyn ResourceResolver, schema: &str) -> strata_core::Result<String> {
    let raw = resolver.resolve(schema)?;
    let bindings = SchemaNode::parse(&raw).bindings();

    if bindings.is_empty() {
        return Ok(format!("No env or arg sources declared in {schema}\n"));
    }

    let width = bindings
        .iter()
        .map(|b| b.path.len())
        .max()
        .unwrap_or(0)
        .max("FIELD".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:<8}  {:<24}  ARG", "FIELD", "TYPE", "ENV");
    for b in &bindings {
        let _ = writeln!(
            out,
            "{:<width$}  {:<8}  {:<24}  {}",
            b.path,
            b.kind.map(|k| k.as_str()).unwrap_or("any"),
            b.env.as_deref().unwrap_or("-"),
            b.arg.as_deref().map(|a| format!("--{a}")).unwrap_or_else(|| "-".into()),
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_config::MemoryResolver;

    #[test]
    fn lists_each_binding() {
        let resolver = MemoryResolver::new().with(
            "schema",
            json!({
                "type": "object",
                "properties": {
                    "port": {"type": "integer", "env": "APP_PORT", "arg": "port"},
                    "db": {"type": "object", "properties": {"url": {"env": "DATABASE_URL"}}},
                    "name": {"type": "string"}
                }
            }),
        );
        let out = sources_table(&resolver, "schema").unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3, "{out}");
        assert!(lines[0].starts_with("FIELD"));
        assert!(lines[1].starts_with("port "), "{out}");
        assert!(lines[1].contains("integer") && lines[1].contains("APP_PORT"));
        assert!(lines[1].ends_with("--port"));
        assert!(lines[2].starts_with("db.url "), "{out}");
        assert!(lines[2].contains("any") && lines[2].ends_with('-'));
    }

    #[test]
    fn unreadable_env_values_are_not_consulted() {
        // Set to malformed JSON: a load would fail coercing this array leaf.
        unsafe { std::env::set_var("STRATA_SOURCES_TEST_HOSTS", "[not json") };
        let resolver = MemoryResolver::new().with(
            "schema",
            json!({
                "type": "object",
                "properties": {"hosts": {"type": "array", "env": "STRATA_SOURCES_TEST_HOSTS"}}
            }),
        );
        let out = sources_table(&resolver, "schema").unwrap();
        assert!(out.contains("STRATA_SOURCES_TEST_HOSTS"));
    }

    #[test]
    fn schema_without_sources() {
        let resolver = MemoryResolver::new().with("schema", json!({"type": "object"}));
        let out = sources_table(&resolver, "schema").unwrap();
        assert_eq!(out, "No env or arg sources declared in schema\n");
    }
}
