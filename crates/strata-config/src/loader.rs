use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use strata_core::{ConfigSource, Result, StrataError};
use tracing::{debug, info, warn};

use crate::args::{FlagLookup, ProcessArgs};
use crate::env::{EnvLookup, ProcessEnv};
use crate::merge::{deep_merge, prune_nulls};
use crate::overlay::{Overlay, apply_overlay, build_overlay};
use crate::resource::{FileResolver, ResourceResolver};
use crate::schema::{SchemaNode, SourceBinding};
use crate::validator::{SchemaValidator, ValidationIssue};

/// Where the loader's schema comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaInput {
    Inline(Value),
    /// Resolved through the loader's resource resolver.
    Reference(String),
}

impl From<Value> for SchemaInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(reference) => SchemaInput::Reference(reference),
            other => SchemaInput::Inline(other),
        }
    }
}

impl From<&str> for SchemaInput {
    fn from(reference: &str) -> Self {
        SchemaInput::Reference(reference.to_string())
    }
}

impl From<String> for SchemaInput {
    fn from(reference: String) -> Self {
        SchemaInput::Reference(reference)
    }
}

impl From<&Path> for SchemaInput {
    fn from(path: &Path) -> Self {
        SchemaInput::Reference(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for SchemaInput {
    fn from(path: PathBuf) -> Self {
        SchemaInput::from(path.as_path())
    }
}

/// Accumulates configuration from layered sources and validates it against a
/// schema.
///
/// Construction performs a first, lenient load: environment and argument
/// values are overlaid and validated, but a failure is only recorded. Every
/// later load returns the first validation issue as an error. The state is
/// kept either way, so [`ConfigLoader::get`] after a failed load shows the
/// merged-but-invalid configuration.
pub struct ConfigLoader {
    schema: SchemaNode,
    validator: SchemaValidator,
    config: Value,
    issues: Vec<ValidationIssue>,
    env: Box<dyn EnvLookup>,
    args: Box<dyn FlagLookup>,
    resolver: Box<dyn ResourceResolver>,
}

impl ConfigLoader {
    /// Loader reading the process environment and arguments, resolving
    /// references as files relative to the working directory.
    pub fn new(schema: impl Into<SchemaInput>) -> Result<Self> {
        Self::builder().schema(schema).build()
    }

    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::default()
    }

    /// Re-run the pipeline without a new source: prune, overlay, validate.
    pub fn load(&mut self) -> Result<&Value> {
        self.run(None, false)
    }

    /// Merge `source` into the state, then prune, overlay and validate.
    pub fn load_from(&mut self, source: impl Into<ConfigSource>) -> Result<&Value> {
        self.run(Some(source.into()), false)
    }

    /// The current configuration state.
    pub fn get(&self) -> &Value {
        &self.config
    }

    pub fn get_mut(&mut self) -> &mut Value {
        &mut self.config
    }

    /// Deserialize the current state into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.config.clone())?)
    }

    /// Human-readable description of the most recent validation failure, or
    /// an empty string if the last validation passed.
    pub fn error(&self) -> String {
        self.issues
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// All issues from the most recent validation.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Every schema leaf that can be supplied by an env variable or a flag.
    pub fn sources(&self) -> Vec<SourceBinding> {
        self.schema.bindings()
    }

    fn run(&mut self, source: Option<ConfigSource>, first: bool) -> Result<&Value> {
        if let Some(source) = source {
            let layers = source.flatten();
            info!(layers = layers.len(), "loading configuration");
            for layer in layers {
                self.merge_layer(layer)?;
            }
        }

        prune_nulls(&mut self.config);

        // A leaf schema at the root has nowhere to graft a value.
        if let Some(overlay @ Overlay::Section(_)) =
            build_overlay(&self.schema, &*self.env, &*self.args)?
        {
            apply_overlay(&mut self.config, overlay);
        }

        self.issues = self.validator.validate(&mut self.config);

        match self.issues.first() {
            Some(issue) if first => {
                debug!(%issue, "initial configuration incomplete");
            }
            Some(issue) => {
                warn!(%issue, "configuration failed validation");
                return Err(issue.clone().into_error());
            }
            None => debug!("configuration valid"),
        }

        Ok(&self.config)
    }

    fn merge_layer(&mut self, layer: ConfigSource) -> Result<()> {
        let document = match layer {
            ConfigSource::Inline(value) => value,
            ConfigSource::Reference(reference) => {
                info!(%reference, "merging configuration resource");
                self.resolver.resolve(&reference)?
            }
            ConfigSource::Layers(layers) => {
                for layer in layers {
                    self.merge_layer(layer)?;
                }
                return Ok(());
            }
        };

        if document.is_object() {
            deep_merge(&mut self.config, document);
        } else {
            warn!(kind = kind_name(&document), "ignoring configuration source that is not an object");
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .field("issues", &self.issues)
            .finish_non_exhaustive()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Configures the collaborators of a [`ConfigLoader`].
pub struct LoaderBuilder {
    schema: Option<SchemaInput>,
    env: Box<dyn EnvLookup>,
    args: Box<dyn FlagLookup>,
    resolver: Box<dyn ResourceResolver>,
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self {
            schema: None,
            env: Box::new(ProcessEnv),
            args: Box::new(ProcessArgs),
            resolver: Box::new(FileResolver::current_dir()),
        }
    }
}

impl LoaderBuilder {
    pub fn schema(mut self, schema: impl Into<SchemaInput>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn env(mut self, env: impl EnvLookup + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn args(mut self, args: impl FlagLookup + 'static) -> Self {
        self.args = Box::new(args);
        self
    }

    pub fn resolver(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Resolve and compile the schema, then run the lenient first load.
    pub fn build(self) -> Result<ConfigLoader> {
        let raw = match self.schema {
            Some(SchemaInput::Inline(value)) => value,
            Some(SchemaInput::Reference(reference)) => {
                info!(%reference, "loading schema");
                self.resolver.resolve(&reference)?
            }
            None => return Err(StrataError::Schema("no schema given".into())),
        };

        let validator = SchemaValidator::compile(&raw)?;
        let schema = SchemaNode::parse(&raw);

        let mut loader = ConfigLoader {
            schema,
            validator,
            config: Value::Object(Map::new()),
            issues: Vec::new(),
            env: self.env,
            args: self.args,
            resolver: self.resolver,
        };
        loader.run(None, true)?;
        Ok(loader)
    }
}
