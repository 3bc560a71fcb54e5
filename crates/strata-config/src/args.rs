//! Command-line flag lookup for schema `arg` fields.
//!
//! The flags a schema reads share the argument vector with the host
//! program's own flags. Tokens are first narrowed to the requested names,
//! then parsed by a `clap::Command` built from those names.

use clap::{Arg, ArgAction, ArgMatches, Command};
use regex::Regex;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?$").expect("valid numeric regex")
});

/// Parsed-flags capability queried by schema leaves.
pub trait FlagLookup {
    fn flag(&self, name: &str) -> Option<Value>;
}

/// Flags read from an explicit argument vector (program name excluded).
///
/// Conventions: `--name=value`, `--name value`, bare `--name` is `true`,
/// `--no-name` is `false`, a one-letter name also answers to `-n value`, and
/// `--` ends flag parsing. The last occurrence wins. Numeric values become
/// JSON numbers and `true`/`false` become booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgvFlags {
    argv: Vec<String>,
}

impl ArgvFlags {
    pub fn parse<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the values of `names` in one pass.
    pub fn values<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> HashMap<String, Value> {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        names.dedup();
        if names.is_empty() {
            return HashMap::new();
        }

        let tokens = retain_known(&self.argv, &names);
        let matches = flag_command(&names)
            .try_get_matches_from(tokens)
            .unwrap_or_default();

        names
            .iter()
            .filter_map(|name| raw_value(&matches, name).map(|raw| (name.to_string(), typed(&raw))))
            .collect()
    }
}

impl FlagLookup for ArgvFlags {
    fn flag(&self, name: &str) -> Option<Value> {
        self.values([name]).remove(name)
    }
}

fn flag_command(names: &[&str]) -> Command {
    let mut cmd = Command::new("flags")
        .no_binary_name(true)
        .ignore_errors(true)
        .args_override_self(true)
        .disable_help_flag(true)
        .disable_version_flag(true);

    for name in names {
        let mut arg = Arg::new(name.to_string())
            .long(name.to_string())
            .num_args(0..=1)
            .default_missing_value("true")
            .allow_negative_numbers(true)
            .action(ArgAction::Set);
        if let Some(short) = single_char(name) {
            arg = arg.short(short);
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

fn raw_value(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.try_get_one::<String>(name).ok().flatten().cloned()
}

/// Keep only tokens addressed to `names` (plus their value token), rewriting
/// `--no-name` to `--name=false`. Stops at `--`.
fn retain_known(argv: &[String], names: &[&str]) -> Vec<String> {
    let mut kept = Vec::new();
    let mut tokens = argv.iter().peekable();

    while let Some(token) = tokens.next() {
        if token == "--" {
            break;
        }

        let (flag, inline_value) = if let Some(body) = token.strip_prefix("--") {
            match body.split_once('=') {
                Some((name, _)) => (name, true),
                None => (body, false),
            }
        } else if let Some(short) = token.strip_prefix('-').filter(|s| s.chars().count() == 1) {
            (short, false)
        } else {
            continue;
        };

        if let Some(name) = flag.strip_prefix("no-").filter(|n| names.contains(n)) {
            if !inline_value {
                kept.push(format!("--{name}=false"));
            }
            continue;
        }
        if !names.contains(&flag) {
            continue;
        }

        kept.push(token.clone());
        if !inline_value {
            if let Some(next) = tokens.next_if(|next| is_value_token(next)) {
                kept.push(next.clone());
            }
        }
    }
    kept
}

fn is_value_token(token: &str) -> bool {
    !token.starts_with('-') || token == "-" || NUMERIC.is_match(token)
}

fn single_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c),
        _ => None,
    }
}

/// `true`/`false` become booleans and numeric text becomes a number.
fn typed(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if NUMERIC.is_match(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::from(i);
        }
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

/// Re-reads `std::env::args()` on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessArgs;

impl FlagLookup for ProcessArgs {
    fn flag(&self, name: &str) -> Option<Value> {
        ArgvFlags::parse(std::env::args().skip(1)).flag(name)
    }
}

impl FlagLookup for HashMap<String, Value> {
    fn flag(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<T: FlagLookup + ?Sized> FlagLookup for &T {
    fn flag(&self, name: &str) -> Option<Value> {
        (**self).flag(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn long_flag_forms() {
        let flags = ArgvFlags::parse(["--port=8080", "--host", "example.org", "--verbose"]);
        assert_eq!(flags.flag("port"), Some(json!(8080)));
        assert_eq!(flags.flag("host"), Some(json!("example.org")));
        assert_eq!(flags.flag("verbose"), Some(json!(true)));
        assert_eq!(flags.flag("missing"), None);
    }

    #[test]
    fn numeric_values_are_typed() {
        let flags = ArgvFlags::parse(["--ratio", "0.25", "--offset", "-5", "--tag", "v1"]);
        assert_eq!(flags.flag("ratio"), Some(json!(0.25)));
        assert_eq!(flags.flag("offset"), Some(json!(-5)));
        assert_eq!(flags.flag("tag"), Some(json!("v1")));
    }

    #[test]
    fn flag_followed_by_flag_is_boolean() {
        let flags = ArgvFlags::parse(["--debug", "--level", "3"]);
        assert_eq!(flags.flag("debug"), Some(json!(true)));
        assert_eq!(flags.flag("level"), Some(json!(3)));
    }

    #[test]
    fn negated_and_literal_booleans() {
        let flags = ArgvFlags::parse(["--no-color", "--cache", "false"]);
        assert_eq!(flags.flag("color"), Some(json!(false)));
        assert_eq!(flags.flag("cache"), Some(json!(false)));
    }

    #[test]
    fn single_letter_names_accept_short_form() {
        let flags = ArgvFlags::parse(["-n", "5"]);
        assert_eq!(flags.flag("n"), Some(json!(5)));
    }

    #[test]
    fn unknown_flags_and_positionals_are_skipped() {
        let flags = ArgvFlags::parse(["serve", "--other", "x", "-s", "schema.json", "--port", "1"]);
        assert_eq!(flags.flag("port"), Some(json!(1)));
        assert_eq!(flags.flag("other"), Some(json!("x")));
        assert_eq!(flags.values(["port", "s"]).get("s"), Some(&json!("schema.json")));
    }

    #[test]
    fn double_dash_stops_parsing() {
        let flags = ArgvFlags::parse(["--port", "1", "--", "--port", "2"]);
        assert_eq!(flags.flag("port"), Some(json!(1)));
    }

    #[test]
    fn last_occurrence_wins() {
        let flags = ArgvFlags::parse(["--port=1", "--port=2"]);
        assert_eq!(flags.flag("port"), Some(json!(2)));
    }

    #[test]
    fn several_names_in_one_pass() {
        let flags = ArgvFlags::parse(["--a", "1", "--b=two", "--no-c"]);
        let values = flags.values(["a", "b", "c", "d"]);
        assert_eq!(values.len(), 3);
        assert_eq!(values["a"], json!(1));
        assert_eq!(values["b"], json!("two"));
        assert_eq!(values["c"], json!(false));
    }
}
