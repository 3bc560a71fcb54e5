use serde_json::Value;

use super::{LoadArgs, OutputFormat, load};

pub(super) fn cmd_check(args: LoadArgs) -> strata_core::Result<()> {
    let (loader, outcome) = load(args)?;
    match outcome {
        Ok(()) => {
            println!("✅ configuration is valid");
            Ok(())
        }
        Err(e) => {
            let issues = loader.issues();
            println!("❌ configuration is invalid ({} issue(s))", issues.len());
            for issue in issues {
                println!("  • {issue}");
            }
            Err(e)
        }
    }
}

pub(super) fn cmd_show(
    args: LoadArgs,
    format: OutputFormat,
    allow_invalid: bool,
) -> strata_core::Result<()> {
    println!("{}", show_output(args, format, allow_invalid)?);
    Ok(())
}

fn show_output(
    args: LoadArgs,
    format: OutputFormat,
    allow_invalid: bool,
) -> strata_core::Result<String> {
    let (loader, outcome) = load(args)?;
    if let Err(e) = outcome {
        if !allow_invalid {
            return Err(e);
        }
        tracing::warn!(error = %e, "printing configuration that failed validation");
    }
    render(loader.get(), format)
}

fn render(config: &Value, format: OutputFormat) -> strata_core::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| strata_core::StrataError::Other(e.into())),
    }
}
