use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use oas_to_k6_clients::{
    codegen::{transpile, write_to_disk},
    parse::Document,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use self::config::{Codegen, Command, Main, Validate};

fn main() -> Result<()> {
    let Ok(main) = Main::parse().map_err(|err| err.exit());

    let default_filter = if main.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match main.command {
        Command::Codegen(Codegen {
            input,
            output,
            basename,
        }) => {
            tracing::info!("Converting `{}`", input.display());
            let doc = load(&input)?;
            let generated = transpile(&doc)?;

            let [types, clients] = generated.into_files(&basename);
            let types_path = output.join(&types.path);
            write_to_disk(&output, types)?;
            tracing::info!(
                "Wrote k6 clients type definitions to `{}`",
                types_path.display()
            );

            let clients_path = output.join(&clients.path);
            write_to_disk(&output, clients)?;
            tracing::info!("Wrote k6 clients to `{}`", clients_path.display());
        }
        Command::Validate(Validate { input }) => {
            load(&input)?;
            tracing::info!("`{}` is valid", input.display());
        }
    }

    Ok(())
}

/// Reads, parses, and validates an OpenAPI document.
fn load(input: &Path) -> Result<Document> {
    let source = std::fs::read_to_string(input)
        .into_diagnostic()
        .with_context(|| format!("Failed to read `{}`", input.display()))?;

    let doc = match input.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Document::from_json(&source),
        _ => Document::from_yaml(&source),
    }
    .into_diagnostic()
    .context("Failed to parse OpenAPI document")?;

    doc.validate()
        .into_diagnostic()
        .context("Invalid OpenAPI document")?;

    tracing::info!("OpenAPI: {} (version {})", doc.info.title, doc.info.version);
    Ok(doc)
}
