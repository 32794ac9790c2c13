//! `generate`, `check` and `clean` commands

use crate::manifest;
use anyhow::{Context, Result};
use std::path::Path;
use tlgen_core::{Generator, GeneratorConfig, SchemaSource};

/// Configuration and schema sources for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub config: GeneratorConfig,
    pub sources: Vec<SchemaSource>,
}

/// Merge the manifest (if any) with command-line overrides.
///
/// `-l` pairs replace the manifest's layers entirely; `-o` replaces its
/// output directory.
pub fn resolve(manifest_path: Option<&Path>, layers: &[String], output: Option<&Path>) -> Result<Inputs> {
    let manifest = manifest::load(manifest_path)?;

    let (mut config, mut sources) = match manifest {
        Some(manifest) => {
            let sources = manifest.sources()?;
            (manifest.generator, sources)
        }
        None => (GeneratorConfig::default(), Vec::new()),
    };

    if !layers.is_empty() {
        sources = layers
            .iter()
            .map(|pair| SchemaSource::parse_pair(pair))
            .collect::<Result<Vec<_>, _>>()?;
    }
    if let Some(output) = output {
        config.output_dir = output.to_path_buf();
    }

    Ok(Inputs { config, sources })
}

/// Generate command implementation
pub fn run(inputs: Inputs) -> Result<()> {
    println!(
        "Generating bindings from {} schema file(s)",
        inputs.sources.len()
    );

    let generator = Generator::new(inputs.config);
    let report = generator
        .generate(&inputs.sources)
        .context("Generation failed")?;

    println!(
        "✓ Functions: {} in {} families",
        report.summary.functions, report.summary.function_families
    );
    println!(
        "✓ Types: {} in {} families",
        report.summary.types, report.summary.type_families
    );
    for file in &report.files {
        println!("✓ Wrote {}", file.display());
    }

    Ok(())
}

/// Check command implementation
pub fn check(inputs: Inputs) -> Result<()> {
    println!("Checking {} schema file(s)", inputs.sources.len());

    let summary = Generator::new(inputs.config)
        .check(&inputs.sources)
        .context("Schema check failed")?;

    let layers = summary
        .layers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!("✓ Layers: {layers}");
    println!(
        "✓ Functions: {} in {} families",
        summary.functions, summary.function_families
    );
    println!(
        "✓ Types: {} in {} families",
        summary.types, summary.type_families
    );
    println!("\nSchema is valid!");

    Ok(())
}

/// Clean command implementation
pub fn clean(config: GeneratorConfig) -> Result<()> {
    let dir = config.output_dir.clone();
    let removed = Generator::new(config)
        .clean()
        .with_context(|| format!("Failed to clean {}", dir.display()))?;

    println!("✓ Removed {} generated file(s) from {}", removed, dir.display());
    Ok(())
}
