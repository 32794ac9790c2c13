//! Manifest parsing and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tlgen_core::{GeneratorConfig, SchemaSource};

/// Default manifest file name, looked up in the working directory
pub const MANIFEST_FILE: &str = "tlgen.toml";

/// tlgen.toml manifest structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Layer number → schema path, relative to the manifest
    #[serde(default)]
    pub layers: BTreeMap<String, PathBuf>,
}

impl Manifest {
    /// Load manifest from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read manifest: {:?}", path.as_ref()))?;

        Self::from_str(&content)
    }

    /// Parse manifest from string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse manifest")
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;

        for (layer, path) in &self.layers {
            layer
                .parse::<u32>()
                .with_context(|| format!("Invalid layer number: {layer}"))?;
            if path.as_os_str().is_empty() {
                anyhow::bail!("Schema path cannot be empty for layer {}", layer);
            }
        }

        Ok(())
    }

    /// Schema sources in layer order
    pub fn sources(&self) -> Result<Vec<SchemaSource>> {
        let mut sources = self
            .layers
            .iter()
            .map(|(layer, path)| {
                let layer = layer
                    .parse::<u32>()
                    .with_context(|| format!("Invalid layer number: {layer}"))?;
                Ok(SchemaSource::new(layer, path))
            })
            .collect::<Result<Vec<_>>>()?;
        sources.sort_by_key(|s| s.layer);
        Ok(sources)
    }

    /// Rebase relative paths onto the directory holding the manifest
    pub fn rebase(mut self, base_dir: &Path) -> Self {
        if self.generator.output_dir.is_relative() {
            self.generator.output_dir = base_dir.join(&self.generator.output_dir);
        }
        for path in self.layers.values_mut() {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
        self
    }
}

/// Load the manifest at `path`, or `./tlgen.toml` when it exists.
///
/// Returns `None` when no manifest was requested and none is present.
pub fn load(path: Option<&Path>) -> Result<Option<Manifest>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(MANIFEST_FILE).is_file() => PathBuf::from(MANIFEST_FILE),
        None => return Ok(None),
    };

    let manifest = Manifest::from_file(&path)?;
    manifest
        .validate()
        .with_context(|| format!("Invalid manifest: {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::debug!(manifest = %path.display(), layers = manifest.layers.len(), "loaded manifest");
    Ok(Some(manifest.rebase(base_dir)))
}
