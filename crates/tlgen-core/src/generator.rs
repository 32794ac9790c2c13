//! Generation driver: load, validate, render, then write.
//!
//! Nothing touches the output directory until both headers rendered
//! successfully, so a failed run never leaves a partial artifact behind.

use crate::config::GeneratorConfig;
use crate::emit::{self, GeneratedSources};
use crate::error::{GenResult, GenerateError};
use crate::graph::{self, TypeGraph};
use crate::identity;
use crate::model::Definition;
use crate::schema::{self, SchemaSource};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Counts describing a validated schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSummary {
    pub layers: Vec<u32>,
    pub functions: usize,
    pub types: usize,
    pub function_families: usize,
    pub type_families: usize,
}

impl SchemaSummary {
    fn of(definitions: &[Definition], graph: &TypeGraph<'_>) -> Self {
        let layers: BTreeSet<u32> = definitions.iter().map(|d| d.layer).collect();
        Self {
            layers: layers.into_iter().collect(),
            functions: graph.functions.len(),
            types: graph.types.len(),
            function_families: graph.functions.abstracts().len(),
            type_families: graph.types.abstracts().len(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub summary: SchemaSummary,
    pub files: Vec<PathBuf>,
}

pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Parse every schema source.
    pub fn load(&self, sources: &[SchemaSource]) -> GenResult<Vec<Definition>> {
        if sources.is_empty() {
            return Err(GenerateError::Config("no schema sources given".to_string()));
        }
        schema::parse_files(sources, self.config.ignore_core)
    }

    /// Check identity uniqueness and the flag invariants of every definition.
    pub fn validate(definitions: &[Definition]) -> GenResult<()> {
        identity::ensure_unique(definitions)?;
        for definition in definitions {
            definition.validate()?;
        }
        Ok(())
    }

    /// Validate and render both headers in memory.
    pub fn render(&self, definitions: &[Definition]) -> GenResult<(GeneratedSources, SchemaSummary)> {
        self.config.validate()?;
        Self::validate(definitions)?;

        let graph = graph::build(definitions);
        let sources = emit::render(&graph, &self.config)?;
        Ok((sources, SchemaSummary::of(definitions, &graph)))
    }

    /// Load and render without writing anything.
    pub fn check(&self, sources: &[SchemaSource]) -> GenResult<SchemaSummary> {
        let definitions = self.load(sources)?;
        let (_, summary) = self.render(&definitions)?;
        Ok(summary)
    }

    /// Full run: load, render, remove stale output, write.
    pub fn generate(&self, sources: &[SchemaSource]) -> GenResult<GenerationReport> {
        let definitions = self.load(sources)?;
        let (rendered, summary) = self.render(&definitions)?;

        self.clean()?;
        let files = self.write(&rendered)?;
        Ok(GenerationReport { summary, files })
    }

    /// Write rendered headers into the output directory.
    pub fn write(&self, rendered: &GeneratedSources) -> GenResult<Vec<PathBuf>> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;

        let outputs = [
            (self.config.functions_path(), &rendered.functions),
            (self.config.types_path(), &rendered.types),
        ];
        let mut written = Vec::with_capacity(outputs.len());
        for (path, text) in outputs {
            fs::write(&path, text).map_err(|e| GenerateError::io(&path, e))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote header");
            written.push(path);
        }
        Ok(written)
    }

    /// Remove previously generated headers. Returns how many were removed.
    pub fn clean(&self) -> GenResult<usize> {
        let mut removed = 0;
        for path in [self.config.functions_path(), self.config.types_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "removed stale header");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(GenerateError::io(&path, e)),
            }
        }
        Ok(removed)
    }
}
