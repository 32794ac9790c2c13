//! Generator configuration types

use crate::error::{GenResult, GenerateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory that receives the generated artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name of the functions artifact
    #[serde(default = "default_functions_file")]
    pub functions_file: String,

    /// File name of the types artifact
    #[serde(default = "default_types_file")]
    pub types_file: String,

    /// Include path of the C++ runtime providing `Stream` and `Serializable`
    #[serde(default = "default_runtime_header")]
    pub runtime_header: String,

    /// Skip the built-in `Bool`/`True`/`Error`/`Null` constructors
    #[serde(default = "default_ignore_core")]
    pub ignore_core: bool,

    /// Outermost C++ namespace of the generated code
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_functions_file() -> String {
    "functions.hpp".to_string()
}

fn default_types_file() -> String {
    "types.hpp".to_string()
}

fn default_runtime_header() -> String {
    "tl/runtime.hpp".to_string()
}

fn default_ignore_core() -> bool {
    true
}

fn default_root_namespace() -> String {
    "TL".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            functions_file: default_functions_file(),
            types_file: default_types_file(),
            runtime_header: default_runtime_header(),
            ignore_core: default_ignore_core(),
            root_namespace: default_root_namespace(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> GenResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes).map_err(|e| GenerateError::Config(e.to_string()))
    }

    /// Override the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Path of the functions artifact
    pub fn functions_path(&self) -> PathBuf {
        self.output_dir.join(&self.functions_file)
    }

    /// Path of the types artifact
    pub fn types_path(&self) -> PathBuf {
        self.output_dir.join(&self.types_file)
    }

    /// Validate the configuration
    pub fn validate(&self) -> GenResult<()> {
        for (field, file) in [
            ("functions_file", &self.functions_file),
            ("types_file", &self.types_file),
        ] {
            if file.is_empty() {
                return Err(GenerateError::Config(format!("{field} cannot be empty")));
            }
            let path = Path::new(file);
            if path.components().count() != 1 || path.file_name().is_none() {
                return Err(GenerateError::Config(format!(
                    "{field} must be a plain file name, got `{file}`"
                )));
            }
        }

        if self.functions_file == self.types_file {
            return Err(GenerateError::Config(format!(
                "functions_file and types_file are both `{}`",
                self.functions_file
            )));
        }

        if !is_cpp_identifier(&self.root_namespace) {
            return Err(GenerateError::Config(format!(
                "root_namespace `{}` is not a C++ identifier",
                self.root_namespace
            )));
        }

        if self.runtime_header.trim().is_empty() {
            return Err(GenerateError::Config(
                "runtime_header cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_cpp_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
