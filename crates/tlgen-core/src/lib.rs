//! tlgen-core - TL schema model and C++ binding generator
//!
//! This crate turns Type Language schemas into typed, self-serializing C++
//! classes:
//! - [`schema`] parses `.tl` text and TL JSON into [`Definition`]s
//! - [`identity`] resolves constructor tags (declared or CRC-32 inferred)
//! - [`graph`] partitions definitions into functions and types
//! - [`emit`] declares classes, plans their wire layout and renders C++
//! - [`Generator`] drives a whole run and owns file I/O

pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod graph;
pub mod identity;
pub mod model;
pub mod naming;
pub mod schema;

pub use config::GeneratorConfig;
pub use error::{GenResult, GenerateError};
pub use generator::{GenerationReport, Generator, SchemaSummary};
pub use graph::{Partition, TypeGraph};
pub use model::{AbstractType, Argument, Definition, FlagBit, Primitive, QualifiedName, TypeRef};
pub use schema::{SchemaFormat, SchemaSource};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::emit::{Encoding, WireStep};
    pub use crate::{
        AbstractType, Argument, Definition, FlagBit, GenResult, GenerateError, Generator,
        GeneratorConfig, Primitive, QualifiedName, SchemaSource, TypeRef,
    };
}
