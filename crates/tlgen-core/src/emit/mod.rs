//! Code emission from the type graph.
//!
//! # Architecture
//!
//! ```text
//! TypeGraph
//!     ↓
//!  [sequencer]      layer / namespace blocks per partition
//!     ↓
//!  [declaration]    class name, family, fields, constructor params
//!     ↓
//!  [serialization]  WireStep plans for write / read
//!     ↓
//!  [cpp]            C++ text through a [source] writer
//!     ↓
//! functions.hpp, types.hpp
//! ```
//!
//! Every stage except the renderer returns plain values; only the renderer
//! owns a [`SourceWriter`].

pub mod cpp;
pub mod declaration;
pub mod sequencer;
pub mod serialization;
pub mod source;

pub use cpp::{Category, CppRenderer, GeneratedSources, render};
pub use declaration::{Declaration, Param, check_parameter_order, declare};
pub use sequencer::{SequenceItem, sequence};
pub use serialization::{Encoding, WireStep, body_plan, read_plan, write_plan};
pub use source::SourceWriter;
