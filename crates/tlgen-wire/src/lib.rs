//! tlgen-wire - Reference TL binary codec
//!
//! This crate encodes and decodes TL objects at runtime without generated
//! code. It interprets the same [`WireStep`](tlgen_core::emit::WireStep)
//! plans the C++ emitter renders, so it doubles as an executable description
//! of what the generated classes put on the wire:
//! - [`TlWriter`] / [`TlReader`] handle primitive encodings
//! - [`Registry`] maps constructor tags to definitions and dispatches boxed reads
//! - [`TlCodec`] encodes and decodes dynamic [`Object`] values

mod codec;
mod error;
mod registry;
mod stream;
mod value;

pub use codec::{Codec, MAX_DEPTH, TlCodec, decode_body, encode_bare, encode_boxed};
pub use error::{WireError, WireResult};
pub use registry::Registry;
pub use stream::{BOOL_FALSE, BOOL_TRUE, TlReader, TlWriter};
pub use value::{Object, Value};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Codec, Object, Registry, TlCodec, TlReader, TlWriter, Value, WireError};
}
