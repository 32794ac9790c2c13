//! Constructor identity resolution.
//!
//! The protocol identifies a serialized value solely by its 4-byte constructor
//! tag, so tags must be stable across runs and schema versions. A tag is either
//! declared in the schema (`ping#7abe77ec ...`) or inferred as the CRC-32 of the
//! definition's normalized signature.

use crate::error::{GenResult, GenerateError};
use crate::model::Definition;
use std::collections::HashMap;

/// Tag written in front of every boxed `Vector<T>`.
pub const VECTOR_CONSTRUCTOR: u32 = 0x1cb5c415;

/// `boolFalse = Bool`
pub const BOOL_FALSE: u32 = 0xbc799737;

/// `boolTrue = Bool`
pub const BOOL_TRUE: u32 = 0x997275b5;

/// Built-in constructors that are never generated.
pub const CORE_TYPES: [u32; 5] = [
    BOOL_FALSE,
    BOOL_TRUE,
    0x3fedd339, // true = True
    0xc4b9f9bb, // error code:int text:string = Error
    0x56730bcc, // null = Null
];

/// Whether `id` is a built-in constructor.
pub fn is_core_type(id: u32) -> bool {
    CORE_TYPES.contains(&id)
}

/// Canonical signature of a definition in schema notation, without its tag.
///
/// `ping ping_id:long = Pong`
pub fn signature(definition: &Definition) -> String {
    let mut text = definition.full_name();
    for arg in &definition.args {
        text.push(' ');
        text.push_str(&arg.to_string());
    }
    text.push_str(" = ");
    text.push_str(&result_text(definition));
    text
}

/// The signature as hashed by the protocol.
///
/// Presence-only `true` flags are dropped, direct `bytes` arguments are spelled
/// `string`, `<` becomes a space, and `>`, `{`, `}` are removed.
pub fn normalized_signature(definition: &Definition) -> String {
    let mut text = definition.full_name();
    for arg in &definition.args {
        if arg.is_presence_only() {
            continue;
        }
        let mut token = arg.to_string();
        if token.ends_with(":bytes") || token.ends_with("?bytes") {
            token.truncate(token.len() - "bytes".len());
            token.push_str("string");
        }
        text.push(' ');
        text.push_str(&token);
    }
    text.push_str(" = ");
    text.push_str(&result_text(definition));

    text.chars()
        .filter(|c| !matches!(c, '>' | '{' | '}'))
        .map(|c| if c == '<' { ' ' } else { c })
        .collect()
}

/// CRC-32 of the normalized signature, ignoring any declared id.
pub fn infer_id(definition: &Definition) -> u32 {
    crc32fast::hash(normalized_signature(definition).as_bytes())
}

/// The constructor tag of a definition.
///
/// A declared id is trusted unchanged.
pub fn resolve(definition: &Definition) -> u32 {
    definition
        .declared_id
        .unwrap_or_else(|| infer_id(definition))
}

/// Fail if two definitions share a constructor tag.
pub fn ensure_unique<'a, I>(definitions: I) -> GenResult<()>
where
    I: IntoIterator<Item = &'a Definition>,
{
    let mut seen: HashMap<u32, &Definition> = HashMap::new();
    for definition in definitions {
        let id = resolve(definition);
        if let Some(first) = seen.insert(id, definition) {
            return Err(GenerateError::DuplicateConstructor {
                id,
                first: first.full_name(),
                second: definition.full_name(),
            });
        }
    }
    Ok(())
}

fn result_text(definition: &Definition) -> String {
    if definition.returns_vector {
        format!("Vector<{}>", definition.result)
    } else {
        definition.result.to_string()
    }
}
