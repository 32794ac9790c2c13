//! Plan-driven TL encoder and decoder.
//!
//! Each definition's [`WireStep`] plan is walked in order; the same plan the
//! C++ renderer turns into `write`/`read` bodies.

use crate::error::{WireError, WireResult};
use crate::registry::Registry;
use crate::stream::{TlReader, TlWriter};
use crate::value::{Object, Value};
use tlgen_core::emit::{Encoding, WireStep, body_plan, read_plan, write_plan};
use tlgen_core::identity::VECTOR_CONSTRUCTOR;
use tlgen_core::{AbstractType, Argument, Definition, GenerateError, Primitive, TypeRef};

/// Deepest object nesting the decoder follows before giving up.
pub const MAX_DEPTH: usize = 64;

/// Trait for TL object encoding and decoding
pub trait Codec: Send + Sync {
    /// Encode a boxed object to bytes
    fn encode(&self, object: &Object) -> WireResult<Vec<u8>>;

    /// Decode exactly one boxed object
    fn decode(&self, data: &[u8]) -> WireResult<Object>;

    /// Get the content type for this codec
    fn content_type(&self) -> &'static str;
}

/// Binary TL codec over a constructor [`Registry`]
#[derive(Debug, Clone)]
pub struct TlCodec {
    registry: Registry,
}

impl TlCodec {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Decode the leading object and report how many bytes it used.
    pub fn decode_prefix(&self, data: &[u8]) -> WireResult<(Object, usize)> {
        let mut reader = TlReader::new(data);
        let object = self.registry.read_any(&mut reader)?;
        Ok((object, reader.position()))
    }
}

impl Codec for TlCodec {
    fn encode(&self, object: &Object) -> WireResult<Vec<u8>> {
        let mut writer = TlWriter::with_capacity(64);
        encode_boxed(&self.registry, object, &mut writer)?;
        Ok(writer.into_bytes())
    }

    fn decode(&self, data: &[u8]) -> WireResult<Object> {
        let (object, used) = self.decode_prefix(data)?;
        if used != data.len() {
            return Err(WireError::TrailingBytes(data.len() - used));
        }
        Ok(object)
    }

    fn content_type(&self) -> &'static str {
        "application/x-tl"
    }
}

/// Write `object`'s tag and body.
pub fn encode_boxed(registry: &Registry, object: &Object, writer: &mut TlWriter) -> WireResult<()> {
    let definition = registry
        .get(object.id)
        .ok_or(WireError::UnknownConstructor(object.id))?;
    encode_steps(registry, definition, &write_plan(definition), object, writer)
}

/// Write `object`'s body only, as `definition` lays it out.
pub fn encode_bare(
    registry: &Registry,
    definition: &Definition,
    object: &Object,
    writer: &mut TlWriter,
) -> WireResult<()> {
    encode_steps(registry, definition, &body_plan(definition), object, writer)
}

fn encode_steps(
    registry: &Registry,
    definition: &Definition,
    steps: &[WireStep<'_>],
    object: &Object,
    writer: &mut TlWriter,
) -> WireResult<()> {
    for step in steps {
        match step {
            WireStep::Tag(id) => writer.write_u32(*id),
            WireStep::FlagMask { members, .. } => {
                let mask = members
                    .iter()
                    .filter(|member| is_present(object, member))
                    .filter_map(|member| member.flag.as_ref())
                    .fold(0u32, |mask, flag| mask | flag.mask());
                writer.write_u32(mask);
            }
            WireStep::Field {
                arg,
                encoding,
                presence,
            } => {
                if *encoding == Encoding::PresenceOnly || !step.is_on_wire() {
                    continue;
                }
                let value = match object.get(&arg.name) {
                    Some(value) => value,
                    None if presence.is_some() => continue,
                    None => {
                        return Err(WireError::MissingField {
                            definition: definition.full_name(),
                            field: arg.name.clone(),
                        });
                    }
                };
                encode_field(registry, arg, *encoding, value, writer)
                    .map_err(|e| e.in_field(&definition.full_name(), &arg.name))?;
            }
        }
    }
    Ok(())
}

fn is_present(object: &Object, arg: &Argument) -> bool {
    match object.get(&arg.name) {
        None => false,
        Some(Value::Bool(set)) if arg.is_presence_only() => *set,
        Some(_) => true,
    }
}

fn encode_field(
    registry: &Registry,
    arg: &Argument,
    encoding: Encoding,
    value: &Value,
    writer: &mut TlWriter,
) -> WireResult<()> {
    match encoding {
        Encoding::Vector { boxed } => {
            let Value::Vector(items) = value else {
                return Err(WireError::mismatch("vector", value.kind()));
            };
            if boxed {
                writer.write_u32(VECTOR_CONSTRUCTOR);
            }
            writer.write_u32(items.len() as u32);
            for item in items {
                encode_value(registry, &arg.ty, item, writer)?;
            }
            Ok(())
        }
        Encoding::Scalar => encode_value(registry, &arg.ty, value, writer),
        Encoding::PresenceOnly => Ok(()),
    }
}

fn encode_value(
    registry: &Registry,
    ty: &TypeRef,
    value: &Value,
    writer: &mut TlWriter,
) -> WireResult<()> {
    match (ty, value) {
        (TypeRef::Primitive(primitive), value) => encode_primitive(*primitive, value, writer),
        (TypeRef::Boxed(_) | TypeRef::Generic(_), Value::Object(object)) => {
            encode_boxed(registry, object, writer)
        }
        (TypeRef::Bare(name), Value::Object(object)) => {
            let definition = registry
                .bare_type(name)
                .ok_or_else(|| unknown_bare(ty))?;
            encode_bare(registry, definition, object, writer)
        }
        (ty, value) => Err(WireError::mismatch(ty, value.kind())),
    }
}

fn encode_primitive(primitive: Primitive, value: &Value, writer: &mut TlWriter) -> WireResult<()> {
    match (primitive, value) {
        (Primitive::Int, Value::Int(v)) => writer.write_i32(*v),
        (Primitive::Long, Value::Long(v)) => writer.write_i64(*v),
        (Primitive::Int128, Value::Int128(v)) => writer.write_raw(v),
        (Primitive::Int256, Value::Int256(v)) => writer.write_raw(v),
        (Primitive::Double, Value::Double(v)) => writer.write_f64(*v),
        (Primitive::Bool, Value::Bool(v)) => writer.write_bool(*v),
        (Primitive::String, Value::String(v)) => writer.write_string(v)?,
        (Primitive::Bytes, Value::Bytes(v)) => writer.write_bytes(v)?,
        (Primitive::Bytes, Value::String(v)) => writer.write_string(v)?,
        (Primitive::True, _) => {}
        (primitive, value) => {
            return Err(WireError::mismatch(primitive.schema_name(), value.kind()));
        }
    }
    Ok(())
}

/// Read the body of `definition`; the tag has already been consumed.
pub fn decode_body(
    registry: &Registry,
    definition: &Definition,
    reader: &mut TlReader<'_>,
) -> WireResult<Object> {
    decode_body_at(registry, definition, reader, 0)
}

/// [`decode_body`] for an object `depth` levels below the top.
pub(crate) fn decode_body_at(
    registry: &Registry,
    definition: &Definition,
    reader: &mut TlReader<'_>,
    depth: usize,
) -> WireResult<Object> {
    if depth >= MAX_DEPTH {
        return Err(WireError::TooDeep { limit: MAX_DEPTH });
    }
    let mut object = Object::new(definition.full_name(), definition.id());
    let mut flags = 0u32;

    for step in read_plan(definition) {
        match step {
            WireStep::Tag(_) => {}
            WireStep::FlagMask { indicator, .. } => {
                flags = reader
                    .read_u32()
                    .map_err(|e| e.in_field(&object.name, &indicator.name))?;
            }
            WireStep::Field {
                arg,
                encoding,
                presence,
            } => {
                let set = presence.is_none_or(|bit| flags & bit.mask() != 0);
                if !set {
                    continue;
                }
                let value = match encoding {
                    Encoding::PresenceOnly => Value::True,
                    _ => decode_field(registry, arg, encoding, reader, depth + 1)
                        .map_err(|e| e.in_field(&object.name, &arg.name))?,
                };
                object.fields.insert(arg.name.clone(), value);
            }
        }
    }
    Ok(object)
}

fn decode_field(
    registry: &Registry,
    arg: &Argument,
    encoding: Encoding,
    reader: &mut TlReader<'_>,
    depth: usize,
) -> WireResult<Value> {
    let Encoding::Vector { boxed } = encoding else {
        return decode_value(registry, &arg.ty, reader, depth);
    };
    if boxed {
        // The generic vector tag carries no information.
        reader.read_u32()?;
    }
    // Counts past the remaining input fail, `true` elements included.
    let len = reader.read_u32()? as usize;
    if len > reader.remaining() {
        return Err(WireError::UnexpectedEof {
            offset: reader.position(),
            needed: len - reader.remaining(),
        });
    }
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(decode_value(registry, &arg.ty, reader, depth)?);
    }
    Ok(Value::Vector(items))
}

fn decode_value(
    registry: &Registry,
    ty: &TypeRef,
    reader: &mut TlReader<'_>,
    depth: usize,
) -> WireResult<Value> {
    Ok(match ty {
        TypeRef::Primitive(primitive) => match primitive {
            Primitive::Int => Value::Int(reader.read_i32()?),
            Primitive::Long => Value::Long(reader.read_i64()?),
            Primitive::Int128 => Value::Int128(reader.read_int128()?),
            Primitive::Int256 => Value::Int256(reader.read_int256()?),
            Primitive::Double => Value::Double(reader.read_f64()?),
            Primitive::Bool => Value::Bool(reader.read_bool()?),
            Primitive::String => Value::String(reader.read_string()?),
            Primitive::Bytes => Value::Bytes(reader.read_bytes()?),
            Primitive::True => Value::True,
        },
        TypeRef::Boxed(name) => {
            let family = AbstractType::named(name.to_string());
            registry.read_boxed_at(reader, Some(&family), depth)?.into()
        }
        TypeRef::Generic(_) => registry.read_boxed_at(reader, None, depth)?.into(),
        TypeRef::Bare(name) => {
            let definition = registry
                .bare_type(name)
                .ok_or_else(|| unknown_bare(ty))?;
            decode_body_at(registry, definition, reader, depth)?.into()
        }
    })
}

// Registry construction resolves every bare reference up front.
fn unknown_bare(ty: &TypeRef) -> WireError {
    WireError::Schema(GenerateError::Internal(format!(
        "bare type `{ty}` is not registered"
    )))
}

#[cfg(test)]
#[path = "codec/codec_tests.rs"]
mod codec_tests;
