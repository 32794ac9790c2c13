//! Normalized schema model shared by every generator stage.
//!
//! The schema parser produces these types once per run; nothing mutates them
//! afterwards. Every later stage (identity resolution, type graph, emitters,
//! the reference codec) borrows from the same `Definition` list.
//!
//! # Structure
//!
//! - [`Definition`]: one schema entry (function or type) with its arguments
//! - [`Argument`]: one `name:type` entry, including flag and vector metadata
//! - [`TypeRef`]: simplified type reference (primitive, boxed, bare, generic)
//! - [`AbstractType`]: the nominal family a definition produces

use crate::error::{GenResult, GenerateError};
use crate::identity;
use std::fmt;

/// TL built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 128-bit opaque value.
    Int128,
    /// 256-bit opaque value.
    Int256,
    /// IEEE 754 double.
    Double,
    /// UTF-8 text, TL byte-string framing.
    String,
    /// Raw bytes, TL byte-string framing.
    Bytes,
    /// Boxed boolean (`boolTrue`/`boolFalse` tags).
    Bool,
    /// Presence-only flag value, never on the wire.
    True,
}

impl Primitive {
    /// Look up a primitive by its schema spelling.
    pub fn from_schema_name(name: &str) -> Option<Self> {
        Some(match name {
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "int128" => Primitive::Int128,
            "int256" => Primitive::Int256,
            "double" => Primitive::Double,
            "string" => Primitive::String,
            "bytes" => Primitive::Bytes,
            "Bool" => Primitive::Bool,
            "true" => Primitive::True,
            _ => return None,
        })
    }

    /// The schema spelling of this primitive.
    pub fn schema_name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Int128 => "int128",
            Primitive::Int256 => "int256",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Bytes => "bytes",
            Primitive::Bool => "Bool",
            Primitive::True => "true",
        }
    }

    /// Name of the abstract family for definitions that return this primitive.
    pub fn family_name(self) -> &'static str {
        match self {
            Primitive::Int => "Int",
            Primitive::Long => "Long",
            Primitive::Int128 => "Int128",
            Primitive::Int256 => "Int256",
            Primitive::Double => "Double",
            Primitive::String => "String",
            Primitive::Bytes => "Bytes",
            Primitive::Bool => "Bool",
            Primitive::True => "True",
        }
    }
}

/// A possibly namespaced schema name (`help.getConfig`, `User`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub name: String,
}

impl QualifiedName {
    /// Split a dotted schema name at its first dot.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((namespace, name)) => Self {
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            },
            None => Self {
                namespace: None,
                name: text.to_string(),
            },
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}.{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Simplified type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Built-in scalar.
    Primitive(Primitive),
    /// Abstract family, serialized with the concrete constructor's tag.
    Boxed(QualifiedName),
    /// Single constructor, serialized without a tag: a lowercase constructor
    /// name, or `%Type` for a family with one constructor.
    Bare(QualifiedName),
    /// Type parameter (`X` of `{X:Type}`), or the `Type` kind itself.
    Generic(String),
}

impl TypeRef {
    /// Whether values of this type are generated objects rather than scalars.
    pub fn is_object(&self) -> bool {
        !matches!(self, TypeRef::Primitive(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.schema_name()),
            TypeRef::Boxed(name) => write!(f, "{name}"),
            TypeRef::Bare(name) if name.name.starts_with(|c: char| c.is_ascii_uppercase()) => {
                write!(f, "%{name}")
            }
            TypeRef::Bare(name) => write!(f, "{name}"),
            TypeRef::Generic(name) => f.write_str(name),
        }
    }
}

/// Position of an optional argument in its flag bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagBit {
    /// Name of the `#` argument holding the mask.
    pub indicator: String,
    /// Bit index inside the mask.
    pub index: u32,
}

impl FlagBit {
    /// The mask value contributed by this bit.
    pub fn mask(&self) -> u32 {
        1u32.checked_shl(self.index).unwrap_or(0)
    }
}

/// One `name:type` entry of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    /// Element type for vectors, the value type otherwise.
    pub ty: TypeRef,
    pub is_vector: bool,
    /// `Vector<T>` (boxed with `0x1cb5c415`) rather than bare `vector<T>`.
    pub uses_vector_identity: bool,
    /// Set when the argument is optional.
    pub flag: Option<FlagBit>,
    /// The argument is the `#` bitmask itself.
    pub flag_indicator: bool,
    /// The argument is a `{X:Type}` placeholder.
    pub generic_definition: bool,
    /// The argument is typed `!X`.
    pub generic_ref: bool,
}

impl Argument {
    /// A required scalar argument.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_vector: false,
            uses_vector_identity: false,
            flag: None,
            flag_indicator: false,
            generic_definition: false,
            generic_ref: false,
        }
    }

    /// A `#` flag bitmask argument.
    pub fn indicator(name: impl Into<String>) -> Self {
        Self {
            flag_indicator: true,
            ..Self::new(name, TypeRef::Primitive(Primitive::Int))
        }
    }

    /// A `{X:Type}` placeholder.
    pub fn generic_definition(name: impl Into<String>) -> Self {
        Self {
            generic_definition: true,
            ..Self::new(name, TypeRef::Generic("Type".to_string()))
        }
    }

    /// Turn this argument into a vector of its type.
    pub fn into_vector(mut self, boxed: bool) -> Self {
        self.is_vector = true;
        self.uses_vector_identity = boxed;
        self
    }

    /// Make this argument optional under `indicator.index`.
    pub fn flagged(mut self, indicator: impl Into<String>, index: u32) -> Self {
        self.flag = Some(FlagBit {
            indicator: indicator.into(),
            index,
        });
        self
    }

    /// Whether presence of this argument is controlled by a flag bit.
    pub fn is_flag(&self) -> bool {
        self.flag.is_some()
    }

    /// Whether this argument becomes a field of the generated class.
    pub fn is_field(&self) -> bool {
        !self.flag_indicator && !self.generic_definition
    }

    /// A flagged `true`: carried only by its bit in the mask.
    pub fn is_presence_only(&self) -> bool {
        self.is_flag() && !self.is_vector && self.ty == TypeRef::Primitive(Primitive::True)
    }

    /// The argument type in schema notation (`flags.0?Vector<long>`).
    pub fn schema_type(&self) -> String {
        let mut text = if self.flag_indicator {
            "#".to_string()
        } else {
            self.ty.to_string()
        };
        if self.is_vector {
            let wrapper = if self.uses_vector_identity {
                "Vector"
            } else {
                "vector"
            };
            text = format!("{wrapper}<{text}>");
        }
        if self.generic_ref {
            text = format!("!{text}");
        }
        if let Some(flag) = &self.flag {
            text = format!("{}.{}?{}", flag.indicator, flag.index, text);
        }
        text
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic_definition {
            write!(f, "{{{}:{}}}", self.name, self.schema_type())
        } else {
            write!(f, "{}:{}", self.name, self.schema_type())
        }
    }
}

/// One schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Tag written in the schema (`name#1a2b3c4d`), if any.
    pub declared_id: Option<u32>,
    pub name: String,
    pub namespace: Option<String>,
    /// Schema layer the definition was loaded from.
    pub layer: u32,
    /// RPC request rather than a value type.
    pub is_function: bool,
    /// Result family, with any `Vector<...>` wrapper removed.
    pub result: TypeRef,
    /// The schema result was `Vector<result>`.
    pub returns_vector: bool,
    /// Arguments in schema (wire) order.
    pub args: Vec<Argument>,
}

impl Definition {
    /// A definition with no arguments.
    pub fn new(full_name: &str, result: TypeRef, is_function: bool, layer: u32) -> Self {
        let name = QualifiedName::parse(full_name);
        Self {
            declared_id: None,
            name: name.name,
            namespace: name.namespace,
            layer,
            is_function,
            result,
            returns_vector: false,
            args: Vec::new(),
        }
    }

    /// Builder-style argument append.
    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    /// Builder-style declared id.
    pub fn with_id(mut self, id: u32) -> Self {
        self.declared_id = Some(id);
        self
    }

    /// The constructor tag: declared, or inferred from the signature.
    pub fn id(&self) -> u32 {
        identity::resolve(self)
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// `namespace.name`, or `name` when unqualified.
    pub fn full_name(&self) -> String {
        self.qualified_name().to_string()
    }

    /// The abstract family this definition belongs to.
    pub fn family(&self) -> AbstractType {
        AbstractType::of(&self.result)
    }

    /// Arguments in declaration order: flagged arguments after all others.
    ///
    /// Stable, so relative order inside each group is the schema order.
    pub fn sorted_args(&self) -> Vec<&Argument> {
        let (required, flagged): (Vec<&Argument>, Vec<&Argument>) =
            self.args.iter().partition(|a| !a.is_flag());
        required.into_iter().chain(flagged).collect()
    }

    /// The `#` argument, if any.
    pub fn flag_indicator(&self) -> Option<&Argument> {
        self.args.iter().find(|a| a.flag_indicator)
    }

    /// Check the flag invariants: at most one indicator, declared before
    /// every argument that references it.
    pub fn validate(&self) -> GenResult<()> {
        let mut indicator: Option<(usize, &Argument)> = None;

        for (position, arg) in self.args.iter().enumerate() {
            if arg.flag_indicator {
                if arg.is_flag() {
                    return Err(GenerateError::Unsupported {
                        definition: self.full_name(),
                        detail: format!("flag indicator `{}` is itself flagged", arg.name),
                    });
                }
                if let Some((_, first)) = indicator {
                    return Err(GenerateError::MultipleFlagIndicators {
                        definition: self.full_name(),
                        first: first.name.clone(),
                        second: arg.name.clone(),
                    });
                }
                indicator = Some((position, arg));
            }
        }

        for (position, arg) in self.args.iter().enumerate() {
            let Some(flag) = &arg.flag else { continue };
            if flag.index >= u32::BITS {
                return Err(GenerateError::Unsupported {
                    definition: self.full_name(),
                    detail: format!("flag bit {} of `{}` does not fit in 32 bits", flag.index, arg.name),
                });
            }
            let declared_at = self
                .args
                .iter()
                .position(|a| a.flag_indicator && a.name == flag.indicator);
            match declared_at {
                None => {
                    return Err(GenerateError::UnknownFlagIndicator {
                        definition: self.full_name(),
                        argument: arg.name.clone(),
                        indicator: flag.indicator.clone(),
                    });
                }
                Some(at) if at > position => {
                    return Err(GenerateError::FlagBeforeIndicator {
                        definition: self.full_name(),
                        argument: arg.name.clone(),
                        indicator: flag.indicator.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&identity::signature(self))
    }
}

/// Nominal family shared by every definition producing the same result.
///
/// Carries no fields; ordered by its full dotted name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbstractType(String);

impl AbstractType {
    /// The family of a (normalized) result type.
    pub fn of(result: &TypeRef) -> Self {
        match result {
            TypeRef::Primitive(p) => AbstractType(p.family_name().to_string()),
            TypeRef::Boxed(name) | TypeRef::Bare(name) => AbstractType(name.to_string()),
            TypeRef::Generic(name) => AbstractType(name.clone()),
        }
    }

    /// Build a family from its full dotted name.
    pub fn named(name: impl Into<String>) -> Self {
        AbstractType(name.into())
    }

    /// Full dotted name (`storage.FileType`).
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('.').map(|(namespace, _)| namespace)
    }

    /// Name without namespace (`FileType`).
    pub fn local_name(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(_, name)| name)
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
