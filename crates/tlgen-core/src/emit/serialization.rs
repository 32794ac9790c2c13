//! Serialization emitter: the ordered wire layout of a definition.
//!
//! Plans are language neutral. The C++ renderer turns them into statements
//! and the reference codec in `tlgen-wire` interprets them directly, so both
//! agree on the byte layout by construction.
//!
//! Steps follow schema order, which is wire order. The `#` indicator position
//! carries the flag mask computed from its members; a flagged field is only
//! present on the wire when its bit is set.

use crate::model::{Argument, Definition, FlagBit, Primitive, TypeRef};

/// How a field's value is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// A single value.
    Scalar,
    /// `[0x1cb5c415 if boxed][u32 count][count elements]`.
    Vector { boxed: bool },
    /// Flagged `true`: only the mask bit exists on the wire.
    PresenceOnly,
}

impl Encoding {
    pub fn of(arg: &Argument) -> Self {
        if arg.is_presence_only() {
            Encoding::PresenceOnly
        } else if arg.is_vector {
            Encoding::Vector {
                boxed: arg.uses_vector_identity,
            }
        } else {
            Encoding::Scalar
        }
    }
}

/// One step of a write or read routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireStep<'a> {
    /// The constructor tag; write plans only, always first.
    Tag(u32),
    /// The `#` bitmask and the flagged arguments whose presence it records.
    FlagMask {
        indicator: &'a Argument,
        members: Vec<&'a Argument>,
    },
    /// One argument value.
    Field {
        arg: &'a Argument,
        encoding: Encoding,
        /// The controlling bit for flagged arguments.
        presence: Option<&'a FlagBit>,
    },
}

impl WireStep<'_> {
    /// Whether this step puts bytes on the wire.
    pub fn is_on_wire(&self) -> bool {
        !matches!(
            self,
            WireStep::Field {
                encoding: Encoding::PresenceOnly,
                ..
            }
        ) && !self.is_unframed_true()
    }

    fn is_unframed_true(&self) -> bool {
        matches!(
            self,
            WireStep::Field {
                arg,
                encoding: Encoding::Scalar,
                ..
            } if arg.ty == TypeRef::Primitive(Primitive::True)
        )
    }
}

/// Serialize steps: the tag, then every field in wire order.
pub fn write_plan(definition: &Definition) -> Vec<WireStep<'_>> {
    let mut steps = vec![WireStep::Tag(definition.id())];
    steps.extend(body_plan(definition));
    steps
}

/// Deserialize steps. The tag has already been consumed by the dispatcher.
pub fn read_plan(definition: &Definition) -> Vec<WireStep<'_>> {
    body_plan(definition)
}

/// The steps shared by writing and reading: everything after the tag.
pub fn body_plan(definition: &Definition) -> Vec<WireStep<'_>> {
    definition
        .args
        .iter()
        .filter(|arg| !arg.generic_definition)
        .map(|arg| {
            if arg.flag_indicator {
                WireStep::FlagMask {
                    indicator: arg,
                    members: definition
                        .args
                        .iter()
                        .filter(|member| {
                            member
                                .flag
                                .as_ref()
                                .is_some_and(|flag| flag.indicator == arg.name)
                        })
                        .collect(),
                }
            } else {
                WireStep::Field {
                    arg,
                    encoding: Encoding::of(arg),
                    presence: arg.flag.as_ref(),
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "serialization/serialization_tests.rs"]
mod serialization_tests;
