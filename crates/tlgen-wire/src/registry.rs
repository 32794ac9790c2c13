//! Constructor tag registry and the polymorphic read dispatcher.
//!
//! Every boxed read goes through [`Registry::read_boxed`]: read the tag, find
//! the definition carrying it, check the family when one is expected, then
//! decode the body with that definition's plan.

use crate::codec;
use crate::error::{WireError, WireResult};
use crate::stream::TlReader;
use crate::value::Object;
use std::collections::{HashMap, HashSet};
use tlgen_core::schema::{self, SchemaSource};
use tlgen_core::{AbstractType, Definition, GenerateError, QualifiedName, TypeRef};

/// Definitions indexed by tag and, for bare references, by type name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: Vec<Definition>,
    by_id: HashMap<u32, usize>,
    bare_types: HashMap<String, usize>,
    families: HashSet<AbstractType>,
}

impl Registry {
    /// Index `definitions`. Two definitions sharing a tag is an error.
    pub fn new(definitions: Vec<Definition>) -> WireResult<Self> {
        let mut by_id: HashMap<u32, usize> = HashMap::with_capacity(definitions.len());
        let mut bare_types: HashMap<String, usize> = HashMap::new();
        let mut families = HashSet::new();

        for (index, definition) in definitions.iter().enumerate() {
            definition.validate()?;
            let id = definition.id();
            if let Some(&first) = by_id.get(&id) {
                return Err(WireError::DuplicateConstructor {
                    id,
                    first: definitions[first].full_name(),
                    second: definition.full_name(),
                });
            }
            by_id.insert(id, index);

            if !definition.is_function {
                families.insert(definition.family());
                // Later layers shadow earlier ones.
                let name = definition.full_name();
                match bare_types.get(&name) {
                    Some(&prev) if definitions[prev].layer > definition.layer => {}
                    _ => {
                        bare_types.insert(name, index);
                    }
                }
            }
        }

        // `%Family` names the only constructor of a single-constructor family.
        let mut family_members: HashMap<String, HashSet<String>> = HashMap::new();
        for definition in definitions.iter().filter(|d| !d.is_function) {
            family_members
                .entry(definition.family().to_string())
                .or_default()
                .insert(definition.full_name());
        }
        for (family, members) in family_members {
            if bare_types.contains_key(&family) || members.len() != 1 {
                continue;
            }
            if let Some(&index) = members.iter().next().and_then(|name| bare_types.get(name)) {
                bare_types.insert(family, index);
            }
        }

        for definition in &definitions {
            for arg in &definition.args {
                if let TypeRef::Bare(name) = &arg.ty
                    && !bare_types.contains_key(&name.to_string())
                {
                    return Err(GenerateError::UnknownBareType {
                        definition: definition.full_name(),
                        name: name.to_string(),
                    }
                    .into());
                }
            }
        }

        tracing::debug!(
            constructors = definitions.len(),
            families = families.len(),
            "built constructor registry"
        );
        Ok(Self {
            definitions,
            by_id,
            bare_types,
            families,
        })
    }

    /// Parse schema files and index every definition.
    pub fn from_sources(sources: &[SchemaSource], ignore_core: bool) -> WireResult<Self> {
        Self::new(schema::parse_files(sources, ignore_core)?)
    }

    pub fn get(&self, id: u32) -> Option<&Definition> {
        self.by_id.get(&id).map(|&index| &self.definitions[index])
    }

    /// The type constructor a bare reference names: a constructor name, or a
    /// single-constructor family written `%Family`.
    pub fn bare_type(&self, name: &QualifiedName) -> Option<&Definition> {
        self.bare_types
            .get(&name.to_string())
            .map(|&index| &self.definitions[index])
    }

    /// Whether any registered type belongs to `family`.
    pub fn has_family(&self, family: &AbstractType) -> bool {
        self.families.contains(family)
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Read a tag and the object it introduces.
    ///
    /// With `expected` set, a tag from another family fails, unless no
    /// registered type belongs to that family (`Object`-like catch-alls).
    pub fn read_boxed(
        &self,
        reader: &mut TlReader<'_>,
        expected: Option<&AbstractType>,
    ) -> WireResult<Object> {
        self.read_boxed_at(reader, expected, 0)
    }

    pub(crate) fn read_boxed_at(
        &self,
        reader: &mut TlReader<'_>,
        expected: Option<&AbstractType>,
        depth: usize,
    ) -> WireResult<Object> {
        let tag = reader.read_u32()?;
        let definition = self.get(tag).ok_or(WireError::UnknownConstructor(tag))?;

        if let Some(family) = expected
            && self.has_family(family)
            && definition.family() != *family
        {
            return Err(WireError::UnexpectedConstructor {
                tag,
                found: definition.full_name(),
                expected: family.to_string(),
            });
        }

        tracing::trace!(tag, name = %definition.full_name(), "dispatch");
        codec::decode_body_at(self, definition, reader, depth)
    }

    /// Read any registered object.
    pub fn read_any(&self, reader: &mut TlReader<'_>) -> WireResult<Object> {
        self.read_boxed(reader, None)
    }
}
