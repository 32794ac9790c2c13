//! Declaration emitter: one class per definition.
//!
//! The field list is `sorted_args()` without the `#` indicator and `{X:Type}`
//! placeholders. Every field is also a constructor parameter, and flagged
//! parameters carry an "absent" default, which C++ only accepts when they
//! trail the required ones. That ordering is checked here and never repaired.

use crate::error::{GenResult, GenerateError};
use crate::model::{AbstractType, Argument, Definition};
use crate::naming;
use std::collections::BTreeSet;

/// One constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    pub arg: &'a Argument,
    /// The parameter may be omitted (flagged field).
    pub defaulted: bool,
}

/// Structural description of one generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub definition: &'a Definition,
    pub class_name: String,
    pub family: AbstractType,
    pub fields: Vec<&'a Argument>,
    pub params: Vec<Param<'a>>,
}

impl<'a> Declaration<'a> {
    /// Build a declaration from an already ordered field list.
    pub fn from_fields(
        definition: &'a Definition,
        fields: Vec<&'a Argument>,
        families: &BTreeSet<AbstractType>,
    ) -> GenResult<Self> {
        check_parameter_order(definition, &fields)?;

        let family = definition.family();
        if !families.contains(&family) {
            return Err(GenerateError::UnregisteredAbstract {
                definition: definition.full_name(),
                family: family.name().to_string(),
            });
        }

        let params = fields
            .iter()
            .map(|&arg| Param {
                arg,
                defaulted: arg.is_flag(),
            })
            .collect();

        Ok(Self {
            definition,
            class_name: naming::escape_identifier(&definition.name),
            family,
            fields,
            params,
        })
    }

    /// Whether the full constructor can also be called with no arguments.
    pub fn all_params_defaulted(&self) -> bool {
        self.params.iter().all(|p| p.defaulted)
    }
}

/// Describe the class generated for `definition`.
pub fn declare<'a>(
    definition: &'a Definition,
    families: &BTreeSet<AbstractType>,
) -> GenResult<Declaration<'a>> {
    let fields = definition
        .sorted_args()
        .into_iter()
        .filter(|arg| arg.is_field())
        .collect();
    Declaration::from_fields(definition, fields, families)
}

/// Fail if a flagged field precedes a non-flagged one.
pub fn check_parameter_order(definition: &Definition, fields: &[&Argument]) -> GenResult<()> {
    let mut first_flagged: Option<&Argument> = None;
    for &arg in fields {
        match first_flagged {
            None if arg.is_flag() => first_flagged = Some(arg),
            Some(flagged) if !arg.is_flag() => {
                return Err(GenerateError::ParameterOrder {
                    definition: definition.full_name(),
                    flagged: flagged.name.clone(),
                    required: arg.name.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}
