//! Property-based tests for constructor identities and emission ordering
//!
//! Generates arbitrary well-formed definitions and checks the invariants the
//! generated code depends on: stable tags, parser/printer agreement, flag-last
//! parameter order and balanced layer/namespace blocks.

use proptest::prelude::*;
use tlgen_core::emit::{self, SequenceItem};
use tlgen_core::identity;
use tlgen_core::schema::{self, Location};
use tlgen_core::{AbstractType, Argument, Definition, Primitive, QualifiedName, TypeRef};

fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,10}"
}

fn arb_primitive() -> impl Strategy<Value = Primitive> {
    prop_oneof![
        Just(Primitive::Int),
        Just(Primitive::Long),
        Just(Primitive::Int128),
        Just(Primitive::Int256),
        Just(Primitive::Double),
        Just(Primitive::String),
        Just(Primitive::Bytes),
        Just(Primitive::Bool),
    ]
}

fn arb_type() -> impl Strategy<Value = TypeRef> {
    prop_oneof![
        arb_primitive().prop_map(TypeRef::Primitive),
        "[A-Z][a-zA-Z0-9]{0,8}"
            .prop_filter("primitive spelling", |n| Primitive::from_schema_name(n).is_none())
            .prop_map(|n| TypeRef::Boxed(QualifiedName::parse(&n))),
    ]
}

// Strategy: an argument that is plain, a vector, flagged, or a presence-only flag
fn arb_argument() -> impl Strategy<Value = Argument> {
    (arb_ident(), arb_type(), 0u8..4, any::<bool>(), 0u32..32).prop_map(
        |(name, ty, shape, boxed, bit)| match shape {
            0 => Argument::new(name, ty),
            1 => Argument::new(name, ty).into_vector(boxed),
            2 => Argument::new(name, ty).flagged("flags", bit),
            _ => Argument::new(name, TypeRef::Primitive(Primitive::True)).flagged("flags", bit),
        },
    )
}

fn arb_definition() -> impl Strategy<Value = Definition> {
    (
        prop::option::of(arb_ident()),
        arb_ident(),
        arb_type(),
        prop::collection::vec(arb_argument(), 0..8),
        1u32..4,
        any::<bool>(),
    )
        .prop_map(|(namespace, name, result, args, layer, is_function)| {
            let full_name = match namespace {
                Some(ns) => format!("{ns}.{name}"),
                None => name,
            };
            let mut definition = Definition::new(&full_name, result, is_function, layer);
            if args.iter().any(Argument::is_flag) {
                definition.args.push(Argument::indicator("flags"));
            }
            definition.args.extend(args);
            definition
        })
}

proptest! {
    /// Property: resolving twice, or on a clone, gives the same tag
    #[test]
    fn proptest_resolve_is_deterministic(def in arb_definition()) {
        prop_assert_eq!(identity::resolve(&def), identity::resolve(&def.clone()));
        prop_assert_eq!(identity::resolve(&def), identity::infer_id(&def));
    }

    /// Property: the hashed form never contains angle brackets or braces
    #[test]
    fn proptest_normalized_signature_has_no_brackets(def in arb_definition()) {
        let normalized = identity::normalized_signature(&def);

        prop_assert!(!normalized.contains(['<', '>', '{', '}']), "brackets left in {}", normalized);
        prop_assert!(!normalized.contains("?true"));
    }

    /// Property: parsing a printed signature reproduces the definition and its tag
    #[test]
    fn proptest_parse_signature_agrees_with_printer(def in arb_definition()) {
        let text = identity::signature(&def);
        let location = Location { source_name: "prop.tl", line: 1 };

        let parsed = schema::parse_statement(&text, def.is_function, def.layer, &location)
            .unwrap()
            .unwrap();

        prop_assert_eq!(&parsed, &def);
        prop_assert_eq!(parsed.id(), def.id());
    }

    /// Property: declared fields keep every field argument, flagged ones last
    #[test]
    fn proptest_declaration_fields_flagged_last(def in arb_definition()) {
        let families = [def.family()].into_iter().collect();

        let decl = emit::declare(&def, &families).unwrap();

        let expected = def.args.iter().filter(|a| a.is_field()).count();
        prop_assert_eq!(decl.fields.len(), expected);
        let first_flagged = decl.fields.iter().position(|a| a.is_flag()).unwrap_or(decl.fields.len());
        prop_assert!(decl.fields[first_flagged..].iter().all(|a| a.is_flag()));
        prop_assert!(emit::check_parameter_order(&def, &decl.fields).is_ok());
    }

    /// Property: every block the sequencer opens is closed exactly once
    #[test]
    fn proptest_sequence_is_balanced(defs in prop::collection::vec(arb_definition(), 0..24)) {
        let graph = tlgen_core::graph::build(&defs);

        for partition in [&graph.functions, &graph.types] {
            let items = emit::sequence(partition);
            let mut open: Vec<String> = Vec::new();
            for item in &items {
                match item {
                    SequenceItem::OpenLayer(layer) => open.push(format!("L{layer}")),
                    SequenceItem::OpenNamespace(ns) => open.push(ns.to_string()),
                    SequenceItem::CloseLayer(layer) => {
                        prop_assert_eq!(open.pop(), Some(format!("L{layer}")));
                    }
                    SequenceItem::CloseNamespace(ns) => {
                        prop_assert_eq!(open.pop(), Some(ns.to_string()));
                    }
                    SequenceItem::Declare(_) => {
                        prop_assert!(!open.is_empty());
                    }
                }
            }
            prop_assert!(open.is_empty());
            let declared = items.iter().filter(|i| matches!(i, SequenceItem::Declare(_))).count();
            prop_assert_eq!(declared, partition.len());
        }
    }

    /// Property: abstract families are listed in lexicographic order
    #[test]
    fn proptest_abstracts_sorted(defs in prop::collection::vec(arb_definition(), 0..24)) {
        let graph = tlgen_core::graph::build(&defs);

        let names: Vec<&AbstractType> = graph.types.abstracts().iter().collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(names, sorted);
    }
}
