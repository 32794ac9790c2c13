#![allow(non_snake_case)]

use super::*;
use crate::model::QualifiedName;

fn boxed(name: &str) -> TypeRef {
    TypeRef::Boxed(QualifiedName::parse(name))
}

fn ping() -> Definition {
    Definition::new("ping", boxed("Pong"), true, 1)
        .with_arg(Argument::new("ping_id", TypeRef::Primitive(Primitive::Long)))
}

fn step_names(steps: &[WireStep<'_>]) -> Vec<String> {
    steps
        .iter()
        .map(|step| match step {
            WireStep::Tag(id) => format!("tag {id:#010x}"),
            WireStep::FlagMask { indicator, .. } => format!("mask {}", indicator.name),
            WireStep::Field { arg, .. } => arg.name.clone(),
        })
        .collect()
}

#[test]
fn write_plan___ping___tag_then_field() {
    let def = ping();

    let steps = write_plan(&def);

    assert_eq!(step_names(&steps), vec!["tag 0x7abe77ec", "ping_id"]);
    assert!(matches!(
        steps[1],
        WireStep::Field {
            encoding: Encoding::Scalar,
            presence: None,
            ..
        }
    ));
}

#[test]
fn read_plan___ping___omits_tag() {
    let def = ping();

    assert_eq!(step_names(&read_plan(&def)), vec!["ping_id"]);
}

#[test]
fn write_plan___pong_with_message___fields_follow_schema_order() {
    let def = Definition::new("pong", boxed("Pong"), false, 1)
        .with_arg(Argument::new("ping_id", TypeRef::Primitive(Primitive::Long)))
        .with_arg(Argument::new("message", TypeRef::Primitive(Primitive::String)));

    let names = step_names(&write_plan(&def));

    assert_eq!(names[1..], ["ping_id", "message"]);
}

#[test]
fn body_plan___flags___mask_at_indicator_position_with_members() {
    let def = Definition::new("messages.sendMessage", boxed("Updates"), true, 71)
        .with_arg(Argument::indicator("flags"))
        .with_arg(Argument::new("silent", TypeRef::Primitive(Primitive::True)).flagged("flags", 5))
        .with_arg(Argument::new("peer", boxed("InputPeer")))
        .with_arg(Argument::new("reply_to_msg_id", TypeRef::Primitive(Primitive::Int)).flagged("flags", 0));

    let steps = body_plan(&def);

    assert_eq!(
        step_names(&steps),
        vec!["mask flags", "silent", "peer", "reply_to_msg_id"]
    );
    match &steps[0] {
        WireStep::FlagMask { members, .. } => {
            let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["silent", "reply_to_msg_id"]);
        }
        other => panic!("unexpected step: {other:?}"),
    }
    assert!(matches!(
        steps[1],
        WireStep::Field {
            encoding: Encoding::PresenceOnly,
            presence: Some(FlagBit { index: 5, .. }),
            ..
        }
    ));
    assert!(!steps[1].is_on_wire());
    assert!(steps[3].is_on_wire());
}

#[test]
fn body_plan___vectors___boxed_and_bare_encodings() {
    let def = Definition::new("lists", boxed("Lists"), false, 1)
        .with_arg(Argument::new("boxed_ids", TypeRef::Primitive(Primitive::Long)).into_vector(true))
        .with_arg(Argument::new("bare_ids", TypeRef::Primitive(Primitive::Long)).into_vector(false));

    let encodings: Vec<Encoding> = body_plan(&def)
        .into_iter()
        .filter_map(|step| match step {
            WireStep::Field { encoding, .. } => Some(encoding),
            _ => None,
        })
        .collect();

    assert_eq!(
        encodings,
        vec![
            Encoding::Vector { boxed: true },
            Encoding::Vector { boxed: false }
        ]
    );
}

#[test]
fn body_plan___generic_placeholder___skipped() {
    let mut query = Argument::new("query", TypeRef::Generic("X".into()));
    query.generic_ref = true;
    let def = Definition::new("invokeWithLayer", TypeRef::Generic("X".into()), true, 71)
        .with_arg(Argument::generic_definition("X"))
        .with_arg(Argument::new("layer", TypeRef::Primitive(Primitive::Int)))
        .with_arg(query);

    assert_eq!(step_names(&body_plan(&def)), vec!["layer", "query"]);
}

#[test]
fn WireStep___is_on_wire___unflagged_true_has_no_bytes() {
    let def = Definition::new("marker", boxed("Marker"), false, 1)
        .with_arg(Argument::new("ok", TypeRef::Primitive(Primitive::True)));

    let steps = body_plan(&def);

    assert!(!steps[0].is_on_wire());
}
