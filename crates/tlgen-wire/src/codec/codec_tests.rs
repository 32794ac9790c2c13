#![allow(non_snake_case)]

use super::*;
use tlgen_core::schema;

const SCHEMA: &str = "\
pong#347773c5 msg_id:long ping_id:long = Pong;
msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck;
ids count:int values:vector<int> = Ids;
user flags:# id:long name:flags.0?string bot:flags.1?true tags:flags.2?Vector<string> = User;
wrapper inner:pong note:string = Wrapper;
holder pong:Pong = Holder;
config ok:Bool hash:int128 ratio:double = Config;
---functions---
ping#7abe77ec ping_id:long = Pong;
invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X;
";

fn codec() -> TlCodec {
    let definitions = schema::parse_tl(SCHEMA, "test.tl", 1, true).unwrap();
    TlCodec::new(Registry::new(definitions).unwrap())
}

fn object(codec: &TlCodec, name: &str) -> Object {
    let definition = codec
        .registry()
        .definitions()
        .iter()
        .find(|d| d.full_name() == name)
        .unwrap();
    Object::new(name, definition.id())
}

fn words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn TlCodec___encode_ping___tag_then_field() {
    let codec = codec();
    let ping = object(&codec, "ping").with("ping_id", 0x0102_0304_0506_0708i64);

    let bytes = codec.encode(&ping).unwrap();

    assert_eq!(
        bytes,
        vec![0xec, 0x77, 0xbe, 0x7a, 8, 7, 6, 5, 4, 3, 2, 1]
    );
}

#[test]
fn TlCodec___scalar_object___decodes_to_same_value() {
    let codec = codec();
    let pong = object(&codec, "pong").with("msg_id", 11i64).with("ping_id", -3i64);

    let decoded = codec.decode(&codec.encode(&pong).unwrap()).unwrap();

    assert_eq!(decoded, pong);
}

#[test]
fn TlCodec___boxed_vector___writes_vector_tag_and_count() {
    let codec = codec();
    let ack = object(&codec, "msgs_ack").with(
        "msg_ids",
        vec![Value::Long(1), Value::Long(2), Value::Long(3)],
    );

    let bytes = codec.encode(&ack).unwrap();

    assert_eq!(
        words(&bytes),
        vec![0x62d6b459, 0x1cb5c415, 3, 1, 0, 2, 0, 3, 0]
    );
    assert_eq!(codec.decode(&bytes).unwrap(), ack);
}

#[test]
fn TlCodec___bare_vector___omits_vector_tag() {
    let codec = codec();
    let ids = object(&codec, "ids")
        .with("count", 3)
        .with("values", vec![Value::Int(7), Value::Int(8), Value::Int(9)]);

    let bytes = codec.encode(&ids).unwrap();

    assert_eq!(&words(&bytes)[1..], &[3, 3, 7, 8, 9]);
    assert_eq!(codec.decode(&bytes).unwrap(), ids);
}

#[test]
fn TlCodec___flags___mask_reflects_present_fields() {
    let codec = codec();
    let user = object(&codec, "user").with("id", 5i64).with("bot", true);

    let bytes = codec.encode(&user).unwrap();

    assert_eq!(words(&bytes)[1], 0b010);
    assert_eq!(bytes.len(), 4 + 4 + 8);
    let decoded = codec.decode(&bytes).unwrap();
    assert_eq!(decoded.get("bot"), Some(&Value::True));
    assert_eq!(decoded.get("name"), None);
    assert_eq!(decoded.get("tags"), None);
}

#[test]
fn TlCodec___flags___presence_false_clears_bit() {
    let codec = codec();
    let user = object(&codec, "user")
        .with("id", 5i64)
        .with("bot", false)
        .with("name", "bob");

    let bytes = codec.encode(&user).unwrap();

    assert_eq!(words(&bytes)[1], 0b001);
    let decoded = codec.decode(&bytes).unwrap();
    assert_eq!(decoded.get("name"), Some(&Value::from("bob")));
    assert_eq!(decoded.get("bot"), None);
}

#[test]
fn TlCodec___flagged_vector___round_trips() {
    let codec = codec();
    let user = object(&codec, "user")
        .with("id", 1i64)
        .with("tags", vec![Value::from("a"), Value::from("b")]);

    let decoded = codec.decode(&codec.encode(&user).unwrap()).unwrap();

    assert_eq!(decoded, user);
}

#[test]
fn TlCodec___bare_object_field___has_no_tag() {
    let codec = codec();
    let inner = object(&codec, "pong").with("msg_id", 1i64).with("ping_id", 2i64);
    let wrapper = object(&codec, "wrapper").with("inner", inner).with("note", "");

    let bytes = codec.encode(&wrapper).unwrap();

    assert_eq!(bytes.len(), 4 + 16 + 4);
    assert_eq!(codec.decode(&bytes).unwrap(), wrapper);
}

#[test]
fn TlCodec___generic_query___dispatches_on_inner_tag() {
    let codec = codec();
    let ping = object(&codec, "ping").with("ping_id", 9i64);
    let invoke = object(&codec, "invokeWithLayer").with("layer", 1).with("query", ping);

    let bytes = codec.encode(&invoke).unwrap();

    assert_eq!(words(&bytes)[..3], [0xda9b0d0d, 1, 0x7abe77ec]);
    assert_eq!(codec.decode(&bytes).unwrap(), invoke);
}

#[test]
fn TlCodec___primitives___round_trip() {
    let codec = codec();
    let config = object(&codec, "config")
        .with("ok", true)
        .with("hash", Value::Int128([7; 16]))
        .with("ratio", 0.25f64);

    let decoded = codec.decode(&codec.encode(&config).unwrap()).unwrap();

    assert_eq!(decoded, config);
}

#[test]
fn TlCodec___unknown_nested_tag___fails_enclosing_read() {
    let codec = codec();
    let mut bytes = object(&codec, "holder").id.to_le_bytes().to_vec();
    bytes.extend_from_slice(&0xdeadbeefu32.to_le_bytes());

    let err = codec.decode(&bytes).unwrap_err();

    assert!(matches!(
        &err,
        WireError::InField { definition, field, .. } if definition == "holder" && field == "pong"
    ));
    assert!(matches!(err.root_cause(), WireError::UnknownConstructor(0xdeadbeef)));
}

#[test]
fn TlCodec___wrong_family_in_field___is_unexpected_constructor() {
    let codec = codec();
    let ack = object(&codec, "msgs_ack").with("msg_ids", Vec::<Value>::new());
    let holder = object(&codec, "holder").with("pong", ack);

    let bytes = codec.encode(&holder).unwrap();
    let err = codec.decode(&bytes).unwrap_err();

    assert!(matches!(
        err.root_cause(),
        WireError::UnexpectedConstructor { found, expected, .. }
            if found == "msgs_ack" && expected == "Pong"
    ));
}

#[test]
fn TlCodec___missing_required_field___fails_encode() {
    let codec = codec();
    let pong = object(&codec, "pong").with("msg_id", 1i64);

    let err = codec.encode(&pong).unwrap_err();

    assert!(matches!(
        err,
        WireError::MissingField { ref definition, ref field } if definition == "pong" && field == "ping_id"
    ));
}

#[test]
fn TlCodec___wrong_value_shape___is_type_mismatch_in_field() {
    let codec = codec();
    let pong = object(&codec, "pong").with("msg_id", "x").with("ping_id", 1i64);

    let err = codec.encode(&pong).unwrap_err();

    assert_eq!(err.to_string(), "`pong.msg_id`: expected long, found string");
}

#[test]
fn TlCodec___trailing_bytes___rejected_by_decode() {
    let codec = codec();
    let mut bytes = codec
        .encode(&object(&codec, "ping").with("ping_id", 1i64))
        .unwrap();
    bytes.extend_from_slice(&[0, 0, 0, 0]);

    assert!(matches!(codec.decode(&bytes).unwrap_err(), WireError::TrailingBytes(4)));
    assert_eq!(codec.decode_prefix(&bytes).unwrap().1, 12);
}

#[test]
fn TlCodec___vector_count_beyond_input___is_eof_without_allocating() {
    let codec = codec();
    let bytes: Vec<u8> = [0x62d6b459u32, 0x1cb5c415, u32::MAX]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();

    let err = codec.decode(&bytes).unwrap_err();

    assert!(matches!(err.root_cause(), WireError::UnexpectedEof { .. }));
}

#[test]
fn TlCodec___true_vector_count_beyond_input___is_eof() {
    let definitions = schema::parse_tl("marks items:Vector<true> = Marks;", "test.tl", 1, true).unwrap();
    let tag = definitions[0].id();
    let codec = TlCodec::new(Registry::new(definitions).unwrap());
    let bytes: Vec<u8> = [tag, 0x1cb5c415, u32::MAX]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();

    let err = codec.decode(&bytes).unwrap_err();

    assert!(matches!(err.root_cause(), WireError::UnexpectedEof { .. }));
}

fn rich_text(depth: usize) -> (TlCodec, Vec<u8>) {
    let definitions = schema::parse_tl(
        "textBold text:RichText = RichText;\ntextPlain = RichText;",
        "test.tl",
        1,
        true,
    )
    .unwrap();
    let bold = definitions[0].id();
    let plain = definitions[1].id();
    let mut writer = TlWriter::new();
    for _ in 0..depth {
        writer.write_u32(bold);
    }
    writer.write_u32(plain);
    (TlCodec::new(Registry::new(definitions).unwrap()), writer.into_bytes())
}

#[test]
fn TlCodec___nesting_within_limit___decodes() {
    let (codec, bytes) = rich_text(MAX_DEPTH - 1);

    let decoded = codec.decode(&bytes).unwrap();

    assert_eq!(decoded.name, "textBold");
}

#[test]
fn TlCodec___nesting_past_limit___is_too_deep() {
    let (codec, bytes) = rich_text(10_000);

    let err = codec.decode(&bytes).unwrap_err();

    assert!(matches!(err.root_cause(), WireError::TooDeep { limit: MAX_DEPTH }));
    assert_eq!(err.error_code(), 30);
}

#[test]
fn TlCodec___percent_family_vector___decodes_bare_elements() {
    let definitions = schema::parse_tl(
        "message msg_id:long body:int = Message;\n\
         msg_container#73f1f8dc messages:vector<%Message> = MessageContainer;",
        "test.tl",
        1,
        true,
    )
    .unwrap();
    let message_tag = definitions[0].id();
    let codec = TlCodec::new(Registry::new(definitions).unwrap());
    let message = Object::new("message", message_tag).with("msg_id", 7i64).with("body", 9i32);
    let container = Object::new("msg_container", 0x73f1f8dc)
        .with("messages", vec![Value::from(message.clone())]);

    let bytes = codec.encode(&container).unwrap();

    assert_eq!(words(&bytes), vec![0x73f1f8dc, 1, 7, 0, 9]);
    assert_eq!(codec.decode(&bytes).unwrap(), container);
}

#[test]
fn TlCodec___encode_unregistered_object___is_unknown_constructor() {
    let codec = codec();

    let err = codec.encode(&Object::new("nope", 1)).unwrap_err();

    assert!(matches!(err, WireError::UnknownConstructor(1)));
}
