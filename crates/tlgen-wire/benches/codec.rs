//! Reference codec benchmarks
//!
//! Measures plan-driven encoding and decoding of a flat object, a long boxed
//! vector, and a nested object tree.
//!
//! Run with: cargo bench -p tlgen-wire --bench codec

#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tlgen_core::schema;
use tlgen_wire::{Codec, Object, Registry, TlCodec, Value};

const SCHEMA: &str = "\
pong#347773c5 msg_id:long ping_id:long = Pong;
msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck;
user flags:# id:long name:flags.0?string bot:flags.1?true = User;
users list:Vector<User> = Users;
";

fn codec() -> TlCodec {
    let definitions = schema::parse_tl(SCHEMA, "bench.tl", 1, true).unwrap();
    TlCodec::new(Registry::new(definitions).unwrap())
}

fn object(codec: &TlCodec, name: &str) -> Object {
    let id = codec
        .registry()
        .definitions()
        .iter()
        .find(|d| d.name == name)
        .unwrap()
        .id();
    Object::new(name, id)
}

fn create_pong(codec: &TlCodec) -> Object {
    object(codec, "pong").with("msg_id", 1i64).with("ping_id", 2i64)
}

fn create_ack(codec: &TlCodec, count: usize) -> Object {
    let ids = (0..count as i64).map(Value::Long).collect::<Vec<_>>();
    object(codec, "msgs_ack").with("msg_ids", ids)
}

fn create_users(codec: &TlCodec, count: usize) -> Object {
    let users = (0..count)
        .map(|i| {
            object(codec, "user")
                .with("id", i as i64)
                .with("name", format!("user{i}"))
                .with("bot", i % 2 == 0)
                .into()
        })
        .collect::<Vec<Value>>();
    object(codec, "users").with("list", users)
}

// ============================================================================
// Flat object
// ============================================================================

fn bench_flat(c: &mut Criterion) {
    let codec = codec();
    let pong = create_pong(&codec);
    let bytes = codec.encode(&pong).unwrap();

    let mut group = c.benchmark_group("flat");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| b.iter(|| codec.encode(black_box(&pong))));
    group.bench_function("decode", |b| b.iter(|| codec.decode(black_box(&bytes))));
    group.finish();
}

// ============================================================================
// Boxed vectors
// ============================================================================

fn bench_vectors(c: &mut Criterion) {
    let codec = codec();
    let mut group = c.benchmark_group("vector");

    for count in [16usize, 1024, 65536] {
        let ack = create_ack(&codec, count);
        let bytes = codec.encode(&ack).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", count), &ack, |b, ack| {
            b.iter(|| codec.encode(black_box(ack)))
        });
        group.bench_with_input(BenchmarkId::new("decode", count), &bytes, |b, bytes| {
            b.iter(|| codec.decode(black_box(bytes)))
        });
    }
    group.finish();
}

// ============================================================================
// Nested objects with flags
// ============================================================================

fn bench_nested(c: &mut Criterion) {
    let codec = codec();
    let mut group = c.benchmark_group("nested");

    for count in [10usize, 1000] {
        let users = create_users(&codec, count);
        let bytes = codec.encode(&users).unwrap();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("encode", count), &users, |b, users| {
            b.iter(|| codec.encode(black_box(users)))
        });
        group.bench_with_input(BenchmarkId::new("decode", count), &bytes, |b, bytes| {
            b.iter(|| codec.decode(black_box(bytes)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flat, bench_vectors, bench_nested);
criterion_main!(benches);
