//! Benchmarks for the low-level readers: compressed integers, signature blobs and heaps.

use criterion::{criterion_group, criterion_main, Criterion};
use cilreader::{
    metadata::{
        signatures::{parse_method_signature, parse_type_spec_signature},
        streams::{Blob, Strings},
    },
    Parser,
};
use std::hint::black_box;

/// One-, two- and four-byte encodings, repeated.
fn bench_compressed_uint(c: &mut Criterion) {
    let data: Vec<u8> = [0x03u8, 0xBF, 0xFF, 0xC0, 0x00, 0x40, 0x00]
        .iter()
        .copied()
        .cycle()
        .take(7 * 256)
        .collect();

    c.bench_function("compressed_uint", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(&data));
            let mut sum = 0u64;
            while parser.has_more_data() {
                sum += u64::from(parser.read_compressed_uint().unwrap());
            }
            black_box(sum)
        });
    });
}

/// `instance int32 M(int32, string, bool)`
fn bench_method_signature(c: &mut Criterion) {
    let signature = [0x20, 0x03, 0x08, 0x08, 0x0E, 0x02];

    c.bench_function("sig_method_primitives", |b| {
        b.iter(|| black_box(parse_method_signature(black_box(&signature)).unwrap()));
    });
}

/// `class Dictionary<string, class List<int32>>` through TypeDefOrRef tokens.
fn bench_generic_type_spec(c: &mut Criterion) {
    let signature = [0x15, 0x12, 0x09, 0x02, 0x0E, 0x15, 0x12, 0x0D, 0x01, 0x08];

    c.bench_function("sig_typespec_nested_generic", |b| {
        b.iter(|| black_box(parse_type_spec_signature(black_box(&signature)).unwrap()));
    });
}

fn string_heap(count: usize) -> (Vec<u8>, Vec<u32>) {
    let mut data = vec![0u8];
    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        offsets.push(data.len() as u32);
        data.extend_from_slice(format!("Namespace{}.Type{}", i % 17, i).as_bytes());
        data.push(0);
    }
    (data, offsets)
}

/// First lookups decode and cache, later ones hit the cache.
fn bench_strings_heap(c: &mut Criterion) {
    let (data, offsets) = string_heap(1024);
    let strings = Strings::from(data).unwrap();

    c.bench_function("strings_heap_get", |b| {
        b.iter(|| {
            for &offset in &offsets {
                black_box(strings.get(black_box(offset)).unwrap());
            }
        });
    });
}

fn bench_blob_heap(c: &mut Criterion) {
    let mut data = vec![0u8];
    let mut offsets = Vec::new();
    for i in 0..512u32 {
        offsets.push(data.len() as u32);
        data.push(5);
        data.extend_from_slice(&[0x20, 0x02, 0x01, 0x08, (i % 0x0E) as u8 + 2]);
    }
    let blob = Blob::from(data).unwrap();

    c.bench_function("blob_heap_get", |b| {
        b.iter(|| {
            for &offset in &offsets {
                black_box(blob.get(black_box(offset)).unwrap().remaining());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_compressed_uint,
    bench_method_signature,
    bench_generic_type_spec,
    bench_strings_heap,
    bench_blob_heap
);
criterion_main!(benches);
