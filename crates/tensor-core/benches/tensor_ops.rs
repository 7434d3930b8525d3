// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for tensor construction and JSON conversion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tensor_core::json::{values_from_json, values_to_json};
use tensor_core::{DefaultTensorAllocator, RawTensor, Shape, Tensor, TensorAllocator, TensorData, ValueMap};

fn bench_from_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_values");
    for n in [1_000usize, 100_000, 1_000_000] {
        let values = vec![0.5f32; n];
        group.throughput(Throughput::Bytes((n * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, v| {
            b.iter(|| Tensor::from_values(Shape::vector(v.len()), black_box(v)).unwrap())
        });
    }
    group.finish();
}

fn bench_allocate(c: &mut Criterion) {
    let n = 1_000_000usize;
    c.bench_function("allocate_1m_f32", |b| {
        b.iter(|| {
            let raw = RawTensor {
                name: "x".into(),
                dtype: tensor_core::DType::Float32,
                shape: vec![n],
                data: TensorData::Bytes(vec![0u8; n * 4]),
            };
            DefaultTensorAllocator.from_native_container(vec![raw]).unwrap()
        })
    });
}

fn bench_json(c: &mut Criterion) {
    let mut values = ValueMap::new();
    values.insert(
        "x".into(),
        Tensor::from_values(Shape::matrix(100, 100), &vec![1.25f64; 10_000]).unwrap(),
    );
    let json = values_to_json(&values).unwrap().to_string();

    c.bench_function("values_to_json_10k", |b| b.iter(|| values_to_json(black_box(&values)).unwrap()));
    c.bench_function("values_from_json_10k", |b| b.iter(|| values_from_json(black_box(&json)).unwrap()));
}

criterion_group!(benches, bench_from_values, bench_allocate, bench_json);
criterion_main!(benches);
