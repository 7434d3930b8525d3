// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for moving tensors in and out of numpy.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use python_bridge::convert;
use python_bridge::ExecutionLock;
use tensor_core::{DefaultTensorAllocator, Shape, Tensor, TensorAllocator};

const SIZES: [usize; 3] = [1_000, 100_000, 1_000_000];

fn numpy_lock() -> Option<ExecutionLock> {
    pyo3::prepare_freethreaded_python();
    let lock = ExecutionLock::new();
    if lock.run(|py| py.import_bound("numpy").is_err()) {
        eprintln!("numpy not importable, skipping");
        return None;
    }
    Some(lock)
}

fn bench_to_numpy(c: &mut Criterion) {
    let Some(lock) = numpy_lock() else { return };
    let mut group = c.benchmark_group("to_numpy");
    for n in SIZES {
        let tensor = Tensor::from_values(Shape::vector(n), &vec![1.0f32; n]).unwrap();
        group.throughput(Throughput::Bytes((n * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &tensor, |b, t| {
            b.iter(|| lock.run(|py| convert::tensor_to_numpy(py, black_box(t)).map(drop).unwrap()))
        });
    }
    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let Some(lock) = numpy_lock() else { return };
    let mut group = c.benchmark_group("numpy_roundtrip");
    for n in SIZES {
        let tensor = Tensor::from_values(Shape::vector(n), &vec![1i64; n]).unwrap();
        group.throughput(Throughput::Bytes((n * 8) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &tensor, |b, t| {
            b.iter(|| {
                let staged = lock.run(|py| {
                    let outputs = PyDict::new_bound(py);
                    outputs
                        .set_item("x", convert::tensor_to_numpy(py, t).unwrap())
                        .unwrap();
                    convert::stage_outputs(py, &outputs).unwrap()
                });
                DefaultTensorAllocator.from_native_container(staged).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_strings(c: &mut Criterion) {
    let Some(lock) = numpy_lock() else { return };
    let words: Vec<String> = (0..10_000).map(|i| format!("token-{i}")).collect();
    let tensor = Tensor::from_strings(Shape::vector(words.len()), words).unwrap();
    c.bench_function("to_numpy_strings_10k", |b| {
        b.iter(|| lock.run(|py| convert::tensor_to_numpy(py, black_box(&tensor)).map(drop).unwrap()))
    });
}

criterion_group!(benches, bench_to_numpy, bench_roundtrip, bench_strings);
criterion_main!(benches);
