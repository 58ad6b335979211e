//! Benchmarks for low-level DSP primitives.

mod interpolate;

pub use interpolate::bench_interpolate;
