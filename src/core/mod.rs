// src/core/mod.rs — Engine entry points and the value cache behind them

pub mod cache;
pub mod engine;

pub use cache::ValueCache;
pub use engine::{Benchmark, BenchmarkEntry, ResilienceEngine};
