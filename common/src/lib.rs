pub mod config;
pub mod metric;
pub mod plot;
pub mod record;
pub mod series;
pub mod util;

/// Thread counts the STM benchmarks are usually run at
pub const DEFAULT_THREAD_TICKS: &[u32] = &[1, 4, 8, 16, 24, 32, 40, 48, 64, 72];
