pub mod pool;
pub mod sweep;

pub use pool::WorkerPool;
pub use sweep::{export_samples_csv, run_sweep, write_samples, SweepSample, SweepSummary};
