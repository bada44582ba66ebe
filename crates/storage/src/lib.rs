#![forbid(unsafe_code)]

mod memory;
mod simulator;

pub use memory::{DEFAULT_RESULTS_BASE_URL, MemoryBackend, ResultManifest};
pub use simulator::Simulator;
