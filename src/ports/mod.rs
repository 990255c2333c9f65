//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the runner and the operating
//! system (time, process creation). Implementations live in `src/adapters/`.

pub mod clock;
pub mod shell;

pub use clock::Clock;
pub use shell::{CommandLine, RunningProcess, ShellExecutor};
