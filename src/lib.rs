//! Build orchestration library for extension task directories.
//!
//! The binary reads `vss-extension.json` for the list of task directories
//! and runs the build or test pipeline against each one in order.

pub mod archive;
pub mod build;
pub mod manifest;
pub mod preflight;
pub mod process;
pub mod testrun;

use std::time::Instant;

/// Simple wall-clock timer for printed build phases.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Start timing a phase.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Print the elapsed time for this phase.
    pub fn finish(self) {
        let secs = self.start.elapsed().as_secs_f64();
        if secs >= 60.0 {
            println!("  [{}: {:.1}m]", self.label, secs / 60.0);
        } else {
            println!("  [{}: {:.1}s]", self.label, secs);
        }
    }
}
