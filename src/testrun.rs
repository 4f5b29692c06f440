//! Test pipeline for a single task directory.

use std::path::Path;

use anyhow::Result;

use crate::process::Cmd;

/// Entry file of each task's mocha suite, relative to the task directory.
pub const SUITE_ENTRY: &str = "tests/_suite.js";

/// Run the mocha suite of one task directory.
pub fn test_dir(dir: &Path) -> Result<()> {
    Cmd::new("mocha")
        .arg_path(Path::new(SUITE_ENTRY))
        .current_dir(dir)
        .error_msg(format!("tests failed in {}", dir.display()))
        .run_interactive()?;
    Ok(())
}
