//! Build pipeline for a single task directory.
//!
//! ```text
//! 1. yarn install --non-interactive
//! 2. yarn tsc
//! 3. make.json externals -> archive installer (optional)
//! ```
//!
//! A failing install or compile aborts the whole run; step 3 only runs once
//! both succeed.

use std::path::Path;

use anyhow::{Context, Result};

use crate::archive;
use crate::manifest::BuildManifest;
use crate::process::Cmd;

/// Build one task directory.
pub fn build_dir(dir: &Path) -> Result<()> {
    install_dependencies(dir)?;
    compile(dir)?;

    let manifest = BuildManifest::load_or_default(dir);
    let packages = manifest.archive_packages();
    if !packages.is_empty() {
        println!("Installing {} archive package(s)...", packages.len());
        archive::install_archives(dir, packages)
            .with_context(|| format!("in {}", dir.display()))?;
    }

    Ok(())
}

fn install_dependencies(dir: &Path) -> Result<()> {
    Cmd::new("yarn")
        .args(["install", "--non-interactive"])
        .current_dir(dir)
        .error_msg(format!("yarn install failed in {}", dir.display()))
        .run_interactive()?;
    Ok(())
}

fn compile(dir: &Path) -> Result<()> {
    Cmd::new("yarn")
        .arg("tsc")
        .current_dir(dir)
        .error_msg(format!("tsc failed in {}", dir.display()))
        .run_interactive()?;
    Ok(())
}
