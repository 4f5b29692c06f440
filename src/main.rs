//! Extension task build orchestrator CLI.
//!
//! Reads `vss-extension.json` in the current directory for the ordered list
//! of task directories and runs the selected pipeline against each one.
//!
//! # Usage
//!
//! ```bash
//! # Install dependencies, compile, and unpack external archives
//! extmake build
//!
//! # Run every task's mocha suite
//! extmake test
//!
//! # Show manifest and host tool status
//! extmake status
//! ```
//!
//! Task directories are processed strictly in manifest order; the first
//! failure aborts the remaining directories.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;

use extmake::manifest::{BuildManifest, ProjectManifest};
use extmake::{build, preflight, testrun, Timer};

#[derive(Parser)]
#[command(name = "extmake")]
#[command(author, version, about = "Build and test orchestrator for extension tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install dependencies, compile, and unpack external archives
    Build,

    /// Run each task's test suite
    Test,

    /// Show manifest and host tool status
    Status,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build => cmd_build(),
        Commands::Test => cmd_test(),
        Commands::Status => cmd_status(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load the project manifest and run `handler` against every task directory
/// in manifest order, aborting on the first failure.
fn for_each_task_dir(handler: impl Fn(&Path) -> Result<()>) -> Result<()> {
    let root = std::env::current_dir().context("cannot determine current directory")?;
    let manifest = ProjectManifest::load(&root)?;
    run_handlers(&root, &manifest, handler)
}

/// Run `handler` against every listed directory, strictly in manifest order.
/// The first failure propagates; remaining directories are never visited.
fn run_handlers(
    root: &Path,
    manifest: &ProjectManifest,
    handler: impl Fn(&Path) -> Result<()>,
) -> Result<()> {
    for dir in manifest.task_dirs() {
        handler(&root.join(dir)).with_context(|| format!("in task directory '{}'", dir))?;
    }
    Ok(())
}

fn cmd_build() -> Result<()> {
    let build_start = std::time::Instant::now();

    for_each_task_dir(|dir| {
        println!("=== Building {} ===", dir.display());
        let t = Timer::start("build");
        build::build_dir(dir)?;
        t.finish();
        println!();
        Ok(())
    })?;

    println!("=== Build Complete ({:.1}s) ===", build_start.elapsed().as_secs_f64());
    Ok(())
}

fn cmd_test() -> Result<()> {
    for_each_task_dir(|dir| {
        println!("=== Testing {} ===", dir.display());
        testrun::test_dir(dir)?;
        println!();
        Ok(())
    })
}

fn cmd_status() -> Result<()> {
    let root = std::env::current_dir().context("cannot determine current directory")?;

    println!("extmake status");
    println!("==============");
    println!();

    println!("Host tools:");
    preflight::print_report(&preflight::check_host_tools());
    println!();

    println!("Task directories:");
    match ProjectManifest::load(&root) {
        Ok(manifest) => {
            for dir in manifest.task_dirs() {
                let path = root.join(dir);
                print_dir_status(dir, &path);
            }
        }
        Err(e) => println!("  [FAIL] {}", e),
    }

    Ok(())
}

fn print_dir_status(name: &str, path: &Path) {
    if !path.exists() {
        println!("  [MISSING]   {}", name);
        return;
    }

    let externals = BuildManifest::load_or_default(path);
    let packages = externals.archive_packages();
    if packages.is_empty() {
        println!("  [ok]        {}", name);
    } else {
        println!("  [ok]        {} ({} archive package(s))", name, packages.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extmake::manifest::FileEntry;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn manifest_of(dirs: &[&str]) -> ProjectManifest {
        ProjectManifest {
            files: dirs
                .iter()
                .map(|d| FileEntry { path: d.to_string() })
                .collect(),
        }
    }

    #[test]
    fn test_first_failure_aborts_remaining_dirs() {
        let manifest = manifest_of(&["first", "second"]);
        let visited = RefCell::new(Vec::new());

        let result = run_handlers(Path::new("/repo"), &manifest, |dir| {
            visited.borrow_mut().push(dir.to_path_buf());
            anyhow::bail!("boom")
        });

        assert!(result.is_err());
        assert_eq!(*visited.borrow(), [PathBuf::from("/repo/first")]);
    }

    #[test]
    fn test_all_dirs_visited_in_manifest_order() {
        let manifest = manifest_of(&["b", "a", "c"]);
        let visited = RefCell::new(Vec::new());

        run_handlers(Path::new("/repo"), &manifest, |dir| {
            visited.borrow_mut().push(dir.to_path_buf());
            Ok(())
        })
        .unwrap();

        assert_eq!(
            *visited.borrow(),
            ["/repo/b", "/repo/a", "/repo/c"].map(PathBuf::from)
        );
    }
}
