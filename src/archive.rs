//! Third-party archive download and extraction.
//!
//! Each archive package is fetched whole into memory, parsed as a zip
//! container, and extracted entry by entry under the task directory's
//! configured destination.
//!
//! # Entry Safety Filter
//!
//! Before extraction, every entry name is screened:
//!
//! - names containing any of ` #^[]<>?%` are skipped
//! - names ending with a literal `.` are skipped
//! - absolute names and names with `..` segments are skipped
//!
//! A rejected entry produces a `[WARN]` line and processing continues with
//! the next entry. Later entries silently overwrite earlier ones when they
//! map to the same destination path.

use std::fmt;
use std::io::Cursor;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::manifest::ArchivePackage;

/// Characters that disqualify an archive entry name from extraction.
pub const DISALLOWED_CHARS: &[char] = &[' ', '#', '^', '[', ']', '<', '>', '?', '%'];

/// Failure to fetch an archive over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Failure to parse or extract an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("response body is not a valid zip archive: {source}")]
    Container {
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read archive entry '{name}': {source}")]
    Entry {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to extract '{name}': {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Why an entry was rejected by the safety filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Name contains a character from [`DISALLOWED_CHARS`].
    DisallowedChar(char),
    /// Name ends with a literal period.
    TrailingPeriod,
    /// Name is absolute or contains a `..` segment.
    Traversal,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DisallowedChar(c) => {
                write!(f, "it contains a disallowed character ('{}')", c)
            }
            SkipReason::TrailingPeriod => write!(f, "it ends with a period"),
            SkipReason::Traversal => write!(f, "it escapes the destination directory"),
        }
    }
}

/// Apply the Entry Safety Filter to one entry name.
///
/// Returns `Some(reason)` if the entry must be skipped, `None` if it is safe
/// to extract.
pub fn screen_entry_name(name: &str) -> Option<SkipReason> {
    if let Some(c) = name.chars().find(|c| DISALLOWED_CHARS.contains(c)) {
        return Some(SkipReason::DisallowedChar(c));
    }
    if name.ends_with('.') {
        return Some(SkipReason::TrailingPeriod);
    }
    let path = Path::new(name);
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Some(SkipReason::Traversal);
    }
    None
}

/// Install every archive package into `work_dir`, in declaration order.
pub fn install_archives(work_dir: &Path, packages: &[ArchivePackage]) -> Result<()> {
    for pkg in packages {
        install_archive(work_dir, pkg)
            .with_context(|| format!("installing archive package {}", pkg.url))?;
    }
    Ok(())
}

/// Fetch one archive package and extract it under `work_dir/<dest>`.
pub fn install_archive(work_dir: &Path, pkg: &ArchivePackage) -> Result<()> {
    println!("Fetching {}...", pkg.url);
    let body = fetch(&pkg.url)?;

    let dest = work_dir.join(&pkg.dest);
    unpack(&body, &dest)?;
    Ok(())
}

/// Fetch a URL, returning the whole response body.
fn fetch(url: &str) -> Result<Vec<u8>, FetchError> {
    let response = reqwest::blocking::get(url).map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;
    Ok(body.to_vec())
}

/// Extract a zip container into `dest`, applying the Entry Safety Filter.
///
/// Entries are processed in container order; a filtered entry is reported
/// and skipped, never fatal.
pub fn unpack(bytes: &[u8], dest: &Path) -> Result<(), ArchiveError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|source| ArchiveError::Container { source })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| ArchiveError::Entry {
            name: format!("#{}", i),
            source,
        })?;
        let name = entry.name().to_string();

        if let Some(reason) = screen_entry_name(&name) {
            println!("  [WARN] ignoring {} because {}", name, reason);
            continue;
        }

        let out_path = dest.join(&name);
        let write = |source| ArchiveError::Write {
            name: name.clone(),
            source,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(write)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(write)?;
        }
        let mut out = std::fs::File::create(&out_path).map_err(write)?;
        std::io::copy(&mut entry, &mut out).map_err(write)?;
    }

    Ok(())
}
