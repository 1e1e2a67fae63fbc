//! Stale file detection for incremental builds.
//!
//! Before anything is written, [`IncrementalSync::capture`] records every
//! file already present in the work directory. Each stage that produces a
//! file marks it as written. Whatever is still recorded at the end was left
//! over from an earlier build and is deleted, unless it was modified after
//! the current build started.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Tracks the work directory's files that have not been rewritten yet.
#[derive(Debug, Clone)]
pub struct IncrementalSync {
    work_dir: Utf8PathBuf,
    outdated: BTreeSet<Utf8PathBuf>,
}

impl IncrementalSync {
    /// Record every file currently under `work_dir`.
    ///
    /// A missing work directory yields an empty set. Enumeration failures
    /// are logged and also yield an empty set, so nothing is deleted.
    #[must_use]
    pub fn capture(work_dir: &Utf8Path) -> Self {
        let outdated = if work_dir.exists() {
            enumerate(work_dir).unwrap_or_else(|reason| {
                warn!(
                    target: "sync",
                    "unable to list existing files in {work_dir}: {reason}; stale files will not be removed"
                );
                BTreeSet::new()
            })
        } else {
            BTreeSet::new()
        };
        debug!(target: "sync", "{} existing file(s) in {work_dir}", outdated.len());
        Self {
            work_dir: work_dir.to_owned(),
            outdated,
        }
    }

    /// Return the tracked work directory.
    #[must_use]
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work_dir
    }

    /// Mark a work-relative path as written during this build.
    ///
    /// Returns true when the path had been recorded.
    pub fn mark_written(&mut self, relative: &str) -> bool {
        let key = normalise(relative);
        let removed = self.outdated.remove(key.as_path());
        if removed {
            debug!(target: "sync", "{key} was rewritten");
        }
        removed
    }

    /// Mark an absolute path under the work directory as written.
    pub fn mark_written_path(&mut self, path: &Utf8Path) -> bool {
        path.strip_prefix(&self.work_dir)
            .is_ok_and(|relative| self.mark_written(relative.as_str()))
    }

    /// Iterate over the paths not written so far.
    pub fn outdated(&self) -> impl Iterator<Item = &Utf8Path> {
        self.outdated.iter().map(Utf8PathBuf::as_path)
    }

    /// Delete outdated files last modified before `build_start`.
    ///
    /// Files touched after the build started are kept. Deletion failures are
    /// logged and skipped. Returns the deleted paths.
    pub fn delete_outdated(self, build_start: SystemTime) -> Vec<Utf8PathBuf> {
        let mut deleted = Vec::new();
        for relative in self.outdated {
            let path = self.work_dir.join(&relative);
            let Ok(modified) = fs::metadata(&path).and_then(|metadata| metadata.modified()) else {
                continue;
            };
            if modified >= build_start {
                debug!(target: "sync", "keeping {relative}, modified during this build");
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!(target: "sync", "deleting outdated resource {relative}");
                    deleted.push(relative);
                }
                Err(err) => warn!(target: "sync", "unable to delete outdated resource {relative}: {err}"),
            }
        }
        deleted
    }
}

fn normalise(relative: &str) -> Utf8PathBuf {
    let cleaned = relative.replace('\\', "/");
    Utf8Path::new(cleaned.trim_start_matches('/'))
        .components()
        .filter(|component| !matches!(component, camino::Utf8Component::CurDir))
        .collect()
}

fn enumerate(work_dir: &Utf8Path) -> Result<BTreeSet<Utf8PathBuf>, String> {
    if !work_dir.is_dir() {
        return Err("not a directory".to_owned());
    }
    let mut files = BTreeSet::new();
    for walked in WalkDir::new(work_dir).min_depth(1) {
        let entry = walked.map_err(|err| err.to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }
        let stripped = entry
            .path()
            .strip_prefix(work_dir)
            .map_err(|err| err.to_string())?;
        let relative = Utf8Path::from_path(stripped)
            .ok_or_else(|| format!("non UTF-8 path {}", stripped.display()))?;
        files.insert(normalise(relative.as_str()));
    }
    Ok(files)
}
