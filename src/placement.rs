//! Placing module artifacts into the work directory.
//!
//! Each runtime module lands at its uri, either as a copy of the artifact
//! file or unpacked into a directory of the same name. Every path written
//! is reported to the [`IncrementalSync`] tracker.

use crate::archive::{self, ArchiveError};
use crate::context::ExecutionContext;
use crate::error::{EarError, Result};
use crate::module::Module;
use crate::sync::IncrementalSync;
use crate::type_map::StandardType;
use camino::Utf8Path;
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::time::SystemTime;

/// How a module ended up in the work directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The artifact file was copied.
    Copied,
    /// The artifact was extracted.
    Unpacked {
        /// Number of entries extracted.
        entries: usize,
    },
    /// The existing copy is newer than the artifact.
    UpToDate,
    /// The artifact already lives at its destination.
    SameFile,
}

/// Parse the configured unpack types.
///
/// # Errors
///
/// Returns [`EarError::InvalidUnpackType`] for the first entry that is not
/// a standard artifact type.
pub fn parse_unpack_types(values: &[String]) -> Result<BTreeSet<StandardType>> {
    values
        .iter()
        .map(|value| {
            value
                .parse::<StandardType>()
                .map_err(|()| EarError::InvalidUnpackType {
                    value: value.clone(),
                    supported: StandardType::supported_list(),
                })
        })
        .collect()
}

/// Return true when `module` is placed unpacked.
///
/// A module of a default unpack type is unpacked unless it opts out; any
/// other module is unpacked only when it opts in.
#[must_use]
pub fn should_unpack(module: &Module, context: &ExecutionContext) -> bool {
    module
        .unpack()
        .unwrap_or_else(|| context.unpacks_by_default(module.standard_type()))
}

/// Place `module` at its uri under `work_dir`.
///
/// Packed copies are skipped when the destination is at least as new as
/// the artifact, unless `refresh` is set. Unpacked modules are always
/// extracted again into an emptied directory, so nothing an earlier build
/// wrote there survives.
///
/// # Errors
///
/// Returns [`EarError::UnresolvedArtifactFile`] when the artifact has no
/// file, [`EarError::SourceIsDirectory`] when it is a directory, and
/// [`EarError::Placement`] when copying or extraction fails.
pub fn place(
    module: &Module,
    context: &ExecutionContext,
    work_dir: &Utf8Path,
    sync: &mut IncrementalSync,
    refresh: bool,
) -> Result<Placement> {
    let source = source_file(module)?;
    let dest = work_dir.join(module.uri());
    let failed = |err: ArchiveError| EarError::Placement {
        module: module.to_string(),
        path: dest.clone(),
        source: err,
    };

    if is_same_file(source, &dest) {
        info!(
            target: "placement",
            "skipping artifact [{module}], as it already exists at [{}]",
            module.uri()
        );
        return Ok(Placement::SameFile);
    }

    if should_unpack(module, context) {
        info!(target: "placement", "copying artifact [{module}] to [{}] (unpacked)", module.uri());
        let entries = unpack(source, &dest, module.uri(), sync).map_err(failed)?;
        return Ok(Placement::Unpacked { entries });
    }

    let placement = if refresh || is_newer(source, &dest) {
        info!(target: "placement", "copying artifact [{module}] to [{}]", module.uri());
        copy(source, &dest).map_err(failed)?;
        Placement::Copied
    } else {
        debug!(
            target: "placement",
            "skipping artifact [{module}], as it is already up to date at [{}]",
            module.uri()
        );
        Placement::UpToDate
    };
    sync.mark_written(module.uri());
    Ok(placement)
}

fn source_file(module: &Module) -> Result<&Utf8Path> {
    let source = module
        .artifact_file()
        .ok_or_else(|| EarError::UnresolvedArtifactFile {
            module: module.to_string(),
        })?;
    if source.is_dir() {
        return Err(EarError::SourceIsDirectory {
            module: module.to_string(),
            path: source.to_owned(),
        });
    }
    if !source.is_file() {
        return Err(EarError::UnresolvedArtifactFile {
            module: module.to_string(),
        });
    }
    Ok(source)
}

fn is_same_file(source: &Utf8Path, dest: &Utf8Path) -> bool {
    match (source.canonicalize_utf8(), dest.canonicalize_utf8()) {
        (Ok(canonical_source), Ok(canonical_dest)) => canonical_source == canonical_dest,
        _ => false,
    }
}

fn modified(path: &Utf8Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

fn is_newer(source: &Utf8Path, dest: &Utf8Path) -> bool {
    match (modified(source), modified(dest)) {
        (Some(source_time), Some(dest_time)) => source_time > dest_time,
        (_, None) => true,
        (None, Some(_)) => false,
    }
}

fn copy(source: &Utf8Path, dest: &Utf8Path) -> std::result::Result<(), ArchiveError> {
    if dest.is_dir() {
        fs::remove_dir_all(dest)?;
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}

fn unpack(
    source: &Utf8Path,
    dest: &Utf8Path,
    uri: &str,
    sync: &mut IncrementalSync,
) -> std::result::Result<usize, ArchiveError> {
    if dest.is_file() {
        fs::remove_file(dest)?;
    } else if dest.is_dir() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;
    archive::extract(source, dest, |entry| {
        sync.mark_written(&format!("{uri}/{entry}"));
    })
}
