//! Zip primitives: extraction with traversal checks and archive creation.
//!
//! Both operations work on archive-relative paths with forward slashes, the
//! same form the incremental sync tracker records.

use crate::filter::PathFilter;
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Errors arising from reading or writing archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error while reading or writing archive contents.
    #[error("archive I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip structure is invalid or unsupported.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry attempts to escape the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },

    /// A walked path is not valid UTF-8.
    #[error("non UTF-8 path under {root}")]
    NonUtf8Path {
        /// Directory being archived.
        root: Utf8PathBuf,
    },
}

/// Extract `archive` into `dest`, reporting each entry to `on_entry`.
///
/// `on_entry` receives the entry's path relative to `dest`, without a
/// trailing slash, for directories and files alike. Returns the number of
/// entries written.
///
/// # Errors
///
/// Returns [`ArchiveError::PathTraversal`] for absolute or `..` entries,
/// before anything outside `dest` is touched, and I/O or zip errors
/// otherwise.
pub fn extract(
    archive: &Utf8Path,
    dest: &Utf8Path,
    mut on_entry: impl FnMut(&str),
) -> Result<usize, ArchiveError> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    fs::create_dir_all(dest)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().trim_end_matches('/').to_owned();
        validate_entry_name(&name)?;
        if name.is_empty() {
            continue;
        }

        let target = dest.join(&name);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = BufWriter::new(File::create(&target)?);
            io::copy(&mut entry, &mut out)?;
        }
        trace!(target: "archive", "extracted {name} from {archive}");
        on_entry(&name);
    }

    Ok(zip.len())
}

/// Reject entry names that are absolute or climb out of their root.
///
/// # Errors
///
/// Returns [`ArchiveError::PathTraversal`] naming the entry.
pub fn validate_entry_name(name: &str) -> Result<(), ArchiveError> {
    let normalised = name.replace('\\', "/");
    let escapes = normalised.starts_with('/')
        || Utf8Path::new(&normalised).has_root()
        || normalised.split('/').any(|segment| segment == "..")
        || normalised.split('/').next().is_some_and(|first| first.ends_with(':'));
    if escapes {
        return Err(ArchiveError::PathTraversal {
            path: name.to_owned(),
        });
    }
    Ok(())
}

/// Write every file under `source_dir` accepted by `filter` to `dest`.
///
/// Entries are added in sorted path order. When `timestamp` is set, every
/// entry carries it as its modification time. Returns the number of files
/// archived.
///
/// # Errors
///
/// Returns I/O or zip errors, or [`ArchiveError::NonUtf8Path`] for paths
/// that cannot be represented in the archive.
pub fn create(
    dest: &Utf8Path,
    source_dir: &Utf8Path,
    filter: &PathFilter,
    timestamp: Option<i64>,
) -> Result<usize, ArchiveError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(time) = timestamp.and_then(zip_timestamp) {
        options = options.last_modified_time(time);
    }

    let mut writer = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let mut files = 0;
    for walked in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = walked.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .ok()
            .and_then(|path| path.to_str())
            .map(|path| path.replace('\\', "/"))
            .ok_or_else(|| ArchiveError::NonUtf8Path {
                root: source_dir.to_owned(),
            })?;
        if entry.path() == dest.as_std_path() || !filter.accepts(&relative) {
            continue;
        }

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{relative}/"), options)?;
        } else {
            writer.start_file(relative.as_str(), options)?;
            io::copy(&mut File::open(entry.path())?, &mut writer)?;
            files += 1;
        }
    }
    writer.finish()?;
    Ok(files)
}

/// Convert seconds since the Unix epoch to a zip timestamp.
///
/// Returns `None` outside the 1980-2107 range zip can represent.
#[must_use]
pub fn zip_timestamp(epoch_seconds: i64) -> Option<DateTime> {
    let days = epoch_seconds.div_euclid(86_400);
    let seconds_of_day = epoch_seconds.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);

    DateTime::from_date_and_time(
        u16::try_from(year).ok()?,
        u8::try_from(month).ok()?,
        u8::try_from(day).ok()?,
        u8::try_from(seconds_of_day.div_euclid(3_600)).ok()?,
        u8::try_from(seconds_of_day.rem_euclid(3_600).div_euclid(60)).ok()?,
        u8::try_from(seconds_of_day.rem_euclid(60)).ok()?,
    )
    .ok()
}

/// Gregorian date of a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let shifted = days + 719_468;
    let era = shifted.div_euclid(146_097);
    let day_of_era = shifted.rem_euclid(146_097);
    let year_of_era = (day_of_era - day_of_era.div_euclid(1_460) + day_of_era.div_euclid(36_524)
        - day_of_era.div_euclid(146_096))
    .div_euclid(365);
    let day_of_year =
        day_of_era - (365 * year_of_era + year_of_era.div_euclid(4) - year_of_era.div_euclid(100));
    let month_index = (5 * day_of_year + 2).div_euclid(153);
    let day = day_of_year - (153 * month_index + 2).div_euclid(5) + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
