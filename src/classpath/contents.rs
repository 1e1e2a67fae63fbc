//! Editable views over a placed module's contents.
//!
//! A module sits in the work directory either packed, as a single zip file,
//! or exploded into a directory. [`ModuleContents`] hides the difference so
//! that the rewriter can add, replace and delete entries the same way in
//! both cases. Packed edits are staged in memory and applied by
//! [`ModuleContents::commit`], which copies untouched entries verbatim into
//! a sibling temporary file and renames it over the original.

use super::RewriteError;
use crate::archive::{validate_entry_name, zip_timestamp};
use camino::{Utf8Path, Utf8PathBuf};
use filetime::FileTime;
use log::trace;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Modification time policy for a written entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// Keep the entry's existing modification time.
    Preserve,
    /// Use a fixed time, in seconds since the Unix epoch.
    Epoch(i64),
    /// Use the current time.
    Now,
}

impl Stamp {
    /// Return the stamp for newly created entries.
    #[must_use]
    pub fn for_new_entries(output_timestamp: Option<i64>) -> Self {
        output_timestamp.map_or(Self::Now, Self::Epoch)
    }
}

/// Entry-level access to one module's contents.
///
/// Paths are relative to the module root and use forward slashes.
#[cfg_attr(test, mockall::automock)]
pub trait ModuleContents {
    /// Return true when a file or directory exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read a file, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] when the file cannot be read.
    fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, RewriteError>;

    /// Create or replace a file.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] when the file cannot be written.
    fn write(&mut self, path: &str, contents: &[u8], stamp: Stamp) -> Result<(), RewriteError>;

    /// Create a directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] when the directory cannot be created.
    fn create_dir(&mut self, path: &str, stamp: Stamp) -> Result<(), RewriteError>;

    /// Delete a file, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] when the file cannot be removed.
    fn delete(&mut self, path: &str) -> Result<bool, RewriteError>;

    /// Persist pending changes.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] when the changes cannot be written back.
    fn commit(&mut self) -> Result<(), RewriteError>;
}

/// An unpacked module edited in place.
#[derive(Debug, Clone)]
pub struct ExplodedModule {
    root: Utf8PathBuf,
}

impl ExplodedModule {
    /// Edit the directory at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<Utf8PathBuf, RewriteError> {
        validate_entry_name(path)?;
        Ok(self.root.join(path))
    }
}

fn apply_stamp(path: &Utf8Path, stamp: Stamp, previous: Option<FileTime>) -> std::io::Result<()> {
    let time = match stamp {
        Stamp::Preserve => previous,
        Stamp::Epoch(seconds) => Some(FileTime::from_unix_time(seconds, 0)),
        Stamp::Now => None,
    };
    time.map_or(Ok(()), |mtime| filetime::set_file_mtime(path, mtime))
}

impl ModuleContents for ExplodedModule {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|target| target.exists())
    }

    fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, RewriteError> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(target)?))
    }

    fn write(&mut self, path: &str, contents: &[u8], stamp: Stamp) -> Result<(), RewriteError> {
        let target = self.resolve(path)?;
        let previous = fs::metadata(&target)
            .ok()
            .map(|metadata| FileTime::from_last_modification_time(&metadata));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, contents)?;
        apply_stamp(&target, stamp, previous)?;
        Ok(())
    }

    fn create_dir(&mut self, path: &str, stamp: Stamp) -> Result<(), RewriteError> {
        let target = self.resolve(path)?;
        if target.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&target)?;
        apply_stamp(&target, stamp, None)?;
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<bool, RewriteError> {
        let target = self.resolve(path)?;
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else if target.exists() {
            fs::remove_file(&target)?;
        } else {
            return Ok(false);
        }
        trace!(target: "classpath", "deleted {target}");
        Ok(true)
    }

    fn commit(&mut self) -> Result<(), RewriteError> {
        Ok(())
    }
}

struct PendingFile {
    contents: Vec<u8>,
    time: Option<DateTime>,
}

/// A packed module edited through a rewritten copy of its zip file.
pub struct PackedModule {
    path: Utf8PathBuf,
    archive: ZipArchive<File>,
    names: BTreeSet<String>,
    written: BTreeMap<String, PendingFile>,
    new_dirs: BTreeMap<String, Option<DateTime>>,
    deleted: BTreeSet<String>,
}

impl PackedModule {
    /// Open the zip file at `path` for editing.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] when the file is not a readable zip.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, RewriteError> {
        let location: Utf8PathBuf = path.into();
        let archive = ZipArchive::new(File::open(&location)?)?;
        let names = archive.file_names().map(str::to_owned).collect();
        Ok(Self {
            path: location,
            archive,
            names,
            written: BTreeMap::new(),
            new_dirs: BTreeMap::new(),
            deleted: BTreeSet::new(),
        })
    }

    fn is_dirty(&self) -> bool {
        !(self.written.is_empty() && self.new_dirs.is_empty() && self.deleted.is_empty())
    }

    fn has_original(&self, name: &str) -> bool {
        self.names.contains(name) && !self.deleted.contains(name)
    }

    fn has_directory(&self, path: &str) -> bool {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        self.new_dirs.contains_key(&prefix)
            || self.written.keys().any(|name| name.starts_with(&prefix))
            || self
                .names
                .iter()
                .any(|name| name.starts_with(&prefix) && !self.deleted.contains(name))
    }

    fn original_time(&mut self, name: &str) -> Result<Option<DateTime>, RewriteError> {
        if !self.names.contains(name) {
            return Ok(None);
        }
        let entry = self.archive.by_name(name)?;
        Ok(entry.last_modified().into())
    }

    fn entry_time(&mut self, name: &str, stamp: Stamp) -> Result<Option<DateTime>, RewriteError> {
        Ok(match stamp {
            Stamp::Preserve => match self.written.get(name) {
                Some(pending) => pending.time,
                None => self.original_time(name)?,
            },
            Stamp::Epoch(seconds) => zip_timestamp(seconds),
            Stamp::Now => None,
        })
    }

    fn write_pending(
        writer: &mut ZipWriter<BufWriter<&mut File>>,
        name: &str,
        pending: &PendingFile,
    ) -> Result<(), RewriteError> {
        writer.start_file(name, options(pending.time))?;
        writer.write_all(&pending.contents)?;
        Ok(())
    }
}

fn options(time: Option<DateTime>) -> SimpleFileOptions {
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    time.map_or(deflated, |modified| deflated.last_modified_time(modified))
}

impl ModuleContents for PackedModule {
    fn exists(&self, path: &str) -> bool {
        let name = path.trim_end_matches('/');
        self.written.contains_key(name) || self.has_original(name) || self.has_directory(name)
    }

    fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, RewriteError> {
        if let Some(pending) = self.written.get(path) {
            return Ok(Some(pending.contents.clone()));
        }
        if !self.has_original(path) {
            return Ok(None);
        }
        let mut entry = self.archive.by_name(path)?;
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        Ok(Some(contents))
    }

    fn write(&mut self, path: &str, contents: &[u8], stamp: Stamp) -> Result<(), RewriteError> {
        validate_entry_name(path)?;
        let time = self.entry_time(path, stamp)?;
        self.deleted.remove(path);
        self.written.insert(
            path.to_owned(),
            PendingFile {
                contents: contents.to_vec(),
                time,
            },
        );
        Ok(())
    }

    fn create_dir(&mut self, path: &str, stamp: Stamp) -> Result<(), RewriteError> {
        validate_entry_name(path)?;
        let name = format!("{}/", path.trim_end_matches('/'));
        if self.has_original(&name) || self.new_dirs.contains_key(&name) {
            return Ok(());
        }
        let time = match stamp {
            Stamp::Epoch(seconds) => zip_timestamp(seconds),
            Stamp::Preserve | Stamp::Now => None,
        };
        self.new_dirs.insert(name, time);
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<bool, RewriteError> {
        let removed_pending = self.written.remove(path).is_some();
        if self.has_original(path) {
            self.deleted.insert(path.to_owned());
            return Ok(true);
        }
        Ok(removed_pending)
    }

    fn commit(&mut self) -> Result<(), RewriteError> {
        if !self.is_dirty() {
            return Ok(());
        }
        let parent = self.path.parent().unwrap_or_else(|| Utf8Path::new("."));
        let mut staged = NamedTempFile::new_in(parent)?;
        {
            let mut writer = ZipWriter::new(BufWriter::new(staged.as_file_mut()));
            let mut pending = std::mem::take(&mut self.written);

            for index in 0..self.archive.len() {
                let entry = self.archive.by_index_raw(index)?;
                let name = entry.name().to_owned();
                if self.deleted.contains(&name) {
                    continue;
                }
                if let Some(replacement) = pending.remove(&name) {
                    drop(entry);
                    Self::write_pending(&mut writer, &name, &replacement)?;
                    continue;
                }
                writer.raw_copy_file(entry)?;
            }
            for (name, time) in &self.new_dirs {
                writer.add_directory(name.as_str(), options(*time))?;
            }
            for (name, file) in &pending {
                Self::write_pending(&mut writer, name, file)?;
            }
            writer.finish()?.flush()?;
        }
        staged
            .persist(&self.path)
            .map_err(|err| RewriteError::Io(err.error))?;
        trace!(target: "classpath", "repacked {}", self.path);

        *self = Self::open(self.path.clone())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "contents_tests.rs"]
mod tests;
