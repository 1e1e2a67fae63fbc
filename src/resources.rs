//! Loose EAR resources and the deployment descriptor.

use crate::error::{EarError, Result};
use crate::filter::PathFilter;
use crate::sync::IncrementalSync;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;
use std::io;
use walkdir::WalkDir;

/// Descriptor path relative to the work directory.
pub const APPLICATION_XML_URI: &str = "META-INF/application.xml";

/// Exclude applied to the source tree when an explicit descriptor is set.
const SOURCE_DESCRIPTOR_EXCLUDE: &str = "**/META-INF/application.xml";

/// Where loose resources come from.
#[derive(Debug, Clone)]
pub struct ResourceSource {
    source_dir: Utf8PathBuf,
    filter: PathFilter,
    application_xml: Option<Utf8PathBuf>,
}

impl ResourceSource {
    /// Describe the resources under `source_dir`.
    ///
    /// When `application_xml` is set, any descriptor in the source tree is
    /// ignored in favour of it.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidPattern`] for malformed globs.
    pub fn new(
        source_dir: impl Into<Utf8PathBuf>,
        includes: &[String],
        excludes: &[String],
        application_xml: Option<Utf8PathBuf>,
    ) -> Result<Self> {
        let mut all_excludes = excludes.to_vec();
        if application_xml.is_some() {
            all_excludes.push(SOURCE_DESCRIPTOR_EXCLUDE.to_owned());
        }
        Ok(Self {
            source_dir: source_dir.into(),
            filter: PathFilter::new(includes, &all_excludes)?,
            application_xml,
        })
    }

    /// Copy the resources into `work_dir`, returning the number of files.
    ///
    /// A missing source directory contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::Resource`] naming the file that failed.
    pub fn copy_into(&self, work_dir: &Utf8Path, sync: &mut IncrementalSync) -> Result<usize> {
        let mut copied = 0;
        if self.source_dir.is_dir() {
            info!(target: "resources", "copying EAR sources from {} to {work_dir}", self.source_dir);
            for relative in self.files()? {
                copy_file(&self.source_dir.join(&relative), &work_dir.join(&relative))?;
                sync.mark_written(&relative);
                copied += 1;
            }
        } else {
            debug!(target: "resources", "no EAR sources at {}", self.source_dir);
        }

        if let Some(descriptor) = &self.application_xml {
            info!(target: "resources", "including custom application.xml [{descriptor}]");
            copy_file(descriptor, &work_dir.join(APPLICATION_XML_URI))?;
            sync.mark_written(APPLICATION_XML_URI);
            copied += 1;
        }
        Ok(copied)
    }

    fn files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for walked in WalkDir::new(&self.source_dir).min_depth(1).sort_by_file_name() {
            let entry = walked.map_err(|err| EarError::Resource {
                path: self.source_dir.clone(),
                source: io::Error::from(err),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.source_dir)
                .ok()
                .and_then(|path| path.to_str())
                .map(|path| path.replace('\\', "/"))
                .ok_or_else(|| EarError::Resource {
                    path: self.source_dir.clone(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("non UTF-8 path {}", entry.path().display()),
                    ),
                })?;
            if self.filter.accepts(&relative) {
                files.push(relative);
            }
        }
        Ok(files)
    }
}

fn copy_file(source: &Utf8Path, target: &Utf8Path) -> Result<()> {
    let failed = |source_err: io::Error| EarError::Resource {
        path: source.to_owned(),
        source: source_err,
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(failed)?;
    }
    fs::copy(source, target).map_err(failed)?;
    Ok(())
}

/// Fail when a pre-Java EE 5 build has no deployment descriptor.
///
/// # Errors
///
/// Returns [`EarError::MissingDescriptor`] with the expected path.
pub fn check_descriptor(work_dir: &Utf8Path, required: bool) -> Result<()> {
    let descriptor = work_dir.join(APPLICATION_XML_URI);
    if required && !descriptor.is_file() {
        return Err(EarError::MissingDescriptor { path: descriptor });
    }
    Ok(())
}
