//! End-to-end assembly of the enterprise archive.
//!
//! Stages run strictly in order: classification, placement of every runtime
//! module, the classpath rewrite pass, loose resources, the descriptor
//! check, stale file removal and finally archive creation. The first fatal
//! error aborts the build.

use crate::archive;
use crate::classpath::{self, RewriteOutcome};
use crate::config::BuildConfig;
use crate::context::ExecutionContext;
use crate::error::{EarError, Result};
use crate::filter::PathFilter;
use crate::java_ee::JavaEeVersion;
use crate::placement::{self, Placement};
use crate::provider::DependencyProvider;
use crate::registry::ModuleSet;
use crate::resources::{self, APPLICATION_XML_URI, ResourceSource};
use crate::sync::IncrementalSync;
use camino::Utf8PathBuf;
use log::{debug, info};
use std::fs;
use std::time::SystemTime;

/// Summary of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Path of the written archive.
    pub archive: Utf8PathBuf,
    /// How each runtime module was placed, keyed by uri.
    pub placements: Vec<(String, Placement)>,
    /// Rewrite results, keyed by uri.
    pub rewrites: Vec<(String, RewriteOutcome)>,
    /// Number of loose resources copied.
    pub resources: usize,
    /// Stale work directory files that were deleted.
    pub deleted: Vec<Utf8PathBuf>,
    /// Number of files in the archive.
    pub archived_files: usize,
}

/// Classify the project's dependencies without touching the filesystem.
///
/// # Errors
///
/// Returns configuration, provider and classification errors.
pub fn plan_modules(
    config: &BuildConfig,
    provider: &dyn DependencyProvider,
) -> Result<(ExecutionContext, ModuleSet)> {
    let context = config.execution_context()?;
    let artifacts = provider.resolved_artifacts()?;
    let modules = ModuleSet::build(&config.modules, &artifacts, &context)?;
    debug!(
        target: "assembly",
        "{} module(s): {} runtime, {} provided",
        modules.len(),
        modules.runtime().count(),
        modules.provided().count()
    );
    Ok((context, modules))
}

/// Assemble the archive described by `config`.
///
/// # Errors
///
/// Returns the first fatal [`EarError`] raised by any stage.
pub fn assemble(config: &BuildConfig, provider: &dyn DependencyProvider) -> Result<AssemblyReport> {
    let (context, modules) = plan_modules(config, provider)?;
    let work_dir = config.work_dir();
    let build_start = SystemTime::now();
    let mut sync = IncrementalSync::capture(&work_dir);
    fs::create_dir_all(&work_dir)?;

    let mut placements = Vec::new();
    for module in modules.runtime() {
        let refresh = classpath::needs_rewrite(module, &context);
        let placement = placement::place(module, &context, &work_dir, &mut sync, refresh)?;
        placements.push((module.uri().to_owned(), placement));
    }

    let mut rewrites = Vec::new();
    for (module, (_, placement)) in modules.runtime().zip(&placements) {
        if *placement == Placement::SameFile {
            continue;
        }
        if let Some(outcome) =
            classpath::rewrite_module(module, &modules, &context, &work_dir, &mut sync)?
        {
            rewrites.push((module.uri().to_owned(), outcome));
        }
    }

    let resources = ResourceSource::new(
        config.source_dir(),
        &config.source_includes,
        &config.source_excludes,
        config.application_xml(),
    )?
    .copy_into(&work_dir, &mut sync)?;

    resources::check_descriptor(&work_dir, context.java_ee_version() < JavaEeVersion::V5)?;
    sync.mark_written(APPLICATION_XML_URI);
    let deleted = sync.delete_outdated(build_start);

    let archive_path = config.archive_path();
    let filter = PathFilter::new(&config.packaging_includes, &config.packaging_excludes)?;
    info!(target: "assembly", "building EAR {archive_path}");
    let archived_files = archive::create(&archive_path, &work_dir, &filter, context.output_timestamp())
        .map_err(|source| EarError::Assembly {
            path: archive_path.clone(),
            source,
        })?;

    Ok(AssemblyReport {
        archive: archive_path,
        placements,
        rewrites,
        resources,
        deleted,
        archived_files,
    })
}
