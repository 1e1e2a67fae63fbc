//! Manifest `Class-Path` rewriting for placed modules.
//!
//! Once every module has been placed in the work directory, each module that
//! may change its manifest is brought in line with the module set: sibling
//! tokens are renamed to their current uri, dropped when the sibling stopped
//! being a classpath item, and appended when missing. Provided modules are
//! stripped last. Under skinny packaging the module's own copies of shared
//! libraries are deleted first.

pub mod contents;
pub mod manifest;

use crate::archive::ArchiveError;
use crate::context::ExecutionContext;
use crate::error::{EarError, Result};
use crate::lookup::{embedded_candidates, find_in_classpath};
use crate::module::Module;
use crate::naming::NamingError;
use crate::registry::ModuleSet;
use crate::sync::IncrementalSync;
use camino::Utf8Path;
use contents::{ExplodedModule, ModuleContents, PackedModule, Stamp};
use log::{debug, info};
use manifest::{Manifest, ManifestError};
use thiserror::Error;

/// Metadata directory of every module.
pub const META_INF: &str = "META-INF";

/// Manifest path relative to the module root.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Errors arising while rewriting one module's manifest.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Reading or writing the module failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The packed module is not a readable zip.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry path was rejected.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The existing manifest could not be parsed.
    #[error("invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// A sibling's legacy file name could not be computed.
    #[error(transparent)]
    Naming(#[from] NamingError),
}

/// What a rewrite changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The written `Class-Path` tokens, or `None` when nothing was written.
    pub class_path: Option<Vec<String>>,
    /// Embedded library entries deleted from the module.
    pub deleted: Vec<String>,
    /// Whether the manifest had to be created.
    pub created_manifest: bool,
}

/// Return true when `module` takes part in the rewrite pass.
#[must_use]
pub fn needs_rewrite(module: &Module, context: &ExecutionContext) -> bool {
    module.changes_manifest_classpath()
        && (module.lib_dir().is_some() || skinny_selected(module, context))
}

fn skinny_selected(module: &Module, context: &ExecutionContext) -> bool {
    context.skinny_modules() || (context.skinny_wars() && module.kind().is_web())
}

fn prunes_embedded_libraries(module: &Module, context: &ExecutionContext) -> bool {
    module.lib_dir().is_some() && skinny_selected(module, context)
}

/// Rewrite the manifest of `module` through `contents`.
///
/// # Errors
///
/// Returns [`RewriteError`] for any read, write or parse failure. Nothing
/// is committed when an error occurs before the final step.
pub fn rewrite(
    contents: &mut dyn ModuleContents,
    module: &Module,
    modules: &ModuleSet,
    context: &ExecutionContext,
) -> std::result::Result<RewriteOutcome, RewriteError> {
    let mut outcome = RewriteOutcome::default();
    let created = Stamp::for_new_entries(context.output_timestamp());

    if !contents.exists(META_INF) {
        debug!(target: "classpath", "creating {META_INF} in {module}");
        contents.create_dir(META_INF, created)?;
    }
    let found = contents
        .read(MANIFEST_PATH)?
        .map(|bytes| Manifest::from_bytes(&bytes))
        .transpose()?;
    outcome.created_manifest = found.is_none();
    let mut manifest = found.unwrap_or_else(Manifest::new);
    if outcome.created_manifest {
        debug!(target: "classpath", "creating {MANIFEST_PATH} in {module}");
        contents.write(MANIFEST_PATH, &manifest.to_bytes(), created)?;
    }

    let existing = manifest.class_path();
    let existed = existing.is_some();
    let mut tokens = existing.unwrap_or_default();

    if prunes_embedded_libraries(module, context) {
        outcome.deleted = prune(contents, module, modules)?;
    }
    reconcile(&mut tokens, module, modules, context)?;
    for provided in modules.provided() {
        while let Some(position) = find_in_classpath(&tokens, provided)? {
            debug!(target: "classpath", "removing provided module {provided} from {module}");
            tokens.remove(position);
        }
    }

    if !context.skip_class_path_modification() || !tokens.is_empty() || existed {
        manifest.set_class_path(&tokens);
        contents.write(MANIFEST_PATH, &manifest.to_bytes(), Stamp::Preserve)?;
        outcome.class_path = Some(tokens);
    }
    contents.commit()?;
    Ok(outcome)
}

fn prune(
    contents: &mut dyn ModuleContents,
    module: &Module,
    modules: &ModuleSet,
) -> std::result::Result<Vec<String>, RewriteError> {
    let lib_dir = module.lib_dir().unwrap_or_default();
    let mut deleted = Vec::new();
    for other in modules.all().filter(|other| !other.same_as(module)) {
        for name in embedded_candidates(other)? {
            let entry = format!("{lib_dir}{name}");
            if contents.exists(&entry) {
                debug!(target: "classpath", "deleting embedded {entry} from {module}");
                contents.delete(&entry)?;
                deleted.push(entry);
                break;
            }
        }
    }
    Ok(deleted)
}

fn reconcile(
    tokens: &mut Vec<String>,
    module: &Module,
    modules: &ModuleSet,
    context: &ExecutionContext,
) -> std::result::Result<(), RewriteError> {
    let extension_permitted = context.class_path_extension_permitted();
    for other in modules.runtime().filter(|other| !other.same_as(module)) {
        match find_in_classpath(tokens, other)? {
            Some(position) if other.is_class_path_item() => {
                if let Some(token) = tokens.get_mut(position) {
                    other.uri().clone_into(token);
                }
            }
            Some(position) => {
                tokens.remove(position);
            }
            None if other.is_class_path_item() && extension_permitted => {
                tokens.push(other.uri().to_owned());
            }
            None => {}
        }
    }
    Ok(())
}

/// Rewrite the placed copy of `module` under `work_dir`.
///
/// Unpacked modules are edited in place; packed modules are repacked.
/// Returns `None` when the module is not selected for rewriting.
///
/// # Errors
///
/// Returns [`EarError::Rewrite`] naming the module when the rewrite fails.
pub fn rewrite_module(
    module: &Module,
    modules: &ModuleSet,
    context: &ExecutionContext,
    work_dir: &Utf8Path,
    sync: &mut IncrementalSync,
) -> Result<Option<RewriteOutcome>> {
    if !needs_rewrite(module, context) {
        return Ok(None);
    }
    let placed = work_dir.join(module.uri());
    let wrap = |err: RewriteError| EarError::Rewrite {
        module: module.to_string(),
        source: err,
    };

    let exploded = placed.is_dir();
    let outcome = if exploded {
        rewrite(&mut ExplodedModule::new(placed), module, modules, context)
    } else {
        PackedModule::open(placed).and_then(|mut packed| rewrite(&mut packed, module, modules, context))
    }
    .map_err(wrap)?;

    if exploded && (outcome.class_path.is_some() || outcome.created_manifest) {
        sync.mark_written(&format!("{}/{MANIFEST_PATH}", module.uri()));
    }
    info!(
        target: "classpath",
        "rewrote manifest classpath of {module}: {}",
        outcome.class_path.as_ref().map_or_else(|| "unchanged".to_owned(), |tokens| tokens.join(" "))
    );
    Ok(Some(outcome))
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod tests;
