//! Artifact lookup across the resolved dependency set.
//!
//! Three searches live here:
//!
//! - [`ArtifactIndex::resolve_unique`] picks the single dependency an explicit
//!   module declaration refers to.
//! - [`find_in_classpath`] locates a module's token in an existing
//!   `Class-Path`, recognising names written by earlier builds.
//! - [`embedded_candidates`] lists the file names under which a module may
//!   have been embedded inside another module's library directory.

use crate::artifact::ResolvedArtifact;
use crate::context::ExecutionContext;
use crate::module::Module;
use crate::naming::{self, NamingError, ARTIFACT_DEFAULT_FILE_NAME_MAPPING};
use crate::type_map::StandardType;
use log::trace;

/// Outcome of [`ArtifactIndex::resolve_unique`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Exactly one artifact matched.
    Found(&'a ResolvedArtifact),
    /// Several artifacts matched and no classifier disambiguated them.
    Ambiguous {
        /// Number of matching artifacts.
        candidates: usize,
    },
    /// Nothing matched.
    NotFound,
}

/// Searchable view over the project's resolved artifacts.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactIndex<'a> {
    artifacts: &'a [ResolvedArtifact],
    context: &'a ExecutionContext,
}

impl<'a> ArtifactIndex<'a> {
    /// Index `artifacts` using the type map and sentinel from `context`.
    #[must_use]
    pub const fn new(artifacts: &'a [ResolvedArtifact], context: &'a ExecutionContext) -> Self {
        Self { artifacts, context }
    }

    /// Return every artifact with the given group, artifact id and type.
    ///
    /// Types match through the type map, so a `webapp` dependency mapped to
    /// `war` is a candidate for a `war` declaration.
    pub fn candidates(
        &self,
        group_id: &str,
        artifact_id: &str,
        standard: StandardType,
    ) -> impl Iterator<Item = &'a ResolvedArtifact> {
        let type_map = self.context.type_map();
        self.artifacts.iter().filter(move |artifact| {
            artifact.group_id == group_id
                && artifact.artifact_id == artifact_id
                && type_map.is_mapped_to(standard, &artifact.artifact_type)
        })
    }

    /// Resolve the single artifact a declaration refers to.
    ///
    /// With a classifier, the first candidate carrying it wins; an
    /// unclassified candidate also matches when the requested classifier is
    /// the main artifact sentinel. Without a classifier, a lone candidate is
    /// returned, and several candidates are ambiguous unless exactly one of
    /// them carries the sentinel classifier.
    #[must_use]
    pub fn resolve_unique(
        &self,
        group_id: &str,
        artifact_id: &str,
        standard: StandardType,
        classifier: Option<&str>,
    ) -> Resolution<'a> {
        let candidates: Vec<&'a ResolvedArtifact> =
            self.candidates(group_id, artifact_id, standard).collect();
        trace!(
            target: "lookup",
            "{group_id}:{artifact_id}:{standard} has {} candidate(s)",
            candidates.len()
        );

        let sentinel = self.context.main_artifact_id();
        match (classifier, candidates.as_slice()) {
            (_, []) => Resolution::NotFound,
            (Some(requested), _) => candidates
                .iter()
                .copied()
                .find(|candidate| match candidate.classifier.as_deref() {
                    None => requested == sentinel,
                    Some(existing) => existing == requested,
                })
                .map_or(Resolution::NotFound, Resolution::Found),
            (None, [only]) => Resolution::Found(*only),
            (None, many) => {
                let mut main = many
                    .iter()
                    .copied()
                    .filter(|candidate| candidate.classifier.as_deref() == Some(sentinel));
                match (main.next(), main.next()) {
                    (Some(artifact), None) => Resolution::Found(artifact),
                    _ => Resolution::Ambiguous {
                        candidates: many.len(),
                    },
                }
            }
        }
    }
}

/// Return the index of `module`'s token in `elements`.
///
/// Names are tried in priority order: the bundle file name, the raw
/// artifact file name, the legacy snapshot name (snapshots only), and
/// finally the module uri.
///
/// # Errors
///
/// Returns [`NamingError`] when the legacy snapshot name cannot be computed.
pub fn find_in_classpath(elements: &[String], module: &Module) -> Result<Option<usize>, NamingError> {
    if elements.is_empty() {
        return Ok(None);
    }
    let position = |name: &str| elements.iter().position(|element| element == name);

    if let Some(index) = position(module.bundle_file_name()) {
        return Ok(Some(index));
    }
    if let Some(index) = module.artifact().file_name().and_then(position) {
        return Ok(Some(index));
    }
    if module.artifact().is_snapshot() {
        let legacy = naming::evaluate(ARTIFACT_DEFAULT_FILE_NAME_MAPPING, module.artifact())?;
        if let Some(index) = position(&legacy) {
            return Ok(Some(index));
        }
    }
    Ok(position(module.uri()))
}

/// Return the file names `module` may be embedded under, in search order.
///
/// The order is the artifact file name, the bundle file name, then the
/// legacy snapshot name for snapshots. Duplicates are dropped.
///
/// # Errors
///
/// Returns [`NamingError`] when the legacy snapshot name cannot be computed.
pub fn embedded_candidates(module: &Module) -> Result<Vec<String>, NamingError> {
    let mut names: Vec<String> = Vec::with_capacity(3);
    let mut push = |name: &str| {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_owned());
        }
    };

    if let Some(file_name) = module.artifact().file_name() {
        push(file_name);
    }
    push(module.bundle_file_name());
    if module.artifact().is_snapshot() {
        push(&naming::evaluate(ARTIFACT_DEFAULT_FILE_NAME_MAPPING, module.artifact())?);
    }
    Ok(names)
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
