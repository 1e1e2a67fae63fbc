//! Module classification and the module set.
//!
//! [`classify`] turns one resolved artifact into a [`Module`] with the
//! per-kind defaults. [`ModuleSet::build`] combines explicit declarations
//! with the dependency graph, letting declarations win for shared
//! coordinates, and partitions the result into the runtime, provided and
//! all-modules views used by placement and rewriting.

use crate::artifact::ResolvedArtifact;
use crate::context::ExecutionContext;
use crate::error::{EarError, Result};
use crate::java_ee::JavaEeVersion;
use crate::lookup::{ArtifactIndex, Resolution};
use crate::module::{Module, ModuleKind};
use crate::naming;
use crate::type_map::StandardType;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Artifact type used for aggregation-only dependencies.
const POM_TYPE: &str = "pom";

/// An explicit module entry from the build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleDeclaration {
    /// Module type, standard or mapped.
    #[serde(rename = "type")]
    pub module_type: String,
    /// Group id of the dependency.
    pub group_id: Option<String>,
    /// Artifact id of the dependency.
    pub artifact_id: Option<String>,
    /// Classifier selecting among same-named dependencies.
    pub classifier: Option<String>,
    /// Directory inside the archive.
    pub bundle_dir: Option<String>,
    /// File name inside the archive.
    pub bundle_file_name: Option<String>,
    /// Full path inside the archive, overriding directory and file name.
    pub uri: Option<String>,
    /// Leave the module out of the build.
    pub excluded: bool,
    /// Force unpacking on or off.
    pub unpack: Option<bool>,
    /// Directory of the module's own embedded libraries.
    pub lib_directory: Option<String>,
    /// Whether sibling manifests reference the module.
    pub class_path_item: Option<bool>,
    /// Context root of a web application.
    pub context_root: Option<String>,
    /// Whether a library is listed in the deployment descriptor.
    pub include_in_application_xml: Option<bool>,
}

impl ModuleDeclaration {
    fn describe(&self) -> String {
        let mut identity = format!(
            "{}:{}:{}",
            self.module_type,
            self.group_id.as_deref().unwrap_or("null"),
            self.artifact_id.as_deref().unwrap_or("null"),
        );
        if let Some(classifier) = &self.classifier {
            identity.push(':');
            identity.push_str(classifier);
        }
        identity
    }

    fn missing_coordinates(&self) -> Option<EarError> {
        if self.group_id.is_some() && self.artifact_id.is_some() {
            return None;
        }
        Some(EarError::MissingCoordinates {
            group_id: self.group_id.clone().unwrap_or_else(|| "null".to_owned()),
            artifact_id: self.artifact_id.clone().unwrap_or_else(|| "null".to_owned()),
            module_type: self.module_type.clone(),
        })
    }
}

/// Classify an artifact inferred from the dependency graph.
///
/// # Errors
///
/// Returns [`EarError::UnknownArtifactType`] for unmapped types and
/// [`EarError::Naming`] when the bundle file name cannot be computed.
pub fn classify(artifact: &ResolvedArtifact, context: &ExecutionContext) -> Result<Module> {
    let standard = context
        .type_map()
        .standard_type(&artifact.artifact_type, &artifact.artifact_id)?;
    let kind = match ModuleKind::for_type(standard, artifact) {
        ModuleKind::Library { .. } => ModuleKind::Library {
            include_in_application_xml: context.include_lib_in_application_xml(),
        },
        other => other,
    };
    let bundle_dir = match kind {
        ModuleKind::Library { .. } => context.default_lib_bundle_dir(),
        ModuleKind::BusinessComponentClient if context.java_ee_version() > JavaEeVersion::V1_4 => {
            context.default_lib_bundle_dir()
        }
        _ => None,
    };
    let bundle_file_name = bundle_file_name(artifact, standard, context)?;
    Ok(Module::new(kind, standard, artifact.clone(), bundle_file_name).with_bundle_dir(bundle_dir))
}

fn bundle_file_name(
    artifact: &ResolvedArtifact,
    standard: StandardType,
    context: &ExecutionContext,
) -> Result<String> {
    naming::evaluate(context.file_name_mapping(), artifact).map_err(|source| EarError::Naming {
        module: format!("{standard}:{}:{}", artifact.group_id, artifact.artifact_id),
        source,
    })
}

fn declared_module(
    declaration: &ModuleDeclaration,
    artifact: &ResolvedArtifact,
    context: &ExecutionContext,
) -> Result<Module> {
    let standard = context
        .type_map()
        .standard_type(&declaration.module_type, &artifact.artifact_id)?;
    let kind = match ModuleKind::for_type(standard, artifact) {
        ModuleKind::Library { .. } => ModuleKind::Library {
            include_in_application_xml: declaration.include_in_application_xml.unwrap_or(false),
        },
        ModuleKind::WebApplication { context_root } => ModuleKind::WebApplication {
            context_root: declaration.context_root.clone().unwrap_or(context_root),
        },
        other => {
            if declaration.context_root.is_some() {
                warn!(
                    target: "registry",
                    "ignoring context_root on non-web module {}",
                    declaration.describe()
                );
            }
            other
        }
    };

    let bundle_dir = match &declaration.bundle_dir {
        Some(dir) => Some(dir.as_str()),
        None if kind.is_library() => context.default_lib_bundle_dir(),
        None => None,
    };
    let bundle_file_name = match &declaration.bundle_file_name {
        Some(name) => name.clone(),
        None => bundle_file_name(artifact, standard, context)?,
    };

    let mut module = Module::new(kind, standard, artifact.clone(), bundle_file_name)
        .with_bundle_dir(bundle_dir)
        .with_unpack(declaration.unpack)
        .with_excluded(declaration.excluded);
    if let Some(lib_dir) = &declaration.lib_directory {
        module = module.with_lib_dir(Some(lib_dir));
    }
    if let Some(class_path_item) = declaration.class_path_item {
        module = module.with_class_path_item(class_path_item);
    }
    if let Some(uri) = &declaration.uri {
        module = module.with_uri(uri.clone());
    }
    Ok(module)
}

fn resolve_declaration<'a>(
    declaration: &ModuleDeclaration,
    index: &ArtifactIndex<'a>,
    context: &ExecutionContext,
) -> Result<&'a ResolvedArtifact> {
    let (Some(group_id), Some(artifact_id)) = (&declaration.group_id, &declaration.artifact_id)
    else {
        return Err(declaration
            .missing_coordinates()
            .unwrap_or_else(|| EarError::ArtifactNotFound {
                module: declaration.describe(),
            }));
    };
    let standard = context
        .type_map()
        .standard_type(&declaration.module_type, artifact_id)?;

    match index.resolve_unique(group_id, artifact_id, standard, declaration.classifier.as_deref()) {
        Resolution::Found(artifact) => Ok(artifact),
        Resolution::Ambiguous { candidates } => Err(EarError::AmbiguousArtifact {
            module: declaration.describe(),
            candidates,
        }),
        Resolution::NotFound => {
            let candidates = index.candidates(group_id, artifact_id, standard).count();
            if candidates > 1 {
                Err(EarError::AmbiguousArtifact {
                    module: declaration.describe(),
                    candidates,
                })
            } else {
                Err(EarError::ArtifactNotFound {
                    module: declaration.describe(),
                })
            }
        }
    }
}

/// The classified modules of one build, partitioned by scope.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: Vec<Module>,
    runtime: Vec<usize>,
    provided: Vec<usize>,
    excluded: Vec<Module>,
}

impl ModuleSet {
    /// Classify declarations and dependencies into a module set.
    ///
    /// Declarations are validated first, then resolved against
    /// `artifacts`. Remaining artifacts become implicit modules unless they
    /// are `pom` typed, optional, outside the compile and runtime closure,
    /// or already claimed by a declaration.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::MissingCoordinates`] before any resolution when a
    /// declaration lacks its ids, then the first resolution or
    /// classification failure.
    pub fn build(
        declarations: &[ModuleDeclaration],
        artifacts: &[ResolvedArtifact],
        context: &ExecutionContext,
    ) -> Result<Self> {
        if let Some(err) = declarations
            .iter()
            .find_map(ModuleDeclaration::missing_coordinates)
        {
            return Err(err);
        }

        let index = ArtifactIndex::new(artifacts, context);
        let mut modules = Vec::with_capacity(artifacts.len());
        let mut registered = BTreeSet::new();

        for declaration in declarations {
            debug!(target: "registry", "resolving module {}", declaration.describe());
            let artifact = resolve_declaration(declaration, &index, context)?;
            let module = declared_module(declaration, artifact, context)?;
            if registered.insert(module.coordinates()) {
                modules.push(module);
            } else {
                warn!(
                    target: "registry",
                    "module {} is declared more than once; keeping the first declaration",
                    declaration.describe()
                );
            }
        }

        for artifact in artifacts {
            if artifact.artifact_type == POM_TYPE
                || artifact.optional
                || !artifact.scope.in_compile_runtime_closure()
                || registered.contains(&artifact.coordinates())
            {
                continue;
            }
            let module = classify(artifact, context)?;
            registered.insert(module.coordinates());
            modules.push(module);
        }

        Ok(Self::partition(modules))
    }

    /// Partition already classified modules.
    #[must_use]
    pub fn partition(modules: Vec<Module>) -> Self {
        let mut set = Self::default();
        for module in modules {
            if module.is_excluded() {
                debug!(target: "registry", "skipping excluded module {module}");
                set.excluded.push(module);
                continue;
            }
            let position = set.modules.len();
            if module.artifact().scope.is_runtime() {
                set.runtime.push(position);
            } else {
                set.provided.push(position);
            }
            set.modules.push(module);
        }
        set
    }

    /// Iterate over every non-excluded module.
    pub fn all(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Iterate over the modules packaged at runtime.
    pub fn runtime(&self) -> impl Iterator<Item = &Module> {
        self.runtime
            .iter()
            .filter_map(|&position| self.modules.get(position))
    }

    /// Iterate over the modules supplied by the container.
    pub fn provided(&self) -> impl Iterator<Item = &Module> {
        self.provided
            .iter()
            .filter_map(|&position| self.modules.get(position))
    }

    /// Iterate over the excluded modules.
    pub fn excluded(&self) -> impl Iterator<Item = &Module> {
        self.excluded.iter()
    }

    /// Return the number of non-excluded modules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.modules.len()
    }

    /// Return true when no module survived exclusion.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
