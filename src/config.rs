//! Build configuration loaded from `earsmith.toml`.
//!
//! Every setting has a default so that an empty file describes a valid,
//! if unremarkable, build. Relative paths are resolved against the
//! directory holding the configuration file.

use crate::artifact::ResolvedArtifact;
use crate::context::{DEFAULT_MAIN_ARTIFACT_ID, ExecutionContext};
use crate::error::{EarError, Result};
use crate::java_ee::JavaEeVersion;
use crate::naming::DEFAULT_OUTPUT_FILE_NAME_MAPPING;
use crate::placement::parse_unpack_types;
use crate::registry::ModuleDeclaration;
use crate::type_map::ArtifactTypeMap;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "earsmith.toml";

/// Settings for one assembly run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Target platform version, `7` unless set.
    pub java_ee_version: String,
    /// Shared library directory at the archive root.
    pub default_lib_bundle_dir: Option<String>,
    /// Mapping used to name bundled modules.
    pub file_name_mapping: String,
    /// Classifier naming the unclassified main artifact.
    pub main_artifact_id: String,
    /// Custom artifact types and the standard type each maps to.
    pub type_mappings: BTreeMap<String, String>,
    /// Standard types unpacked unless a module opts out.
    pub unpack_types: Vec<String>,
    /// Strip shared libraries from web applications.
    pub skinny_wars: bool,
    /// Strip shared libraries from every module.
    pub skinny_modules: bool,
    /// Avoid adding `Class-Path` entries where possible.
    pub skip_class_path_modification: bool,
    /// List inferred libraries in the deployment descriptor.
    pub include_lib_in_application_xml: bool,
    /// Reproducible timestamp in seconds since the Unix epoch.
    pub output_timestamp: Option<i64>,
    /// Directory modules and resources are assembled in.
    pub work_dir: Utf8PathBuf,
    /// Directory the archive is written to.
    pub output_dir: Utf8PathBuf,
    /// Archive base name.
    pub final_name: String,
    /// Archive classifier.
    pub classifier: Option<String>,
    /// Directory of loose EAR resources.
    pub source_dir: Utf8PathBuf,
    /// Resource include globs; empty means everything.
    pub source_includes: Vec<String>,
    /// Resource exclude globs.
    pub source_excludes: Vec<String>,
    /// Explicit deployment descriptor.
    pub application_xml: Option<Utf8PathBuf>,
    /// Archive include globs; empty means everything.
    pub packaging_includes: Vec<String>,
    /// Archive exclude globs.
    pub packaging_excludes: Vec<String>,
    /// Explicit module declarations.
    pub modules: Vec<ModuleDeclaration>,
    /// Resolved dependencies of the project.
    pub dependencies: Vec<ResolvedArtifact>,
    #[serde(skip)]
    base_dir: Utf8PathBuf,
}

impl BuildConfig {
    fn default_java_ee_version() -> String {
        JavaEeVersion::default().as_str().to_owned()
    }

    fn default_work_dir() -> Utf8PathBuf {
        Utf8PathBuf::from("target/earsmith")
    }

    fn default_output_dir() -> Utf8PathBuf {
        Utf8PathBuf::from("target")
    }

    fn default_final_name() -> String {
        "application".to_owned()
    }

    fn default_source_dir() -> Utf8PathBuf {
        Utf8PathBuf::from("src/main/application")
    }

    /// Read and parse the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidConfig`] when the file cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| EarError::InvalidConfig {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        let mut config = Self::from_toml_str(&text, path)?;
        config.base_dir = path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse configuration text; `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidConfig`] describing the parse failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use earsmith::config::BuildConfig;
    ///
    /// let config = BuildConfig::from_toml_str("skinny_wars = true\n", Utf8Path::new("earsmith.toml")).unwrap();
    /// assert!(config.skinny_wars);
    /// assert_eq!(config.final_name, "application");
    /// ```
    pub fn from_toml_str(text: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(text).map_err(|err| EarError::InvalidConfig {
            path: origin.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Resolve `path` against the configuration's directory.
    #[must_use]
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Return the resolved work directory.
    #[must_use]
    pub fn work_dir(&self) -> Utf8PathBuf {
        self.resolve(&self.work_dir)
    }

    /// Return the resolved resource directory.
    #[must_use]
    pub fn source_dir(&self) -> Utf8PathBuf {
        self.resolve(&self.source_dir)
    }

    /// Return the resolved explicit descriptor, if any.
    #[must_use]
    pub fn application_xml(&self) -> Option<Utf8PathBuf> {
        self.application_xml.as_deref().map(|path| self.resolve(path))
    }

    /// Return `<output_dir>/<final_name>[-classifier].ear`.
    #[must_use]
    pub fn archive_path(&self) -> Utf8PathBuf {
        let suffix = match self.classifier.as_deref().map(str::trim) {
            Some(classifier) if classifier.starts_with('-') => classifier.to_owned(),
            Some(classifier) if !classifier.is_empty() => format!("-{classifier}"),
            _ => String::new(),
        };
        self.resolve(&self.output_dir)
            .join(format!("{}{suffix}.ear", self.final_name))
    }

    /// Return the dependencies with their files resolved.
    #[must_use]
    pub fn resolved_dependencies(&self) -> Vec<ResolvedArtifact> {
        self.dependencies
            .iter()
            .cloned()
            .map(|mut artifact| {
                artifact.file = artifact.file.map(|file| self.resolve(&file));
                artifact
            })
            .collect()
    }

    /// Build the execution context for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidJavaEeVersion`],
    /// [`EarError::InvalidTypeMapping`] or [`EarError::InvalidUnpackType`]
    /// for rejected settings.
    pub fn execution_context(&self) -> Result<ExecutionContext> {
        let version = self.java_ee_version.parse::<JavaEeVersion>()?;
        let type_map = ArtifactTypeMap::from_mappings(
            self.type_mappings
                .iter()
                .map(|(custom, target)| (custom.as_str(), target.as_str())),
        )?;
        Ok(ExecutionContext::new(version)
            .with_default_lib_bundle_dir(self.default_lib_bundle_dir.as_deref())
            .with_file_name_mapping(self.file_name_mapping.clone())
            .with_main_artifact_id(self.main_artifact_id.clone())
            .with_type_map(type_map)
            .with_unpack_types(parse_unpack_types(&self.unpack_types)?)
            .with_skinny_wars(self.skinny_wars)
            .with_skinny_modules(self.skinny_modules)
            .with_skip_class_path_modification(self.skip_class_path_modification)
            .with_include_lib_in_application_xml(self.include_lib_in_application_xml)
            .with_output_timestamp(self.output_timestamp))
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            java_ee_version: Self::default_java_ee_version(),
            default_lib_bundle_dir: None,
            file_name_mapping: DEFAULT_OUTPUT_FILE_NAME_MAPPING.to_owned(),
            main_artifact_id: DEFAULT_MAIN_ARTIFACT_ID.to_owned(),
            type_mappings: BTreeMap::new(),
            unpack_types: Vec::new(),
            skinny_wars: false,
            skinny_modules: false,
            skip_class_path_modification: false,
            include_lib_in_application_xml: false,
            output_timestamp: None,
            work_dir: Self::default_work_dir(),
            output_dir: Self::default_output_dir(),
            final_name: Self::default_final_name(),
            classifier: None,
            source_dir: Self::default_source_dir(),
            source_includes: Vec::new(),
            source_excludes: Vec::new(),
            application_xml: None,
            packaging_includes: Vec::new(),
            packaging_excludes: Vec::new(),
            modules: Vec::new(),
            dependencies: Vec::new(),
            base_dir: Utf8PathBuf::new(),
        }
    }
}
