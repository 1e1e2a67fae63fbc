//! Build-wide settings shared by classification and rewriting.
//!
//! The [`ExecutionContext`] is built once from the configuration and passed
//! by reference to every stage. Nothing in it changes during a build.

use crate::java_ee::JavaEeVersion;
use crate::module::normalize_archive_path;
use crate::naming::DEFAULT_OUTPUT_FILE_NAME_MAPPING;
use crate::type_map::{ArtifactTypeMap, StandardType};
use std::collections::BTreeSet;

/// Classifier sentinel naming the unclassified main artifact.
pub const DEFAULT_MAIN_ARTIFACT_ID: &str = "none";

/// Immutable settings for one assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    java_ee_version: JavaEeVersion,
    default_lib_bundle_dir: Option<String>,
    file_name_mapping: String,
    main_artifact_id: String,
    type_map: ArtifactTypeMap,
    unpack_types: BTreeSet<StandardType>,
    skinny_wars: bool,
    skinny_modules: bool,
    skip_class_path_modification: bool,
    include_lib_in_application_xml: bool,
    output_timestamp: Option<i64>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(JavaEeVersion::default())
    }
}

impl ExecutionContext {
    /// Create a context with every other setting at its default.
    #[must_use]
    pub fn new(java_ee_version: JavaEeVersion) -> Self {
        Self {
            java_ee_version,
            default_lib_bundle_dir: None,
            file_name_mapping: DEFAULT_OUTPUT_FILE_NAME_MAPPING.to_owned(),
            main_artifact_id: DEFAULT_MAIN_ARTIFACT_ID.to_owned(),
            type_map: ArtifactTypeMap::new(),
            unpack_types: BTreeSet::new(),
            skinny_wars: false,
            skinny_modules: false,
            skip_class_path_modification: false,
            include_lib_in_application_xml: false,
            output_timestamp: None,
        }
    }

    /// Set the shared library directory at the archive root.
    #[must_use]
    pub fn with_default_lib_bundle_dir(mut self, dir: Option<&str>) -> Self {
        self.default_lib_bundle_dir = normalize_archive_path(dir);
        self
    }

    /// Set the output file name mapping.
    #[must_use]
    pub fn with_file_name_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.file_name_mapping = mapping.into();
        self
    }

    /// Set the classifier sentinel for unclassified artifacts.
    #[must_use]
    pub fn with_main_artifact_id(mut self, main_artifact_id: impl Into<String>) -> Self {
        self.main_artifact_id = main_artifact_id.into();
        self
    }

    /// Set the custom type mappings.
    #[must_use]
    pub fn with_type_map(mut self, type_map: ArtifactTypeMap) -> Self {
        self.type_map = type_map;
        self
    }

    /// Set the types unpacked by default.
    #[must_use]
    pub fn with_unpack_types(mut self, unpack_types: impl IntoIterator<Item = StandardType>) -> Self {
        self.unpack_types = unpack_types.into_iter().collect();
        self
    }

    /// Strip shared libraries from web applications.
    #[must_use]
    pub const fn with_skinny_wars(mut self, skinny_wars: bool) -> Self {
        self.skinny_wars = skinny_wars;
        self
    }

    /// Strip shared libraries from every module kind.
    #[must_use]
    pub const fn with_skinny_modules(mut self, skinny_modules: bool) -> Self {
        self.skinny_modules = skinny_modules;
        self
    }

    /// Avoid adding new `Class-Path` entries where possible.
    #[must_use]
    pub const fn with_skip_class_path_modification(mut self, skip: bool) -> Self {
        self.skip_class_path_modification = skip;
        self
    }

    /// List inferred libraries in the deployment descriptor.
    #[must_use]
    pub const fn with_include_lib_in_application_xml(mut self, include: bool) -> Self {
        self.include_lib_in_application_xml = include;
        self
    }

    /// Set the reproducible timestamp, in seconds since the Unix epoch.
    #[must_use]
    pub const fn with_output_timestamp(mut self, timestamp: Option<i64>) -> Self {
        self.output_timestamp = timestamp;
        self
    }

    /// Return the target platform version.
    #[must_use]
    pub const fn java_ee_version(&self) -> JavaEeVersion {
        self.java_ee_version
    }

    /// Return the normalised shared library directory.
    #[must_use]
    pub fn default_lib_bundle_dir(&self) -> Option<&str> {
        self.default_lib_bundle_dir.as_deref()
    }

    /// Return the output file name mapping.
    #[must_use]
    pub fn file_name_mapping(&self) -> &str {
        &self.file_name_mapping
    }

    /// Return the classifier sentinel for unclassified artifacts.
    #[must_use]
    pub fn main_artifact_id(&self) -> &str {
        &self.main_artifact_id
    }

    /// Return the artifact type map.
    #[must_use]
    pub const fn type_map(&self) -> &ArtifactTypeMap {
        &self.type_map
    }

    /// Return true when `standard` is unpacked by default.
    #[must_use]
    pub fn unpacks_by_default(&self, standard: StandardType) -> bool {
        self.unpack_types.contains(&standard)
    }

    /// Return whether web applications are stripped of shared libraries.
    #[must_use]
    pub const fn skinny_wars(&self) -> bool {
        self.skinny_wars
    }

    /// Return whether every module is stripped of shared libraries.
    #[must_use]
    pub const fn skinny_modules(&self) -> bool {
        self.skinny_modules
    }

    /// Return whether `Class-Path` modification is suppressed.
    #[must_use]
    pub const fn skip_class_path_modification(&self) -> bool {
        self.skip_class_path_modification
    }

    /// Return whether inferred libraries are listed in the descriptor.
    #[must_use]
    pub const fn include_lib_in_application_xml(&self) -> bool {
        self.include_lib_in_application_xml
    }

    /// Return the reproducible timestamp, if configured.
    #[must_use]
    pub const fn output_timestamp(&self) -> Option<i64> {
        self.output_timestamp
    }

    /// Return whether missing `Class-Path` entries may be appended.
    ///
    /// Appending is forced for platforms older than Java EE 5 and when no
    /// shared library directory is configured, whatever the skip flag says.
    #[must_use]
    pub fn class_path_extension_permitted(&self) -> bool {
        !self.skip_class_path_modification
            || self.java_ee_version < JavaEeVersion::V5
            || self.default_lib_bundle_dir.is_none()
    }
}
