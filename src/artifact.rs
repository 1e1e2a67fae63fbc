//! Resolved dependency artifacts and their coordinates.
//!
//! A [`ResolvedArtifact`] is what the dependency provider hands over: the
//! coordinates of one dependency, the scope it was resolved in, and the
//! packaged file on disk. Modules are built from these values and never
//! modify them.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fmt;

/// Suffix marking a snapshot base version.
const SNAPSHOT_SUFFIX: &str = "SNAPSHOT";

/// Dependency scope as reported by the dependency provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed to compile and run; packaged.
    #[default]
    Compile,
    /// Needed only at runtime; packaged.
    Runtime,
    /// Supplied by the container; never packaged.
    Provided,
    /// Supplied by the host system; never packaged.
    System,
    /// Needed only by tests.
    Test,
    /// Import-only dependency management entries.
    Import,
}

impl Scope {
    /// Return true for scopes in the compile+runtime closure.
    ///
    /// This mirrors the usual scope filter: `compile` implies `provided` and
    /// `system`, while `runtime` adds runtime-only artifacts.
    #[must_use]
    pub const fn in_compile_runtime_closure(self) -> bool {
        matches!(
            self,
            Self::Compile | Self::Runtime | Self::Provided | Self::System
        )
    }

    /// Return true for scopes that are packaged at runtime.
    #[must_use]
    pub const fn is_runtime(self) -> bool {
        matches!(self, Self::Compile | Self::Runtime)
    }

    /// Return the lowercase scope name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::System => "system",
            Self::Test => "test",
            Self::Import => "import",
        }
    }
}

/// Identity of a module inside the registry.
///
/// Two artifacts with the same coordinates collapse to one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinates {
    /// Group id.
    pub group_id: String,
    /// Artifact id.
    pub artifact_id: String,
    /// Optional classifier.
    pub classifier: Option<String>,
    /// Artifact type as declared by the dependency.
    pub artifact_type: String,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.artifact_type, self.group_id, self.artifact_id
        )?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// One dependency resolved by the host build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedArtifact {
    /// Group id.
    pub group_id: String,
    /// Artifact id.
    pub artifact_id: String,
    /// Resolved version (timestamped for deployed snapshots).
    pub version: String,
    /// Base version; equals `version` except for timestamped snapshots.
    #[serde(default)]
    pub base_version: Option<String>,
    /// Optional classifier.
    #[serde(default)]
    pub classifier: Option<String>,
    /// Artifact type, `jar` by default.
    #[serde(default = "ResolvedArtifact::default_type", rename = "type")]
    pub artifact_type: String,
    /// Resolution scope.
    #[serde(default)]
    pub scope: Scope,
    /// Whether the dependency is optional.
    #[serde(default)]
    pub optional: bool,
    /// Packaged artifact file, when resolution produced one.
    #[serde(default)]
    pub file: Option<Utf8PathBuf>,
}

impl ResolvedArtifact {
    fn default_type() -> String {
        "jar".to_owned()
    }

    /// Create a compile-scoped artifact with no classifier and no file.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        artifact_type: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            base_version: None,
            classifier: None,
            artifact_type: artifact_type.into(),
            scope: Scope::Compile,
            optional: false,
            file: None,
        }
    }

    /// Set the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Set the scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the packaged file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Mark the artifact optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Return the base version, falling back to the resolved version.
    #[must_use]
    pub fn base_version(&self) -> &str {
        self.base_version.as_deref().unwrap_or(&self.version)
    }

    /// Return true when this is a snapshot build.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.base_version().ends_with(SNAPSHOT_SUFFIX)
    }

    /// Return the registry identity of this artifact.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            artifact_type: self.artifact_type.clone(),
        }
    }

    /// Return the packaged file, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Utf8Path> {
        self.file.as_deref()
    }

    /// Return the file name of the packaged file, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file.as_deref().and_then(Utf8Path::file_name)
    }

    /// Return the file extension implied by the artifact type.
    ///
    /// Types that are packaged as plain jars map to `jar`; every other type
    /// is its own extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.artifact_type.as_str() {
            "ejb" | "ejb-client" | "test-jar" | "app-client" | "jboss-par" | "jboss-har" => "jar",
            other => other,
        }
    }
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        write!(f, ":{}", self.artifact_type)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}:{}", self.version, self.scope.as_str())
    }
}
