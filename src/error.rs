//! Error types for EAR assembly.
//!
//! Each variant carries enough context (artifact, module identity, path) for
//! the failure to be actionable without a debugger. Everything here is fatal
//! for the build; recoverable conditions such as an unreadable work directory
//! during stale-file detection are logged instead of surfacing as errors.

use crate::archive::ArchiveError;
use crate::classpath::RewriteError;
use crate::naming::NamingError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while assembling an enterprise archive.
#[derive(Debug, Error)]
pub enum EarError {
    /// An artifact type is neither standard nor mapped by the user.
    #[error("unknown artifact type [{artifact_type}] for {artifact_id}")]
    UnknownArtifactType {
        /// The unrecognised type string.
        artifact_type: String,
        /// Artifact id of the offending artifact.
        artifact_id: String,
    },

    /// A user-supplied artifact type mapping is invalid.
    #[error("invalid artifact type mapping [{custom} -> {target}]: {reason}")]
    InvalidTypeMapping {
        /// The custom type being mapped.
        custom: String,
        /// The requested standard type.
        target: String,
        /// Why the mapping was rejected.
        reason: &'static str,
    },

    /// The configured Java EE version is not supported.
    #[error("invalid Java EE version [{value}]; supported versions are {supported}")]
    InvalidJavaEeVersion {
        /// The rejected version string.
        value: String,
        /// Comma-separated list of accepted versions.
        supported: String,
    },

    /// An explicit module declaration lacks its group or artifact id.
    #[error("could not resolve module [{group_id}:{artifact_id}:{module_type}]: group and artifact id are required")]
    MissingCoordinates {
        /// Declared group id, or `null` when absent.
        group_id: String,
        /// Declared artifact id, or `null` when absent.
        artifact_id: String,
        /// Declared module type.
        module_type: String,
    },

    /// An explicit module declaration does not match any dependency.
    #[error("module [{module}] is not a dependency of the project")]
    ArtifactNotFound {
        /// Identity of the declared module.
        module: String,
    },

    /// An explicit module declaration matches several classified artifacts.
    #[error("module [{module}] has {candidates} candidates, please provide a classifier")]
    AmbiguousArtifact {
        /// Identity of the declared module.
        module: String,
        /// Number of matching candidates.
        candidates: usize,
    },

    /// An unpack type is not a standard artifact type.
    #[error("invalid unpack type [{value}]; supported types are {supported}")]
    InvalidUnpackType {
        /// The rejected type.
        value: String,
        /// Comma-separated list of standard types.
        supported: String,
    },

    /// A module's artifact file is a directory rather than a packaged file.
    #[error("cannot copy a directory: {path}; did you package {module}?")]
    SourceIsDirectory {
        /// Identity of the module.
        module: String,
        /// The directory that was expected to be a file.
        path: Utf8PathBuf,
    },

    /// A module has no artifact file at all.
    #[error("module [{module}] has no resolved artifact file")]
    UnresolvedArtifactFile {
        /// Identity of the module.
        module: String,
    },

    /// Copying or unpacking a module into the work directory failed.
    #[error("failed to place module [{module}] at {path}")]
    Placement {
        /// Identity of the module.
        module: String,
        /// Destination inside the work directory.
        path: Utf8PathBuf,
        /// The underlying failure.
        #[source]
        source: ArchiveError,
    },

    /// Rewriting a module's manifest classpath failed.
    #[error("failed to rewrite the manifest classpath of module [{module}]")]
    Rewrite {
        /// Identity of the module.
        module: String,
        /// The underlying failure.
        #[source]
        source: RewriteError,
    },

    /// A bundle file name could not be computed for a module.
    #[error("failed to compute the bundle file name of [{module}]")]
    Naming {
        /// Identity of the module.
        module: String,
        /// The underlying failure.
        #[source]
        source: NamingError,
    },

    /// The build configuration could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// A glob pattern from the configuration is malformed.
    #[error("invalid pattern [{pattern}]: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the parse error.
        reason: String,
    },

    /// The deployment descriptor is required but missing.
    #[error("deployment descriptor {path} does not exist")]
    MissingDescriptor {
        /// Where the descriptor was expected.
        path: Utf8PathBuf,
    },

    /// Copying loose EAR resources failed.
    #[error("error copying EAR resource {path}")]
    Resource {
        /// The resource being copied.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Creating the final archive failed.
    #[error("error assembling EAR {path}")]
    Assembly {
        /// Path of the archive being written.
        path: Utf8PathBuf,
        /// The underlying failure.
        #[source]
        source: ArchiveError,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`EarError`].
pub type Result<T> = std::result::Result<T, EarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_names_the_artifact() {
        let err = EarError::UnknownArtifactType {
            artifact_type: "bundle".to_owned(),
            artifact_id: "core-api".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bundle"));
        assert!(msg.contains("core-api"));
    }

    #[test]
    fn ambiguous_artifact_reports_candidate_count() {
        let err = EarError::AmbiguousArtifact {
            module: "jar:eartest:myartifact".to_owned(),
            candidates: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 candidates"));
        assert!(msg.contains("provide a classifier"));
    }

    #[test]
    fn rewrite_error_keeps_module_and_source() {
        let err = EarError::Rewrite {
            module: "war:eartest:web:1.0".to_owned(),
            source: RewriteError::Io(std::io::Error::other("disk full")),
        };
        assert!(err.to_string().contains("war:eartest:web:1.0"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn directory_source_suggests_packaging() {
        let err = EarError::SourceIsDirectory {
            module: "ejb:eartest:ejb:1.0".to_owned(),
            path: Utf8PathBuf::from("/work/ejb/target/classes"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cannot copy a directory"));
        assert!(msg.contains("target/classes"));
    }
}
