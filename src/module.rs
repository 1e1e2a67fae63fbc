//! Typed module descriptors.
//!
//! A [`Module`] wraps one resolved artifact destined for the enterprise
//! archive. Its [`ModuleKind`] is fixed at construction and carries the
//! kind-specific payload; the capability flags start from the per-kind
//! defaults and may be overridden by an explicit declaration before the
//! module set is frozen.

use crate::artifact::{Coordinates, ResolvedArtifact};
use crate::type_map::StandardType;
use camino::Utf8Path;
use std::cell::OnceCell;
use std::fmt;

/// Library directory of web applications.
pub const WEB_LIB_DIRECTORY: &str = "WEB-INF/lib";

/// Library directory of application clients.
pub const APP_CLIENT_LIB_DIRECTORY: &str = "lib";

/// Library directory of connector-like archives: their root.
pub const ROOT_LIB_DIRECTORY: &str = "/";

/// The kind of a module and its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// A plain library referenced by other modules.
    Library {
        /// Whether the descriptor should list this library as a module.
        include_in_application_xml: bool,
    },
    /// An enterprise bean module.
    BusinessComponent,
    /// The client view of an enterprise bean module.
    BusinessComponentClient,
    /// A persistence archive.
    PersistenceUnit,
    /// An application client.
    ApplicationClient,
    /// A resource adapter archive.
    Connector,
    /// A web service router archive.
    WebServiceRouter,
    /// A web application.
    WebApplication {
        /// Context root the application is deployed under.
        context_root: String,
    },
    /// A service archive.
    ServiceArchive,
    /// A Hibernate archive.
    HibernateArchive,
}

impl ModuleKind {
    /// Build the kind for a standard type with its default payload.
    #[must_use]
    pub fn for_type(standard: StandardType, artifact: &ResolvedArtifact) -> Self {
        match standard {
            StandardType::Jar | StandardType::TestJar => Self::Library {
                include_in_application_xml: false,
            },
            StandardType::Ejb => Self::BusinessComponent,
            StandardType::EjbClient => Self::BusinessComponentClient,
            StandardType::Par | StandardType::JbossPar => Self::PersistenceUnit,
            StandardType::AppClient => Self::ApplicationClient,
            StandardType::Rar => Self::Connector,
            StandardType::Wsr => Self::WebServiceRouter,
            StandardType::War => Self::WebApplication {
                context_root: default_context_root(artifact),
            },
            StandardType::Sar | StandardType::JbossSar => Self::ServiceArchive,
            StandardType::Har | StandardType::JbossHar => Self::HibernateArchive,
        }
    }

    /// Return the directory this kind embeds its own libraries under.
    #[must_use]
    pub const fn default_lib_dir(&self) -> Option<&'static str> {
        match self {
            Self::WebApplication { .. } => Some(WEB_LIB_DIRECTORY),
            Self::ApplicationClient => Some(APP_CLIENT_LIB_DIRECTORY),
            Self::Connector
            | Self::WebServiceRouter
            | Self::ServiceArchive
            | Self::HibernateArchive => Some(ROOT_LIB_DIRECTORY),
            Self::Library { .. }
            | Self::BusinessComponentClient
            | Self::BusinessComponent
            | Self::PersistenceUnit => None,
        }
    }

    /// Return whether other modules reference this kind by default.
    #[must_use]
    pub const fn default_class_path_item(&self) -> bool {
        self.is_library()
    }

    /// Return whether this kind's own manifest may be rewritten.
    ///
    /// Libraries are the referenced side of a classpath, never the referrer.
    #[must_use]
    pub const fn changes_manifest_classpath(&self) -> bool {
        !self.is_library()
    }

    /// Return true for library-like kinds.
    #[must_use]
    pub const fn is_library(&self) -> bool {
        matches!(self, Self::Library { .. } | Self::BusinessComponentClient)
    }

    /// Return true for web applications.
    #[must_use]
    pub const fn is_web(&self) -> bool {
        matches!(self, Self::WebApplication { .. })
    }

    /// Return the context root of a web application.
    #[must_use]
    pub fn context_root(&self) -> Option<&str> {
        match self {
            Self::WebApplication { context_root } => Some(context_root),
            _ => None,
        }
    }

    /// Return a short human-readable name for the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Library { .. } => "library",
            Self::BusinessComponent => "ejb",
            Self::BusinessComponentClient => "ejb-client",
            Self::PersistenceUnit => "persistence",
            Self::ApplicationClient => "app-client",
            Self::Connector => "connector",
            Self::WebServiceRouter => "web-service-router",
            Self::WebApplication { .. } => "web",
            Self::ServiceArchive => "service",
            Self::HibernateArchive => "hibernate",
        }
    }
}

fn default_context_root(artifact: &ResolvedArtifact) -> String {
    format!("/{}", artifact.artifact_id)
}

/// Normalise an archive path prefix.
///
/// Backslashes become forward slashes, leading slashes are stripped and a
/// trailing slash is added to any non-empty result. `None` stays `None`.
///
/// # Examples
///
/// ```
/// use earsmith::module::normalize_archive_path;
///
/// assert_eq!(normalize_archive_path(Some("/APP-INF/lib")).as_deref(), Some("APP-INF/lib/"));
/// assert_eq!(normalize_archive_path(Some("/")).as_deref(), Some(""));
/// assert_eq!(normalize_archive_path(None), None);
/// ```
#[must_use]
pub fn normalize_archive_path(path: Option<&str>) -> Option<String> {
    let cleaned = path?.replace('\\', "/");
    let trimmed = cleaned.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        Some(trimmed.to_owned())
    } else {
        Some(format!("{trimmed}/"))
    }
}

/// A typed, placement-aware descriptor for one artifact in the archive.
#[derive(Debug, Clone)]
pub struct Module {
    kind: ModuleKind,
    standard_type: StandardType,
    artifact: ResolvedArtifact,
    bundle_dir: Option<String>,
    bundle_file_name: String,
    lib_dir: Option<String>,
    class_path_item: bool,
    change_manifest_classpath: bool,
    unpack: Option<bool>,
    excluded: bool,
    uri: OnceCell<String>,
}

impl Module {
    /// Create a module with the per-kind defaults.
    #[must_use]
    pub fn new(
        kind: ModuleKind,
        standard_type: StandardType,
        artifact: ResolvedArtifact,
        bundle_file_name: impl Into<String>,
    ) -> Self {
        Self {
            lib_dir: normalize_archive_path(kind.default_lib_dir()),
            class_path_item: kind.default_class_path_item(),
            change_manifest_classpath: kind.changes_manifest_classpath(),
            kind,
            standard_type,
            artifact,
            bundle_dir: None,
            bundle_file_name: bundle_file_name.into(),
            unpack: None,
            excluded: false,
            uri: OnceCell::new(),
        }
    }

    /// Place the module under `bundle_dir`.
    #[must_use]
    pub fn with_bundle_dir(mut self, bundle_dir: Option<&str>) -> Self {
        self.bundle_dir = normalize_archive_path(bundle_dir);
        self
    }

    /// Override the directory holding the module's embedded libraries.
    #[must_use]
    pub fn with_lib_dir(mut self, lib_dir: Option<&str>) -> Self {
        self.lib_dir = normalize_archive_path(lib_dir);
        self
    }

    /// Override whether other modules reference this one.
    #[must_use]
    pub const fn with_class_path_item(mut self, class_path_item: bool) -> Self {
        self.class_path_item = class_path_item;
        self
    }

    /// Force the module to be unpacked (or kept packed).
    #[must_use]
    pub const fn with_unpack(mut self, unpack: Option<bool>) -> Self {
        self.unpack = unpack;
        self
    }

    /// Exclude the module from the build.
    #[must_use]
    pub const fn with_excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }

    /// Pin the module's uri instead of deriving it.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = OnceCell::from(uri.into());
        self
    }

    /// Return the module kind.
    #[must_use]
    pub const fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// Return the canonical type the module was classified as.
    #[must_use]
    pub const fn standard_type(&self) -> StandardType {
        self.standard_type
    }

    /// Return the artifact backing the module.
    #[must_use]
    pub const fn artifact(&self) -> &ResolvedArtifact {
        &self.artifact
    }

    /// Return the registry identity of the module.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.artifact.coordinates()
    }

    /// Return the packaged artifact file, if resolved.
    #[must_use]
    pub fn artifact_file(&self) -> Option<&Utf8Path> {
        self.artifact.file()
    }

    /// Return the normalised bundle directory.
    #[must_use]
    pub fn bundle_dir(&self) -> Option<&str> {
        self.bundle_dir.as_deref()
    }

    /// Return the file name the module is bundled under.
    #[must_use]
    pub fn bundle_file_name(&self) -> &str {
        &self.bundle_file_name
    }

    /// Return the normalised library directory, if the module embeds any.
    #[must_use]
    pub fn lib_dir(&self) -> Option<&str> {
        self.lib_dir.as_deref()
    }

    /// Return whether other modules reference this one in `Class-Path`.
    #[must_use]
    pub const fn is_class_path_item(&self) -> bool {
        self.class_path_item
    }

    /// Return whether this module's manifest may be rewritten.
    #[must_use]
    pub const fn changes_manifest_classpath(&self) -> bool {
        self.change_manifest_classpath
    }

    /// Return the unpack override.
    #[must_use]
    pub const fn unpack(&self) -> Option<bool> {
        self.unpack
    }

    /// Return whether the module is excluded from the build.
    #[must_use]
    pub const fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// Return the module's path inside the archive.
    ///
    /// Derived from the bundle directory and file name on first use and
    /// stable from then on.
    #[must_use]
    pub fn uri(&self) -> &str {
        self.uri.get_or_init(|| {
            format!(
                "{}{}",
                self.bundle_dir.as_deref().unwrap_or_default(),
                self.bundle_file_name
            )
        })
    }

    /// Return true when `other` has the same identity.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.coordinates() == other.coordinates()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.standard_type, self.artifact.group_id, self.artifact.artifact_id
        )?;
        if let Some(classifier) = &self.artifact.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.artifact.version)
    }
}
