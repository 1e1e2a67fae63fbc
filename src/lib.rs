//! Enterprise archive (EAR) assembly.
//!
//! This crate turns a project's resolved dependencies into an EAR: it
//! classifies them into modules, places them in a work directory, rewrites
//! each module's manifest `Class-Path` to match the shared library layout,
//! adds loose resources and writes the final archive. It is used by the
//! `earsmith` CLI in the `packager` crate.
//!
//! # Modules
//!
//! - [`artifact`] - Resolved dependency coordinates, scope and file
//! - [`type_map`] - Standard artifact types and user type mappings
//! - [`java_ee`] - Target platform versions
//! - [`context`] - Build-wide settings shared by every stage
//! - [`naming`] - Output file name mappings
//! - [`module`] - Module kinds, bundle locations and uris
//! - [`lookup`] - Artifact lookup and classpath entry matching
//! - [`registry`] - Module declarations and the classified module set
//! - [`placement`] - Copying or unpacking modules into the work directory
//! - [`classpath`] - Manifest `Class-Path` rewriting
//! - [`sync`] - Stale file tracking for incremental builds
//! - [`resources`] - Loose resources and the deployment descriptor
//! - [`filter`] - Include and exclude glob filters
//! - [`archive`] - Zip extraction and creation
//! - [`config`] - `earsmith.toml` loading
//! - [`provider`] - Sources of resolved dependencies
//! - [`assembly`] - End-to-end orchestration
//! - [`error`] - Error types

pub mod archive;
pub mod artifact;
pub mod assembly;
pub mod classpath;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod java_ee;
pub mod lookup;
pub mod module;
pub mod naming;
pub mod placement;
pub mod provider;
pub mod registry;
pub mod resources;
pub mod sync;
pub mod type_map;

pub use artifact::{Coordinates, ResolvedArtifact, Scope};
pub use assembly::{AssemblyReport, assemble, plan_modules};
pub use config::{BuildConfig, CONFIG_FILE_NAME};
pub use context::ExecutionContext;
pub use error::{EarError, Result};
pub use java_ee::JavaEeVersion;
pub use module::{Module, ModuleKind};
pub use provider::{ConfiguredDependencies, DependencyProvider};
pub use registry::{ModuleDeclaration, ModuleSet};
pub use type_map::{ArtifactTypeMap, StandardType};
