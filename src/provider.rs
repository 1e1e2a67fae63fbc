//! Sources of resolved dependencies.
//!
//! The assembly pipeline does not resolve dependencies itself. A
//! [`DependencyProvider`] hands over the already resolved artifacts, with
//! scope, optional flag and packaged file filled in.

use crate::artifact::ResolvedArtifact;
use crate::config::BuildConfig;
use crate::error::Result;
use log::debug;

/// Yields the resolved dependencies of the project being packaged.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyProvider {
    /// Return every resolved dependency, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error when the dependencies cannot be resolved.
    fn resolved_artifacts(&self) -> Result<Vec<ResolvedArtifact>>;
}

/// Dependencies listed in the `[[dependencies]]` table of the configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredDependencies {
    artifacts: Vec<ResolvedArtifact>,
}

impl ConfiguredDependencies {
    /// Take the dependencies of `config`, with files resolved against the
    /// configuration directory.
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            artifacts: config.resolved_dependencies(),
        }
    }
}

impl From<Vec<ResolvedArtifact>> for ConfiguredDependencies {
    fn from(artifacts: Vec<ResolvedArtifact>) -> Self {
        Self { artifacts }
    }
}

impl DependencyProvider for ConfiguredDependencies {
    fn resolved_artifacts(&self) -> Result<Vec<ResolvedArtifact>> {
        debug!(target: "provider", "{} configured dependencies", self.artifacts.len());
        Ok(self.artifacts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn configured_dependencies_keep_declaration_order() {
        let config = BuildConfig::from_toml_str(
            concat!(
                "[[dependencies]]\ngroup_id = \"g\"\nartifact_id = \"b\"\nversion = \"1\"\n",
                "[[dependencies]]\ngroup_id = \"g\"\nartifact_id = \"a\"\nversion = \"1\"\n",
            ),
            Utf8Path::new("earsmith.toml"),
        )
        .expect("config parses");

        let artifacts = ConfiguredDependencies::from_config(&config)
            .resolved_artifacts()
            .expect("resolves");
        let ids: Vec<&str> = artifacts.iter().map(|artifact| artifact.artifact_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }
}
