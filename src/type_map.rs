//! Artifact type normalisation.
//!
//! Dependencies may carry arbitrary type strings (`bundle`, `ejb3`, ...).
//! Before classification every type is reduced to one of the fourteen
//! [`StandardType`] values, either because it already is one or because the
//! build configuration maps it onto one.

use crate::error::{EarError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of artifact types the assembler knows how to package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardType {
    /// Plain Java library.
    Jar,
    /// Enterprise bean module.
    Ejb,
    /// Persistence archive.
    Par,
    /// Client view of an enterprise bean module.
    EjbClient,
    /// Application client module.
    AppClient,
    /// Resource adapter (connector) archive.
    Rar,
    /// Web application archive.
    War,
    /// Service archive.
    Sar,
    /// Web service router archive.
    Wsr,
    /// Hibernate archive.
    Har,
    /// Test-jar attached artifact.
    TestJar,
    /// JBoss-flavoured persistence archive.
    JbossPar,
    /// JBoss-flavoured service archive.
    JbossSar,
    /// JBoss-flavoured Hibernate archive.
    JbossHar,
}

impl StandardType {
    /// Every standard type in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Jar,
        Self::Ejb,
        Self::Par,
        Self::EjbClient,
        Self::AppClient,
        Self::Rar,
        Self::War,
        Self::Sar,
        Self::Wsr,
        Self::Har,
        Self::TestJar,
        Self::JbossPar,
        Self::JbossSar,
        Self::JbossHar,
    ];

    /// Return the type string used in dependency metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jar => "jar",
            Self::Ejb => "ejb",
            Self::Par => "par",
            Self::EjbClient => "ejb-client",
            Self::AppClient => "app-client",
            Self::Rar => "rar",
            Self::War => "war",
            Self::Sar => "sar",
            Self::Wsr => "wsr",
            Self::Har => "har",
            Self::TestJar => "test-jar",
            Self::JbossPar => "jboss-par",
            Self::JbossSar => "jboss-sar",
            Self::JbossHar => "jboss-har",
        }
    }

    /// Return the standard types as a comma-separated list.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl FromStr for StandardType {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for StandardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps custom artifact types onto [`StandardType`] values.
///
/// # Examples
///
/// ```
/// use earsmith::type_map::{ArtifactTypeMap, StandardType};
///
/// let mut map = ArtifactTypeMap::new();
/// map.add_mapping("bundle", "jar").unwrap();
/// assert_eq!(map.standard_type("bundle", "core").unwrap(), StandardType::Jar);
/// assert!(map.is_mapped_to(StandardType::Jar, "bundle"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactTypeMap {
    custom: BTreeMap<String, StandardType>,
}

impl ArtifactTypeMap {
    /// Create a map containing only the built-in standard types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(custom, standard)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidTypeMapping`] for the first rejected pair.
    pub fn from_mappings<'a, I>(mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = Self::new();
        for (custom, target) in mappings {
            map.add_mapping(custom, target)?;
        }
        Ok(map)
    }

    /// Register a custom type.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidTypeMapping`] when `custom` is itself a
    /// standard type, when `target` is not a standard type, or when `custom`
    /// is already mapped to a different target.
    pub fn add_mapping(&mut self, custom: &str, target: &str) -> Result<()> {
        let invalid = |reason| EarError::InvalidTypeMapping {
            custom: custom.to_owned(),
            target: target.to_owned(),
            reason,
        };

        if custom.parse::<StandardType>().is_ok() {
            return Err(invalid("cannot remap a standard artifact type"));
        }
        let standard = target
            .parse::<StandardType>()
            .map_err(|()| invalid("target is not a standard artifact type"))?;

        match self.custom.get(custom) {
            Some(existing) if *existing != standard => {
                Err(invalid("custom type is already mapped to another type"))
            }
            _ => {
                self.custom.insert(custom.to_owned(), standard);
                Ok(())
            }
        }
    }

    /// Normalise `artifact_type` to its standard type.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::UnknownArtifactType`] naming `artifact_id` when
    /// the type is neither standard nor mapped.
    pub fn standard_type(&self, artifact_type: &str, artifact_id: &str) -> Result<StandardType> {
        artifact_type
            .parse::<StandardType>()
            .ok()
            .or_else(|| self.custom.get(artifact_type).copied())
            .ok_or_else(|| EarError::UnknownArtifactType {
                artifact_type: artifact_type.to_owned(),
                artifact_id: artifact_id.to_owned(),
            })
    }

    /// Return true when `candidate` is `standard` or is mapped onto it.
    #[must_use]
    pub fn is_mapped_to(&self, standard: StandardType, candidate: &str) -> bool {
        candidate == standard.as_str() || self.custom.get(candidate) == Some(&standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jar", StandardType::Jar)]
    #[case("ejb-client", StandardType::EjbClient)]
    #[case("jboss-sar", StandardType::JbossSar)]
    fn standard_types_map_to_themselves(#[case] input: &str, #[case] expected: StandardType) {
        let map = ArtifactTypeMap::new();
        assert_eq!(map.standard_type(input, "a").expect("standard"), expected);
    }

    #[test]
    fn unknown_type_names_the_artifact() {
        let map = ArtifactTypeMap::new();
        let err = map.standard_type("bundle", "core-api").expect_err("unknown");
        assert!(err.to_string().contains("core-api"));
    }

    #[rstest]
    #[case::standard_source("war", "jar")]
    #[case::custom_target("bundle", "osgi")]
    fn rejects_invalid_mappings(#[case] custom: &str, #[case] target: &str) {
        let mut map = ArtifactTypeMap::new();
        let err = map.add_mapping(custom, target).expect_err("rejected");
        assert!(matches!(err, EarError::InvalidTypeMapping { .. }));
    }

    #[test]
    fn conflicting_remap_is_rejected_but_repeat_is_accepted() {
        let mut map = ArtifactTypeMap::new();
        map.add_mapping("bundle", "jar").expect("first");
        map.add_mapping("bundle", "jar").expect("repeat");
        assert!(map.add_mapping("bundle", "war").is_err());
    }

    #[test]
    fn is_mapped_to_honours_custom_entries() {
        let map = ArtifactTypeMap::from_mappings([("webapp", "war")]).expect("valid");
        assert!(map.is_mapped_to(StandardType::War, "war"));
        assert!(map.is_mapped_to(StandardType::War, "webapp"));
        assert!(!map.is_mapped_to(StandardType::Jar, "webapp"));
    }

    #[test]
    fn supported_list_mentions_every_type() {
        let list = StandardType::supported_list();
        for standard in StandardType::ALL {
            assert!(list.contains(standard.as_str()));
        }
    }
}
