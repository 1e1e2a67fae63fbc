//! Output file name mapping.
//!
//! Bundle file names are produced from a template such as
//! `@{groupId}@-@{artifactId}@-@{version}@@{dashClassifier?}@.@{extension}@`.
//! Each `@{token}@` is replaced by the matching artifact property; any other
//! text is copied through untouched.

use crate::artifact::ResolvedArtifact;
use thiserror::Error;

/// Default mapping applied to every module without an explicit file name.
pub const DEFAULT_OUTPUT_FILE_NAME_MAPPING: &str =
    "@{groupId}@-@{artifactId}@-@{version}@@{dashClassifier?}@.@{extension}@";

/// Historical artifact file naming, used to recognise snapshot entries
/// written by earlier builds.
pub const ARTIFACT_DEFAULT_FILE_NAME_MAPPING: &str =
    "@{artifactId}@-@{version}@@{dashClassifier?}@.@{extension}@";

const TOKEN_OPEN: &str = "@{";
const TOKEN_CLOSE: &str = "}@";

/// Errors arising from evaluating a file name mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The mapping references a property that does not exist.
    #[error("unknown token @{{{token}}}@ in mapping [{mapping}]")]
    UnknownToken {
        /// The unrecognised token name.
        token: String,
        /// The full mapping.
        mapping: String,
    },

    /// A token was opened but never closed.
    #[error("unterminated token in mapping [{mapping}]")]
    Unterminated {
        /// The full mapping.
        mapping: String,
    },
}

/// Evaluate `mapping` against `artifact`.
///
/// # Errors
///
/// Returns [`NamingError`] for unknown or unterminated tokens.
///
/// # Examples
///
/// ```
/// use earsmith::artifact::ResolvedArtifact;
/// use earsmith::naming::{evaluate, DEFAULT_OUTPUT_FILE_NAME_MAPPING};
///
/// let artifact = ResolvedArtifact::new("org.acme", "shop", "2.1", "war");
/// let name = evaluate(DEFAULT_OUTPUT_FILE_NAME_MAPPING, &artifact).unwrap();
/// assert_eq!(name, "org.acme-shop-2.1.war");
/// ```
pub fn evaluate(mapping: &str, artifact: &ResolvedArtifact) -> Result<String, NamingError> {
    let mut output = String::with_capacity(mapping.len());
    let mut rest = mapping;

    while let Some((literal, body)) = rest.split_once(TOKEN_OPEN) {
        output.push_str(literal);
        let (token, tail) = body
            .split_once(TOKEN_CLOSE)
            .ok_or_else(|| NamingError::Unterminated {
                mapping: mapping.to_owned(),
            })?;
        output.push_str(&token_value(token, artifact).ok_or_else(|| {
            NamingError::UnknownToken {
                token: token.to_owned(),
                mapping: mapping.to_owned(),
            }
        })?);
        rest = tail;
    }

    output.push_str(rest);
    Ok(output)
}

fn token_value(token: &str, artifact: &ResolvedArtifact) -> Option<String> {
    let value = match token {
        "groupId" => artifact.group_id.clone(),
        "groupIdPath" => artifact.group_id.replace('.', "/"),
        "artifactId" => artifact.artifact_id.clone(),
        "version" => artifact.version.clone(),
        "baseVersion" => artifact.base_version().to_owned(),
        "classifier" => artifact.classifier.clone().unwrap_or_default(),
        "dashClassifier" | "dashClassifier?" => artifact
            .classifier
            .as_deref()
            .filter(|classifier| !classifier.is_empty())
            .map(|classifier| format!("-{classifier}"))
            .unwrap_or_default(),
        "extension" => artifact.extension().to_owned(),
        "type" => artifact.artifact_type.clone(),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn artifact() -> ResolvedArtifact {
        ResolvedArtifact::new("org.acme.app", "billing", "1.0-SNAPSHOT", "ejb")
    }

    #[rstest]
    #[case::default(DEFAULT_OUTPUT_FILE_NAME_MAPPING, "org.acme.app-billing-1.0-SNAPSHOT.jar")]
    #[case::legacy(ARTIFACT_DEFAULT_FILE_NAME_MAPPING, "billing-1.0-SNAPSHOT.jar")]
    #[case::no_version("@{artifactId}@.@{extension}@", "billing.jar")]
    #[case::group_path("@{groupIdPath}@/@{artifactId}@", "org/acme/app/billing")]
    #[case::literal("static.jar", "static.jar")]
    fn evaluates_mappings(#[case] mapping: &str, #[case] expected: &str) {
        assert_eq!(evaluate(mapping, &artifact()).expect("valid"), expected);
    }

    #[test]
    fn dash_classifier_is_added_when_present() {
        let classified = artifact().with_classifier("client");
        let name = evaluate(ARTIFACT_DEFAULT_FILE_NAME_MAPPING, &classified).expect("valid");
        assert_eq!(name, "billing-1.0-SNAPSHOT-client.jar");
    }

    #[test]
    fn unknown_token_is_reported() {
        let err = evaluate("@{nope}@.jar", &artifact()).expect_err("unknown");
        assert_eq!(
            err,
            NamingError::UnknownToken {
                token: "nope".to_owned(),
                mapping: "@{nope}@.jar".to_owned(),
            }
        );
    }

    #[test]
    fn unterminated_token_is_reported() {
        let err = evaluate("@{artifactId.jar", &artifact()).expect_err("unterminated");
        assert!(matches!(err, NamingError::Unterminated { .. }));
    }
}
