//! Include and exclude globs over archive-relative paths.

use crate::error::{EarError, Result};
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Selects relative paths by include and exclude patterns.
///
/// An empty include list accepts everything. Excludes always win.
///
/// # Examples
///
/// ```
/// use earsmith::filter::PathFilter;
///
/// let filter = PathFilter::new(&["**/*.xml".to_owned()], &["**/test-*".to_owned()]).unwrap();
/// assert!(filter.accepts("META-INF/jboss-app.xml"));
/// assert!(!filter.accepts("META-INF/test-app.xml"));
/// assert!(!filter.accepts("README.txt"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl PathFilter {
    /// Compile include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`EarError::InvalidPattern`] for the first malformed pattern.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        Ok(Self {
            includes: compile(includes)?,
            excludes: compile(excludes)?,
        })
    }

    /// Return true when `relative` passes the filter.
    #[must_use]
    pub fn accepts(&self, relative: &str) -> bool {
        let matches = |pattern: &Pattern| pattern.matches_with(relative, MATCH_OPTIONS);
        (self.includes.is_empty() || self.includes.iter().any(matches))
            && !self.excludes.iter().any(matches)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|err| EarError::InvalidPattern {
                pattern: pattern.clone(),
                reason: err.msg.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn patterns(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[rstest]
    #[case::everything(&[], &[], "any/file.txt", true)]
    #[case::excluded(&[], &["**/*.bak"], "conf/app.bak", false)]
    #[case::single_star_stays_in_directory(&["*.xml"], &[], "META-INF/application.xml", false)]
    #[case::double_star_crosses_directories(&["**/*.xml"], &[], "META-INF/application.xml", true)]
    fn filters_paths(
        #[case] includes: &[&str],
        #[case] excludes: &[&str],
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        let filter = PathFilter::new(&patterns(includes), &patterns(excludes)).expect("valid");
        assert_eq!(filter.accepts(path), expected);
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let err = PathFilter::new(&patterns(&["[unclosed"]), &[]).expect_err("invalid");
        assert!(matches!(err, EarError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
    }
}
