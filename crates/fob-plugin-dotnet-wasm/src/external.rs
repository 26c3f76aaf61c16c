//! Externalization rules
//!
//! Imports under `./_framework/` are produced by the .NET build, not by the
//! bundler, so they must stay as runtime imports. The user's own rule is
//! preserved and extended with that prefix.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Predicate form: `(source, importer, is_resolved) -> external?`
pub type ExternalPredicate = Arc<dyn Fn(&str, Option<&str>, bool) -> bool + Send + Sync>;

/// The host's externalization setting
#[derive(Clone)]
pub enum ExternalOption {
    Patterns(Vec<Regex>),
    Pattern(Regex),
    Predicate(ExternalPredicate),
}

impl ExternalOption {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&str>, bool) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn is_external(&self, source: &str, importer: Option<&str>, is_resolved: bool) -> bool {
        match self {
            Self::Patterns(patterns) => patterns.iter().any(|p| p.is_match(source)),
            Self::Pattern(pattern) => pattern.is_match(source),
            Self::Predicate(f) => f(source, importer, is_resolved),
        }
    }
}

impl fmt::Debug for ExternalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patterns(patterns) => f
                .debug_tuple("Patterns")
                .field(&patterns.iter().map(Regex::as_str).collect::<Vec<_>>())
                .finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// `^\./_framework/`
pub fn framework_external_rule() -> Regex {
    Regex::new(r"^\./_framework/").expect("framework rule is a valid regex")
}

/// Merge the framework rule into whatever the user configured
pub fn compose_external(prev: Option<ExternalOption>) -> ExternalOption {
    let rule = framework_external_rule();
    match prev {
        None => ExternalOption::Patterns(vec![rule]),
        Some(ExternalOption::Patterns(mut patterns)) => {
            patterns.push(rule);
            ExternalOption::Patterns(patterns)
        }
        Some(ExternalOption::Pattern(pattern)) => ExternalOption::Patterns(vec![pattern, rule]),
        Some(ExternalOption::Predicate(prev)) => {
            ExternalOption::predicate(move |source, importer, is_resolved| {
                prev(source, importer, is_resolved) || rule.is_match(source)
            })
        }
    }
}
