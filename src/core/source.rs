//! Input description: the snippet text plus its dialect flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source dialect of a snippet.
///
/// The component dialect (markup inside expressions) and the typed superset are
/// independent axes, so the combined dialect is its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain JavaScript: `.js`, `.mjs`, `.cjs`
    JavaScript,
    /// JavaScript with markup: `.jsx`
    Jsx,
    /// Typed superset: `.ts`, `.mts`, `.cts`
    TypeScript,
    /// Typed superset with markup: `.tsx`
    Tsx,
}

impl Dialect {
    /// Map a file extension onto a dialect.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(Dialect::JavaScript),
            "jsx" => Some(Dialect::Jsx),
            "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            _ => None,
        }
    }

    /// Combine the two independent dialect axes.
    pub fn from_flags(typed: bool, component: bool) -> Self {
        match (typed, component) {
            (false, false) => Dialect::JavaScript,
            (false, true) => Dialect::Jsx,
            (true, false) => Dialect::TypeScript,
            (true, true) => Dialect::Tsx,
        }
    }

    pub fn is_typed(self) -> bool {
        matches!(self, Dialect::TypeScript | Dialect::Tsx)
    }

    pub fn is_component(self) -> bool {
        matches!(self, Dialect::Jsx | Dialect::Tsx)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::JavaScript => "javascript",
            Dialect::Jsx => "jsx",
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "javascript" => Ok(Dialect::JavaScript),
            "typescript" => Ok(Dialect::TypeScript),
            other => Dialect::from_extension(other)
                .ok_or_else(|| format!("unknown dialect '{}'", s)),
        }
    }
}

/// Immutable per-call description of the analyzed snippet.
///
/// The flags are derived by the front end; `dialect_declared` records whether the
/// caller supplied the dialect or it was inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceUnit<'a> {
    pub text: &'a str,
    pub dialect: Dialect,
    pub dialect_declared: bool,
    pub uses_framework: bool,
    pub uses_typed_superset: bool,
}

impl<'a> SourceUnit<'a> {
    pub fn new(text: &'a str, dialect: Dialect, dialect_declared: bool, uses_framework: bool) -> Self {
        Self {
            text,
            dialect,
            dialect_declared,
            uses_framework,
            uses_typed_superset: dialect.is_typed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Dialect::from_extension("js"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::from_extension("MJS"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::from_extension("jsx"), Some(Dialect::Jsx));
        assert_eq!(Dialect::from_extension("ts"), Some(Dialect::TypeScript));
        assert_eq!(Dialect::from_extension("tsx"), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_extension("py"), None);
    }

    #[test]
    fn test_from_flags_covers_combined_dialect() {
        assert_eq!(Dialect::from_flags(true, true), Dialect::Tsx);
        assert!(Dialect::Tsx.is_typed());
        assert!(Dialect::Tsx.is_component());
        assert!(!Dialect::Jsx.is_typed());
    }

    #[test]
    fn test_parse_dialect_names() {
        assert_eq!("typescript".parse::<Dialect>(), Ok(Dialect::TypeScript));
        assert_eq!("tsx".parse::<Dialect>(), Ok(Dialect::Tsx));
        assert!("cobol".parse::<Dialect>().is_err());
    }
}
