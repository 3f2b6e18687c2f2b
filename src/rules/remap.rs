//! Engine rule ids that duplicate a native detector's topic.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Engine rule id to native slug.
pub const RULE_REMAP: &[(&str, &str)] = &[
    ("no-var", "var-hoisting"),
    ("prefer-const", "prefer-const"),
    ("eqeqeq", "loose-equality"),
    ("use-isnan", "nan-comparison"),
    ("valid-typeof", "invalid-typeof-comparison"),
    ("radix", "parseint-without-radix"),
    ("prefer-template", "string-concatenation"),
    ("no-alert", "browser-blocking-dialog"),
    ("no-implied-eval", "settimeout-string-argument"),
    ("no-eval", "eval-usage"),
    ("no-new-func", "eval-usage"),
    ("no-this-before-super", "this-before-super"),
    ("no-extend-native", "builtin-prototype-extension"),
    ("no-nested-ternary", "nested-ternary"),
    ("no-fallthrough", "switch-fallthrough"),
    ("default-case", "switch-missing-default"),
    ("no-empty", "empty-catch"),
    ("no-throw-literal", "throw-literal"),
    ("no-await-in-loop", "await-in-loop"),
    ("require-await", "async-without-await"),
    ("array-callback-return", "array-callback-missing-return"),
    ("no-use-before-define", "hoisting-use-before-init"),
    ("react/jsx-key", "list-missing-key"),
    ("react/no-array-index-key", "list-index-as-key"),
    ("react/no-direct-mutation-state", "state-direct-mutation"),
    ("react-hooks/rules-of-hooks", "hooks-conditional-call"),
];

/// Topic slug for an engine rule id.
///
/// Unmapped rules get `lint-` plus the rule id, lowercased, with every run
/// of other characters collapsed to `-`.
pub fn slug_for_rule(rule_id: &str) -> String {
    if let Some((_, slug)) = RULE_REMAP.iter().find(|(rule, _)| *rule == rule_id) {
        return (*slug).to_string();
    }
    let lowered = rule_id.to_ascii_lowercase();
    let normalized = NON_ALNUM.replace_all(&lowered, "-");
    format!("lint-{}", normalized.trim_matches('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remapped_rules() {
        assert_eq!(slug_for_rule("eqeqeq"), "loose-equality");
        assert_eq!(slug_for_rule("no-new-func"), "eval-usage");
        assert_eq!(slug_for_rule("react-hooks/rules-of-hooks"), "hooks-conditional-call");
    }

    #[test]
    fn test_generated_slugs() {
        assert_eq!(
            slug_for_rule("@typescript-eslint/prefer-optional-chain"),
            "lint-typescript-eslint-prefer-optional-chain"
        );
        assert_eq!(slug_for_rule("no-restricted-syntax"), "lint-no-restricted-syntax");
        assert_eq!(slug_for_rule("Some_Rule"), "lint-some-rule");
    }

    #[test]
    fn test_remap_targets_are_registered_detectors() {
        for (rule, slug) in RULE_REMAP {
            assert!(
                crate::detectors::find_detector(slug).is_some(),
                "{} maps to unknown slug {}",
                rule,
                slug
            );
        }
    }
}
