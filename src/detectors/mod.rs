//! Detector library.
//!
//! Every detector is a pure function of the lowered tree and the inference
//! maps, returning its full list of candidate findings. Report policies are
//! applied afterwards by [`apply_policy`], never inside the traversal.

pub mod arrays;
pub mod async_patterns;
pub mod builtins;
pub mod classes;
pub mod comparisons;
pub mod control_flow;
pub mod data_flow;
pub mod declarations;
pub mod dom;
pub mod error_handling;
pub mod modern_syntax;
pub mod react;
pub mod strings;
pub mod timers_modules;

use crate::core::{Finding, SourceUnit};
use crate::frontend::ast::{Expr, Program, Stmt};
use crate::inference::{AliasGroups, TypeMap};
use crate::traversal::{NodeRef, WalkContext, Walker};
use std::collections::HashSet;

/// What a detector needs to run.
#[derive(Debug, Clone, Copy)]
pub enum DetectorClass {
    /// Single pass over the tree, no inference
    Syntactic,
    /// Two passes: collect bindings, then scan
    Stateful,
    /// Needs the type map and alias groups
    DataFlow,
}

/// How many findings per slug survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPolicy {
    EveryOccurrence,
    /// Keep only the earliest finding per slug
    FirstOnly,
}

/// Read-only inputs shared by all detectors in one analysis call.
pub struct DetectorContext<'a> {
    pub program: &'a Program,
    pub unit: SourceUnit<'a>,
    pub types: &'a TypeMap,
    pub aliases: &'a AliasGroups,
    pub walker: Walker,
}

impl<'a> DetectorContext<'a> {
    pub fn collect<T>(
        &self,
        f: impl FnMut(NodeRef<'a>, &WalkContext<'a>) -> Option<T>,
    ) -> Vec<T> {
        self.walker.collect_program(self.program, f)
    }

    /// Collect over every expression in the program.
    pub fn exprs<T>(&self, mut f: impl FnMut(&'a Expr, &WalkContext<'a>) -> Option<T>) -> Vec<T> {
        self.collect(|node, ctx| match node {
            NodeRef::Expr(expr) => f(expr, ctx),
            _ => None,
        })
    }

    /// Collect over every statement in the program.
    pub fn stmts<T>(&self, mut f: impl FnMut(&'a Stmt, &WalkContext<'a>) -> Option<T>) -> Vec<T> {
        self.collect(|node, ctx| match node {
            NodeRef::Stmt(stmt) => f(stmt, ctx),
            _ => None,
        })
    }
}

pub type DetectorFn = fn(&DetectorContext<'_>) -> Vec<Finding>;

pub struct DetectorSpec {
    /// Stable id; equal to the slug the detector reports
    pub id: &'static str,
    pub class: DetectorClass,
    /// Run only when framework usage was detected
    pub framework_only: bool,
    pub policy: ReportPolicy,
    pub run: DetectorFn,
}

impl DetectorSpec {
    pub fn is_data_flow(&self) -> bool {
        matches!(self.class, DetectorClass::DataFlow)
    }
}

const fn syntactic(id: &'static str, policy: ReportPolicy, run: DetectorFn) -> DetectorSpec {
    DetectorSpec {
        id,
        class: DetectorClass::Syntactic,
        framework_only: false,
        policy,
        run,
    }
}

const fn flow(id: &'static str, run: DetectorFn) -> DetectorSpec {
    DetectorSpec {
        id,
        class: DetectorClass::DataFlow,
        framework_only: false,
        policy: ReportPolicy::EveryOccurrence,
        run,
    }
}

const fn framework(
    id: &'static str,
    class: DetectorClass,
    policy: ReportPolicy,
    run: DetectorFn,
) -> DetectorSpec {
    DetectorSpec {
        id,
        class,
        framework_only: true,
        policy,
        run,
    }
}

use DetectorClass::{Stateful, Syntactic};
use ReportPolicy::{EveryOccurrence as Every, FirstOnly as First};

/// Every detector, in execution order.
pub static DETECTORS: &[DetectorSpec] = &[
    // Declarations
    syntactic("var-hoisting", First, declarations::detect_var_hoisting),
    syntactic("const-declaration", First, declarations::detect_const_declaration),
    syntactic("prefer-const", Every, declarations::detect_prefer_const),
    syntactic(
        "hoisting-use-before-init",
        Every,
        declarations::detect_hoisting_use_before_init,
    ),
    syntactic("destructuring", First, declarations::detect_destructuring),
    // Comparisons
    syntactic("loose-equality", Every, comparisons::detect_loose_equality),
    syntactic("strict-equality", First, comparisons::detect_strict_equality),
    syntactic("nan-comparison", Every, comparisons::detect_nan_comparison),
    syntactic(
        "invalid-typeof-comparison",
        Every,
        comparisons::detect_invalid_typeof_comparison,
    ),
    syntactic("float-equality", Every, comparisons::detect_float_equality),
    // Strings and numbers
    syntactic("parseint-without-radix", Every, strings::detect_parseint_without_radix),
    syntactic("template-literal", First, strings::detect_template_literal),
    syntactic("string-concatenation", First, strings::detect_string_concatenation),
    // JSON, dates, regular expressions
    syntactic("json-parse-without-try", Every, builtins::detect_json_parse_without_try),
    syntactic("json-deep-clone", First, builtins::detect_json_deep_clone),
    syntactic("date-month-off-by-one", Every, builtins::detect_date_month_off_by_one),
    syntactic("regex-global-test", Every, builtins::detect_regex_global_test),
    // DOM and browser
    syntactic("dom-innerhtml-assignment", Every, dom::detect_dom_innerhtml_assignment),
    syntactic("document-write", Every, dom::detect_document_write),
    syntactic("dom-query-in-loop", First, dom::detect_dom_query_in_loop),
    syntactic("browser-blocking-dialog", Every, dom::detect_browser_blocking_dialog),
    // Timers, eval and modules
    syntactic(
        "settimeout-string-argument",
        Every,
        timers_modules::detect_settimeout_string_argument,
    ),
    syntactic(
        "setinterval-without-clear",
        First,
        timers_modules::detect_setinterval_without_clear,
    ),
    syntactic("eval-usage", Every, timers_modules::detect_eval_usage),
    syntactic("commonjs-require", First, timers_modules::detect_commonjs_require),
    syntactic("es-module-import", First, timers_modules::detect_es_module_import),
    // Classes
    syntactic("this-before-super", Every, classes::detect_this_before_super),
    syntactic(
        "builtin-prototype-extension",
        Every,
        classes::detect_builtin_prototype_extension,
    ),
    syntactic("class-syntax", First, classes::detect_class_syntax),
    // Control flow
    syntactic("nested-ternary", Every, control_flow::detect_nested_ternary),
    syntactic("switch-fallthrough", Every, control_flow::detect_switch_fallthrough),
    syntactic("switch-missing-default", Every, control_flow::detect_switch_missing_default),
    syntactic("for-of-loop", First, control_flow::detect_for_of_loop),
    // Error handling
    syntactic("empty-catch", Every, error_handling::detect_empty_catch),
    syntactic("throw-literal", Every, error_handling::detect_throw_literal),
    syntactic("try-catch-usage", First, error_handling::detect_try_catch_usage),
    // Async
    syntactic("promise-without-catch", Every, async_patterns::detect_promise_without_catch),
    syntactic("async-without-await", Every, async_patterns::detect_async_without_await),
    syntactic("await-in-loop", First, async_patterns::detect_await_in_loop),
    syntactic("async-await-usage", First, async_patterns::detect_async_await_usage),
    syntactic("callback-hell", First, async_patterns::detect_callback_hell),
    // Modern syntax
    syntactic("arrow-function", First, modern_syntax::detect_arrow_function),
    syntactic("optional-chaining", First, modern_syntax::detect_optional_chaining),
    syntactic("spread-operator", First, modern_syntax::detect_spread_operator),
    // Array methods
    syntactic(
        "array-callback-missing-return",
        Every,
        arrays::detect_array_callback_missing_return,
    ),
    syntactic("foreach-return-value", Every, arrays::detect_foreach_return_value),
    syntactic("array-method-chaining", First, arrays::detect_array_method_chaining),
    syntactic("delete-array-element", Every, arrays::detect_delete_array_element),
    // Component framework: hooks
    framework(
        "hooks-conditional-call",
        Syntactic,
        Every,
        react::hooks::detect_hooks_conditional_call,
    ),
    framework(
        "effect-missing-dependency-array",
        Syntactic,
        Every,
        react::hooks::detect_effect_missing_dependency_array,
    ),
    framework(
        "effect-async-callback",
        Syntactic,
        Every,
        react::hooks::detect_effect_async_callback,
    ),
    framework("use-state-hook", Syntactic, First, react::hooks::detect_use_state_hook),
    framework("custom-hook", Syntactic, First, react::hooks::detect_custom_hook),
    // Component framework: state
    framework(
        "state-direct-mutation",
        Stateful,
        Every,
        react::state::detect_state_direct_mutation,
    ),
    framework(
        "setstate-in-render",
        Stateful,
        Every,
        react::state::detect_setstate_in_render,
    ),
    framework(
        "stale-state-update",
        Stateful,
        Every,
        react::state::detect_stale_state_update,
    ),
    framework(
        "functional-state-update",
        Stateful,
        First,
        react::state::detect_functional_state_update,
    ),
    // Component framework: rendering
    framework(
        "list-missing-key",
        Syntactic,
        Every,
        react::rendering::detect_list_missing_key,
    ),
    framework(
        "list-index-as-key",
        Syntactic,
        Every,
        react::rendering::detect_list_index_as_key,
    ),
    framework(
        "controlled-input-without-onchange",
        Syntactic,
        Every,
        react::rendering::detect_controlled_input_without_onchange,
    ),
    framework(
        "direct-dom-in-component",
        Syntactic,
        First,
        react::rendering::detect_direct_dom_in_component,
    ),
    framework(
        "conditional-render-zero",
        Syntactic,
        Every,
        react::rendering::detect_conditional_render_zero,
    ),
    framework(
        "class-component",
        Syntactic,
        First,
        react::rendering::detect_class_component,
    ),
    framework(
        "props-destructuring",
        Syntactic,
        First,
        react::rendering::detect_props_destructuring,
    ),
    // Data flow
    flow("loop-bounds-off-by-one", data_flow::detect_loop_bounds_off_by_one),
    flow("for-in-array", data_flow::detect_for_in_array),
    flow(
        "self-mutation-during-iteration",
        data_flow::detect_self_mutation_during_iteration,
    ),
    flow("array-as-dictionary", data_flow::detect_array_as_dictionary),
    flow(
        "shallow-copy-nested-mutation",
        data_flow::detect_shallow_copy_nested_mutation,
    ),
    flow(
        "reference-sharing-mutation",
        data_flow::detect_reference_sharing_mutation,
    ),
    flow(
        "storage-object-serialization",
        data_flow::detect_storage_object_serialization,
    ),
];

/// Look up a detector by id.
pub fn find_detector(id: &str) -> Option<&'static DetectorSpec> {
    DETECTORS.iter().find(|spec| spec.id == id)
}

/// Keep the earliest finding per slug, by (line, column).
///
/// The result is in source order. Findings without a location sort last.
pub fn keep_first_by_source_order(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by_key(Finding::source_order);
    let mut seen = HashSet::new();
    findings.retain(|finding| seen.insert(finding.slug.clone()));
    findings
}

/// Order a detector's findings by source position and apply its policy.
pub fn apply_policy(policy: ReportPolicy, mut findings: Vec<Finding>) -> Vec<Finding> {
    match policy {
        ReportPolicy::EveryOccurrence => {
            findings.sort_by_key(Finding::source_order);
            findings
        }
        ReportPolicy::FirstOnly => keep_first_by_source_order(findings),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Location;

    #[test]
    fn test_keep_first_by_source_order() {
        let findings = vec![
            Finding::good_practice("arrow-function", Location::new(4, 2)),
            Finding::good_practice("arrow-function", Location::new(1, 8)),
            Finding::good_practice("arrow-function", Location::new(1, 3)),
        ];
        let kept = keep_first_by_source_order(findings);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].location, Some(Location::new(1, 3)));
    }

    #[test]
    fn test_keep_first_is_per_slug() {
        let findings = vec![
            Finding::issue("b", Location::new(3, 0)),
            Finding::issue("a", Location::new(2, 0)),
            Finding::issue("b", Location::new(1, 0)),
        ];
        let kept = keep_first_by_source_order(findings);
        let slugs: Vec<_> = kept.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }

    #[test]
    fn test_unlocated_findings_sort_last() {
        let mut unlocated = Finding::issue("x", Location::new(1, 0));
        unlocated.location = None;
        let findings = vec![unlocated, Finding::issue("x", Location::new(9, 9))];
        let kept = keep_first_by_source_order(findings);
        assert_eq!(kept[0].location, Some(Location::new(9, 9)));
    }

    #[test]
    fn test_every_occurrence_keeps_all_in_order() {
        let findings = vec![
            Finding::issue("x", Location::new(2, 0)),
            Finding::issue("x", Location::new(1, 0)),
        ];
        let kept = apply_policy(ReportPolicy::EveryOccurrence, findings);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].location, Some(Location::new(1, 0)));
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let mut ids = HashSet::new();
        for spec in DETECTORS {
            assert!(ids.insert(spec.id), "duplicate detector id {}", spec.id);
        }
        assert!(find_detector("loop-bounds-off-by-one").unwrap().is_data_flow());
        assert!(find_detector("list-missing-key").unwrap().framework_only);
        assert!(find_detector("no-such-detector").is_none());
    }
}
