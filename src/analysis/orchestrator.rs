use crate::config::SnippetscopeConfig;
use crate::core::{
    AnalysisResult, Detection, DetectionSource, Diagnostic, Dialect, Finding, Location,
    SourceUnit, Summary, TreeInfo,
};
use crate::detectors::{apply_policy, DetectorContext, DetectorSpec, DETECTORS};
use crate::frontend::parse_snippet;
use crate::inference::{infer_types, track_aliases};
use crate::rules::{self, engine_from_config, NoopRuleEngine, RuleEngine};
use crate::traversal::Walker;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Reusable analysis entry point holding configuration and the rule engine.
pub struct Analyzer {
    config: SnippetscopeConfig,
    engine: Box<dyn RuleEngine>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_rule_engine(SnippetscopeConfig::default(), Box::new(NoopRuleEngine))
    }
}

impl Analyzer {
    /// Build an analyzer, resolving the rule engine from `config.rule_engine`.
    pub fn new(config: SnippetscopeConfig) -> Self {
        let engine = engine_from_config(&config.rule_engine);
        Self { config, engine }
    }

    pub fn with_rule_engine(config: SnippetscopeConfig, engine: Box<dyn RuleEngine>) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &SnippetscopeConfig {
        &self.config
    }

    fn enabled_detectors(&self, uses_framework: bool) -> impl Iterator<Item = &'static DetectorSpec> + '_ {
        DETECTORS.iter().filter(move |spec| {
            (uses_framework || !spec.framework_only) && !self.config.analysis.is_disabled(spec.id)
        })
    }

    /// Analyze one snippet. Never fails and never panics out.
    pub fn analyze(&self, code: &str, hint: Option<Dialect>) -> AnalysisResult {
        let span = tracing::debug_span!("analyze", bytes = code.len());
        let _guard = span.enter();

        let started = Instant::now();
        let front = parse_snippet(code, hint);
        tracing::debug!(elapsed = ?started.elapsed(), "Front end finished");

        let walker = Walker::new(self.config.analysis.max_walk_depth);
        let types = infer_types(&front.program, &walker);
        let aliases = track_aliases(&front.program, &types, &walker);
        let ctx = DetectorContext {
            program: &front.program,
            unit: SourceUnit::new(code, front.dialect, front.dialect_declared, front.uses_framework),
            types: &types,
            aliases: &aliases,
            walker,
        };

        let mut diagnostics = front.diagnostics.clone();
        let mut native = Vec::new();
        let mut data_flow = Vec::new();
        let mut ran = 0usize;
        for spec in self.enabled_detectors(front.uses_framework) {
            ran += 1;
            match run_isolated(spec, &ctx) {
                Ok(findings) => {
                    let (bucket, source) = if spec.is_data_flow() {
                        (&mut data_flow, DetectionSource::DataFlowDetector)
                    } else {
                        (&mut native, DetectionSource::NativeDetector)
                    };
                    bucket.extend(
                        findings
                            .into_iter()
                            .map(|finding| Detection::from_finding(finding, source)),
                    );
                }
                Err(message) => {
                    tracing::warn!(detector = spec.id, "Detector panicked: {}", message);
                    diagnostics.push(Diagnostic::detector_fault(spec.id, message));
                }
            }
        }

        let (engine_detections, engine_diagnostic) = rules::lint_with_diagnostic(
            self.engine.as_ref(),
            code,
            front.uses_framework,
            front.uses_typed_superset(),
        );
        diagnostics.extend(engine_diagnostic);

        let detections = merge(native, engine_detections, data_flow);
        tracing::debug!(
            detectors = ran,
            detections = detections.len(),
            elapsed = ?started.elapsed(),
            "Analysis finished"
        );

        let summary = Summary::compute(&detections, self.config.analysis.top_issues);
        AnalysisResult {
            tree: TreeInfo {
                dialect: front.dialect,
                uses_framework: front.uses_framework,
                uses_typed_superset: front.uses_typed_superset(),
                statement_count: front.program.body.len(),
                partial: front.partial,
            },
            detections,
            summary,
            diagnostics,
        }
    }
}

/// Analyze with the default configuration and no rule engine.
pub fn analyze(code: &str, hint: Option<Dialect>) -> AnalysisResult {
    Analyzer::default().analyze(code, hint)
}

/// Run a detector, turning a panic into an error message.
fn run_isolated(spec: &DetectorSpec, ctx: &DetectorContext<'_>) -> Result<Vec<Finding>, String> {
    panic::catch_unwind(AssertUnwindSafe(|| (spec.run)(ctx)))
        .map(|findings| apply_policy(spec.policy, findings))
        .map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Native, then engine, then data-flow. Engine detections that repeat a
/// native slug at the same location are dropped.
fn merge(native: Vec<Detection>, engine: Vec<Detection>, data_flow: Vec<Detection>) -> Vec<Detection> {
    let seen: HashSet<(String, Option<Location>)> = native
        .iter()
        .map(|d| (d.topic_slug().to_string(), d.location()))
        .collect();
    let mut detections = native;
    detections.extend(
        engine
            .into_iter()
            .filter(|d| !seen.contains(&(d.topic_slug().to_string(), d.location()))),
    );
    detections.extend(data_flow);
    detections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagnosticKind;
    use crate::detectors::{DetectorClass, ReportPolicy};
    use crate::errors::Result;
    use crate::rules::{RuleConfig, RuleViolation};
    use indoc::indoc;

    struct StubEngine(Vec<RuleViolation>);

    impl RuleEngine for StubEngine {
        fn lint(&self, _code: &str, _config: RuleConfig) -> Result<Vec<RuleViolation>> {
            Ok(self.0.clone())
        }
    }

    fn violation(rule_id: &str, line: usize, column: usize) -> RuleViolation {
        RuleViolation {
            rule_id: rule_id.to_string(),
            message: String::new(),
            line,
            column,
            fixable: false,
        }
    }

    fn slugs(result: &AnalysisResult) -> Vec<&str> {
        result.detections.iter().map(|d| d.topic_slug()).collect()
    }

    #[test]
    fn test_var_declaration_reports_hoisting() {
        let result = analyze("var x = 1;", None);
        assert!(result.has_topic("var-hoisting"));
        assert_eq!(result.tree.statement_count, 1);
        assert!(!result.tree.partial);
    }

    #[test]
    fn test_unparseable_input_never_fails() {
        let result = analyze("))) }}} ]]]", None);
        assert!(result.detections.is_empty());
        assert!(!result.diagnostics.is_empty());
        assert!(result.tree.partial);
    }

    #[test]
    fn test_framework_detectors_are_gated() {
        let plain = analyze("function useThing() { return 1; }", None);
        assert!(!plain.tree.uses_framework);
        assert!(!plain.has_topic("custom-hook"));
    }

    #[test]
    fn test_disabled_detector_does_not_run() {
        let mut config = SnippetscopeConfig::default();
        config.analysis.disabled_detectors = vec!["var-hoisting".to_string()];
        let analyzer = Analyzer::with_rule_engine(config, Box::new(NoopRuleEngine));
        assert!(!analyzer.analyze("var x = 1;", None).has_topic("var-hoisting"));
    }

    #[test]
    fn test_engine_duplicates_are_dropped() {
        let engine = StubEngine(vec![violation("no-var", 1, 0), violation("no-console", 2, 0)]);
        let analyzer = Analyzer::with_rule_engine(SnippetscopeConfig::default(), Box::new(engine));
        let result = analyzer.analyze("var x = 1;\nconsole.log(x);", None);

        assert_eq!(result.detections_for("var-hoisting").count(), 1);
        let lint: Vec<_> = result.detections_for("lint-no-console").collect();
        assert_eq!(lint.len(), 1);
        assert_eq!(lint[0].source(), DetectionSource::ExternalRuleEngine);
    }

    #[test]
    fn test_merge_order_native_engine_data_flow() {
        let engine = StubEngine(vec![violation("no-console", 1, 0)]);
        let analyzer = Analyzer::with_rule_engine(SnippetscopeConfig::default(), Box::new(engine));
        let source = indoc! {"
            const a = {};
            const b = a;
            b.x = 1;
        "};
        let result = analyzer.analyze(source, None);
        let rank = |source: DetectionSource| match source {
            DetectionSource::NativeDetector => 0,
            DetectionSource::ExternalRuleEngine => 1,
            DetectionSource::DataFlowDetector => 2,
        };
        let ranks: Vec<_> = result.detections.iter().map(|d| rank(d.source())).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{:?}", ranks);
        assert!(result.has_topic("lint-no-console"));
        assert!(result.has_topic("reference-sharing-mutation"));
        assert_eq!(
            result.detections_for("reference-sharing-mutation").next().unwrap().source(),
            DetectionSource::DataFlowDetector
        );
    }

    fn explode(_: &DetectorContext<'_>) -> Vec<Finding> {
        panic!("unexpected tree shape")
    }

    #[test]
    fn test_panicking_detector_is_isolated() {
        let spec = DetectorSpec {
            id: "exploding",
            class: DetectorClass::Syntactic,
            framework_only: false,
            policy: ReportPolicy::EveryOccurrence,
            run: explode,
        };
        let front = parse_snippet("let x = 1;", None);
        let walker = Walker::default();
        let types = infer_types(&front.program, &walker);
        let aliases = track_aliases(&front.program, &types, &walker);
        let ctx = DetectorContext {
            program: &front.program,
            unit: SourceUnit::new("let x = 1;", front.dialect, false, false),
            types: &types,
            aliases: &aliases,
            walker,
        };
        let err = run_isolated(&spec, &ctx).unwrap_err();
        assert_eq!(err, "unexpected tree shape");
        let diagnostic = Diagnostic::detector_fault(spec.id, err);
        assert_eq!(diagnostic.kind, DiagnosticKind::DetectorFault);
    }

    #[test]
    fn test_idempotent() {
        let source = indoc! {"
            var total = 0;
            for (let i = 0; i <= items.length; i++) { total += items[i]; }
            if (total == '0') { console.log(total); }
        "};
        let first = analyze(source, None);
        let second = analyze(source, None);
        assert_eq!(slugs(&first), slugs(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_uses_configured_top_issues() {
        let mut config = SnippetscopeConfig::default();
        config.analysis.top_issues = 1;
        let analyzer = Analyzer::with_rule_engine(config, Box::new(NoopRuleEngine));
        let result = analyzer.analyze("eval('1'); try { x(); } catch (e) {}", None);
        assert!(result.summary.top_issues.len() <= 1);
        assert_eq!(result.summary.total, result.detections.len());
    }
}
