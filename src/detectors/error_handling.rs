//! Exception handling patterns.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;

/// `catch` blocks with no statements swallow errors silently.
pub fn detect_empty_catch(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Try {
            handler: Some(handler),
            ..
        } if handler.body.is_empty() => Some(
            Finding::issue("empty-catch", handler.loc)
                .with_details("an empty catch hides failures; log or rethrow the error"),
        ),
        _ => None,
    })
}

/// Throwing strings or numbers loses the stack trace.
pub fn detect_throw_literal(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Throw(value) if value.is_literal() => Some(
            Finding::issue("throw-literal", stmt.loc)
                .with_details("throw an `Error` object so callers get a stack trace"),
        ),
        _ => None,
    })
}

pub fn detect_try_catch_usage(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Try {
            handler: Some(handler),
            ..
        } if !handler.body.is_empty() => {
            let mut finding = Finding::good_practice("try-catch-usage", stmt.loc);
            finding.tags.idiomatic = false;
            Some(finding)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;

    #[test]
    fn test_empty_catch() {
        assert_eq!(run_detector("empty-catch", "try { go(); } catch (e) {}").len(), 1);
        assert!(run_detector("empty-catch", "try { go(); } catch (e) { log(e); }").is_empty());
    }

    #[test]
    fn test_throw_literal() {
        assert_eq!(run_detector("throw-literal", "throw 'bad';").len(), 1);
        assert!(run_detector("throw-literal", "throw new Error('bad');").is_empty());
    }

    #[test]
    fn test_try_catch_usage_is_positive_only() {
        let findings = run_detector("try-catch-usage", "try { go(); } catch (e) { log(e); }");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].tags.positive);
        assert!(!findings[0].tags.idiomatic);
        assert!(!findings[0].tags.negative);
    }
}
