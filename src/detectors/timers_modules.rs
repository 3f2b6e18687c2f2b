//! Timers, dynamic code evaluation and module systems.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::{as_call, dotted_name};

fn timer_name(callee: &Expr) -> Option<String> {
    let name = dotted_name(callee)?;
    let bare = name.strip_prefix("window.").unwrap_or(&name).to_string();
    Some(bare)
}

/// `setTimeout("code()", 100)` evaluates the string like `eval`.
pub fn detect_settimeout_string_argument(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callee, args) = as_call(expr)?;
        let name = timer_name(callee)?;
        let string_arg = args.first().is_some_and(|arg| arg.as_str_lit().is_some());
        (matches!(name.as_str(), "setTimeout" | "setInterval") && string_arg).then(|| {
            Finding::issue("settimeout-string-argument", expr.loc)
                .with_details(format!("pass a function to `{}`, not a string", name))
        })
    })
}

/// `setInterval` with no `clearInterval` anywhere in the snippet.
pub fn detect_setinterval_without_clear(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let calls = ctx.exprs(|expr, _| {
        let (callee, _) = as_call(expr)?;
        timer_name(callee).map(|name| (name, expr.loc))
    });
    if calls.iter().any(|(name, _)| name == "clearInterval") {
        return Vec::new();
    }
    calls
        .into_iter()
        .filter(|(name, _)| name == "setInterval")
        .map(|(_, loc)| {
            Finding::issue("setinterval-without-clear", loc)
                .with_details("keep the interval id and call `clearInterval` when done")
        })
        .collect()
}

/// `eval(…)` and `new Function(…)`.
pub fn detect_eval_usage(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::Call { callee, .. } if callee.as_ident() == Some("eval") => {
            Some(Finding::issue("eval-usage", expr.loc).with_details("`eval` runs arbitrary code"))
        }
        ExprKind::New { callee, .. } if callee.as_ident() == Some("Function") => Some(
            Finding::issue("eval-usage", expr.loc)
                .with_details("`new Function` compiles strings into code like `eval`"),
        ),
        _ => None,
    })
}

pub fn detect_commonjs_require(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callee, args) = as_call(expr)?;
        let module = args.first()?.as_str_lit()?;
        (callee.as_ident() == Some("require")).then(|| {
            Finding::issue("commonjs-require", expr.loc)
                .trivial()
                .with_details(format!("consider `import … from '{}'`", module))
        })
    })
}

pub fn detect_es_module_import(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Import(_) => Some(Finding::good_practice("es-module-import", stmt.loc)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;

    #[test]
    fn test_settimeout_string() {
        assert_eq!(
            run_detector("settimeout-string-argument", "setTimeout('tick()', 100);").len(),
            1
        );
        assert!(run_detector("settimeout-string-argument", "setTimeout(tick, 100);").is_empty());
    }

    #[test]
    fn test_setinterval_without_clear() {
        assert_eq!(
            run_detector("setinterval-without-clear", "setInterval(poll, 1000);").len(),
            1
        );
        let cleared = "const id = setInterval(poll, 1000); stop = () => clearInterval(id);";
        assert!(run_detector("setinterval-without-clear", cleared).is_empty());
    }

    #[test]
    fn test_eval_usage() {
        let findings = run_detector("eval-usage", "eval(code); const f = new Function('a', 'return a');");
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_modules() {
        assert_eq!(run_detector("commonjs-require", "const fs = require('fs');").len(), 1);
        assert_eq!(run_detector("es-module-import", "import fs from 'fs';").len(), 1);
    }
}
