//! Rules of hooks and effect usage.

use super::{hook_call_name, is_component_function, is_hook_function};
use crate::core::Finding;
use crate::detectors::DetectorContext;
use crate::frontend::ast::*;
use crate::traversal::{as_call, is_conditional_branch, is_loop};

const EFFECT_HOOKS: &[&str] = &["useEffect", "useLayoutEffect", "useInsertionEffect"];

/// Hooks must run unconditionally, at the top level of a component or of
/// another hook.
pub fn detect_hooks_conditional_call(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        let hook = hook_call_name(expr)?;
        let branched = wctx
            .ancestors_in_function()
            .any(|node| is_conditional_branch(node) || is_loop(node));
        let wrong_owner = wctx
            .enclosing_function()
            .is_some_and(|f| !is_component_function(f) && !is_hook_function(f));
        if branched {
            Some(
                Finding::issue("hooks-conditional-call", expr.loc).with_details(format!(
                    "`{}` is called conditionally or in a loop; hooks must run in the same order every render",
                    hook
                )),
            )
        } else if wrong_owner {
            Some(
                Finding::issue("hooks-conditional-call", expr.loc).with_details(format!(
                    "`{}` is called inside a function that is neither a component nor a hook",
                    hook
                )),
            )
        } else {
            None
        }
    })
}

fn effect_call(expr: &Expr) -> Option<(&str, &[Expr])> {
    let hook = hook_call_name(expr)?;
    let (_, args) = as_call(expr)?;
    EFFECT_HOOKS.contains(&hook).then_some((hook, args))
}

pub fn detect_effect_missing_dependency_array(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (hook, args) = effect_call(expr)?;
        (args.len() == 1).then(|| {
            Finding::issue("effect-missing-dependency-array", expr.loc).with_details(format!(
                "`{}` without a dependency array runs after every render",
                hook
            ))
        })
    })
}

/// `useEffect(async () => …)` returns a promise where a cleanup function
/// is expected.
pub fn detect_effect_async_callback(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (hook, args) = effect_call(expr)?;
        let callback = args.first()?.as_function()?;
        callback.is_async.then(|| {
            Finding::issue("effect-async-callback", callback.loc).with_details(format!(
                "define an async function inside the `{}` callback and call it",
                hook
            ))
        })
    })
}

pub fn detect_use_state_hook(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        (hook_call_name(expr)? == "useState").then(|| Finding::good_practice("use-state-hook", expr.loc))
    })
}

/// A `use*` function that composes other hooks.
pub fn detect_custom_hook(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let shallow = ctx.walker.shallow();
    ctx.collect(|node, _| {
        let function = node.as_function().filter(|f| is_hook_function(f))?;
        let calls_hook = shallow.any(node, |inner, _| {
            inner.as_expr().and_then(hook_call_name).is_some()
        });
        calls_hook.then(|| Finding::good_practice("custom-hook", function.loc))
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;
    use indoc::indoc;

    #[test]
    fn test_conditional_hook_call() {
        let source = indoc! {"
            import { useState } from 'react';
            function Profile({ user }) {
              if (user) {
                const [name, setName] = useState(user.name);
              }
              const [open, setOpen] = useState(false);
              return <div />;
            }
        "};
        let findings = run_detector("hooks-conditional-call", source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.unwrap().line, 4);
    }

    #[test]
    fn test_hook_in_plain_function() {
        let source = "import { useState } from 'react'; function helper() { return useState(0); }";
        assert_eq!(run_detector("hooks-conditional-call", source).len(), 1);
    }

    #[test]
    fn test_hook_in_custom_hook_is_fine() {
        let source = "import { useState } from 'react'; function useToggle() { return useState(false); }";
        assert!(run_detector("hooks-conditional-call", source).is_empty());
        assert_eq!(run_detector("custom-hook", source).len(), 1);
    }

    #[test]
    fn test_effect_dependency_array() {
        let source = "import { useEffect } from 'react'; function App() { useEffect(() => { sync(); }); return null; }";
        assert_eq!(run_detector("effect-missing-dependency-array", source).len(), 1);
        let with_deps = "import { useEffect } from 'react'; function App() { useEffect(() => { sync(); }, []); return null; }";
        assert!(run_detector("effect-missing-dependency-array", with_deps).is_empty());
    }

    #[test]
    fn test_effect_async_callback() {
        let source = "import React from 'react'; function App() { React.useEffect(async () => { await load(); }, []); return null; }";
        assert_eq!(run_detector("effect-async-callback", source).len(), 1);
    }

    #[test]
    fn test_use_state_hook() {
        let source = "import { useState } from 'react'; function App() { const [a, setA] = useState(0); const [b, setB] = useState(1); return a + b; }";
        assert_eq!(run_detector("use-state-hook", source).len(), 1);
    }
}
