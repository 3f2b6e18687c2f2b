//! Generic traversal over the lowered syntax tree.
//!
//! Every node kind has an explicit child list ([`NodeRef::children`]), so no
//! reflection or key-exclusion lists are involved. Walks are depth capped and
//! truncate silently.

pub mod node;
pub mod predicates;
pub mod walker;

pub use node::NodeRef;
pub use predicates::{
    as_call, as_method_call, callee_name, callee_object, dotted_name, is_component_name,
    is_conditional_branch, is_function, is_hook_name, is_ident, is_loop, is_mutating_method,
    member_path, returns_value, root_identifier, MemberPath, Segment,
};
pub use walker::{Visit, Visitor, WalkContext, Walker, DEFAULT_MAX_DEPTH};
