//! Heuristic, non-flow-sensitive inference over the lowered tree.
//!
//! Both maps are built once per analysis call and shared read-only by the
//! data-flow detectors.

pub mod alias;
pub mod types;

pub use alias::{mutated_path, track_aliases, AliasGroup, AliasGroups, MutationSite};
pub use types::{infer_expr_type, infer_types, InferredType, TypeMap};
