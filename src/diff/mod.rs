//! Diff construction for extracted notebook inputs.
//!
//! The pipeline runs in three stages: a line-level edit script between the
//! two texts, positional refinement of adjacent removed/added runs into
//! character-level modified lines, and a per-side rendering pass that
//! attaches cell membership to every emitted line. Everything here is a
//! pure function of the input texts.

pub mod engine;
pub mod refine;
pub mod render;

// Re-export the main types for easier use
pub use engine::{DiffGroup, DiffStats, EditScript};
pub use refine::refine_pair;
pub use render::{diff_for_side, RenderKind, RenderLine, Side, Span, SpanKind};

/// Convenience function to get diff statistics between two texts
pub fn get_diff_stats(left: &str, right: &str) -> DiffStats {
    EditScript::compute(left, right).stats()
}
