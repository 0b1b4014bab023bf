use crate::types::{Node, Strand};

pub type Result<T> = std::result::Result<T, PathError>;

/// Failures raised while turning a splice graph into isoform paths.
///
/// Everything except the parameter variants is a data-integrity failure from
/// an upstream collaborator and aborts the enclosing locus.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("no score recorded for id '{id}'")]
    MissingScore { id: String },

    #[error("score for id '{id}' must be finite and non-negative, got {score}")]
    InvalidScore { id: String, score: f64 },

    #[error("conflicting strands in one component: {first} vs {second}")]
    StrandConflict { first: Strand, second: Strand },

    #[error("sink is not reachable from source")]
    SinkUnreachable,

    #[error("splice graph contains a cycle through {node}")]
    Cycle { node: Node },

    #[error("node is not part of the graph: {node}")]
    UnknownNode { node: Node },

    #[error("fraction_major_path must be in (0, 1], got {0}")]
    InvalidFraction(f64),

    #[error("max_paths must be at least 1")]
    InvalidMaxPaths,

    #[error("max_iters must be at least 1")]
    InvalidMaxIters,
}
