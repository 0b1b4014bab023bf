//! splice_paths
//!
//! Isoform path finding over locus splice graphs.
//! A splice graph of exon and intron segments (0-based, half-open) is
//! reduced to a weighted exon DAG, split into genes, and each TSS is
//! decomposed into a ranked set of source-to-sink paths by repeated
//! best-path search and residual weight subtraction.

pub mod types;
pub mod error;
pub mod config;
pub mod model;
pub mod graph;
pub mod paths;
pub mod assembly;
pub mod bundle;

pub use types::{Node, NodeType, RefBlock, Strand};
pub use error::{PathError, Result};
pub use config::PathFinderConfig;

pub use model::{label_map, score_map, GeneId, LabelMap, LocusPath, ScoreMap, Transcript, TssId};
pub use graph::{
    normalize_terminals, split_components, ExonGraph, SpliceEdge, SpliceGraph, Terminals,
};
pub use paths::{find_best_path, find_isoforms, BestPath, LocusPaths, ScoredPath, SuboptimalPaths};

pub use assembly::{Assembler, IsoformRecord, Locus};
pub use bundle::{load_bundles, save_snapshot, LocusBundle};
