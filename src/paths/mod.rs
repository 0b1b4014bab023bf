//! Path finding over a transformed exon graph.
//!
//! [`best`] scores paths by bottleneck weight over length, [`suboptimal`]
//! peels paths off the residual graph one at a time and [`partition`] walks
//! components and TSSs of a whole locus.

pub mod best;
pub mod partition;
pub mod suboptimal;

pub use best::{find_best_path, topological_edges, BestPath, PathState, SearchContext, TopoEdge};
pub use partition::{find_isoforms, LocusPaths};
pub use suboptimal::{PathPeeler, ScoredPath, SuboptimalPaths};
