//! Graph side of the path finder: the typed splice graph handed over by the
//! graph builder, its exon-only transform, virtual terminals and
//! component splitting.

pub mod components;
pub mod splice;
pub mod terminals;
pub mod transform;

pub use components::{split_components, weakly_connected_components};
pub use splice::{SpliceGraph, SpliceVertex};
pub use terminals::{merged_strand, normalize_terminals, Terminals, VirtualSource};
pub use transform::{ExonGraph, ExonVertex, SpliceEdge};
