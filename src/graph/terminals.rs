use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;

use crate::error::{PathError, Result};
use crate::graph::transform::{ExonGraph, SpliceEdge};
use crate::types::{Node, Strand};

/// A virtual source standing for one transcription start coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualSource {
    pub node: NodeIndex,
    pub tss: u32,
}

/// Virtual terminals of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminals {
    /// Merged strand of all real nodes.
    pub strand: Strand,
    /// One per distinct TSS coordinate, in 5'->3' order.
    pub sources: Vec<VirtualSource>,
    pub sink: NodeIndex,
}

/// Merge the strands of every real node in the graph.
pub fn merged_strand(g: &ExonGraph) -> Result<Strand> {
    let mut strand = Strand::Unknown;
    for ix in g.node_indices() {
        let node = g.node(ix);
        if node.is_dummy() {
            continue;
        }
        strand = strand
            .merge(node.strand)
            .ok_or(PathError::StrandConflict { first: strand, second: node.strand })?;
    }
    Ok(strand)
}

/// Give every path in `g` a common shape: virtual source -> ... -> virtual sink.
///
/// Zero-in-degree exons are grouped by TSS coordinate; each group gets one
/// virtual source whose edges carry the weight of the exon they enter.
/// Zero-out-degree exons feed a single sink through pass-through edges.
/// Calling this again on a normalized graph returns the existing terminals.
pub fn normalize_terminals(g: &mut ExonGraph) -> Result<Terminals> {
    if let Some(t) = g.terminals() {
        return Ok(t.clone());
    }

    let strand = merged_strand(g)?;

    let mut starts: BTreeMap<u32, Vec<NodeIndex>> = BTreeMap::new();
    let mut ends: Vec<NodeIndex> = Vec::new();
    for ix in g.node_indices() {
        let node = g.node(ix);
        if g.in_degree(ix) == 0 {
            starts.entry(node.tss(strand)).or_default().push(ix);
        }
        if g.out_degree(ix) == 0 {
            ends.push(ix);
        }
    }

    let mut groups: Vec<(u32, Vec<NodeIndex>)> = starts.into_iter().collect();
    if strand == Strand::Minus {
        groups.reverse();
    }

    let mut sources = Vec::with_capacity(groups.len());
    for (tss, members) in groups {
        let src = g.add_virtual(Node::virtual_source());
        for ix in members {
            let weight = g.vertex(ix).weight;
            g.add_edge_ix(src, ix, SpliceEdge::weighted(weight));
        }
        sources.push(VirtualSource { node: src, tss });
    }

    let sink = g.add_virtual(Node::virtual_sink());
    for ix in ends {
        g.add_edge_ix(ix, sink, SpliceEdge::PassThrough);
    }

    tracing::debug!(%strand, sources = sources.len(), sinks = 1, "added virtual terminals");

    let terminals = Terminals { strand, sources, sink };
    g.terminals = Some(terminals.clone());
    Ok(terminals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(strand: Strand) -> ExonGraph {
        // two first exons sharing a start, one with a different start
        let mut g = ExonGraph::new();
        let a = Node::exon(100, 150, strand);
        let b = Node::exon(100, 160, strand);
        let c = Node::exon(120, 150, strand);
        let d = Node::exon(300, 350, strand);
        g.add_exon(a, 2.0, ["t1"]);
        g.add_exon(b, 3.0, ["t2"]);
        g.add_exon(c, 4.0, ["t3"]);
        g.add_exon(d, 9.0, ["t1", "t2", "t3"]);
        for n in [a, b, c] {
            g.connect(&n, &d, SpliceEdge::weighted(1.0)).unwrap();
        }
        g
    }

    #[test]
    fn groups_sources_by_tss_coordinate() {
        let mut g = chain(Strand::Plus);
        let t = normalize_terminals(&mut g).unwrap();

        assert_eq!(t.strand, Strand::Plus);
        let tss: Vec<u32> = t.sources.iter().map(|s| s.tss).collect();
        assert_eq!(tss, vec![100, 120]);
        assert_eq!(g.out_degree(t.sources[0].node), 2);
        assert_eq!(g.out_degree(t.sources[1].node), 1);
        assert_eq!(g.in_degree(t.sink), 1);
    }

    #[test]
    fn source_edges_carry_entered_exon_weight() {
        let mut g = chain(Strand::Plus);
        let t = normalize_terminals(&mut g).unwrap();

        let b = g.node_index(&Node::exon(100, 160, Strand::Plus)).unwrap();
        assert_eq!(g.edge(t.sources[0].node, b).and_then(SpliceEdge::weight), Some(3.0));

        let d = g.node_index(&Node::exon(300, 350, Strand::Plus)).unwrap();
        assert_eq!(g.edge(d, t.sink), Some(&SpliceEdge::PassThrough));
    }

    #[test]
    fn minus_strand_uses_end_coordinate_and_5p_order() {
        let mut g = ExonGraph::new();
        let a = Node::exon(500, 600, Strand::Minus);
        let b = Node::exon(500, 650, Strand::Minus);
        let c = Node::exon(100, 200, Strand::Minus);
        g.add_exon(a, 1.0, ["x"]);
        g.add_exon(b, 1.0, ["y"]);
        g.add_exon(c, 2.0, ["x", "y"]);
        g.connect(&a, &c, SpliceEdge::weighted(1.0)).unwrap();
        g.connect(&b, &c, SpliceEdge::weighted(1.0)).unwrap();

        let t = normalize_terminals(&mut g).unwrap();
        let tss: Vec<u32> = t.sources.iter().map(|s| s.tss).collect();
        assert_eq!(tss, vec![650, 600]);
    }

    #[test]
    fn conflicting_strands_are_rejected() {
        let mut g = ExonGraph::new();
        g.add_exon(Node::exon(0, 10, Strand::Plus), 1.0, ["a"]);
        g.add_exon(Node::exon(20, 30, Strand::Unknown), 1.0, ["a"]);
        g.add_exon(Node::exon(40, 50, Strand::Minus), 1.0, ["a"]);

        let err = normalize_terminals(&mut g).unwrap_err();
        assert_eq!(
            err,
            PathError::StrandConflict { first: Strand::Plus, second: Strand::Minus }
        );
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let mut g = chain(Strand::Plus);
        let first = normalize_terminals(&mut g).unwrap();
        let nodes = g.node_count();
        let edges = g.edge_count();

        let second = normalize_terminals(&mut g).unwrap();
        assert_eq!(first, second);
        assert_eq!(g.node_count(), nodes);
        assert_eq!(g.edge_count(), edges);
    }
}
