use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};

use crate::error::{PathError, Result};
use crate::graph::splice::SpliceGraph;
use crate::graph::terminals::Terminals;
use crate::model::ScoreMap;
use crate::types::{Node, NodeType};

/// Edge of the exon graph.
///
/// `Weighted` edges bound the bottleneck of any path through them and are
/// decremented when a path is peeled off. `PassThrough` edges (into the
/// virtual sink) carry no support and inherit the parent's path weight.
#[derive(Debug, Clone, PartialEq)]
pub enum SpliceEdge {
    Weighted { weight: f64, ids: BTreeSet<String> },
    PassThrough,
}

impl SpliceEdge {
    pub fn weighted(weight: f64) -> Self {
        SpliceEdge::Weighted { weight, ids: BTreeSet::new() }
    }

    pub fn weight(&self) -> Option<f64> {
        match self {
            SpliceEdge::Weighted { weight, .. } => Some(*weight),
            SpliceEdge::PassThrough => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExonVertex {
    pub node: Node,
    /// Sum of the scores of all contributing ids.
    pub weight: f64,
    pub ids: BTreeSet<String>,
}

/// Exon-only DAG with introns folded into weighted edges.
///
/// Real exon nodes are keyed structurally; virtual terminals are only
/// reachable through their [`NodeIndex`].
#[derive(Debug, Clone, Default)]
pub struct ExonGraph {
    pub(crate) graph: DiGraph<ExonVertex, SpliceEdge>,
    index: HashMap<Node, NodeIndex>,
    pub(crate) terminals: Option<Terminals>,
}

impl ExonGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every INTRON node of `splice` into edges between the exons it
    /// joins.
    ///
    /// An intron with P predecessors and S successors yields P x S edges,
    /// each carrying the intron's full weight and ids.
    pub fn from_splice_graph(splice: &SpliceGraph, scores: &ScoreMap) -> Result<Self> {
        let mut out = ExonGraph::new();

        for v in splice.vertices().filter(|v| v.node.node_type == NodeType::Exon) {
            let weight = aggregate_weight(&v.ids, scores)?;
            out.add_exon(v.node, weight, v.ids.iter().cloned());
        }

        for v in splice.vertices().filter(|v| v.node.node_type == NodeType::Intron) {
            let weight = aggregate_weight(&v.ids, scores)?;
            let preds = splice.predecessors(&v.node);
            let succs = splice.successors(&v.node);
            for pred in &preds {
                for succ in &succs {
                    let edge = SpliceEdge::Weighted { weight, ids: v.ids.clone() };
                    out.connect(pred, succ, edge)?;
                }
            }
        }

        tracing::debug!(
            exons = out.node_count(),
            edges = out.edge_count(),
            "transformed splice graph"
        );
        Ok(out)
    }

    /// Insert an exon (or find it) and set its aggregate weight.
    pub fn add_exon<I, S>(&mut self, node: Node, weight: f64, ids: I) -> NodeIndex
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        match self.index.get(&node) {
            Some(&ix) => {
                let v = &mut self.graph[ix];
                v.weight = weight;
                v.ids.extend(ids);
                ix
            }
            None => {
                let ix = self.graph.add_node(ExonVertex { node, weight, ids });
                self.index.insert(node, ix);
                ix
            }
        }
    }

    /// Add (or overwrite) the edge `from -> to`. Both exons must already exist.
    pub fn connect(&mut self, from: &Node, to: &Node, edge: SpliceEdge) -> Result<EdgeIndex> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        Ok(self.graph.update_edge(a, b, edge))
    }

    /// Insert a node that is not keyed by coordinates (virtual terminals).
    pub(crate) fn add_virtual(&mut self, node: Node) -> NodeIndex {
        self.graph.add_node(ExonVertex { node, weight: 0.0, ids: BTreeSet::new() })
    }

    pub(crate) fn add_edge_ix(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        edge: SpliceEdge,
    ) -> EdgeIndex {
        self.graph.update_edge(a, b, edge)
    }

    fn require(&self, node: &Node) -> Result<NodeIndex> {
        self.index
            .get(node)
            .copied()
            .ok_or(PathError::UnknownNode { node: *node })
    }

    pub fn node_index(&self, node: &Node) -> Option<NodeIndex> {
        self.index.get(node).copied()
    }

    pub fn vertex(&self, ix: NodeIndex) -> &ExonVertex {
        &self.graph[ix]
    }

    pub fn node(&self, ix: NodeIndex) -> Node {
        self.graph[ix].node
    }

    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&SpliceEdge> {
        self.graph.find_edge(from, to).map(|e| &self.graph[e])
    }

    /// Weight of a weighted edge between two real exons.
    pub fn edge_weight(&self, from: &Node, to: &Node) -> Option<f64> {
        let a = self.node_index(from)?;
        let b = self.node_index(to)?;
        self.edge(a, b)?.weight()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// (source, target, edge) triples in insertion order.
    pub fn edge_triples(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &SpliceEdge)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    pub fn in_degree(&self, ix: NodeIndex) -> usize {
        self.graph.neighbors_directed(ix, Incoming).count()
    }

    pub fn out_degree(&self, ix: NodeIndex) -> usize {
        self.graph.neighbors_directed(ix, Outgoing).count()
    }

    /// Virtual terminals, once [`crate::graph::normalize_terminals`] has run.
    pub fn terminals(&self) -> Option<&Terminals> {
        self.terminals.as_ref()
    }

    /// Map a traversal to real nodes, dropping virtual terminals.
    pub fn real_nodes(&self, path: &[NodeIndex]) -> Vec<Node> {
        path.iter()
            .map(|&ix| self.graph[ix].node)
            .filter(|n| !n.is_dummy())
            .collect()
    }
}

fn aggregate_weight(ids: &BTreeSet<String>, scores: &ScoreMap) -> Result<f64> {
    let mut total = 0.0;
    for id in ids {
        let score = *scores
            .get(id)
            .ok_or_else(|| PathError::MissingScore { id: id.clone() })?;
        if !score.is_finite() || score < 0.0 {
            return Err(PathError::InvalidScore { id: id.clone(), score });
        }
        total += score;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    fn e(s: u32, t: u32) -> Node {
        Node::exon(s, t, Strand::Plus)
    }

    fn i(s: u32, t: u32) -> Node {
        Node::intron(s, t, Strand::Plus)
    }

    fn scores(pairs: &[(&str, f64)]) -> ScoreMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn introns_become_weighted_edges() {
        let mut sg = SpliceGraph::new();
        sg.add_node(e(0, 10), ["a", "b"]);
        sg.add_node(i(10, 20), ["a"]);
        sg.add_node(e(20, 30), ["a", "b"]);
        sg.add_edge(e(0, 10), i(10, 20));
        sg.add_edge(i(10, 20), e(20, 30));

        let g = ExonGraph::from_splice_graph(&sg, &scores(&[("a", 3.0), ("b", 4.0)])).unwrap();

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        let first = g.node_index(&e(0, 10)).unwrap();
        assert_eq!(g.vertex(first).weight, 7.0);
        assert_eq!(g.edge_weight(&e(0, 10), &e(20, 30)), Some(3.0));
        assert!(g.node_index(&i(10, 20)).is_none());
    }

    #[test]
    fn shared_intron_fans_out_to_every_exon_pair() {
        let mut sg = SpliceGraph::new();
        let intron = i(100, 200);
        sg.add_node(intron, ["t"]);
        for n in [e(0, 100), e(50, 100), e(200, 300), e(200, 250)] {
            sg.add_node(n, ["t"]);
        }
        sg.add_edge(e(0, 100), intron);
        sg.add_edge(e(50, 100), intron);
        sg.add_edge(intron, e(200, 300));
        sg.add_edge(intron, e(200, 250));

        let g = ExonGraph::from_splice_graph(&sg, &scores(&[("t", 5.0)])).unwrap();
        assert_eq!(g.edge_count(), 4);
        for (a, b) in [(e(0, 100), e(200, 300)), (e(50, 100), e(200, 250))] {
            assert_eq!(g.edge_weight(&a, &b), Some(5.0));
        }
    }

    #[test]
    fn missing_score_is_fatal() {
        let mut sg = SpliceGraph::new();
        sg.add_node(e(0, 10), ["known", "ghost"]);

        let err = ExonGraph::from_splice_graph(&sg, &scores(&[("known", 1.0)])).unwrap_err();
        assert_eq!(err, PathError::MissingScore { id: "ghost".into() });
    }

    #[test]
    fn negative_score_is_fatal() {
        let mut sg = SpliceGraph::new();
        sg.add_node(e(0, 10), ["neg"]);

        let err = ExonGraph::from_splice_graph(&sg, &scores(&[("neg", -1.0)])).unwrap_err();
        assert!(matches!(err, PathError::InvalidScore { .. }));
    }

    #[test]
    fn input_graph_is_left_untouched() {
        let mut sg = SpliceGraph::new();
        sg.add_transcript(
            &crate::model::Transcript::new("T", "chr1", Strand::Plus, 1.0, "")
                .with_exon(0, 10)
                .with_exon(20, 30),
        );
        let before: Vec<_> = sg.vertices().cloned().collect();

        let _ = ExonGraph::from_splice_graph(&sg, &scores(&[("T", 1.0)])).unwrap();

        let after: Vec<_> = sg.vertices().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(sg.edge_count(), 2);
    }

    #[test]
    fn connect_requires_known_exons() {
        let mut g = ExonGraph::new();
        g.add_exon(e(0, 10), 1.0, ["x"]);
        let err = g.connect(&e(0, 10), &e(20, 30), SpliceEdge::weighted(1.0)).unwrap_err();
        assert_eq!(err, PathError::UnknownNode { node: e(20, 30) });
    }
}
