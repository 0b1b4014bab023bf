use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::{Incoming, Outgoing};

use crate::model::Transcript;
use crate::types::{Node, NodeType, Strand};

/// A splice graph node together with the ids of the transcripts/exons that
/// contributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceVertex {
    pub node: Node,
    pub ids: BTreeSet<String>,
}

/// Locus-level splice graph with typed (EXON/INTRON) nodes.
///
/// This is the hand-off format from the graph builder: nodes are keyed
/// structurally by [`Node`], edges follow transcript adjacency.
#[derive(Debug, Clone, Default)]
pub struct SpliceGraph {
    graph: DiGraph<SpliceVertex, ()>,
    index: HashMap<Node, NodeIndex>,
}

impl SpliceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` (or find it) and merge `ids` into its id set.
    pub fn add_node<I, S>(&mut self, node: Node, ids: I) -> NodeIndex
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ix = match self.index.get(&node) {
            Some(&ix) => ix,
            None => {
                let ix = self.graph.add_node(SpliceVertex { node, ids: BTreeSet::new() });
                self.index.insert(node, ix);
                ix
            }
        };
        self.graph[ix].ids.extend(ids.into_iter().map(Into::into));
        ix
    }

    /// Connect two nodes, inserting either endpoint (with no ids) if missing.
    pub fn add_edge(&mut self, from: Node, to: Node) {
        let a = self.add_node(from, std::iter::empty::<String>());
        let b = self.add_node(to, std::iter::empty::<String>());
        self.graph.update_edge(a, b, ());
    }

    /// Chain a transcript's exons and introns into the graph in 5'->3' order.
    ///
    /// Every node touched receives the transcript id. No overhang merging
    /// is done here.
    pub fn add_transcript(&mut self, tx: &Transcript) {
        let mut tx = tx.clone();
        if !tx.is_finalized() {
            tx.finalize();
        }

        let exons = tx.exons();
        let introns = tx.introns();
        let mut chain: Vec<Node> = Vec::with_capacity(exons.len() + introns.len());
        // finalize() leaves exons strictly separated: one intron per gap.
        for (i, e) in exons.iter().enumerate() {
            if let Some(intron) = i.checked_sub(1).and_then(|j| introns.get(j)) {
                chain.push(Node::intron(intron.start, intron.end, tx.strand));
            }
            chain.push(Node::exon(e.start, e.end, tx.strand));
        }
        if tx.strand == Strand::Minus {
            chain.reverse();
        }

        let mut prev: Option<NodeIndex> = None;
        for node in chain {
            let ix = self.add_node(node, [tx.id.as_str()]);
            if let Some(p) = prev {
                self.graph.update_edge(p, ix, ());
            }
            prev = Some(ix);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node)
    }

    pub fn vertex(&self, node: &Node) -> Option<&SpliceVertex> {
        self.index.get(node).map(|&ix| &self.graph[ix])
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &SpliceVertex> + '_ {
        self.graph.node_indices().map(move |ix| &self.graph[ix])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (Node, Node)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((self.graph[a].node, self.graph[b].node))
        })
    }

    pub fn predecessors(&self, node: &Node) -> Vec<Node> {
        self.neighbors(node, Incoming)
    }

    pub fn successors(&self, node: &Node) -> Vec<Node> {
        self.neighbors(node, Outgoing)
    }

    pub fn count_type(&self, node_type: NodeType) -> usize {
        self.vertices().filter(|v| v.node.node_type == node_type).count()
    }

    fn neighbors(&self, node: &Node, dir: petgraph::Direction) -> Vec<Node> {
        let Some(&ix) = self.index.get(node) else {
            return Vec::new();
        };
        // petgraph walks adjacency newest-first; report in insertion order.
        let mut out: Vec<Node> = self
            .graph
            .neighbors_directed(ix, dir)
            .map(|n| self.graph[n].node)
            .collect();
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, strand: Strand, exons: &[(u32, u32)]) -> Transcript {
        let mut t = Transcript::new(id, "chr1", strand, 1.0, "s");
        for &(s, e) in exons {
            t = t.with_exon(s, e);
        }
        t
    }

    #[test]
    fn add_transcript_chains_exons_and_introns() {
        let mut g = SpliceGraph::new();
        g.add_transcript(&tx("T1", Strand::Plus, &[(100, 150), (200, 250), (300, 350)]));

        assert_eq!(g.count_type(NodeType::Exon), 3);
        assert_eq!(g.count_type(NodeType::Intron), 2);
        assert_eq!(g.edge_count(), 4);

        let i1 = Node::intron(150, 200, Strand::Plus);
        assert_eq!(g.predecessors(&i1), vec![Node::exon(100, 150, Strand::Plus)]);
        assert_eq!(g.successors(&i1), vec![Node::exon(200, 250, Strand::Plus)]);
        assert!(g.vertex(&i1).unwrap().ids.contains("T1"));
    }

    #[test]
    fn chained_ids_all_have_transcript_scores() {
        let txs = [
            tx("T1", Strand::Plus, &[(100, 150), (200, 250)]),
            tx("T2", Strand::Plus, &[(100, 150), (300, 350)]),
        ];
        let mut g = SpliceGraph::new();
        for t in &txs {
            g.add_transcript(t);
        }
        let scores = crate::model::score_map(&txs);

        assert_eq!(scores.len(), 2);
        for v in g.vertices() {
            assert!(!v.ids.is_empty());
            assert!(v.ids.iter().all(|id| scores.contains_key(id)));
        }
    }

    #[test]
    fn minus_strand_transcripts_run_high_to_low() {
        let mut g = SpliceGraph::new();
        g.add_transcript(&tx("T1", Strand::Minus, &[(100, 150), (200, 250)]));

        let first = Node::exon(200, 250, Strand::Minus);
        let intron = Node::intron(150, 200, Strand::Minus);
        assert_eq!(g.successors(&first), vec![intron]);
        assert_eq!(g.successors(&intron), vec![Node::exon(100, 150, Strand::Minus)]);
    }

    #[test]
    fn shared_nodes_accumulate_ids() {
        let mut g = SpliceGraph::new();
        g.add_transcript(&tx("T1", Strand::Plus, &[(100, 150), (200, 250)]));
        g.add_transcript(&tx("T2", Strand::Plus, &[(100, 150), (200, 250)]));

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        let ids: Vec<&str> = g
            .vertex(&Node::exon(100, 150, Strand::Plus))
            .unwrap()
            .ids
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }

    #[test]
    fn add_edge_inserts_missing_endpoints() {
        let mut g = SpliceGraph::new();
        let a = Node::exon(0, 10, Strand::Plus);
        let b = Node::intron(10, 20, Strand::Plus);
        g.add_edge(a, b);
        g.add_edge(a, b);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.vertex(&a).unwrap().ids.is_empty());
    }
}
