use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction::Incoming;

use crate::error::{PathError, Result};
use crate::graph::{ExonGraph, SpliceEdge};

/// One edge of the DAG, listed so that every edge into a node comes after
/// every edge into its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopoEdge {
    pub parent: NodeIndex,
    pub child: NodeIndex,
    pub edge: EdgeIndex,
}

/// Edges of `g` in topological order of their child node.
///
/// Computed once per component and reused for every search on it; residual
/// updates only change weights, never structure.
pub fn topological_edges(g: &ExonGraph) -> Result<Vec<TopoEdge>> {
    let order = toposort(&g.graph, None).map_err(|cycle| PathError::Cycle {
        node: g.node(cycle.node_id()),
    })?;

    let mut out = Vec::with_capacity(g.edge_count());
    for child in order {
        // petgraph yields incoming edges newest-first; relax in insertion order
        let start = out.len();
        out.extend(
            g.graph
                .edges_directed(child, Incoming)
                .map(|e| TopoEdge { parent: e.source(), child, edge: e.id() }),
        );
        out[start..].reverse();
    }
    Ok(out)
}

/// Best path found by [`find_best_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct BestPath {
    /// Source to sink, both included.
    pub nodes: Vec<NodeIndex>,
    /// Bottleneck weight divided by path length.
    pub score: f64,
    /// Bottleneck weight.
    pub weight: f64,
}

/// Best partial path reaching a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathState {
    pub length: u64,
    pub weight: f64,
    pub score: f64,
    pub pred: NodeIndex,
}

/// Scratch state of one best-path search.
///
/// Owned by the caller of a single search and dropped afterwards; the graph
/// itself is never annotated.
#[derive(Debug)]
pub struct SearchContext {
    source: NodeIndex,
    states: HashMap<NodeIndex, PathState>,
}

impl SearchContext {
    pub fn new(source: NodeIndex) -> Self {
        Self { source, states: HashMap::new() }
    }

    /// Relax one edge. Edges whose parent has not been reached from the
    /// source are ignored.
    pub fn visit(&mut self, g: &ExonGraph, te: &TopoEdge) {
        let (length, weight) = if te.parent == self.source {
            (0, f64::INFINITY)
        } else {
            match self.states.get(&te.parent) {
                Some(s) => (s.length, s.weight),
                None => return,
            }
        };

        let length = length + g.node(te.child).segment_len();
        let weight = match &g.graph[te.edge] {
            SpliceEdge::Weighted { weight: w, .. } => weight.min(*w),
            SpliceEdge::PassThrough => weight,
        };
        let score = density(weight, length);

        // ties go to the parent evaluated last
        let better = self
            .states
            .get(&te.child)
            .map_or(true, |current| score >= current.score);
        if better {
            self.states.insert(te.child, PathState { length, weight, score, pred: te.parent });
        }
    }

    /// Follow back-pointers from `sink` to the source.
    pub fn traceback(&self, sink: NodeIndex) -> Result<BestPath> {
        let end = self.states.get(&sink).ok_or(PathError::SinkUnreachable)?;

        let mut nodes = vec![sink];
        let mut cur = sink;
        while cur != self.source {
            let state = self.states.get(&cur).ok_or(PathError::SinkUnreachable)?;
            cur = state.pred;
            nodes.push(cur);
            if nodes.len() > self.states.len() + 1 {
                return Err(PathError::SinkUnreachable);
            }
        }
        nodes.reverse();

        Ok(BestPath { nodes, score: end.score, weight: end.weight })
    }
}

#[inline]
fn density(weight: f64, length: u64) -> f64 {
    if length == 0 {
        0.0
    } else {
        weight / length as f64
    }
}

/// Highest density path from `source` to `sink`.
///
/// Density is the bottleneck weight over all weighted edges on the path
/// divided by the summed length of its real nodes.
pub fn find_best_path(
    g: &ExonGraph,
    edges: &[TopoEdge],
    source: NodeIndex,
    sink: NodeIndex,
) -> Result<BestPath> {
    let mut ctx = SearchContext::new(source);
    for te in edges {
        ctx.visit(g, te);
    }
    ctx.traceback(sink)
}
