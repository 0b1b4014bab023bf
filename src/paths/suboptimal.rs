use petgraph::graph::NodeIndex;

use crate::config::PathFinderConfig;
use crate::error::Result;
use crate::graph::{ExonGraph, SpliceEdge};
use crate::paths::best::{find_best_path, topological_edges, BestPath, TopoEdge};

/// A path emitted by the enumerator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPath {
    pub score: f64,
    /// Bottleneck weight that was subtracted from the graph.
    pub weight: f64,
    /// Source to sink, virtual terminals included.
    pub nodes: Vec<NodeIndex>,
}

/// Greedy weight peeling for one (source, sink) pair.
///
/// Holds no borrow of the graph, so a caller can keep it alongside the graph
/// it mutates. Each call to [`PathPeeler::next_path`] emits the current best
/// path, subtracts its bottleneck from the weighted edges it used and
/// searches the residual graph for the next one.
#[derive(Debug)]
pub struct PathPeeler {
    source: NodeIndex,
    sink: NodeIndex,
    score_limit: f64,
    max_paths: usize,
    max_iters: usize,
    emitted: usize,
    searches: usize,
    pending: Option<Result<BestPath>>,
}

impl PathPeeler {
    /// Run the first search and fix the score limit from its result.
    pub fn start(
        g: &ExonGraph,
        edges: &[TopoEdge],
        source: NodeIndex,
        sink: NodeIndex,
        config: &PathFinderConfig,
    ) -> Result<Self> {
        let best = find_best_path(g, edges, source, sink)?;
        let score_limit = best.score * config.fraction_major_path;
        tracing::trace!(score = best.score, score_limit, "best path for source");

        Ok(Self {
            source,
            sink,
            score_limit,
            max_paths: config.max_paths,
            max_iters: config.max_iters,
            emitted: 0,
            searches: 1,
            pending: Some(Ok(best)),
        })
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn next_path(
        &mut self,
        g: &mut ExonGraph,
        edges: &[TopoEdge],
    ) -> Option<Result<ScoredPath>> {
        let path = match self.pending.take()? {
            Ok(p) => p,
            Err(e) => return Some(Err(e)),
        };
        if path.score < self.score_limit {
            return None;
        }

        subtract_bottleneck(g, &path);
        self.emitted += 1;
        tracing::trace!(
            score = path.score,
            weight = path.weight,
            len = path.nodes.len(),
            "peeled path"
        );

        if self.emitted >= self.max_paths {
            tracing::debug!(max_paths = self.max_paths, "path cap reached");
        } else if !(path.weight > 0.0 && path.weight.is_finite()) {
            // nothing was subtracted, the next search would repeat this path
            tracing::debug!(weight = path.weight, "unsupported path ends enumeration");
        } else if self.searches >= self.max_iters {
            tracing::warn!(
                max_iters = self.max_iters,
                "search bound exhausted, stopping enumeration"
            );
        } else {
            self.searches += 1;
            self.pending = Some(find_best_path(g, edges, self.source, self.sink));
        }

        Some(Ok(ScoredPath { score: path.score, weight: path.weight, nodes: path.nodes }))
    }
}

fn subtract_bottleneck(g: &mut ExonGraph, path: &BestPath) {
    for pair in path.nodes.windows(2) {
        let Some(e) = g.graph.find_edge(pair[0], pair[1]) else {
            continue;
        };
        if let SpliceEdge::Weighted { weight, .. } = &mut g.graph[e] {
            *weight = (*weight - path.weight).max(0.0);
        }
    }
}

/// Lazy sequence of (score, path) pairs for one source, best first.
///
/// Mutates the graph as it goes; dropping it early simply stops peeling.
pub struct SuboptimalPaths<'g> {
    graph: &'g mut ExonGraph,
    edges: Vec<TopoEdge>,
    peeler: Option<PathPeeler>,
}

impl<'g> SuboptimalPaths<'g> {
    pub fn new(
        graph: &'g mut ExonGraph,
        source: NodeIndex,
        sink: NodeIndex,
        config: &PathFinderConfig,
    ) -> Result<Self> {
        config.validate()?;
        let edges = topological_edges(graph)?;
        let peeler = PathPeeler::start(graph, &edges, source, sink, config)?;
        Ok(Self { graph, edges, peeler: Some(peeler) })
    }
}

impl Iterator for SuboptimalPaths<'_> {
    type Item = Result<ScoredPath>;

    fn next(&mut self) -> Option<Self::Item> {
        let peeler = self.peeler.as_mut()?;
        let item = peeler.next_path(self.graph, &self.edges);
        if !matches!(item, Some(Ok(_))) {
            self.peeler = None;
        }
        item
    }
}
