use crate::config::PathFinderConfig;
use crate::error::Result;
use crate::graph::{normalize_terminals, split_components, ExonGraph, SpliceGraph, Terminals};
use crate::model::{GeneId, LocusPath, ScoreMap, TssId};
use crate::paths::best::{topological_edges, TopoEdge};
use crate::paths::suboptimal::PathPeeler;

struct Prepared {
    terminals: Terminals,
    edges: Vec<TopoEdge>,
}

struct Component {
    graph: ExonGraph,
    prepared: Option<Prepared>,
}

/// Lazy (gene_id, tss_id, score, path) sequence for one locus.
///
/// Components are visited in order of their lowest node, TSSs in 5'->3'
/// order within a component. `gene_id` advances once per component and
/// `tss_id` once per TSS, both starting at zero. The first error ends the
/// sequence.
pub struct LocusPaths {
    components: Vec<Component>,
    config: PathFinderConfig,
    comp: usize,
    source: usize,
    gene_id: GeneId,
    tss_id: TssId,
    active: Option<PathPeeler>,
    failed: bool,
}

impl LocusPaths {
    /// Split an exon graph into components and enumerate them lazily.
    pub fn new(graph: &ExonGraph, config: &PathFinderConfig) -> Result<Self> {
        config.validate()?;
        let components = split_components(graph)
            .into_iter()
            .map(|graph| Component { graph, prepared: None })
            .collect();
        Ok(Self {
            components,
            config: *config,
            comp: 0,
            source: 0,
            gene_id: 0,
            tss_id: 0,
            active: None,
            failed: false,
        })
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Genes (components) fully processed so far.
    pub fn genes_seen(&self) -> usize {
        self.gene_id
    }

    /// TSSs fully processed so far.
    pub fn tss_seen(&self) -> usize {
        self.tss_id
    }

    fn fail<T>(&mut self, err: crate::error::PathError) -> Option<Result<T>> {
        self.failed = true;
        self.active = None;
        Some(Err(err))
    }
}

impl Iterator for LocusPaths {
    type Item = Result<LocusPath>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            let comp = self.components.get_mut(self.comp)?;

            if comp.prepared.is_none() {
                let prepared = normalize_terminals(&mut comp.graph).and_then(|terminals| {
                    let edges = topological_edges(&comp.graph)?;
                    Ok(Prepared { terminals, edges })
                });
                match prepared {
                    Ok(p) => {
                        tracing::debug!(
                            gene_id = self.gene_id,
                            exons = comp.graph.node_count(),
                            tss = p.terminals.sources.len(),
                            "entering component"
                        );
                        comp.prepared = Some(p);
                    }
                    Err(e) => return self.fail(e),
                }
            }
            let Some(prepared) = comp.prepared.as_ref() else {
                continue;
            };

            if let Some(peeler) = self.active.as_mut() {
                match peeler.next_path(&mut comp.graph, &prepared.edges) {
                    Some(Ok(p)) => {
                        return Some(Ok(LocusPath {
                            gene_id: self.gene_id,
                            tss_id: self.tss_id,
                            score: p.score,
                            path: comp.graph.real_nodes(&p.nodes),
                        }));
                    }
                    Some(Err(e)) => return self.fail(e),
                    None => {
                        self.active = None;
                        self.tss_id += 1;
                        self.source += 1;
                        continue;
                    }
                }
            }

            match prepared.terminals.sources.get(self.source) {
                Some(src) => {
                    tracing::debug!(tss_id = self.tss_id, tss = src.tss, "enumerating paths");
                    let started = PathPeeler::start(
                        &comp.graph,
                        &prepared.edges,
                        src.node,
                        prepared.terminals.sink,
                        &self.config,
                    );
                    match started {
                        Ok(peeler) => self.active = Some(peeler),
                        Err(e) => return self.fail(e),
                    }
                }
                None => {
                    // component exhausted
                    self.gene_id += 1;
                    self.comp += 1;
                    self.source = 0;
                }
            }
        }
    }
}

/// Transform `splice` with `scores` and enumerate isoforms for the locus.
///
/// Parameters are validated and the transform runs eagerly; components are
/// normalized and searched as the returned iterator is pulled.
pub fn find_isoforms(
    splice: &SpliceGraph,
    scores: &ScoreMap,
    config: &PathFinderConfig,
) -> Result<LocusPaths> {
    config.validate()?;
    let graph = ExonGraph::from_splice_graph(splice, scores)?;
    LocusPaths::new(&graph, config)
}
