use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;

use crate::graph::transform::ExonGraph;

/// Weakly connected components of `g`.
///
/// petgraph only counts connected components, so they are collected through
/// its union-find structure. Components are ordered by their lowest node
/// index and list their members in index order, which keeps downstream
/// gene/TSS numbering reproducible.
pub fn weakly_connected_components(g: &ExonGraph) -> Vec<Vec<NodeIndex>> {
    let mut sets: UnionFind<usize> = UnionFind::new(g.node_count());
    for (a, b, _) in g.edge_triples() {
        sets.union(a.index(), b.index());
    }
    let labels = sets.into_labeling();

    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    for ix in g.node_indices() {
        let label = labels[ix.index()];
        let k = *slot.entry(label).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[k].push(ix);
    }
    components
}

/// Copy every weakly connected component of `g` into its own graph.
///
/// Virtual terminals of `g`, if any, are not carried over as terminals; each
/// component is expected to be normalized on its own.
pub fn split_components(g: &ExonGraph) -> Vec<ExonGraph> {
    let components = weakly_connected_components(g);
    let mut owner: Vec<usize> = vec![0; g.node_count()];
    let mut remap: Vec<NodeIndex> = vec![NodeIndex::end(); g.node_count()];
    let mut out: Vec<ExonGraph> = Vec::with_capacity(components.len());

    for (k, members) in components.iter().enumerate() {
        let mut sub = ExonGraph::new();
        for &ix in members {
            let v = g.vertex(ix);
            let new_ix = if v.node.is_dummy() {
                sub.add_virtual(v.node)
            } else {
                sub.add_exon(v.node, v.weight, v.ids.iter().cloned())
            };
            owner[ix.index()] = k;
            remap[ix.index()] = new_ix;
        }
        out.push(sub);
    }

    for (a, b, edge) in g.edge_triples() {
        let sub = &mut out[owner[a.index()]];
        sub.add_edge_ix(remap[a.index()], remap[b.index()], edge.clone());
    }

    tracing::debug!(components = out.len(), "split exon graph");
    out
}
