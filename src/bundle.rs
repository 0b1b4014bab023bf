use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::assembly::Locus;
use crate::graph::SpliceGraph;
use crate::model::Transcript;
use crate::types::Node;

const MAGIC: &[u8; 4] = b"SPG1";
const VERSION_STR: &str = env!("CARGO_PKG_VERSION");

/// Serialized splice graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node: Node,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Serialized splice graph: nodes plus edges as indexes into `nodes`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpliceGraphRecord {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<(usize, usize)>,
}

impl From<&SpliceGraph> for SpliceGraphRecord {
    fn from(g: &SpliceGraph) -> Self {
        let mut slot: HashMap<Node, usize> = HashMap::new();
        let nodes: Vec<NodeRecord> = g
            .vertices()
            .enumerate()
            .map(|(i, v)| {
                slot.insert(v.node, i);
                NodeRecord { node: v.node, ids: v.ids.iter().cloned().collect() }
            })
            .collect();
        let edges = g
            .edges()
            .filter_map(|(a, b)| Some((*slot.get(&a)?, *slot.get(&b)?)))
            .collect();
        Self { nodes, edges }
    }
}

impl SpliceGraphRecord {
    pub fn to_graph(&self) -> Result<SpliceGraph> {
        let mut g = SpliceGraph::new();
        for rec in &self.nodes {
            g.add_node(rec.node, rec.ids.iter().cloned());
        }
        for &(a, b) in &self.edges {
            let (Some(from), Some(to)) = (self.nodes.get(a), self.nodes.get(b)) else {
                bail!(
                    "edge ({a}, {b}) points outside the {} recorded nodes",
                    self.nodes.len()
                );
            };
            g.add_edge(from.node, to.node);
        }
        Ok(g)
    }
}

/// One locus as stored on disk.
///
/// Without `graph`, the splice graph is rebuilt by chaining `transcripts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocusBundle {
    pub chrom: String,
    pub transcripts: Vec<Transcript>,
    #[serde(default)]
    pub graph: Option<SpliceGraphRecord>,
}

impl LocusBundle {
    pub fn from_locus(locus: &Locus) -> Self {
        Self {
            chrom: locus.chrom.clone(),
            transcripts: locus.transcripts.clone(),
            graph: Some(SpliceGraphRecord::from(&locus.graph)),
        }
    }

    pub fn into_locus(self) -> Result<Locus> {
        match self.graph {
            Some(rec) => {
                let graph = rec
                    .to_graph()
                    .with_context(|| format!("rebuild splice graph for locus on {}", self.chrom))?;
                Ok(Locus::new(self.chrom, self.transcripts, graph))
            }
            None => Ok(Locus::from_transcripts(self.chrom, self.transcripts)),
        }
    }
}

/// Load bundles from a binary snapshot (see [`save_snapshot`]) or from JSON.
///
/// Snapshots are recognized by their magic bytes. JSON may be gzipped if
/// the path ends with `.gz`.
pub fn load_bundles(path: impl AsRef<Path>) -> Result<Vec<LocusBundle>> {
    let path = path.as_ref();
    let mut f = File::open(path).with_context(|| format!("open bundle file {}", path.display()))?;

    let mut magic = [0u8; 4];
    let is_snapshot = f.read_exact(&mut magic).is_ok() && &magic == MAGIC;
    if is_snapshot {
        return load_snapshot(path);
    }

    let is_gz = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let f = File::open(path).with_context(|| format!("re-open bundle file {}", path.display()))?;
    let reader: Box<dyn Read> = if is_gz {
        Box::new(GzDecoder::new(f))
    } else {
        Box::new(f)
    };
    let bundles: Vec<LocusBundle> = serde_json::from_reader(BufReader::new(reader))
        .with_context(|| format!("parse JSON bundles from {}", path.display()))?;
    Ok(bundles)
}

/// Write bundles with a small header (magic + crate version) and a bincode payload.
pub fn save_snapshot(bundles: &[LocusBundle], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create snapshot {}", path.display()))?;
    let mut f = BufWriter::new(f);

    // magic
    f.write_all(MAGIC)?;

    // version string from Cargo.toml
    let v = VERSION_STR.as_bytes();
    let len = v.len() as u16;
    f.write_all(&len.to_le_bytes())?;
    f.write_all(v)?;

    // payload
    let payload = bincode::serialize(bundles)?;
    f.write_all(&payload)?;
    f.flush()?;

    Ok(())
}

/// Load a snapshot written by `save_snapshot()`. Rejects wrong file types and version mismatches.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<LocusBundle>> {
    let path = path.as_ref();
    let mut f = File::open(path).with_context(|| format!("open snapshot {}", path.display()))?;

    // check magic
    let mut magic = [0u8; 4];
    f.read_exact(&mut magic)?;
    if &magic != MAGIC {
        bail!("Not a splice bundle snapshot (bad magic)");
    }

    // read version string
    let mut len_buf = [0u8; 2];
    f.read_exact(&mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;

    let mut ver_buf = vec![0u8; len];
    f.read_exact(&mut ver_buf)?;
    let file_version = std::str::from_utf8(&ver_buf)?;

    if file_version != VERSION_STR {
        bail!(
            "Snapshot version mismatch: file={}, binary={}",
            file_version,
            VERSION_STR
        );
    }

    // read payload
    let mut payload = Vec::new();
    f.read_to_end(&mut payload)?;
    let bundles: Vec<LocusBundle> = bincode::deserialize(&payload)?;

    Ok(bundles)
}
