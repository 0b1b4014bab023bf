use std::collections::HashMap;

use crate::types::Node;

/// Gene (connected component) id, local to one locus unless offset by an
/// [`crate::assembly::Assembler`].
pub type GeneId = usize;

/// Transcription-start-site cluster id, local to one locus unless offset.
pub type TssId = usize;

/// Transcript/exon identifier -> support score.
pub type ScoreMap = HashMap<String, f64>;

/// Transcript/exon identifier -> sample label.
pub type LabelMap = HashMap<String, String>;

/// One reconstructed isoform of a locus.
///
/// `path` holds real nodes only (virtual terminals stripped), in the order
/// the graph was traversed.
#[derive(Debug, Clone, PartialEq)]
pub struct LocusPath {
    pub gene_id: GeneId,
    pub tss_id: TssId,
    pub score: f64,
    pub path: Vec<Node>,
}
