use serde::{Serialize, Deserialize};
use std::fmt;

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Combine two strands. `Unknown` yields to the other side.
    ///
    /// Returns `None` when Plus meets Minus.
    #[inline]
    pub fn merge(self, other: Strand) -> Option<Strand> {
        match (self, other) {
            (Strand::Unknown, s) | (s, Strand::Unknown) => Some(s),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{s}")
    }
}

/// A contiguous genomic interval.
/// Coordinates are 0-based, half-open: [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RefBlock {
    pub start: u32,
    pub end: u32,
}

impl RefBlock {
    /// Create a new block. Panics if start >= end.
    pub fn new(start: u32, end: u32) -> Self {
        assert!(start < end, "RefBlock requires start < end");
        Self { start, end }
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.end - self.start
    }
}

/// Kind of segment a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Exon,
    Intron,
    /// Virtual terminal added by the path finder. Never carries genomic meaning.
    Dummy,
}

/// A genomic segment used as a graph vertex key.
///
/// Equality and hashing are structural: two nodes with identical
/// coordinates, strand and type are the same vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    pub start: u32,
    pub end: u32,
    pub strand: Strand,
    pub node_type: NodeType,
}

impl Node {
    pub fn new(start: u32, end: u32, strand: Strand, node_type: NodeType) -> Self {
        Self { start, end, strand, node_type }
    }

    pub fn exon(start: u32, end: u32, strand: Strand) -> Self {
        Self::new(start, end, strand, NodeType::Exon)
    }

    pub fn intron(start: u32, end: u32, strand: Strand) -> Self {
        Self::new(start, end, strand, NodeType::Intron)
    }

    /// Sentinel used for every virtual source.
    pub fn virtual_source() -> Self {
        Self::new(0, 0, Strand::Unknown, NodeType::Dummy)
    }

    /// Sentinel used for the virtual sink.
    pub fn virtual_sink() -> Self {
        Self::new(u32::MAX, u32::MAX, Strand::Unknown, NodeType::Dummy)
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.node_type == NodeType::Dummy
    }

    /// Length contributed to a path. Virtual nodes contribute nothing.
    #[inline]
    pub fn segment_len(&self) -> u64 {
        match self.node_type {
            NodeType::Dummy => 0,
            _ => u64::from(self.end.saturating_sub(self.start)),
        }
    }

    /// Transcription-start coordinate: `start` on Plus/Unknown, `end` on Minus.
    #[inline]
    pub fn tss(&self, strand: Strand) -> u32 {
        match strand {
            Strand::Minus => self.end,
            _ => self.start,
        }
    }

    pub fn block(&self) -> RefBlock {
        RefBlock { start: self.start, end: self.end }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_type {
            NodeType::Dummy => write!(f, "dummy"),
            NodeType::Exon => write!(f, "E[{}-{}]({})", self.start, self.end, self.strand),
            NodeType::Intron => write!(f, "I[{}-{}]({})", self.start, self.end, self.strand),
        }
    }
}
