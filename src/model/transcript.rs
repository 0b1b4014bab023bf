use crate::model::types::{LabelMap, ScoreMap};
use crate::types::{RefBlock, Strand};
use serde::{Serialize, Deserialize};


/// One input transcript: an ordered set of exon blocks plus its support score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    pub chrom: String,
    pub strand: Strand,
    /// Support magnitude (e.g. an expression estimate).
    pub score: f64,
    /// Sample/source identifier.
    #[serde(default)]
    pub label: String,
    exons: Vec<RefBlock>,
    #[serde(skip)]
    finalized: bool,
}

impl Transcript {
    pub fn new(
        id: impl Into<String>,
        chrom: impl Into<String>,
        strand: Strand,
        score: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            chrom: chrom.into(),
            strand,
            score,
            label: label.into(),
            exons: Vec::new(),
            finalized: false,
        }
    }

    pub fn add_exon(&mut self, block: RefBlock) {
        self.exons.push(block);
        self.finalized = false;
    }

    /// Builder-style variant of [`Transcript::add_exon`].
    pub fn with_exon(mut self, start: u32, end: u32) -> Self {
        self.add_exon(RefBlock::new(start, end));
        self
    }

    pub fn exons(&self) -> &[RefBlock] {
        &self.exons
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Introns between consecutive exons, in genomic order.
    pub fn introns(&self) -> Vec<RefBlock> {
        let mut out = Vec::new();
        if self.exons.len() < 2 {
            return out;
        }
        for w in self.exons.windows(2) {
            let a = w[0];
            let b = w[1];
            // intron is [a.end, b.start)
            if a.end < b.start {
                out.push(RefBlock::new(a.end, b.start));
            }
        }
        out
    }

    /// sorts the transcripts exons and returns (total start: u32, total end: u32)
    pub fn finalize(&mut self) -> (u32, u32) {
        if self.exons.is_empty() {
            self.finalized = true;
            return (0, 0);
        }

        self.exons.sort_by_key(|b| (b.start, b.end));

        let mut merged: Vec<RefBlock> = Vec::with_capacity(self.exons.len());
        let mut cur = self.exons[0];

        for &b in &self.exons[1..] {
            if b.start <= cur.end {
                cur.end = cur.end.max(b.end);
            } else {
                merged.push(cur);
                cur = b;
            }
        }
        merged.push(cur);

        self.exons = merged;
        self.finalized = true;

        self.span().unwrap_or((0, 0))
    }

    pub fn span(&self) -> Option<(u32, u32)> {
        let first = self.exons.first()?;
        let last = self.exons.last()?;
        Some((first.start, last.end))
    }
}

/// Map every transcript id to its score.
///
/// Only transcript ids are keyed: graph nodes are tagged with the ids of
/// the transcripts that chain through them, never with per-exon ids.
pub fn score_map(transcripts: &[Transcript]) -> ScoreMap {
    transcripts
        .iter()
        .map(|t| (t.id.clone(), t.score))
        .collect()
}

/// Map every transcript id to its sample label.
pub fn label_map(transcripts: &[Transcript]) -> LabelMap {
    transcripts
        .iter()
        .map(|t| (t.id.clone(), t.label.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_sorts_and_merges_exons() {
        let mut t = Transcript::new("T1", "chr1", Strand::Plus, 1.0, "s1")
            .with_exon(300, 350)
            .with_exon(100, 150)
            .with_exon(140, 160);
        assert!(!t.is_finalized());

        let span = t.finalize();
        assert!(t.is_finalized());
        assert_eq!(span, (100, 350));
        assert_eq!(t.exons(), &[RefBlock::new(100, 160), RefBlock::new(300, 350)]);
        assert_eq!(t.introns(), vec![RefBlock::new(160, 300)]);
    }

    #[test]
    fn empty_transcript_finalizes_to_zero_span() {
        let mut t = Transcript::new("T0", "chr1", Strand::Minus, 0.0, "");
        assert_eq!(t.finalize(), (0, 0));
        assert_eq!(t.span(), None);
        assert!(t.introns().is_empty());
    }

    #[test]
    fn maps_are_keyed_by_transcript_id() {
        let txs = vec![
            Transcript::new("A", "chr1", Strand::Plus, 2.5, "lib1"),
            Transcript::new("B", "chr1", Strand::Plus, 4.0, "lib2"),
        ];
        let scores = score_map(&txs);
        let labels = label_map(&txs);
        assert_eq!(scores.get("A"), Some(&2.5));
        assert_eq!(scores.get("B"), Some(&4.0));
        assert_eq!(labels.get("B").map(String::as_str), Some("lib2"));
    }
}
