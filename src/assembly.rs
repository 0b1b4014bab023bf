use std::collections::BTreeSet;
use std::fmt;

use crate::config::PathFinderConfig;
use crate::error::Result;
use crate::graph::SpliceGraph;
use crate::model::{label_map, score_map, LabelMap, LocusPath, Transcript};
use crate::paths::find_isoforms;
use crate::types::{NodeType, RefBlock, Strand};

/// One locus as handed to the path finder: its transcripts and the splice
/// graph built from them.
#[derive(Debug, Clone)]
pub struct Locus {
    pub chrom: String,
    pub transcripts: Vec<Transcript>,
    pub graph: SpliceGraph,
}

impl Locus {
    pub fn new(chrom: impl Into<String>, transcripts: Vec<Transcript>, graph: SpliceGraph) -> Self {
        Self { chrom: chrom.into(), transcripts, graph }
    }

    /// Build the splice graph by chaining every transcript.
    pub fn from_transcripts(chrom: impl Into<String>, mut transcripts: Vec<Transcript>) -> Self {
        let mut graph = SpliceGraph::new();
        for tx in &mut transcripts {
            if !tx.is_finalized() {
                tx.finalize();
            }
            graph.add_transcript(tx);
        }
        Self::new(chrom, transcripts, graph)
    }

    pub fn span(&self) -> Option<(u32, u32)> {
        let start = self.transcripts.iter().filter_map(Transcript::span).map(|s| s.0).min()?;
        let end = self.transcripts.iter().filter_map(Transcript::span).map(|s| s.1).max()?;
        Some((start, end))
    }
}

/// Human-readable summary of a locus, for logging and the `stats` command.
impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.span().unwrap_or((0, 0));
        write!(
            f,
            "{}:{}-{} transcripts={} exons={} introns={} edges={}",
            self.chrom,
            start,
            end,
            self.transcripts.len(),
            self.graph.count_type(NodeType::Exon),
            self.graph.count_type(NodeType::Intron),
            self.graph.edge_count()
        )
    }
}

/// A reconstructed isoform with run-wide identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoformRecord {
    pub chrom: String,
    pub locus_id: usize,
    pub gene_id: usize,
    pub tss_id: usize,
    pub tx_id: usize,
    pub strand: Strand,
    pub score: f64,
    /// Ascending genomic order.
    pub exons: Vec<RefBlock>,
    /// Distinct transcript/exon ids seen on the isoform's exons.
    pub supporting_ids: usize,
    /// Distinct sample labels among those ids.
    pub supporting_labels: usize,
}

impl IsoformRecord {
    pub fn name(&self) -> String {
        format!(
            "L{:07}|G{:07}|TSS{:07}|TU{:07}",
            self.locus_id, self.gene_id, self.tss_id, self.tx_id
        )
    }

    pub fn span(&self) -> Option<(u32, u32)> {
        Some((self.exons.first()?.start, self.exons.last()?.end))
    }
}

/// BED12 line followed by the supporting id and label counts.
impl fmt::Display for IsoformRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.span().unwrap_or((0, 0));
        let sizes: String = self.exons.iter().map(|e| format!("{},", e.len())).collect();
        let starts: String = self.exons.iter().map(|e| format!("{},", e.start - start)).collect();
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t0\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            start,
            end,
            self.name(),
            self.score,
            self.strand,
            start,
            start,
            self.exons.len(),
            sizes,
            starts,
            self.supporting_ids,
            self.supporting_labels
        )
    }
}

/// Run-wide context: owns the locus/gene/TSS/transcript counters so that
/// identifiers stay unique across loci.
#[derive(Debug, Clone)]
pub struct Assembler {
    config: PathFinderConfig,
    next_locus: usize,
    next_gene: usize,
    next_tss: usize,
    next_tx: usize,
}

impl Assembler {
    pub fn new(config: PathFinderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            next_locus: 1,
            next_gene: 1,
            next_tss: 1,
            next_tx: 1,
        })
    }

    pub fn config(&self) -> &PathFinderConfig {
        &self.config
    }

    pub fn loci_processed(&self) -> usize {
        self.next_locus - 1
    }

    /// Enumerate isoforms for `locus` and give them run-wide ids.
    ///
    /// On error no counter moves, so the failed locus leaves no gap.
    pub fn assemble_locus(&mut self, locus: &Locus) -> Result<Vec<IsoformRecord>> {
        let scores = score_map(&locus.transcripts);
        let labels = label_map(&locus.transcripts);

        tracing::debug!(locus_id = self.next_locus, locus = %locus, "assembling locus");

        let mut iter = find_isoforms(&locus.graph, &scores, &self.config)?;
        let paths: Vec<LocusPath> = iter.by_ref().collect::<Result<_>>()?;

        let records: Vec<IsoformRecord> = paths
            .into_iter()
            .enumerate()
            .map(|(k, p)| self.record(locus, &labels, self.next_tx + k, p))
            .collect();

        self.next_tx += records.len();
        self.next_gene += iter.genes_seen();
        self.next_tss += iter.tss_seen();
        self.next_locus += 1;

        tracing::debug!(isoforms = records.len(), genes = iter.genes_seen(), "locus done");
        Ok(records)
    }

    fn record(
        &self,
        locus: &Locus,
        labels: &LabelMap,
        tx_id: usize,
        p: LocusPath,
    ) -> IsoformRecord {
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        for node in &p.path {
            if let Some(v) = locus.graph.vertex(node) {
                ids.extend(v.ids.iter().map(String::as_str));
            }
        }
        let sample_labels: BTreeSet<&str> = ids
            .iter()
            .filter_map(|id| labels.get(*id))
            .map(String::as_str)
            .collect();

        let strand = p
            .path
            .iter()
            .try_fold(Strand::Unknown, |acc, n| acc.merge(n.strand))
            .unwrap_or(Strand::Unknown);

        let mut exons: Vec<RefBlock> = p.path.iter().map(|n| n.block()).collect();
        exons.sort();

        IsoformRecord {
            chrom: locus.chrom.clone(),
            locus_id: self.next_locus,
            gene_id: self.next_gene + p.gene_id,
            tss_id: self.next_tss + p.tss_id,
            tx_id,
            strand,
            score: p.score,
            exons,
            supporting_ids: ids.len(),
            supporting_labels: sample_labels.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;

    fn tx(id: &str, label: &str, strand: Strand, score: f64, exons: &[(u32, u32)]) -> Transcript {
        let mut t = Transcript::new(id, "chr7", strand, score, label);
        for &(s, e) in exons {
            t = t.with_exon(s, e);
        }
        t
    }

    fn two_gene_locus() -> Locus {
        Locus::from_transcripts(
            "chr7",
            vec![
                tx("A", "s1", Strand::Plus, 6.0, &[(0, 100), (500, 600)]),
                tx("B", "s2", Strand::Plus, 3.0, &[(200, 300), (500, 600)]),
                tx("C", "s1", Strand::Plus, 2.0, &[(9000, 9100)]),
            ],
        )
    }

    #[test]
    fn ids_continue_across_loci() {
        let mut asm = Assembler::new(PathFinderConfig::default()).unwrap();

        let first = asm.assemble_locus(&two_gene_locus()).unwrap();
        let ids: Vec<(usize, usize, usize, usize)> =
            first.iter().map(|r| (r.locus_id, r.gene_id, r.tss_id, r.tx_id)).collect();
        assert_eq!(ids, vec![(1, 1, 1, 1), (1, 1, 2, 2), (1, 2, 3, 3)]);

        let second = asm
            .assemble_locus(&Locus::from_transcripts(
                "chr7",
                vec![tx("D", "s3", Strand::Minus, 1.0, &[(20000, 20100), (20300, 20400)])],
            ))
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(
            (second[0].locus_id, second[0].gene_id, second[0].tss_id, second[0].tx_id),
            (2, 3, 4, 4)
        );
        assert_eq!(second[0].name(), "L0000002|G0000003|TSS0000004|TU0000004");
        assert_eq!(asm.loci_processed(), 2);
    }

    #[test]
    fn records_count_supporting_ids_and_labels() {
        let mut asm = Assembler::new(PathFinderConfig::default()).unwrap();
        let records = asm.assemble_locus(&two_gene_locus()).unwrap();

        // first isoform: exon 0-100 (A) and shared 500-600 (A, B)
        assert_eq!(records[0].supporting_ids, 2);
        assert_eq!(records[0].supporting_labels, 2);
        // lone exon of C
        assert_eq!(records[2].supporting_ids, 1);
        assert_eq!(records[2].supporting_labels, 1);
    }

    #[test]
    fn minus_strand_record_renders_ascending_bed_blocks() {
        let mut asm = Assembler::new(PathFinderConfig::default()).unwrap();
        let locus = Locus::from_transcripts(
            "chr2",
            vec![tx("M", "s", Strand::Minus, 4.0, &[(100, 200), (300, 450)])],
        );
        let records = asm.assemble_locus(&locus).unwrap();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.strand, Strand::Minus);
        assert_eq!(r.exons, vec![RefBlock::new(100, 200), RefBlock::new(300, 450)]);

        let line = r.to_string();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 14);
        assert_eq!(&fields[..3], &["chr2", "100", "450"]);
        assert_eq!(fields[5], "-");
        assert_eq!(fields[9], "2");
        assert_eq!(fields[10], "100,150,");
        assert_eq!(fields[11], "0,200,");
    }

    #[test]
    fn failed_locus_leaves_counters_alone() {
        let mut asm = Assembler::new(PathFinderConfig::default()).unwrap();
        let mut locus = two_gene_locus();
        // drop a transcript so its id has no score
        locus.transcripts.pop();

        let err = asm.assemble_locus(&locus).unwrap_err();
        assert_eq!(err, PathError::MissingScore { id: "C".into() });
        assert_eq!(asm.loci_processed(), 0);

        let ok = asm.assemble_locus(&two_gene_locus()).unwrap();
        assert_eq!(ok[0].tx_id, 1);
        assert_eq!(ok[0].locus_id, 1);
    }

    #[test]
    fn locus_summary_lists_graph_sizes() {
        let s = two_gene_locus().to_string();
        assert_eq!(s, "chr7:0-9100 transcripts=3 exons=4 introns=2 edges=4");
    }
}
