pub mod types;
pub mod transcript;

pub use types::{GeneId, LabelMap, LocusPath, ScoreMap, TssId};
pub use transcript::{label_map, score_map, Transcript};
