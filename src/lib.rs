pub mod alignment;
pub mod config;
pub mod error;
pub mod m2;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use config::{CompareConfig, ConvertConfig, EvalConfig};
pub use error::EvalError;
pub use m2::{decode_corpus, decode_record, encode_corpus, encode_record};
pub use pipeline::builder::{evaluation_report, EvaluatorBuilder};
pub use pipeline::runtime::Evaluator;
pub use pipeline::traits::{
    CharSimilarity, EditMerger, ScriptNormalizer, SequenceAligner, TokenSource,
};
pub use scoring::report::{write_report, MetricRow, Report};
pub use types::{AnnotationBlock, ConfusionCounts, Edit, Record, Span, Token};
