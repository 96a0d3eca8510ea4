pub mod annotator;
pub mod classification;
pub mod cost;
pub mod levenshtein;
pub mod merging;
pub mod tokenization;
