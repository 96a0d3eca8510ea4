pub mod aggregate;
pub mod matching;
pub mod metrics;
pub mod report;
pub mod selection;
