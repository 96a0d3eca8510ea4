pub mod builder;
pub mod cache;
pub mod defaults;
pub mod runtime;
pub mod traits;
