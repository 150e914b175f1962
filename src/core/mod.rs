//! Recipe model, parsing, conditions, wizard, and export.

pub mod condition;
pub mod context;
pub mod export;
pub mod parser;
pub mod types;
pub mod wizard;
