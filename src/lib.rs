pub mod config;
pub mod export;
pub mod lambda_structure;
pub mod logging;
pub mod result;
pub mod transformation;
