//! Pipeline stage services

pub mod assets;
pub mod chunk_extractor;
pub mod ranker;
pub mod selector;
