pub mod cleaning;
pub mod cli;
pub mod config;
pub mod export;
pub mod imaging;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod models;
pub mod orchestrator;
pub mod sync;

pub mod error;
