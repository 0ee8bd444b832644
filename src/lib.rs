pub mod aggregate;
pub mod chunk;
pub mod chunk_plan;
pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod entropy;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod score;
pub mod util;
