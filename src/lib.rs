pub mod config;
pub mod cycles;
pub mod error;
pub mod labels;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod trace;
