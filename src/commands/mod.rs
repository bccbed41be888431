pub mod common;
pub mod config;
pub mod detect;
pub mod generate;
pub mod history;
pub mod serve;
pub mod synthesize;
