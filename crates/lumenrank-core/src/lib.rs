pub mod config;
pub mod engine;
pub mod errors;
pub mod model;
pub mod report;
pub mod scoring;
pub mod storage;
