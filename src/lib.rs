pub mod classify;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod job;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod source;
pub mod store;
pub mod utils;
