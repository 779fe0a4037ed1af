pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod console;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod storage;
pub mod utils;
