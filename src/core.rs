pub mod commands;
pub mod display;
pub mod leaderboard;
pub mod models;
pub mod pagination;
pub mod ranking;
pub mod store;
pub mod templates;
