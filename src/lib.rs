pub mod config;
pub mod export;
pub mod h2h;
pub mod history;
pub mod ingest;
pub mod interaction;
pub mod league_context;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod store;
pub mod synthetic;
pub mod team_profile;
