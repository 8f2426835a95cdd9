pub mod browsers;
pub mod config;
pub mod context;
pub mod errors;
pub mod github;
pub mod info;
pub mod init;
pub mod manifest;
pub mod materialize;
pub mod preflight;
pub mod prompts;
pub mod provision;
pub mod theme;
pub mod ui;
pub mod vcs;
