// src/core/mod.rs

pub mod command;
pub mod env_file;
pub mod error;
pub mod frameworks;
pub mod git_remote;
pub mod paths;
pub mod repo_map;
pub mod runner;
pub mod sequencer;
pub mod settings;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod testing;
