//! stagehand: deploys a project to a staging host over a single SSH session.

pub mod cli;
pub mod constants;
pub mod core;
pub mod dev_utils;
pub mod models;
pub mod system;
