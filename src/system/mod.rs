//! # System Interaction Layer
//!
//! This module is the boundary between the deployment logic and the processes it
//! drives, both on this machine and on the staging host.
//!
//! ## Modules
//!
//! - **`executor`**: Runs short local commands (such as `git config`) and captures
//!   their output.
//! - **`remote`**: The `RemoteShell` and `Connector` traits every remote step goes
//!   through, plus the `CommandResult` and error types they return.
//! - **`ssh`**: The OpenSSH implementation of those traits, multiplexing every command
//!   over a single ControlMaster connection.

pub mod executor;
pub mod remote;
pub mod ssh;
