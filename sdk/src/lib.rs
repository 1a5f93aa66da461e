//! Async Rust client for the Devgrid devbox platform.
//!
//! The SDK is a thin, typed binding over the Devgrid REST surface — devbox
//! lifecycle, command execution, file I/O, disk snapshots, blueprints, and
//! scenario runs — plus a generic polling engine ([`polling`]) that drives
//! the platform's long-running state transitions to completion.
//!
//! ```no_run
//! use devgrid_sdk::types::CreateDevboxRequest;
//!
//! # async fn run() -> Result<(), devgrid_sdk::Error> {
//! let client = devgrid_sdk::Client::from_env()?;
//! let created = client.devboxes().create(&CreateDevboxRequest::default()).await?;
//! let devbox = client.devboxes().await_running(&created.id).await?;
//! println!("devbox {} is {}", devbox.id, devbox.status.as_str());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod error;
mod http;
pub mod polling;
pub mod resources;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, Error};

/// Re-export of the wire types crate.
pub use devgrid_api_types as types;
