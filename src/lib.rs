//! Incant - natural-language shell command generation.
//!
//! This library backs the `incant` binary: it turns plain-English prompts
//! into shell commands through a remote generation service. It supports:
//!
//! - **Command generation** via the incant API
//! - **Interactive sessions** with a pane-based terminal UI
//! - **Device-code login** against GitHub, plus guest registration
//! - **Command execution** through the user's shell
//! - **Explanations** of generated commands on request
//! - **Persistence** of commands to executable files and the clipboard
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Persistent settings (credential, defaults, paths)
//! - [`api`] - The remote generation service and its envelope format
//! - [`auth`] - GitHub device-code authorization flow
//! - [`session`] - Per-run flags derived from config and CLI switches
//! - [`executor`] - Runs generated commands through the shell
//! - [`output`] - Command persistence to files and the clipboard
//! - [`oneshot`] - Single-pass flow for prompts given on the command line
//! - [`examples`] - Curated usage examples for the `examples` subcommand
//! - [`tui`] - The interactive session: panes, messages, state machine
//! - [`http_client`] - HTTP client abstraction
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use incant::api::{ApiClient, CommandService};
//! use incant::http_client::ReqwestHttpClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = Arc::new(ReqwestHttpClient::new());
//!     let client = ApiClient::new(http, "my-credential".to_string());
//!
//!     let generated = client.generate("list files by size", "Unix/Bash").await?;
//!     println!("{}", generated.cmd);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod examples;
pub mod executor;
pub mod http_client;
pub mod oneshot;
pub mod output;
pub mod session;
pub mod tui;
