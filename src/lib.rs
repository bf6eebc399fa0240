//! # Milsim Toolbox - Chat Command Layer for a Milsim Game Server
//!
//! A set of in-game chat commands for players and administrators: inventory paging and
//! item handling, body and environment reports, map rotation browsing with a cancellable
//! forced map advance, and a rate-limited mailbox to the administrators.
//!
//! The game world is not part of this crate. The [`host`] traits describe what the
//! server runtime provides; [`host::LocalHost`] is an in-memory implementation backing
//! the `console` binary subcommand and the tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use milsim_toolbox::config::Config;
//! use milsim_toolbox::host::{LocalHost, local::LocalPlayer};
//! use milsim_toolbox::toolbox::Toolbox;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("toolbox.toml").await?;
//!     let mut host = LocalHost::from_config(&config);
//!     host.add_player(LocalPlayer::new(1, "Deuce").admin());
//!
//!     let mut toolbox = Toolbox::from_config(&config);
//!     toolbox.on_connect(1);
//!     if let Some(reply) = toolbox.handle_line(&mut host, 1, "/showrotation").await {
//!         println!("{}", reply);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`commands`] - command catalogue, parameter signatures and argument binding
//! - [`toolbox`] - the command actor and its handlers
//! - [`paging`] - fixed-size pagination shared by item and rotation listings
//! - [`inventory`] - items, containers and the paged inventory views
//! - [`rotation`] - rotation listing and the forced map advance state machine
//! - [`mailbox`] - append-only player to administrator message log
//! - [`session`] - per-connection command state
//! - [`host`] - collaborator traits and the local in-memory host
//! - [`config`] - TOML configuration
//! - [`error`] - library error type
//! - [`logutil`] - single-line escaping for logs and the mail file

pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod inventory;
pub mod logutil;
pub mod mailbox;
pub mod paging;
pub mod rotation;
pub mod session;
pub mod toolbox;
