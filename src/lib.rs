//! tutorchat is a terminal client for grammar-tutor chat backends.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the tutoring session: the session identifier, the
//!   request/outcome plumbing, the HTTP transport, the append-only message log,
//!   and configuration.
//! - [`ui`] renders the full-screen terminal interface and runs the event loop
//!   that feeds key presses and request completions into the session.
//! - [`cli`] parses arguments and dispatches to the full-screen client or a
//!   one-shot command.
//! - [`api`] defines the JSON payloads exchanged with the backend.
//!
//! The binary entrypoint (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
