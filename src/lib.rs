//! feedtest: terminal test harness for the notification feeds API.
//!
//! # Architecture
//!
//! ```text
//! feedtest-api ──► FeedController ──► widgets (TUI)
//!      │
//!      └──────────► cli (one-shot subcommands)
//! ```
//!
//! The binary wires a [`feedtest_api::FeedsClient`] into either the TUI or
//! one of the [`cli`] subcommands. This crate only exposes the subcommands
//! so that integration tests can drive them against a fake service.

pub mod cli;
