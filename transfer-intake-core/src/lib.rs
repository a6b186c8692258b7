#![doc = "transfer-intake-core: core pipeline for transfer-intake."]

//! This crate holds the whole intake pipeline: reading a message, pulling the
//! download link out of its body, fetching the archive into a scratch directory,
//! sniffing and extracting it, and handing the result to downstream processors.
//!
//! External programs (the retrieval helper, archive tools, the file-type
//! detector and the downstream scripts) are reached only through the traits in
//! [`contract`], so every stage can be driven by mocks in tests.
//!
//! # Usage
//! The CLI crate builds an [`config::IntakeConfig`], a [`fetch::DefaultFetcher`]
//! and a [`contract::SystemCommandRunner`], then calls [`pipeline::process_message`].

pub mod config;
pub mod contract;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod link;
pub mod message;
pub mod pipeline;
pub mod postprocess;
pub mod sniff;
pub mod workdir;
