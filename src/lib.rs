#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # Tanakh
//!
//! Command-line reader, scraper, API server and static site generator for the
//! Hebrew Bible.
//!
//! The reading logic lives in [`tanakh_core`], Sefaria fetching in
//! [`tanakh_scraper`] and the HTTP API in [`tanakh_web`]; this crate wires
//! them to the command line and the layered configuration.

pub use tanakh_core;
pub use tanakh_scraper;
pub use tanakh_web;

pub mod cli;
pub mod commands;
pub mod config;
pub mod site;
