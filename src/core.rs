//! Lookup requests, the calculator client, and parsing of calculator pages.
//!
//! The CLI and the HTTP server both sit on top of this module; neither talks
//! to the calculator directly.

pub(crate) mod api;
pub(crate) mod commands;
pub(crate) mod error;
pub(crate) mod models;
pub(crate) mod parse;
