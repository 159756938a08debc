//! # dialdeck
//!
//! Library half of the Dialdeck binary: the timed Selection Engine, the
//! Import Pipeline, platform collaborators, configuration, the HTTP control
//! surface and the CLI.

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod import;
pub mod platform;
