//! # sphynx
//!
//! Server side of Sphynx: the HTTP/JSON RPC surface, configuration layering,
//! background persistence and the command-line entry points.
//!
//! The engine itself lives in `sphynx-core`; this crate only schedules it.

pub mod api;
pub mod cli;
pub mod config;
pub mod persist;
