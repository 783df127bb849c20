#![forbid(unsafe_code)]

//! fitsession: group timestamped FIT recordings into session directories.
//!
//! Library entry point exposing planning, confirmation and relocation.
//! The binary (`main.rs`) is a thin CLI wrapper around this library.

pub mod confirm;
pub mod discovery;
pub mod error;
pub mod grouping;
pub mod model;
pub mod pipeline;
pub mod relocate;
pub mod report;
pub mod timestamp;
