// src/output/mod.rs
//! Output handling: rendering rows as JSON and delivering them.
//!
//! Rendering is pure; [`deliver`] is the only place file or stdout I/O
//! happens.

mod types;
mod writer;

pub use types::{DeliveryTarget, OutputReport};
pub use writer::{deliver, render_rows, JsonFileSink};
