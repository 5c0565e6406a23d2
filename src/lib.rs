//! Glyphd - a handwritten-digit recognition HTTP service
//!
//! Glyphd serves a small fully-connected MNIST classifier over HTTP:
//! - JSON predict endpoint backed by an ndarray forward pass
//! - Model weights loaded from a single JSON file at startup
//! - Placeholder predictions when no weights are configured
//! - Bundled drawing UI served as static files

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod preprocess;

pub use error::{Error, Result};
