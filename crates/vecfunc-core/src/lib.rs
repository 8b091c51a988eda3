//! vecfunc Core - Vector SQL functions for DataFusion
//!
//! This crate provides the functions behind the `vector` extension:
//! - `vector(text)` greeting scalar function
//! - `list_distance` and the `list_*` distance functions over list columns
//! - Distance aggregates (`l2norm`, `l2distance`, `dot_product`, cosine)
//! - FFI exports for non-Rust hosts
//!
//! # Usage
//!
//! ```no_run
//! # async fn demo() -> datafusion::error::Result<()> {
//! let ctx = vecfunc_core::session_context();
//! ctx.sql("SELECT vector('Sam') AS value").await?.show().await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod distance;
pub mod error;
pub mod extension;
pub mod ffi;
pub mod greeting;
pub mod list;

pub use config::ExtensionConfig;
pub use distance::{DistanceAlgorithm, DistanceState};
pub use error::{Error, Result};
pub use extension::{session_context, VectorExtension};
pub use greeting::greet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
