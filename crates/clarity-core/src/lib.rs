//! Clarity Core - request enhanced versions of images from a remote service.
//!
//! # Architecture
//!
//! ```text
//! SourceFile → EnhancementClient ─┬─ remote (URL-based) → RemoteEnhancer → POST + poll
//!                                 └─ fallback            → data URL of the original
//! ```
//!
//! The client never surfaces remote failures: the caller always gets an
//! [`EnhancementResult`], with `fallback` set when the image is the original.
//!
//! # Usage
//!
//! ```rust,ignore
//! use clarity_core::{EnhancementClient, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> clarity_core::Result<()> {
//!     let client = EnhancementClient::new();
//!     let result = client.enhance(&SourceFile::from_path("./photo.jpg")).await?;
//!     println!("fallback={} url={}", result.is_fallback(), result.enhanced_url());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod service;
pub mod types;

pub use client::EnhancementClient;
pub use config::Config;
pub use error::{ClarityError, ConfigError, EncodeError, Result, ServiceError, ServiceResult};
pub use service::{EnhancementService, RemoteEnhancer};
pub use types::{EnhancementRequest, EnhancementResult, FileBlob, PollJob, SourceFile};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
