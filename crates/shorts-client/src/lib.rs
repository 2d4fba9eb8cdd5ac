//! Clients for the external generation services.
//!
//! This crate provides:
//! - The `GenerationBackend` trait the studio orchestrates against
//! - `HttpBackend` for the prompt, script, image, voiceover and video services
//! - `DemoBackend` for offline runs with fault injection
//! - Endpoint configuration and request metrics

pub mod backend;
pub mod config;
pub mod demo;
pub mod error;
pub mod http;
pub mod metrics;

pub use backend::{AssembledVideo, GenerationBackend};
pub use config::{ClientConfig, RetrievalPolicy, ServiceEndpoints};
pub use demo::{DemoBackend, DemoFaults};
pub use error::{ServiceError, ServiceResult};
pub use http::HttpBackend;
