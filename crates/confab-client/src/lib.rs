//! confab-client: HTTP client for the remote generation endpoint
//!
//! This crate provides the wire types for the generation API and an
//! HTTP implementation of the [`GenerationClient`] trait.

pub mod error;
pub mod http;
pub mod types;

pub use error::{Error, Result};
pub use http::{ClientConfig, GenerationClient, HttpGenerationClient};
pub use types::{GenerationReply, GenerationRequest};
