/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod data;
pub mod error;
pub mod files;
pub mod tasks;

pub use error::{Result, SpecwiseError};

pub use client::{ClientConfig, DEFAULT_BASE_URL, SpecwiseClient};
