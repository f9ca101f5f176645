//! HTTP protocol layer module
//!
//! Provides HTTP helpers shared by the relay and static file handlers,
//! decoupled from request routing.

pub mod cache;
pub mod content_type;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    apply_cors_headers, build_304_response, build_404_response, build_405_response,
    build_413_response, build_500_response, build_json_error_response, build_options_response,
};
