//! Request handler module
//!
//! Routes requests to the upstream relays or the static file server.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
