//! PolyFun relay
//!
//! A small HTTP server that serves the PolyFun front end and relays trade and
//! token-metadata requests to their upstream APIs. Metadata uploads pass
//! through a `multipart/form-data` codec on the way.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod multipart;
pub mod relay;
pub mod server;
