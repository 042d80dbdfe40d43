//! Depot - single-directory HTTP file server
//!
//! Core library: a hand-written HTTP/1.1 request parser and response
//! framer, a `multipart/form-data` upload decoder, and the router that
//! serves, stores and deletes files under one storage root.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
