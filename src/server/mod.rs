//! Network front end: accepts TCP connections and hands each one to a
//! [`crate::http::connection::Connection`].

pub mod listener;
