//! Protocol implementations.
//!
//! - `http`: request-line HTTP/1.1 with a root route and an echo route

pub mod http;
