//! Admin lists - paginated list endpoints and the client that queries them
//!
//! The server side serves filtered, paginated lists behind a uniform
//! `{ code, message, data }` envelope. The client side keeps list
//! parameters in an observable store and fetches pages through a
//! result cache.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod repository;
pub mod services;
