//! # Insight API
//!
//! The chat pipeline ([`ChatService`]) and its HTTP surface.
//!
//! `POST /chat` takes `{"query": "..."}` and answers `{"response": "..."}`.

pub mod error;
pub mod rest;
pub mod service;

pub use error::{ChatError, Result};
pub use rest::create_router;
pub use service::ChatService;
