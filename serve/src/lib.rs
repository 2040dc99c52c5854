//! # serve
//!
//! The HTTP transport: a hand-rolled HTTP/1.1 codec over raw TCP (no
//! keep-alive, no pipelining — §4.1), the OpenAI- and Ollama-compatible
//! wire adapters (§4.3), the SSE/NDJSON stream engine (§4.4), the router
//! (§4.2), and the port-fallback server controller (§4.8).
//!
//! [`gateway_core`] does all the actual request processing; this crate only
//! decodes bytes into its types and encodes its results back onto the wire.

pub mod adapters;
pub mod connection;
pub mod controller;
pub mod error;
pub mod http;
pub mod router;
pub mod state;
pub mod stream;

pub use controller::{ServerController, ServerStatus, PORT_FALLBACK};
pub use state::AppState;
