//! Connection Reader & HTTP Codec (§4.1): request parsing, response
//! serialization, and chunked-transfer framing.

pub mod request;
pub mod response;

pub use request::{ConnectionBuffer, Request};
pub use response::Response;
