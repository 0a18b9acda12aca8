/// Module containing the per-connection context
pub mod context;
/// Module containing the header map
pub mod headers;
/// Module containing the request representation
pub mod request;
/// Module containing the response representation and its serialization
pub mod response;

pub use context::Context;
pub use headers::Headers;
pub use request::Request;
pub use response::{Response, StatusCode};
