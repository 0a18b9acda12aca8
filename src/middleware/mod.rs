/// Module containing the request body reader
pub mod body_parser;
/// Module containing the request head parser
pub mod head_parser;

pub use body_parser::BodyParser;
pub use head_parser::HeadParser;
