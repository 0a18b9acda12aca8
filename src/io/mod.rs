/// Module containing the buffered and size-limited readers
pub mod reader;
/// Module containing the buffered writer
pub mod writer;

pub use reader::{BufferedRead, LimitSizeReader, Reader};
pub use writer::Writer;

/// Capacity of the internal read and write buffers.
pub const BUFSIZE: usize = 8192;
