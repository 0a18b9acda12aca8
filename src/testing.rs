//! In-memory stream doubles shared by the unit tests.

use std::{
    io::{self, Read, Write},
    sync::{Arc, Mutex},
};

/// Yields at most `num_bytes_per_read` bytes per `read` call.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    num_bytes_per_read: usize,
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a str, num_bytes_per_read: usize) -> Self {
        Self {
            data: data.as_bytes(),
            num_bytes_per_read: num_bytes_per_read.max(1),
            pos: 0,
        }
    }
}

impl Read for ChunkReader<'_> {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }

        let remaining = self.data.len() - self.pos;
        let to_read = remaining.min(self.num_bytes_per_read).min(buffer.len());

        buffer[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;

        Ok(to_read)
    }
}

/// Duplex stream reading from a fixed input and recording everything written.
///
/// The output is shared so it can be inspected after the stream was moved into a `Context`.
pub struct MockStream {
    input: io::Cursor<Vec<u8>>,
    chunk: usize,
    output: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    pub fn new(input: &str) -> (Self, Arc<Mutex<Vec<u8>>>) {
        Self::chunked(input, usize::MAX)
    }

    pub fn chunked(input: &str, chunk: usize) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            input: io::Cursor::new(input.as_bytes().to_vec()),
            chunk: chunk.max(1),
            output: Arc::clone(&output),
        };
        (stream, output)
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let cap = buf.len().min(self.chunk);
        self.input.read(&mut buf[..cap])
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn output_string(output: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&output.lock().unwrap()).into_owned()
}
