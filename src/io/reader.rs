use std::io::{ErrorKind, Read};

use crate::{error::HttpError, io::BUFSIZE};

/// Byte source that reads through an internal buffer.
///
/// Only [`BufferedRead::read`] has to be provided; the line and count oriented
/// helpers are built on top of it, so a decorator that overrides `read` (see
/// [`LimitSizeReader`]) applies to every helper as well.
pub trait BufferedRead {
    /// Copies up to `buf.len()` buffered bytes into `buf`, refilling the internal
    /// buffer with a single receive call when it is empty.
    ///
    /// Returns `Ok(0)` once the peer closed the connection. Partial reads are normal.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if the underlying receive fails.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, HttpError>;

    /// Reads until `buf` is full or the peer closed the connection.
    ///
    /// Returns the number of bytes stored in `buf`.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`BufferedRead::read`].
    fn readn(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        let mut filled = 0;
        while filled < buf.len() {
            let read = self.read(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        Ok(filled)
    }

    /// Reads a single byte. Returns `None` on end of stream.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`BufferedRead::read`].
    fn read_char(&mut self) -> Result<Option<u8>, HttpError> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Appends one line, including its terminating `\n`, to `line`.
    ///
    /// Stops early at end of stream. Returns the number of bytes appended, so `0`
    /// means the peer closed the connection before sending anything.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`BufferedRead::read`].
    fn readline(&mut self, line: &mut Vec<u8>) -> Result<usize, HttpError> {
        let start = line.len();
        while let Some(byte) = self.read_char()? {
            line.push(byte);
            if byte == b'\n' {
                break;
            }
        }
        Ok(line.len() - start)
    }
}

/// Buffered reader over an unbuffered byte stream.
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    buffer: Box<[u8]>,
    /// Start of the unread bytes in `buffer`.
    pos: usize,
    /// Number of unread bytes in `buffer`.
    cnt: usize,
}

impl<R: Read> Reader<R> {
    /// Wraps `inner` with an empty buffer of [`BUFSIZE`] bytes.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0u8; BUFSIZE].into_boxed_slice(),
            pos: 0,
            cnt: 0,
        }
    }

    /// Bytes that were received but not consumed yet.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..self.pos + self.cnt]
    }

    /// Consumes the reader, returning the underlying stream and the unconsumed bytes.
    pub fn into_parts(self) -> (R, Vec<u8>) {
        let leftover = self.buffered().to_vec();
        (self.inner, leftover)
    }

    fn fill(&mut self) -> Result<usize, HttpError> {
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(read) => {
                    self.pos = 0;
                    self.cnt = read;
                    return Ok(read);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(HttpError::Io(e)),
            }
        }
    }
}

impl<R: Read> BufferedRead for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        if self.cnt == 0 && self.fill()? == 0 {
            return Ok(0);
        }

        let to_copy = buf.len().min(self.cnt);
        buf[..to_copy].copy_from_slice(&self.buffer[self.pos..self.pos + to_copy]);
        self.pos += to_copy;
        self.cnt -= to_copy;
        if self.cnt == 0 {
            self.pos = 0;
        }
        Ok(to_copy)
    }
}

/// Reader that fails with [`HttpError::MaxLenReached`] once `maxlen` bytes were consumed.
///
/// Every read is capped by the remaining budget, so exactly `maxlen` bytes can be
/// read before the first failure. Reads are never silently truncated past the budget.
#[derive(Debug)]
pub struct LimitSizeReader<R> {
    reader: Reader<R>,
    remaining: usize,
}

impl<R: Read> LimitSizeReader<R> {
    /// Wraps `inner` with a total budget of `maxlen` bytes.
    pub fn new(inner: R, maxlen: usize) -> Self {
        Self {
            reader: Reader::new(inner),
            remaining: maxlen,
        }
    }

    /// Bytes left in the budget.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Drops the budget and returns the plain reader, keeping any buffered bytes.
    pub fn into_inner(self) -> Reader<R> {
        self.reader
    }
}

impl<R: Read> BufferedRead for LimitSizeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        if self.remaining == 0 {
            return Err(HttpError::MaxLenReached);
        }

        let cap = buf.len().min(self.remaining);
        let read = self.reader.read(&mut buf[..cap])?;
        self.remaining -= read;
        Ok(read)
    }
}
