use std::{
    fmt,
    io::{Chain, Cursor, Read},
};

use crate::{
    error::HttpError,
    http::{request::Request, response::Response},
    io::{Reader, Writer},
    transport::Stream,
};

/// Per-connection state handed through the handler chain.
///
/// Owns the connection, the decoded request and the response being built. The
/// connection is closed when the context is dropped.
pub struct Context {
    stream: Box<dyn Stream>,
    /// Bytes received past the request head that no handler consumed yet.
    pending: Vec<u8>,
    /// The decoded request.
    pub req: Request,
    /// The response handlers build up.
    pub resp: Response,
}

/// Reader over the connection that first yields the bytes buffered past the head.
pub type StreamReader<'a> = Reader<Chain<Cursor<Vec<u8>>, &'a mut Box<dyn Stream>>>;

impl Context {
    /// Wraps a connection with an empty request and response.
    pub fn new(stream: impl Stream + 'static) -> Self {
        Self {
            stream: Box::new(stream),
            pending: Vec::new(),
            req: Request::default(),
            resp: Response::default(),
        }
    }

    /// Gives the head parser the connection and the request to fill in at the same time.
    pub(crate) fn parts(&mut self) -> (&mut Box<dyn Stream>, &mut Request) {
        (&mut self.stream, &mut self.req)
    }

    /// Puts bytes back in front of the unread part of the connection.
    ///
    /// The next [`Context::body_reader`] yields them before reading from the socket.
    pub fn unread(&mut self, mut bytes: Vec<u8>) {
        bytes.append(&mut self.pending);
        self.pending = bytes;
    }

    /// Number of bytes read ahead of the current position.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns a buffered reader over the rest of the connection.
    ///
    /// Bytes already buffered past the request head come first. Pass the reader to
    /// [`into_unread`] and the result to [`Context::unread`] when handlers further
    /// down the chain still need the bytes it read ahead.
    pub fn body_reader(&mut self) -> StreamReader<'_> {
        let pending = std::mem::take(&mut self.pending);
        Reader::new(Cursor::new(pending).chain(&mut self.stream))
    }

    /// Serializes the response onto the connection.
    ///
    /// Does nothing if the response has no headers.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if writing to the connection fails.
    pub fn write(&mut self) -> Result<(), HttpError> {
        if self.resp.headers.is_empty() {
            return Ok(());
        }
        let mut writer = Writer::new(&mut self.stream);
        self.resp.write_to(&mut writer)
    }
}

/// Consumes a body reader, returning every byte it holds that was not consumed yet.
pub fn into_unread(reader: StreamReader<'_>) -> Vec<u8> {
    let (chain, mut leftover) = reader.into_parts();
    let (cursor, _) = chain.into_inner();
    let position = usize::try_from(cursor.position()).unwrap_or(usize::MAX);
    let stashed = cursor.into_inner();
    leftover.extend_from_slice(stashed.get(position..).unwrap_or_default());
    leftover
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("pending", &self.pending.len())
            .field("req", &self.req)
            .field("resp", &self.resp)
            .finish_non_exhaustive()
    }
}
