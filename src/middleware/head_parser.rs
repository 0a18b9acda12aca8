use tracing::{debug, warn};

use crate::{
    error::{ErrorCategory, HttpError},
    http::{Context, Request},
    io::{BufferedRead, LimitSizeReader, Reader},
    runtime::{handler::Handler, task::Next},
};

/// Characters stripped from both ends of a header value.
const fn is_header_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c' | '\x0b')
}

/// First handler of every chain: decodes the request line and headers into `ctx.req`.
///
/// The rest of the chain only runs if the head was decoded completely. With a limit,
/// the head may consume at most that many bytes of the connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadParser {
    limit: Option<usize>,
}

impl HeadParser {
    /// A parser without a size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self { limit: None }
    }

    /// A parser that fails with `HttpError::MaxLenReached` after `limit` bytes.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    /// The configured size limit, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Reads the request head from the connection into `ctx.req`.
    ///
    /// Bytes received past the head are handed back to the context.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::ConnectionClosedByClient` if the peer closes before the blank
    /// line, `HttpError::MalformedRequestLine` or `HttpError::MalformedHeader` for bad
    /// input, and `HttpError::MaxLenReached` if the limit is exhausted.
    pub fn parse(&self, ctx: &mut Context) -> Result<(), HttpError> {
        let (stream, req) = ctx.parts();
        let leftover = match self.limit {
            Some(limit) => {
                let mut reader = LimitSizeReader::new(stream, limit);
                parse_head(&mut reader, req)?;
                reader.into_inner().into_parts().1
            }
            None => {
                let mut reader = Reader::new(stream);
                parse_head(&mut reader, req)?;
                reader.into_parts().1
            }
        };
        ctx.unread(leftover);
        Ok(())
    }
}

impl Handler for HeadParser {
    fn call(&self, ctx: &mut Context, next: Next<'_>) {
        match self.parse(ctx) {
            Ok(()) => next.run(ctx),
            Err(e) if e.category() == ErrorCategory::Peer => {
                debug!(cause = %e, "dropping connection");
            }
            Err(e) => warn!(cause = %e, "failed to parse request head"),
        }
    }
}

/// Parses the request line, then the header block.
///
/// # Errors
///
/// See [`HeadParser::parse`].
pub fn parse_head<B: BufferedRead + ?Sized>(reader: &mut B, req: &mut Request) -> Result<(), HttpError> {
    parse_request_line(reader, req)?;
    parse_headers(reader, req)
}

fn parse_request_line<B: BufferedRead + ?Sized>(reader: &mut B, req: &mut Request) -> Result<(), HttpError> {
    let mut raw = Vec::new();
    if reader.readline(&mut raw)? == 0 {
        return Err(HttpError::ConnectionClosedByClient);
    }

    let text = std::str::from_utf8(&raw).map_err(|_| HttpError::MalformedRequestLine)?;
    let line = text.strip_suffix('\n').unwrap_or(text);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(HttpError::MalformedRequestLine);
    };
    if method.is_empty() || target.is_empty() || version.is_empty() {
        return Err(HttpError::MalformedRequestLine);
    }

    req.method = (*method).to_string();
    req.set_target(*target);
    req.version = (*version).to_string();
    Ok(())
}

fn parse_headers<B: BufferedRead + ?Sized>(reader: &mut B, req: &mut Request) -> Result<(), HttpError> {
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.readline(&mut raw)? == 0 {
            return Err(HttpError::ConnectionClosedByClient);
        }
        if raw == b"\r\n" {
            return Ok(());
        }

        let line = std::str::from_utf8(&raw).map_err(|_| HttpError::MalformedHeader)?;
        let (name, value) = line.split_once(':').ok_or(HttpError::MalformedHeader)?;
        req.headers.insert(name, value.trim_matches(is_header_whitespace));
    }
}
