use tracing::{debug, warn};

use crate::{
    error::{ErrorCategory, HttpError},
    http::{Context, context::into_unread},
    io::BufferedRead,
    runtime::{handler::Handler, task::Next},
};

/// Reads a `Content-Length` delimited body into `ctx.req.content`.
///
/// Requests without `Content-Length` continue with an empty body. Any failure stops
/// the chain without writing a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyParser {
    max: usize,
}

impl BodyParser {
    /// Accepts bodies of at most `max` bytes.
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { max }
    }

    /// Reads the body announced by the request headers.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidContentLength` if the header is not a number,
    /// `HttpError::BodyTooLarge` if it exceeds the maximum and
    /// `HttpError::ConnectionClosedByClient` if the body ends early.
    pub fn read_body(&self, ctx: &mut Context) -> Result<(), HttpError> {
        let Some(raw) = ctx.req.headers.get("Content-Length") else {
            return Ok(());
        };
        let size: usize = raw
            .parse()
            .map_err(|e| HttpError::InvalidContentLength(format!("{raw:?}: {e}")))?;
        if size > self.max {
            return Err(HttpError::BodyTooLarge { size, max: self.max });
        }

        let mut content = vec![0u8; size];
        let mut reader = ctx.body_reader();
        let read = reader.readn(&mut content);
        let leftover = into_unread(reader);
        ctx.unread(leftover);

        if read? < size {
            return Err(HttpError::ConnectionClosedByClient);
        }
        ctx.req.set_content(content);
        Ok(())
    }
}

impl Handler for BodyParser {
    fn call(&self, ctx: &mut Context, next: Next<'_>) {
        match self.read_body(ctx) {
            Ok(()) => next.run(ctx),
            Err(e) if e.category() == ErrorCategory::Peer => {
                debug!(cause = %e, "client went away while sending the body");
            }
            Err(e) => warn!(cause = %e, "failed to read request body"),
        }
    }
}
