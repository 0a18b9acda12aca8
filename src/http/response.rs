use std::{fmt, io::Write};

use crate::{error::HttpError, http::headers::Headers, io::Writer};

/// Representation of a HTTP response with status, headers and payload.
///
/// A response without headers is never sent: the connection is closed without
/// writing a single byte. Handlers that want to answer must set at least one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Status code and reason, e.g. `200 OK`.
    pub status: String,
    /// The response headers.
    pub headers: Headers,
    /// The response payload.
    pub content: Vec<u8>,
}

/// Status codes the server and the bundled handlers use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCode {
    /// 200
    Ok = 200,
    /// 201
    Created = 201,
    /// 204
    NoContent = 204,
    /// 400
    BadRequest = 400,
    /// 404
    NotFound = 404,
    /// 413
    PayloadTooLarge = 413,
    /// 500
    InternalServerError = 500,
}

impl StatusCode {
    /// Numeric value of the status code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Creates the reason phrase of the status code.
    #[must_use]
    pub const fn reason_phrase(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// Formats the status as `<code> <reason>`, the form the status line expects.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

impl From<StatusCode> for String {
    fn from(status: StatusCode) -> Self {
        status.to_string()
    }
}

impl Response {
    /// Builds a `text/plain` response.
    #[must_use]
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::with_type(status, "text/plain", body)
    }

    /// Builds a `text/html` response.
    #[must_use]
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self::with_type(status, "text/html", body)
    }

    fn with_type(status: StatusCode, content_type: &str, body: &str) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type", content_type);
        Self {
            status: status.into(),
            headers,
            content: body.as_bytes().to_vec(),
        }
    }

    /// Replaces the status, e.g. `"200 OK"` or `StatusCode::Ok`.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Sets a header, replacing any previous value of the same name.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key, value);
    }

    /// Replaces the response payload.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    /// Serializes the response into `writer` and flushes it.
    ///
    /// Writes nothing if no header was set. A non-empty payload gets a `Content-Length`
    /// header, replacing any value a handler set.
    ///
    /// The status line carries no separate reason phrase: it is `HTTP/1.0 <status> \r\n`.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` on the first failed send; nothing further is written.
    pub fn write_to<W: Write>(&mut self, writer: &mut Writer<W>) -> Result<(), HttpError> {
        if self.headers.is_empty() {
            return Ok(());
        }

        writer.write(format!("HTTP/1.0 {} \r\n", self.status).as_bytes())?;

        if !self.content.is_empty() {
            self.headers
                .insert("Content-Length", self.content.len().to_string());
        }
        for (key, value) in self.headers.iter() {
            writer.write(format!("{key}:{value}\r\n").as_bytes())?;
        }

        writer.write(b"\r\n")?;

        if !self.content.is_empty() {
            writer.write(&self.content)?;
        }

        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::{
        error::HttpError,
        http::response::{Response, StatusCode},
        io::Writer,
    };

    fn serialize(response: &mut Response) -> String {
        let mut writer = Writer::new(Vec::new());
        response.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn serializes_status_headers_and_payload() {
        let mut response = Response::default();
        response.set_status("200 OK");
        response.set_header("X", "1");
        response.set_content("abc");

        assert_eq!(
            serialize(&mut response),
            "HTTP/1.0 200 OK \r\nContent-Length:3\r\nX:1\r\n\r\nabc"
        );
    }

    #[test]
    fn empty_headers_write_nothing() {
        let mut response = Response::default();
        response.set_status("200 OK");
        response.set_content("payload that is never sent");

        assert_eq!(serialize(&mut response), "");
        assert!(response.headers.is_empty());
    }

    #[test]
    fn empty_payload_gets_no_content_length() {
        let mut response = Response::default();
        response.set_status(StatusCode::NoContent);
        response.set_header("X-Trace", "abc");

        assert_eq!(serialize(&mut response), "HTTP/1.0 204 No Content \r\nX-Trace:abc\r\n\r\n");
    }

    #[test]
    fn content_length_overrides_handler_value() {
        let mut response = Response::text(StatusCode::Ok, "hello");
        response.set_header("content-length", "999");

        assert_eq!(
            serialize(&mut response),
            "HTTP/1.0 200 OK \r\nContent-Length:5\r\nContent-Type:text/plain\r\n\r\nhello"
        );
    }

    #[test]
    fn status_code_display_includes_reason() {
        let valid_codes = [
            (StatusCode::Ok, "200 OK"),
            (StatusCode::Created, "201 Created"),
            (StatusCode::BadRequest, "400 Bad Request"),
            (StatusCode::NotFound, "404 Not Found"),
            (StatusCode::PayloadTooLarge, "413 Payload Too Large"),
            (StatusCode::InternalServerError, "500 Internal Server Error"),
        ];

        for (code, expected) in valid_codes {
            assert_eq!(code.to_string(), expected);
        }
    }

    #[test]
    fn html_helper_sets_content_type() {
        let response = Response::html(StatusCode::NotFound, "<h1>gone</h1>");

        assert_eq!(response.status, "404 Not Found");
        assert_eq!(response.headers.get("content-type"), Some("text/html"));
        assert_eq!(response.content, b"<h1>gone</h1>");
    }

    #[test]
    fn write_failure_aborts_serialization() {
        struct Closed;
        impl io::Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut response = Response::text(StatusCode::Ok, "hi");
        let mut writer = Writer::new(Closed);

        assert!(matches!(response.write_to(&mut writer), Err(HttpError::Io(_))));
    }
}
