use std::io::Write;

use crate::{error::HttpError, io::BUFSIZE};

/// Buffered writer that coalesces small writes into full-buffer sends.
///
/// Nothing is sent implicitly on drop; callers have to [`Writer::flush`].
#[derive(Debug)]
pub struct Writer<W> {
    inner: W,
    buffer: Box<[u8]>,
    /// Number of bytes waiting in `buffer`.
    cnt: usize,
}

impl<W: Write> Writer<W> {
    /// Wraps `inner` with an empty buffer of [`BUFSIZE`] bytes.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: vec![0u8; BUFSIZE].into_boxed_slice(),
            cnt: 0,
        }
    }

    /// Number of bytes buffered but not yet sent.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.cnt
    }

    /// Buffers `buf`, flushing whenever the buffer fills up.
    ///
    /// A remainder that is at least as large as the whole buffer is sent directly.
    /// Returns the number of bytes accepted, which is always `buf.len()` on success.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if a send fails. The writer should not be used afterwards.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, HttpError> {
        let avail = self.buffer.len() - self.cnt;
        let (head, rest) = buf.split_at(buf.len().min(avail));

        self.buffer[self.cnt..self.cnt + head.len()].copy_from_slice(head);
        self.cnt += head.len();

        if self.cnt == self.buffer.len() {
            self.flush()?;
        }

        if !rest.is_empty() {
            if rest.len() >= self.buffer.len() {
                self.send(rest)?;
            } else {
                self.buffer[..rest.len()].copy_from_slice(rest);
                self.cnt = rest.len();
            }
        }

        Ok(buf.len())
    }

    /// Sends every buffered byte to the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` if the send fails; the buffered bytes are kept in that case.
    pub fn flush(&mut self) -> Result<(), HttpError> {
        let Self { inner, buffer, cnt } = self;
        send_all(inner, &buffer[..*cnt])?;
        *cnt = 0;
        inner.flush()?;
        Ok(())
    }

    /// Consumes the writer and returns the underlying stream. Unflushed bytes are discarded.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn send(&mut self, buf: &[u8]) -> Result<(), HttpError> {
        send_all(&mut self.inner, buf)
    }
}

/// `write_all` retries interrupted sends and turns a zero-length send into `WriteZero`.
fn send_all<W: Write>(inner: &mut W, buf: &[u8]) -> Result<(), HttpError> {
    inner.write_all(buf).map_err(HttpError::Io)
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::{
        error::HttpError,
        io::{BUFSIZE, Writer},
    };

    /// Records every underlying write call separately.
    #[derive(Default)]
    struct RecordingWriter {
        calls: Vec<Vec<u8>>,
    }

    impl io::Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ClosedWriter;

    impl io::Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn small_writes_are_coalesced_until_flush() {
        let mut writer = Writer::new(RecordingWriter::default());

        writer.write(b"HTTP/1.0 ").unwrap();
        writer.write(b"200 OK \r\n").unwrap();
        assert_eq!(writer.pending(), 18);

        writer.flush().unwrap();
        let inner = writer.into_inner();

        assert_eq!(inner.calls, vec![b"HTTP/1.0 200 OK \r\n".to_vec()]);
    }

    #[test]
    fn full_buffer_is_flushed_and_remainder_kept() {
        let mut writer = Writer::new(RecordingWriter::default());
        let data = vec![b'a'; BUFSIZE + 10];

        assert_eq!(writer.write(&data).unwrap(), BUFSIZE + 10);
        assert_eq!(writer.pending(), 10);

        writer.flush().unwrap();
        let inner = writer.into_inner();

        assert_eq!(inner.calls.len(), 2);
        assert_eq!(inner.calls[0].len(), BUFSIZE);
        assert_eq!(inner.calls[1].len(), 10);
    }

    #[test]
    fn large_remainder_bypasses_buffer() {
        let mut writer = Writer::new(RecordingWriter::default());
        writer.write(b"head").unwrap();

        let big = vec![b'b'; BUFSIZE * 2];
        writer.write(&big).unwrap();

        assert_eq!(writer.pending(), 0);
        let inner = writer.into_inner();
        assert_eq!(inner.calls.len(), 2);
        assert_eq!(inner.calls[0].len(), BUFSIZE);
        assert_eq!(inner.calls[1].len(), BUFSIZE + 4);
    }

    #[test]
    fn flush_of_empty_buffer_sends_nothing() {
        let mut writer = Writer::new(RecordingWriter::default());

        writer.flush().unwrap();

        assert!(writer.into_inner().calls.is_empty());
    }

    #[test]
    fn send_failure_is_propagated() {
        let mut writer = Writer::new(ClosedWriter);
        writer.write(b"data").unwrap();

        let result = writer.flush();

        assert!(matches!(result, Err(HttpError::Io(ref e)) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(writer.pending(), 4);
    }
}
