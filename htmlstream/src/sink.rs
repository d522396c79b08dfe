//! Byte sinks.
//!
//! The writer targets [`fmt::Write`]; [`IoSink`] lets it write to anything
//! implementing [`io::Write`] (files, sockets, stdout).

use std::fmt;
use std::io;

/// Adapts an [`io::Write`] into a [`fmt::Write`] sink.
///
/// `fmt::Error` carries no detail, so the I/O error behind a
/// [`WriteError::SinkWriteFailure`](crate::WriteError::SinkWriteFailure) is
/// kept here for [`take_error`](Self::take_error).
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// The I/O error that made the last write fail, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> fmt::Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_bytes() {
        let mut sink = IoSink::new(Vec::new());
        sink.write_str("<p>ok</p>").unwrap();
        assert_eq!(sink.into_inner(), b"<p>ok</p>");
    }

    #[test]
    fn test_keeps_io_error() {
        let mut sink = IoSink::new(Broken);
        assert!(sink.write_str("x").is_err());
        let err = sink.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(sink.take_error().is_none());
    }
}
