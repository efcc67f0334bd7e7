//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations:
//! - TCP socket
//! - Unix domain socket (the local keybase service socket)
//! - any `Read + Write` pair via [`StreamTransport`]
//!
//! `Server` and `Connection` are generic over `Transport`, so adding a
//! new transport requires zero changes to the RPC logic.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Byte-oriented transport channel.
pub trait Transport: Send {
    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 when the peer has closed the channel.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data` to the transport.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Bound how long a single `read` may block. Transports that cannot
    /// time out ignore this.
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

/// A null transport that discards all writes and reads end-of-stream.
/// Useful as a default when no peer is connected.
pub struct NullTransport;

impl Transport for NullTransport {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn write_all(&mut self, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapter for any blocking `Read + Write` stream.
pub struct StreamTransport<S> {
    inner: S,
}

impl<S: Read + Write + Send> StreamTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read + Write + Send> Transport for StreamTransport<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Transport for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(self, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

#[cfg(unix)]
impl Transport for std::os::unix::net::UnixStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(self, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        std::os::unix::net::UnixStream::set_read_timeout(self, timeout)
    }
}

/// True for the error kinds a read timeout surfaces as.
pub fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn null_transport_is_closed() {
        let mut t = NullTransport;
        let mut buf = [0u8; 8];
        assert_eq!(t.read(&mut buf).unwrap(), 0);
        assert!(t.write_all(b"dropped").is_ok());
    }

    #[test]
    fn stream_transport_passthrough() {
        let mut t = StreamTransport::new(Cursor::new(b"abc".to_vec()));
        let mut buf = [0u8; 2];
        assert_eq!(t.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf, b"ab");
        t.write_all(b"Z").unwrap();
        assert_eq!(t.into_inner().into_inner(), b"abZ");
    }

    #[test]
    fn timeout_kinds() {
        assert!(is_timeout(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_timeout(&io::Error::from(io::ErrorKind::BrokenPipe)));
    }
}
