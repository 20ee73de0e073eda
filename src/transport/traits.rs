use std::io;
use std::time::Duration;

/// Byte stream connecting the host to the device.
///
/// This trait abstracts the physical link so the session and the handshake
/// can run against a serial port, a socket bridge or a simulated device.
/// Implementations only move bytes; framing and retries live above.
pub trait Transport {
    /// Write bytes to the stream.
    ///
    /// Returns how many bytes the stream accepted, which may be fewer than
    /// `bytes.len()`.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout` for the first.
    ///
    /// Returns `Ok(0)` when nothing arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Number of received bytes buffered and not yet read. Never blocks.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Discard received bytes that have not been read.
    fn clear_input(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        (**self).read(buf, timeout)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        (**self).clear_input()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        (**self).read(buf, timeout)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        (**self).clear_input()
    }
}
