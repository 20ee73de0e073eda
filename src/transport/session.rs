use std::time::{Duration, Instant};

use log::trace;

use crate::error::LinkError;
use crate::transport::traits::Transport;

/// Exclusive owner of a [`Transport`] with the byte-level operations the
/// protocol needs.
///
/// Every operation takes `&mut self`; one frame is outstanding at a time.
/// Dropping the session drops the transport, which releases the port.
pub struct TransportSession<T> {
    transport: T,
    read_timeout: Duration,
}

impl<T: Transport> TransportSession<T> {
    /// Wrap a connected transport. `read_timeout` is the default wait for
    /// [`read_byte`](Self::read_byte) and
    /// [`read_latest_discarding_rest`](Self::read_latest_discarding_rest).
    pub fn new(transport: T, read_timeout: Duration) -> Self {
        Self {
            transport,
            read_timeout,
        }
    }

    #[inline]
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Write bytes and report how many the stream accepted.
    ///
    /// A count below `bytes.len()` is not an error here; callers decide.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, LinkError> {
        let written = self.transport.write(bytes)?;
        trace!("tx {:02X?}", &bytes[..written.min(bytes.len())]);
        Ok(written)
    }

    /// Read into `buf` until it is full or `timeout` elapses.
    ///
    /// Returns the number of bytes read, which is short on timeout.
    pub fn read_exactly(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, LinkError> {
        let deadline = Instant::now() + timeout;
        let mut filled = 0;

        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let n = self.transport.read(&mut buf[filled..], remaining)?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        trace!("rx {:02X?}", &buf[..filled]);
        Ok(filled)
    }

    /// Fill `buf` completely or fail with a timeout or short-read error.
    pub fn expect_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), LinkError> {
        match self.read_exactly(buf, timeout)? {
            0 if !buf.is_empty() => Err(LinkError::Timeout(timeout)),
            n if n < buf.len() => Err(LinkError::ShortRead {
                expected: buf.len(),
                received: n,
            }),
            _ => Ok(()),
        }
    }

    /// Read one byte with the default timeout. `None` on timeout.
    pub fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        let mut byte = [0u8; 1];
        let n = self.read_exactly(&mut byte, self.read_timeout)?;
        Ok((n == 1).then_some(byte[0]))
    }

    /// Drain everything buffered and return the most recent byte.
    ///
    /// If nothing is buffered, waits (up to the default timeout) for exactly
    /// one byte. `None` if nothing arrived.
    pub fn read_latest_discarding_rest(&mut self) -> Result<Option<u8>, LinkError> {
        let mut remaining = self.transport.bytes_available()?.max(1);
        let mut chunk = [0u8; 64];
        let mut latest = None;

        while remaining > 0 {
            let want = remaining.min(chunk.len());
            let got = self.read_exactly(&mut chunk[..want], self.read_timeout)?;
            if got == 0 {
                break;
            }
            latest = Some(chunk[got - 1]);
            remaining -= got;
            if got < want {
                break;
            }
        }

        Ok(latest)
    }

    /// Discard buffered unread bytes.
    pub fn reset_input_buffer(&mut self) -> Result<(), LinkError> {
        self.transport.clear_input()?;
        Ok(())
    }

    /// Buffered byte count, for polling loops.
    pub fn bytes_available(&mut self) -> Result<usize, LinkError> {
        Ok(self.transport.bytes_available()?)
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
