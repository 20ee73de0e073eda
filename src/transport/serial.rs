use std::io::{self, Read, Write};
use std::time::Duration;

use log::{debug, info};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::transport::traits::Transport;

/// Serial-port transport.
///
/// The port is opened 8N1 without flow control and is closed when the
/// transport is dropped.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialTransport {
    /// Open `path` at the configured baud rate.
    pub fn open(path: &str, config: &LinkConfig) -> Result<Self, LinkError> {
        config.validate()?;

        let port = serialport::new(path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| LinkError::Open {
                port: path.to_owned(),
                source: e.into(),
            })?;

        info!("opened {} at {} baud", path, config.baud_rate);
        Ok(Self {
            port,
            timeout: config.read_timeout,
        })
    }

    /// Name of the underlying port, if the OS reports one.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        if timeout != self.timeout {
            self.port.set_timeout(timeout)?;
            self.timeout = timeout;
        }
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let written = match self.port.write(bytes) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(e),
        };
        self.port.flush()?;
        Ok(written)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.set_timeout(timeout)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        let count = self.port.bytes_to_read()?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> Result<Vec<String>, LinkError> {
    let ports = serialport::available_ports().map_err(io::Error::from)?;
    debug!("found {} serial port(s)", ports.len());
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
