//! Host-side driver for a serial controller-emulator link.
//!
//! The device sits on a serial line and replays controller reports to a
//! console. This crate keeps the line aligned and delivers commands:
//!
//! - **Transport**: [`Transport`] abstracts the byte stream,
//!   [`TransportSession`] adds timed reads and buffer control
//! - **Handshake**: [`Synchronizer`] runs the flush/sync-1/sync-2 exchange
//! - **Driver**: [`ProtocolDriver`] frames commands, checks acks and
//!   recovers with one resync and retry
//! - **Stats**: [`LinkStats`] counters and a filtered error rate
//!
//! Encoding and framing come from [`pad_proto`], re-exported here.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "serial")]
//! # fn main() -> Result<(), pad_link::LinkError> {
//! use pad_link::{LinkConfig, LogicalCommand, ProtocolDriver};
//!
//! let config = LinkConfig::default();
//! let mut driver = ProtocolDriver::open_serial("/dev/ttyUSB0", &config)?;
//! driver.synchronize()?;
//! driver.send_command(LogicalCommand::A | LogicalCommand::LSTICK_UP)?;
//! driver.send_command(LogicalCommand::NEUTRAL)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "serial"))]
//! # fn main() {}
//! ```
//!
//! # Logging
//!
//! Uses the [`log`] facade: byte dumps at `trace`, handshake steps at
//! `debug`, failed exchanges at `warn`, failed handshakes at `error`. No
//! logger is installed by this crate.
//!
//! # Features
//!
//! - **`serial`**: [`SerialTransport`](transport::SerialTransport) over the
//!   `serialport` crate
//! - **`serde`**: Serialize/Deserialize for [`LinkConfig`]

pub mod config;
pub mod driver;
pub mod error;
pub mod stats;
pub mod sync;
pub mod transport;

pub use config::{ConfigError, LinkConfig};
pub use driver::ProtocolDriver;
pub use error::LinkError;
pub use stats::{LatencyError, LatencyReport, LinkStats};
pub use sync::{SyncError, SyncState, Synchronizer};
pub use transport::{Transport, TransportSession};

pub use pad_proto;
pub use pad_proto::{Buttons, CommandBuilder, Dpad, LogicalCommand, ReportPacket, StickVector};
