mod session;
mod traits;

#[cfg(feature = "serial")]
mod serial;

#[cfg(test)]
pub(crate) mod sim;

pub use session::TransportSession;
pub use traits::Transport;

#[cfg(feature = "serial")]
pub use serial::{available_ports, SerialTransport};
