//! Invoker construction options (§4.4 "Options {port, protocol}").

use middleair_wire::Error;

/// Transport protocol requested for an invoker. Only TCP is implemented;
/// any other selection surfaces [`Error::MethodNotAllowed`] (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Unicast TCP — the only supported transport (§6 "Wire — data stream").
    Tcp,
}

/// Construction options for [`crate::invoker::Invoker`].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Port to listen on (shared process-wide, §4.4 point 1).
    pub port: u16,
    /// Requested transport.
    pub protocol: Protocol,
}

impl Options {
    /// Validate the requested protocol.
    pub fn validate(&self) -> Result<(), Error> {
        match self.protocol {
            Protocol::Tcp => Ok(()),
        }
    }
}
