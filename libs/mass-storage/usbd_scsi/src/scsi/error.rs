use packing::Error as PackingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The op code is not one the responder answers. The transport stalls the data stage and
    /// reports a failed command status.
    UnhandledOpCode(u8),
    /// No command bytes were supplied
    EmptyCommand,
    /// A response could not be serialised into the data-in buffer
    PackingError,
}

impl From<PackingError> for Error {
    fn from(e: PackingError) -> Error {
        log::error!("packing response failed: {:?}", e);
        Error::PackingError
    }
}
