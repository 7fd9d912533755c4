use thiserror::Error;

/// A packet error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A packet error.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum Error {
    /// The buffer is smaller than the minimum size of the packet type.
    #[error("insufficient buffer for {0} packet, minimum={1}, provided={2}")]
    InsufficientPacketBuffer(String, usize, usize),
}

impl Error {
    pub(crate) fn insufficient(name: &str, minimum: usize, provided: usize) -> Self {
        Self::InsufficientPacketBuffer(String::from(name), minimum, provided)
    }
}
