use crate::controller::status;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("start condition failed (controller status {0:#04x})")]
    Start(u8),

    #[error("no acknowledgement of the address byte (controller status {0:#04x})")]
    AddressNack(u8),

    #[error("no acknowledgement of a data byte (controller status {0:#04x})")]
    DataNack(u8),

    #[error("bus controller did not complete the phase in time")]
    Timeout,

    #[error("unexpected chip id {found:#04x} (expected {expected:#04x})")]
    UnexpectedDevice { expected: u8, found: u8 },

    #[error("cannot derive a {scl_hz} Hz bus clock from a {cpu_hz} Hz controller clock")]
    InvalidBitRate { cpu_hz: u32, scl_hz: u32 },

    #[error("operation not supported by the bus master")]
    Unsupported,

    #[error("I/O error: {0}")]
    Io(std::io::ErrorKind),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        use std::io::ErrorKind;
        match value {
            Error::Start(_) => ErrorKind::ResourceBusy.into(),
            Error::AddressNack(_) => ErrorKind::NotConnected.into(),
            Error::DataNack(_) => ErrorKind::BrokenPipe.into(),
            Error::Timeout => ErrorKind::TimedOut.into(),
            Error::UnexpectedDevice { .. } => ErrorKind::InvalidData.into(),
            Error::InvalidBitRate { .. } => ErrorKind::InvalidInput.into(),
            Error::Unsupported => ErrorKind::Unsupported.into(),
            Error::Io(kind) => kind.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        use std::io::ErrorKind;
        // the controller status is lost in the io::Error, so the canonical code is substituted
        match value.kind() {
            ErrorKind::ResourceBusy => Error::Start(status::ARB_LOST),
            ErrorKind::NotConnected => Error::AddressNack(status::MT_SLA_NACK),
            ErrorKind::BrokenPipe => Error::DataNack(status::MT_DATA_NACK),
            ErrorKind::TimedOut => Error::Timeout,
            ErrorKind::Unsupported => Error::Unsupported,
            kind => Error::Io(kind),
        }
    }
}
