use core::fmt;

use super::Message;

/// Local errors, returned by the kernel as negative message words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    InvalidHandle,
    WouldBlock,
    NoSuchDestination,
    InvalidArgument,
    OutOfMemory,
    NotSupported,

    /// Negative word outside of the known range, kept as returned
    Unknown(isize),
}

impl Error {
    /// Decode a negative return word. Non-negative words are messages, not errors.
    pub const fn from_raw(value: isize) -> Option<Self> {
        match value {
            value if value >= 0 => None,
            -1 => Some(Self::InvalidHandle),
            -2 => Some(Self::WouldBlock),
            -3 => Some(Self::NoSuchDestination),
            -4 => Some(Self::InvalidArgument),
            -5 => Some(Self::OutOfMemory),
            -6 => Some(Self::NotSupported),
            raw => Some(Self::Unknown(raw)),
        }
    }

    /// Raw word for this error, as the kernel would return it
    pub const fn as_raw(self) -> isize {
        match self {
            Self::InvalidHandle => -1,
            Self::WouldBlock => -2,
            Self::NoSuchDestination => -3,
            Self::InvalidArgument => -4,
            Self::OutOfMemory => -5,
            Self::NotSupported => -6,
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHandle => write!(f, "InvalidHandle"),
            Error::WouldBlock => write!(f, "WouldBlock"),
            Error::NoSuchDestination => write!(f, "NoSuchDestination"),
            Error::InvalidArgument => write!(f, "InvalidArgument"),
            Error::OutOfMemory => write!(f, "OutOfMemory"),
            Error::NotSupported => write!(f, "NotSupported"),
            Error::Unknown(raw) => write!(f, "Unknown({})", raw),
        }
    }
}

impl core::error::Error for Error {}

pub type SyscallResult<T> = Result<T, Error>;

/// Split a raw return word into a message or a local error
pub const fn sysret_to_result(sysret: isize) -> SyscallResult<Message> {
    match Error::from_raw(sysret) {
        None => Ok(Message::from_raw(sysret)),
        Some(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageKind;

    #[test]
    fn negative_words_are_errors() {
        assert_eq!(sysret_to_result(-1), Err(Error::InvalidHandle));
        assert_eq!(sysret_to_result(-6), Err(Error::NotSupported));
        assert_eq!(sysret_to_result(-1000), Err(Error::Unknown(-1000)));
        assert_eq!(sysret_to_result(isize::MIN), Err(Error::Unknown(isize::MIN)));
    }

    #[test]
    fn non_negative_words_are_messages() {
        let msg = sysret_to_result(0x111).unwrap();
        assert_eq!(msg.code(), 0x11);
        assert_eq!(msg.kind(), MessageKind::Call);

        assert_eq!(sysret_to_result(0), Ok(Message::from_raw(0)));
    }

    #[test]
    fn raw_codes_round_trip() {
        for err in [
            Error::InvalidHandle,
            Error::WouldBlock,
            Error::NoSuchDestination,
            Error::InvalidArgument,
            Error::OutOfMemory,
            Error::NotSupported,
            Error::Unknown(-42),
        ] {
            assert_eq!(Error::from_raw(err.as_raw()), Some(err));
        }
    }

    #[test]
    fn unknown_code_is_preserved() {
        let err = Error::from_raw(-42).unwrap();
        assert_eq!(err, Error::Unknown(-42));
        assert_eq!(err.as_raw(), -42);
    }
}
