//! Transmitter error type

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use platform::ResourceKind;

/// Errors reported by the transmitter core.
///
/// Only [`HdmiError::Timeout`] is worth retrying; the caller decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HdmiError {
    /// Request rejected before touching hardware (zero-length message,
    /// DDC/CI address, too many messages).
    Unsupported,
    /// No DDC completion within the per-byte timeout. The I2C master has
    /// been soft-reset.
    Timeout,
    /// The sink did not acknowledge a DDC byte.
    Nack,
    /// PHY initialisation failed; the output stays as it was.
    PhyInit,
    /// No usable PHY.
    NoDevice,
    /// A platform resource could not be acquired during bind.
    Resource(ResourceKind),
}

impl HdmiError {
    /// True if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HdmiError {}

impl core::fmt::Display for HdmiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "unsupported DDC transfer"),
            Self::Timeout => write!(f, "DDC transfer timed out"),
            Self::Nack => write!(f, "DDC transfer not acknowledged"),
            Self::PhyInit => write!(f, "PHY initialisation failed"),
            Self::NoDevice => write!(f, "no vendor PHY available"),
            Self::Resource(kind) => write!(f, "failed to acquire {kind}"),
        }
    }
}

impl embedded_hal::i2c::Error for HdmiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn only_timeout_is_retryable() {
        assert!(HdmiError::Timeout.is_retryable());
        for err in [
            HdmiError::Unsupported,
            HdmiError::Nack,
            HdmiError::PhyInit,
            HdmiError::NoDevice,
            HdmiError::Resource(ResourceKind::Irq),
        ] {
            assert!(!err.is_retryable(), "{err}");
        }
    }

    #[test]
    fn nack_maps_to_i2c_no_acknowledge() {
        assert_eq!(
            HdmiError::Nack.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
        );
        assert_eq!(HdmiError::Timeout.kind(), ErrorKind::Other);
    }

    #[test]
    fn display_names_resource() {
        let msg = format!("{}", HdmiError::Resource(ResourceKind::DdcAdapter));
        assert_eq!(msg, "failed to acquire DDC adapter");
    }
}
