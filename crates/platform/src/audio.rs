//! HDMI audio parameters
//!
//! What the audio codec glue asks the transmitter to carry. Values are
//! validated once at construction so the driver's fast path only ever sees
//! rates, widths and channel counts the link can actually carry.

/// HDMI audio sample rates (IEC 60958 rates usable over TMDS).
pub const SUPPORTED_RATES_HZ: [u32; 7] = [
    32_000, 44_100, 48_000, 88_200, 96_000, 176_400, 192_000,
];

/// Why a parameter set was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioParamError {
    /// Sample rate not in [`SUPPORTED_RATES_HZ`].
    SampleRate(u32),
    /// Sample width not 16, 20 or 24 bits.
    SampleWidth(u8),
    /// Channel count outside 1..=8.
    Channels(u8),
}

#[cfg(feature = "std")]
impl std::error::Error for AudioParamError {}

impl core::fmt::Display for AudioParamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SampleRate(hz) => write!(f, "unsupported audio sample rate {hz} Hz"),
            Self::SampleWidth(bits) => write!(f, "unsupported audio sample width {bits} bits"),
            Self::Channels(n) => write!(f, "unsupported audio channel count {n}"),
        }
    }
}

/// Validated audio stream parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioParams {
    sample_rate_hz: u32,
    sample_width: u8,
    channels: u8,
    non_pcm: bool,
}

impl AudioParams {
    /// Validate and build a parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`AudioParamError`] naming the first field out of range.
    pub fn new(
        sample_rate_hz: u32,
        sample_width: u8,
        channels: u8,
        non_pcm: bool,
    ) -> Result<Self, AudioParamError> {
        if !SUPPORTED_RATES_HZ.contains(&sample_rate_hz) {
            return Err(AudioParamError::SampleRate(sample_rate_hz));
        }
        if !matches!(sample_width, 16 | 20 | 24) {
            return Err(AudioParamError::SampleWidth(sample_width));
        }
        if !(1..=8).contains(&channels) {
            return Err(AudioParamError::Channels(channels));
        }
        Ok(Self {
            sample_rate_hz,
            sample_width,
            channels,
            non_pcm,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Bits per sample.
    pub fn sample_width(&self) -> u8 {
        self.sample_width
    }

    /// Channel count.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Compressed (IEC 61937) stream.
    pub fn is_non_pcm(&self) -> bool {
        self.non_pcm
    }
}

impl Default for AudioParams {
    /// 48 kHz, 16-bit stereo PCM.
    fn default() -> Self {
        Self {
            sample_rate_hz: 48_000,
            sample_width: 16,
            channels: 2,
            non_pcm: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_supported_rate() {
        for rate in SUPPORTED_RATES_HZ {
            assert!(AudioParams::new(rate, 24, 2, false).is_ok(), "{rate}");
        }
    }

    #[test]
    fn rejects_odd_rate() {
        assert_eq!(
            AudioParams::new(22_050, 16, 2, false),
            Err(AudioParamError::SampleRate(22_050))
        );
    }

    #[test]
    fn rejects_width_and_channels() {
        assert_eq!(
            AudioParams::new(48_000, 32, 2, false),
            Err(AudioParamError::SampleWidth(32))
        );
        assert_eq!(
            AudioParams::new(48_000, 16, 0, false),
            Err(AudioParamError::Channels(0))
        );
        assert_eq!(
            AudioParams::new(48_000, 16, 9, true),
            Err(AudioParamError::Channels(9))
        );
    }
}
