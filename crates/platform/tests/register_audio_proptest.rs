//! Property-based tests for the register helpers and audio parameter
//! validation.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use platform::audio::SUPPORTED_RATES_HZ;
use platform::{AudioParamError, AudioParams, Mmio, RegisterSpace};

proptest::proptest! {
    /// modify() leaves bits outside the mask alone and takes masked bits from value.
    #[test]
    fn modify_is_masked_merge(initial: u32, mask: u32, value: u32) {
        let mut backing = [initial; 2];
        let mmio = unsafe { Mmio::new(backing.as_mut_ptr(), 0x4) }.unwrap();

        mmio.modify(0x4, mask, value);

        let got = mmio.read(0x4);
        assert_eq!(got & !mask, initial & !mask);
        assert_eq!(got & mask, value & mask);
        // neighbour untouched
        assert_eq!(mmio.read(0x0), initial);
    }

    /// Accesses past the window never reach memory.
    #[test]
    fn out_of_window_access_is_inert(offset in 0x8u32..0x1_0000, value: u32) {
        let mut backing = [0u32; 2];
        let mmio = unsafe { Mmio::new(backing.as_mut_ptr(), 0x4) }.unwrap();

        mmio.write(offset, value);

        assert_eq!(mmio.read(offset), 0);
        assert_eq!(mmio.read(0x0), 0);
        assert_eq!(mmio.read(0x4), 0);
    }

    /// Every supported rate/width/channel combination validates and reads back.
    #[test]
    fn valid_params_round_trip(
        rate_idx in 0usize..SUPPORTED_RATES_HZ.len(),
        width in proptest::sample::select(vec![16u8, 20, 24]),
        channels in 1u8..=8,
        non_pcm: bool,
    ) {
        let rate = SUPPORTED_RATES_HZ[rate_idx];
        let params = AudioParams::new(rate, width, channels, non_pcm).unwrap();
        assert_eq!(params.sample_rate_hz(), rate);
        assert_eq!(params.sample_width(), width);
        assert_eq!(params.channels(), channels);
        assert_eq!(params.is_non_pcm(), non_pcm);
    }

    /// Unknown rates are rejected with the offending value.
    #[test]
    fn unknown_rates_rejected(rate: u32) {
        proptest::prop_assume!(!SUPPORTED_RATES_HZ.contains(&rate));
        assert_eq!(
            AudioParams::new(rate, 16, 2, false),
            Err(AudioParamError::SampleRate(rate))
        );
    }

    /// Channel counts above eight are rejected.
    #[test]
    fn too_many_channels_rejected(channels in 9u8..) {
        assert_eq!(
            AudioParams::new(48_000, 16, channels, false),
            Err(AudioParamError::Channels(channels))
        );
    }
}
