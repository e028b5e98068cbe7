//! Property-based tests for infoframe packing and the power decision table.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use dw_hdmi_qp::infoframe::{pack_le32, AviInfoframe, DrmInfoframe};
use dw_hdmi_qp::power::{effective_force, power_action, PowerAction};
use platform::{Chromaticity, ConnectorForce, Eotf, HdrOutputMetadata};
use proptest::prelude::*;

fn any_force() -> impl Strategy<Value = ConnectorForce> {
    prop_oneof![
        Just(ConnectorForce::Unspecified),
        Just(ConnectorForce::Off),
        Just(ConnectorForce::On),
        Just(ConnectorForce::OnDigital),
    ]
}

fn any_eotf() -> impl Strategy<Value = Eotf> {
    prop_oneof![
        Just(Eotf::TraditionalGammaSdr),
        Just(Eotf::TraditionalGammaHdr),
        Just(Eotf::SmpteSt2084),
        Just(Eotf::Hlg),
    ]
}

fn byte_sum(buf: &[u8]) -> u8 {
    buf.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

proptest! {
    /// AVI frames always checksum to zero, before and after the VIC rewrite.
    #[test]
    fn avi_checksum_sums_to_zero(
        vic: u8,
        top in any::<u16>(),
        right in any::<u16>(),
        repeat in 0u8..16,
        itc: bool,
    ) {
        let mut frame = AviInfoframe::new();
        frame.video_code = vic;
        frame.top_bar = top;
        frame.right_bar = right;
        frame.pixel_repeat = repeat;
        frame.itc = itc;

        prop_assert_eq!(byte_sum(&frame.pack()), 0);
        prop_assert_eq!(byte_sum(&frame.pack_for_controller()), 0);
    }

    /// Controller packing carries the full VIC in PB4 only from 128 up,
    /// and bumps the version with it.
    #[test]
    fn avi_controller_vic_rewrite(vic: u8) {
        let mut frame = AviInfoframe::new();
        frame.video_code = vic;
        let buf = frame.pack_for_controller();

        if vic >= 128 {
            prop_assert_eq!(frame.version, 3);
            prop_assert_eq!(buf[1], 3);
            prop_assert_eq!(buf[7], vic);
        } else {
            prop_assert_eq!(frame.version, 2);
            prop_assert_eq!(buf[7], vic);
        }
    }

    /// DRM frames checksum to zero and carry the EOTF in PB1.
    #[test]
    fn drm_checksum_and_eotf(
        eotf in any_eotf(),
        x: u16,
        y: u16,
        max_cll: u16,
        max_fall: u16,
    ) {
        let meta = HdrOutputMetadata {
            eotf,
            white_point: Chromaticity { x, y },
            max_cll,
            max_fall,
            ..HdrOutputMetadata::default()
        };
        let buf = DrmInfoframe::from_metadata(&meta).pack();

        prop_assert_eq!(byte_sum(&buf), 0);
        prop_assert_eq!(buf[4], eotf as u8);
        prop_assert_eq!(&buf[26..28], &max_cll.to_le_bytes()[..]);
        prop_assert_eq!(&buf[28..30], &max_fall.to_le_bytes()[..]);
    }

    /// Word packing preserves every byte, little-endian, zero padded.
    #[test]
    fn pack_le32_preserves_bytes(
        bytes in proptest::collection::vec(any::<u8>(), 0..40),
        start in 0usize..8,
        count in 0usize..32,
    ) {
        let words = pack_le32(&bytes, start, count);
        prop_assert_eq!(words.len(), count.div_ceil(4));

        for i in 0..count {
            let expect = bytes.get(start + i).copied().unwrap_or(0);
            let got = (words[i / 4] >> ((i % 4) * 8)) as u8;
            prop_assert_eq!(got, expect);
        }
        // padding above the last byte is zero
        if count % 4 != 0 {
            let last = words[words.len() - 1];
            prop_assert_eq!(last >> ((count % 4) * 8), 0);
        }
    }

    /// A disabled bridge never powers on; only an effective Off powers down.
    #[test]
    fn power_decisions(disabled: bool, force in any_force(), rxsense: bool, on: bool) {
        let effective = effective_force(disabled, force, rxsense);
        let action = power_action(effective, on);

        if disabled {
            prop_assert_eq!(effective, ConnectorForce::Off);
        }
        match action {
            PowerAction::PowerOn => {
                prop_assert!(!disabled);
                prop_assert!(!on);
                prop_assert_ne!(effective, ConnectorForce::Off);
            }
            PowerAction::PowerOff => {
                prop_assert!(on);
                prop_assert_eq!(effective, ConnectorForce::Off);
            }
            PowerAction::Keep => {
                prop_assert_eq!(on, effective != ConnectorForce::Off);
            }
        }
    }
}
