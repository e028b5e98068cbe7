//! AVI and dynamic-range infoframes
//!
//! Frames are packed in the CTA-861 byte layout (type, version, length,
//! checksum, payload) and then copied into the controller's packet buffers
//! from the checksum byte onward, four bytes per register, little-endian,
//! behind a header word carrying only version and length.
//!
//! AVI frames for VICs of 128 and above are rewritten to version 3 after
//! packing: the full 3-bit colorspace goes into payload byte 0 and the
//! unmasked VIC into payload byte 3.

#![allow(clippy::indexing_slicing)] // fixed-size frame buffers, constant indices
#![allow(clippy::arithmetic_side_effects)] // bit packing on u8/u32, no overflow

use heapless::Vec;
use platform::{Chromaticity, Eotf, HdrOutputMetadata, PictureAspect};

/// Type, version, length, checksum.
pub const INFOFRAME_HEADER_SIZE: usize = 4;

/// AVI infoframe type code.
pub const AVI_INFOFRAME_TYPE: u8 = 0x82;
/// AVI payload length.
pub const AVI_INFOFRAME_SIZE: usize = 13;
/// Packed AVI frame length.
pub const AVI_FRAME_LEN: usize = INFOFRAME_HEADER_SIZE + AVI_INFOFRAME_SIZE;

/// Dynamic range and mastering infoframe type code.
pub const DRM_INFOFRAME_TYPE: u8 = 0x87;
/// DRM payload length.
pub const DRM_INFOFRAME_SIZE: usize = 26;
/// Packed DRM frame length.
pub const DRM_FRAME_LEN: usize = INFOFRAME_HEADER_SIZE + DRM_INFOFRAME_SIZE;

/// Offset of the checksum byte; hardware copies start here.
pub const PAYLOAD_COPY_START: usize = 3;

/// Active format "same as picture".
pub const ACTIVE_ASPECT_PICTURE: u8 = 8;

/// Frame pixel encoding (Y2..Y0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Colorspace {
    /// RGB.
    #[default]
    Rgb = 0,
    /// YCbCr 4:2:2.
    Yuv422 = 1,
    /// YCbCr 4:4:4.
    Yuv444 = 2,
    /// YCbCr 4:2:0.
    Yuv420 = 3,
    /// IDO-defined.
    IdoDefined = 7,
}

/// Scan information (S1..S0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScanMode {
    /// No data.
    #[default]
    None = 0,
    /// Overscanned.
    Overscan = 1,
    /// Underscanned.
    Underscan = 2,
}

/// Colorimetry (C1..C0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Colorimetry {
    /// No data.
    #[default]
    None = 0,
    /// SMPTE 170M / ITU-R BT.601.
    Itu601 = 1,
    /// ITU-R BT.709.
    Itu709 = 2,
    /// See extended colorimetry.
    Extended = 3,
}

/// Extended colorimetry (EC2..EC0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ExtendedColorimetry {
    /// xvYCC601.
    #[default]
    XvYcc601 = 0,
    /// xvYCC709.
    XvYcc709 = 1,
    /// sYCC601.
    SYcc601 = 2,
    /// opYCC601.
    OpYcc601 = 3,
    /// opRGB.
    OpRgb = 4,
    /// BT.2020 constant luminance.
    Bt2020Const = 5,
    /// BT.2020.
    Bt2020 = 6,
}

/// RGB quantization range (Q1..Q0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QuantizationRange {
    /// Depends on the video format.
    #[default]
    Default = 0,
    /// Limited range.
    Limited = 1,
    /// Full range.
    Full = 2,
}

/// YCC quantization range (YQ1..YQ0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum YccQuantizationRange {
    /// Limited range.
    #[default]
    Limited = 0,
    /// Full range.
    Full = 1,
}

/// IT content type (CN1..CN0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ContentType {
    /// Graphics.
    #[default]
    Graphics = 0,
    /// Photo.
    Photo = 1,
    /// Cinema.
    Cinema = 2,
    /// Game.
    Game = 3,
}

/// Non-uniform picture scaling (SC1..SC0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Nups {
    /// No known scaling.
    #[default]
    Unknown = 0,
    /// Scaled horizontally.
    Horizontal = 1,
    /// Scaled vertically.
    Vertical = 2,
    /// Scaled both ways.
    Both = 3,
}

/// Auxiliary video information frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AviInfoframe {
    /// Frame version (2, or 3 for VIC >= 128).
    pub version: u8,
    /// Payload length.
    pub length: u8,
    /// Pixel encoding.
    pub colorspace: Colorspace,
    /// Scan information.
    pub scan_mode: ScanMode,
    /// Colorimetry.
    pub colorimetry: Colorimetry,
    /// Picture aspect ratio.
    pub picture_aspect: PictureAspect,
    /// Active format aspect ratio (R3..R0).
    pub active_aspect: u8,
    /// IT content.
    pub itc: bool,
    /// Extended colorimetry.
    pub extended_colorimetry: ExtendedColorimetry,
    /// RGB quantization range.
    pub quantization_range: QuantizationRange,
    /// Non-uniform scaling.
    pub nups: Nups,
    /// Video identification code.
    pub video_code: u8,
    /// YCC quantization range.
    pub ycc_quantization_range: YccQuantizationRange,
    /// IT content type.
    pub content_type: ContentType,
    /// Pixel repetition factor minus one.
    pub pixel_repeat: u8,
    /// Line number of end of top bar.
    pub top_bar: u16,
    /// Line number of start of bottom bar.
    pub bottom_bar: u16,
    /// Pixel number of end of left bar.
    pub left_bar: u16,
    /// Pixel number of start of right bar.
    pub right_bar: u16,
}

impl AviInfoframe {
    /// Version 2 frame with every field at its "no data" value.
    pub const fn new() -> Self {
        Self {
            version: 2,
            length: AVI_INFOFRAME_SIZE as u8,
            colorspace: Colorspace::Rgb,
            scan_mode: ScanMode::None,
            colorimetry: Colorimetry::None,
            picture_aspect: PictureAspect::None,
            active_aspect: 0,
            itc: false,
            extended_colorimetry: ExtendedColorimetry::XvYcc601,
            quantization_range: QuantizationRange::Default,
            nups: Nups::Unknown,
            video_code: 0,
            ycc_quantization_range: YccQuantizationRange::Limited,
            content_type: ContentType::Graphics,
            pixel_repeat: 0,
            top_bar: 0,
            bottom_bar: 0,
            left_bar: 0,
            right_bar: 0,
        }
    }

    /// Pack in the standard layout with checksum.
    pub fn pack(&self) -> [u8; AVI_FRAME_LEN] {
        let mut buf = [0u8; AVI_FRAME_LEN];

        buf[0] = AVI_INFOFRAME_TYPE;
        buf[1] = self.version;
        buf[2] = self.length;

        let p = &mut buf[INFOFRAME_HEADER_SIZE..];

        p[0] = ((self.colorspace as u8 & 0x3) << 5) | (self.scan_mode as u8 & 0x3);
        if self.active_aspect & 0xf != 0 {
            p[0] |= 1 << 4;
        }
        if self.top_bar != 0 || self.bottom_bar != 0 {
            p[0] |= 1 << 3;
        }
        if self.left_bar != 0 || self.right_bar != 0 {
            p[0] |= 1 << 2;
        }

        p[1] = ((self.colorimetry as u8 & 0x3) << 6)
            | ((self.picture_aspect as u8 & 0x3) << 4)
            | (self.active_aspect & 0xf);

        p[2] = ((self.extended_colorimetry as u8 & 0x7) << 4)
            | ((self.quantization_range as u8 & 0x3) << 2)
            | (self.nups as u8 & 0x3);
        if self.itc {
            p[2] |= 1 << 7;
        }

        p[3] = self.video_code & 0x7f;

        p[4] = ((self.ycc_quantization_range as u8 & 0x3) << 6)
            | ((self.content_type as u8 & 0x3) << 4)
            | (self.pixel_repeat & 0xf);

        p[5..7].copy_from_slice(&self.top_bar.to_le_bytes());
        p[7..9].copy_from_slice(&self.bottom_bar.to_le_bytes());
        p[9..11].copy_from_slice(&self.left_bar.to_le_bytes());
        p[11..13].copy_from_slice(&self.right_bar.to_le_bytes());

        set_checksum(&mut buf);
        buf
    }

    /// Pack for the controller, applying the VIC >= 128 rewrite.
    ///
    /// Updates `self.version` so the header word matches the buffer.
    pub fn pack_for_controller(&mut self) -> [u8; AVI_FRAME_LEN] {
        let mut buf = self.pack();

        if self.video_code >= 128 {
            self.version = 3;
            buf[1] = self.version;
            buf[4] &= 0x1f;
            buf[4] |= (self.colorspace as u8 & 0x7) << 5;
            buf[7] = self.video_code;
            set_checksum(&mut buf);
        }

        buf
    }
}

impl Default for AviInfoframe {
    fn default() -> Self {
        Self::new()
    }
}

/// Dynamic range and mastering infoframe (static metadata type 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrmInfoframe {
    /// Frame version.
    pub version: u8,
    /// Payload length.
    pub length: u8,
    /// Transfer function.
    pub eotf: Eotf,
    /// Static metadata descriptor id.
    pub metadata_type: u8,
    /// Display primaries.
    pub display_primaries: [Chromaticity; 3],
    /// White point.
    pub white_point: Chromaticity,
    /// Max mastering luminance.
    pub max_display_mastering_luminance: u16,
    /// Min mastering luminance.
    pub min_display_mastering_luminance: u16,
    /// Max content light level.
    pub max_cll: u16,
    /// Max frame-average light level.
    pub max_fall: u16,
}

impl DrmInfoframe {
    /// Frame carrying `meta`.
    pub fn from_metadata(meta: &HdrOutputMetadata) -> Self {
        Self {
            version: 1,
            length: DRM_INFOFRAME_SIZE as u8,
            eotf: meta.eotf,
            metadata_type: meta.metadata_type,
            display_primaries: meta.display_primaries,
            white_point: meta.white_point,
            max_display_mastering_luminance: meta.max_display_mastering_luminance,
            min_display_mastering_luminance: meta.min_display_mastering_luminance,
            max_cll: meta.max_cll,
            max_fall: meta.max_fall,
        }
    }

    /// Pack in the standard layout with checksum.
    pub fn pack(&self) -> [u8; DRM_FRAME_LEN] {
        let mut buf = [0u8; DRM_FRAME_LEN];

        buf[0] = DRM_INFOFRAME_TYPE;
        buf[1] = self.version;
        buf[2] = self.length;

        let p = &mut buf[INFOFRAME_HEADER_SIZE..];
        p[0] = self.eotf as u8;
        p[1] = self.metadata_type;

        let mut at = 2;
        for c in self.display_primaries.iter().chain(core::iter::once(&self.white_point)) {
            p[at..at + 2].copy_from_slice(&c.x.to_le_bytes());
            p[at + 2..at + 4].copy_from_slice(&c.y.to_le_bytes());
            at += 4;
        }
        for v in [
            self.max_display_mastering_luminance,
            self.min_display_mastering_luminance,
            self.max_cll,
            self.max_fall,
        ] {
            p[at..at + 2].copy_from_slice(&v.to_le_bytes());
            at += 2;
        }

        set_checksum(&mut buf);
        buf
    }
}

/// Write the checksum byte (offset 3) so that all bytes sum to 0 mod 256.
pub fn set_checksum(buf: &mut [u8]) {
    let Some(slot) = buf.get_mut(PAYLOAD_COPY_START) else {
        return;
    };
    *slot = 0;
    let sum = buf.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    buf[PAYLOAD_COPY_START] = 0u8.wrapping_sub(sum);
}

/// Controller packet header word.
pub fn header_word(version: u8, length: u8) -> u32 {
    (u32::from(version) << 8) | (u32::from(length) << 16)
}

/// Pack `count` bytes of `bytes` starting at `start` into little-endian
/// 32-bit words; the last word holds the remainder in its low bytes.
/// Bytes past the end of `bytes` read as zero. At most 32 bytes are packed.
pub fn pack_le32(bytes: &[u8], start: usize, count: usize) -> Vec<u32, 8> {
    let mut words = Vec::new();
    let count = count.min(32);

    for i in 0..count {
        let byte = bytes.get(start.saturating_add(i)).copied().unwrap_or(0);
        if i % 4 == 0 {
            // capacity is 8 words and count <= 32
            let _ = words.push(0);
        }
        if let Some(word) = words.last_mut() {
            *word |= u32::from(byte) << ((i % 4) * 8);
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(buf: &[u8]) -> u8 {
        buf.iter().fold(0u8, |a, b| a.wrapping_add(*b))
    }

    #[test]
    fn default_avi_frame_layout() {
        let buf = AviInfoframe::new().pack();
        assert_eq!(&buf[..3], &[0x82, 0x02, 0x0d]);
        assert_eq!(sum(&buf), 0);
        // type + version + length = 0x91, checksum makes it 0x100
        assert_eq!(buf[3], 0x6f);
        assert!(buf[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn avi_bit_positions() {
        let frame = AviInfoframe {
            colorspace: Colorspace::Yuv444,
            scan_mode: ScanMode::Underscan,
            colorimetry: Colorimetry::Itu709,
            picture_aspect: PictureAspect::Aspect16x9,
            active_aspect: ACTIVE_ASPECT_PICTURE,
            itc: true,
            extended_colorimetry: ExtendedColorimetry::Bt2020,
            quantization_range: QuantizationRange::Full,
            nups: Nups::Both,
            video_code: 16,
            ycc_quantization_range: YccQuantizationRange::Full,
            content_type: ContentType::Game,
            pixel_repeat: 1,
            top_bar: 0x0102,
            right_bar: 0x0304,
            ..AviInfoframe::new()
        };
        let buf = frame.pack();
        assert_eq!(buf[4], (2 << 5) | (1 << 4) | (1 << 3) | (1 << 2) | 2);
        assert_eq!(buf[5], (2 << 6) | (2 << 4) | 8);
        assert_eq!(buf[6], (1 << 7) | (6 << 4) | (2 << 2) | 3);
        assert_eq!(buf[7], 16);
        assert_eq!(buf[8], (1 << 6) | (3 << 4) | 1);
        assert_eq!(&buf[9..11], &[0x02, 0x01]);
        assert_eq!(&buf[15..17], &[0x04, 0x03]);
        assert_eq!(sum(&buf), 0);
    }

    #[test]
    fn standard_pack_masks_high_vic() {
        let frame = AviInfoframe {
            video_code: 200,
            ..AviInfoframe::new()
        };
        assert_eq!(frame.pack()[7], 200 & 0x7f);
    }

    #[test]
    fn high_vic_becomes_version_3() {
        let mut frame = AviInfoframe {
            video_code: 200,
            colorspace: Colorspace::Yuv420,
            scan_mode: ScanMode::Overscan,
            ..AviInfoframe::new()
        };
        let buf = frame.pack_for_controller();
        assert_eq!(frame.version, 3);
        assert_eq!(buf[1], 3);
        assert_eq!(buf[7], 200);
        assert_eq!(buf[4] >> 5, 3);
        // scan mode survives the colorspace rewrite
        assert_eq!(buf[4] & 0x3, 1);
        assert_eq!(sum(&buf), 0);
    }

    #[test]
    fn low_vic_stays_version_2() {
        let mut frame = AviInfoframe {
            video_code: 97,
            ..AviInfoframe::new()
        };
        let buf = frame.pack_for_controller();
        assert_eq!(frame.version, 2);
        assert_eq!(buf, frame.pack());
    }

    #[test]
    fn drm_frame_layout() {
        let meta = HdrOutputMetadata {
            eotf: Eotf::SmpteSt2084,
            metadata_type: 0,
            display_primaries: [
                Chromaticity { x: 0x8a48, y: 0x3908 },
                Chromaticity { x: 0x2134, y: 0x9baa },
                Chromaticity { x: 0x1996, y: 0x08fc },
            ],
            white_point: Chromaticity { x: 0x3d13, y: 0x4042 },
            max_display_mastering_luminance: 1000,
            min_display_mastering_luminance: 50,
            max_cll: 1000,
            max_fall: 400,
        };
        let buf = DrmInfoframe::from_metadata(&meta).pack();
        assert_eq!(&buf[..3], &[0x87, 0x01, 0x1a]);
        assert_eq!(buf[4], 2);
        assert_eq!(buf[5], 0);
        assert_eq!(&buf[6..10], &[0x48, 0x8a, 0x08, 0x39]);
        assert_eq!(&buf[18..22], &[0x13, 0x3d, 0x42, 0x40]);
        assert_eq!(&buf[22..24], &1000u16.to_le_bytes());
        assert_eq!(&buf[24..26], &50u16.to_le_bytes());
        assert_eq!(&buf[26..28], &1000u16.to_le_bytes());
        assert_eq!(&buf[28..30], &400u16.to_le_bytes());
        assert_eq!(sum(&buf), 0);
    }

    #[test]
    fn header_word_places_version_and_length() {
        assert_eq!(header_word(2, 13), 0x000d_0200);
        assert_eq!(header_word(1, 26), 0x001a_0100);
    }

    #[test]
    fn pack_le32_partial_last_word() {
        let bytes = [0xaa, 0xbb, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let words = pack_le32(&bytes, 2, 6);
        assert_eq!(words.as_slice(), &[0x0403_0201, 0x0000_0605]);
    }

    #[test]
    fn pack_le32_avi_and_drm_word_counts() {
        let avi = AviInfoframe::new().pack();
        assert_eq!(pack_le32(&avi, PAYLOAD_COPY_START, AVI_INFOFRAME_SIZE + 1).len(), 4);
        let drm = [0u8; DRM_FRAME_LEN];
        assert_eq!(pack_le32(&drm, PAYLOAD_COPY_START, DRM_INFOFRAME_SIZE + 1).len(), 7);
    }

    #[test]
    fn pack_le32_past_end_reads_zero() {
        assert_eq!(pack_le32(&[0x11], 0, 3).as_slice(), &[0x11]);
        assert!(pack_le32(&[], 0, 0).is_empty());
    }
}
