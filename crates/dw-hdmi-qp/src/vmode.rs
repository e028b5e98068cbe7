//! Video descriptor derived on every mode set

use platform::{ColorEncoding, DisplayMode, OutputFormat, PictureAspect};

use crate::infoframe::{
    AviInfoframe, Colorimetry, Colorspace, QuantizationRange, ScanMode, YccQuantizationRange,
    ACTIVE_ASPECT_PICTURE,
};

/// YCbCr matrix used on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum YcbcrEncoding {
    /// ITU-R BT.601 (SD).
    #[default]
    Bt601,
    /// ITU-R BT.709 (HD).
    Bt709,
}

/// Link clocks and pixel repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoMode {
    /// Pixel clock in Hz.
    pub pixel_clock_hz: u64,
    /// TMDS character rate in Hz.
    pub tmds_clock_hz: u64,
    /// Pixel repetition at the controller input.
    pub pixel_repetition_input: u8,
    /// Pixel repetition on the link.
    pub pixel_repetition_output: u8,
}

/// Everything `setup` needs to know about the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HdmiData {
    /// Clocks and repetition.
    pub video_mode: VideoMode,
    /// Format entering the controller.
    pub enc_in: OutputFormat,
    /// Format on the link.
    pub enc_out: OutputFormat,
    /// YCbCr matrix on the link.
    pub enc_out_encoding: YcbcrEncoding,
    /// Pixel repetition factor signalled in the AVI frame.
    pub pix_repet_factor: u8,
    /// CEA mode: RGB should be limited range.
    pub rgb_limited_range: bool,
}

/// TMDS character rate for `pixel_clock_hz` in `format`.
///
/// Deep colour scales by `bpc / 8`; 4:2:2 always travels in 8-bit-rate
/// containers; 4:2:0 halves the rate.
pub fn tmds_clock_hz(pixel_clock_hz: u64, format: &OutputFormat) -> u64 {
    let bpc = u64::from(format.bpc.max(8));
    match format.encoding {
        ColorEncoding::Ycbcr422 => pixel_clock_hz,
        ColorEncoding::Ycbcr420 => (pixel_clock_hz / 2).saturating_mul(bpc) / 8,
        ColorEncoding::Rgb | ColorEncoding::Ycbcr444 => pixel_clock_hz.saturating_mul(bpc) / 8,
    }
}

/// Derive the descriptor for `mode` carried as `output`.
pub fn prep_data(mode: &DisplayMode, output: &OutputFormat) -> HdmiData {
    let pixel_clock_hz = mode.pixel_clock_hz();
    let double = mode.is_double_clocked();
    let repeat = u8::from(double);

    HdmiData {
        video_mode: VideoMode {
            pixel_clock_hz,
            tmds_clock_hz: tmds_clock_hz(pixel_clock_hz, output),
            pixel_repetition_input: repeat,
            pixel_repetition_output: repeat,
        },
        enc_in: OutputFormat::default(),
        enc_out: *output,
        enc_out_encoding: if mode.vdisplay >= 720 {
            YcbcrEncoding::Bt709
        } else {
            YcbcrEncoding::Bt601
        },
        pix_repet_factor: repeat,
        rgb_limited_range: mode.vic > 1,
    }
}

/// AVI frame describing `data` for `mode`.
pub fn avi_infoframe(data: &HdmiData, mode: &DisplayMode) -> AviInfoframe {
    let mut frame = AviInfoframe::new();

    frame.video_code = mode.vic;
    // M1M0 only encodes 4:3 and 16:9; wider modes are identified by the VIC
    frame.picture_aspect = match mode.picture_aspect {
        PictureAspect::Aspect64x27 | PictureAspect::Aspect256x135 => PictureAspect::None,
        aspect => aspect,
    };
    frame.active_aspect = ACTIVE_ASPECT_PICTURE;
    frame.scan_mode = ScanMode::None;
    frame.pixel_repeat = data.pix_repet_factor;

    frame.colorspace = match data.enc_out.encoding {
        ColorEncoding::Rgb => Colorspace::Rgb,
        ColorEncoding::Ycbcr444 => Colorspace::Yuv444,
        ColorEncoding::Ycbcr422 => Colorspace::Yuv422,
        ColorEncoding::Ycbcr420 => Colorspace::Yuv420,
    };

    if data.enc_out.encoding == ColorEncoding::Rgb {
        frame.colorimetry = Colorimetry::None;
        frame.quantization_range = if data.rgb_limited_range {
            QuantizationRange::Limited
        } else {
            QuantizationRange::Full
        };
    } else {
        frame.colorimetry = match data.enc_out_encoding {
            YcbcrEncoding::Bt601 => Colorimetry::Itu601,
            YcbcrEncoding::Bt709 => Colorimetry::Itu709,
        };
        frame.quantization_range = QuantizationRange::Default;
        frame.ycc_quantization_range = YccQuantizationRange::Limited;
    }

    frame
}
