//! Display-pipeline abstraction layer
//!
//! Types the transmitter consumes from the display pipeline (modes, sink
//! capabilities, connector state) and the [`Bridge`] hook set it exposes
//! back. Mode negotiation and EDID parsing happen on the pipeline side; only
//! the parsed results cross this boundary.

/// Mode flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeFlags(pub u32);

impl ModeFlags {
    /// Positive horizontal sync.
    pub const PHSYNC: u32 = 1 << 0;
    /// Negative horizontal sync.
    pub const NHSYNC: u32 = 1 << 1;
    /// Positive vertical sync.
    pub const PVSYNC: u32 = 1 << 2;
    /// Negative vertical sync.
    pub const NVSYNC: u32 = 1 << 3;
    /// Interlaced scan.
    pub const INTERLACE: u32 = 1 << 4;
    /// Every pixel is sent twice (pixel repetition).
    pub const DBLCLK: u32 = 1 << 12;

    /// True if every bit of `flag` is set.
    pub const fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

/// Picture aspect ratio carried in the AVI infoframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PictureAspect {
    /// No aspect ratio data.
    #[default]
    None = 0,
    /// 4:3
    Aspect4x3 = 1,
    /// 16:9
    Aspect16x9 = 2,
    /// 64:27
    Aspect64x27 = 3,
    /// 256:135
    Aspect256x135 = 4,
}

/// A video timing as handed over by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMode {
    /// Pixel clock in kHz.
    pub clock_khz: u32,
    /// Active pixels per line.
    pub hdisplay: u16,
    /// Active lines.
    pub vdisplay: u16,
    /// Mode flags, see [`ModeFlags`].
    pub flags: ModeFlags,
    /// CEA-861 video identification code, 0 for non-CEA timings.
    pub vic: u8,
    /// Picture aspect ratio.
    pub picture_aspect: PictureAspect,
}

impl DisplayMode {
    /// Pixel clock in Hz.
    pub fn pixel_clock_hz(&self) -> u64 {
        u64::from(self.clock_khz).saturating_mul(1000)
    }

    /// True if the mode uses pixel doubling.
    pub fn is_double_clocked(&self) -> bool {
        self.flags.contains(ModeFlags::DBLCLK)
    }
}

/// SCDC capabilities advertised by the sink (HF-VSDB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScdcCaps {
    /// Sink implements the status and control data channel.
    pub supported: bool,
    /// Sink supports TMDS scrambling.
    pub scrambling_supported: bool,
    /// Sink supports scrambling at TMDS rates at or below 340 MHz.
    pub scrambling_low_rates: bool,
}

/// Static HDR capabilities of the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HdrSinkMetadata {
    /// Bit mask of supported EOTFs, bit `n` for [`Eotf`] value `n`.
    pub eotf: u8,
    /// Bit mask of supported static metadata descriptors.
    pub metadata_type: u8,
}

/// Parsed sink capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayInfo {
    /// Sink is HDMI (has an HDMI VSDB). False means DVI.
    pub is_hdmi: bool,
    /// Sink accepts audio.
    pub has_audio: bool,
    /// Maximum TMDS character rate in kHz, 0 if not advertised.
    pub max_tmds_clock_khz: u32,
    /// SCDC capabilities.
    pub scdc: ScdcCaps,
    /// HDR static metadata capabilities.
    pub hdr_sink: HdrSinkMetadata,
}

/// Electro-optical transfer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Eotf {
    /// Traditional gamma, SDR luminance range.
    #[default]
    TraditionalGammaSdr = 0,
    /// Traditional gamma, HDR luminance range.
    TraditionalGammaHdr = 1,
    /// SMPTE ST 2084 (PQ).
    SmpteSt2084 = 2,
    /// Hybrid log-gamma.
    Hlg = 3,
}

impl Eotf {
    /// Bit of this EOTF in [`HdrSinkMetadata::eotf`].
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// CIE 1931 chromaticity coordinate in units of 0.00002.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chromaticity {
    /// x coordinate.
    pub x: u16,
    /// y coordinate.
    pub y: u16,
}

/// HDR static metadata requested for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HdrOutputMetadata {
    /// Transfer function.
    pub eotf: Eotf,
    /// Static metadata descriptor id (0 = type 1).
    pub metadata_type: u8,
    /// Display primaries, red/green/blue order.
    pub display_primaries: [Chromaticity; 3],
    /// White point.
    pub white_point: Chromaticity,
    /// Max mastering display luminance, 1 cd/m² units.
    pub max_display_mastering_luminance: u16,
    /// Min mastering display luminance, 0.0001 cd/m² units.
    pub min_display_mastering_luminance: u16,
    /// Maximum content light level.
    pub max_cll: u16,
    /// Maximum frame-average light level.
    pub max_fall: u16,
}

/// Pixel encoding on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorEncoding {
    /// RGB 4:4:4.
    #[default]
    Rgb,
    /// YCbCr 4:4:4.
    Ycbcr444,
    /// YCbCr 4:2:2.
    Ycbcr422,
    /// YCbCr 4:2:0.
    Ycbcr420,
}

/// Output format chosen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputFormat {
    /// Pixel encoding.
    pub encoding: ColorEncoding,
    /// Bits per component (8, 10, 12 or 16).
    pub bpc: u8,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            encoding: ColorEncoding::Rgb,
            bpc: 8,
        }
    }
}

/// Connector state bound on enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectorState {
    /// Sink capabilities.
    pub display_info: DisplayInfo,
    /// Link output format.
    pub output_format: OutputFormat,
    /// HDR metadata to signal, if any.
    pub hdr_output_metadata: Option<HdrOutputMetadata>,
}

/// User override of connector detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectorForce {
    /// Follow hot-plug and rx-sense.
    #[default]
    Unspecified,
    /// Forced off.
    Off,
    /// Forced on.
    On,
    /// Forced on, digital output only.
    OnDigital,
}

/// Result of hot-plug detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectorStatus {
    /// A sink is attached.
    Connected,
    /// No sink attached.
    #[default]
    Disconnected,
    /// Detection not possible.
    Unknown,
}

/// Mode validation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeStatus {
    /// Mode can be driven.
    Ok,
    /// Pixel clock too high.
    ClockHigh,
    /// Pixel clock too low.
    ClockLow,
    /// Rejected for another reason.
    Bad,
}

/// Flags passed to [`Bridge::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttachFlags(pub u32);

impl AttachFlags {
    /// The bridge must not create its own connector.
    pub const NO_CONNECTOR: u32 = 1 << 0;

    /// True if `NO_CONNECTOR` is requested.
    pub const fn no_connector(self) -> bool {
        self.0 & Self::NO_CONNECTOR != 0
    }
}

/// Hooks a bridge exposes to the display pipeline.
///
/// Every hook takes `&self`: the pipeline, the interrupt handler and the
/// DDC adapter share one bridge for its whole bound lifetime.
pub trait Bridge {
    /// Error type for fallible hooks.
    type Error: core::fmt::Debug;

    /// Attach to the pipeline.
    async fn attach(&self, flags: AttachFlags) -> Result<(), Self::Error>;

    /// Detach from the pipeline.
    async fn detach(&self);

    /// Probe the hot-plug state.
    async fn detect(&self) -> ConnectorStatus;

    /// Check whether `mode` can be driven for a sink described by `info`.
    fn mode_valid(&self, info: &DisplayInfo, mode: &DisplayMode) -> ModeStatus;

    /// Latch the mode about to be enabled.
    async fn mode_set(&self, mode: &DisplayMode);

    /// Enable the output for `connector`.
    async fn atomic_enable(&self, connector: &ConnectorState) -> Result<(), Self::Error>;

    /// Disable the output.
    async fn atomic_disable(&self) -> Result<(), Self::Error>;

    /// Read raw EDID bytes into `buf`, returning the number of bytes read.
    async fn edid_read(&self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}
