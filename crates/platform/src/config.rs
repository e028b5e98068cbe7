//! Platform configuration
//!
//! Per-SoC data handed to the transmitter at bind time. Construct with
//! [`PlatformData::new`] and the `with_*` builders.

use crate::display::{DisplayInfo, DisplayMode, ModeStatus};

/// Platform mode filter, consulted by `mode_valid`.
pub type ModeValidFn = fn(&DisplayInfo, &DisplayMode) -> ModeStatus;

/// First controller revision with SCDC support.
pub const SCDC_MIN_CONTROLLER_VERSION: u32 = 0x200a;

/// Glue-layer configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlatformData {
    /// Send the dynamic-range (HDR) infoframe when the sink asks for it.
    pub use_drm_infoframe: bool,
    /// Use the vendor PHY. The built-in PHY is not supported.
    pub phy_force_vendor: bool,
    /// Optional platform mode filter.
    pub mode_valid: Option<ModeValidFn>,
    /// Controller revision.
    pub version: u32,
}

impl PlatformData {
    /// Vendor PHY, no HDR infoframe, no mode filter.
    pub const fn new() -> Self {
        Self {
            use_drm_infoframe: false,
            phy_force_vendor: true,
            mode_valid: None,
            version: SCDC_MIN_CONTROLLER_VERSION,
        }
    }

    /// Enable or disable the dynamic-range infoframe.
    #[must_use]
    pub const fn with_drm_infoframe(mut self, enable: bool) -> Self {
        self.use_drm_infoframe = enable;
        self
    }

    /// Require (or not) the vendor PHY.
    #[must_use]
    pub const fn with_vendor_phy(mut self, force: bool) -> Self {
        self.phy_force_vendor = force;
        self
    }

    /// Install a mode filter.
    #[must_use]
    pub const fn with_mode_valid(mut self, filter: ModeValidFn) -> Self {
        self.mode_valid = Some(filter);
        self
    }

    /// Override the controller revision.
    #[must_use]
    pub const fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// True if the controller revision can drive SCDC.
    pub const fn supports_scdc_revision(&self) -> bool {
        self.version >= SCDC_MIN_CONTROLLER_VERSION
    }
}

impl Default for PlatformData {
    fn default() -> Self {
        Self::new()
    }
}
