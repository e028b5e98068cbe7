//! DW HDMI QP controller
//!
//! [`DwHdmiQp`] owns the register window, the DDC engine, the audio state and
//! the lifecycle state, and implements [`platform::Bridge`] for the display
//! pipeline.
//!
//! # Lifecycle
//!
//! ```text
//! bind ──► init_hw ──► clock locked? ──yes──► enabled by firmware (disabled = false)
//!                          │
//!                          no ──► disabled until atomic_enable
//!
//! update_power:  effective force OFF + bridge on   → PHY off, Disabled
//!                effective force ON  + bridge off  → setup → EnabledHdmi / EnabledDvi
//! ```
//!
//! Every lifecycle transition runs under one async mutex; `setup` and
//! `update_power` never run without it. DDC transfers have their own lock
//! inside the engine and may be issued while the lifecycle lock is held.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use platform::{
    AttachFlags, AudioParams, BindResources, Bridge, ConnectorForce, ConnectorState,
    ConnectorStatus, DisplayInfo, DisplayMode, HdmiPhy, ModeStatus, PlatformData, RegisterSpace,
};

use crate::audio::{AudioState, HdmiAudio, PluggedCallback};
use crate::ddc::{self, DdcBus};
use crate::error::HdmiError;
use crate::i2c::{I2cEngine, I2cMsg, IrqReturn};
use crate::infoframe::{header_word, pack_le32, DrmInfoframe, PAYLOAD_COPY_START};
use crate::power::{effective_force, power_action, PowerAction, TransmitterState};
use crate::registers::*;
use crate::scdc;
use crate::vmode::{self, HdmiData};

/// How the bridge was attached to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attachment {
    /// The bridge created and owns the connector.
    Connector,
    /// A downstream bridge owns the connector.
    NextBridge,
}

/// State guarded by the lifecycle lock.
struct Lifecycle<P> {
    phy: P,
    phy_enabled: bool,
    force: ConnectorForce,
    disabled: bool,
    bridge_is_on: bool,
    rxsense: bool,
    curr_conn: Option<ConnectorState>,
    previous_mode: DisplayMode,
    hdmi_data: HdmiData,
    sink_is_hdmi: bool,
    state: TransmitterState,
    last_connector_result: ConnectorStatus,
    attached: Option<Attachment>,
}

impl<P> Lifecycle<P> {
    fn new(phy: P, disabled: bool) -> Self {
        Self {
            phy,
            phy_enabled: false,
            force: ConnectorForce::Unspecified,
            disabled,
            bridge_is_on: false,
            rxsense: true,
            curr_conn: None,
            previous_mode: DisplayMode::default(),
            hdmi_data: HdmiData::default(),
            sink_is_hdmi: false,
            state: TransmitterState::Disabled,
            last_connector_result: ConnectorStatus::Disconnected,
            attached: None,
        }
    }
}

/// Mask the top-level interrupts, program the timer base, reset the DDC
/// engine and let the PHY set up hot-plug detection. Idempotent.
fn init_hw<R: RegisterSpace, P: HdmiPhy>(regs: &R, i2c: &I2cEngine, phy: &mut P) {
    init_controller(regs);
    i2c.init(regs);
    phy.setup_hpd();
}

fn init_controller<R: RegisterSpace>(regs: &R) {
    regs.write(MAINUNIT_0_INT_MASK_N, 0);
    regs.write(MAINUNIT_1_INT_MASK_N, 0);
    regs.write(TIMER_BASE_CONFIG0, TIMER_BASE_REF_FREQ);
}

fn display_clock_locked<R: RegisterSpace>(regs: &R) -> bool {
    regs.read(CMU_STATUS) & DISPLAY_CLK_MONITOR == DISPLAY_CLK_LOCKED
}

/// DW HDMI QP transmitter.
pub struct DwHdmiQp<R, P> {
    regs: R,
    config: PlatformData,
    i2c: I2cEngine,
    audio: HdmiAudio,
    lifecycle: Mutex<CriticalSectionRawMutex, Lifecycle<P>>,
}

impl<R: RegisterSpace, P: HdmiPhy> DwHdmiQp<R, P> {
    /// Bring the controller up.
    ///
    /// Order: map registers, detect the vendor PHY, `init_hw`, sample the
    /// display clock lock, request the interrupt, register the DDC adapter.
    /// If the display clock is already locked (firmware left the output
    /// running) the bridge starts enabled. A failing step releases what the
    /// earlier steps acquired, newest first.
    pub fn bind<B>(res: &mut B, config: PlatformData) -> Result<Self, HdmiError>
    where
        B: BindResources<Regs = R, Phy = P>,
    {
        let regs = res.map_registers().map_err(|kind| {
            error!("failed to map registers");
            HdmiError::Resource(kind)
        })?;

        let mut phy = Self::detect_phy(res, &config)?;

        let i2c = I2cEngine::new();
        init_hw(&regs, &i2c, &mut phy);

        let disabled = !display_clock_locked(&regs);

        if let Err(kind) = res.request_irq() {
            error!("failed to request irq");
            return Err(HdmiError::Resource(kind));
        }

        if let Err(kind) = res.add_ddc_adapter() {
            error!("failed to register DDC adapter");
            res.free_irq();
            return Err(HdmiError::Resource(kind));
        }

        info!(
            "bound, version {:#x}, PHY {}, display clock locked: {}",
            config.version,
            phy.name(),
            !disabled
        );

        Ok(Self {
            regs,
            config,
            i2c,
            audio: HdmiAudio::new(),
            lifecycle: Mutex::new(Lifecycle::new(phy, disabled)),
        })
    }

    fn detect_phy<B>(res: &mut B, config: &PlatformData) -> Result<P, HdmiError>
    where
        B: BindResources<Phy = P>,
    {
        if !config.phy_force_vendor {
            error!("internal HDMI PHY not supported");
            return Err(HdmiError::NoDevice);
        }

        res.take_phy().ok_or_else(|| {
            error!("vendor HDMI PHY not supported by glue layer");
            HdmiError::NoDevice
        })
    }

    /// Tear down in reverse bind order. Dropping `self` releases the
    /// register mapping.
    pub fn unbind<B>(self, res: &mut B)
    where
        B: BindResources<Regs = R, Phy = P>,
    {
        res.del_ddc_adapter();
        res.free_irq();
        info!("unbound");
    }

    /// Re-initialise the hardware after a system resume.
    ///
    /// The I2C master is reset only after a DDC transfer in flight has
    /// completed.
    pub async fn resume(&self) {
        let mut lc = self.lifecycle.lock().await;
        init_controller(&self.regs);
        self.i2c.reinit(&self.regs).await;
        lc.phy.setup_hpd();
    }

    /// Shared interrupt handler.
    pub fn irq_handler(&self) -> IrqReturn {
        self.i2c.on_irq(&self.regs)
    }

    /// Run a multi-message DDC transfer on the internal engine.
    pub async fn transfer(&self, msgs: &mut [I2cMsg<'_>]) -> Result<usize, HdmiError> {
        self.i2c.transfer(&self.regs, msgs).await
    }

    /// The DDC engine as an `embedded_hal_async` I2C bus.
    pub fn ddc(&self) -> DdcBus<'_, R> {
        DdcBus::new(&self.regs, &self.i2c)
    }

    /// Platform configuration.
    pub fn config(&self) -> &PlatformData {
        &self.config
    }

    /// Audio side of the controller.
    pub fn audio(&self) -> &HdmiAudio {
        &self.audio
    }

    /// Apply a connector force override.
    pub async fn connector_force(&self, force: ConnectorForce) -> Result<(), HdmiError> {
        let mut lc = self.lifecycle.lock().await;
        lc.force = force;
        self.update_power(&mut lc).await
    }

    /// Feed hot-plug and receiver-sense state from the PHY.
    ///
    /// Only applies while no force is set. A lost receiver clears the
    /// rx-sense latch; it is set again only when hot-plug and receiver sense
    /// agree.
    pub async fn setup_rx_sense(&self, hpd: bool, rx_sense: bool) -> Result<(), HdmiError> {
        let mut lc = self.lifecycle.lock().await;

        if lc.force != ConnectorForce::Unspecified {
            return Ok(());
        }

        if !rx_sense {
            lc.rxsense = false;
        }
        if hpd && rx_sense {
            lc.rxsense = true;
        }

        self.update_power(&mut lc).await
    }

    /// Register the audio plugged callback; it is told the current
    /// connection state straight away.
    pub async fn set_plugged_callback(&self, cb: PluggedCallback) {
        let lc = self.lifecycle.lock().await;
        let plugged = lc.last_connector_result == ConnectorStatus::Connected;
        self.audio.set_plugged_callback(cb, plugged);
    }

    /// Configure the audio stream; N/CTS follow the current TMDS rate.
    pub async fn audio_hw_params(&self, params: AudioParams) -> AudioState {
        self.audio.set_params(params).await
    }

    /// Current output state.
    pub async fn state(&self) -> TransmitterState {
        self.lifecycle.lock().await.state
    }

    /// Administratively disabled.
    pub async fn is_disabled(&self) -> bool {
        self.lifecycle.lock().await.disabled
    }

    /// Output powered.
    pub async fn is_bridge_on(&self) -> bool {
        self.lifecycle.lock().await.bridge_is_on
    }

    /// PHY powered.
    pub async fn is_phy_enabled(&self) -> bool {
        self.lifecycle.lock().await.phy_enabled
    }

    /// Descriptor derived by the last setup.
    pub async fn hdmi_data(&self) -> HdmiData {
        self.lifecycle.lock().await.hdmi_data
    }

    /// How the bridge is attached, if it is.
    pub async fn attachment(&self) -> Option<Attachment> {
        self.lifecycle.lock().await.attached
    }

    /// Last hot-plug result seen by `detect`.
    pub async fn last_connector_result(&self) -> ConnectorStatus {
        self.lifecycle.lock().await.last_connector_result
    }

    async fn update_power(&self, lc: &mut Lifecycle<P>) -> Result<(), HdmiError> {
        let force = effective_force(lc.disabled, lc.force, lc.rxsense);

        match power_action(force, lc.bridge_is_on) {
            PowerAction::Keep => Ok(()),
            PowerAction::PowerOff => {
                if lc.phy_enabled {
                    lc.phy.disable();
                    lc.phy_enabled = false;
                }
                self.audio.disable();
                lc.bridge_is_on = false;
                lc.state = TransmitterState::Disabled;
                Ok(())
            }
            PowerAction::PowerOn => {
                let Some(conn) = lc.curr_conn else {
                    debug!("no connector bound, setup deferred to enable");
                    return Ok(());
                };
                let mode = lc.previous_mode;
                self.setup(lc, &conn, &mode).await?;
                // audio samples only travel in HDMI data islands
                if lc.state == TransmitterState::EnabledHdmi && conn.display_info.has_audio {
                    self.audio.enable();
                }
                lc.bridge_is_on = true;
                Ok(())
            }
        }
    }

    async fn setup(
        &self,
        lc: &mut Lifecycle<P>,
        conn: &ConnectorState,
        mode: &DisplayMode,
    ) -> Result<(), HdmiError> {
        let data = vmode::prep_data(mode, &conn.output_format);
        lc.hdmi_data = data;
        lc.sink_is_hdmi = conn.display_info.is_hdmi;

        if lc.phy.init(&conn.display_info, mode).is_err() {
            error!("PHY {} init failed", lc.phy.name());
            return Err(HdmiError::PhyInit);
        }
        lc.phy_enabled = true;

        self.audio.set_tmds_clock(data.video_mode.tmds_clock_hz).await;

        if !lc.sink_is_hdmi {
            debug!("setup DVI mode");
            self.regs
                .modify(HDCP2LOGIC_CONFIG0, HDCP2_BYPASS, HDCP2_BYPASS);
            self.regs.modify(LINK_CONFIG0, OPMODE_DVI, OPMODE_DVI);
            lc.state = TransmitterState::EnabledDvi;
            return Ok(());
        }

        debug!("setup HDMI mode");
        self.regs.modify(LINK_CONFIG0, OPMODE_DVI, 0);
        self.regs
            .modify(HDCP2LOGIC_CONFIG0, HDCP2_BYPASS, HDCP2_BYPASS);

        let scdc = scdc::supports_scdc(&self.config, true, &conn.display_info);
        if data.video_mode.tmds_clock_hz > HDMI14_MAX_TMDSCLK {
            if scdc {
                self.scdc_high_rate(true).await;
            }
            self.regs.write(SCRAMB_CONFIG0, 1);
        } else {
            if scdc {
                self.scdc_high_rate(false).await;
            }
            self.regs.write(SCRAMB_CONFIG0, 0);
        }

        self.config_avi(&data, mode);
        self.config_drm_infoframe(conn);

        lc.state = TransmitterState::EnabledHdmi;
        Ok(())
    }

    /// Negotiate the sink side of the HDMI 2.0 rate switch. Sink errors are
    /// logged and do not stop the source side from being configured.
    async fn scdc_high_rate(&self, enable: bool) {
        let mut ddc = self.ddc();

        if enable {
            let sink_version = match scdc::read_byte(&mut ddc, scdc::SCDC_SINK_VERSION).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("SCDC sink version read failed: {}", e);
                    0
                }
            };
            let version = sink_version.min(SCDC_MIN_SOURCE_VERSION);
            if let Err(e) = scdc::write_byte(&mut ddc, scdc::SCDC_SOURCE_VERSION, version).await {
                warn!("SCDC source version write failed: {}", e);
            }
        }

        if let Err(e) = scdc::set_high_tmds_clock_ratio(&mut ddc, enable).await {
            warn!("SCDC TMDS clock ratio update failed: {}", e);
        }
        if let Err(e) = scdc::set_scrambling(&mut ddc, enable).await {
            warn!("SCDC scrambling update failed: {}", e);
        }
    }

    fn write_packet(&self, contents0: u32, contents1: u32, header: u32, frame: &[u8], length: u8) {
        self.regs.write(contents0, header);

        let words = pack_le32(frame, PAYLOAD_COPY_START, usize::from(length).saturating_add(1));
        for (offset, word) in (contents1..).step_by(4).zip(words) {
            self.regs.write(offset, word);
        }
    }

    fn config_avi(&self, data: &HdmiData, mode: &DisplayMode) {
        let mut frame = vmode::avi_infoframe(data, mode);
        let buf = frame.pack_for_controller();

        self.write_packet(
            PKT_AVI_CONTENTS0,
            PKT_AVI_CONTENTS1,
            header_word(frame.version, frame.length),
            &buf,
            frame.length,
        );

        self.regs
            .modify(PKTSCHED_PKT_CONFIG1, PKTSCHED_AVI_FIELDRATE, 0);
        self.regs.modify(
            PKTSCHED_PKT_EN,
            PKTSCHED_AVI_TX_EN | PKTSCHED_GCP_TX_EN,
            PKTSCHED_AVI_TX_EN | PKTSCHED_GCP_TX_EN,
        );
    }

    fn config_drm_infoframe(&self, conn: &ConnectorState) {
        if !self.config.use_drm_infoframe {
            return;
        }

        self.regs.modify(PKTSCHED_PKT_EN, PKTSCHED_DRMI_TX_EN, 0);

        let sink_eotf = conn.display_info.hdr_sink.eotf;
        if sink_eotf == 0 {
            debug!("no need to set HDR metadata in infoframe");
            return;
        }

        let Some(meta) = conn.hdr_output_metadata else {
            debug!("source metadata not set yet");
            return;
        };

        if sink_eotf & meta.eotf.mask() == 0 {
            error!("EOTF {} not supported", meta.eotf as u8);
            return;
        }

        let frame = DrmInfoframe::from_metadata(&meta);
        let buf = frame.pack();

        self.write_packet(
            PKT_DRMI_CONTENTS0,
            PKT_DRMI_CONTENTS1,
            header_word(frame.version, frame.length),
            &buf,
            frame.length,
        );

        self.regs
            .modify(PKTSCHED_PKT_CONFIG1, PKTSCHED_DRMI_FIELDRATE, 0);
        self.regs
            .modify(PKTSCHED_PKT_EN, PKTSCHED_DRMI_TX_EN, PKTSCHED_DRMI_TX_EN);
    }
}

impl<R: RegisterSpace, P: HdmiPhy> Bridge for DwHdmiQp<R, P> {
    type Error = HdmiError;

    async fn attach(&self, flags: AttachFlags) -> Result<(), HdmiError> {
        let mut lc = self.lifecycle.lock().await;
        lc.attached = Some(if flags.no_connector() {
            Attachment::NextBridge
        } else {
            Attachment::Connector
        });
        Ok(())
    }

    async fn detach(&self) {
        self.lifecycle.lock().await.attached = None;
    }

    async fn detect(&self) -> ConnectorStatus {
        let mut lc = self.lifecycle.lock().await;
        let result = lc.phy.read_hpd();

        if result != lc.last_connector_result {
            debug!("read_hpd result changed, connected: {}", result == ConnectorStatus::Connected);
            self.audio
                .handle_plugged_change(result == ConnectorStatus::Connected);
            lc.last_connector_result = result;
        }

        result
    }

    fn mode_valid(&self, info: &DisplayInfo, mode: &DisplayMode) -> ModeStatus {
        self.config
            .mode_valid
            .map_or(ModeStatus::Ok, |filter| filter(info, mode))
    }

    async fn mode_set(&self, mode: &DisplayMode) {
        self.lifecycle.lock().await.previous_mode = *mode;
    }

    async fn atomic_enable(&self, connector: &ConnectorState) -> Result<(), HdmiError> {
        let mut lc = self.lifecycle.lock().await;
        lc.disabled = false;
        lc.curr_conn = Some(*connector);
        let result = self.update_power(&mut lc).await;
        self.audio.handle_plugged_change(true);
        result
    }

    async fn atomic_disable(&self) -> Result<(), HdmiError> {
        let mut lc = self.lifecycle.lock().await;
        lc.disabled = true;
        lc.curr_conn = None;
        let result = self.update_power(&mut lc).await;
        self.audio.handle_plugged_change(false);
        result
    }

    async fn edid_read(&self, buf: &mut [u8]) -> Result<usize, HdmiError> {
        ddc::read_edid(&self.regs, &self.i2c, buf).await
    }
}
