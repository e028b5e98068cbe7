//! HDMI audio state
//!
//! Two locks, two speeds:
//! - `fields` is a critical-section mutex around a `Cell`. It guards the
//!   values the audio fast path reads (N, CTS, enable) and is never held
//!   across an await.
//! - `reconfig` is an async mutex that serialises whole reconfigurations
//!   (new stream parameters, new TMDS clock), which may wait.
//!
//! The codec glue registers a plugged callback; the controller reports
//! connection changes through it.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use platform::AudioParams;

/// Called with `true` when a sink appears and `false` when it goes away.
pub type PluggedCallback = fn(bool);

/// Audio clock regeneration and stream state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioState {
    /// Current stream parameters.
    pub params: Option<AudioParams>,
    /// ACR N value.
    pub n: u32,
    /// ACR CTS value.
    pub cts: u32,
    /// TMDS character rate the N/CTS pair was computed for.
    pub tmds_clock_hz: u64,
    /// Audio sample packets are being sent.
    pub enabled: bool,
}

/// Recommended ACR N for `sample_rate_hz` (HDMI 1.4b table 7-1..7-3,
/// "other" TMDS clocks).
pub fn compute_n(sample_rate_hz: u32) -> u32 {
    let (base_rate, base_n): (u32, u32) = if sample_rate_hz % 44_100 == 0 {
        (44_100, 6272)
    } else if sample_rate_hz % 48_000 == 0 {
        (48_000, 6144)
    } else {
        (32_000, 4096)
    };
    let mult = (sample_rate_hz / base_rate).max(1);
    base_n.saturating_mul(mult)
}

/// ACR CTS for `n` at `sample_rate_hz` over `tmds_clock_hz`:
/// `f_tmds * N / (128 * fs)`.
pub fn compute_cts(n: u32, sample_rate_hz: u32, tmds_clock_hz: u64) -> u32 {
    let den = u64::from(sample_rate_hz).saturating_mul(128);
    if den == 0 {
        return 0;
    }
    let cts = tmds_clock_hz.saturating_mul(u64::from(n)) / den;
    u32::try_from(cts).unwrap_or(u32::MAX)
}

/// Audio side of the controller.
pub struct HdmiAudio {
    fields: BlockingMutex<CriticalSectionRawMutex, Cell<AudioState>>,
    reconfig: Mutex<CriticalSectionRawMutex, ()>,
    plugged_cb: BlockingMutex<CriticalSectionRawMutex, Cell<Option<PluggedCallback>>>,
}

impl HdmiAudio {
    /// No stream, no callback.
    pub const fn new() -> Self {
        Self {
            fields: BlockingMutex::new(Cell::new(AudioState {
                params: None,
                n: 0,
                cts: 0,
                tmds_clock_hz: 0,
                enabled: false,
            })),
            reconfig: Mutex::new(()),
            plugged_cb: BlockingMutex::new(Cell::new(None)),
        }
    }

    /// Snapshot of the fast-path fields.
    pub fn state(&self) -> AudioState {
        self.fields.lock(Cell::get)
    }

    /// Install new stream parameters and recompute N/CTS.
    pub async fn set_params(&self, params: AudioParams) -> AudioState {
        let _guard = self.reconfig.lock().await;
        self.recompute(|st| st.params = Some(params))
    }

    /// Record a new TMDS rate and recompute CTS.
    pub async fn set_tmds_clock(&self, tmds_clock_hz: u64) -> AudioState {
        let _guard = self.reconfig.lock().await;
        self.recompute(|st| st.tmds_clock_hz = tmds_clock_hz)
    }

    /// Start sending audio sample packets.
    pub fn enable(&self) {
        self.fields.lock(|cell| {
            let mut st = cell.get();
            st.enabled = true;
            cell.set(st);
        });
    }

    /// Stop sending audio sample packets.
    pub fn disable(&self) {
        self.fields.lock(|cell| {
            let mut st = cell.get();
            st.enabled = false;
            cell.set(st);
        });
    }

    /// Register the plugged callback and tell it the current state.
    pub fn set_plugged_callback(&self, cb: PluggedCallback, plugged: bool) {
        self.plugged_cb.lock(|cell| cell.set(Some(cb)));
        cb(plugged);
    }

    /// Report a connection change to the registered callback, if any.
    pub fn handle_plugged_change(&self, plugged: bool) {
        // invoke outside the critical section
        if let Some(cb) = self.plugged_cb.lock(Cell::get) {
            cb(plugged);
        }
    }

    fn recompute(&self, update: impl FnOnce(&mut AudioState)) -> AudioState {
        self.fields.lock(|cell| {
            let mut st = cell.get();
            update(&mut st);
            if let Some(params) = st.params {
                st.n = compute_n(params.sample_rate_hz());
                st.cts = compute_cts(st.n, params.sample_rate_hz(), st.tmds_clock_hz);
            }
            cell.set(st);
            st
        })
    }
}

impl Default for HdmiAudio {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU8, Ordering};

    #[test]
    fn n_follows_rate_family() {
        assert_eq!(compute_n(32_000), 4096);
        assert_eq!(compute_n(44_100), 6272);
        assert_eq!(compute_n(88_200), 12_544);
        assert_eq!(compute_n(176_400), 25_088);
        assert_eq!(compute_n(48_000), 6144);
        assert_eq!(compute_n(96_000), 12_288);
        assert_eq!(compute_n(192_000), 24_576);
    }

    #[test]
    fn cts_for_148_5_mhz() {
        // 148.5 MHz, 48 kHz: N = 6144, CTS = 148500
        assert_eq!(compute_cts(6144, 48_000, 148_500_000), 148_500);
        assert_eq!(compute_cts(6144, 0, 148_500_000), 0);
    }

    #[tokio::test]
    async fn params_and_clock_update_acr() {
        let audio = HdmiAudio::new();
        audio.set_tmds_clock(148_500_000).await;
        let st = audio
            .set_params(AudioParams::new(48_000, 24, 2, false).unwrap())
            .await;
        assert_eq!(st.n, 6144);
        assert_eq!(st.cts, 148_500);

        let st = audio.set_tmds_clock(297_000_000).await;
        assert_eq!(st.cts, 297_000);
        assert_eq!(audio.state(), st);
    }

    #[test]
    fn enable_disable() {
        let audio = HdmiAudio::new();
        audio.enable();
        assert!(audio.state().enabled);
        audio.disable();
        assert!(!audio.state().enabled);
    }

    static PLUGGED: AtomicU8 = AtomicU8::new(0);

    fn record(plugged: bool) {
        PLUGGED.store(if plugged { 2 } else { 1 }, Ordering::SeqCst);
    }

    #[test]
    fn plugged_callback_gets_current_state_then_changes() {
        let audio = HdmiAudio::new();
        audio.handle_plugged_change(true);
        assert_eq!(PLUGGED.load(Ordering::SeqCst), 0);

        audio.set_plugged_callback(record, true);
        assert_eq!(PLUGGED.load(Ordering::SeqCst), 2);
        audio.handle_plugged_change(false);
        assert_eq!(PLUGGED.load(Ordering::SeqCst), 1);
    }
}
