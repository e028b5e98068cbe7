//! Status and Control Data Channel helpers
//!
//! SCDC lives at I2C address 0x54 on the DDC bus. Registers are read with a
//! one-byte offset write followed by a one-byte read and written as an
//! `[offset, value]` pair. Works over any `embedded_hal_async` I2C bus.

use embedded_hal_async::i2c::I2c;
use platform::{DisplayInfo, PlatformData};

use crate::registers::HDMI14_MAX_TMDSCLK;

/// SCDC slave address.
pub const SCDC_I2C_SLAVE_ADDRESS: u8 = 0x54;

/// Sink SCDC version.
pub const SCDC_SINK_VERSION: u8 = 0x01;
/// Source SCDC version.
pub const SCDC_SOURCE_VERSION: u8 = 0x02;
/// TMDS configuration.
pub const SCDC_TMDS_CONFIG: u8 = 0x20;
/// TMDS bit clock ratio 1/40.
pub const SCDC_TMDS_BIT_CLOCK_RATIO_BY_40: u8 = 1 << 1;
/// Scrambling enable.
pub const SCDC_SCRAMBLING_ENABLE: u8 = 1 << 0;

/// Read one SCDC register.
pub async fn read_byte<I: I2c>(i2c: &mut I, offset: u8) -> Result<u8, I::Error> {
    let mut value = [0u8];
    i2c.write_read(SCDC_I2C_SLAVE_ADDRESS, &[offset], &mut value)
        .await?;
    let [byte] = value;
    Ok(byte)
}

/// Write one SCDC register.
pub async fn write_byte<I: I2c>(i2c: &mut I, offset: u8, value: u8) -> Result<(), I::Error> {
    i2c.write(SCDC_I2C_SLAVE_ADDRESS, &[offset, value]).await
}

async fn update_tmds_config<I: I2c>(
    i2c: &mut I,
    bit: u8,
    enable: bool,
) -> Result<(), I::Error> {
    let mut config = read_byte(i2c, SCDC_TMDS_CONFIG).await?;
    if enable {
        config |= bit;
    } else {
        config &= !bit;
    }
    write_byte(i2c, SCDC_TMDS_CONFIG, config).await
}

/// Ask the sink for the 1/40 TMDS bit clock ratio.
pub async fn set_high_tmds_clock_ratio<I: I2c>(i2c: &mut I, enable: bool) -> Result<(), I::Error> {
    update_tmds_config(i2c, SCDC_TMDS_BIT_CLOCK_RATIO_BY_40, enable).await
}

/// Ask the sink to descramble.
pub async fn set_scrambling<I: I2c>(i2c: &mut I, enable: bool) -> Result<(), I::Error> {
    update_tmds_config(i2c, SCDC_SCRAMBLING_ENABLE, enable).await
}

/// True if SCDC may be used with this sink.
///
/// Needs an SCDC-capable controller revision, a DDC bus, a sink with SCDC
/// and scrambling, and either scrambling at low rates or a sink that can
/// run above the HDMI 1.4 ceiling at all.
pub fn supports_scdc(config: &PlatformData, has_ddc: bool, info: &DisplayInfo) -> bool {
    if !config.supports_scdc_revision() || !has_ddc {
        return false;
    }

    if !info.scdc.supported || !info.scdc.scrambling_supported {
        return false;
    }

    let max_tmds_hz = u64::from(info.max_tmds_clock_khz).saturating_mul(1000);
    if !info.scdc.scrambling_low_rates && max_tmds_hz <= HDMI14_MAX_TMDSCLK {
        return false;
    }

    true
}
