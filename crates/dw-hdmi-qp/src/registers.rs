//! DW HDMI QP TX register map
//!
//! Byte offsets from the controller base. All registers are 32 bits wide
//! and 4-byte aligned; the highest mapped register is
//! [`EARCRX_1_INT_FORCE`].
//!
//! # I2C master (DDC) programming model
//!
//! `I2CM_INTERFACE_CONTROL0` carries the slave address, the register
//! address and the operation bits. Writing one of the operation bits starts
//! a single-byte transfer; completion raises `I2CM_OP_DONE_IRQ` (or
//! `I2CM_NACK_RCVD_IRQ`) in `MAINUNIT_1_INT_STATUS`. Writing `0x01` to
//! `I2CM_CONTROL0` soft-resets the I2C master state machine.
//!
//! ## Segment pointer
//! E-DDC segment reads go through `I2CM_INTERFACE_CONTROL1`: the segment
//! address (0x30) and the segment number are latched there and applied by
//! the next extended read.
//!
//! # Packet contents layout
//! Each infoframe buffer starts with a header word (`version << 8 |
//! length << 16`) at `CONTENTS0`, followed by the frame bytes from the
//! checksum onward, four per register, little-endian.

// ---------------------------------------------------------------------------
// Identification / global
// ---------------------------------------------------------------------------

/// IP core identification.
pub const CORE_ID: u32 = 0x0;
/// IP version number.
pub const VER_NUMBER: u32 = 0x4;
/// IP version type.
pub const VER_TYPE: u32 = 0x8;
/// Synthesis configuration.
pub const CONFIG_REG: u32 = 0xc;

// ---------------------------------------------------------------------------
// Timer base
// ---------------------------------------------------------------------------

/// Timer base reference frequency.
pub const TIMER_BASE_CONFIG0: u32 = 0x80;
/// Timer base status.
pub const TIMER_BASE_STATUS0: u32 = 0x84;

/// Value programmed into `TIMER_BASE_CONFIG0` by `init_hw`.
pub const TIMER_BASE_REF_FREQ: u32 = 428_571_429;

// ---------------------------------------------------------------------------
// Clock management unit
// ---------------------------------------------------------------------------

/// CMU status.
pub const CMU_STATUS: u32 = 0xb0;
/// Display clock monitor field of `CMU_STATUS`.
pub const DISPLAY_CLK_MONITOR: u32 = 0x3f;
/// `DISPLAY_CLK_MONITOR` value when the display clock is locked.
pub const DISPLAY_CLK_LOCKED: u32 = 0x15;

// ---------------------------------------------------------------------------
// I2C master
// ---------------------------------------------------------------------------

/// Standard-mode SCL timing.
pub const I2CM_SM_SCL_CONFIG0: u32 = 0xe00;
/// Fast-mode SCL timing.
pub const I2CM_FM_SCL_CONFIG0: u32 = 0xe10;
/// Fast-mode SCL high/low counts programmed by the engine init.
pub const I2CM_FM_SCL_TIMING: u32 = 0x085c_085c;
/// I2C master configuration.
pub const I2CM_CONFIG0: u32 = 0xe40;
/// I2C master control. Writing [`I2CM_SOFT_RESET`] resets the state machine.
pub const I2CM_CONTROL0: u32 = 0xe44;
/// Software-reset value for `I2CM_CONTROL0`.
pub const I2CM_SOFT_RESET: u32 = 0x01;

/// Slave address, register address and operation.
pub const I2CM_INTERFACE_CONTROL0: u32 = 0xe48;
/// Register address field.
pub const I2CM_ADDR: u32 = 0xff000;
/// Shift of [`I2CM_ADDR`].
pub const I2CM_ADDR_SHIFT: u32 = 12;
/// 7-bit slave address field.
pub const I2CM_SLVADDR: u32 = 0xfe0;
/// Shift of [`I2CM_SLVADDR`].
pub const I2CM_SLVADDR_SHIFT: u32 = 5;
/// Operation bits.
pub const I2CM_WR_MASK: u32 = 0x1e;
/// Extended (segment) read.
pub const I2CM_EXT_READ: u32 = 1 << 4;
/// Short read.
pub const I2CM_SHORT_READ: u32 = 1 << 3;
/// Single-byte read.
pub const I2CM_FM_READ: u32 = 1 << 2;
/// Single-byte write.
pub const I2CM_FM_WRITE: u32 = 1 << 1;
/// Fast-mode enable.
pub const I2CM_FM_EN: u32 = 1 << 0;

/// Segment pointer programming.
pub const I2CM_INTERFACE_CONTROL1: u32 = 0xe4c;
/// Segment number field.
pub const I2CM_SEG_PTR: u32 = 0x7f80;
/// Shift of [`I2CM_SEG_PTR`].
pub const I2CM_SEG_PTR_SHIFT: u32 = 7;
/// Segment slave address field.
pub const I2CM_SEG_ADDR: u32 = 0x7f;

/// Write data, bytes 0..=3.
pub const I2CM_INTERFACE_WRDATA_0_3: u32 = 0xe50;
/// Write data, bytes 4..=7.
pub const I2CM_INTERFACE_WRDATA_4_7: u32 = 0xe54;
/// Write data, bytes 8..=11.
pub const I2CM_INTERFACE_WRDATA_8_11: u32 = 0xe58;
/// Write data, bytes 12..=15.
pub const I2CM_INTERFACE_WRDATA_12_15: u32 = 0xe5c;
/// Read data, bytes 0..=3.
pub const I2CM_INTERFACE_RDDATA_0_3: u32 = 0xe60;
/// Read data, bytes 4..=7.
pub const I2CM_INTERFACE_RDDATA_4_7: u32 = 0xe64;
/// Read data, bytes 8..=11.
pub const I2CM_INTERFACE_RDDATA_8_11: u32 = 0xe68;
/// Read data, bytes 12..=15.
pub const I2CM_INTERFACE_RDDATA_12_15: u32 = 0xe6c;

// ---------------------------------------------------------------------------
// HDCP / scrambler / link
// ---------------------------------------------------------------------------

/// HDCP 2.x logic configuration.
pub const HDCP2LOGIC_CONFIG0: u32 = 0x8e0;
/// Route video around the HDCP 2.x cipher.
pub const HDCP2_BYPASS: u32 = 1 << 0;

/// Scrambler configuration. 1 enables TMDS scrambling.
pub const SCRAMB_CONFIG0: u32 = 0x960;

/// Link configuration.
pub const LINK_CONFIG0: u32 = 0x968;
/// FRL on four lanes.
pub const OPMODE_FRL_4LANES: u32 = 1 << 8;
/// DVI operating mode (no data islands).
pub const OPMODE_DVI: u32 = 1 << 4;
/// FRL mode.
pub const OPMODE_FRL: u32 = 1 << 0;

// ---------------------------------------------------------------------------
// Packet scheduler
// ---------------------------------------------------------------------------

/// Packet scheduler configuration 1 (field-rate overrides).
pub const PKTSCHED_PKT_CONFIG1: u32 = 0xa9c;
/// DRM infoframe once per field.
pub const PKTSCHED_DRMI_FIELDRATE: u32 = 1 << 13;
/// AVI infoframe once per field.
pub const PKTSCHED_AVI_FIELDRATE: u32 = 1 << 12;

/// Packet transmission enables.
pub const PKTSCHED_PKT_EN: u32 = 0xaa8;
/// Dynamic range and mastering infoframe.
pub const PKTSCHED_DRMI_TX_EN: u32 = 1 << 17;
/// Audio infoframe.
pub const PKTSCHED_AUDI_TX_EN: u32 = 1 << 15;
/// AVI infoframe.
pub const PKTSCHED_AVI_TX_EN: u32 = 1 << 13;
/// CVTEM extended metadata packet.
pub const PKTSCHED_EMP_CVTEM_TX_EN: u32 = 1 << 10;
/// Audio metadata packet.
pub const PKTSCHED_AMD_TX_EN: u32 = 1 << 8;
/// General control packet.
pub const PKTSCHED_GCP_TX_EN: u32 = 1 << 3;
/// Audio sample packets.
pub const PKTSCHED_AUDS_TX_EN: u32 = 1 << 2;
/// Audio clock regeneration packets.
pub const PKTSCHED_ACR_TX_EN: u32 = 1 << 1;
/// Null packets.
pub const PKTSCHED_NULL_TX_EN: u32 = 1 << 0;

// ---------------------------------------------------------------------------
// Packet contents
// ---------------------------------------------------------------------------

/// AVI infoframe header word.
pub const PKT_AVI_CONTENTS0: u32 = 0xbe0;
/// First AVI infoframe payload word.
pub const PKT_AVI_CONTENTS1: u32 = 0xbe4;
/// AVI payload registers.
pub const PKT_AVI_WORDS: usize = 7;

/// DRM infoframe header word.
pub const PKT_DRMI_CONTENTS0: u32 = 0xc60;
/// First DRM infoframe payload word.
pub const PKT_DRMI_CONTENTS1: u32 = 0xc64;
/// DRM payload registers.
pub const PKT_DRMI_WORDS: usize = 7;

// ---------------------------------------------------------------------------
// Interrupts
// ---------------------------------------------------------------------------

/// Main unit 0 status.
pub const MAINUNIT_0_INT_STATUS: u32 = 0x3010;
/// Main unit 0 mask (1 = enabled).
pub const MAINUNIT_0_INT_MASK_N: u32 = 0x3014;
/// Main unit 0 clear.
pub const MAINUNIT_0_INT_CLEAR: u32 = 0x3018;
/// Main unit 0 force.
pub const MAINUNIT_0_INT_FORCE: u32 = 0x301c;

/// Main unit 1 status (I2C master events).
pub const MAINUNIT_1_INT_STATUS: u32 = 0x3020;
/// NACK received from the slave.
pub const I2CM_NACK_RCVD_IRQ: u32 = 1 << 2;
/// Slave read request.
pub const I2CM_READ_REQUEST_IRQ: u32 = 1 << 1;
/// Operation finished.
pub const I2CM_OP_DONE_IRQ: u32 = 1 << 0;

/// Main unit 1 mask (1 = enabled).
pub const MAINUNIT_1_INT_MASK_N: u32 = 0x3024;
/// Enable NACK interrupt.
pub const I2CM_NACK_RCVD_MASK_N: u32 = 1 << 2;
/// Enable read-request interrupt.
pub const I2CM_READ_REQUEST_MASK_N: u32 = 1 << 1;
/// Enable operation-done interrupt.
pub const I2CM_OP_DONE_MASK_N: u32 = 1 << 0;

/// Main unit 1 clear.
pub const MAINUNIT_1_INT_CLEAR: u32 = 0x3028;
/// Clear NACK latch.
pub const I2CM_NACK_RCVD_CLEAR: u32 = 1 << 2;
/// Clear read-request latch.
pub const I2CM_READ_REQUEST_CLEAR: u32 = 1 << 1;
/// Clear operation-done latch.
pub const I2CM_OP_DONE_CLEAR: u32 = 1 << 0;

/// Main unit 1 force.
pub const MAINUNIT_1_INT_FORCE: u32 = 0x302c;

/// eARC RX 1 force. Last register in the map.
pub const EARCRX_1_INT_FORCE: u32 = 0x482c;

// ---------------------------------------------------------------------------
// DDC / SCDC bus addresses and limits
// ---------------------------------------------------------------------------

/// DDC/CI command interface. Not routed through the internal engine.
pub const DDC_CI_ADDR: u8 = 0x37;
/// E-DDC segment pointer.
pub const DDC_SEGMENT_ADDR: u8 = 0x30;
/// EDID.
pub const DDC_ADDR: u8 = 0x50;

/// TMDS character rate ceiling of HDMI 1.4, in Hz. Above it the link
/// needs the 1/40 clock ratio and scrambling.
pub const HDMI14_MAX_TMDSCLK: u64 = 340_000_000;

/// SCDC version this source implements.
pub const SCDC_MIN_SOURCE_VERSION: u8 = 0x1;
