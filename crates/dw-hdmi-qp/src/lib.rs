//! Synopsys DesignWare HDMI QP TX controller core
//!
//! Register-level driver for the HDMI 2.1 "QP" transmitter: DDC/I2C master,
//! bridge lifecycle, SCDC rate switching and AVI / dynamic-range infoframes.
//! The SoC glue supplies registers, PHY and interrupt wiring through the
//! `platform` traits.
//!
//! # Layout
//!
//! ```text
//! bridge    DwHdmiQp: bind / unbind / resume, update_power, setup, Bridge hooks
//!   ├── i2c        interrupt-driven DDC engine (100 ms per-byte timeout)
//!   ├── ddc        embedded-hal-async bus over the engine, EDID block reads
//!   ├── scdc       sink status and control channel helpers
//!   ├── infoframe  AVI and DRM frame packing
//!   ├── vmode      per-mode descriptor (TMDS rate, colorimetry)
//!   ├── power      force / rx-sense decision table
//!   └── audio      N/CTS and the plugged callback
//! registers  offsets and bit fields
//! mock       host simulator (register file + DDC sink, PHY, resources)
//! ```
//!
//! # Features
//!
//! - `std`: `std::error::Error` for [`HdmiError`]
//! - `defmt`: log through defmt and derive `defmt::Format`
//! - `tracing`: log through tracing (host builds)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

// must come first: the logging macros are textually scoped
#[macro_use]
mod fmt;

pub mod audio;
pub mod bridge;
pub mod ddc;
pub mod error;
pub mod i2c;
pub mod infoframe;
pub mod mock;
pub mod power;
pub mod registers;
pub mod scdc;
pub mod vmode;

pub use audio::{AudioState, HdmiAudio, PluggedCallback};
pub use bridge::{Attachment, DwHdmiQp};
pub use ddc::DdcBus;
pub use error::HdmiError;
pub use i2c::{I2cEngine, I2cMsg, IrqReturn, I2C_TIMEOUT};
pub use infoframe::{AviInfoframe, DrmInfoframe};
pub use power::TransmitterState;
pub use vmode::HdmiData;
