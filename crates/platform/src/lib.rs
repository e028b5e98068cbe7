//! Platform seams for the DW HDMI QP transmitter core
//!
//! This crate holds the trait-based boundary between the transmitter core
//! and everything around it, so the core can be developed and tested
//! without hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Display pipeline (modes, connectors, EDID parsing)
//!         ↓  Bridge hooks
//! Transmitter core (dw-hdmi-qp crate)
//!         ↓  RegisterSpace / HdmiPhy / BindResources
//! Platform (this crate - trait abstractions)
//!         ↓
//! SoC glue (MMIO mapping, vendor PHY, interrupt controller)
//! ```
//!
//! # Modules
//!
//! - [`register`] - 32-bit register space and MMIO window
//! - [`phy`] - vendor PHY operation set and bind-time resources
//! - [`display`] - pipeline types and the [`Bridge`] hook trait
//! - [`audio`] - validated HDMI audio parameters
//! - [`config`] - per-SoC platform data
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls (for testing)
//! - `defmt`: `defmt::Format` derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
pub mod config;
pub mod display;
pub mod phy;
pub mod register;

pub use audio::{AudioParamError, AudioParams};
pub use config::{ModeValidFn, PlatformData};
pub use display::{
    AttachFlags, Bridge, Chromaticity, ColorEncoding, ConnectorForce, ConnectorState,
    ConnectorStatus, DisplayInfo, DisplayMode, Eotf, HdrOutputMetadata, HdrSinkMetadata,
    ModeFlags, ModeStatus, OutputFormat, PictureAspect, ScdcCaps,
};
pub use phy::{BindResources, HdmiPhy, ResourceKind};
pub use register::{Mmio, RegisterSpace};
