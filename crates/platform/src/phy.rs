//! PHY and bind-time resource seams
//!
//! The transmitter core never touches PHY registers itself. The SoC glue
//! supplies an [`HdmiPhy`] (the vendor PHY operation set) and a
//! [`BindResources`] implementation that owns register mapping, interrupt
//! registration and DDC adapter registration.

use crate::display::{ConnectorStatus, DisplayInfo, DisplayMode};
use crate::register::RegisterSpace;

/// Vendor PHY operation set.
pub trait HdmiPhy {
    /// Error returned by [`HdmiPhy::init`].
    type Error: core::fmt::Debug;

    /// Human-readable PHY name.
    fn name(&self) -> &'static str;

    /// Power up and configure the PHY for `mode` on a sink described by `info`.
    fn init(&mut self, info: &DisplayInfo, mode: &DisplayMode) -> Result<(), Self::Error>;

    /// Power the PHY down.
    fn disable(&mut self);

    /// Read the hot-plug detect line.
    fn read_hpd(&mut self) -> ConnectorStatus;

    /// Configure hot-plug detection. Optional.
    fn setup_hpd(&mut self) {}
}

/// Kinds of platform resource acquired during bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResourceKind {
    /// Register window mapping.
    Registers,
    /// Interrupt line registration.
    Irq,
    /// DDC bus adapter registration.
    DdcAdapter,
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Registers => write!(f, "register window"),
            Self::Irq => write!(f, "interrupt line"),
            Self::DdcAdapter => write!(f, "DDC adapter"),
        }
    }
}

/// Platform resources consumed by the transmitter bind sequence.
///
/// Acquisitions happen in declaration order; release methods are called in
/// reverse order on unwind and unbind. Dropping the mapped registers
/// releases the mapping.
pub trait BindResources {
    /// Mapped register window.
    type Regs: RegisterSpace;
    /// Vendor PHY.
    type Phy: HdmiPhy;

    /// Map the controller registers.
    fn map_registers(&mut self) -> Result<Self::Regs, ResourceKind>;

    /// Hand over the vendor PHY, `None` if the platform has none.
    fn take_phy(&mut self) -> Option<Self::Phy>;

    /// Register the shared interrupt line.
    fn request_irq(&mut self) -> Result<(), ResourceKind>;

    /// Unregister the interrupt line.
    fn free_irq(&mut self);

    /// Register the DDC bus adapter.
    fn add_ddc_adapter(&mut self) -> Result<(), ResourceKind>;

    /// Unregister the DDC bus adapter.
    fn del_ddc_adapter(&mut self);
}
