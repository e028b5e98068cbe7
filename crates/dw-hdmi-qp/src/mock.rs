//! Host-side simulator for testing without hardware
//!
//! - [`SimRegisters`]: the controller register file plus a DDC sink model.
//!   Starting an I2C operation completes it immediately (or not at all, see
//!   [`SinkBehavior`]) and latches the matching bits in
//!   `MAINUNIT_1_INT_STATUS`, which [`SimRegisters::irq_pending`] reports
//!   through the unit 1 mask.
//! - [`MockPhy`] + [`PhyLog`]: a PHY that records calls.
//! - [`MockResources`]: bind-time resources with failure injection.
//! - [`run_with_irq`]: drives an interrupt handler while a future runs.

#![allow(clippy::indexing_slicing)] // register file indexed by checked offsets
#![allow(clippy::arithmetic_side_effects)]

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use heapless::Vec;
use platform::{
    BindResources, ConnectorStatus, DisplayInfo, DisplayMode, HdmiPhy, RegisterSpace,
    ResourceKind,
};

use crate::i2c::IrqReturn;
use crate::registers::*;
use crate::scdc::{SCDC_I2C_SLAVE_ADDRESS, SCDC_SINK_VERSION};

/// Number of 32-bit registers in the map.
pub const REG_WORDS: usize = (EARCRX_1_INT_FORCE as usize / 4) + 1;

/// How the simulated sink answers DDC operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkBehavior {
    /// Acknowledge every byte.
    #[default]
    Ack,
    /// Refuse every byte.
    Nack,
    /// Never answer; operations time out.
    Silent,
}

/// Simulated DDC sink: EDID (two segments), SCDC and a catch-all device.
struct SimSink {
    behavior: SinkBehavior,
    edid: [u8; 512],
    scdc: [u8; 256],
    other: [u8; 256],
}

impl SimSink {
    fn new() -> Self {
        let mut edid = [0u8; 512];
        let mut other = [0u8; 256];
        for (i, b) in edid.iter_mut().enumerate() {
            *b = i as u8;
        }
        for (i, b) in other.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut scdc = [0u8; 256];
        scdc[usize::from(SCDC_SINK_VERSION)] = 1;
        Self {
            behavior: SinkBehavior::Ack,
            edid,
            scdc,
            other,
        }
    }

    fn slot(&mut self, addr: u8, segment: u8, reg: u8) -> &mut u8 {
        match addr {
            DDC_ADDR => {
                let idx = (usize::from(segment) * 256 + usize::from(reg)) % self.edid.len();
                &mut self.edid[idx]
            }
            SCDC_I2C_SLAVE_ADDRESS => &mut self.scdc[usize::from(reg)],
            _ => &mut self.other[usize::from(reg)],
        }
    }
}

/// Simulated controller register file.
pub struct SimRegisters {
    regs: RefCell<[u32; REG_WORDS]>,
    sink: RefCell<SimSink>,
    writes: Cell<usize>,
    soft_resets: Cell<usize>,
    ops: Cell<usize>,
}

impl SimRegisters {
    /// All registers zero, sink acknowledging.
    pub fn new() -> Self {
        Self {
            regs: RefCell::new([0; REG_WORDS]),
            sink: RefCell::new(SimSink::new()),
            writes: Cell::new(0),
            soft_resets: Cell::new(0),
            ops: Cell::new(0),
        }
    }

    fn index(offset: u32) -> Option<usize> {
        if offset % 4 != 0 || offset > EARCRX_1_INT_FORCE {
            return None;
        }
        Some(offset as usize / 4)
    }

    /// Read a register without side effects.
    pub fn peek(&self, offset: u32) -> u32 {
        Self::index(offset).map_or(0, |i| self.regs.borrow()[i])
    }

    /// Set a register without side effects or write accounting.
    pub fn poke(&self, offset: u32, value: u32) {
        if let Some(i) = Self::index(offset) {
            self.regs.borrow_mut()[i] = value;
        }
    }

    /// Total writes through [`RegisterSpace`].
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Writes of the soft-reset value to `I2CM_CONTROL0`.
    pub fn soft_reset_count(&self) -> usize {
        self.soft_resets.get()
    }

    /// I2C operations started.
    pub fn op_count(&self) -> usize {
        self.ops.get()
    }

    /// Change how the sink answers.
    pub fn set_sink_behavior(&self, behavior: SinkBehavior) {
        self.sink.borrow_mut().behavior = behavior;
    }

    /// Sink register content. EDID offsets above 255 address segment 1.
    pub fn sink_byte(&self, addr: u8, offset: u16) -> u8 {
        let [lo, hi] = offset.to_le_bytes();
        *self.sink.borrow_mut().slot(addr, hi, lo)
    }

    /// Preset sink register content.
    pub fn set_sink_byte(&self, addr: u8, offset: u16, value: u8) {
        let [lo, hi] = offset.to_le_bytes();
        *self.sink.borrow_mut().slot(addr, hi, lo) = value;
    }

    /// True while an enabled unit 1 interrupt is latched.
    pub fn irq_pending(&self) -> bool {
        self.peek(MAINUNIT_1_INT_STATUS) & self.peek(MAINUNIT_1_INT_MASK_N) != 0
    }

    fn latch(&self, bits: u32) {
        let stat = self.peek(MAINUNIT_1_INT_STATUS);
        self.poke(MAINUNIT_1_INT_STATUS, stat | bits);
    }

    fn run_op(&self, ctrl: u32, op: u32) {
        self.ops.set(self.ops.get() + 1);

        let behavior = self.sink.borrow().behavior;
        match behavior {
            SinkBehavior::Silent => return,
            SinkBehavior::Nack => {
                self.latch(I2CM_NACK_RCVD_IRQ);
                return;
            }
            SinkBehavior::Ack => {}
        }

        let addr = ((ctrl & I2CM_SLVADDR) >> I2CM_SLVADDR_SHIFT) as u8;
        let reg = ((ctrl & I2CM_ADDR) >> I2CM_ADDR_SHIFT) as u8;

        if op & I2CM_FM_WRITE != 0 {
            let byte = (self.peek(I2CM_INTERFACE_WRDATA_0_3) & 0xff) as u8;
            *self.sink.borrow_mut().slot(addr, 0, reg) = byte;
        } else {
            let segment = if op & I2CM_EXT_READ != 0 {
                ((self.peek(I2CM_INTERFACE_CONTROL1) & I2CM_SEG_PTR) >> I2CM_SEG_PTR_SHIFT) as u8
            } else {
                0
            };
            let byte = *self.sink.borrow_mut().slot(addr, segment, reg);
            self.poke(I2CM_INTERFACE_RDDATA_0_3, u32::from(byte));
        }

        self.latch(I2CM_OP_DONE_IRQ);
    }
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterSpace for SimRegisters {
    fn read(&self, offset: u32) -> u32 {
        self.peek(offset)
    }

    fn write(&self, offset: u32, value: u32) {
        self.writes.set(self.writes.get() + 1);

        match offset {
            MAINUNIT_1_INT_CLEAR => {
                let stat = self.peek(MAINUNIT_1_INT_STATUS);
                self.poke(MAINUNIT_1_INT_STATUS, stat & !value);
            }
            I2CM_CONTROL0 => {
                if value == I2CM_SOFT_RESET {
                    self.soft_resets.set(self.soft_resets.get() + 1);
                }
                self.poke(offset, value);
            }
            I2CM_INTERFACE_CONTROL0 => {
                // operation bits are self-clearing
                let op = value & (I2CM_FM_READ | I2CM_FM_WRITE | I2CM_EXT_READ);
                self.poke(offset, value & !op);
                if op != 0 {
                    self.run_op(value, op);
                }
            }
            _ => self.poke(offset, value),
        }
    }
}

/// Shared record of what a [`MockPhy`] was asked to do.
#[derive(Debug, Default)]
pub struct PhyLog {
    /// `init` calls.
    pub inits: Cell<u32>,
    /// `disable` calls.
    pub disables: Cell<u32>,
    /// `setup_hpd` calls.
    pub hpd_setups: Cell<u32>,
    /// Make the next `init` calls fail.
    pub fail_init: Cell<bool>,
    /// Value returned by `read_hpd`.
    pub hpd: Cell<ConnectorStatus>,
    /// Mode passed to the last `init`.
    pub last_mode: Cell<Option<DisplayMode>>,
}

/// Error from a failing [`MockPhy::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPhyError;

/// PHY that records calls into a [`PhyLog`].
pub struct MockPhy<'a> {
    log: &'a PhyLog,
}

impl<'a> MockPhy<'a> {
    /// PHY reporting into `log`.
    pub fn new(log: &'a PhyLog) -> Self {
        Self { log }
    }
}

impl HdmiPhy for MockPhy<'_> {
    type Error = MockPhyError;

    fn name(&self) -> &'static str {
        "mock-hdptx"
    }

    fn init(&mut self, _info: &DisplayInfo, mode: &DisplayMode) -> Result<(), Self::Error> {
        self.log.inits.set(self.log.inits.get() + 1);
        self.log.last_mode.set(Some(*mode));
        if self.log.fail_init.get() {
            Err(MockPhyError)
        } else {
            Ok(())
        }
    }

    fn disable(&mut self) {
        self.log.disables.set(self.log.disables.get() + 1);
    }

    fn read_hpd(&mut self) -> ConnectorStatus {
        self.log.hpd.get()
    }

    fn setup_hpd(&mut self) {
        self.log.hpd_setups.set(self.log.hpd_setups.get() + 1);
    }
}

/// Resource acquisitions and releases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    /// Registers mapped.
    MapRegisters,
    /// Interrupt requested.
    RequestIrq,
    /// Interrupt freed.
    FreeIrq,
    /// DDC adapter added.
    AddDdcAdapter,
    /// DDC adapter removed.
    DelDdcAdapter,
}

/// Bind-time resources over a [`SimRegisters`].
pub struct MockResources<'a> {
    regs: &'a SimRegisters,
    phy: Option<MockPhy<'a>>,
    /// Fail the acquisition of this resource.
    pub fail: Option<ResourceKind>,
    /// Event log.
    pub events: Vec<ResourceEvent, 16>,
}

impl<'a> MockResources<'a> {
    /// Resources with a vendor PHY.
    pub fn new(regs: &'a SimRegisters, phy: MockPhy<'a>) -> Self {
        Self {
            regs,
            phy: Some(phy),
            fail: None,
            events: Vec::new(),
        }
    }

    /// Resources without any PHY.
    pub fn without_phy(regs: &'a SimRegisters) -> Self {
        Self {
            regs,
            phy: None,
            fail: None,
            events: Vec::new(),
        }
    }

    fn record(&mut self, event: ResourceEvent) {
        let _ = self.events.push(event);
    }

    fn acquire(&mut self, kind: ResourceKind, event: ResourceEvent) -> Result<(), ResourceKind> {
        if self.fail == Some(kind) {
            return Err(kind);
        }
        self.record(event);
        Ok(())
    }
}

impl<'a> BindResources for MockResources<'a> {
    type Regs = &'a SimRegisters;
    type Phy = MockPhy<'a>;

    fn map_registers(&mut self) -> Result<Self::Regs, ResourceKind> {
        self.acquire(ResourceKind::Registers, ResourceEvent::MapRegisters)?;
        Ok(self.regs)
    }

    fn take_phy(&mut self) -> Option<Self::Phy> {
        self.phy.take()
    }

    fn request_irq(&mut self) -> Result<(), ResourceKind> {
        self.acquire(ResourceKind::Irq, ResourceEvent::RequestIrq)
    }

    fn free_irq(&mut self) {
        self.record(ResourceEvent::FreeIrq);
    }

    fn add_ddc_adapter(&mut self) -> Result<(), ResourceKind> {
        self.acquire(ResourceKind::DdcAdapter, ResourceEvent::AddDdcAdapter)
    }

    fn del_ddc_adapter(&mut self) {
        self.record(ResourceEvent::DelDdcAdapter);
    }
}

async fn pump_irq(sim: &SimRegisters, mut irq: impl FnMut() -> IrqReturn) -> Infallible {
    loop {
        if sim.irq_pending() {
            irq();
        }
        yield_now().await;
    }
}

/// Poll `fut` to completion, calling `irq` whenever `sim` has an enabled
/// interrupt latched, the way the interrupt controller would.
pub async fn run_with_irq<F: Future>(
    sim: &SimRegisters,
    irq: impl FnMut() -> IrqReturn,
    fut: F,
) -> F::Output {
    match select(fut, pump_irq(sim, irq)).await {
        Either::First(out) => out,
        Either::Second(never) => match never {},
    }
}
