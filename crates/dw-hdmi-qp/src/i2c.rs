//! DDC transaction engine
//!
//! The controller's I2C master moves one byte per operation. Every byte is
//! armed, started, and then waited for: the interrupt handler latches the
//! I2C status bits, clears them in hardware and hands the snapshot to the
//! waiting task through a single-slot [`Signal`]. A byte that does not
//! complete within [`I2C_TIMEOUT`] soft-resets the master and fails the
//! transfer.
//!
//! Whole multi-message transfers are serialised by an async mutex, so the
//! engine never has more than one byte in flight. The interrupt handler
//! takes no engine lock.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};
use embedded_hal::i2c::Operation;
use platform::RegisterSpace;

use crate::error::HdmiError;
use crate::registers::*;

/// Completion deadline for a single DDC byte.
pub const I2C_TIMEOUT: Duration = Duration::from_millis(100);

/// I2C status bits the engine reacts to.
const I2CM_IRQ_MASK: u32 = I2CM_OP_DONE_IRQ | I2CM_READ_REQUEST_IRQ | I2CM_NACK_RCVD_IRQ;

/// Outcome of an interrupt handler invocation on a shared line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqReturn {
    /// The controller raised the line.
    Handled,
    /// Not ours.
    None,
}

/// One message of a DDC transfer.
pub struct I2cMsg<'a> {
    /// 7-bit slave address.
    pub addr: u8,
    /// Direction and buffer.
    pub op: Operation<'a>,
}

impl<'a> I2cMsg<'a> {
    /// Read `buf.len()` bytes from `addr`.
    pub fn read(addr: u8, buf: &'a mut [u8]) -> Self {
        Self {
            addr,
            op: Operation::Read(buf),
        }
    }

    /// Write `buf` to `addr`.
    pub fn write(addr: u8, buf: &'a [u8]) -> Self {
        Self {
            addr,
            op: Operation::Write(buf),
        }
    }

    /// Payload length.
    pub fn len(&self) -> usize {
        match &self.op {
            Operation::Read(buf) => buf.len(),
            Operation::Write(buf) => buf.len(),
        }
    }

    /// True for a zero-length message.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_segment_pointer(&self) -> bool {
        self.addr == DDC_SEGMENT_ADDR && self.len() == 1
    }
}

/// Per-transfer addressing state. Only touched with the transfer lock held.
#[derive(Debug, Default)]
struct I2cState {
    /// Register address of the next byte.
    slave_reg: u8,
    /// `slave_reg` has been set for this transfer.
    is_regaddr: bool,
    /// A segment pointer was programmed and the next read is extended.
    is_segment: bool,
}

/// DDC engine state shared between task and interrupt context.
pub struct I2cEngine {
    state: Mutex<CriticalSectionRawMutex, I2cState>,
    cmp: Signal<CriticalSectionRawMutex, u32>,
}

impl I2cEngine {
    /// Idle engine.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(I2cState {
                slave_reg: 0,
                is_regaddr: false,
                is_segment: false,
            }),
            cmp: Signal::new(),
        }
    }

    /// Reset the I2C master, program fast-mode timing, select standard mode
    /// and drop any latched completion.
    pub fn init<R: RegisterSpace>(&self, regs: &R) {
        regs.write(I2CM_CONTROL0, I2CM_SOFT_RESET);
        regs.write(I2CM_FM_SCL_CONFIG0, I2CM_FM_SCL_TIMING);
        regs.modify(I2CM_INTERFACE_CONTROL0, I2CM_FM_EN, 0);
        regs.write(MAINUNIT_1_INT_CLEAR, I2CM_OP_DONE_CLEAR | I2CM_NACK_RCVD_CLEAR);
        self.cmp.reset();
    }

    /// [`init`](Self::init) once any transfer in flight has finished.
    pub async fn reinit<R: RegisterSpace>(&self, regs: &R) {
        let _st = self.state.lock().await;
        self.init(regs);
    }

    /// Interrupt-context half: latch, clear and signal.
    pub fn on_irq<R: RegisterSpace>(&self, regs: &R) -> IrqReturn {
        let stat = regs.read(MAINUNIT_1_INT_STATUS);
        let latched = stat & I2CM_IRQ_MASK;

        if latched != 0 {
            regs.write(MAINUNIT_1_INT_CLEAR, latched);
            self.cmp.signal(latched);
        }

        if stat == 0 {
            IrqReturn::None
        } else {
            IrqReturn::Handled
        }
    }

    /// Run a multi-message DDC transfer.
    ///
    /// Every message shares the slave address of the first one, except a
    /// one-byte message to the segment pointer address, which programs the
    /// segment register instead of moving data. Returns the number of
    /// messages on success; stops at the first failing byte.
    pub async fn transfer<R: RegisterSpace>(
        &self,
        regs: &R,
        msgs: &mut [I2cMsg<'_>],
    ) -> Result<usize, HdmiError> {
        let Some(first) = msgs.first() else {
            return Err(HdmiError::Unsupported);
        };
        if first.addr == DDC_CI_ADDR {
            return Err(HdmiError::Unsupported);
        }
        let mut addr = first.addr;
        if first.is_segment_pointer() {
            addr = DDC_ADDR;
        }

        let num = msgs.len();
        for (i, msg) in msgs.iter().enumerate() {
            if msg.is_empty() {
                error!("unsupported transfer {}/{}, no data", i.saturating_add(1), num);
                return Err(HdmiError::Unsupported);
            }
        }

        let mut st = self.state.lock().await;

        regs.modify(
            MAINUNIT_1_INT_MASK_N,
            I2CM_NACK_RCVD_MASK_N | I2CM_OP_DONE_MASK_N,
            I2CM_NACK_RCVD_MASK_N | I2CM_OP_DONE_MASK_N,
        );
        regs.modify(
            I2CM_INTERFACE_CONTROL0,
            I2CM_SLVADDR,
            u32::from(addr) << I2CM_SLVADDR_SHIFT,
        );
        st.is_regaddr = false;
        st.is_segment = false;

        let mut result = Ok(num);
        for msg in msgs.iter_mut() {
            let ret = if msg.is_segment_pointer() {
                st.is_segment = true;
                let segment = match &msg.op {
                    Operation::Read(buf) => buf.first().copied(),
                    Operation::Write(buf) => buf.first().copied(),
                }
                .unwrap_or(0);
                regs.modify(
                    I2CM_INTERFACE_CONTROL1,
                    I2CM_SEG_ADDR,
                    u32::from(DDC_SEGMENT_ADDR),
                );
                regs.modify(
                    I2CM_INTERFACE_CONTROL1,
                    I2CM_SEG_PTR,
                    u32::from(segment) << I2CM_SEG_PTR_SHIFT,
                );
                Ok(())
            } else {
                match &mut msg.op {
                    Operation::Read(buf) => self.read(regs, &mut st, buf).await,
                    Operation::Write(buf) => self.write(regs, &mut st, buf).await,
                }
            };

            if let Err(e) = ret {
                result = Err(e);
                break;
            }
        }

        regs.modify(
            MAINUNIT_1_INT_MASK_N,
            I2CM_NACK_RCVD_MASK_N | I2CM_OP_DONE_MASK_N,
            0,
        );

        result
    }

    async fn read<R: RegisterSpace>(
        &self,
        regs: &R,
        st: &mut I2cState,
        buf: &mut [u8],
    ) -> Result<(), HdmiError> {
        if !st.is_regaddr {
            debug!("set read register address to 0");
            st.slave_reg = 0x00;
            st.is_regaddr = true;
        }

        let op = if st.is_segment {
            I2CM_EXT_READ
        } else {
            I2CM_FM_READ
        };

        for byte in buf.iter_mut() {
            self.cmp.reset();

            regs.modify(
                I2CM_INTERFACE_CONTROL0,
                I2CM_ADDR,
                u32::from(st.slave_reg) << I2CM_ADDR_SHIFT,
            );
            st.slave_reg = st.slave_reg.wrapping_add(1);
            regs.modify(I2CM_INTERFACE_CONTROL0, I2CM_WR_MASK, op);

            self.wait_op(regs, "read").await?;

            *byte = (regs.read(I2CM_INTERFACE_RDDATA_0_3) & 0xff) as u8;
            regs.modify(I2CM_INTERFACE_CONTROL0, I2CM_WR_MASK, 0);
        }

        st.is_segment = false;

        Ok(())
    }

    async fn write<R: RegisterSpace>(
        &self,
        regs: &R,
        st: &mut I2cState,
        buf: &[u8],
    ) -> Result<(), HdmiError> {
        let mut data = buf;

        if !st.is_regaddr {
            // First byte is the register address.
            if let Some((reg, rest)) = data.split_first() {
                st.slave_reg = *reg;
                data = rest;
                st.is_regaddr = true;
            }
        }

        for &byte in data {
            self.cmp.reset();

            regs.write(I2CM_INTERFACE_WRDATA_0_3, u32::from(byte));
            regs.modify(
                I2CM_INTERFACE_CONTROL0,
                I2CM_ADDR,
                u32::from(st.slave_reg) << I2CM_ADDR_SHIFT,
            );
            st.slave_reg = st.slave_reg.wrapping_add(1);
            regs.modify(I2CM_INTERFACE_CONTROL0, I2CM_WR_MASK, I2CM_FM_WRITE);

            self.wait_op(regs, "write").await?;

            regs.modify(I2CM_INTERFACE_CONTROL0, I2CM_WR_MASK, 0);
        }

        Ok(())
    }

    async fn wait_op<R: RegisterSpace>(&self, regs: &R, dir: &str) -> Result<(), HdmiError> {
        match with_timeout(I2C_TIMEOUT, self.cmp.wait()).await {
            Err(_) => {
                error!("i2c {} timed out", dir);
                regs.write(I2CM_CONTROL0, I2CM_SOFT_RESET);
                Err(HdmiError::Timeout)
            }
            Ok(stat) if stat & I2CM_NACK_RCVD_IRQ != 0 => {
                error!("i2c {} nack", dir);
                regs.write(I2CM_CONTROL0, I2CM_SOFT_RESET);
                Err(HdmiError::Nack)
            }
            Ok(_) => Ok(()),
        }
    }
}

impl Default for I2cEngine {
    fn default() -> Self {
        Self::new()
    }
}
