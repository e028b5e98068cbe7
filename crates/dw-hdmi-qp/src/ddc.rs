//! DDC bus adapter and EDID block reads
//!
//! [`DdcBus`] exposes the internal engine as an `embedded_hal_async` I2C bus
//! so sink-side helpers (SCDC, EDID tools) can stay bus-agnostic. E-DDC
//! segment addressing needs two slave addresses in one transfer and is
//! therefore done on the engine directly by [`read_edid`].

use embedded_hal::i2c::{ErrorType, Operation};
use embedded_hal_async::i2c::I2c;
use heapless::Vec;
use platform::RegisterSpace;

use crate::error::HdmiError;
use crate::i2c::{I2cEngine, I2cMsg};
use crate::registers::{DDC_ADDR, DDC_SEGMENT_ADDR};

/// Most operations accepted in one bus transaction.
pub const MAX_TRANSACTION_OPS: usize = 8;

/// EDID block size.
pub const EDID_BLOCK_LEN: usize = 128;
/// Largest EDID read: base block plus three extensions.
pub const EDID_MAX_LEN: usize = 4 * EDID_BLOCK_LEN;
/// Offset of the extension count in the base block.
const EDID_EXTENSION_COUNT: usize = 126;

/// The controller's DDC engine as an I2C bus.
pub struct DdcBus<'a, R> {
    regs: &'a R,
    engine: &'a I2cEngine,
}

impl<'a, R: RegisterSpace> DdcBus<'a, R> {
    /// Bus over `engine` driving `regs`.
    pub fn new(regs: &'a R, engine: &'a I2cEngine) -> Self {
        Self { regs, engine }
    }
}

impl<R> ErrorType for DdcBus<'_, R> {
    type Error = HdmiError;
}

impl<R: RegisterSpace> I2c for DdcBus<'_, R> {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut msgs: Vec<I2cMsg<'_>, MAX_TRANSACTION_OPS> = Vec::new();

        for op in operations.iter_mut() {
            let op = match op {
                Operation::Read(buf) => Operation::Read(&mut **buf),
                Operation::Write(buf) => Operation::Write(&**buf),
            };
            msgs.push(I2cMsg { addr: address, op })
                .map_err(|_| HdmiError::Unsupported)?;
        }

        self.engine.transfer(self.regs, &mut msgs).await.map(|_| ())
    }
}

/// Read one 128-byte EDID block.
///
/// Blocks 0 and 1 live in segment 0 and are read with a plain offset
/// write; higher blocks program the segment pointer first.
pub async fn read_edid_block<R: RegisterSpace>(
    regs: &R,
    engine: &I2cEngine,
    block: u8,
    buf: &mut [u8],
) -> Result<(), HdmiError> {
    let segment = [block / 2];
    let offset = [if block % 2 == 0 { 0x00 } else { 0x80 }];

    if block < 2 {
        let mut msgs = [I2cMsg::write(DDC_ADDR, &offset), I2cMsg::read(DDC_ADDR, buf)];
        engine.transfer(regs, &mut msgs).await?;
    } else {
        let mut msgs = [
            I2cMsg::write(DDC_SEGMENT_ADDR, &segment),
            I2cMsg::write(DDC_ADDR, &offset),
            I2cMsg::read(DDC_ADDR, buf),
        ];
        engine.transfer(regs, &mut msgs).await?;
    }

    Ok(())
}

/// Read the base EDID block and the extensions it announces into `buf`.
///
/// Stops at whichever is smaller: the announced block count, four blocks,
/// or the room in `buf`. Returns the number of bytes read.
pub async fn read_edid<R: RegisterSpace>(
    regs: &R,
    engine: &I2cEngine,
    buf: &mut [u8],
) -> Result<usize, HdmiError> {
    let Some(base) = buf.get_mut(..EDID_BLOCK_LEN) else {
        return Err(HdmiError::Unsupported);
    };
    read_edid_block(regs, engine, 0, base).await?;

    let extensions = buf.get(EDID_EXTENSION_COUNT).copied().unwrap_or(0);
    let room = buf.len().min(EDID_MAX_LEN) / EDID_BLOCK_LEN;
    let blocks = usize::from(extensions).saturating_add(1).min(room);

    for (block, chunk) in buf
        .chunks_exact_mut(EDID_BLOCK_LEN)
        .enumerate()
        .take(blocks)
        .skip(1)
    {
        let block = u8::try_from(block).map_err(|_| HdmiError::Unsupported)?;
        read_edid_block(regs, engine, block, chunk).await?;
    }

    Ok(blocks.saturating_mul(EDID_BLOCK_LEN))
}
