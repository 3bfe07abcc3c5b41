use super::common::*;
use super::error::CoeffError;

/// Block-scoped `(scale, shift, add)` triple handed down by rate control.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct QuantParams {
    pub scale: i32,
    pub shift: i32,
    pub add: i32,
}

impl QuantParams {
    /// Checked construction for the quantizer.
    pub fn new(scale: i32, shift: i32, add: i32) -> Result<QuantParams, CoeffError> {
        if !(0..=MAX_SHIFT).contains(&shift) {
            return Err(CoeffError::ShiftOutOfRange(shift));
        }
        if scale < 0 {
            return Err(CoeffError::NegativeScale(scale));
        }
        if scale > MAX_SCALE {
            return Err(CoeffError::ScaleOutOfRange(scale));
        }
        if add < 0 {
            return Err(CoeffError::NegativeAdd(add));
        }
        Ok(QuantParams { scale, shift, add })
    }

    /// Checked construction for the dequantizer, which additionally bounds
    /// `add` so that `level * scale + add` stays inside 32 bits.
    pub fn for_dequant(scale: i32, shift: i32, add: i32) -> Result<QuantParams, CoeffError> {
        let params = QuantParams::new(scale, shift, add)?;
        if add > MAX_DEQUANT_ADD {
            return Err(CoeffError::AddOutOfRange(add));
        }
        Ok(params)
    }

    /// Rounding offset of half a quantization step, `2^(shift-1)`.
    pub fn half_step(scale: i32, shift: i32) -> Result<QuantParams, CoeffError> {
        let add = if shift > 0 && shift <= MAX_SHIFT {
            1 << (shift - 1)
        } else {
            0
        };
        QuantParams::new(scale, shift, add)
    }

    /// Dead-zone offset `2^shift * num / den`, with `num / den` in `[0, 1)`.
    pub fn with_rounding(
        scale: i32,
        shift: i32,
        num: u32,
        den: u32,
    ) -> Result<QuantParams, CoeffError> {
        debug_assert!(den > 0 && num < den);
        if !(0..=MAX_SHIFT).contains(&shift) {
            return Err(CoeffError::ShiftOutOfRange(shift));
        }
        let add = ((1i64 << shift) * num as i64 / den.max(1) as i64) as i32;
        QuantParams::new(scale, shift, add)
    }

    #[inline(always)]
    pub fn debug_check(&self) {
        debug_assert!((0..=MAX_SHIFT).contains(&self.shift));
        debug_assert!(self.scale >= 0 && self.add >= 0);
    }
}

pub fn check_block_len(len: usize) -> Result<(), CoeffError> {
    if len % CG_SIZE == 0 {
        Ok(())
    } else {
        Err(CoeffError::UnalignedLength(len))
    }
}
