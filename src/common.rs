use num::integer::Integer;
use num_traits::{Bounded, NumCast};
use std::ops::{Index, IndexMut};

/// Number of coefficients in a coefficient group (4x4).
pub const CG_SIZE: usize = 16;
pub const CG_LOG2_WIDTH: usize = 2;
pub const CG_WIDTH: usize = 1 << CG_LOG2_WIDTH;

pub const MAX_SHIFT: i32 = 31;
pub const MAX_SCALE: i32 = u16::MAX as i32;
pub const MAX_DEQUANT_ADD: i32 = u16::MAX as i32;

pub const MIN_BLOCK_LOG2_SIZE: usize = 2;
pub const MAX_BLOCK_LOG2_SIZE: usize = 6;

/// Floor division by `2^shift`, rounding toward negative infinity for
/// negative `v` regardless of the platform's shift semantics.
#[inline(always)]
pub fn floor_shr(v: i64, shift: u32) -> i64 {
    debug_assert!(shift < 63);
    Integer::div_floor(&v, &(1i64 << shift))
}

/// Clamps `v` into the range of `T`.
#[inline(always)]
pub fn saturate<T: Bounded + NumCast>(v: i64) -> T {
    match T::from(v) {
        Some(t) => t,
        None if v < 0 => T::min_value(),
        None => T::max_value(),
    }
}

#[inline(always)]
pub fn debug_check_cg_len(len: usize) {
    debug_assert!(
        len % CG_SIZE == 0,
        "block length {} is not a multiple of {}",
        len,
        CG_SIZE
    );
}

/// Row-major coefficient storage with a power-of-two row stride.
///
/// Rows are `1 << log2_stride` elements apart, so a block may sit inside a
/// wider buffer and still be addressed coefficient group by coefficient group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoeffBlock {
    pub data: Vec<i16>,
    pub width: usize,
    pub height: usize,
    pub log2_stride: usize,
}

impl CoeffBlock {
    pub fn new(width: usize, height: usize) -> CoeffBlock {
        let log2_stride = (width * 2 - 1).ilog2() as usize;
        CoeffBlock::with_stride(width, height, log2_stride)
    }

    pub fn with_stride(width: usize, height: usize, log2_stride: usize) -> CoeffBlock {
        debug_assert!(width % CG_WIDTH == 0 && height % CG_WIDTH == 0);
        debug_assert!(width <= 1 << log2_stride);
        CoeffBlock {
            data: vec![0; height << log2_stride],
            width,
            height,
            log2_stride,
        }
    }

    /// Copies a dense `width * height` raster into a new block.
    pub fn from_raster(width: usize, height: usize, raster: &[i16]) -> CoeffBlock {
        let mut block = CoeffBlock::new(width, height);
        for (y, src) in raster.chunks_exact(width).take(height).enumerate() {
            block[y].copy_from_slice(src);
        }
        block
    }

    pub fn to_raster(&self) -> Vec<i16> {
        let mut raster = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            raster.extend_from_slice(&self[y]);
        }
        raster
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        1 << self.log2_stride
    }

    /// Coefficient group columns and rows.
    pub fn cg_dims(&self) -> (usize, usize) {
        (
            self.width >> CG_LOG2_WIDTH,
            self.height >> CG_LOG2_WIDTH,
        )
    }

    #[inline(always)]
    fn cg_offset(&self, cg_x: usize, cg_y: usize) -> usize {
        ((cg_y << CG_LOG2_WIDTH) << self.log2_stride) + (cg_x << CG_LOG2_WIDTH)
    }

    /// Storage starting at the top-left coefficient of a coefficient group.
    #[inline(always)]
    pub fn cg(&self, cg_x: usize, cg_y: usize) -> &[i16] {
        &self.data[self.cg_offset(cg_x, cg_y)..]
    }

    #[inline(always)]
    pub fn cg_mut(&mut self, cg_x: usize, cg_y: usize) -> &mut [i16] {
        let offset = self.cg_offset(cg_x, cg_y);
        &mut self.data[offset..]
    }

    /// Writes 16 raster-ordered coefficients into a coefficient group.
    pub fn put_cg(&mut self, cg_x: usize, cg_y: usize, cg: &[i16; CG_SIZE]) {
        let log2_stride = self.log2_stride;
        let dst = self.cg_mut(cg_x, cg_y);
        for (y, row) in cg.chunks_exact(CG_WIDTH).enumerate() {
            let offset = y << log2_stride;
            dst[offset..offset + CG_WIDTH].copy_from_slice(row);
        }
    }

    pub fn fill(&mut self, v: i16) {
        self.data.fill(v);
    }
}

impl Index<usize> for CoeffBlock {
    type Output = [i16];
    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        let offset = index << self.log2_stride;
        &self.data[offset..offset + self.width]
    }
}

impl IndexMut<usize> for CoeffBlock {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut [i16] {
        let offset = index << self.log2_stride;
        &mut self.data[offset..offset + self.width]
    }
}
