use super::codec::CoefficientCodec;
use super::common::*;
use super::error::CoeffError;
use super::scan::{pack_rows, ScanOrder};
use rand::Rng;

const MAX_GROUPS: usize = 16;

fn random_block<R: Rng>(rng: &mut R, len: usize) -> Vec<i16> {
    let mut block = vec![0i16; len];
    match rng.gen_range(0..3) {
        // sparse, mostly small values as they come out of a transform
        0 => block.iter_mut().for_each(|c| {
            if rng.gen_ratio(1, 4) {
                *c = rng.gen_range(-256..=256);
            }
        }),
        1 => rng.fill(&mut block[..]),
        _ => block
            .iter_mut()
            .for_each(|c| *c = [i16::MIN, i16::MAX, -1, 0, 1][rng.gen_range(0..5)]),
    }
    block
}

fn mismatch(op: &'static str, iteration: usize) -> CoeffError {
    CoeffError::TierMismatch { op, iteration }
}

/// Runs every operation on random in-range inputs through both codecs and
/// reports the first operation whose output differs.
pub fn compare_codecs<R: Rng>(
    codec: &dyn CoefficientCodec,
    reference: &dyn CoefficientCodec,
    rng: &mut R,
    iterations: usize,
) -> Result<(), CoeffError> {
    for iteration in 0..iterations {
        let len = rng.gen_range(1..=MAX_GROUPS) * CG_SIZE;
        let block = random_block(rng, len);
        let shift = rng.gen_range(0..=MAX_SHIFT);

        let scale = rng.gen_range(0..=MAX_SCALE);
        let add = if rng.gen() {
            rng.gen_range(0..=i32::MAX)
        } else {
            (1i64 << shift >> 1) as i32
        };
        let mut a = block.clone();
        let mut b = block.clone();
        let na = codec.quantize(&mut a, scale, shift, add);
        let nb = reference.quantize(&mut b, scale, shift, add);
        if a != b || na != nb {
            return Err(mismatch("quantize", iteration));
        }

        let add = rng.gen_range(0..=MAX_DEQUANT_ADD);
        let mut a = block.clone();
        let mut b = block.clone();
        codec.dequantize(&mut a, scale, shift, add);
        reference.dequantize(&mut b, scale, shift, add);
        if a != b {
            return Err(mismatch("dequantize", iteration));
        }

        // the sign helpers take any length
        let n = rng.gen_range(0..=len);
        let mut a = vec![0i16; n];
        let mut b = vec![0i16; n];
        codec.abs_coeff(&mut a, &block[..n]);
        reference.abs_coeff(&mut b, &block[..n]);
        if a != b {
            return Err(mismatch("abs_coeff", iteration));
        }

        let mut sa = random_block(rng, n);
        let mut sb = sa.clone();
        let na = codec.add_sign(&mut sa, &a);
        let nb = reference.add_sign(&mut sb, &b);
        if sa != sb || na != nb {
            return Err(mismatch("add_sign", iteration));
        }

        let order = if rng.gen() { ScanOrder::XY } else { ScanOrder::YX };
        let row_stride_log2 = rng.gen_range(CG_LOG2_WIDTH..=MAX_BLOCK_LOG2_SIZE);
        let src = random_block(rng, CG_WIDTH << row_stride_log2);
        let mut da = [0i16; CG_SIZE];
        let mut db = [0i16; CG_SIZE];
        codec.scan_block(&mut da, &src, row_stride_log2, order);
        reference.scan_block(&mut db, &src, row_stride_log2, order);
        if da != db {
            return Err(mismatch("scan_block", iteration));
        }

        let rows = pack_rows(&src, row_stride_log2);
        codec.scan_rows(&mut da, rows, order);
        reference.scan_rows(&mut db, rows, order);
        if da != db {
            return Err(mismatch("scan_rows", iteration));
        }
    }
    Ok(())
}
