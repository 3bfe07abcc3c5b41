#[cfg(target_arch = "x86_64")]
use super::avx2::Avx2Codec;
use super::common::*;
use super::error::CoeffError;
use super::params::QuantParams;
use super::quantizer;
use super::scan::{self, ScanOrder};
use super::sign;
use debug_print::*;
use lazy_static::lazy_static;
use std::fmt;
use std::str::FromStr;

/// One implementation of the per-block coefficient operations.
///
/// Every tier produces bit-identical results for inputs inside the documented
/// parameter ranges; tiers differ only in speed.
pub trait CoefficientCodec: Send + Sync {
    fn tier(&self) -> CodecTier;

    fn quantize(&self, levels: &mut [i16], scale: i32, shift: i32, add: i32) -> usize;

    fn dequantize(&self, coeffs: &mut [i16], scale: i32, shift: i32, add: i32);

    fn abs_coeff(&self, dst: &mut [i16], src: &[i16]);

    fn add_sign(&self, dst: &mut [i16], abs_vals: &[i16]) -> usize;

    fn scan_block(
        &self,
        dst: &mut [i16; CG_SIZE],
        src: &[i16],
        row_stride_log2: usize,
        order: ScanOrder,
    );

    fn scan_rows(&self, dst: &mut [i16; CG_SIZE], rows: [u64; CG_WIDTH], order: ScanOrder);

    fn inverse_scan(&self, dst: &mut [i16; CG_SIZE], src: &[i16; CG_SIZE], order: ScanOrder) {
        scan::inverse_scan(dst, src, order);
    }

    fn quantize_with(&self, levels: &mut [i16], params: &QuantParams) -> usize {
        self.quantize(levels, params.scale, params.shift, params.add)
    }

    fn dequantize_with(&self, coeffs: &mut [i16], params: &QuantParams) {
        self.dequantize(coeffs, params.scale, params.shift, params.add);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum CodecTier {
    Reference = 0,
    Avx2 = 1,
}

impl CodecTier {
    pub const ALL: [CodecTier; 2] = [CodecTier::Reference, CodecTier::Avx2];
}

impl fmt::Display for CodecTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecTier::Reference => write!(f, "reference"),
            CodecTier::Avx2 => write!(f, "avx2"),
        }
    }
}

impl FromStr for CodecTier {
    type Err = CoeffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "scalar" | "c" => Ok(CodecTier::Reference),
            "avx2" => Ok(CodecTier::Avx2),
            _ => Err(CoeffError::UnknownTier(s.to_string())),
        }
    }
}

/// Portable scalar implementation every other tier is checked against.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceCodec;

impl CoefficientCodec for ReferenceCodec {
    fn tier(&self) -> CodecTier {
        CodecTier::Reference
    }

    fn quantize(&self, levels: &mut [i16], scale: i32, shift: i32, add: i32) -> usize {
        quantizer::quantize(levels, scale, shift, add)
    }

    fn dequantize(&self, coeffs: &mut [i16], scale: i32, shift: i32, add: i32) {
        quantizer::dequantize(coeffs, scale, shift, add);
    }

    fn abs_coeff(&self, dst: &mut [i16], src: &[i16]) {
        sign::abs_coeff(dst, src);
    }

    fn add_sign(&self, dst: &mut [i16], abs_vals: &[i16]) -> usize {
        sign::add_sign(dst, abs_vals)
    }

    fn scan_block(
        &self,
        dst: &mut [i16; CG_SIZE],
        src: &[i16],
        row_stride_log2: usize,
        order: ScanOrder,
    ) {
        scan::scan_block(dst, src, row_stride_log2, order);
    }

    fn scan_rows(&self, dst: &mut [i16; CG_SIZE], rows: [u64; CG_WIDTH], order: ScanOrder) {
        scan::scan_rows(dst, rows, order);
    }
}

static REFERENCE: ReferenceCodec = ReferenceCodec;

lazy_static! {
    static ref DETECTED: &'static dyn CoefficientCodec = {
        let codec = CodecTier::ALL
            .iter()
            .rev()
            .find_map(|&tier| codec_for(tier))
            .unwrap_or(&REFERENCE);
        debug_eprintln!("coefficient codec: {}", codec.tier());
        codec
    };
}

/// The fastest tier this cpu supports. Selected once per process.
pub fn detect() -> &'static dyn CoefficientCodec {
    *DETECTED
}

/// The codec of a given tier, or `None` when the cpu cannot run it.
pub fn codec_for(tier: CodecTier) -> Option<&'static dyn CoefficientCodec> {
    match tier {
        CodecTier::Reference => Some(&REFERENCE),
        #[cfg(target_arch = "x86_64")]
        CodecTier::Avx2 => Avx2Codec::get().map(|c| c as &'static dyn CoefficientCodec),
        #[cfg(not(target_arch = "x86_64"))]
        CodecTier::Avx2 => None,
    }
}

pub fn select(tier: CodecTier) -> Result<&'static dyn CoefficientCodec, CoeffError> {
    codec_for(tier).ok_or_else(|| CoeffError::UnsupportedTier(tier.to_string()))
}

pub fn available_tiers() -> Vec<CodecTier> {
    CodecTier::ALL
        .iter()
        .copied()
        .filter(|&tier| codec_for(tier).is_some())
        .collect()
}

/// Quantizes a whole block in place and returns its significance count.
/// Padding columns beyond `width` are left untouched.
pub fn quantize_block(
    codec: &dyn CoefficientCodec,
    block: &mut CoeffBlock,
    params: &QuantParams,
) -> usize {
    if block.stride() == block.width {
        return codec.quantize_with(&mut block.data, params);
    }
    let mut num_non_zero = 0;
    let (cg_cols, cg_rows) = block.cg_dims();
    // padded rows are not contiguous; go one 4x4 group at a time
    for cg_y in 0..cg_rows {
        for cg_x in 0..cg_cols {
            let mut cg = gather_cg(block, cg_x, cg_y);
            num_non_zero += codec.quantize_with(&mut cg, params);
            block.put_cg(cg_x, cg_y, &cg);
        }
    }
    num_non_zero
}

pub fn dequantize_block(codec: &dyn CoefficientCodec, block: &mut CoeffBlock, params: &QuantParams) {
    if block.stride() == block.width {
        codec.dequantize_with(&mut block.data, params);
        return;
    }
    let (cg_cols, cg_rows) = block.cg_dims();
    for cg_y in 0..cg_rows {
        for cg_x in 0..cg_cols {
            let mut cg = gather_cg(block, cg_x, cg_y);
            codec.dequantize_with(&mut cg, params);
            block.put_cg(cg_x, cg_y, &cg);
        }
    }
}

fn gather_cg(block: &CoeffBlock, cg_x: usize, cg_y: usize) -> [i16; CG_SIZE] {
    let src = block.cg(cg_x, cg_y);
    let mut cg = [0i16; CG_SIZE];
    for (y, row) in cg.chunks_exact_mut(CG_WIDTH).enumerate() {
        let offset = y << block.log2_stride;
        row.copy_from_slice(&src[offset..offset + CG_WIDTH]);
    }
    cg
}

/// Scans every coefficient group of `block` in group raster order,
/// appending 16 coefficients per group to `out`.
pub fn scan_groups(
    codec: &dyn CoefficientCodec,
    block: &CoeffBlock,
    order: ScanOrder,
    out: &mut Vec<i16>,
) {
    let (cg_cols, cg_rows) = block.cg_dims();
    let mut dst = [0i16; CG_SIZE];
    for cg_y in 0..cg_rows {
        for cg_x in 0..cg_cols {
            codec.scan_block(&mut dst, block.cg(cg_x, cg_y), block.log2_stride, order);
            out.extend_from_slice(&dst);
        }
    }
}

/// Inverse of [`scan_groups`]: consumes 16 scanned coefficients per group.
pub fn unscan_groups(
    codec: &dyn CoefficientCodec,
    scanned: &[i16],
    order: ScanOrder,
    block: &mut CoeffBlock,
) {
    let (cg_cols, cg_rows) = block.cg_dims();
    let mut cg = [0i16; CG_SIZE];
    let mut src = [0i16; CG_SIZE];
    for (i, chunk) in scanned
        .chunks_exact(CG_SIZE)
        .take(cg_cols * cg_rows)
        .enumerate()
    {
        src.copy_from_slice(chunk);
        codec.inverse_scan(&mut cg, &src, order);
        block.put_cg(i % cg_cols, i / cg_cols, &cg);
    }
}
