use super::codec::{CodecTier, CoefficientCodec};
use super::common::*;
use super::quantizer::{dequantize_coeff, quantize_coeff};
use super::scan::{ScanOrder, SCAN_XY_4X4, SCAN_YX_4X4};
use super::sign;
use core::arch::x86_64::*;

/// AVX2 tier. Only reachable through [`Avx2Codec::get`], which checks the cpu
/// first, so the trait methods may call the `avx2` kernels directly.
#[derive(Debug)]
pub struct Avx2Codec {
    _private: (),
}

static AVX2: Avx2Codec = Avx2Codec { _private: () };

impl Avx2Codec {
    pub fn get() -> Option<&'static Avx2Codec> {
        if is_x86_feature_detected!("avx2") {
            Some(&AVX2)
        } else {
            None
        }
    }
}

impl CoefficientCodec for Avx2Codec {
    fn tier(&self) -> CodecTier {
        CodecTier::Avx2
    }

    // SAFETY: an `Avx2Codec` is only handed out after avx2 was detected.
    fn quantize(&self, levels: &mut [i16], scale: i32, shift: i32, add: i32) -> usize {
        unsafe { quantize_avx2(levels, scale, shift, add) }
    }

    fn dequantize(&self, coeffs: &mut [i16], scale: i32, shift: i32, add: i32) {
        unsafe { dequantize_avx2(coeffs, scale, shift, add) }
    }

    fn abs_coeff(&self, dst: &mut [i16], src: &[i16]) {
        unsafe { abs_coeff_avx2(dst, src) }
    }

    fn add_sign(&self, dst: &mut [i16], abs_vals: &[i16]) -> usize {
        unsafe { add_sign_avx2(dst, abs_vals) }
    }

    fn scan_block(
        &self,
        dst: &mut [i16; CG_SIZE],
        src: &[i16],
        row_stride_log2: usize,
        order: ScanOrder,
    ) {
        unsafe { scan_block_avx2(dst, src, row_stride_log2, order) }
    }

    fn scan_rows(&self, dst: &mut [i16; CG_SIZE], rows: [u64; CG_WIDTH], order: ScanOrder) {
        unsafe {
            let v = _mm256_set_epi64x(
                rows[3] as i64,
                rows[2] as i64,
                rows[1] as i64,
                rows[0] as i64,
            );
            scan_avx2(dst, v, order)
        }
    }
}

// Byte shuffles for one coefficient group held in a 256-bit register, built
// from the scan tables. `_mm256_shuffle_epi8` cannot cross 128-bit lanes, so
// coefficients coming from the other lane are picked from a lane-swapped copy
// with the second mask. Bytes with the high bit set are zeroed.
const fn shuffle_masks(table: &[usize; CG_SIZE]) -> [[i8; 32]; 2] {
    let mut masks = [[-128i8; 32]; 2];
    let mut pos = 0;
    while pos < CG_SIZE {
        let raster = table[pos];
        let byte = ((raster % 8) * 2) as i8;
        let which = if pos / 8 == raster / 8 { 0 } else { 1 };
        masks[which][pos * 2] = byte;
        masks[which][pos * 2 + 1] = byte + 1;
        pos += 1;
    }
    masks
}

const SHUFFLE_XY: [[i8; 32]; 2] = shuffle_masks(&SCAN_XY_4X4);
const SHUFFLE_YX: [[i8; 32]; 2] = shuffle_masks(&SCAN_YX_4X4);

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn scan_avx2(dst: &mut [i16; CG_SIZE], v: __m256i, order: ScanOrder) {
    let masks = match order {
        ScanOrder::XY => &SHUFFLE_XY,
        ScanOrder::YX => &SHUFFLE_YX,
    };
    let same = _mm256_loadu_si256(masks[0].as_ptr() as *const _);
    let cross = _mm256_loadu_si256(masks[1].as_ptr() as *const _);
    let swapped = _mm256_permute4x64_epi64(v, 0x4e);
    let v = _mm256_or_si256(
        _mm256_shuffle_epi8(v, same),
        _mm256_shuffle_epi8(swapped, cross),
    );
    _mm256_storeu_si256(dst.as_mut_ptr() as *mut _, v);
}

#[target_feature(enable = "avx2")]
unsafe fn scan_block_avx2(
    dst: &mut [i16; CG_SIZE],
    src: &[i16],
    row_stride_log2: usize,
    order: ScanOrder,
) {
    debug_assert!(row_stride_log2 >= CG_LOG2_WIDTH);
    let mut rows = [_mm_setzero_si128(); CG_WIDTH];
    for (y, r) in rows.iter_mut().enumerate() {
        let offset = y << row_stride_log2;
        let row = &src[offset..offset + CG_WIDTH];
        *r = _mm_loadl_epi64(row.as_ptr() as *const _);
    }
    let lo = _mm_unpacklo_epi64(rows[0], rows[1]);
    let hi = _mm_unpacklo_epi64(rows[2], rows[3]);
    let v = _mm256_inserti128_si256(_mm256_castsi128_si256(lo), hi, 1);
    scan_avx2(dst, v, order);
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn count_nonzero_epi16(v: __m256i) -> usize {
    let zero = _mm256_cmpeq_epi16(v, _mm256_setzero_si256());
    let zero_bytes = (_mm256_movemask_epi8(zero) as u32).count_ones() as usize;
    CG_SIZE - (zero_bytes >> 1)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn quantize_8(
    mag: __m128i,
    c: __m128i,
    scale: __m256i,
    add: __m256i,
    shift: __m128i,
) -> __m256i {
    // |c| * scale < 2^31 and the sum with add < 2^32, so unsigned 32-bit
    // lanes hold the exact value
    let v = _mm256_cvtepu16_epi32(mag);
    let v = _mm256_mullo_epi32(v, scale);
    let v = _mm256_add_epi32(v, add);
    let v = _mm256_srl_epi32(v, shift);
    let v = _mm256_min_epu32(v, _mm256_set1_epi32(1 << 15));
    _mm256_sign_epi32(v, _mm256_cvtepi16_epi32(c))
}

#[target_feature(enable = "avx2")]
unsafe fn quantize_avx2(levels: &mut [i16], scale: i32, shift: i32, add: i32) -> usize {
    debug_check_cg_len(levels.len());
    debug_assert!((0..=MAX_SHIFT).contains(&shift));
    debug_assert!((0..=MAX_SCALE).contains(&scale) && add >= 0);
    let scale_v = _mm256_set1_epi32(scale);
    let add_v = _mm256_set1_epi32(add);
    let shift_v = _mm_cvtsi32_si128(shift);
    let mut num_non_zero = 0;
    let mut chunks = levels.chunks_exact_mut(CG_SIZE);
    for chunk in &mut chunks {
        let c = _mm256_loadu_si256(chunk.as_ptr() as *const _);
        let mag = _mm256_abs_epi16(c);
        let lo = quantize_8(
            _mm256_castsi256_si128(mag),
            _mm256_castsi256_si128(c),
            scale_v,
            add_v,
            shift_v,
        );
        let hi = quantize_8(
            _mm256_extracti128_si256(mag, 1),
            _mm256_extracti128_si256(c, 1),
            scale_v,
            add_v,
            shift_v,
        );
        // packs interleaves the halves per 128-bit lane
        let v = _mm256_permute4x64_epi64(_mm256_packs_epi32(lo, hi), 0xd8);
        _mm256_storeu_si256(chunk.as_mut_ptr() as *mut _, v);
        num_non_zero += count_nonzero_epi16(v);
    }
    let (scale, shift, add) = (scale as i64, shift as u32, add as i64);
    for c in chunks.into_remainder() {
        *c = quantize_coeff(*c, scale, shift, add);
        num_non_zero += (*c != 0) as usize;
    }
    num_non_zero
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn dequantize_8(level: __m128i, scale: __m256i, add: __m256i, shift: __m128i) -> __m256i {
    let v = _mm256_cvtepi16_epi32(level);
    let v = _mm256_mullo_epi32(v, scale);
    let v = _mm256_add_epi32(v, add);
    let v = _mm256_sra_epi32(v, shift);
    // low 16 bits, so the unsigned pack below never saturates
    _mm256_and_si256(v, _mm256_set1_epi32(0xffff))
}

#[target_feature(enable = "avx2")]
unsafe fn dequantize_avx2(coeffs: &mut [i16], scale: i32, shift: i32, add: i32) {
    debug_check_cg_len(coeffs.len());
    debug_assert!((0..=MAX_SHIFT).contains(&shift));
    debug_assert!((0..=MAX_SCALE).contains(&scale) && (0..=MAX_DEQUANT_ADD).contains(&add));
    let scale_v = _mm256_set1_epi32(scale);
    let add_v = _mm256_set1_epi32(add);
    let shift_v = _mm_cvtsi32_si128(shift);
    let mut chunks = coeffs.chunks_exact_mut(CG_SIZE);
    for chunk in &mut chunks {
        let c = _mm256_loadu_si256(chunk.as_ptr() as *const _);
        let lo = dequantize_8(_mm256_castsi256_si128(c), scale_v, add_v, shift_v);
        let hi = dequantize_8(_mm256_extracti128_si256(c, 1), scale_v, add_v, shift_v);
        let v = _mm256_permute4x64_epi64(_mm256_packus_epi32(lo, hi), 0xd8);
        _mm256_storeu_si256(chunk.as_mut_ptr() as *mut _, v);
    }
    let (scale, shift, add) = (scale as i64, shift as u32, add as i64);
    for c in chunks.into_remainder() {
        *c = dequantize_coeff(*c, scale, shift, add);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn abs_coeff_avx2(dst: &mut [i16], src: &[i16]) {
    debug_assert!(dst.len() >= src.len());
    let full = src.len() / CG_SIZE * CG_SIZE;
    let max = _mm256_set1_epi16(i16::MAX);
    for (d, s) in dst[..full]
        .chunks_exact_mut(CG_SIZE)
        .zip(src[..full].chunks_exact(CG_SIZE))
    {
        let v = _mm256_loadu_si256(s.as_ptr() as *const _);
        // abs(i16::MIN) stays 0x8000, which the unsigned min folds to i16::MAX
        let v = _mm256_min_epu16(_mm256_abs_epi16(v), max);
        _mm256_storeu_si256(d.as_mut_ptr() as *mut _, v);
    }
    sign::abs_coeff(&mut dst[full..], &src[full..]);
}

#[target_feature(enable = "avx2")]
unsafe fn add_sign_avx2(dst: &mut [i16], abs_vals: &[i16]) -> usize {
    debug_assert!(dst.len() >= abs_vals.len());
    let full = abs_vals.len() / CG_SIZE * CG_SIZE;
    let mut num_non_zero = 0;
    for (d, a) in dst[..full]
        .chunks_exact_mut(CG_SIZE)
        .zip(abs_vals[..full].chunks_exact(CG_SIZE))
    {
        let s = _mm256_loadu_si256(d.as_ptr() as *const _);
        let a = _mm256_loadu_si256(a.as_ptr() as *const _);
        let v = _mm256_sign_epi16(a, s);
        _mm256_storeu_si256(d.as_mut_ptr() as *mut _, v);
        num_non_zero += count_nonzero_epi16(v);
    }
    num_non_zero + sign::add_sign(&mut dst[full..], &abs_vals[full..])
}
