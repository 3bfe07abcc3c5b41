use super::common::*;

/// Quantizes transform coefficients in place and returns the number of
/// non-zero levels.
///
/// `level = sign(c) * ((|c| * scale + add) >> shift)`, saturated to 16 bits.
pub fn quantize(levels: &mut [i16], scale: i32, shift: i32, add: i32) -> usize {
    debug_check_cg_len(levels.len());
    debug_assert!((0..=MAX_SHIFT).contains(&shift));
    debug_assert!(scale >= 0 && add >= 0);
    let shift = shift as u32;
    let (scale, add) = (scale as i64, add as i64);
    let mut num_non_zero = 0;
    for c in levels.iter_mut() {
        *c = quantize_coeff(*c, scale, shift, add);
        num_non_zero += (*c != 0) as usize;
    }
    num_non_zero
}

#[inline(always)]
pub fn quantize_coeff(c: i16, scale: i64, shift: u32, add: i64) -> i16 {
    let mag = floor_shr((c as i64).abs() * scale + add, shift);
    let level = match c {
        0 => 0,
        c if c < 0 => -mag,
        _ => mag,
    };
    saturate(level)
}

/// Reconstructs coefficients from levels in place.
///
/// `coef = (level * scale + add) >> shift` with a flooring shift. The result
/// is not clamped; in-range parameters keep it inside 16 bits.
pub fn dequantize(coeffs: &mut [i16], scale: i32, shift: i32, add: i32) {
    debug_check_cg_len(coeffs.len());
    debug_assert!((0..=MAX_SHIFT).contains(&shift));
    debug_assert!(scale >= 0 && add >= 0);
    let shift = shift as u32;
    let (scale, add) = (scale as i64, add as i64);
    for c in coeffs.iter_mut() {
        *c = dequantize_coeff(*c, scale, shift, add);
    }
}

#[inline(always)]
pub fn dequantize_coeff(level: i16, scale: i64, shift: u32, add: i64) -> i16 {
    // keep the low 16 bits
    floor_shr(level as i64 * scale + add, shift) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{prelude::StdRng, Rng, SeedableRng};

    #[test]
    fn unit_gain_example() {
        let input: [i16; 16] = [100, -50, 0, 25, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut levels = input;
        let n = quantize(&mut levels, 16384, 14, 8192);
        assert_eq!(n, 3);
        assert_eq!(
            levels,
            [100, -50, 0, 25, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        let mut again = input;
        assert_eq!(quantize(&mut again, 16384, 14, 8192), 3);
        assert_eq!(again, levels);
    }

    #[test]
    fn zero_block_stays_zero() {
        let mut levels = [0i16; 64];
        assert_eq!(quantize(&mut levels, 32768, 15, (1 << 15) - 1), 0);
        assert!(levels.iter().all(|&l| l == 0));
    }

    #[test]
    fn sign_is_symmetric() {
        let mut pos: Vec<i16> = (1..=32).map(|i| i * 37).collect();
        let mut neg: Vec<i16> = pos.iter().map(|&c| -c).collect();
        quantize(&mut pos, 20000, 16, 1 << 15);
        quantize(&mut neg, 20000, 16, 1 << 15);
        for (p, n) in pos.iter().zip(neg.iter()) {
            assert_eq!(*p, -*n);
        }
    }

    #[test]
    fn dead_zone_offset_zeroes_small_coefficients() {
        // step of 4, offset of a quarter step
        let mut levels = [0i16; 16];
        levels[..6].copy_from_slice(&[3, -3, 4, 5, 7, -8]);
        let n = quantize(&mut levels, 1, 2, 1);
        assert_eq!(&levels[..6], &[1, -1, 1, 1, 2, -2]);
        assert_eq!(n, 6);
        let mut levels = [0i16; 16];
        levels[..4].copy_from_slice(&[2, -2, 3, 6]);
        let n = quantize(&mut levels, 1, 2, 0);
        assert_eq!(&levels[..4], &[0, 0, 0, 1]);
        assert_eq!(n, 1);
    }

    #[test]
    fn quantize_saturates() {
        let mut levels = [0i16; 16];
        levels[0] = i16::MAX;
        levels[1] = i16::MIN;
        levels[2] = -20000;
        quantize(&mut levels, 4 << 10, 10, 0);
        assert_eq!(levels[0], i16::MAX);
        assert_eq!(levels[1], i16::MIN);
        assert_eq!(levels[2], i16::MIN);
    }

    #[test]
    fn dequantize_floors_negative_values() {
        let mut coeffs = [0i16; 16];
        coeffs[..4].copy_from_slice(&[1, -1, 3, -3]);
        // scale 3 / 4, no offset
        dequantize(&mut coeffs, 3, 2, 0);
        assert_eq!(&coeffs[..4], &[0, -1, 2, -3]);
    }

    #[test]
    fn dequantize_with_half_step() {
        let mut coeffs = [0i16; 16];
        coeffs[..4].copy_from_slice(&[10, -10, 0, 1]);
        dequantize(&mut coeffs, 36061, 15, 1 << 14);
        // 10 * 36061 / 32768 = 11.005
        assert_eq!(&coeffs[..4], &[11, -11, 0, 1]);
    }

    #[test]
    fn round_trip_is_bounded() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(2);
        for _ in 0..200 {
            let shift: i32 = rng.gen_range(1..=15);
            // quantizer gain in (1/2, 1]
            let q_scale: i32 = rng.gen_range((1 << (shift - 1)) + 1..=1 << shift);
            let mut coeffs = vec![0i16; 64];
            rng.fill(&mut coeffs[..]);
            coeffs.iter_mut().for_each(|c| *c /= 4);
            let original = coeffs.clone();
            quantize(&mut coeffs, q_scale, shift, 1 << (shift - 1));
            // inverse gain 2^shift / q_scale expressed over 2^15
            let dq_shift = 15;
            let dq_scale = ((1i64 << (shift + dq_shift)) / q_scale as i64) as i32;
            dequantize(&mut coeffs, dq_scale, dq_shift, 0);
            let step = (1i64 << shift) / q_scale as i64 + 1;
            for (r, o) in coeffs.iter().zip(original.iter()) {
                assert!(
                    (*r as i64).abs() <= (*o as i64).abs() + step,
                    "{} -> {} with step {}",
                    o,
                    r,
                    step
                );
            }
        }
    }
}
