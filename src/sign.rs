/// `dst[i] = |src[i]|`, with `|i16::MIN|` clamped to `i16::MAX`.
pub fn abs_coeff(dst: &mut [i16], src: &[i16]) {
    debug_assert!(dst.len() >= src.len());
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d = s.saturating_abs();
    }
}

/// Recombines magnitudes with the signs currently held in `dst`.
///
/// A zero in `dst` yields a zero level whatever the magnitude. Returns the
/// number of non-zero results.
pub fn add_sign(dst: &mut [i16], abs_vals: &[i16]) -> usize {
    debug_assert!(dst.len() >= abs_vals.len());
    let mut num_non_zero = 0;
    for (d, &a) in dst.iter_mut().zip(abs_vals.iter()) {
        *d = match *d {
            0 => 0,
            s if s < 0 => a.wrapping_neg(),
            _ => a,
        };
        num_non_zero += (*d != 0) as usize;
    }
    num_non_zero
}

pub fn count_nonzero(levels: &[i16]) -> usize {
    levels.iter().filter(|&&l| l != 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{prelude::StdRng, Rng, SeedableRng};

    #[test]
    fn abs_clamps_signed_minimum() {
        let src = [i16::MIN, -1, 0, 1, i16::MAX, -300];
        let mut dst = [0i16; 6];
        abs_coeff(&mut dst, &src);
        assert_eq!(dst, [i16::MAX, 1, 0, 1, i16::MAX, 300]);
    }

    #[test]
    fn sign_round_trip() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(2);
        for _ in 0..100 {
            let mut original = vec![0i16; 48];
            rng.fill(&mut original[..]);
            original
                .iter_mut()
                .filter(|c| **c == i16::MIN)
                .for_each(|c| *c = 0);
            let mut mags = vec![0i16; 48];
            abs_coeff(&mut mags, &original);
            let mut signed = original.clone();
            let n = add_sign(&mut signed, &mags);
            assert_eq!(signed, original);
            assert_eq!(n, count_nonzero(&original));
        }
    }

    #[test]
    fn add_sign_takes_sign_from_destination() {
        let mut dst = [5i16, -7, 0, -1, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mags = [2i16, 4, 9, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1];
        let n = add_sign(&mut dst, &mags);
        assert_eq!(&dst[..5], &[2, -4, 0, 0, 0]);
        assert!(dst[5..].iter().all(|&d| d == 0));
        assert_eq!(n, 2);
    }

    #[test]
    fn count_nonzero_counts() {
        assert_eq!(count_nonzero(&[0, 1, -1, 0, 3]), 3);
        assert_eq!(count_nonzero(&[0; 16]), 0);
    }
}
