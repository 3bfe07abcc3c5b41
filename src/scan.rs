use super::common::*;
use super::error::CoeffError;
use lazy_static::lazy_static;
use num_traits::FromPrimitive;
use std::str::FromStr;

/// Coefficient-group scan order.
///
/// `XY` is the 4x4 zig-zag of the standard, which leaves the DC position
/// horizontally; `YX` is its transpose and leaves vertically.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, FromPrimitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum ScanOrder {
    XY = 0,
    YX = 1,
}

/// Scan position to raster index inside a coefficient group, zig-zag.
pub const SCAN_XY_4X4: [usize; CG_SIZE] = [0, 1, 4, 8, 5, 2, 3, 6, 9, 12, 13, 10, 7, 11, 14, 15];

/// Scan position to raster index inside a coefficient group, transposed zig-zag.
pub const SCAN_YX_4X4: [usize; CG_SIZE] = [0, 4, 1, 2, 5, 8, 12, 9, 6, 3, 7, 10, 13, 14, 11, 15];

lazy_static! {
    /// Raster index to scan position, indexed by `ScanOrder as usize`.
    pub static ref INVERSE_SCAN_4X4: [[usize; CG_SIZE]; 2] = {
        let mut inverse = [[0; CG_SIZE]; 2];
        for (table, inv) in [&SCAN_XY_4X4, &SCAN_YX_4X4].iter().zip(inverse.iter_mut()) {
            for (pos, &raster) in table.iter().enumerate() {
                inv[raster] = pos;
            }
        }
        inverse
    };
}

impl ScanOrder {
    #[inline(always)]
    pub fn table(self) -> &'static [usize; CG_SIZE] {
        match self {
            ScanOrder::XY => &SCAN_XY_4X4,
            ScanOrder::YX => &SCAN_YX_4X4,
        }
    }

    #[inline(always)]
    pub fn inverse_table(self) -> &'static [usize; CG_SIZE] {
        &INVERSE_SCAN_4X4[self as usize]
    }

    /// Order index as signalled by the intra-mode logic.
    pub fn from_index(idx: u8) -> Result<ScanOrder, CoeffError> {
        FromPrimitive::from_u8(idx).ok_or_else(|| CoeffError::UnknownScanOrder(idx.to_string()))
    }
}

impl FromStr for ScanOrder {
    type Err = CoeffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xy" => Ok(ScanOrder::XY),
            "yx" => Ok(ScanOrder::YX),
            _ => Err(CoeffError::UnknownScanOrder(s.to_string())),
        }
    }
}

/// Four coefficients of a row, column 0 in the low 16 bits.
#[inline(always)]
pub fn unpack_row(row: u64) -> [i16; CG_WIDTH] {
    [
        row as u16 as i16,
        (row >> 16) as u16 as i16,
        (row >> 32) as u16 as i16,
        (row >> 48) as u16 as i16,
    ]
}

#[inline(always)]
pub fn pack_row(row: &[i16]) -> u64 {
    row.iter()
        .take(CG_WIDTH)
        .enumerate()
        .fold(0u64, |acc, (x, &c)| acc | ((c as u16 as u64) << (x * 16)))
}

/// Packs the coefficient group at the start of `src` into four row words.
pub fn pack_rows(src: &[i16], row_stride_log2: usize) -> [u64; CG_WIDTH] {
    let mut rows = [0; CG_WIDTH];
    for (y, row) in rows.iter_mut().enumerate() {
        let offset = y << row_stride_log2;
        *row = pack_row(&src[offset..offset + CG_WIDTH]);
    }
    rows
}

/// Reorders the coefficient group whose top-left coefficient is `src[0]`.
/// Rows are `1 << row_stride_log2` coefficients apart.
pub fn scan_block(dst: &mut [i16; CG_SIZE], src: &[i16], row_stride_log2: usize, order: ScanOrder) {
    debug_assert!(row_stride_log2 >= CG_LOG2_WIDTH);
    debug_assert!(src.len() >= (3 << row_stride_log2) + CG_WIDTH);
    for (d, &raster) in dst.iter_mut().zip(order.table().iter()) {
        let (x, y) = (raster & (CG_WIDTH - 1), raster >> CG_LOG2_WIDTH);
        *d = src[(y << row_stride_log2) + x];
    }
}

/// Reorders a coefficient group held as four packed rows.
pub fn scan_rows(dst: &mut [i16; CG_SIZE], rows: [u64; CG_WIDTH], order: ScanOrder) {
    let mut raster = [0i16; CG_SIZE];
    for (r, &row) in raster.chunks_exact_mut(CG_WIDTH).zip(rows.iter()) {
        r.copy_from_slice(&unpack_row(row));
    }
    scan_block(dst, &raster, CG_LOG2_WIDTH, order);
}

/// Puts scanned coefficients back at their raster positions.
pub fn inverse_scan(dst: &mut [i16; CG_SIZE], src: &[i16; CG_SIZE], order: ScanOrder) {
    for (&s, &raster) in src.iter().zip(order.table().iter()) {
        dst[raster] = s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{prelude::StdRng, Rng, SeedableRng};

    // Anti-diagonal walk: diagonal d holds x + y = d, even diagonals run
    // toward the top-right, odd ones toward the bottom-left.
    fn zigzag_walk(horizontal_first: bool) -> Vec<usize> {
        let mut order = vec![];
        for d in 0..(2 * CG_WIDTH - 1) {
            let mut diag = vec![];
            for y in 0..CG_WIDTH {
                if d >= y && d - y < CG_WIDTH {
                    diag.push((d - y, y));
                }
            }
            // diag runs from the top row down; odd diagonals go that way
            if d % 2 == 0 {
                diag.reverse();
            }
            for (x, y) in diag {
                let (x, y) = if horizontal_first { (x, y) } else { (y, x) };
                order.push(y * CG_WIDTH + x);
            }
        }
        order
    }

    #[test]
    fn tables_match_zigzag_walk() {
        assert_eq!(zigzag_walk(true), SCAN_XY_4X4.to_vec());
        assert_eq!(zigzag_walk(false), SCAN_YX_4X4.to_vec());
    }

    #[test]
    fn yx_is_transpose_of_xy() {
        for pos in 0..CG_SIZE {
            let r = SCAN_XY_4X4[pos];
            let transposed = (r % CG_WIDTH) * CG_WIDTH + r / CG_WIDTH;
            assert_eq!(SCAN_YX_4X4[pos], transposed);
        }
    }

    #[test]
    fn orders_are_bijections() {
        for order in [ScanOrder::XY, ScanOrder::YX] {
            let identity: Vec<i16> = (0..CG_SIZE as i16).collect();
            let mut dst = [0i16; CG_SIZE];
            scan_block(&mut dst, &identity, CG_LOG2_WIDTH, order);
            let mut seen = [false; CG_SIZE];
            for &d in dst.iter() {
                assert!(!seen[d as usize]);
                seen[d as usize] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn xy_scan_of_identity() {
        let identity: Vec<i16> = (0..CG_SIZE as i16).collect();
        let mut dst = [0i16; CG_SIZE];
        scan_block(&mut dst, &identity, CG_LOG2_WIDTH, ScanOrder::XY);
        assert_eq!(dst, [0, 1, 4, 8, 5, 2, 3, 6, 9, 12, 13, 10, 7, 11, 14, 15]);
        scan_block(&mut dst, &identity, CG_LOG2_WIDTH, ScanOrder::YX);
        assert_eq!(dst, [0, 4, 1, 2, 5, 8, 12, 9, 6, 3, 7, 10, 13, 14, 11, 15]);
    }

    #[test]
    fn scan_then_inverse_scan_is_identity() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(2);
        for order in [ScanOrder::XY, ScanOrder::YX] {
            for _ in 0..100 {
                let mut src = [0i16; CG_SIZE];
                rng.fill(&mut src[..]);
                let mut scanned = [0i16; CG_SIZE];
                scan_block(&mut scanned, &src, CG_LOG2_WIDTH, order);
                let mut back = [0i16; CG_SIZE];
                inverse_scan(&mut back, &scanned, order);
                assert_eq!(back, src);
            }
        }
    }

    #[test]
    fn inverse_table_undoes_table() {
        for order in [ScanOrder::XY, ScanOrder::YX] {
            for pos in 0..CG_SIZE {
                assert_eq!(order.inverse_table()[order.table()[pos]], pos);
            }
        }
    }

    #[test]
    fn orders_differ_on_two_distinct_positions() {
        let mut src = [0i16; CG_SIZE];
        src[1] = 7;
        src[4] = -3;
        let mut xy = [0i16; CG_SIZE];
        let mut yx = [0i16; CG_SIZE];
        scan_block(&mut xy, &src, CG_LOG2_WIDTH, ScanOrder::XY);
        scan_block(&mut yx, &src, CG_LOG2_WIDTH, ScanOrder::YX);
        assert_ne!(xy, yx);
        assert_eq!(&xy[..3], &[0, 7, -3]);
        assert_eq!(&yx[..3], &[0, -3, 7]);
    }

    #[test]
    fn strided_scan_reads_only_the_group() {
        // 8 wide block, group at column 4
        let src: Vec<i16> = (0..32).map(|i| i as i16).collect();
        let mut dst = [0i16; CG_SIZE];
        scan_block(&mut dst, &src[4..], 3, ScanOrder::XY);
        assert_eq!(
            dst,
            [4, 5, 12, 20, 13, 6, 7, 14, 21, 28, 29, 22, 15, 23, 30, 31]
        );
    }

    #[test]
    fn packed_rows_scan_like_block() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(3);
        for order in [ScanOrder::XY, ScanOrder::YX] {
            for _ in 0..100 {
                let mut src = vec![0i16; 64];
                rng.fill(&mut src[..]);
                let mut from_block = [0i16; CG_SIZE];
                scan_block(&mut from_block, &src, 4, order);
                let mut from_rows = [0i16; CG_SIZE];
                scan_rows(&mut from_rows, pack_rows(&src, 4), order);
                assert_eq!(from_block, from_rows);
            }
        }
    }

    #[test]
    fn row_packing_keeps_sign() {
        let row = [-1i16, 2, i16::MIN, i16::MAX];
        assert_eq!(unpack_row(pack_row(&row)), row);
        assert_eq!(pack_row(&[1, 0, 0, 0]), 1);
        assert_eq!(pack_row(&[0, 0, 0, 1]), 1 << 48);
    }

    #[test]
    fn order_from_index_and_name() {
        assert_eq!(ScanOrder::from_index(0), Ok(ScanOrder::XY));
        assert_eq!(ScanOrder::from_index(1), Ok(ScanOrder::YX));
        assert!(ScanOrder::from_index(2).is_err());
        assert_eq!("YX".parse::<ScanOrder>(), Ok(ScanOrder::YX));
        assert!("zigzag".parse::<ScanOrder>().is_err());
    }
}
