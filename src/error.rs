use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoeffError {
    #[error("block length {0} is not a multiple of the coefficient group size")]
    UnalignedLength(usize),
    #[error("shift {0} is outside 0..=31")]
    ShiftOutOfRange(i32),
    #[error("negative scale {0}")]
    NegativeScale(i32),
    #[error("negative rounding offset {0}")]
    NegativeAdd(i32),
    #[error("scale {0} exceeds 65535")]
    ScaleOutOfRange(i32),
    #[error("rounding offset {0} exceeds 65535 for dequantization")]
    AddOutOfRange(i32),
    #[error("unknown scan order {0}")]
    UnknownScanOrder(String),
    #[error("unknown implementation tier {0}")]
    UnknownTier(String),
    #[error("implementation tier {0} is not supported on this cpu")]
    UnsupportedTier(String),
    #[error("{op} differs from the reference at iteration {iteration}")]
    TierMismatch { op: &'static str, iteration: usize },
}
