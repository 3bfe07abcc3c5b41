extern crate num;
#[macro_use]
extern crate num_derive;
#[cfg(target_arch = "x86_64")]
mod avx2;
pub mod codec;
pub mod common;
pub mod error;
pub mod params;
pub mod quantizer;
pub mod scan;
pub mod sign;
pub mod verify;
#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Codec;
pub use codec::{
    available_tiers, codec_for, dequantize_block, detect, quantize_block, scan_groups, select,
    unscan_groups, CodecTier, CoefficientCodec, ReferenceCodec,
};
pub use common::{CoeffBlock, CG_SIZE, CG_WIDTH};
pub use error::CoeffError;
pub use params::QuantParams;
pub use quantizer::{dequantize, quantize};
pub use scan::{inverse_scan, scan_block, scan_rows, ScanOrder};
pub use sign::{abs_coeff, add_sign, count_nonzero};
