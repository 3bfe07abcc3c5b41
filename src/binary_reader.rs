use debug_print::*;
use std::fs::File;
use std::io::{self, BufRead, Read};

/// Reads blocks of little-endian 16-bit coefficients.
pub struct BinaryReader<'a> {
    input: Box<dyn BufRead + 'a>,
    bytes_read: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn standard(stdin: &'a io::Stdin) -> BinaryReader<'a> {
        BinaryReader {
            input: Box::new(stdin.lock()),
            bytes_read: 0,
        }
    }

    pub fn file(path: String) -> io::Result<BinaryReader<'a>> {
        File::open(path).map(|file| BinaryReader {
            input: Box::new(io::BufReader::new(file)),
            bytes_read: 0,
        })
    }

    #[cfg(test)]
    pub fn vec(v: &'a [u8]) -> BinaryReader<'a> {
        BinaryReader {
            input: Box::new(v),
            bytes_read: 0,
        }
    }

    /// Fills `coeffs` with the next block. Returns 0 at a clean end of input
    /// and an error when the input ends in the middle of a block.
    pub fn read_coeffs(&mut self, coeffs: &mut [i16]) -> io::Result<usize> {
        let len = coeffs.len() * 2;
        let mut tmp: Vec<u8> = vec![0; len];
        let mut read_bytes = 0;
        while read_bytes < len {
            match self.input.read(&mut tmp[read_bytes..]) {
                Ok(0) => break,
                Ok(s) => read_bytes += s,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if read_bytes == 0 {
            return Ok(0);
        }
        if read_bytes < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "truncated block at byte {}: {} of {} bytes",
                    self.bytes_read, read_bytes, len
                ),
            ));
        }
        for (c, b) in coeffs.iter_mut().zip(tmp.chunks_exact(2)) {
            *c = i16::from_le_bytes([b[0], b[1]]);
        }
        self.bytes_read += len;
        debug_eprintln!("read {} coefficients", coeffs.len());
        Ok(coeffs.len())
    }
}
