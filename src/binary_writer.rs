use std::fs::File;
use std::io::{self, Write};

/// Writes little-endian 16-bit coefficients.
pub struct BinaryWriter<'a> {
    output: Box<dyn Write + 'a>,
    buf: Vec<u8>,
}

impl<'a> BinaryWriter<'a> {
    pub fn standard(stdout: &'a io::Stdout) -> BinaryWriter<'a> {
        BinaryWriter {
            output: Box::new(stdout.lock()),
            buf: vec![],
        }
    }

    pub fn file(path: String) -> io::Result<BinaryWriter<'a>> {
        File::create(path).map(|file| BinaryWriter {
            output: Box::new(io::BufWriter::new(file)),
            buf: vec![],
        })
    }

    #[cfg(test)]
    pub fn vec(v: &'a mut Vec<u8>) -> BinaryWriter<'a> {
        BinaryWriter {
            output: Box::new(v),
            buf: vec![],
        }
    }

    pub fn write_coeffs(&mut self, coeffs: &[i16]) -> io::Result<()> {
        self.buf.clear();
        self.buf
            .extend(coeffs.iter().flat_map(|c| c.to_le_bytes()));
        self.output.write_all(&self.buf)
    }
}

impl<'a> Write for BinaryWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
