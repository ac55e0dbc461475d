// src/bitwriter.rs
//! Append-only bit sink. Values are written MSB first with no alignment;
//! only the final byte is zero-padded when the stream is exported.

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::entropy::Code;
use crate::error::Result;
use crate::format::ensure_fits;

pub struct BitStreamWriter {
    writer: BitWriter<Vec<u8>, BigEndian>,
    len:    usize,
}

impl BitStreamWriter {
    pub fn new() -> Self {
        BitStreamWriter {
            writer: BitWriter::endian(Vec::new(), BigEndian),
            len:    0,
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.len
    }

    /// Writes `value` as `width` bits. Values wider than `width` are rejected.
    pub fn write(&mut self, value: u64, width: u32) -> Result<()> {
        self.write_field("bit field", value, width)
    }

    /// Same as [`write`](Self::write) but names the field in the error.
    pub fn write_field(&mut self, field: &'static str, value: u64, width: u32) -> Result<()> {
        ensure_fits(field, value, width.min(u64::BITS))?;
        if width > u64::BITS {
            // Leading zeros first; the value itself fits the low 64 bits.
            for _ in 0..width - u64::BITS {
                self.writer.write_bit(false)?;
            }
            self.writer.write(u64::BITS, value)?;
        } else if width > 0 {
            self.writer.write(width, value)?;
        }
        self.len += width as usize;
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.writer.write_bit(bit)?;
        self.len += 1;
        Ok(())
    }

    /// Appends a prefix code verbatim.
    pub fn append(&mut self, code: Code) -> Result<()> {
        if !code.is_empty() {
            self.writer.write(code.len(), code.bits())?;
        }
        self.len += code.len() as usize;
        Ok(())
    }

    /// Pads the last partial byte with zeros and returns the buffer.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.writer.byte_align()?;
        Ok(self.writer.into_writer())
    }
}

impl Default for BitStreamWriter {
    fn default() -> Self {
        Self::new()
    }
}
