// src/bitreader.rs
//! Bit source with an explicit cursor. Every read is bounds-checked against
//! the bits that remain, so malformed input fails instead of over-reading.

use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::entropy::{Code, DecodeTable};
use crate::error::{Error, Result};
use crate::format::MAX_CODE_LEN;

pub struct BitStreamReader<'a> {
    reader:   BitReader<Cursor<&'a [u8]>, BigEndian>,
    position: usize,
    total:    usize,
}

impl<'a> BitStreamReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        BitStreamReader {
            reader:   BitReader::endian(Cursor::new(input), BigEndian),
            position: 0,
            total:    input.len() * 8,
        }
    }

    /// A reader whose cursor starts `position` bits into `input`.
    pub fn at(input: &'a [u8], position: usize) -> Result<Self> {
        let mut r = Self::new(input);
        r.ensure(position)?;
        let mut left = position;
        while left > 0 {
            let step = left.min(u32::MAX as usize);
            r.reader.skip(step as u32)?;
            left -= step;
        }
        r.position = position;
        Ok(r)
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.total - self.position
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.total - self.position;
        if needed > remaining {
            return Err(Error::TruncatedStream { needed, remaining });
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        self.ensure(1)?;
        let bit = self.reader.read_bit()?;
        self.position += 1;
        Ok(bit)
    }

    /// Consumes the next `width` bits as a bit sequence.
    pub fn read(&mut self, width: u32) -> Result<Code> {
        let value = self.read_int(width)?;
        Code::from_bits(value, width)
    }

    /// Consumes the next `width` bits as an unsigned big-endian integer.
    pub fn read_int(&mut self, width: u32) -> Result<u64> {
        if width > u64::BITS {
            return Err(Error::Format {
                field: "read width",
                value: width as u64,
                width: u64::BITS,
            });
        }
        self.ensure(width as usize)?;
        if width == 0 {
            return Ok(0);
        }
        let value = self.reader.read::<u64>(width)?;
        self.position += width as usize;
        Ok(value)
    }

    /// Reads one bit at a time until the accumulated bits equal a code of
    /// `table`. Gives up after the table's longest code length.
    pub fn read_prefix_code(&mut self, table: &DecodeTable) -> Result<u32> {
        let max_len = table.max_len().min(MAX_CODE_LEN);
        let mut code = Code::empty();
        while code.len() < max_len {
            code = code.push(self.read_bit()?)?;
            if let Some(value) = table.get(code) {
                return Ok(value);
            }
        }
        Err(Error::InvalidPrefixCode {
            table: table.index(),
            max_len,
        })
    }
}
