//! Primitive TL encodings over a byte buffer.
//!
//! All integers are little-endian. Byte strings carry a 1-byte length (up to
//! 253) or `0xfe` plus a 3-byte length, and are zero padded so the total is a
//! multiple of 4.

use crate::error::{WireError, WireResult};

pub use tlgen_core::identity::{BOOL_FALSE, BOOL_TRUE};

const SHORT_LENGTH_LIMIT: usize = 253;
const LONG_LENGTH_MARKER: u8 = 0xfe;
const MAX_LENGTH: usize = (1 << 24) - 1;

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Growable output buffer.
#[derive(Debug, Default, Clone)]
pub struct TlWriter {
    buf: Vec<u8>,
}

impl TlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Raw fixed-width data (`int128`, `int256`).
    pub fn write_raw(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u32(if value { BOOL_TRUE } else { BOOL_FALSE });
    }

    /// Length-prefixed, padded byte string.
    pub fn write_bytes(&mut self, data: &[u8]) -> WireResult<()> {
        let header = if data.len() <= SHORT_LENGTH_LIMIT {
            self.buf.push(data.len() as u8);
            1
        } else if data.len() <= MAX_LENGTH {
            self.buf.push(LONG_LENGTH_MARKER);
            self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes()[..3]);
            4
        } else {
            return Err(WireError::InvalidLength(format!(
                "{} bytes exceeds {MAX_LENGTH}",
                data.len()
            )));
        };
        self.buf.extend_from_slice(data);
        let pad = padding(header + data.len());
        self.buf.resize(self.buf.len() + pad, 0);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> WireResult<()> {
        self.write_bytes(value.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over borrowed input.
#[derive(Debug, Clone)]
pub struct TlReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TlReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> WireResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(WireError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> WireResult<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> WireResult<i64> {
        self.take_array().map(i64::from_le_bytes)
    }

    pub fn read_f64(&mut self) -> WireResult<f64> {
        self.take_array().map(f64::from_le_bytes)
    }

    pub fn read_int128(&mut self) -> WireResult<[u8; 16]> {
        self.take_array()
    }

    pub fn read_int256(&mut self) -> WireResult<[u8; 32]> {
        self.take_array()
    }

    /// Look at the next `u32` without consuming it.
    pub fn peek_u32(&self) -> WireResult<u32> {
        self.clone().read_u32()
    }

    pub fn read_bool(&mut self) -> WireResult<bool> {
        match self.read_u32()? {
            BOOL_TRUE => Ok(true),
            BOOL_FALSE => Ok(false),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    pub fn read_bytes(&mut self) -> WireResult<Vec<u8>> {
        let first = self.take(1)?[0];
        let (header, len) = match first {
            LONG_LENGTH_MARKER => {
                let raw = self.take(3)?;
                (4, u32::from_le_bytes([raw[0], raw[1], raw[2], 0]) as usize)
            }
            0xff => {
                return Err(WireError::InvalidLength(format!(
                    "prefix 0xff at offset {}",
                    self.pos - 1
                )));
            }
            short => (1, short as usize),
        };
        let data = self.take(len)?.to_vec();
        self.take(padding(header + len))?;
        Ok(data)
    }

    pub fn read_string(&mut self) -> WireResult<String> {
        let offset = self.pos;
        String::from_utf8(self.read_bytes()?).map_err(|_| WireError::InvalidUtf8 { offset })
    }
}
