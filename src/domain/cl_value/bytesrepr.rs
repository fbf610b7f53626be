//! Cursor over the canonical little-endian binary encoding.

use num_bigint::BigUint;

use crate::domain::error::ClValueError;

/// Reads primitives off a byte slice, failing cleanly on truncation.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes the next `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns `ClValueError::EndOfBytes` if fewer than `count` remain.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], ClValueError> {
        if count > self.remaining() {
            return Err(ClValueError::end_of_bytes(count, self.remaining()));
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Takes everything that is left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.position..];
        self.position = self.bytes.len();
        slice
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ClValueError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, ClValueError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, ClValueError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(ClValueError::invalid_tag("bool", tag)),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32, ClValueError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ClValueError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, ClValueError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, ClValueError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_hash(&mut self) -> Result<[u8; 32], ClValueError> {
        self.take_array()
    }

    /// Length-prefixed unsigned big integer (U128/U256/U512).
    ///
    /// # Errors
    ///
    /// Fails when the length byte exceeds `max_bytes` or the magnitude is truncated.
    pub fn read_big_uint(&mut self, max_bytes: usize) -> Result<BigUint, ClValueError> {
        let length = self.read_u8()?;
        if usize::from(length) > max_bytes {
            return Err(ClValueError::invalid_tag("big integer length", length));
        }
        Ok(BigUint::from_bytes_le(self.take(usize::from(length))?))
    }

    /// `u32` length followed by that many UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String, ClValueError> {
        let bytes = self.read_length_prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ClValueError::InvalidUtf8)
    }

    /// `u32` length followed by that many raw bytes.
    pub fn read_length_prefixed(&mut self) -> Result<&'a [u8], ClValueError> {
        let length = self.read_u32()? as usize;
        self.take(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian_primitives() {
        let bytes = [1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 1];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), 1);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert!(reader.read_bool().unwrap());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_big_uint_is_length_prefixed() {
        let bytes = [2, 0x00, 0x01];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_big_uint(64).unwrap(), BigUint::from(256u32));
    }

    #[test]
    fn test_truncation_is_reported() {
        let mut reader = ByteReader::new(&[5, 0, 0, 0, b'a']);
        assert_eq!(
            reader.read_string(),
            Err(ClValueError::end_of_bytes(5, 1))
        );
    }

    #[test]
    fn test_invalid_bool_tag() {
        let mut reader = ByteReader::new(&[2]);
        assert_eq!(
            reader.read_bool(),
            Err(ClValueError::invalid_tag("bool", 2))
        );
    }
}
