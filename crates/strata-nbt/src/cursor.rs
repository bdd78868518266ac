use byteorder::{BigEndian, ByteOrder};
use strata_common::{Result, StrataError};

/// Read cursor over an NBT byte stream. Holds the buffer and the position
/// of the next unread byte; every read is bounds checked and big-endian.
#[derive(Debug, Clone)]
pub struct NbtCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> NbtCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrows the next `length` bytes and advances past them.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .filter(|&end| end <= self.buffer.len())
            .ok_or(StrataError::OutOfBounds {
                offset: self.position,
                length,
                available: self.buffer.len(),
            })?;
        let bytes = &self.buffer[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub fn skip(&mut self, length: usize) -> Result<()> {
        self.read_bytes(length).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(self.read_bytes(8)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_cursor_new() {
        let cursor = NbtCursor::new(&[1, 2, 3]);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.remaining(), 3);

        let empty = NbtCursor::new(&[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_big_endian_reads() {
        let bytes = [
            0x7F, // u8
            0x01, 0x02, // u16
            0xFF, 0xFF, 0xFF, 0xFE, // i32
            0x00, 0x00, 0x10, 0x00, // u32
        ];
        let mut cursor = NbtCursor::new(&bytes);
        assert_eq!(cursor.read_u8().unwrap(), 0x7F);
        assert_eq!(cursor.read_u16().unwrap(), 0x0102);
        assert_eq!(cursor.read_i32().unwrap(), -2);
        assert_eq!(cursor.read_u32().unwrap(), 4096);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_read_bytes_advances() {
        let bytes = [1, 2, 3, 4, 5];
        let mut cursor = NbtCursor::new(&bytes);
        cursor.skip(1).unwrap();
        assert_eq!(cursor.read_bytes(3).unwrap(), &[2, 3, 4]);
        assert_eq!(cursor.position(), 4);
        cursor.skip(1).unwrap();
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_truncated_reads_are_out_of_bounds() {
        let mut cursor = NbtCursor::new(&[0x00, 0x01, 0x02]);
        assert_matches!(
            cursor.read_i32(),
            Err(StrataError::OutOfBounds {
                offset: 0,
                length: 4,
                available: 3
            })
        );
        // A failed read leaves the cursor where it was.
        assert_eq!(cursor.position(), 0);
        assert_matches!(cursor.skip(usize::MAX), Err(StrataError::OutOfBounds { .. }));
    }
}
