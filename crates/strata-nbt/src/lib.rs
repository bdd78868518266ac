//! Read-only view of the NBT tag stream: tag kinds, the payload size grammar
//! and a structural tag decoder. Containers are never materialized; a list or
//! compound only reports its header and the caller keeps walking the stream.

pub mod cursor;

use byteorder::{BigEndian, ByteOrder};
use std::fmt;
use strata_common::{Result, StrataError};

pub use cursor::NbtCursor;

/// The twelve tag kinds understood by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
}

impl TryFrom<u8> for TagType {
    type Error = StrataError;

    fn try_from(type_id: u8) -> Result<Self> {
        match type_id {
            0 => Ok(TagType::End),
            1 => Ok(TagType::Byte),
            2 => Ok(TagType::Short),
            3 => Ok(TagType::Int),
            4 => Ok(TagType::Long),
            5 => Ok(TagType::Float),
            6 => Ok(TagType::Double),
            7 => Ok(TagType::ByteArray),
            8 => Ok(TagType::String),
            9 => Ok(TagType::List),
            10 => Ok(TagType::Compound),
            11 => Ok(TagType::IntArray),
            _ => Err(StrataError::UnknownTagType(type_id)),
        }
    }
}

impl TagType {
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Payload width of scalar kinds, `None` for everything sized by a prefix
    /// or by its contents.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TagType::End | TagType::Byte => Some(1),
            TagType::Short => Some(2),
            TagType::Int | TagType::Float => Some(4),
            TagType::Long | TagType::Double => Some(8),
            _ => None,
        }
    }

    pub fn is_fixed_width(self) -> bool {
        self.fixed_width().is_some()
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagType::End => "TAG_End",
            TagType::Byte => "TAG_Byte",
            TagType::Short => "TAG_Short",
            TagType::Int => "TAG_Int",
            TagType::Long => "TAG_Long",
            TagType::Float => "TAG_Float",
            TagType::Double => "TAG_Double",
            TagType::ByteArray => "TAG_Byte_Array",
            TagType::String => "TAG_String",
            TagType::List => "TAG_List",
            TagType::Compound => "TAG_Compound",
            TagType::IntArray => "TAG_Int_Array",
        };
        write!(f, "{}", name)
    }
}

fn read_length_prefix(buffer: &[u8], offset: usize, width: usize) -> Result<usize> {
    let bytes = offset
        .checked_add(width)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(StrataError::OutOfBounds {
            offset,
            length: width,
            available: buffer.len(),
        })?;
    match width {
        2 => Ok(BigEndian::read_u16(bytes) as usize),
        _ => {
            let length = BigEndian::read_i32(bytes);
            usize::try_from(length).map_err(|_| StrataError::NegativeLength { offset, length })
        }
    }
}

/// Byte size of the payload of a `tag_type` tag whose payload starts at
/// `offset` in `buffer`.
///
/// Compounds report zero: their children follow in the stream and have to be
/// walked. List elements are sized by calling back in with an empty buffer,
/// so only lists of fixed-width kinds (or of compounds) can be skipped; any
/// other non-empty list is rejected.
pub fn payload_size(tag_type: TagType, buffer: &[u8], offset: usize) -> Result<usize> {
    match tag_type {
        TagType::End | TagType::Byte => Ok(1),
        TagType::Short => Ok(2),
        TagType::Int | TagType::Float => Ok(4),
        TagType::Long | TagType::Double => Ok(8),
        TagType::ByteArray => Ok(4 + read_length_prefix(buffer, offset, 4)?),
        TagType::IntArray => {
            let length = read_length_prefix(buffer, offset, 4)?;
            Ok(length.saturating_mul(4).saturating_add(4))
        }
        TagType::String => Ok(2 + read_length_prefix(buffer, offset, 2)?),
        TagType::List => {
            let element_id = *buffer.get(offset).ok_or(StrataError::OutOfBounds {
                offset,
                length: 5,
                available: buffer.len(),
            })?;
            let element_type = TagType::try_from(element_id)?;
            let count = read_length_prefix(buffer, offset + 1, 4)?;
            if count == 0 {
                return Ok(5);
            }
            if !element_type.is_fixed_width() && element_type != TagType::Compound {
                return Err(StrataError::UnsupportedListElement(element_id));
            }
            let element_size = payload_size(element_type, &[], 0)?;
            Ok(element_size.saturating_mul(count).saturating_add(5))
        }
        TagType::Compound => Ok(0),
    }
}

/// Type and name of the tag at the cursor. `End` tags carry no name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader<'a> {
    pub tag_type: TagType,
    pub name: Option<&'a str>,
}

impl<'a> TagHeader<'a> {
    pub fn read(cursor: &mut NbtCursor<'a>) -> Result<Self> {
        let tag_type = TagType::try_from(cursor.read_u8()?)?;
        if tag_type == TagType::End {
            return Ok(TagHeader {
                tag_type,
                name: None,
            });
        }

        let name_length = cursor.read_u16()? as usize;
        let name_offset = cursor.position();
        let name_bytes = cursor.read_bytes(name_length)?;
        let name = std::str::from_utf8(name_bytes).map_err(|_| StrataError::InvalidUtf8 {
            offset: name_offset,
        })?;
        Ok(TagHeader {
            tag_type,
            name: Some(name),
        })
    }
}

/// One decoded payload, borrowing from the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag<'a> {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(&'a [u8]),
    String(&'a str),
    /// Header only; the elements follow in the stream.
    List { element_type: TagType, len: usize },
    /// Marker only; the children follow in the stream.
    Compound,
    /// Raw big-endian elements.
    IntArray(&'a [u8]),
}

impl<'a> Tag<'a> {
    /// Reads the payload of a `tag_type` tag. For lists this consumes the
    /// five byte header only, for compounds nothing at all.
    pub fn read_payload(cursor: &mut NbtCursor<'a>, tag_type: TagType) -> Result<Self> {
        match tag_type {
            TagType::End => Ok(Tag::End),
            TagType::Byte => Ok(Tag::Byte(cursor.read_i8()?)),
            TagType::Short => Ok(Tag::Short(cursor.read_i16()?)),
            TagType::Int => Ok(Tag::Int(cursor.read_i32()?)),
            TagType::Long => Ok(Tag::Long(cursor.read_i64()?)),
            TagType::Float => Ok(Tag::Float(cursor.read_f32()?)),
            TagType::Double => Ok(Tag::Double(cursor.read_f64()?)),
            TagType::ByteArray => {
                let length = read_signed_length(cursor)?;
                Ok(Tag::ByteArray(cursor.read_bytes(length)?))
            }
            TagType::String => {
                let length = cursor.read_u16()? as usize;
                let offset = cursor.position();
                std::str::from_utf8(cursor.read_bytes(length)?)
                    .map(Tag::String)
                    .map_err(|_| StrataError::InvalidUtf8 { offset })
            }
            TagType::List => {
                let element_type = TagType::try_from(cursor.read_u8()?)?;
                let len = read_signed_length(cursor)?;
                Ok(Tag::List { element_type, len })
            }
            TagType::Compound => Ok(Tag::Compound),
            TagType::IntArray => {
                let length = read_signed_length(cursor)?;
                Ok(Tag::IntArray(cursor.read_bytes(length.saturating_mul(4))?))
            }
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Tag::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }
}

fn read_signed_length(cursor: &mut NbtCursor<'_>) -> Result<usize> {
    let offset = cursor.position();
    let length = cursor.read_i32()?;
    usize::try_from(length).map_err(|_| StrataError::NegativeLength { offset, length })
}
