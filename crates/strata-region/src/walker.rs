use strata_common::{Axis, Result};
use strata_logger::{log, LogSeverity::Debug};
use strata_nbt::{payload_size, NbtCursor, Tag, TagHeader, TagType};

pub const TAG_X_POS: &str = "xPos";
pub const TAG_Z_POS: &str = "zPos";
pub const TAG_SECTIONS: &str = "Sections";
pub const TAG_BLOCKS: &str = "Blocks";
pub const TAG_Y: &str = "Y";

/// Receives the values the walker picks out of a cell's tag stream.
pub trait TagVisitor {
    fn coordinate(&mut self, axis: Axis, value: i32) -> Result<()>;

    fn vertical_index(&mut self, index: u8) -> Result<()>;

    fn identifiers(&mut self, identifiers: &[u8]) -> Result<()>;
}

/// Walks an inflated cell payload from start to end as a flat sequence of
/// tags, reporting coordinates and section data to `visitor`.
///
/// Compounds are entered implicitly (their payload size is zero) and the
/// `Sections` list is entered by consuming only its header; every other
/// payload is skipped by size. An unknown tag type ends the walk with an
/// error since the stream cannot be resynchronized past it.
pub fn walk<V: TagVisitor>(buffer: &[u8], visitor: &mut V) -> Result<()> {
    let mut cursor = NbtCursor::new(buffer);

    while !cursor.is_empty() {
        let header = TagHeader::read(&mut cursor)?;
        let name = match header.name {
            Some(name) => name,
            // End closes the innermost compound; its single byte is consumed.
            None => continue,
        };

        match (header.tag_type, name) {
            (TagType::Int, TAG_X_POS) | (TagType::Int, TAG_Z_POS) => {
                let axis = if name == TAG_X_POS { Axis::X } else { Axis::Z };
                let value = Tag::read_payload(&mut cursor, TagType::Int)?;
                visitor.coordinate(axis, value.as_i32().unwrap_or_default())?;
            }
            (TagType::Byte, TAG_Y) => {
                // Section indices are unsigned.
                let value = Tag::read_payload(&mut cursor, TagType::Byte)?;
                visitor.vertical_index(value.as_i8().unwrap_or_default() as u8)?;
            }
            (TagType::ByteArray, TAG_BLOCKS) => {
                let blocks = Tag::read_payload(&mut cursor, TagType::ByteArray)?;
                visitor.identifiers(blocks.as_bytes().unwrap_or_default())?;
            }
            (TagType::List, TAG_SECTIONS) => {
                if let Tag::List { element_type, len } =
                    Tag::read_payload(&mut cursor, TagType::List)?
                {
                    log(
                        format!("Entering {} {} of {}", len, TAG_SECTIONS, element_type),
                        Debug,
                    );
                }
            }
            (tag_type, _) => {
                let size = payload_size(tag_type, buffer, cursor.position())?;
                cursor.skip(size)?;
            }
        }
    }

    Ok(())
}
