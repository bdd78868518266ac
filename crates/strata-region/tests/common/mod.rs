#![allow(dead_code)]

use byteorder::{BigEndian, ByteOrder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use strata_nbt::TagType;

/// Writes tag streams the way a game save lays them out.
#[derive(Default)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        StreamBuilder::default()
    }

    pub fn named(mut self, tag_type: TagType, name: &str) -> Self {
        self.bytes.push(tag_type.id());
        self.bytes
            .extend_from_slice(&(name.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(name.as_bytes());
        self
    }

    pub fn compound(self, name: &str) -> Self {
        self.named(TagType::Compound, name)
    }

    pub fn byte(self, name: &str, value: u8) -> Self {
        let mut builder = self.named(TagType::Byte, name);
        builder.bytes.push(value);
        builder
    }

    pub fn int(self, name: &str, value: i32) -> Self {
        let mut builder = self.named(TagType::Int, name);
        builder.bytes.extend_from_slice(&value.to_be_bytes());
        builder
    }

    pub fn long(self, name: &str, value: i64) -> Self {
        let mut builder = self.named(TagType::Long, name);
        builder.bytes.extend_from_slice(&value.to_be_bytes());
        builder
    }

    pub fn byte_array(self, name: &str, values: &[u8]) -> Self {
        let mut builder = self.named(TagType::ByteArray, name);
        builder
            .bytes
            .extend_from_slice(&(values.len() as i32).to_be_bytes());
        builder.bytes.extend_from_slice(values);
        builder
    }

    pub fn int_array(self, name: &str, values: &[i32]) -> Self {
        let mut builder = self.named(TagType::IntArray, name);
        builder
            .bytes
            .extend_from_slice(&(values.len() as i32).to_be_bytes());
        for value in values {
            builder.bytes.extend_from_slice(&value.to_be_bytes());
        }
        builder
    }

    pub fn list(self, name: &str, element_type: TagType, len: i32) -> Self {
        let mut builder = self.named(TagType::List, name);
        builder.bytes.push(element_type.id());
        builder.bytes.extend_from_slice(&len.to_be_bytes());
        builder
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn end(mut self) -> Self {
        self.bytes.push(TagType::End.id());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A cell at `(x, z)` whose sections are each filled with a single identifier.
pub fn cell_stream(x: i32, z: i32, sections: &[(u8, u8)]) -> Vec<u8> {
    let mut builder = StreamBuilder::new()
        .compound("")
        .compound("Level")
        .int("xPos", x)
        .int("zPos", z)
        .long("LastUpdate", 1_234_567)
        .byte("TerrainPopulated", 1)
        .int_array("HeightMap", &[64; 256])
        .list("Entities", TagType::End, 0)
        .list("TileEntities", TagType::Compound, 0)
        .list("Sections", TagType::Compound, sections.len() as i32);
    for &(vertical_index, id) in sections {
        builder = builder
            .byte("Y", vertical_index)
            .byte_array("Blocks", &[id; 4096])
            .byte_array("Data", &[0; 2048])
            .byte_array("SkyLight", &[0xFF; 2048])
            .byte_array("BlockLight", &[0; 2048])
            .end();
    }
    builder.end().end().build()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Region file holding the given tag streams at the given header indices,
/// each zlib compressed into its own run of sectors.
pub fn region(cells: &[(usize, Vec<u8>)]) -> Vec<u8> {
    let mut bytes = vec![0u8; 8192];
    for (index, stream) in cells {
        let compressed = zlib(stream);
        let sector = (bytes.len() / 4096) as u32;
        let sectors = (compressed.len() + 5).div_ceil(4096) as u32;
        BigEndian::write_u32(
            &mut bytes[index * 4..index * 4 + 4],
            (sector << 8) | sectors,
        );

        let mut header = [0u8; 5];
        BigEndian::write_u32(&mut header[..4], compressed.len() as u32 + 1);
        header[4] = 2;
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&compressed);
        bytes.resize((sector + sectors) as usize * 4096, 0);
    }
    bytes
}
