use byteorder::{BigEndian, ByteOrder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use strata_nbt::TagType;

fn named(stream: &mut Vec<u8>, tag_type: TagType, name: &str) {
    stream.push(tag_type.id());
    stream.extend_from_slice(&(name.len() as u16).to_be_bytes());
    stream.extend_from_slice(name.as_bytes());
}

/// Tag stream of a cell at `(x, z)` with each listed section filled with a
/// single identifier.
pub fn cell_stream(x: i32, z: i32, sections: &[(u8, u8)]) -> Vec<u8> {
    let mut stream = Vec::new();
    named(&mut stream, TagType::Compound, "");
    named(&mut stream, TagType::Compound, "Level");
    named(&mut stream, TagType::Int, "xPos");
    stream.extend_from_slice(&x.to_be_bytes());
    named(&mut stream, TagType::Int, "zPos");
    stream.extend_from_slice(&z.to_be_bytes());
    named(&mut stream, TagType::List, "Sections");
    stream.push(TagType::Compound.id());
    stream.extend_from_slice(&(sections.len() as i32).to_be_bytes());
    for &(vertical_index, id) in sections {
        named(&mut stream, TagType::ByteArray, "Blocks");
        stream.extend_from_slice(&4096i32.to_be_bytes());
        stream.extend_from_slice(&[id; 4096]);
        named(&mut stream, TagType::Byte, "Y");
        stream.push(vertical_index);
        stream.push(TagType::End.id());
    }
    stream.push(TagType::End.id());
    stream.push(TagType::End.id());
    stream
}

/// Region file with each stream zlib compressed at its header index.
pub fn region(cells: &[(usize, Vec<u8>)]) -> Vec<u8> {
    let mut bytes = vec![0u8; 8192];
    for (index, stream) in cells {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(stream).unwrap();
        let compressed = encoder.finish().unwrap();

        let sector = (bytes.len() / 4096) as u32;
        let sectors = (compressed.len() + 5).div_ceil(4096) as u32;
        BigEndian::write_u32(&mut bytes[index * 4..index * 4 + 4], (sector << 8) | sectors);
        let mut header = [0u8; 5];
        BigEndian::write_u32(&mut header[..4], compressed.len() as u32 + 1);
        header[4] = 2;
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&compressed);
        bytes.resize((sector + sectors) as usize * 4096, 0);
    }
    bytes
}

pub async fn write_region(dir: &Path, name: &str, cells: &[(usize, Vec<u8>)]) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, region(cells)).await.unwrap();
    path
}
