use std::io::{Cursor, Read, Result};

const SEED: u32 = 0;

pub fn content_hash<R: Read>(source: &mut R) -> Result<u128> {
    murmur3::murmur3_x64_128(source, SEED)
}

pub fn bytes_hash(data: &[u8]) -> u128 {
    // reading from memory cannot fail
    content_hash(&mut Cursor::new(data)).unwrap_or_default()
}
