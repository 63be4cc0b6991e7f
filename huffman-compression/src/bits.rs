use bit_vec::BitVec;

use crate::error::{CodecError, Result};

/// Zero bits appended to a bitstream of `bit_len` bits when it is packed.
pub fn padding_len(bit_len: usize) -> usize {
    (8 - bit_len % 8) % 8
}

/// Packs a string of `'0'`/`'1'` characters into bytes, most significant bit
/// first. The last byte is padded on the right with zeros.
pub fn pack(bits: &str) -> Result<Vec<u8>> {
    let mut bit_vec = BitVec::with_capacity(bits.len());
    for (position, ch) in bits.chars().enumerate() {
        match ch {
            '0' => bit_vec.push(false),
            '1' => bit_vec.push(true),
            found => return Err(CodecError::InvalidBitString { position, found }),
        }
    }
    Ok(bit_vec.to_bytes())
}

/// Renders every byte as eight `'0'`/`'1'` characters, padding included.
pub fn unpack(bytes: &[u8]) -> String {
    BitVec::from_bytes(bytes)
        .iter()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}
