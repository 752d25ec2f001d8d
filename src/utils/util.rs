use bls12_381_plus::Scalar;
use ff::Field;
use rand::rngs::OsRng;

pub fn get_random() -> Scalar {
    Scalar::random(&mut OsRng)
}

/// Reads a big-endian u32 at `offset`. Caller guarantees the bounds.
pub(crate) fn read_u32_be(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}
