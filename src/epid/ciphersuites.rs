use sha2::{Sha256, Sha384, Sha512};
use elliptic_curve::hash2curve::{ExpandMsg, ExpandMsgXmd};
use digest::HashMarker;


pub trait EpidCiphersuite {
    const ID: &'static [u8];
    /// Domain separation suffix for the Fiat-Shamir challenge hash.
    const CHALLENGE_DST: &'static [u8] = b"H2F_";
    /// Domain separation suffix for hashing a basename into G1.
    const BASENAME_DST: &'static [u8] = b"BSN_";
    /// Output length of expand_message, wide enough for unbiased reduction mod p.
    const EXPAND_LEN: usize = 48;
    type HashAlg: HashMarker;
    type Expander: ExpandMsg<'static>;
}


pub struct Bls12381Sha256 {}
pub struct Bls12381Sha384 {}
pub struct Bls12381Sha512 {}


impl EpidCiphersuite for Bls12381Sha256 {
    const ID: &'static [u8] = b"EPID_BLS12381G1_XMD:SHA-256_SSWU_RO_";
    type HashAlg = Sha256;
    type Expander = ExpandMsgXmd<Self::HashAlg>;
}

impl EpidCiphersuite for Bls12381Sha384 {
    const ID: &'static [u8] = b"EPID_BLS12381G1_XMD:SHA-384_SSWU_RO_";
    type HashAlg = Sha384;
    type Expander = ExpandMsgXmd<Self::HashAlg>;
}

impl EpidCiphersuite for Bls12381Sha512 {
    const ID: &'static [u8] = b"EPID_BLS12381G1_XMD:SHA-512_SSWU_RO_";
    type HashAlg = Sha512;
    type Expander = ExpandMsgXmd<Self::HashAlg>;
}
