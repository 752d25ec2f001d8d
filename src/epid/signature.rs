// Copyright 2023 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use bls12_381_plus::{G1Projective, Scalar};

use crate::errors::Error;
use crate::utils::util::read_u32_be;
use super::arith::{Bls12381Arith, GroupArith, G1_BYTES, SCALAR_BYTES};


/// Core anonymous-signature proof: knowledge of a member credential bound to
/// a message, without revealing the member.
///
/// All scalars are canonical elements of [0, p-1]; `from_bytes` rejects
/// anything else before a single group operation runs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BasicSignature {
    pub B: G1Projective,
    pub K: G1Projective,
    pub T1: G1Projective,
    pub T2: G1Projective,
    pub c: Scalar,
    pub sx: Scalar,
    pub sy: Scalar,
    pub sf: Scalar,
    pub sa: Scalar,
    pub sb: Scalar,
    pub salpha: Scalar,
    pub sbeta: Scalar,
}

impl BasicSignature {

    pub const LENGTH: usize = 4 * G1_BYTES + 8 * SCALAR_BYTES;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[0..48].copy_from_slice(&Bls12381Arith::g1_to_bytes(&self.B));
        bytes[48..96].copy_from_slice(&Bls12381Arith::g1_to_bytes(&self.K));
        bytes[96..144].copy_from_slice(&Bls12381Arith::g1_to_bytes(&self.T1));
        bytes[144..192].copy_from_slice(&Bls12381Arith::g1_to_bytes(&self.T2));
        let scalars = [
            &self.c, &self.sx, &self.sy, &self.sf, &self.sa, &self.sb, &self.salpha, &self.sbeta,
        ];
        for (i, s) in scalars.iter().enumerate() {
            let start = 192 + i * SCALAR_BYTES;
            bytes[start..start + SCALAR_BYTES].copy_from_slice(&Bls12381Arith::fp_to_bytes(s));
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; Self::LENGTH]) -> Result<Self, Error> {
        // Scalars first: range failures must surface before any point decode.
        let mut scalars = [Scalar::ZERO; 8];
        for (i, s) in scalars.iter_mut().enumerate() {
            let start = 192 + i * SCALAR_BYTES;
            *s = Bls12381Arith::fp_from_bytes(bytes[start..start + SCALAR_BYTES].try_into().unwrap())
                .ok_or_else(|| Error::BadArgument("signature scalar out of range".to_owned()))?;
        }
        let [c, sx, sy, sf, sa, sb, salpha, sbeta] = scalars;

        let parse_g1 = |slice: &[u8], name: &str| -> Result<G1Projective, Error> {
            Bls12381Arith::g1_from_bytes(slice.try_into().unwrap())
                .ok_or_else(|| Error::MathError(format!("failed to decode {} as a G1 element", name)))
        };

        let B = parse_g1(&bytes[0..48], "B")?;
        let K = parse_g1(&bytes[48..96], "K")?;
        let T1 = parse_g1(&bytes[96..144], "T1")?;
        let T2 = parse_g1(&bytes[144..192], "T2")?;

        Ok(Self { B, K, T1, T2, c, sx, sy, sf, sa, sb, salpha, sbeta })
    }
}


/// Non-revocation proof paired with one signature-revocation-list entry.
///
/// The point `T` stays in its wire form until the entry check runs, so that
/// a corrupt proof for a later entry cannot fail verification before the
/// earlier revocation stages have had their say.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NrProof {
    t: [u8; G1_BYTES],
    pub c: Scalar,
    pub smu: Scalar,
    pub snu: Scalar,
}

impl NrProof {

    pub const LENGTH: usize = G1_BYTES + 3 * SCALAR_BYTES;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[0..48].copy_from_slice(&self.t);
        bytes[48..80].copy_from_slice(&Bls12381Arith::fp_to_bytes(&self.c));
        bytes[80..112].copy_from_slice(&Bls12381Arith::fp_to_bytes(&self.smu));
        bytes[112..144].copy_from_slice(&Bls12381Arith::fp_to_bytes(&self.snu));
        bytes
    }

    pub fn from_bytes(bytes: &[u8; Self::LENGTH]) -> Result<Self, Error> {
        let parse_scalar = |slice: &[u8]| -> Result<Scalar, Error> {
            Bls12381Arith::fp_from_bytes(slice.try_into().unwrap())
                .ok_or_else(|| Error::BadArgument("non-revocation proof scalar out of range".to_owned()))
        };

        let c = parse_scalar(&bytes[48..80])?;
        let smu = parse_scalar(&bytes[80..112])?;
        let snu = parse_scalar(&bytes[112..144])?;

        let mut t = [0u8; G1_BYTES];
        t.copy_from_slice(&bytes[0..48]);

        Ok(Self { t, c, smu, snu })
    }

    pub(crate) fn from_parts(t: &G1Projective, c: Scalar, smu: Scalar, snu: Scalar) -> Self {
        Self { t: Bls12381Arith::g1_to_bytes(t), c, smu, snu }
    }

    pub(crate) fn t(&self) -> Result<G1Projective, Error> {
        Bls12381Arith::g1_from_bytes(&self.t)
            .ok_or_else(|| Error::MathError("failed to decode T as a G1 element".to_owned()))
    }
}


/// Full attestation signature: the basic signature plus one non-revocation
/// proof per entry of the signature revocation list it was produced against.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature {
    pub sigma0: BasicSignature,
    pub rl_ver: u32,
    pub sigma: Vec<NrProof>,
}

impl Signature {

    /// Fixed prefix: the basic signature plus `rl_ver` and `n2`.
    pub const HEADER_LENGTH: usize = BasicSignature::LENGTH + 8;

    pub fn n2(&self) -> u32 {
        self.sigma.len() as u32
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::with_capacity(Self::HEADER_LENGTH + self.sigma.len() * NrProof::LENGTH);
        bytes.extend_from_slice(&self.sigma0.to_bytes());
        bytes.extend_from_slice(&self.rl_ver.to_be_bytes());
        bytes.extend_from_slice(&(self.sigma.len() as u32).to_be_bytes());
        self.sigma.iter().for_each(|p| bytes.extend_from_slice(&p.to_bytes()));
        bytes
    }

    /// Bounds-checked parse. The declared proof count `n2` is validated
    /// against the byte length, with the multiplication guarded against
    /// overflow, before any proof is read.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::validate_length(bytes)?;

        let rl_ver = read_u32_be(bytes, BasicSignature::LENGTH);
        let n2 = read_u32_be(bytes, BasicSignature::LENGTH + 4) as usize;

        let mut sigma: Vec<NrProof> = Vec::with_capacity(n2);
        for chunk in bytes[Self::HEADER_LENGTH..].chunks_exact(NrProof::LENGTH) {
            sigma.push(NrProof::from_bytes(chunk.try_into().unwrap())?);
        }

        let sigma0 = BasicSignature::from_bytes(bytes[0..BasicSignature::LENGTH].try_into().unwrap())?;

        Ok(Self { sigma0, rl_ver, sigma })
    }

    /// The structural part of the parse: header present, `n2` consistent
    /// with the byte length, no overflow. Performs no decoding.
    pub(crate) fn validate_length(bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() < Self::HEADER_LENGTH {
            return Err(Error::BadArgument("signature shorter than fixed header".to_owned()));
        }
        let n2 = read_u32_be(bytes, BasicSignature::LENGTH + 4) as usize;
        let expected = n2
            .checked_mul(NrProof::LENGTH)
            .and_then(|proofs| proofs.checked_add(Self::HEADER_LENGTH))
            .ok_or_else(|| Error::BadArgument("proof count overflows signature size".to_owned()))?;
        if expected != bytes.len() {
            return Err(Error::BadArgument("signature length does not match proof count".to_owned()));
        }
        Ok(())
    }

    pub(crate) fn declared_n2(bytes: &[u8]) -> u32 {
        read_u32_be(bytes, BasicSignature::LENGTH + 4)
    }
}
