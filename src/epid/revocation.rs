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
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::utils::util::read_u32_be;
use super::arith::{Bls12381Arith, GroupArith, G1_BYTES, SCALAR_BYTES};


fn entry_section_len(count: usize, entry_size: usize, header: usize) -> Result<usize, Error> {
    count
        .checked_mul(entry_size)
        .and_then(|entries| entries.checked_add(header))
        .ok_or_else(|| Error::BadArgument("revocation list entry count overflows size".to_owned()))
}

fn parse_g1_entry(slice: &[u8]) -> Result<G1Projective, Error> {
    Bls12381Arith::g1_from_bytes(slice.try_into().unwrap())
        .ok_or_else(|| Error::DeserializationError("invalid G1 element in revocation list".to_owned()))
}


/// Revocation list of whole groups, identified by group id.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GroupRl {
    pub version: u32,
    pub gids: Vec<u32>,
}

impl GroupRl {

    pub fn n3(&self) -> u32 {
        self.gids.len() as u32
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 4 * self.gids.len());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&(self.gids.len() as u32).to_be_bytes());
        self.gids.iter().for_each(|gid| bytes.extend_from_slice(&gid.to_be_bytes()));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 8 {
            return Err(Error::BadArgument("group revocation list shorter than header".to_owned()));
        }
        let version = read_u32_be(bytes, 0);
        let n3 = read_u32_be(bytes, 4) as usize;
        if entry_section_len(n3, 4, 8)? != bytes.len() {
            return Err(Error::BadArgument("group revocation list length does not match entry count".to_owned()));
        }
        let gids = bytes[8..].chunks_exact(4).map(|c| read_u32_be(c, 0)).collect();
        Ok(Self { version, gids })
    }
}


/// Revocation list of leaked member private-key exponents.
///
/// The exponents are as sensitive as the keys they came from; the list wipes
/// them when dropped, on every exit path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PrivRl {
    pub gid: u32,
    pub version: u32,
    f: Vec<Scalar>,
}

impl PrivRl {

    pub fn new(gid: u32, version: u32, f: Vec<Scalar>) -> Self {
        Self { gid, version, f }
    }

    pub fn n1(&self) -> u32 {
        self.f.len() as u32
    }

    pub fn revoked_exponents(&self) -> &[Scalar] {
        &self.f
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(12 + SCALAR_BYTES * self.f.len());
        bytes.extend_from_slice(&self.gid.to_be_bytes());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&(self.f.len() as u32).to_be_bytes());
        self.f.iter().for_each(|f| bytes.extend_from_slice(&Bls12381Arith::fp_to_bytes(f)));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 12 {
            return Err(Error::BadArgument("private-key revocation list shorter than header".to_owned()));
        }
        let gid = read_u32_be(bytes, 0);
        let version = read_u32_be(bytes, 4);
        let n1 = read_u32_be(bytes, 8) as usize;
        if entry_section_len(n1, SCALAR_BYTES, 12)? != bytes.len() {
            return Err(Error::BadArgument("private-key revocation list length does not match entry count".to_owned()));
        }
        let mut f = Vec::with_capacity(n1);
        for chunk in bytes[12..].chunks_exact(SCALAR_BYTES) {
            let exponent = Bls12381Arith::fp_from_bytes(chunk.try_into().unwrap())
                .ok_or_else(|| Error::DeserializationError("revoked exponent out of range".to_owned()))?;
            f.push(exponent);
        }
        Ok(Self { gid, version, f })
    }
}

impl Drop for PrivRl {
    fn drop(&mut self) {
        for f in self.f.iter_mut() {
            *f = Scalar::ZERO;
        }
    }
}


/// One revoked pseudonym: the `(B, K)` pair of a revoked signature.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SigRlEntry {
    pub b: G1Projective,
    pub k: G1Projective,
}

/// Revocation list of signatures; members prove non-revocation against every
/// entry.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SigRl {
    pub gid: u32,
    pub version: u32,
    pub entries: Vec<SigRlEntry>,
}

impl SigRl {

    pub const ENTRY_LENGTH: usize = 2 * G1_BYTES;

    pub fn n2(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(12 + Self::ENTRY_LENGTH * self.entries.len());
        bytes.extend_from_slice(&self.gid.to_be_bytes());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for entry in &self.entries {
            bytes.extend_from_slice(&Bls12381Arith::g1_to_bytes(&entry.b));
            bytes.extend_from_slice(&Bls12381Arith::g1_to_bytes(&entry.k));
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 12 {
            return Err(Error::BadArgument("signature revocation list shorter than header".to_owned()));
        }
        let gid = read_u32_be(bytes, 0);
        let version = read_u32_be(bytes, 4);
        let n2 = read_u32_be(bytes, 8) as usize;
        if entry_section_len(n2, Self::ENTRY_LENGTH, 12)? != bytes.len() {
            return Err(Error::BadArgument("signature revocation list length does not match entry count".to_owned()));
        }
        let mut entries = Vec::with_capacity(n2);
        for chunk in bytes[12..].chunks_exact(Self::ENTRY_LENGTH) {
            let b = parse_g1_entry(&chunk[0..G1_BYTES])?;
            let k = parse_g1_entry(&chunk[G1_BYTES..])?;
            entries.push(SigRlEntry { b, k });
        }
        Ok(Self { gid, version, entries })
    }
}


/// Verifier-local blocklist of pseudonyms, keyed by a single basename-bound
/// `B`. Never transmitted; grown by the verifier itself.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct VerifierRl {
    pub gid: u32,
    pub B: G1Projective,
    pub version: u32,
    pub ks: Vec<G1Projective>,
}

impl VerifierRl {

    pub fn n4(&self) -> u32 {
        self.ks.len() as u32
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(60 + G1_BYTES * self.ks.len());
        bytes.extend_from_slice(&self.gid.to_be_bytes());
        bytes.extend_from_slice(&Bls12381Arith::g1_to_bytes(&self.B));
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&(self.ks.len() as u32).to_be_bytes());
        self.ks.iter().for_each(|k| bytes.extend_from_slice(&Bls12381Arith::g1_to_bytes(k)));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 60 {
            return Err(Error::BadArgument("verifier revocation list shorter than header".to_owned()));
        }
        let gid = read_u32_be(bytes, 0);
        let B = parse_g1_entry(&bytes[4..52])?;
        let version = read_u32_be(bytes, 52);
        let n4 = read_u32_be(bytes, 56) as usize;
        if entry_section_len(n4, G1_BYTES, 60)? != bytes.len() {
            return Err(Error::BadArgument("verifier revocation list length does not match entry count".to_owned()));
        }
        let mut ks = Vec::with_capacity(n4);
        for chunk in bytes[60..].chunks_exact(G1_BYTES) {
            ks.push(parse_g1_entry(chunk)?);
        }
        Ok(Self { gid, B, version, ks })
    }
}
