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


use bls12_381_plus::{G1Projective, G2Projective};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use super::arith::{Bls12381Arith, GroupArith, G1_BYTES, G2_BYTES};


/// Public key of an anonymous attestation group.
///
/// `h1`, `h2` and `w` are guaranteed to lie in their groups once decoding
/// succeeds; `verify` does not re-validate them per call.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GroupPublicKey {
    pub gid: u32,
    pub h1: G1Projective,
    pub h2: G1Projective,
    pub w: G2Projective,
}

impl GroupPublicKey {

    pub const LENGTH: usize = 4 + 2 * G1_BYTES + G2_BYTES;

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[0..4].copy_from_slice(&self.gid.to_be_bytes());
        bytes[4..52].copy_from_slice(&Bls12381Arith::g1_to_bytes(&self.h1));
        bytes[52..100].copy_from_slice(&Bls12381Arith::g1_to_bytes(&self.h2));
        bytes[100..196].copy_from_slice(&Bls12381Arith::g2_to_bytes(&self.w));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: &[u8; Self::LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::DeserializationError("invalid group public key length".to_owned()))?;

        let gid = u32::from_be_bytes(bytes[0..4].try_into().unwrap());

        let parse_g1 = |slice: &[u8]| -> Result<G1Projective, Error> {
            Bls12381Arith::g1_from_bytes(slice.try_into().unwrap())
                .ok_or_else(|| Error::DeserializationError("invalid G1 element in group public key".to_owned()))
        };

        let h1 = parse_g1(&bytes[4..52])?;
        let h2 = parse_g1(&bytes[52..100])?;
        let w = Bls12381Arith::g2_from_bytes(bytes[100..196].try_into().unwrap())
            .ok_or_else(|| Error::DeserializationError("invalid G2 element in group public key".to_owned()))?;

        Ok(Self { gid, h1, h2, w })
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }
}
