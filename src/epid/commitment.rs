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


use bls12_381_plus::{G1Projective, G2Projective, Gt, Scalar};
use elliptic_curve::hash2curve::ExpandMsg;

use crate::errors::Error;
use super::arith::{Bls12381Arith, GroupArith};
use super::ciphersuites::EpidCiphersuite;


/// Builds the ordered byte sequence of group and signature parameters and
/// hashes it to a field element (the Fiat-Shamir challenge).
///
/// Every blob is fixed-width, so the concatenation is unambiguous without
/// separators; the message, if any, goes last.
pub struct CommitmentHasher {
    octets: Vec<u8>,
}

impl CommitmentHasher {

    pub fn new() -> Self {
        Self { octets: Vec::new() }
    }

    pub fn append(&mut self, blob: &[u8]) {
        self.octets.extend_from_slice(blob);
    }

    pub fn append_g1(&mut self, point: &G1Projective) {
        self.octets.extend_from_slice(&Bls12381Arith::g1_to_bytes(point));
    }

    pub fn append_g2(&mut self, point: &G2Projective) {
        self.octets.extend_from_slice(&Bls12381Arith::g2_to_bytes(point));
    }

    pub fn append_gt(&mut self, value: &Gt) {
        self.octets.extend_from_slice(&Bls12381Arith::gt_to_bytes(value));
    }

    pub fn append_scalar(&mut self, scalar: &Scalar) {
        self.octets.extend_from_slice(&Bls12381Arith::fp_to_bytes(scalar));
    }

    /// Reduce the accumulated octets, with the optional message appended, to
    /// an element of [0, p-1]. A message that is present but empty means the
    /// caller's presence and length flags disagree.
    pub fn finalize<CS: EpidCiphersuite>(mut self, message: Option<&[u8]>) -> Result<Scalar, Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if let Some(m) = message {
            if m.is_empty() {
                return Err(Error::BadArgument("message present but empty".to_owned()));
            }
            self.octets.extend_from_slice(m);
        }
        let dst = [CS::ID, CS::CHALLENGE_DST].concat();
        Bls12381Arith::hash_to_field::<CS>(&self.octets, &dst)
    }
}

impl Default for CommitmentHasher {
    fn default() -> Self {
        Self::new()
    }
}
