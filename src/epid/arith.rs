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


use bls12_381_plus::{multi_miller_loop, G1Affine, G1Projective, G2Affine, G2Projective, G2Prepared, Gt, Scalar};
use elliptic_curve::hash2curve::{ExpandMsg, Expander};
use group::Curve;

use crate::errors::Error;
use super::ciphersuites::EpidCiphersuite;

pub const G1_BYTES: usize = 48;
pub const G2_BYTES: usize = 96;
pub const GT_BYTES: usize = 576;
pub const SCALAR_BYTES: usize = 32;

/// Order of the prime-order groups, big-endian. Hashed as the `p` parameter
/// of every commitment.
pub(crate) const FIELD_ORDER_BE: [u8; SCALAR_BYTES] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48,
    0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe,
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// Pairing-group capability consumed by the verification engine.
///
/// Everything the engine needs from the algebra backend goes through this
/// surface: exponentiation, simultaneous multi-exponentiation, pairing,
/// identity/equality tests, hash-to-field, hash-to-curve and the canonical
/// fixed-width encodings. The backend is required to be safe to call from
/// multiple threads at once.
pub trait GroupArith {
    fn g1_exp(point: &G1Projective, exp: &Scalar) -> G1Projective;
    /// Simultaneous multi-exponentiation: prod points[i]^exps[i]. Extra
    /// entries on either side are ignored.
    fn g1_multi_exp(points: &[G1Projective], exps: &[Scalar]) -> G1Projective;
    fn g2_multi_exp(points: &[G2Projective], exps: &[Scalar]) -> G2Projective;
    fn gt_multi_exp(values: &[Gt], exps: &[Scalar]) -> Gt;
    fn pairing(p: &G1Projective, q: &G2Projective) -> Gt;
    fn g1_is_identity(point: &G1Projective) -> bool;
    fn g1_is_equal(a: &G1Projective, b: &G1Projective) -> bool;
    /// Hash arbitrary octets to a nonzero element of [0, p-1].
    fn hash_to_field<CS: EpidCiphersuite>(data: &[u8], dst: &[u8]) -> Result<Scalar, Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>;
    fn hash_to_curve<CS: EpidCiphersuite>(data: &[u8], dst: &[u8]) -> G1Projective
    where
        CS::Expander: for<'a> ExpandMsg<'a>;

    fn g1_to_bytes(point: &G1Projective) -> [u8; G1_BYTES];
    fn g1_from_bytes(bytes: &[u8; G1_BYTES]) -> Option<G1Projective>;
    fn g2_to_bytes(point: &G2Projective) -> [u8; G2_BYTES];
    fn g2_from_bytes(bytes: &[u8; G2_BYTES]) -> Option<G2Projective>;
    fn gt_to_bytes(value: &Gt) -> [u8; GT_BYTES];
    fn gt_from_bytes(bytes: &[u8; GT_BYTES]) -> Option<Gt>;
    fn fp_to_bytes(scalar: &Scalar) -> [u8; SCALAR_BYTES];
    fn fp_from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Option<Scalar>;
}


/// BLS12-381 instantiation over `bls12_381_plus`.
pub struct Bls12381Arith;

impl GroupArith for Bls12381Arith {
    fn g1_exp(point: &G1Projective, exp: &Scalar) -> G1Projective {
        point * exp
    }

    fn g1_multi_exp(points: &[G1Projective], exps: &[Scalar]) -> G1Projective {
        points
            .iter()
            .zip(exps.iter())
            .fold(G1Projective::IDENTITY, |acc, (p, e)| acc + p * e)
    }

    fn g2_multi_exp(points: &[G2Projective], exps: &[Scalar]) -> G2Projective {
        points
            .iter()
            .zip(exps.iter())
            .fold(G2Projective::IDENTITY, |acc, (p, e)| acc + p * e)
    }

    fn gt_multi_exp(values: &[Gt], exps: &[Scalar]) -> Gt {
        values
            .iter()
            .zip(exps.iter())
            .fold(Gt::IDENTITY, |acc, (v, e)| acc + v * e)
    }

    fn pairing(p: &G1Projective, q: &G2Projective) -> Gt {
        let term = (p.to_affine(), G2Prepared::from(q.to_affine()));
        multi_miller_loop(&[(&term.0, &term.1)]).final_exponentiation()
    }

    fn g1_is_identity(point: &G1Projective) -> bool {
        point.is_identity().into()
    }

    fn g1_is_equal(a: &G1Projective, b: &G1Projective) -> bool {
        a == b
    }

    fn hash_to_field<CS: EpidCiphersuite>(data: &[u8], dst: &[u8]) -> Result<Scalar, Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let mut counter: u8 = 0;
        let mut hashed_scalar = Scalar::ZERO;
        let mut uniform_bytes = vec![0u8; CS::EXPAND_LEN];

        while hashed_scalar == Scalar::ZERO {
            let msg_prime = [data, &[counter; 1][..]].concat();
            CS::Expander::expand_message(&[msg_prime.as_slice()], &[dst], CS::EXPAND_LEN)
                .map_err(|_| Error::HashToFieldError)?
                .fill_bytes(&mut uniform_bytes);
            let okm = uniform_bytes
                .as_slice()
                .try_into()
                .map_err(|_| Error::HashToFieldError)?;
            hashed_scalar = Scalar::from_okm(okm);
            counter = counter.wrapping_add(1);
        }

        Ok(hashed_scalar)
    }

    fn hash_to_curve<CS: EpidCiphersuite>(data: &[u8], dst: &[u8]) -> G1Projective
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        G1Projective::hash::<CS::Expander>(data, dst)
    }

    fn g1_to_bytes(point: &G1Projective) -> [u8; G1_BYTES] {
        point.to_affine().to_compressed()
    }

    fn g1_from_bytes(bytes: &[u8; G1_BYTES]) -> Option<G1Projective> {
        Option::<G1Affine>::from(G1Affine::from_compressed(bytes)).map(G1Projective::from)
    }

    fn g2_to_bytes(point: &G2Projective) -> [u8; G2_BYTES] {
        point.to_affine().to_compressed()
    }

    fn g2_from_bytes(bytes: &[u8; G2_BYTES]) -> Option<G2Projective> {
        Option::<G2Affine>::from(G2Affine::from_compressed(bytes)).map(G2Projective::from)
    }

    fn gt_to_bytes(value: &Gt) -> [u8; GT_BYTES] {
        let mut bytes = [0u8; GT_BYTES];
        bytes.copy_from_slice(value.to_bytes().as_ref());
        bytes
    }

    fn gt_from_bytes(bytes: &[u8; GT_BYTES]) -> Option<Gt> {
        Option::<Gt>::from(Gt::from_bytes(bytes))
    }

    fn fp_to_bytes(scalar: &Scalar) -> [u8; SCALAR_BYTES] {
        scalar.to_be_bytes()
    }

    fn fp_from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Option<Scalar> {
        Option::<Scalar>::from(Scalar::from_be_bytes(bytes))
    }
}
