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
use elliptic_curve::hash2curve::ExpandMsg;

use crate::errors::Error;
use super::arith::{Bls12381Arith as Arith, GroupArith, FIELD_ORDER_BE};
use super::ciphersuites::EpidCiphersuite;
use super::commitment::CommitmentHasher;
use super::keys::GroupPublicKey;
use super::revocation::SigRlEntry;
use super::signature::{BasicSignature, NrProof};
use super::verifier::VerifierPrecomp;


/// Verifies the basic signature: a Schnorr-style proof of knowledge of a
/// member credential `(A, x, y, f)` with `A^(x+gamma) = g1 h1^f h2^y` and
/// `K = B^f`, blinded through `T1 = A h2^a` and `T2 = h1^a h2^b`.
///
/// Recomputes the two commitments the challenge was derived from: `R1` folds
/// the G1-side relations (pseudonym, commitment opening, opening times `x`)
/// under the shared challenge, `R2` is the pairing relation against the
/// precomputed values. The challenge is then recomputed over the full
/// parameter transcript and compared.
pub(crate) fn core_basic_verify<CS>(
    pk: &GroupPublicKey,
    precomp: &VerifierPrecomp,
    sig0: &BasicSignature,
    basename_point: Option<&G1Projective>,
    message: &[u8],
) -> Result<(), Error>
where
    CS: EpidCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    // A signature with a degenerate pseudonym base is forgeable by anyone.
    if Arith::g1_is_identity(&sig0.B) || Arith::g1_is_identity(&sig0.K) {
        return Err(Error::InvalidSignature);
    }

    if let Some(bsn_point) = basename_point {
        if !Arith::g1_is_equal(&sig0.B, bsn_point) {
            return Err(Error::InvalidSignature);
        }
    }

    let g1 = G1Projective::GENERATOR;
    let g2 = G2Projective::GENERATOR;

    let nc = -sig0.c;
    let nsx = -sig0.sx;

    let R1 = Arith::g1_multi_exp(
        &[sig0.B, sig0.K, pk.h1, pk.h2, sig0.T2],
        &[sig0.sf, nc, sig0.sa + sig0.salpha, sig0.sb + sig0.sbeta, nc + nsx],
    );

    let t1 = Arith::g2_multi_exp(&[g2, pk.w], &[nsx, nc]);
    let R2 = Arith::pairing(&sig0.T1, &t1)
        + Arith::gt_multi_exp(
            &[precomp.eg12, precomp.e12, precomp.e22, precomp.e2w],
            &[sig0.c, sig0.sf, sig0.sy + sig0.salpha, sig0.sa],
        );

    let mut hasher = CommitmentHasher::new();
    hasher.append(&FIELD_ORDER_BE);
    hasher.append_g1(&g1);
    hasher.append_g2(&g2);
    hasher.append_g1(&pk.h1);
    hasher.append_g1(&pk.h2);
    hasher.append_g2(&pk.w);
    hasher.append_g1(&sig0.B);
    hasher.append_g1(&sig0.K);
    hasher.append_g1(&sig0.T1);
    hasher.append_g1(&sig0.T2);
    hasher.append_g1(&R1);
    hasher.append_gt(&R2);
    let c_prime = hasher.finalize::<CS>(Some(message))?;

    if c_prime == sig0.c {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}


/// Verifies one non-revocation proof: the signer of `(B, K)` is not the
/// member behind the revoked pseudonym `(b', k')`.
///
/// The prover knows `mu, nu` with `K^mu B^nu = 1` and `T = k'^mu b'^nu`; a
/// revoked signer could only satisfy both with `T` equal to the identity,
/// which is rejected outright. `Ok` means this entry does not revoke the
/// signer; an invalid proof surfaces as `RevokedInSigRl`.
pub(crate) fn core_nr_verify<CS>(
    sig0: &BasicSignature,
    entry: &SigRlEntry,
    proof: &NrProof,
    message: &[u8],
) -> Result<(), Error>
where
    CS: EpidCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let T = proof.t()?;
    if Arith::g1_is_identity(&T) {
        return Err(Error::RevokedInSigRl);
    }

    let nc = -proof.c;

    let R1 = Arith::g1_multi_exp(&[sig0.K, sig0.B], &[proof.smu, proof.snu]);
    let R2 = Arith::g1_multi_exp(&[entry.k, entry.b, T], &[proof.smu, proof.snu, nc]);

    let mut hasher = CommitmentHasher::new();
    hasher.append(&FIELD_ORDER_BE);
    hasher.append_g1(&G1Projective::GENERATOR);
    hasher.append_g1(&sig0.B);
    hasher.append_g1(&sig0.K);
    hasher.append_g1(&entry.b);
    hasher.append_g1(&entry.k);
    hasher.append_g1(&T);
    hasher.append_g1(&R1);
    hasher.append_g1(&R2);
    let c_prime = hasher.finalize::<CS>(Some(message))?;

    if c_prime == proof.c {
        Ok(())
    } else {
        Err(Error::RevokedInSigRl)
    }
}
