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


use bls12_381_plus::{G1Projective, G2Projective, Scalar};
use elliptic_curve::hash2curve::ExpandMsg;

use crate::errors::Error;
use crate::utils::util::get_random;
use super::arith::{Bls12381Arith as Arith, GroupArith, FIELD_ORDER_BE};
use super::ciphersuites::{Bls12381Sha256, Bls12381Sha384, Bls12381Sha512, EpidCiphersuite};
use super::commitment::CommitmentHasher;
use super::keys::GroupPublicKey;
use super::revocation::{GroupRl, PrivRl, SigRl, SigRlEntry};
use super::signature::{BasicSignature, NrProof, Signature};
use super::verifier::{VerifierContext, VerifierPrecomp};


// Member-side fixture. Issuance and signing live here because the crate's
// public surface is verification only; the signer exists to produce honest
// signatures for the verifier to judge.

struct IssuerKey {
    gamma: Scalar,
}

struct MemberKey {
    A: G1Projective,
    x: Scalar,
    y: Scalar,
    f: Scalar,
}

impl Drop for MemberKey {
    fn drop(&mut self) {
        self.x = Scalar::ZERO;
        self.y = Scalar::ZERO;
        self.f = Scalar::ZERO;
    }
}

fn create_group(gid: u32) -> (GroupPublicKey, IssuerKey) {
    let gamma = get_random();
    let pub_key = GroupPublicKey {
        gid,
        h1: G1Projective::GENERATOR * get_random(),
        h2: G1Projective::GENERATOR * get_random(),
        w: G2Projective::GENERATOR * gamma,
    };
    (pub_key, IssuerKey { gamma })
}

fn issue_member(pub_key: &GroupPublicKey, issuer: &IssuerKey) -> MemberKey {
    let x = get_random();
    let y = get_random();
    let f = get_random();
    let base = G1Projective::GENERATOR + pub_key.h1 * f + pub_key.h2 * y;
    let A = base * (x + issuer.gamma).invert().unwrap();
    MemberKey { A, x, y, f }
}

fn basename_point<CS: EpidCiphersuite>(bsn: &[u8]) -> G1Projective
where
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let dst = [CS::ID, CS::BASENAME_DST].concat();
    Arith::hash_to_curve::<CS>(bsn, &dst)
}

fn nr_prove<CS: EpidCiphersuite>(
    B: &G1Projective,
    K: &G1Projective,
    f: &Scalar,
    entry: &SigRlEntry,
    message: &[u8],
) -> NrProof
where
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let mu = get_random();
    let nu = -(f * mu);
    let T = entry.k * mu + entry.b * nu;

    let rmu = get_random();
    let rnu = get_random();
    let R1 = K * rmu + B * rnu;
    let R2 = entry.k * rmu + entry.b * rnu;

    let mut hasher = CommitmentHasher::new();
    hasher.append(&FIELD_ORDER_BE);
    hasher.append_g1(&G1Projective::GENERATOR);
    hasher.append_g1(B);
    hasher.append_g1(K);
    hasher.append_g1(&entry.b);
    hasher.append_g1(&entry.k);
    hasher.append_g1(&T);
    hasher.append_g1(&R1);
    hasher.append_g1(&R2);
    let c = hasher.finalize::<CS>(Some(message)).unwrap();

    NrProof::from_parts(&T, c, rmu + c * mu, rnu + c * nu)
}

fn sign<CS: EpidCiphersuite>(
    pub_key: &GroupPublicKey,
    member: &MemberKey,
    base: Option<&G1Projective>,
    sig_rl: Option<&SigRl>,
    message: &[u8],
) -> Signature
where
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let precomp = VerifierPrecomp::compute(pub_key);
    let g1 = G1Projective::GENERATOR;
    let g2 = G2Projective::GENERATOR;

    let B = base.copied().unwrap_or_else(|| g1 * get_random());
    let K = B * member.f;

    let a = get_random();
    let b = get_random();
    let alpha = a * member.x;
    let beta = b * member.x;

    let T1 = member.A + pub_key.h2 * a;
    let T2 = pub_key.h1 * a + pub_key.h2 * b;

    let rx = get_random();
    let ry = get_random();
    let rf = get_random();
    let ra = get_random();
    let rb = get_random();
    let ralpha = get_random();
    let rbeta = get_random();

    let R1 = B * rf + pub_key.h1 * (ra + ralpha) + pub_key.h2 * (rb + rbeta) + T2 * (-rx);
    let R2 = Arith::pairing(&T1, &(g2 * (-rx)))
        + precomp.e12 * rf
        + precomp.e22 * (ry + ralpha)
        + precomp.e2w * ra;

    let mut hasher = CommitmentHasher::new();
    hasher.append(&FIELD_ORDER_BE);
    hasher.append_g1(&g1);
    hasher.append_g2(&g2);
    hasher.append_g1(&pub_key.h1);
    hasher.append_g1(&pub_key.h2);
    hasher.append_g2(&pub_key.w);
    hasher.append_g1(&B);
    hasher.append_g1(&K);
    hasher.append_g1(&T1);
    hasher.append_g1(&T2);
    hasher.append_g1(&R1);
    hasher.append_gt(&R2);
    let c = hasher.finalize::<CS>(Some(message)).unwrap();

    let sigma0 = BasicSignature {
        B,
        K,
        T1,
        T2,
        c,
        sx: rx + c * member.x,
        sy: ry + c * member.y,
        sf: rf + c * member.f,
        sa: ra + c * a,
        sb: rb + c * b,
        salpha: ralpha + c * alpha,
        sbeta: rbeta + c * beta,
    };

    let (rl_ver, sigma) = match sig_rl {
        Some(rl) => {
            let proofs = rl
                .entries
                .iter()
                .map(|entry| nr_prove::<CS>(&B, &K, &member.f, entry, message))
                .collect();
            (rl.version, proofs)
        }
        None => (0, Vec::new()),
    };

    Signature { sigma0, rl_ver, sigma }
}

/// A pseudonym `(b', k')` as it would appear on a SigRl for `member`.
fn revoked_pseudonym_of(member: &MemberKey) -> SigRlEntry {
    let b = G1Projective::GENERATOR * get_random();
    SigRlEntry { b, k: b * member.f }
}


const MSG: &[u8] = b"test message";

#[test]
fn valid_signature_verifies() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG);

    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    assert!(ctx.verify(&sig.to_bytes(), MSG).is_ok());
}

#[test]
fn valid_signature_verifies_with_every_suite() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);

    let sig = sign::<Bls12381Sha384>(&pub_key, &member, None, None, MSG);
    let ctx = VerifierContext::<Bls12381Sha384>::new(pub_key.clone());
    assert!(ctx.verify(&sig.to_bytes(), MSG).is_ok());

    let sig = sign::<Bls12381Sha512>(&pub_key, &member, None, None, MSG);
    let ctx = VerifierContext::<Bls12381Sha512>::new(pub_key);
    assert!(ctx.verify(&sig.to_bytes(), MSG).is_ok());
}

#[test]
fn suite_mismatch_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG);

    let ctx = VerifierContext::<Bls12381Sha512>::new(pub_key);
    assert_eq!(ctx.verify(&sig.to_bytes(), MSG), Err(Error::InvalidSignature));
}

#[test]
fn empty_and_absent_revocation_lists_agree() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);

    let empty_sig_rl = SigRl { gid: 1, version: 7, entries: Vec::new() };
    let empty_priv_rl = PrivRl::new(1, 3, Vec::new());
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&empty_sig_rl), MSG);

    let bare = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());
    let mut loaded = VerifierContext::<Bls12381Sha256>::new(pub_key);
    loaded.set_priv_rl(&empty_priv_rl.to_bytes()).unwrap();
    loaded.set_sig_rl(&empty_sig_rl.to_bytes()).unwrap();

    assert_eq!(bare.verify(&sig.to_bytes(), MSG), Ok(()));
    assert_eq!(loaded.verify(&sig.to_bytes(), MSG), Ok(()));
}

#[test]
fn verification_is_idempotent() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    let first = ctx.verify(&sig, MSG);
    let second = ctx.verify(&sig, MSG);
    assert_eq!(first, second);
    assert_eq!(first, Ok(()));
}

#[test]
fn tampered_challenge_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let mut sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();
    // last byte of c
    sig[223] ^= 0x01;

    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    assert_eq!(ctx.verify(&sig, MSG), Err(Error::InvalidSignature));
}

#[test]
fn tampered_response_scalar_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());

    // last byte of each of sx..sbeta
    for scalar_index in 0..7 {
        let mut sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();
        sig[224 + scalar_index * 32 + 31] ^= 0x01;
        assert_eq!(ctx.verify(&sig, MSG), Err(Error::InvalidSignature));
    }
}

#[test]
fn tampered_point_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());

    // B, K, T1, T2 in turn; a flipped coordinate byte either fails the
    // decode or perturbs the recomputed challenge
    for point_index in 0..4 {
        let mut sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();
        sig[point_index * 48 + 20] ^= 0x01;
        let res = ctx.verify(&sig, MSG);
        assert!(
            matches!(res, Err(Error::InvalidSignature) | Err(Error::MathError(_))),
            "unexpected result {:?}",
            res
        );
    }
}

#[test]
fn different_message_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    assert_eq!(ctx.verify(&sig, b"another message"), Err(Error::InvalidSignature));
}

#[test]
fn revoked_group_is_rejected() {
    let (pub_key, issuer) = create_group(42);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let group_rl = GroupRl { version: 1, gids: vec![7, 42, 9] };
    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_group_rl(&group_rl.to_bytes()).unwrap();
    assert_eq!(ctx.verify(&sig, MSG), Err(Error::RevokedInGroupRl));
}

#[test]
fn revoked_private_key_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let priv_rl = PrivRl::new(1, 1, vec![get_random(), member.f, get_random()]);
    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_priv_rl(&priv_rl.to_bytes()).unwrap();
    assert_eq!(ctx.verify(&sig, MSG), Err(Error::RevokedInPrivRl));
}

#[test]
fn revoked_signature_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let innocent = issue_member(&pub_key, &issuer);

    let sig_rl = SigRl {
        gid: 1,
        version: 2,
        entries: vec![revoked_pseudonym_of(&innocent), revoked_pseudonym_of(&member)],
    };
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&sig_rl), MSG).to_bytes();

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_sig_rl(&sig_rl.to_bytes()).unwrap();
    assert_eq!(ctx.verify(&sig, MSG), Err(Error::RevokedInSigRl));
}

#[test]
fn unrevoked_member_passes_signature_revocation_list() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let revoked = issue_member(&pub_key, &issuer);

    let sig_rl = SigRl {
        gid: 1,
        version: 2,
        entries: vec![revoked_pseudonym_of(&revoked), revoked_pseudonym_of(&revoked)],
    };
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&sig_rl), MSG).to_bytes();

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_sig_rl(&sig_rl.to_bytes()).unwrap();
    assert_eq!(ctx.verify(&sig, MSG), Ok(()));
}

#[test]
fn private_key_revocation_wins_over_signature_revocation() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);

    let sig_rl = SigRl { gid: 1, version: 1, entries: vec![revoked_pseudonym_of(&member)] };
    let priv_rl = PrivRl::new(1, 1, vec![member.f]);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&sig_rl), MSG).to_bytes();

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_priv_rl(&priv_rl.to_bytes()).unwrap();
    ctx.set_sig_rl(&sig_rl.to_bytes()).unwrap();
    assert_eq!(ctx.verify(&sig, MSG), Err(Error::RevokedInPrivRl));
}

#[test]
fn revocation_list_version_mismatch_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);

    let sig_rl = SigRl { gid: 1, version: 3, entries: Vec::new() };
    let mut sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&sig_rl), MSG).to_bytes();
    // rl_ver is not covered by the challenge, so only the version check can
    // catch this
    sig[451] ^= 0x01;

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_sig_rl(&sig_rl.to_bytes()).unwrap();
    assert!(matches!(ctx.verify(&sig, MSG), Err(Error::BadArgument(_))));
}

#[test]
fn proof_count_mismatch_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let revoked = issue_member(&pub_key, &issuer);

    // signed before the list grew: zero proofs against a one-entry list
    let old_rl = SigRl { gid: 1, version: 0, entries: Vec::new() };
    let new_rl = SigRl { gid: 1, version: 0, entries: vec![revoked_pseudonym_of(&revoked)] };
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&old_rl), MSG).to_bytes();

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    ctx.set_sig_rl(&new_rl.to_bytes()).unwrap();
    assert!(matches!(ctx.verify(&sig, MSG), Err(Error::BadArgument(_))));
}

#[test]
fn basename_binds_the_pseudonym_base() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());
    ctx.set_basename(b"service-17").unwrap();

    let bound = basename_point::<Bls12381Sha256>(b"service-17");
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, Some(&bound), None, MSG).to_bytes();
    assert_eq!(ctx.verify(&sig, MSG), Ok(()));

    // a random-base signature must not pass a basename-bound verifier
    let unbound = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();
    assert_eq!(ctx.verify(&unbound, MSG), Err(Error::InvalidSignature));
}

#[test]
fn blacklisted_pseudonym_is_rejected() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let other = issue_member(&pub_key, &issuer);

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());
    ctx.set_basename(b"service-17").unwrap();
    let bound = basename_point::<Bls12381Sha256>(b"service-17");

    let sig = sign::<Bls12381Sha256>(&pub_key, &member, Some(&bound), None, MSG).to_bytes();
    ctx.blacklist(&sig, MSG).unwrap();
    assert_eq!(ctx.verifier_rl().unwrap().n4(), 1);

    // same signer, same basename: linkable, rejected
    let linked = sign::<Bls12381Sha256>(&pub_key, &member, Some(&bound), None, MSG).to_bytes();
    assert_eq!(ctx.verify(&linked, MSG), Err(Error::RevokedInVerifierRl));

    // a different member under the same basename is unaffected
    let others = sign::<Bls12381Sha256>(&pub_key, &other, Some(&bound), None, MSG).to_bytes();
    assert_eq!(ctx.verify(&others, MSG), Ok(()));
}

#[test]
fn blacklist_requires_a_basename() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    assert_eq!(ctx.blacklist(&sig, MSG), Err(Error::MissingBasename));
}

#[test]
fn verifier_rl_survives_serialization() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());
    ctx.set_basename(b"service-17").unwrap();
    let bound = basename_point::<Bls12381Sha256>(b"service-17");
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, Some(&bound), None, MSG).to_bytes();
    ctx.blacklist(&sig, MSG).unwrap();

    let exported = ctx.verifier_rl().unwrap().to_bytes();
    let mut fresh = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());
    fresh.set_basename(b"service-17").unwrap();
    fresh.set_verifier_rl(&exported).unwrap();

    let linked = sign::<Bls12381Sha256>(&pub_key, &member, Some(&bound), None, MSG).to_bytes();
    assert_eq!(fresh.verify(&linked, MSG), Err(Error::RevokedInVerifierRl));
}

#[test]
fn precomputation_roundtrip() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let ctx = VerifierContext::<Bls12381Sha256>::new(pub_key.clone());
    let blob = ctx.precomputation().to_bytes();

    let restored = VerifierContext::<Bls12381Sha256>::new_with_precomputation(pub_key, &blob).unwrap();
    assert_eq!(restored.verify(&sig, MSG), Ok(()));
}

#[test]
fn precomputation_gid_mismatch_is_rejected() {
    let (pub_key, _) = create_group(1);
    let (other_key, _) = create_group(2);

    let blob = VerifierContext::<Bls12381Sha256>::new(other_key).precomputation().to_bytes();
    let res = VerifierContext::<Bls12381Sha256>::new_with_precomputation(pub_key, &blob);
    assert!(matches!(res, Err(Error::BadArgument(_))));
}

#[test]
fn context_snapshot_is_unaffected_by_update() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, None, MSG).to_bytes();

    let mut ctx = VerifierContext::<Bls12381Sha256>::new(pub_key);
    let snapshot = ctx.clone();
    let priv_rl = PrivRl::new(1, 1, vec![member.f]);
    ctx.set_priv_rl(&priv_rl.to_bytes()).unwrap();

    assert_eq!(snapshot.verify(&sig, MSG), Ok(()));
    assert_eq!(ctx.verify(&sig, MSG), Err(Error::RevokedInPrivRl));
}

#[test]
fn signature_roundtrips_through_bytes() {
    let (pub_key, issuer) = create_group(1);
    let member = issue_member(&pub_key, &issuer);
    let revoked = issue_member(&pub_key, &issuer);

    let sig_rl = SigRl { gid: 1, version: 5, entries: vec![revoked_pseudonym_of(&revoked)] };
    let sig = sign::<Bls12381Sha256>(&pub_key, &member, None, Some(&sig_rl), MSG);

    let parsed = Signature::from_bytes(&sig.to_bytes()).unwrap();
    assert_eq!(parsed, sig);
    assert_eq!(parsed.rl_ver, 5);
    assert_eq!(parsed.n2(), 1);
}
