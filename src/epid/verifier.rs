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


use std::marker::PhantomData;

use bls12_381_plus::{G1Projective, G2Projective, Gt};
use elliptic_curve::hash2curve::ExpandMsg;

use crate::errors::Error;
use crate::utils::util::read_u32_be;
use super::arith::{Bls12381Arith as Arith, GroupArith, GT_BYTES};
use super::ciphersuites::EpidCiphersuite;
use super::keys::GroupPublicKey;
use super::proof::{core_basic_verify, core_nr_verify};
use super::revocation::{GroupRl, PrivRl, SigRl, VerifierRl};
use super::signature::{BasicSignature, Signature};


/// Pairing values that depend only on the group public key, computed once at
/// context creation and reused by every basic-signature check.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VerifierPrecomp {
    pub gid: u32,
    /// e(h1, g2)
    pub e12: Gt,
    /// e(h2, g2)
    pub e22: Gt,
    /// e(h2, w)
    pub e2w: Gt,
    /// e(g1, g2)
    pub eg12: Gt,
}

impl VerifierPrecomp {

    pub const LENGTH: usize = 4 + 4 * GT_BYTES;

    pub(crate) fn compute(pub_key: &GroupPublicKey) -> Self {
        let g1 = G1Projective::GENERATOR;
        let g2 = G2Projective::GENERATOR;
        Self {
            gid: pub_key.gid,
            e12: Arith::pairing(&pub_key.h1, &g2),
            e22: Arith::pairing(&pub_key.h2, &g2),
            e2w: Arith::pairing(&pub_key.h2, &pub_key.w),
            eg12: Arith::pairing(&g1, &g2),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LENGTH);
        bytes.extend_from_slice(&self.gid.to_be_bytes());
        for value in [&self.e12, &self.e22, &self.e2w, &self.eg12] {
            bytes.extend_from_slice(&Arith::gt_to_bytes(value));
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::LENGTH {
            return Err(Error::BadArgument("invalid precomputation length".to_owned()));
        }
        let gid = read_u32_be(bytes, 0);
        let mut values = [Gt::IDENTITY; 4];
        for (i, value) in values.iter_mut().enumerate() {
            let start = 4 + i * GT_BYTES;
            *value = Arith::gt_from_bytes(bytes[start..start + GT_BYTES].try_into().unwrap())
                .ok_or_else(|| Error::DeserializationError("invalid GT element in precomputation".to_owned()))?;
        }
        let [e12, e22, e2w, eg12] = values;
        Ok(Self { gid, e12, e22, e2w, eg12 })
    }
}


struct Basename {
    bsn: Vec<u8>,
    point: G1Projective,
}

/// One verifying party's state: the trusted group public key, its pairing
/// precomputation, and whatever revocation lists the verifier has been given.
///
/// A context is read-only for the duration of any `verify` call. Updates
/// (fresher revocation lists, a new basename) take `&mut self`; callers that
/// verify concurrently should swap in a replacement context and let in-flight
/// calls finish against the old snapshot.
pub struct VerifierContext<CS: EpidCiphersuite> {
    pub_key: GroupPublicKey,
    precomp: VerifierPrecomp,
    group_rl: Option<GroupRl>,
    priv_rl: Option<PrivRl>,
    sig_rl: Option<SigRl>,
    verifier_rl: Option<VerifierRl>,
    basename: Option<Basename>,
    _suite: PhantomData<CS>,
}

impl<CS: EpidCiphersuite> VerifierContext<CS> {

    pub fn new(pub_key: GroupPublicKey) -> Self {
        let precomp = VerifierPrecomp::compute(&pub_key);
        Self {
            pub_key,
            precomp,
            group_rl: None,
            priv_rl: None,
            sig_rl: None,
            verifier_rl: None,
            basename: None,
            _suite: PhantomData,
        }
    }

    /// Builds a context from a previously exported precomputation instead of
    /// re-deriving the pairings.
    pub fn new_with_precomputation(pub_key: GroupPublicKey, precomp: &[u8]) -> Result<Self, Error> {
        let precomp = VerifierPrecomp::from_bytes(precomp)?;
        if precomp.gid != pub_key.gid {
            return Err(Error::BadArgument("precomputation gid does not match public key".to_owned()));
        }
        Ok(Self {
            pub_key,
            precomp,
            group_rl: None,
            priv_rl: None,
            sig_rl: None,
            verifier_rl: None,
            basename: None,
            _suite: PhantomData,
        })
    }

    pub fn public_key(&self) -> &GroupPublicKey {
        &self.pub_key
    }

    pub fn precomputation(&self) -> &VerifierPrecomp {
        &self.precomp
    }

    pub fn verifier_rl(&self) -> Option<&VerifierRl> {
        self.verifier_rl.as_ref()
    }

    /// Installs (or replaces) the group revocation list. A list older than
    /// the one already installed is caller misuse.
    pub fn set_group_rl(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let rl = GroupRl::from_bytes(bytes)?;
        if let Some(current) = &self.group_rl {
            if rl.version < current.version {
                return Err(Error::BadArgument("group revocation list version rollback".to_owned()));
            }
        }
        self.group_rl = Some(rl);
        Ok(())
    }

    pub fn set_priv_rl(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let rl = PrivRl::from_bytes(bytes)?;
        if rl.gid != self.pub_key.gid {
            return Err(Error::BadArgument("private-key revocation list gid does not match public key".to_owned()));
        }
        if let Some(current) = &self.priv_rl {
            if rl.version < current.version {
                return Err(Error::BadArgument("private-key revocation list version rollback".to_owned()));
            }
        }
        self.priv_rl = Some(rl);
        Ok(())
    }

    pub fn set_sig_rl(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let rl = SigRl::from_bytes(bytes)?;
        if rl.gid != self.pub_key.gid {
            return Err(Error::BadArgument("signature revocation list gid does not match public key".to_owned()));
        }
        if let Some(current) = &self.sig_rl {
            if rl.version < current.version {
                return Err(Error::BadArgument("signature revocation list version rollback".to_owned()));
            }
        }
        self.sig_rl = Some(rl);
        Ok(())
    }

    pub fn set_verifier_rl(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let rl = VerifierRl::from_bytes(bytes)?;
        if rl.gid != self.pub_key.gid {
            return Err(Error::BadArgument("verifier revocation list gid does not match public key".to_owned()));
        }
        if let Some(current) = &self.verifier_rl {
            if rl.version < current.version {
                return Err(Error::BadArgument("verifier revocation list version rollback".to_owned()));
            }
        }
        self.verifier_rl = Some(rl);
        Ok(())
    }

    /// Binds this context to a basename. Signatures verified afterwards must
    /// carry `B = G1.hash(bsn)`, which makes them linkable to each other.
    pub fn set_basename(&mut self, bsn: &[u8]) -> Result<(), Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if bsn.is_empty() {
            return Err(Error::BadArgument("empty basename".to_owned()));
        }
        let dst = [CS::ID, CS::BASENAME_DST].concat();
        let point = Arith::hash_to_curve::<CS>(bsn, &dst);
        self.basename = Some(Basename { bsn: bsn.to_vec(), point });
        Ok(())
    }

    pub fn basename(&self) -> Option<&[u8]> {
        self.basename.as_ref().map(|b| b.bsn.as_slice())
    }

    /// Decides whether `signature` over `message` was produced by some
    /// legitimate, non-revoked member of the group.
    ///
    /// The stages run in a fixed order and stop at the first failure:
    /// structural validation, basic-signature check, then the group,
    /// private-key, signature and verifier-local revocation lists. The order
    /// is part of the protocol contract: it decides which status a caller
    /// sees when a signer is revoked in more than one list.
    pub fn verify(&self, signature: &[u8], message: &[u8]) -> Result<(), Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if message.is_empty() {
            return Err(Error::BadArgument("empty message".to_owned()));
        }
        Signature::validate_length(signature)?;
        if self.sig_rl.is_none() && Signature::declared_n2(signature) != 0 {
            return Err(Error::BadArgument("non-revocation proofs supplied without a signature revocation list".to_owned()));
        }

        let sig = Signature::from_bytes(signature)?;

        core_basic_verify::<CS>(
            &self.pub_key,
            &self.precomp,
            &sig.sigma0,
            self.basename.as_ref().map(|b| &b.point),
            message,
        )?;

        self.check_group_rl()?;
        self.check_priv_rl(&sig.sigma0)?;
        self.check_sig_rl(&sig, message)?;
        self.check_verifier_rl(&sig.sigma0)?;

        Ok(())
    }

    /// Verifies `signature` and, if it is valid, records its pseudonym on the
    /// verifier-local revocation list so later signatures by the same signer
    /// under the same basename are rejected.
    pub fn blacklist(&mut self, signature: &[u8], message: &[u8]) -> Result<(), Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let basename_point = match &self.basename {
            Some(b) => b.point,
            None => return Err(Error::MissingBasename),
        };

        self.verify(signature, message)?;
        let sig = Signature::from_bytes(signature)?;

        match &mut self.verifier_rl {
            Some(rl) => {
                rl.ks.push(sig.sigma0.K);
                rl.version += 1;
            }
            None => {
                self.verifier_rl = Some(VerifierRl {
                    gid: self.pub_key.gid,
                    B: basename_point,
                    version: 1,
                    ks: vec![sig.sigma0.K],
                });
            }
        }
        Ok(())
    }

    fn check_group_rl(&self) -> Result<(), Error> {
        if let Some(rl) = &self.group_rl {
            if rl.gids.iter().any(|&gid| gid == self.pub_key.gid) {
                return Err(Error::RevokedInGroupRl);
            }
        }
        Ok(())
    }

    fn check_priv_rl(&self, sig0: &BasicSignature) -> Result<(), Error> {
        if let Some(rl) = &self.priv_rl {
            if rl.gid != self.pub_key.gid {
                return Err(Error::BadArgument("private-key revocation list gid does not match public key".to_owned()));
            }
            for f in rl.revoked_exponents() {
                let t = Arith::g1_exp(&sig0.B, f);
                if Arith::g1_is_equal(&t, &sig0.K) {
                    return Err(Error::RevokedInPrivRl);
                }
            }
        }
        Ok(())
    }

    fn check_sig_rl(&self, sig: &Signature, message: &[u8]) -> Result<(), Error>
    where
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if let Some(rl) = &self.sig_rl {
            if rl.gid != self.pub_key.gid {
                return Err(Error::BadArgument("signature revocation list gid does not match public key".to_owned()));
            }
            if sig.rl_ver != rl.version {
                return Err(Error::BadArgument("signature was produced against a different revocation list version".to_owned()));
            }
            if sig.n2() != rl.n2() {
                return Err(Error::BadArgument("signature proof count does not match revocation list".to_owned()));
            }
            for (entry, proof) in rl.entries.iter().zip(sig.sigma.iter()) {
                core_nr_verify::<CS>(&sig.sigma0, entry, proof, message)?;
            }
        }
        Ok(())
    }

    fn check_verifier_rl(&self, sig0: &BasicSignature) -> Result<(), Error> {
        if let Some(rl) = &self.verifier_rl {
            if Arith::g1_is_equal(&rl.B, &sig0.B) {
                if rl.ks.iter().any(|k| Arith::g1_is_equal(k, &sig0.K)) {
                    return Err(Error::RevokedInVerifierRl);
                }
            }
        }
        Ok(())
    }
}

impl<CS: EpidCiphersuite> Clone for VerifierContext<CS> {
    fn clone(&self) -> Self {
        Self {
            pub_key: self.pub_key.clone(),
            precomp: self.precomp.clone(),
            group_rl: self.group_rl.clone(),
            priv_rl: self.priv_rl.clone(),
            sig_rl: self.sig_rl.clone(),
            verifier_rl: self.verifier_rl.clone(),
            basename: self.basename.as_ref().map(|b| Basename { bsn: b.bsn.clone(), point: b.point }),
            _suite: PhantomData,
        }
    }
}
