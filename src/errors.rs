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

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Malformed or internally inconsistent input, detected before any
    /// cryptographic evaluation.
    #[error("Bad argument: {0}")]
    BadArgument(String),
    /// The arithmetic backend could not evaluate an operation. Distinct from
    /// a cryptographic rejection; callers should audit it differently.
    #[error("Group arithmetic failed: {0}")]
    MathError(String),
    #[error("Not a valid signature")]
    InvalidSignature,
    #[error("Group is revoked")]
    RevokedInGroupRl,
    #[error("Member private key is revoked")]
    RevokedInPrivRl,
    #[error("Signature is revoked")]
    RevokedInSigRl,
    #[error("Pseudonym is revoked by this verifier")]
    RevokedInVerifierRl,
    #[error("Error during deserialization: {0}")]
    DeserializationError(String),
    #[error("Error during hash to field computation")]
    HashToFieldError,
    #[error("A basename must be set before this operation")]
    MissingBasename,
}
