//! Hand commitments and claim proofs.
//!
//! The engine never builds proofs itself. It talks to a [`ProofOracle`] and a
//! [`CommitmentScheme`] and trusts their answers; the in-process
//! implementations here stand in for an out-of-process prover.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use crate::{Action, Character, Seat};

/// Domain separator for hand commitments.
const COMMITMENT_DOMAIN: &[u8] = b"COUP_DUEL_HAND_V1";

/// Domain separator for claim certificates.
const CERTIFICATE_DOMAIN: &[u8] = b"COUP_DUEL_CLAIM_V1";

/// Certificate stored when no proof could be produced.
pub const EMPTY_CERTIFICATE: &str = "{}";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("proof oracle unavailable: {0}")]
    Unavailable(String),

    #[error("hand does not match the published commitment")]
    CommitmentMismatch,
}

/// Everything the prover needs to attest a claim about a hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    pub claim: Character,
    pub hand: [Character; 2],
    pub salt: u64,
    pub commitment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub valid: bool,
    pub certificate: String,
}

/// Answers "does the claimant hold the claimed character".
#[async_trait]
pub trait ProofOracle: Send + Sync {
    async fn attempt(&self, request: &ProofRequest) -> Result<Attestation, ProofError>;
}

/// Fingerprints a hand under a salt.
#[async_trait]
pub trait CommitmentScheme: Send + Sync {
    async fn fingerprint(&self, hand: [Character; 2], salt: u64) -> Result<String, ProofError>;
}

/// Append-only record of a claim proof attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    pub action: Action,
    pub source: Seat,
    pub valid: bool,
    pub certificate: String,
    pub timestamp: DateTime<Utc>,
}

impl ProofRecord {
    pub fn new(action: Action, source: Seat, valid: bool, certificate: String) -> Self {
        Self {
            action,
            source,
            valid,
            certificate,
            timestamp: Utc::now(),
        }
    }
}

/// Hex SHA-256 over the domain, both character ids and the salt.
pub fn hand_digest(hand: [Character; 2], salt: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update([hand[0].id(), hand[1].id()]);
    hasher.update(salt.to_le_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Commitment;

#[async_trait]
impl CommitmentScheme for Sha256Commitment {
    async fn fingerprint(&self, hand: [Character; 2], salt: u64) -> Result<String, ProofError> {
        Ok(hand_digest(hand, salt))
    }
}

/// In-process oracle: checks the commitment opens to the hand, then the claim.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalOracle;

#[async_trait]
impl ProofOracle for LocalOracle {
    async fn attempt(&self, request: &ProofRequest) -> Result<Attestation, ProofError> {
        if hand_digest(request.hand, request.salt) != request.commitment {
            return Err(ProofError::CommitmentMismatch);
        }

        if !request.hand.contains(&request.claim) {
            return Ok(Attestation {
                valid: false,
                certificate: EMPTY_CERTIFICATE.to_string(),
            });
        }

        let mut hasher = Sha256::new();
        hasher.update(CERTIFICATE_DOMAIN);
        hasher.update(request.commitment.as_bytes());
        hasher.update([request.claim.id()]);

        Ok(Attestation {
            valid: true,
            certificate: hex::encode(hasher.finalize()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::proof::{hand_digest, CommitmentScheme, LocalOracle, ProofError, ProofOracle, ProofRequest, Sha256Commitment, EMPTY_CERTIFICATE};
    use crate::Character::{Chameleon, Crow, Lion};

    #[test]
    fn digest_depends_on_hand_and_salt() {
        let a = hand_digest([Lion, Crow], 42);
        assert_eq!(a, hand_digest([Lion, Crow], 42));
        assert_ne!(a, hand_digest([Lion, Crow], 43));
        assert_ne!(a, hand_digest([Crow, Lion], 42));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn local_oracle_attests_held_claims() {
        let commitment = Sha256Commitment.fingerprint([Lion, Crow], 7).await.unwrap();

        let mut request = ProofRequest { claim: Lion, hand: [Lion, Crow], salt: 7, commitment };
        let attestation = LocalOracle.attempt(&request).await.unwrap();
        assert!(attestation.valid);
        assert_ne!(attestation.certificate, EMPTY_CERTIFICATE);

        request.claim = Chameleon;
        let attestation = LocalOracle.attempt(&request).await.unwrap();
        assert!(!attestation.valid);
        assert_eq!(attestation.certificate, EMPTY_CERTIFICATE);
    }

    #[tokio::test]
    async fn local_oracle_rejects_stale_commitment() {
        let request = ProofRequest {
            claim: Lion,
            hand: [Lion, Crow],
            salt: 7,
            commitment: hand_digest([Lion, Chameleon], 7),
        };
        assert_eq!(LocalOracle.attempt(&request).await, Err(ProofError::CommitmentMismatch));
    }
}
