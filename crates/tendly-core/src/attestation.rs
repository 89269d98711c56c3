//! Best-effort attestation of finished work.
//!
//! After a task completion, a focus session, or an achievement unlock the
//! engine hands an [`AttestationRecord`] to the configured provider. A
//! returned [`Proof`] is stored on the record as its `verification`; a
//! failure is logged and otherwise ignored.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AttestationError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationKind {
    TaskCompletion,
    FocusSession,
    AchievementUnlock,
    ChallengeCompletion,
}

/// What gets attested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub kind: AttestationKind,
    pub entity_id: String,
    pub user_id: String,
    pub payload: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl AttestationRecord {
    pub fn new(
        kind: AttestationKind,
        entity_id: impl Into<String>,
        user_id: impl Into<String>,
        payload: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            user_id: user_id.into(),
            payload,
            at,
        }
    }
}

/// Opaque handle returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub provider: String,
    pub digest: String,
    pub issued_at: DateTime<Utc>,
}

/// Every attestation backend implements this trait.
pub trait AttestationProvider: Send + Sync {
    /// Unique identifier (e.g. "local-hmac").
    fn name(&self) -> &str;

    fn attest(&self, record: &AttestationRecord) -> Result<Proof, AttestationError>;
}

/// Keyed SHA-256 stamp over the canonical JSON of the record.
pub struct LocalAttestor {
    secret: Vec<u8>,
}

impl LocalAttestor {
    pub const NAME: &'static str = "local-hmac";

    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Fresh random 32-byte key.
    pub fn generate() -> Self {
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    pub fn from_hex(secret: &str) -> Result<Self, AttestationError> {
        let bytes = hex::decode(secret.trim())
            .map_err(|e| AttestationError::Rejected(format!("invalid secret: {e}")))?;
        if bytes.is_empty() {
            return Err(AttestationError::Rejected("empty secret".into()));
        }
        Ok(Self::new(bytes))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(&self.secret)
    }

    fn mac(&self, record: &AttestationRecord) -> Result<HmacSha256, AttestationError> {
        let bytes = serde_json::to_vec(record)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AttestationError::Rejected(e.to_string()))?;
        mac.update(&bytes);
        Ok(mac)
    }

    /// Check that `proof` was issued by this key for `record`.
    pub fn verify(&self, record: &AttestationRecord, proof: &Proof) -> bool {
        let Ok(expected) = hex::decode(&proof.digest) else {
            return false;
        };
        match self.mac(record) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }
}

impl AttestationProvider for LocalAttestor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attest(&self, record: &AttestationRecord) -> Result<Proof, AttestationError> {
        let digest = hex::encode(self.mac(record)?.finalize().into_bytes());
        Ok(Proof {
            provider: Self::NAME.to_string(),
            digest,
            issued_at: Utc::now(),
        })
    }
}

/// Provider for builds without a ledger. Always unavailable.
pub struct NoopAttestor;

impl AttestationProvider for NoopAttestor {
    fn name(&self) -> &str {
        "noop"
    }

    fn attest(&self, _record: &AttestationRecord) -> Result<Proof, AttestationError> {
        Err(AttestationError::Unavailable("no attestation backend configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AttestationRecord {
        AttestationRecord::new(
            AttestationKind::TaskCompletion,
            "task-1",
            "user-1",
            serde_json::json!({ "compost_reward": 5, "priority": "low" }),
            Utc::now(),
        )
    }

    #[test]
    fn local_proof_verifies() {
        let attestor = LocalAttestor::new(b"secret".to_vec());
        let rec = record();
        let proof = attestor.attest(&rec).unwrap();
        assert_eq!(proof.provider, LocalAttestor::NAME);
        assert_eq!(proof.digest.len(), 64);
        assert!(attestor.verify(&rec, &proof));
    }

    #[test]
    fn tampered_record_fails_verification() {
        let attestor = LocalAttestor::new(b"secret".to_vec());
        let rec = record();
        let proof = attestor.attest(&rec).unwrap();
        let mut tampered = rec.clone();
        tampered.payload = serde_json::json!({ "compost_reward": 500, "priority": "low" });
        assert!(!attestor.verify(&tampered, &proof));
    }

    #[test]
    fn other_key_fails_verification() {
        let rec = record();
        let proof = LocalAttestor::new(b"one".to_vec()).attest(&rec).unwrap();
        assert!(!LocalAttestor::new(b"two".to_vec()).verify(&rec, &proof));
    }

    #[test]
    fn hex_secret_round_trips() {
        let attestor = LocalAttestor::generate();
        let again = LocalAttestor::from_hex(&attestor.secret_hex()).unwrap();
        let rec = record();
        let proof = attestor.attest(&rec).unwrap();
        assert!(again.verify(&rec, &proof));
        assert!(LocalAttestor::from_hex("zz").is_err());
        assert!(LocalAttestor::from_hex("").is_err());
    }

    #[test]
    fn noop_is_unavailable() {
        assert!(matches!(
            NoopAttestor.attest(&record()),
            Err(AttestationError::Unavailable(_))
        ));
    }
}
