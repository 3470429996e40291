//! Identity Manager port (C1).

use async_trait::async_trait;
use thiserror::Error;

/// Errors C1 operations may raise.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity already exists for agent_id: {0}")]
    DuplicateIdentity(String),

    #[error("no identity registered for agent_id: {0}")]
    UnknownIdentity(String),
}

/// An opaque ECDSA signature. Deterministic (RFC 6979) given the same
/// private key and message, so tests can assert exact bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

/// An ECDSA public key, DER/compressed-SEC1 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(pub Vec<u8>);

/// Port for agent cryptographic identity. Signing is deterministic; the
/// secret store is write-once per `agent_id` — rotation requires a brand
/// new identity, not an update to this one.
#[async_trait]
pub trait IdentityManager: Send + Sync {
    /// Generate and persist a fresh key pair. Fails if `agent_id` is already
    /// registered (even if deprecated).
    async fn create_identity(&self, agent_id: &str) -> Result<PublicKey, IdentityError>;

    async fn get_public_key(&self, agent_id: &str) -> Option<PublicKey>;

    /// Sign `message` with the private key registered for `agent_id`.
    async fn sign(&self, agent_id: &str, message: &[u8]) -> Result<Signature, IdentityError>;

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool;

    async fn list_identities(&self) -> Vec<(String, PublicKey)>;

    /// Mark an identity deprecated. Public key is retained; no identity is
    /// ever hard-deleted while referenced.
    async fn deprecate(&self, agent_id: &str) -> Result<(), IdentityError>;
}
