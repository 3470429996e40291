//! In-process Identity Manager (C1).
//!
//! Grounded in the pack's `prospectorengine-prospector-btc` use of the
//! `secp256k1` crate: ECDSA over secp256k1 with RFC 6979 deterministic
//! nonces, so `sign` is a pure function of (private key, message digest).
//! The secret store is a single-gatekeeper `tokio::sync::Mutex`-guarded map
//! (spec section 5: "Identity creation is mutually exclusive with identity
//! lookup on the same agent_id").

use secp256k1::hashes::sha256;
use secp256k1::{ecdsa, Message, PublicKey as SecpPublicKey, Secp256k1, SecretKey};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::domain::ports::identity_manager::{IdentityError, PublicKey, Signature};
use crate::domain::ports::IdentityManager;

struct StoredIdentity {
    secret: SecretKey,
    public: SecpPublicKey,
    deprecated: bool,
}

/// Default `IdentityManager`: in-memory secret vault, single gatekeeper.
/// A persisted vault can be substituted without touching callers since
/// everything is mediated through the `IdentityManager` trait.
pub struct Secp256k1IdentityManager {
    secp: Secp256k1<secp256k1::All>,
    store: Mutex<HashMap<String, StoredIdentity>>,
}

impl Default for Secp256k1IdentityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Secp256k1IdentityManager {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
            store: Mutex::new(HashMap::new()),
        }
    }

    fn digest(message: &[u8]) -> Message {
        use secp256k1::hashes::Hash;
        let hashed = sha256::Hash::hash(message);
        Message::from_digest(hashed.to_byte_array())
    }
}

#[async_trait::async_trait]
impl IdentityManager for Secp256k1IdentityManager {
    #[instrument(skip(self))]
    async fn create_identity(&self, agent_id: &str) -> Result<PublicKey, IdentityError> {
        let mut store = self.store.lock().await;
        if store.contains_key(agent_id) {
            return Err(IdentityError::DuplicateIdentity(agent_id.to_string()));
        }
        let mut rng = rand::thread_rng();
        let secret = SecretKey::new(&mut rng);
        let public = SecpPublicKey::from_secret_key(&self.secp, &secret);
        let bytes = public.serialize().to_vec();
        store.insert(
            agent_id.to_string(),
            StoredIdentity {
                secret,
                public,
                deprecated: false,
            },
        );
        Ok(PublicKey(bytes))
    }

    async fn get_public_key(&self, agent_id: &str) -> Option<PublicKey> {
        let store = self.store.lock().await;
        store.get(agent_id).map(|id| PublicKey(id.public.serialize().to_vec()))
    }

    #[instrument(skip(self, message))]
    async fn sign(&self, agent_id: &str, message: &[u8]) -> Result<Signature, IdentityError> {
        let store = self.store.lock().await;
        let identity = store
            .get(agent_id)
            .ok_or_else(|| IdentityError::UnknownIdentity(agent_id.to_string()))?;
        let digest = Self::digest(message);
        let sig: ecdsa::Signature = self.secp.sign_ecdsa(&digest, &identity.secret);
        Ok(Signature(sig.serialize_compact().to_vec()))
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        let Ok(public) = SecpPublicKey::from_slice(&public_key.0) else {
            return false;
        };
        let Ok(sig) = ecdsa::Signature::from_compact(&signature.0) else {
            return false;
        };
        let digest = Self::digest(message);
        self.secp.verify_ecdsa(&digest, &sig, &public).is_ok()
    }

    async fn list_identities(&self) -> Vec<(String, PublicKey)> {
        let store = self.store.lock().await;
        store
            .iter()
            .filter(|(_, id)| !id.deprecated)
            .map(|(agent_id, id)| (agent_id.clone(), PublicKey(id.public.serialize().to_vec())))
            .collect()
    }

    async fn deprecate(&self, agent_id: &str) -> Result<(), IdentityError> {
        let mut store = self.store.lock().await;
        let identity = store
            .get_mut(agent_id)
            .ok_or_else(|| IdentityError::UnknownIdentity(agent_id.to_string()))?;
        identity.deprecated = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_identity_is_rejected() {
        let mgr = Secp256k1IdentityManager::new();
        mgr.create_identity("a1").await.unwrap();
        let err = mgr.create_identity("a1").await.unwrap_err();
        assert_eq!(err, IdentityError::DuplicateIdentity("a1".to_string()));
    }

    #[tokio::test]
    async fn signature_round_trips_for_any_message() {
        let mgr = Secp256k1IdentityManager::new();
        let pk = mgr.create_identity("a1").await.unwrap();
        for msg in [&b""[..], b"hello", b"a much longer message entirely"] {
            let sig = mgr.sign("a1", msg).await.unwrap();
            assert!(mgr.verify(&pk, msg, &sig));
        }
    }

    #[tokio::test]
    async fn signing_is_deterministic() {
        let mgr = Secp256k1IdentityManager::new();
        mgr.create_identity("a1").await.unwrap();
        let sig1 = mgr.sign("a1", b"same message").await.unwrap();
        let sig2 = mgr.sign("a1", b"same message").await.unwrap();
        assert_eq!(sig1, sig2);
    }

    #[tokio::test]
    async fn unknown_identity_cannot_sign() {
        let mgr = Secp256k1IdentityManager::new();
        let err = mgr.sign("ghost", b"x").await.unwrap_err();
        assert_eq!(err, IdentityError::UnknownIdentity("ghost".to_string()));
    }

    #[tokio::test]
    async fn deprecated_identity_keeps_public_key_but_drops_from_listing() {
        let mgr = Secp256k1IdentityManager::new();
        let pk = mgr.create_identity("a1").await.unwrap();
        mgr.deprecate("a1").await.unwrap();
        assert!(mgr.list_identities().await.is_empty());
        assert_eq!(mgr.get_public_key("a1").await, Some(pk));
    }
}
