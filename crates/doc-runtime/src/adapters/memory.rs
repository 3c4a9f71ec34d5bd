//! In-memory collaborator adapters.

use crate::ports::{ContentKey, ContentStore, KeyError, SigningKeyProvider, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::Secp256k1KeyPair;
use std::collections::HashMap;
use std::sync::Arc;

/// Content store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<ContentKey, Vec<u8>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &ContentKey) -> bool {
        self.blobs.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Overwrite a blob behind the workflow's back.
    pub fn tamper(&self, key: &ContentKey, content: impl Into<Vec<u8>>) {
        self.blobs.write().insert(key.clone(), content.into());
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get(&self, key: &ContentKey) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn put(&self, key: &ContentKey, content: Vec<u8>) -> Result<(), StoreError> {
        self.blobs.write().insert(key.clone(), content);
        Ok(())
    }

    async fn delete(&self, key: &ContentKey) -> Result<(), StoreError> {
        self.blobs.write().remove(key);
        Ok(())
    }
}

/// Key provider holding one keypair per registered user plus the app key.
#[derive(Debug)]
pub struct InMemoryKeyProvider {
    app: Arc<Secp256k1KeyPair>,
    users: RwLock<HashMap<String, Arc<Secp256k1KeyPair>>>,
}

impl InMemoryKeyProvider {
    pub fn new(app: Secp256k1KeyPair) -> Self {
        Self {
            app: Arc::new(app),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Provider with a freshly generated app key.
    pub fn generate() -> Self {
        Self::new(Secp256k1KeyPair::generate())
    }

    pub fn register(&self, user_id: impl Into<String>, key: Secp256k1KeyPair) {
        self.users.write().insert(user_id.into(), Arc::new(key));
    }

    /// Register `user_id` with a generated key, returning its public key hex.
    pub fn register_generated(&self, user_id: impl Into<String>) -> String {
        let key = Secp256k1KeyPair::generate();
        let public = key.public_key_hex();
        self.register(user_id, key);
        public
    }
}

#[async_trait]
impl SigningKeyProvider for InMemoryKeyProvider {
    async fn signing_key(&self, user_id: &str) -> Result<Arc<Secp256k1KeyPair>, KeyError> {
        self.users
            .read()
            .get(user_id)
            .cloned()
            .ok_or_else(|| KeyError::UnknownUser(user_id.to_string()))
    }

    async fn app_key(&self) -> Result<Arc<Secp256k1KeyPair>, KeyError> {
        Ok(self.app.clone())
    }
}
