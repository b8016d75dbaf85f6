//! Shared test utilities for controller integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use chef_provider::entity::{EntityKind, Locator, RemoteEntity};
use chef_provider::error::{ProviderError, ProviderResult};
use chef_provider::gateway::Gateway;

// Behavior codes: 0=Success, 1=Transport error, 2=Server error
const SUCCEED: usize = 0;
const TRANSPORT: usize = 1;
const SERVER: usize = 2;

/// In-memory Chef server keyed by request path.
pub struct MemoryGateway {
    documents: Mutex<BTreeMap<String, Value>>,
    clients: Mutex<BTreeSet<String>>,
    get_behavior: AtomicUsize,
    create_behavior: AtomicUsize,
    delete_behavior: AtomicUsize,
    get_call_count: AtomicUsize,
    create_call_count: AtomicUsize,
    update_call_count: AtomicUsize,
    delete_call_count: AtomicUsize,
    client_delete_call_count: AtomicUsize,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            clients: Mutex::new(BTreeSet::new()),
            get_behavior: AtomicUsize::new(SUCCEED),
            create_behavior: AtomicUsize::new(SUCCEED),
            delete_behavior: AtomicUsize::new(SUCCEED),
            get_call_count: AtomicUsize::new(0),
            create_call_count: AtomicUsize::new(0),
            update_call_count: AtomicUsize::new(0),
            delete_call_count: AtomicUsize::new(0),
            client_delete_call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_client(self, name: &str) -> Self {
        self.clients.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn with_document(self, path: &str, body: Value) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
        self
    }

    pub fn with_get_error(self) -> Self {
        self.get_behavior.store(TRANSPORT, Ordering::SeqCst);
        self
    }

    pub fn with_create_error(self) -> Self {
        self.create_behavior.store(SERVER, Ordering::SeqCst);
        self
    }

    pub fn with_delete_error(self) -> Self {
        self.delete_behavior.store(TRANSPORT, Ordering::SeqCst);
        self
    }

    /// Remove a document behind the controller's back.
    pub fn remove_out_of_band(&self, path: &str) -> Option<Value> {
        self.documents.lock().unwrap().remove(path)
    }

    pub fn document(&self, path: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(path).cloned()
    }

    pub fn has_client(&self, name: &str) -> bool {
        self.clients.lock().unwrap().contains(name)
    }

    pub fn get_calls(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    pub fn client_delete_calls(&self) -> usize {
        self.client_delete_call_count.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.get_calls()
            + self.create_calls()
            + self.update_calls()
            + self.delete_calls()
            + self.client_delete_calls()
    }

    fn fail(behavior: &AtomicUsize) -> ProviderResult<()> {
        match behavior.load(Ordering::SeqCst) {
            TRANSPORT => Err(ProviderError::transport("connection refused")),
            SERVER => Err(ProviderError::Remote {
                status: 500,
                message: "internal server error".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn encode<E: RemoteEntity>(entity: &E) -> ProviderResult<Value> {
    serde_json::to_value(entity).map_err(|e| ProviderError::serialization("encode", e))
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn get<E: RemoteEntity>(&self, locator: &Locator) -> ProviderResult<E> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        Self::fail(&self.get_behavior)?;

        let body = self
            .document(&locator.path())
            .ok_or_else(|| ProviderError::not_found(locator.kind(), locator.name()))?;

        E::from_response(locator, body).map_err(|e| ProviderError::serialization("decode", e))
    }

    async fn create<E: RemoteEntity>(&self, locator: &Locator, entity: &E) -> ProviderResult<E> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        Self::fail(&self.create_behavior)?;

        let mut documents = self.documents.lock().unwrap();
        let path = locator.path();
        if documents.contains_key(&path) {
            return Err(ProviderError::Remote {
                status: 409,
                message: format!("{} already exists", locator.name()),
            });
        }
        documents.insert(path, encode(entity)?);
        Ok(entity.clone())
    }

    async fn update<E: RemoteEntity>(&self, locator: &Locator, entity: &E) -> ProviderResult<E> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);

        let mut documents = self.documents.lock().unwrap();
        let slot = documents
            .get_mut(&locator.path())
            .ok_or_else(|| ProviderError::not_found(locator.kind(), locator.name()))?;
        *slot = encode(entity)?;
        Ok(entity.clone())
    }

    async fn delete(&self, locator: &Locator) -> ProviderResult<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        Self::fail(&self.delete_behavior)?;

        self.documents
            .lock()
            .unwrap()
            .remove(&locator.path())
            .map(|_| ())
            .ok_or_else(|| ProviderError::not_found(locator.kind(), locator.name()))
    }

    async fn delete_auxiliary(&self, name: &str) -> ProviderResult<()> {
        self.client_delete_call_count.fetch_add(1, Ordering::SeqCst);

        if self.clients.lock().unwrap().remove(name) {
            Ok(())
        } else {
            Err(ProviderError::not_found(EntityKind::Client, name))
        }
    }
}
