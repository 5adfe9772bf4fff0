//! Test doubles and common utilities for contract tests
//!
//! The transport double replays scripted responses in order and records
//! every request it receives, so tests can assert exactly what went over
//! the wire.

#![allow(dead_code)]

use dnsrec_core::error::{Error, Result};
use dnsrec_core::traits::{ApiRequest, ApiResponse, Method, ResourceState, StateStore, Transport};
use dnsrec_core::{DomainId, Record, RecordId, RecordIdentity, RecordType, ResourceSpec};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A transport that answers from a script and records requests
pub struct ScriptedTransport {
    /// Responses handed out in order
    script: Arc<Mutex<VecDeque<std::result::Result<ApiResponse, String>>>>,
    /// Every request received
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response
    pub fn respond(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests received with the given method
    pub fn count(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    /// Responses not consumed yet
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Create a new ScriptedTransport that shares its script and log with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            requests: Arc::clone(&other.requests),
        }
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::transport(message)),
            None => panic!("no scripted response for {} {}", request.method, request.path),
        }
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

/// A StateStore that counts writes
pub struct CountingStateStore {
    put_call_count: Arc<AtomicUsize>,
    remove_call_count: Arc<AtomicUsize>,
    state: Arc<Mutex<std::collections::BTreeMap<String, ResourceState>>>,
}

impl CountingStateStore {
    pub fn new() -> Self {
        Self {
            put_call_count: Arc::new(AtomicUsize::new(0)),
            remove_call_count: Arc::new(AtomicUsize::new(0)),
            state: Arc::new(Mutex::new(std::collections::BTreeMap::new())),
        }
    }

    /// Get the number of times put() was called
    pub fn put_call_count(&self) -> usize {
        self.put_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times remove() was called
    pub fn remove_call_count(&self) -> usize {
        self.remove_call_count.load(Ordering::SeqCst)
    }

    /// Stored state for a name, bypassing the counters
    pub fn peek(&self, name: &str) -> Option<ResourceState> {
        self.state.lock().unwrap().get(name).cloned()
    }

    /// Seed state without counting the write
    pub fn seed(&self, name: &str, state: ResourceState) {
        self.state.lock().unwrap().insert(name.to_string(), state);
    }

    /// Create a new CountingStateStore that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            put_call_count: Arc::clone(&other.put_call_count),
            remove_call_count: Arc::clone(&other.remove_call_count),
            state: Arc::clone(&other.state),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for CountingStateStore {
    async fn get(&self, name: &str) -> Result<Option<ResourceState>> {
        Ok(self.state.lock().unwrap().get(name).cloned())
    }

    async fn put(&self, name: &str, state: &ResourceState) -> Result<()> {
        self.put_call_count.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .insert(name.to_string(), state.clone());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.remove_call_count.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().keys().cloned().collect())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

pub fn domain(id: u64) -> DomainId {
    DomainId::new(id).unwrap()
}

pub fn identity(domain_id: u64, record_id: u64) -> RecordIdentity {
    RecordIdentity::new(domain(domain_id), RecordId::new(record_id).unwrap())
}

/// `www A 192.0.2.1` with the given ttl on domain 42
pub fn a_record(ttl: u32) -> ResourceSpec {
    ResourceSpec::new(domain(42), Record::new(RecordType::A, "www", "192.0.2.1", ttl))
}

/// `@ MX 10 mx.example.com` on domain 42
pub fn mx_record() -> ResourceSpec {
    ResourceSpec::new(
        domain(42),
        Record::new(RecordType::Mx, "@", "mx.example.com", 3600).with_priority("10"),
    )
}

/// JSON body of a record as the API reports it
pub fn record_body(record_id: u64, record: &Record) -> Vec<u8> {
    let mut value = serde_json::to_value(record).unwrap();
    value["id"] = serde_json::json!(record_id);
    serde_json::to_vec(&value).unwrap()
}

/// JSON body of a create response
pub fn created_body(record_id: u64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "id": record_id })).unwrap()
}
