//! Test doubles for the metrics and delivery ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use kumaboard_domain::{Catalog, RenderPayload, Section, ServiceEntry};
use kumaboard_ports::{DeliveryError, DeliveryPort, MetricsPort};

pub fn core_catalog() -> Catalog {
    Catalog::new(vec![Section::new(
        "Core",
        vec![ServiceEntry::new("A"), ServiceEntry::new("B")],
    )])
}

pub struct StaticMetrics {
    text: Mutex<String>,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl StaticMetrics {
    pub fn new(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsPort for StaticMetrics {
    async fn fetch(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.text.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum UpdateFailure {
    /// Edit reports the message gone although it is still listed.
    NotFound,
    Other,
}

#[derive(Default)]
struct DeliveryState {
    messages: HashMap<(String, String), RenderPayload>,
    next_id: usize,
    created: usize,
    updates: usize,
    update_failure: Option<UpdateFailure>,
}

/// Chat destination kept in memory; message ids are `m1`, `m2`, ...
#[derive(Default)]
pub struct FakeDelivery {
    state: Mutex<DeliveryState>,
}

impl FakeDelivery {
    pub fn payload(&self, destination_id: &str, message_id: &str) -> Option<RenderPayload> {
        let state = self.state.lock().unwrap();
        state
            .messages
            .get(&(destination_id.to_string(), message_id.to_string()))
            .cloned()
    }

    pub fn delete(&self, destination_id: &str, message_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .messages
            .remove(&(destination_id.to_string(), message_id.to_string()));
    }

    pub fn fail_updates(&self, failure: UpdateFailure) {
        self.state.lock().unwrap().update_failure = Some(failure);
    }

    pub fn created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }
}

#[async_trait]
impl DeliveryPort for FakeDelivery {
    async fn create(
        &self,
        destination_id: &str,
        payload: &RenderPayload,
    ) -> Result<String, DeliveryError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.created += 1;
        let message_id = format!("m{}", state.next_id);
        state.messages.insert(
            (destination_id.to_string(), message_id.clone()),
            payload.clone(),
        );
        Ok(message_id)
    }

    async fn update(
        &self,
        destination_id: &str,
        message_id: &str,
        payload: &RenderPayload,
    ) -> Result<(), DeliveryError> {
        let mut state = self.state.lock().unwrap();
        match state.update_failure {
            Some(UpdateFailure::Other) => {
                return Err(DeliveryError::Other(anyhow!("rate limited")));
            }
            Some(UpdateFailure::NotFound) => {
                return Err(DeliveryError::not_found(destination_id, message_id));
            }
            None => {}
        }
        let key = (destination_id.to_string(), message_id.to_string());
        match state.messages.get_mut(&key) {
            Some(existing) => *existing = payload.clone(),
            None => return Err(DeliveryError::not_found(destination_id, message_id)),
        }
        state.updates += 1;
        Ok(())
    }

    async fn confirm_exists(
        &self,
        destination_id: &str,
        message_id: &str,
    ) -> Result<bool, DeliveryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .contains_key(&(destination_id.to_string(), message_id.to_string())))
    }
}
