//! In-memory recorder for tests and dry runs

use std::sync::Mutex;

use async_trait::async_trait;

use super::{HealthObservation, Recorder};
use crate::error::WriteError;

/// Keeps every recorded observation in write order
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    observations: Mutex<Vec<HealthObservation>>,
    fail_with: Option<WriteError>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose writes always fail with `error`
    pub fn failing(error: WriteError) -> Self {
        Self {
            observations: Mutex::new(Vec::new()),
            fail_with: Some(error),
        }
    }

    /// Snapshot of everything recorded so far
    pub fn observations(&self) -> Vec<HealthObservation> {
        match self.observations.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Recorder for MemoryRecorder {
    async fn record(&self, observation: &HealthObservation) -> Result<(), WriteError> {
        if let Some(ref error) = self.fail_with {
            return Err(error.clone());
        }

        let mut guard = match self.observations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(observation.clone());
        Ok(())
    }
}
