//! Per-account admission control for inbound transfer credits
//!
//! Bounds the number of concurrently outstanding credit requests against a
//! single account so one busy receiver cannot accumulate unbounded pending
//! work. Admission is an immediate, non-suspending accept/reject decision.
//!
//! The correctness invariant is the admit/release pairing: every admitted
//! unit releases its slot exactly once, on every exit path. Dropping the
//! permit is the single release point, so the in-flight count can neither
//! leak upward (permanent false rejections) nor drift downward (limit
//! silently disabled).

use crate::types::UserId;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Slot held by one admitted in-flight credit. Dropping the permit
/// releases the slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

/// Immediate accept/reject gate over in-flight inbound credits
#[derive(Debug, Clone)]
pub struct AdmissionController {
    identity: UserId,
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl AdmissionController {
    /// Create a controller with `limit` concurrent slots
    pub fn new(identity: UserId, limit: usize) -> Self {
        Self {
            identity,
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Atomic check-and-increment: admit only while the in-flight count is
    /// below the limit. Never suspends.
    pub fn try_admit(&self) -> Result<AdmissionPermit> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Ok(AdmissionPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits) => Err(Error::TooManyRequestsToUser(
                self.identity.as_str().to_string(),
            )),
            Err(TryAcquireError::Closed) => {
                Err(Error::Concurrency("admission gate closed".to_string()))
            }
        }
    }

    /// Credits admitted but not yet released
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// Configured slot limit
    pub fn limit(&self) -> usize {
        self.limit
    }
}
