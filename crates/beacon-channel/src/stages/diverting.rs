use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use beacon_core::errors::{BeaconError, BeaconResult, ChannelError};
use beacon_core::traits::IChannel;
use beacon_core::{HitType, ParameterMap, SendResult, SendStatus};

/// A hit held back until the pipeline is ready for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingHit {
    pub hit_type: HitType,
    pub parameters: ParameterMap,
}

#[derive(Debug, Default)]
struct BufferState {
    hits: VecDeque<PendingHit>,
    closed: bool,
}

/// Shared FIFO of pending hits. Once closed it accepts nothing more.
#[derive(Debug, Clone, Default)]
pub struct DivertBuffer {
    inner: Arc<Mutex<BufferState>>,
}

impl DivertBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hit, or hand it back if the buffer is closed.
    pub fn try_push(&self, hit: PendingHit) -> Result<(), PendingHit> {
        let mut state = self.lock();
        if state.closed {
            return Err(hit);
        }
        state.hits.push_back(hit);
        Ok(())
    }

    /// Take the oldest hit. When none is left, close the buffer and run
    /// `on_close` while still holding the lock, so no push can slip in
    /// between the final pop and whatever `on_close` switches over.
    pub fn pop_or_close(&self, on_close: impl FnOnce()) -> Option<PendingHit> {
        let mut state = self.lock();
        let next = state.hits.pop_front();
        if next.is_none() && !state.closed {
            state.closed = true;
            on_close();
        }
        next
    }

    /// Drop every pending hit and close. Returns how many were dropped.
    pub fn discard(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let dropped = state.hits.len();
        state.hits.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.lock().hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().hits.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Queues hits into a [`DivertBuffer`] instead of sending them.
#[derive(Debug, Clone)]
pub struct DivertingChannel {
    buffer: DivertBuffer,
}

impl DivertingChannel {
    pub fn new(buffer: DivertBuffer) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &DivertBuffer {
        &self.buffer
    }

    /// Queue the hit, or hand it back if the buffer was already drained.
    pub fn try_divert(&self, hit_type: HitType, parameters: ParameterMap) -> Result<SendResult, PendingHit> {
        self.buffer.try_push(PendingHit {
            hit_type,
            parameters,
        })?;
        Ok(SendResult::with_status(SendStatus::Queued))
    }
}

#[async_trait]
impl IChannel for DivertingChannel {
    async fn send(&self, hit_type: HitType, parameters: ParameterMap) -> BeaconResult<SendResult> {
        self.try_divert(hit_type, parameters)
            .map_err(|_| BeaconError::from(ChannelError::BufferDrained))
    }
}
