use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Pending,
}

/// Admits one action at a time. An attempt while pending is refused, not
/// queued.
#[derive(Debug, Default)]
pub struct BusyGate {
    pending: AtomicBool,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        if self.pending.load(Ordering::Acquire) {
            GateState::Pending
        } else {
            GateState::Idle
        }
    }

    /// Moves to `Pending` and returns a guard, or `None` if already pending.
    /// Dropping the guard moves the gate back to `Idle`.
    pub fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { gate: self })
    }
}

#[derive(Debug)]
pub struct BusyGuard<'a> {
    gate: &'a BusyGate,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.gate.pending.store(false, Ordering::Release);
    }
}
