//! Re-entrancy guard for write-through operations.
//!
//! `pause_session` and `complete_session` share one [`OperationGate`]. A call
//! that finds the gate in flight is rejected instead of queued. The gate is
//! released when the [`GateGuard`] drops, on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    InFlight,
}

#[derive(Debug, Default)]
pub struct OperationGate {
    in_flight: AtomicBool,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the gate from idle to in-flight.
    ///
    /// Returns `None` if another operation already holds it.
    pub fn try_begin(&self) -> Option<GateGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard { gate: self })
    }

    pub fn state(&self) -> GateState {
        if self.in_flight.load(Ordering::Acquire) {
            GateState::InFlight
        } else {
            GateState::Idle
        }
    }
}

/// Holds the gate in flight until dropped.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a OperationGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected() {
        let gate = OperationGate::new();
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert_eq!(gate.state(), GateState::InFlight);
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert_eq!(gate.state(), GateState::Idle);
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn guarded(gate: &OperationGate, fail: bool) -> Result<(), ()> {
            let _guard = gate.try_begin().ok_or(())?;
            if fail {
                return Err(());
            }
            Ok(())
        }

        let gate = OperationGate::new();
        assert!(guarded(&gate, true).is_err());
        assert_eq!(gate.state(), GateState::Idle);
        assert!(guarded(&gate, false).is_ok());
    }
}
