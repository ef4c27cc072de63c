//! # Operator cancellation
//!
//! A [`CancelToken`] is shared between the interrupt handler and the control
//! loop. Every blocking point of the controller checks it and unwinds with
//! [`EqptError::Cancelled`] once it is set.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::eqpt::EqptError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Return `Err(EqptError::Cancelled)` if cancellation has been requested.
    pub fn check(&self) -> Result<(), EqptError> {
        if self.is_cancelled() {
            Err(EqptError::Cancelled)
        } else {
            Ok(())
        }
    }
}
