//! Reconcile engine.
//!
//! `reconcile_kind` drives a live Trigger toward its desired state and
//! `finalize_kind` releases what was provisioned for it. Both report through
//! the Trigger's conditions first and through the returned outcome second.

pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod trigger_reconciler;

pub use error::{ReconcileError, REASON_INTERNAL_ERROR};
pub use event::{EventType, ReconcileEvent, TRIGGER_FINALIZED, TRIGGER_RECONCILED};
pub use trigger_reconciler::{ReconcileResult, TriggerReconciler};
