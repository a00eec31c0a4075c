//! Canonical structured event names used across `trigger-reconciler`.

// Reconcile engine events.
pub const RECONCILE_START: &str = "reconcile_start";
pub const RECONCILE_OK: &str = "reconcile_ok";
pub const RECONCILE_FAILED: &str = "reconcile_failed";
pub const FINALIZE_START: &str = "finalize_start";
pub const FINALIZE_OK: &str = "finalize_ok";
pub const FINALIZE_FAILED: &str = "finalize_failed";
pub const FINALIZE_SKIPPED: &str = "finalize_skipped";
pub const BROKER_NOT_FOUND: &str = "broker_not_found";
pub const BROKER_LOOKUP_FAILED: &str = "broker_lookup_failed";
pub const BROKER_DELETING: &str = "broker_deleting";
pub const BROKER_CLASS_MISMATCH: &str = "broker_class_mismatch";

// Collaborator events.
pub const SUBSCRIBER_RESOLVE_FAILED: &str = "subscriber_resolve_failed";
pub const DEPENDENCY_TRACK_FAILED: &str = "dependency_track_failed";
pub const DEPENDENCY_GENERATION_MISMATCH: &str = "dependency_generation_mismatch";
pub const INFRA_ENSURE_OK: &str = "infra_ensure_ok";
pub const INFRA_ENSURE_FAILED: &str = "infra_ensure_failed";
pub const INFRA_DELETE_OK: &str = "infra_delete_ok";
pub const INFRA_DELETE_FAILED: &str = "infra_delete_failed";

// Controller driver events.
pub const WORKER_START: &str = "worker_start";
pub const WORKER_STOP: &str = "worker_stop";
pub const QUEUE_REQUEUE: &str = "queue_requeue";
pub const QUEUE_DROP_PERMANENT: &str = "queue_drop_permanent";
pub const TRIGGER_GONE: &str = "trigger_gone";
pub const FINALIZER_ADDED: &str = "finalizer_added";
pub const FINALIZER_REMOVED: &str = "finalizer_removed";
pub const STATUS_UPDATE_OK: &str = "status_update_ok";
pub const STATUS_UPDATE_SKIPPED: &str = "status_update_skipped";
pub const STATUS_UPDATE_CONFLICT: &str = "status_update_conflict";
pub const RECONCILE_DEADLINE_EXCEEDED: &str = "reconcile_deadline_exceeded";
pub const DEPENDENCY_CHANGED: &str = "dependency_changed";
pub const EVENT_RECORDED: &str = "event_recorded";
