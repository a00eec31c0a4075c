//! Entity model.
//!
//! Typed Trigger, Broker and dependency representations plus the condition
//! machinery their statuses are built from. Types serialize in the camelCase
//! shape used by the object store snapshots.

pub mod broker;
pub mod condition;
pub mod delivery;
pub mod meta;
pub mod reference;
pub mod source;
pub mod trigger;

pub use broker::{Broker, BrokerSpec, BrokerStatus, BROKER_CLASS_ANNOTATION};
pub use condition::{
    derive_condition, Condition, ConditionSet, ConditionStatus, ConditionUpdate, Conditions,
    READY,
};
pub use delivery::{BackoffPolicy, DeliverySpec};
pub use meta::{ObjectKey, ObjectMeta};
pub use reference::{Destination, ObjectReference};
pub use source::{Source, SourceStatus};
pub use trigger::{Trigger, TriggerSpec, TriggerStatus, DEPENDENCY_ANNOTATION};
