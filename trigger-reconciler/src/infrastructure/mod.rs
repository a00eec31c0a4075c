//! Routing infrastructure layer.
//!
//! Each Trigger owns one retry topic and one retry subscription at the
//! message-transport provider. This layer derives their identity and delivery
//! policy from the Trigger and records provider outcomes in its status.

pub(crate) mod manager;
pub(crate) mod provisioner;
pub(crate) mod retry_target;

pub use manager::RoutingInfrastructure;
pub use provisioner::{InfrastructureError, RetryTopicProvisioner};
pub use retry_target::{
    DeadLetterPolicy, RetryPolicy, RetryTarget, MAXIMUM_BACKOFF, MAX_DELIVERY_ATTEMPTS,
    MIN_DELIVERY_ATTEMPTS,
};
