use integration_test_utils::{
    RecordingEventRecorder, RecordingProvisioner, StaticUriResolver, PING_API_VERSION, PING_KIND,
};
use static_object_store::StaticObjectStore;
use std::sync::Arc;
use trigger_reconciler::model::ConditionStatus;
use trigger_reconciler::{
    ListableTracker, ObjectKey, ReconcilerConfig, Trigger, TriggerClient, TriggerController,
    TriggerReconciler,
};

/// Store, fakes and tracker wired the way the controller binary wires them.
#[allow(dead_code)]
pub(crate) struct Harness {
    pub(crate) store: Arc<StaticObjectStore>,
    pub(crate) provisioner: Arc<RecordingProvisioner>,
    pub(crate) resolver: Arc<StaticUriResolver>,
    pub(crate) tracker: Arc<ListableTracker>,
    pub(crate) recorder: Arc<RecordingEventRecorder>,
    pub(crate) config: ReconcilerConfig,
}

#[allow(dead_code)]
impl Harness {
    pub(crate) fn new() -> Self {
        Self::with(RecordingProvisioner::new(), StaticUriResolver::new())
    }

    pub(crate) fn with(provisioner: RecordingProvisioner, resolver: StaticUriResolver) -> Self {
        let store = Arc::new(StaticObjectStore::new());
        let tracker =
            ListableTracker::new().with_lister(PING_API_VERSION, PING_KIND, store.clone());
        Self {
            store,
            provisioner: Arc::new(provisioner),
            resolver: Arc::new(resolver),
            tracker: Arc::new(tracker),
            recorder: Arc::new(RecordingEventRecorder::new()),
            config: ReconcilerConfig::default(),
        }
    }

    pub(crate) fn reconciler(&self) -> TriggerReconciler {
        TriggerReconciler::new(
            self.store.clone(),
            self.resolver.clone(),
            self.provisioner.clone(),
            self.tracker.clone(),
            self.config.clone(),
        )
    }

    pub(crate) fn controller(&self) -> TriggerController {
        self.controller_with_client(self.store.clone())
    }

    pub(crate) fn controller_with_client(
        &self,
        triggers: Arc<dyn TriggerClient>,
    ) -> TriggerController {
        TriggerController::new(
            self.reconciler(),
            triggers,
            self.tracker.clone(),
            self.recorder.clone(),
        )
    }

    pub(crate) async fn stored(&self, key: &ObjectKey) -> Trigger {
        TriggerClient::get(self.store.as_ref(), key)
            .await
            .expect("trigger should be stored")
    }
}

pub(crate) fn condition_status(trigger: &Trigger, type_: &str) -> ConditionStatus {
    trigger
        .status
        .get_condition(type_)
        .map(|condition| condition.status)
        .unwrap_or_else(|| panic!("{type_} should be set"))
}

#[allow(dead_code)]
pub(crate) fn condition_reason(trigger: &Trigger, type_: &str) -> String {
    trigger
        .status
        .get_condition(type_)
        .map(|condition| condition.reason.clone())
        .unwrap_or_else(|| panic!("{type_} should be set"))
}
