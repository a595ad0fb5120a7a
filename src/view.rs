//! Per-connection view controller.
//!
//! Every WebSocket connection mounts one `BranchView`: a snapshot of the
//! branch list, the active changeset, and this connection's own edit
//! target. The edit target deliberately lives here and not in shared state,
//! so two viewers editing different branches never trample each other.
//!
//! Mutating events write through the shared store and publish one `Updated`
//! notice per actual change; events that change nothing publish nothing.

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::changeset::{self, Changeset, ChangesetAction};
use crate::events::BranchEvent;
use crate::model::{Branch, BranchInput};
use crate::notify::{BRANCHES_TOPIC, Notice, Notifier};
use crate::store::BranchStore;

pub struct BranchView {
    store: BranchStore,
    notifier: Notifier,
    pub branches: Vec<Branch>,
    pub changeset: Changeset,
    pub edit_target: Option<String>,
    pub csrf_token: String,
}

impl BranchView {
    /// Mount a view for one connection. Subscribes before the first
    /// snapshot so a change landing in between still triggers a refresh.
    pub async fn mount(
        store: BranchStore,
        notifier: Notifier,
    ) -> (Self, broadcast::Receiver<Notice>) {
        let rx = notifier.subscribe(BRANCHES_TOPIC).await;
        let branches = store.list_all().await;
        let view = Self {
            store,
            notifier,
            branches,
            changeset: Changeset::pristine(),
            edit_target: None,
            csrf_token: Uuid::new_v4().to_string(),
        };
        (view, rx)
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.edit_target.as_deref() == Some(id)
    }

    /// Re-read the list snapshot from the store.
    pub async fn refresh(&mut self) {
        self.branches = self.store.list_all().await;
    }

    /// Broadcast-driven refresh; fired for our own mutations too.
    pub async fn handle_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Updated => self.refresh().await,
        }
    }

    pub async fn handle_event(&mut self, event: BranchEvent) {
        match event {
            BranchEvent::Validate { fields } => {
                self.changeset = changeset::evaluate(None, &fields, ChangesetAction::Validate);
            }
            BranchEvent::Save { fields } => self.save(fields).await,
            BranchEvent::ToggleStatus { id } => self.toggle_status(&id).await,
            BranchEvent::Edit { id } => {
                // Local transition only: nothing stored, nothing broadcast.
                // Reset so a stale create-form draft does not linger; the
                // renderer seeds the edit form from the stored record.
                self.edit_target = Some(id);
                self.changeset = Changeset::pristine();
            }
            BranchEvent::Update { fields } => self.update(fields).await,
            BranchEvent::Delete { id } => self.delete(&id).await,
        }
    }

    async fn save(&mut self, fields: BranchInput) {
        let mut cs = changeset::evaluate(None, &fields, ChangesetAction::Save);
        match cs.record.take() {
            Some(branch) => {
                self.store.put(branch).await;
                self.changeset = Changeset::pristine();
                self.refresh().await;
                self.notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
            }
            None => {
                // Keep the failure visible in the form; the store is untouched.
                self.changeset = cs;
            }
        }
    }

    async fn toggle_status(&mut self, id: &str) {
        match self.store.update(id, |b| b.status = !b.status).await {
            Some(_) => {
                self.refresh().await;
                self.notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
            }
            None => debug!(%id, "toggle-status on unknown branch, ignoring"),
        }
    }

    async fn update(&mut self, fields: BranchInput) {
        let Some(target) = self.edit_target.clone() else {
            debug!("update without an edit target, ignoring");
            return;
        };
        let Some(stored) = self.store.get(&target).await else {
            debug!(%target, "update on a branch no longer stored, ignoring");
            return;
        };
        let mut cs = changeset::evaluate(Some(&stored), &fields, ChangesetAction::Save);
        match cs.record.take() {
            Some(branch) => {
                self.store.put(branch).await;
                self.edit_target = None;
                self.changeset = Changeset::pristine();
                self.refresh().await;
                self.notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
            }
            None => {
                // Errors render inside the still-open edit form.
                self.changeset = cs;
            }
        }
    }

    async fn delete(&mut self, id: &str) {
        match self.store.remove(id).await {
            Some(_) => {
                self.refresh().await;
                self.notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
            }
            None => debug!(%id, "delete on unknown branch, ignoring"),
        }
    }
}
