//! Commit, mount and update.
//!
//! ```text
//! uninitialized ─create─▶ created ─mount─▶ mounting ─▶ mounted ⇄ updating
//! ```
//!
//! A commit that carries an intentional change runs the update hooks
//! (`beforeUpdate` → `onUpdate` → `afterUpdate`) and then notifies every
//! bus the component publishes on. Either step can be suppressed with
//! [`CommitOptions`]. Mount runs `beforeMount` → `onMount` → `afterMount`
//! once and announces the full state.

use busweave_core::{
    BusError, ComponentError, NotifyReport, Result, Shared, StateDelta, StateError, StateMap,
};
use serde_json::Value;

use crate::component::{Component, LifecyclePhase};
use crate::engine::Engine;
use crate::handle::ComponentHandle;
use crate::hooks::Hook;

/// Which side effects an accepted commit triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOptions {
    /// Run the update hooks.
    pub render: bool,
    /// Notify subscribers on every bus.
    pub notify: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            render: true,
            notify: true,
        }
    }
}

impl CommitOptions {
    /// Apply state only.
    pub fn silent() -> Self {
        Self {
            render: false,
            notify: false,
        }
    }

    /// Notify without running the update hooks.
    pub fn without_render() -> Self {
        Self {
            render: false,
            notify: true,
        }
    }

    /// Run the update hooks without notifying.
    pub fn without_notify() -> Self {
        Self {
            render: true,
            notify: false,
        }
    }
}

/// What a commit did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The proposal carried no intentional change; nothing happened.
    Unchanged,
    /// State was updated.
    Applied {
        /// The fields that changed, with their new values.
        delta: StateDelta,
        /// Fan-out result, or `None` when notification was suppressed.
        notified: Option<std::result::Result<NotifyReport, BusError>>,
    },
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }

    pub fn delta(&self) -> Option<&StateDelta> {
        match self {
            CommitOutcome::Applied { delta, .. } => Some(delta),
            CommitOutcome::Unchanged => None,
        }
    }

    /// The fan-out report, if notification ran and was not dropped.
    pub fn report(&self) -> Option<&NotifyReport> {
        match self {
            CommitOutcome::Applied {
                notified: Some(Ok(report)),
                ..
            } => Some(report),
            _ => None,
        }
    }
}

impl Engine {
    /// Commit with rendering and notification enabled.
    pub fn commit(&self, key: &str, proposed: &Value) -> Result<CommitOutcome> {
        self.commit_state(key, proposed, CommitOptions::default())
    }

    /// Diff `proposed` against the component's state and apply it if it
    /// carries an intentional change.
    ///
    /// Fields omitted from `proposed` are left as they are. A proposal that
    /// is not an object, or that only omits fields, is
    /// [`CommitOutcome::Unchanged`] and triggers nothing. `key`,
    /// `componentName` and `eventBus` belong to the engine: a proposal that
    /// changes any of them fails with [`StateError::ReservedField`].
    pub fn commit_state(
        &self,
        key: &str,
        proposed: &Value,
        options: CommitOptions,
    ) -> Result<CommitOutcome> {
        let conflict = self.require(key)?.borrow().store.reserved_conflict(proposed);
        if let Some(field) = conflict {
            tracing::error!("Component '{}': commit rejected, '{}' is reserved", key, field);
            return Err(StateError::ReservedField {
                field: field.to_string(),
            }
            .into());
        }
        self.apply_commit(key, proposed, options)
    }

    /// Commit without the reserved-field check. Bus wiring uses this to
    /// maintain `eventBus`.
    pub(crate) fn apply_commit(
        &self,
        key: &str,
        proposed: &Value,
        options: CommitOptions,
    ) -> Result<CommitOutcome> {
        let component = self.require(key)?;
        let (delta, debug) = {
            let mut component = component.borrow_mut();
            (component.store.commit(proposed), component.debug)
        };
        let Some(delta) = delta else {
            return Ok(CommitOutcome::Unchanged);
        };

        if debug || self.settings.debug {
            tracing::debug!("Component '{}': state change {:?}", key, delta);
        }

        if options.render {
            self.render(key, &component, &delta);
        }

        let notified = options.notify.then(|| self.notify_buses(key, &delta));
        Ok(CommitOutcome::Applied { delta, notified })
    }

    /// Run the mount hooks and announce the component's full state.
    ///
    /// Mount happens once. Calling it again, including from inside a mount
    /// hook, does nothing and returns `Ok(false)`.
    pub fn mount(&self, key: &str) -> Result<bool> {
        let component = self.require(key)?;
        let phase = component.borrow().phase;
        match phase {
            LifecyclePhase::Created => {}
            LifecyclePhase::Mounting | LifecyclePhase::Mounted | LifecyclePhase::Updating => {
                tracing::debug!("Component '{}' is already {}; mount skipped", key, phase);
                return Ok(false);
            }
            LifecyclePhase::Uninitialized => {
                return Err(ComponentError::InvalidTransition {
                    key: key.to_string(),
                    transition: "mount".to_string(),
                    phase: phase.to_string(),
                }
                .into());
            }
        }

        component.borrow_mut().phase = LifecyclePhase::Mounting;
        for hook in [Hook::BeforeMount, Hook::OnMount, Hook::AfterMount] {
            let state = component.borrow().state().clone();
            self.run_hook(key, &component, hook, &state);
        }

        let state = {
            let mut component = component.borrow_mut();
            component.first_render = false;
            component.phase = LifecyclePhase::Mounted;
            component.state().clone()
        };
        tracing::debug!("Component '{}' mounted", key);

        if let Err(e) = self.notify_buses(key, &state) {
            tracing::warn!("Component '{}': mount notification dropped: {}", key, e);
        }
        Ok(true)
    }

    /// Push `delta` to this component's subscribers on every bus it
    /// publishes on, in bus order.
    ///
    /// A bus that no longer exists is logged and skipped. Fails only when
    /// nested fan-out exceeds the configured depth.
    pub fn notify_buses(
        &self,
        key: &str,
        delta: &StateDelta,
    ) -> std::result::Result<NotifyReport, BusError> {
        let _guard = self.enter_fan_out(key)?;

        let bus_ids = self
            .component(key)
            .map(|c| c.borrow().event_buses())
            .unwrap_or_default();

        let mut report = NotifyReport::default();
        for bus_id in bus_ids {
            let notice = self.buses.borrow().get(&bus_id).map(|bus| bus.notice(key));
            match notice {
                Some(notice) => report.merge(notice.deliver(self, delta)),
                None => tracing::warn!(
                    "Component '{}': bus '{}' not found; skipping",
                    key,
                    bus_id
                ),
            }
        }
        Ok(report)
    }

    fn render(&self, key: &str, component: &Shared<Component>, delta: &StateDelta) {
        let was_mounted = {
            let mut component = component.borrow_mut();
            let mounted = component.phase == LifecyclePhase::Mounted;
            if mounted {
                component.phase = LifecyclePhase::Updating;
            }
            mounted
        };

        for hook in [Hook::BeforeUpdate, Hook::OnUpdate, Hook::AfterUpdate] {
            self.run_hook(key, component, hook, delta);
        }

        if was_mounted {
            component.borrow_mut().phase = LifecyclePhase::Mounted;
        }
    }

    pub(crate) fn run_hook(
        &self,
        key: &str,
        component: &Shared<Component>,
        hook: Hook,
        payload: &StateMap,
    ) {
        let (callback, debug) = {
            let component = component.borrow();
            (component.hooks.get(hook), component.debug || self.settings.debug)
        };

        if debug {
            tracing::debug!("{} '{}'", hook.describe(), key);
        } else {
            tracing::trace!("{} '{}'", hook.describe(), key);
        }

        if let Some(callback) = callback {
            callback(&ComponentHandle::new(self, key), payload);
        }
    }
}
