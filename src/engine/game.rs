//! The configurable game orchestrator.
//!
//! One [`ConfigurableGame`] owns one live game: the validated
//! configuration, the mutable state, the effect executor, the state timer,
//! and the broadcast callback to the surrounding room layer. It exposes
//! the whole action contract as a single entry point, [`handle`], and
//! serializes every invocation, actor actions and timer expiries alike,
//! through one mutex, which is what makes the at-most-one-transition rule
//! and the in-order effect model safe without finer locking.
//!
//! [`handle`]: ConfigurableGame::handle

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;

use crate::config::{ConfigError, EventConfig, GameConfig, TransitionConfig, TIMEOUT_EVENT};
use crate::core::{GameState, Role, Roster, SERVER_ACTOR};
use crate::effects::{event_context, EffectExecutor};
use crate::expr::Resolver;

use super::timer::StateTimer;
use super::ui::{UiState, UiStateBuilder};

/// Channel carrying the UI-projected, player-facing shape.
pub const UI_CHANNEL: &str = "game:ui";

/// Channel carrying the full raw state snapshot (debug use).
pub const STATE_CHANNEL: &str = "game:state";

/// Fan-out callback to the transport layer.
///
/// Invoked synchronously whenever state changes; the engine never awaits
/// or retries it. It must not call back into the game instance.
pub type BroadcastFn = dyn Fn(&str, &Value) + Send + Sync;

struct Instance {
    config: Arc<GameConfig>,
    roster: Roster,
    state: GameState,
    executor: EffectExecutor,
    timer: StateTimer,
    broadcast: Arc<BroadcastFn>,
    ended: bool,
}

/// A running game instance.
///
/// Cheap to clone (shared handle). Timer-bearing configurations require a
/// tokio runtime to be current when the instance is created or handles an
/// event, because the countdown is a spawned task.
#[derive(Clone)]
pub struct ConfigurableGame {
    inner: Arc<Mutex<Instance>>,
}

fn lock(mutex: &Mutex<Instance>) -> MutexGuard<'_, Instance> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConfigurableGame {
    /// Validate the configuration, build the initial state, arm the
    /// initial state's timer if it declares a duration, and broadcast the
    /// opening snapshot.
    ///
    /// This is the only point where a malformed configuration can abort
    /// game creation; every later failure degrades to a logged no-op.
    pub fn new(
        config: GameConfig,
        roster: Roster,
        broadcast: impl Fn(&str, &Value) + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        Self::with_executor(config, roster, EffectExecutor::new(), broadcast)
    }

    /// Like [`ConfigurableGame::new`] with a host-extended operation
    /// registry.
    pub fn with_executor(
        config: GameConfig,
        roster: Roster,
        executor: EffectExecutor,
        broadcast: impl Fn(&str, &Value) + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = crate::config::initialize(&config, &roster)?;
        let config = Arc::new(config);

        let game = Self {
            inner: Arc::new(Mutex::new(Instance {
                config: Arc::clone(&config),
                roster,
                state,
                executor,
                timer: StateTimer::new(),
                broadcast: Arc::from(Box::new(broadcast) as Box<BroadcastFn>),
                ended: false,
            })),
        };

        {
            let mut inner = lock(&game.inner);
            if let Some(duration) = config
                .state(&inner.state.status)
                .and_then(|s| s.duration)
            {
                let weak = Arc::downgrade(&game.inner);
                inner.arm_timer(&weak, duration);
            }
            inner.broadcast_state();
        }

        Ok(game)
    }

    /// Deliver one actor action.
    ///
    /// Invocations for one instance are processed strictly one at a time;
    /// effects, transition search, and broadcast for this event complete
    /// before the next event is considered.
    pub fn handle(&self, event_name: &str, actor_id: &str, payload: Option<Value>) {
        let mut inner = lock(&self.inner);
        if inner.ended {
            tracing::debug!(event = event_name, "game ended, dropping event");
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        inner.process(&weak, event_name, actor_id, payload.as_ref());
    }

    /// Current state name.
    #[must_use]
    pub fn status(&self) -> String {
        lock(&self.inner).state.status.clone()
    }

    /// Full raw snapshot (the `game:state` shape).
    #[must_use]
    pub fn raw_state(&self) -> Value {
        lock(&self.inner).state.snapshot()
    }

    /// The current UI projection (the `game:ui` shape).
    #[must_use]
    pub fn ui_state(&self) -> UiState {
        let inner = lock(&self.inner);
        UiStateBuilder::build(&inner.config, &inner.state, &inner.roster)
    }

    /// Tear the instance down: cancel any pending timer and drop all
    /// further events. No timer callback fires past this point.
    pub fn end(&self) {
        let mut inner = lock(&self.inner);
        inner.ended = true;
        inner.timer.cancel();
    }
}

impl Instance {
    fn process(
        &mut self,
        handle: &Weak<Mutex<Instance>>,
        event_name: &str,
        actor_id: &str,
        payload: Option<&Value>,
    ) {
        let config = Arc::clone(&self.config);

        let event = match config.event(event_name) {
            Some(event) => event.clone(),
            // The timeout event exists implicitly: server-only, no effects.
            None if event_name == TIMEOUT_EVENT => EventConfig {
                permissions: vec![Role::Server],
                effects: Vec::new(),
            },
            None => {
                tracing::warn!(event = event_name, "unknown event, ignoring");
                return;
            }
        };

        let role = self.roster.role_of(actor_id);
        if !role.is_some_and(|role| event.allows(role)) {
            tracing::warn!(
                event = event_name,
                actor = actor_id,
                ?role,
                "permission denied"
            );
            return;
        }

        let changed = self
            .executor
            .execute(&mut self.state, &self.roster, &event.effects, actor_id, payload)
            > 0;

        // First matching transition in declaration order wins; at most one
        // per handled event.
        let from = self.state.status.clone();
        let mut transitioned = false;
        for transition in config.transitions_for(&from, event_name) {
            let take = match &transition.condition {
                None => true,
                Some(condition) => {
                    let ctx = event_context(&self.state, &self.roster, actor_id, payload);
                    Resolver::condition(condition, &ctx)
                }
            };
            if take {
                self.transition(handle, transition, actor_id, payload);
                transitioned = true;
                break;
            }
        }

        if transitioned || changed {
            self.broadcast_state();
        }
    }

    fn transition(
        &mut self,
        handle: &Weak<Mutex<Instance>>,
        transition: &TransitionConfig,
        actor_id: &str,
        payload: Option<&Value>,
    ) {
        tracing::debug!(
            from = %transition.from,
            to = %transition.to,
            event = %transition.event,
            "transition"
        );
        let config = Arc::clone(&self.config);

        if let Some(leaving) = config.state(&transition.from) {
            self.executor
                .execute(&mut self.state, &self.roster, &leaving.on_exit, actor_id, payload);
        }

        self.state.status = transition.to.clone();

        if let Some(entering) = config.state(&transition.to) {
            self.executor.execute(
                &mut self.state,
                &self.roster,
                &entering.on_enter,
                actor_id,
                payload,
            );
            // A stale countdown must never outlive the state it described.
            match entering.duration {
                Some(duration) => self.arm_timer(handle, duration),
                None => self.timer.cancel(),
            }
        }
    }

    fn arm_timer(&mut self, handle: &Weak<Mutex<Instance>>, duration_secs: u64) {
        let weak = handle.clone();
        self.timer
            .start(Duration::from_secs(duration_secs), move |generation| {
                let Some(instance) = weak.upgrade() else {
                    return;
                };
                let mut inner = lock(&instance);
                if inner.ended || !inner.timer.is_current(generation) {
                    return;
                }
                let weak = Arc::downgrade(&instance);
                inner.process(&weak, TIMEOUT_EVENT, SERVER_ACTOR, None);
            });
    }

    fn broadcast_state(&self) {
        let ui = UiStateBuilder::build(&self.config, &self.state, &self.roster);
        (self.broadcast)(UI_CHANNEL, &ui.to_value());
        (self.broadcast)(STATE_CHANNEL, &self.state.snapshot());
    }
}
