//! The runtime engine: timer, UI projection, and the game orchestrator.
//!
//! ## Event Flow
//!
//! ```text
//! actor action ─▶ ConfigurableGame::handle
//!                   │ permission check
//!                   │ effects (EffectExecutor, in order)
//!                   │ transition search (first match wins)
//!                   │ timer re-arm / cancel
//!                   ▼
//!                 broadcast(game:ui / game:state)
//! ```
//!
//! Timer expiry re-enters through the same `handle` path as a synthesized
//! `timeout` event from the server actor, so time-based auto-transitions
//! are indistinguishable from real actor actions at the handler level.

mod game;
mod timer;
mod ui;

pub use game::{BroadcastFn, ConfigurableGame, STATE_CHANNEL, UI_CHANNEL};
pub use timer::StateTimer;
pub use ui::{UiState, UiStateBuilder};
