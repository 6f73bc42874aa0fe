//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! queueing actions, advancing the simulation, or streaming events from
//! specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{Action, QuitSignal, WorldSnapshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic, TurnEvent};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    quit: QuitSignal,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus, quit: QuitSignal) -> Self {
        Self {
            command_tx,
            event_bus,
            quit,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Queue an action for its actor. It executes on the actor's next turn,
    /// during a later [`RuntimeHandle::advance`].
    pub async fn submit_action(&self, action: Action) -> Result<()> {
        self.request(|reply| Command::SubmitAction { action, reply })
            .await?
    }

    /// Run the turn loop until the player needs input, the schedule empties,
    /// the game halts, or the iteration guard trips.
    pub async fn advance(&self) -> Result<TurnEvent> {
        self.request(|reply| Command::Advance { reply }).await?
    }

    /// Query the current game state (read-only snapshot)
    pub async fn query_state(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Stop the simulation worker.
    ///
    /// The quit flag is raised first, so an advance already queued ahead of
    /// this command halts at its next loop iteration.
    pub async fn quit(&self) -> Result<()> {
        self.quit.request();
        self.request(|reply| Command::Quit { reply }).await
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit.is_requested()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::GameState` - Spawns, moves, attacks, deaths and failed actions
    /// - `Topic::Turn` - One summary per advance
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut game_rx = handle.subscribe(Topic::GameState);
    /// while let Ok(event) = game_rx.recv().await {
    ///     // Handle game state events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }
}
