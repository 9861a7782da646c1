//! The per-session actor: the only task that ever mutates a session's
//! `GameState`. Everything else — the websocket handler, the registry —
//! talks to it through a `CoordinatorHandle` mailbox, so there's never a
//! lock to contend for the state itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, oneshot};

use core_data::abilities::AbilityRegistry;
use core_types::{
    Action, ActionRejection, CharacterClass, CharacterId, CloseReason, CombatPhase, EventKind,
    GameEvent, PlayerConnStatus, SessionConfig, SessionId, SessionStatus, UserId,
};
use protocol::ServerMessage;
use session_store::{SessionRecord, SessionStore};

use crate::disconnect;
use crate::error::CoordinatorError;
use crate::lobby;
use crate::turn_timer::DelayedTrigger;
use crate::{archive, dispatch};
use connection_manager::ConnectionManager;

const MAILBOX_CAPACITY: usize = 128;

pub enum Command {
    Join {
        user_id: UserId,
        character_id: Option<CharacterId>,
        reply: oneshot::Sender<Result<(), CoordinatorError>>,
    },
    Leave {
        user_id: UserId,
    },
    SetReady {
        user_id: UserId,
        ready: bool,
    },
    StartGame {
        user_id: UserId,
        reply: oneshot::Sender<Result<(), CoordinatorError>>,
    },
    SubmitAction {
        user_id: UserId,
        action: Action,
        reply: oneshot::Sender<Result<(), ActionRejection>>,
    },
    SubmitDmCommand {
        user_id: UserId,
        command: String,
        reply: oneshot::Sender<Result<(), CoordinatorError>>,
    },
    Chat {
        user_id: UserId,
        text: String,
    },
    Disconnected {
        user_id: UserId,
    },
    Reconnected {
        user_id: UserId,
    },
    RequestResync {
        user_id: UserId,
    },
    TurnTimerExpired {
        unit_id: core_types::UnitId,
    },
    GraceExpired {
        user_id: UserId,
    },
}

#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    pub async fn join(&self, user_id: UserId, character_id: Option<CharacterId>) -> Result<(), CoordinatorError> {
        self.call(|reply| Command::Join { user_id, character_id, reply }).await
    }

    pub async fn start_game(&self, user_id: UserId) -> Result<(), CoordinatorError> {
        self.call(|reply| Command::StartGame { user_id, reply }).await
    }

    pub async fn submit_action(&self, user_id: UserId, action: Action) -> Result<(), ActionRejection> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::SubmitAction { user_id, action, reply }).await;
        rx.await.unwrap_or(Err(ActionRejection::NotInProgress))
    }

    pub async fn submit_dm_command(&self, user_id: UserId, command: String) -> Result<(), CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::SubmitDmCommand { user_id, command, reply }).await;
        rx.await.unwrap_or(Err(CoordinatorError::Store("coordinator stopped".into())))
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<Result<T, CoordinatorError>>) -> Command) -> Result<T, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(make(reply)).await;
        rx.await.unwrap_or(Err(CoordinatorError::Store("coordinator stopped".into())))
    }

    pub async fn leave(&self, user_id: UserId) {
        let _ = self.tx.send(Command::Leave { user_id }).await;
    }

    pub async fn set_ready(&self, user_id: UserId, ready: bool) {
        let _ = self.tx.send(Command::SetReady { user_id, ready }).await;
    }

    pub async fn chat(&self, user_id: UserId, text: String) {
        let _ = self.tx.send(Command::Chat { user_id, text }).await;
    }

    pub async fn disconnected(&self, user_id: UserId) {
        let _ = self.tx.send(Command::Disconnected { user_id }).await;
    }

    pub async fn reconnected(&self, user_id: UserId) {
        let _ = self.tx.send(Command::Reconnected { user_id }).await;
    }

    pub async fn request_resync(&self, user_id: UserId) {
        let _ = self.tx.send(Command::RequestResync { user_id }).await;
    }
}

fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64
}

pub struct Coordinator {
    record: SessionRecord,
    store: Arc<dyn SessionStore>,
    connections: Arc<ConnectionManager>,
    abilities: AbilityRegistry,
    next_seq: u64,
    turn_timer: DelayedTrigger,
    grace_timers: HashMap<UserId, DelayedTrigger>,
    self_tx: mpsc::Sender<Command>,
}

/// Spawns the actor task and returns a cloneable handle to it. Dropping
/// every handle lets the task's mailbox close and the loop exit.
pub fn spawn(
    record: SessionRecord,
    store: Arc<dyn SessionStore>,
    connections: Arc<ConnectionManager>,
) -> CoordinatorHandle {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    let session_id = record.id;
    let coordinator = Coordinator {
        record,
        store: store.clone(),
        connections: connections.clone(),
        abilities: AbilityRegistry::seed(),
        next_seq: 1,
        turn_timer: DelayedTrigger::new(),
        grace_timers: HashMap::new(),
        self_tx: tx.clone(),
    };
    let task = tokio::spawn(coordinator.run(rx));
    tokio::spawn(supervise(task, session_id, store, connections));
    CoordinatorHandle { tx }
}

/// Watches the actor task and, if it panics, pulls the session out of
/// whatever state it was last persisted in rather than leaving it to hang
/// with a dead mailbox: marks it `Ended` in the store and drops every
/// connection still joined to it.
async fn supervise(
    task: tokio::task::JoinHandle<()>,
    session_id: SessionId,
    store: Arc<dyn SessionStore>,
    connections: Arc<ConnectionManager>,
) {
    let Err(join_err) = task.await else {
        return;
    };
    if !join_err.is_panic() {
        return;
    }
    tracing::error!(%session_id, %join_err, "coordinator task panicked, ending session");
    if let Ok(mut record) = store.get_session(session_id).await {
        record.status = SessionStatus::Ended;
        if let Err(err) = store.save_session_meta(record).await {
            tracing::error!(%session_id, ?err, "failed to mark panicked session ended");
        }
    }
    connections.close_session(session_id, CloseReason::ServerShutdown);
}

impl Coordinator {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd).await;
        }
    }

    async fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Join { user_id, character_id, reply } => {
                let _ = reply.send(self.join(user_id, character_id).await);
            }
            Command::Leave { user_id } => self.leave(user_id).await,
            Command::SetReady { user_id, ready } => self.set_ready(user_id, ready).await,
            Command::StartGame { user_id, reply } => {
                let _ = reply.send(self.start_game(user_id).await);
            }
            Command::SubmitAction { user_id, action, reply } => {
                let _ = reply.send(self.submit_action(user_id, action).await);
            }
            Command::SubmitDmCommand { user_id, command, reply } => {
                let _ = reply.send(self.submit_dm_command(user_id, command).await);
            }
            Command::Chat { user_id, text } => self.chat(user_id, text),
            Command::Disconnected { user_id } => self.on_disconnected(user_id).await,
            Command::Reconnected { user_id } => self.on_reconnected(user_id).await,
            Command::RequestResync { user_id } => self.send_snapshot(user_id),
            Command::TurnTimerExpired { unit_id } => self.on_turn_timer_expired(unit_id).await,
            Command::GraceExpired { user_id } => self.on_grace_expired(user_id).await,
        }
    }

    async fn join(&mut self, user_id: UserId, character_id: Option<CharacterId>) -> Result<(), CoordinatorError> {
        let late_join = self.record.status == SessionStatus::Playing && self.record.config.allow_late_join;
        if self.record.status != SessionStatus::Lobby && !late_join {
            return Err(CoordinatorError::NotInLobby);
        }
        if self.record.players.iter().any(|p| p.user_id == user_id) {
            return Err(CoordinatorError::AlreadyJoined);
        }
        if self.record.players.len() as u32 >= self.record.config.max_players {
            return Err(CoordinatorError::SessionFull);
        }
        let is_dm = self.record.players.is_empty();
        self.record.players.push(session_store::SessionPlayer {
            user_id,
            character_id,
            unit_id: None,
            conn_status: PlayerConnStatus::Connected,
            is_dm,
            ready: is_dm,
        });
        self.connections.join_session(user_id, self.record.id);
        // A late joiner gets a seat on the roster but no unit on the board —
        // there's no mid-combat spawn policy (where, with what stats, whose
        // initiative slot) worth inventing here. They watch until the next
        // `start_game`, which only happens from the lobby.
        self.persist_meta().await;
        self.broadcast_session_updated();
        Ok(())
    }

    async fn leave(&mut self, user_id: UserId) {
        self.record.players.retain(|p| p.user_id != user_id);
        self.connections.leave_session(user_id, self.record.id);
        self.persist_meta().await;
        self.broadcast_session_updated();
    }

    async fn set_ready(&mut self, user_id: UserId, ready: bool) {
        if let Some(player) = self.record.players.iter_mut().find(|p| p.user_id == user_id) {
            player.ready = ready;
        }
        self.persist_meta().await;
        self.broadcast_session_updated();
    }

    async fn start_game(&mut self, user_id: UserId) -> Result<(), CoordinatorError> {
        if self.record.dm_user_id != user_id {
            return Err(CoordinatorError::NotTheDm);
        }
        if self.record.status != SessionStatus::Lobby {
            return Err(CoordinatorError::NotInLobby);
        }
        if self.record.players.iter().any(|p| !p.is_dm && !p.ready) {
            return Err(CoordinatorError::NotReady);
        }

        let seed = self.record.id.as_uuid().as_u128() as u64;
        let mut seats = Vec::new();
        for player in self.record.players.iter().filter(|p| !p.is_dm) {
            let class = self.class_for_player(player.character_id).await;
            seats.push(core_engine::setup::PlayerSeat {
                user_id: player.user_id,
                class,
                name: player.user_id.to_string(),
            });
        }
        let mut state = core_engine::setup::generate_game_state(&self.record.config, seed, &seats)?;
        core_engine::combat::start_combat(&mut state);

        for player in self.record.players.iter_mut() {
            player.unit_id = state
                .units
                .iter()
                .find(|u| u.controller_user_id == Some(player.user_id))
                .map(|u| u.id);
        }
        self.record.state = state;
        self.record.status = SessionStatus::Playing;
        self.persist_meta().await;

        self.arm_turn_timer();
        self.broadcast_session_updated();
        self.broadcast_snapshot();
        self.run_npc_turns().await;
        Ok(())
    }

    /// The class a seat's unit spawns as, resolved from the player's stored
    /// `Character` when they picked one. Falls back to `Warrior` if no
    /// character was chosen or the lookup fails — a session still has to be
    /// startable for a seat that skipped character creation.
    async fn class_for_player(&self, character_id: Option<CharacterId>) -> CharacterClass {
        let Some(character_id) = character_id else {
            return CharacterClass::Warrior;
        };
        match self.store.get_character(character_id).await {
            Ok(character) => character.class,
            Err(err) => {
                tracing::warn!(?err, %character_id, "failed to load character for seating, defaulting to warrior");
                CharacterClass::Warrior
            }
        }
    }

    async fn submit_action(&mut self, user_id: UserId, action: Action) -> Result<(), ActionRejection> {
        if self.record.status != SessionStatus::Playing {
            return Err(ActionRejection::NotInProgress);
        }
        let events = dispatch::submit_action(&mut self.record.state, &self.abilities, user_id, action)?;
        self.apply_events(events).await;
        self.run_npc_turns().await;
        Ok(())
    }

    async fn submit_dm_command(&mut self, user_id: UserId, command: String) -> Result<(), CoordinatorError> {
        if self.record.dm_user_id != user_id {
            return Err(CoordinatorError::NotTheDm);
        }
        let event = dispatch::apply_dm_command(&mut self.record.state, &command);
        self.apply_events(vec![event]).await;
        self.run_npc_turns().await;
        Ok(())
    }

    /// Plays out every consecutive turn belonging to an uncontrolled unit,
    /// stopping as soon as a player-controlled unit is up or combat ends.
    /// `decide_turn` is trusted advice, not a validated action — it's run
    /// through the same validate-then-execute path a player's action takes,
    /// and a rejection (e.g. its own move budget already spent this turn,
    /// a stale path) just ends the unit's turn instead of applying anything.
    async fn run_npc_turns(&mut self) {
        loop {
            if self.record.status != SessionStatus::Playing {
                return;
            }
            let Some(turn) = self.record.state.combat.turn_state.clone() else {
                return;
            };
            let Some(unit) = self.record.state.unit(turn.unit_id) else {
                return;
            };
            if unit.controller_user_id.is_some() {
                return;
            }
            let mut action = core_engine::npc_ai::decide_turn(&self.record.state, turn.unit_id);
            if core_engine::action_pipeline::validate_action(&self.record.state, &self.abilities, &action).is_err() {
                action = Action::EndTurn { unit_id: turn.unit_id };
            }
            let events = core_engine::action_pipeline::execute_action(&mut self.record.state, &self.abilities, &action);
            self.apply_events(events).await;
        }
    }

    fn chat(&mut self, user_id: UserId, text: String) {
        self.connections.broadcast(self.record.id, ServerMessage::ChatMessage { user_id, text });
    }

    async fn on_disconnected(&mut self, user_id: UserId) {
        let is_dm = disconnect::on_disconnect(&mut self.record, user_id);
        self.persist_meta().await;
        if is_dm {
            self.turn_timer.cancel();
        }
        let grace = disconnect::grace_period_for(is_dm, &self.record.config);
        let trigger = self.grace_timers.entry(user_id).or_default();
        trigger.arm(grace, self.self_tx.clone(), Command::GraceExpired { user_id });
        self.broadcast_session_updated();
    }

    async fn on_reconnected(&mut self, user_id: UserId) {
        if let Some(mut trigger) = self.grace_timers.remove(&user_id) {
            trigger.cancel();
        }
        let resumed = disconnect::on_reconnect(&mut self.record, user_id);
        if resumed {
            self.persist_meta().await;
            if self.record.status == SessionStatus::Playing {
                self.arm_turn_timer();
            }
            self.broadcast_session_updated();
            self.send_snapshot(user_id);
            self.run_npc_turns().await;
        }
    }

    async fn on_grace_expired(&mut self, user_id: UserId) {
        self.grace_timers.remove(&user_id);
        if disconnect::on_grace_expired(&mut self.record, user_id) {
            self.persist_meta().await;
            self.broadcast_session_updated();
        }
    }

    async fn on_turn_timer_expired(&mut self, unit_id: core_types::UnitId) {
        if self.record.status != SessionStatus::Playing {
            return;
        }
        let current = self.record.state.combat.turn_state.as_ref().map(|t| t.unit_id);
        if current != Some(unit_id) {
            return; // already moved on by the time this fired
        }
        let events = core_engine::action_pipeline::execute_action(
            &mut self.record.state,
            &self.abilities,
            &Action::EndTurn { unit_id },
        );
        self.apply_events(events).await;
        self.run_npc_turns().await;
    }

    async fn apply_events(&mut self, kinds: Vec<EventKind>) {
        if kinds.is_empty() {
            return;
        }
        let ts = now_ms();
        let events: Vec<GameEvent> = kinds
            .into_iter()
            .map(|kind| {
                let event = GameEvent {
                    session_id: self.record.id,
                    seq: self.next_seq,
                    ts,
                    kind,
                };
                self.next_seq += 1;
                event
            })
            .collect();

        let from_version = self.record.state_version;
        match self
            .store
            .update_game_state(self.record.id, self.record.state_version, self.record.state.clone())
            .await
        {
            Ok(new_version) => self.record.state_version = new_version,
            Err(err) => tracing::error!(session_id = %self.record.id, ?err, "failed to persist state update"),
        }
        let _ = self.store.append_events(self.record.id, &events).await;

        if self.record.state.combat.phase == CombatPhase::Victory
            || self.record.state.combat.phase == CombatPhase::Defeat
        {
            self.turn_timer.cancel();
            self.record.status = SessionStatus::Ended;
            let archive = archive::build_archive(&self.record, ts);
            self.grant_rewards(&archive).await;
            let _ = self.store.archive_session(archive).await;
            self.persist_meta().await;
        } else if events.iter().any(|e| matches!(e.kind, EventKind::TurnStarted { .. })) {
            self.arm_turn_timer();
        }

        self.connections.broadcast(
            self.record.id,
            ServerMessage::StateDelta {
                session_id: self.record.id,
                from_version,
                to_version: self.record.state_version,
                events,
            },
        );
    }

    /// Banks each reward line's xp/gold onto the roster player's stored
    /// character, for players who joined with one. A player with no
    /// `character_id` (no character picked, or a dev/anonymous seat) earns
    /// nothing durable — there's nowhere to bank it.
    async fn grant_rewards(&self, archive: &session_store::SessionArchive) {
        for line in &archive.rewards {
            let Some(player) = self.record.players.iter().find(|p| p.user_id == line.user_id) else {
                continue;
            };
            let Some(character_id) = player.character_id else {
                continue;
            };
            let mut character = match self.store.get_character(character_id).await {
                Ok(character) => character,
                Err(err) => {
                    tracing::error!(session_id = %self.record.id, ?err, "failed to load character for reward grant");
                    continue;
                }
            };
            character.total_xp += line.xp_awarded;
            character.gold += line.gold_awarded;
            if let Err(err) = self.store.save_character(character).await {
                tracing::error!(session_id = %self.record.id, ?err, "failed to save character after reward grant");
            }
        }
    }

    fn arm_turn_timer(&mut self) {
        let Some(turn) = self.record.state.combat.turn_state.clone() else {
            self.turn_timer.cancel();
            return;
        };
        let duration = Duration::from_secs(self.record.config.turn_timer_secs as u64);
        self.turn_timer.arm(
            duration,
            self.self_tx.clone(),
            Command::TurnTimerExpired { unit_id: turn.unit_id },
        );
    }

    fn broadcast_session_updated(&self) {
        self.connections.broadcast(
            self.record.id,
            ServerMessage::SessionUpdated {
                session_id: self.record.id,
                status: self.record.status,
                player_count: self.record.players.len() as u32,
            },
        );
    }

    fn broadcast_snapshot(&self) {
        self.connections.broadcast(
            self.record.id,
            ServerMessage::StateSnapshot {
                session_id: self.record.id,
                state_version: self.record.state_version,
                state: Box::new(self.record.state.clone()),
            },
        );
    }

    fn send_snapshot(&self, user_id: UserId) {
        let _ = self.connections.send(
            user_id,
            ServerMessage::StateSnapshot {
                session_id: self.record.id,
                state_version: self.record.state_version,
                state: Box::new(self.record.state.clone()),
            },
        );
    }

    async fn persist_meta(&self) {
        if let Err(err) = self.store.save_session_meta(self.record.clone()).await {
            tracing::error!(session_id = %self.record.id, ?err, "failed to persist session metadata");
        }
    }
}

/// Builds the `SessionRecord` for a freshly created lobby, generating a
/// join code that doesn't collide with anything `exists` reports.
pub fn new_lobby_record(
    config: SessionConfig,
    dm_user_id: UserId,
    exists: impl Fn(&str) -> bool,
) -> Result<SessionRecord, CoordinatorError> {
    let session_id = core_types::SessionId::new();
    let mut rng = core_types::SimRng::seed(session_id.as_uuid().as_u128() as u64);
    let join_code = lobby::unique_join_code(&mut rng, exists)
        .ok_or_else(|| CoordinatorError::Store("exhausted join code attempts".into()))?;
    let state = core_engine::setup::generate_game_state(&config, 1, &[])?;
    Ok(SessionRecord {
        id: session_id,
        join_code,
        status: SessionStatus::Lobby,
        state,
        config,
        state_version: 0,
        players: Vec::new(),
        dm_user_id,
        created_at_ms: now_ms(),
    })
}
