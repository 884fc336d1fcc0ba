use crate::application::funding::spawn_funding_preparation;
use crate::application::pipeline::{ReliableSendPipeline, RetryConfig};
use crate::domain::{LobbyEvent, RelayNotification};
use crate::error::CoordinatorError;
use crate::infrastructure::{MailboxTransport, SearchHandle};
use futures::channel::{mpsc, oneshot};
use mailbox_session_core::{clamp_member_limit, LobbySession, SessionId, SessionMessage};
use std::sync::Arc;
use uuid::Uuid;

/// Where the coordinator currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Searching,
    Hosting,
    Joined,
}

/// Everything a game start announces to the lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStartPlan {
    pub game_id: Uuid,
    pub start_marker: u64,
    pub seed: u64,
}

/// Owns the lobby session state machine
///
/// Commands flow in, get validated against the current state, and go
/// out through the delivery pipeline; inbound relay notifications are
/// translated 1:1 into lobby events on this instance's own channel.
/// This is a translation boundary, not a policy engine for session
/// content.
pub struct LobbyCoordinator {
    transport: Option<Arc<dyn MailboxTransport>>,
    pipeline: Option<ReliableSendPipeline>,
    retry_config: RetryConfig,
    session: Option<LobbySession>,
    search: Option<SearchHandle>,
    events_tx: mpsc::UnboundedSender<LobbyEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<LobbyEvent>>,
    funding_ready: Option<oneshot::Receiver<bool>>,
}

impl LobbyCoordinator {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded();

        LobbyCoordinator {
            transport: None,
            pipeline: None,
            retry_config: RetryConfig::default(),
            session: None,
            search: None,
            events_tx,
            events_rx: Some(events_rx),
            funding_ready: None,
        }
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Attach the relay binding; commands fail until one is attached
    pub fn bind_transport(&mut self, transport: Arc<dyn MailboxTransport>) {
        self.pipeline = Some(ReliableSendPipeline::with_config(
            transport.clone(),
            self.retry_config.clone(),
        ));
        self.transport = Some(transport);
    }

    /// Take the lobby event receiver (once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<LobbyEvent>> {
        self.events_rx.take()
    }

    /// Take the funding-preparation completion channel, if a
    /// preparation has been kicked off
    pub fn take_funding_ready(&mut self) -> Option<oneshot::Receiver<bool>> {
        self.funding_ready.take()
    }

    pub fn state(&self) -> CoordinatorState {
        match &self.session {
            Some(session) if session.is_host() => CoordinatorState::Hosting,
            Some(_) => CoordinatorState::Joined,
            None if self.search.is_some() => CoordinatorState::Searching,
            None => CoordinatorState::Idle,
        }
    }

    pub fn session(&self) -> Option<&LobbySession> {
        self.session.as_ref()
    }

    fn transport(&self) -> Result<Arc<dyn MailboxTransport>, CoordinatorError> {
        self.transport
            .clone()
            .ok_or(CoordinatorError::NotConfigured)
    }

    fn pipeline(&self) -> Result<&ReliableSendPipeline, CoordinatorError> {
        self.pipeline.as_ref().ok_or(CoordinatorError::NotConfigured)
    }

    fn emit(&self, event: LobbyEvent) {
        if self.events_tx.unbounded_send(event).is_err() {
            tracing::debug!("lobby event receiver dropped");
        }
    }

    // ===== Session lifecycle =====

    /// Create and host a lobby. The member limit is clamped into the
    /// supported range before the relay sees it.
    pub async fn create(
        &mut self,
        name: &str,
        display_name: &str,
        member_limit: u8,
    ) -> Result<SessionId, CoordinatorError> {
        let transport = self.transport()?;
        if self.session.is_some() {
            return Err(CoordinatorError::AlreadyInSession);
        }

        let limit = clamp_member_limit(member_limit);
        tracing::info!("creating lobby {:?} (limit {})", name, limit);

        let info = match transport.create_session(name, display_name, limit).await {
            Ok(info) => info,
            Err(err) => {
                // Dual signal: error event and returned error
                self.emit(LobbyEvent::Error {
                    context: "create".to_string(),
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        let session_id = info.session_id.clone();
        self.session = Some(LobbySession::new(
            info.session_id,
            info.mailbox,
            info.name.clone(),
            info.join_code.clone(),
            info.local_actor,
            true,
            info.member_limit,
            info.members.clone(),
        ));

        self.emit(LobbyEvent::Created {
            session_id: session_id.clone(),
            name: info.name,
            join_code: info.join_code,
            members: info.members,
        });

        // Funding for the game-start path is provisioned off to the
        // side; create returns without waiting on it.
        self.funding_ready = Some(spawn_funding_preparation(transport));

        Ok(session_id)
    }

    /// Join a lobby through its discovery anchor
    pub async fn join(
        &mut self,
        anchor: &str,
        display_name: &str,
    ) -> Result<SessionId, CoordinatorError> {
        let transport = self.transport()?;
        if self.session.is_some() {
            return Err(CoordinatorError::AlreadyInSession);
        }

        tracing::info!("joining lobby via anchor {:?}", anchor);

        let info = match transport.join_session(anchor, display_name).await {
            Ok(info) => info,
            Err(err) => {
                self.emit(LobbyEvent::Error {
                    context: "join".to_string(),
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        let session_id = info.session_id.clone();
        self.session = Some(LobbySession::new(
            info.session_id,
            info.mailbox,
            info.name.clone(),
            info.join_code,
            info.local_actor,
            false,
            info.member_limit,
            info.members.clone(),
        ));

        self.emit(LobbyEvent::Joined {
            session_id: session_id.clone(),
            name: info.name,
            members: info.members,
        });

        self.funding_ready = Some(spawn_funding_preparation(transport));

        Ok(session_id)
    }

    /// Leave the current session, best-effort. No-op when idle; a relay
    /// failure is reported as an error event, not returned.
    pub async fn leave(&mut self, reason: &str) -> Result<(), CoordinatorError> {
        let Some(session) = self.session.take() else {
            tracing::debug!("leave with no active session");
            return Ok(());
        };

        let Ok(transport) = self.transport() else {
            return Ok(());
        };

        tracing::info!("leaving lobby {} ({})", session.id(), reason);

        let result = if session.is_host() {
            transport.close_session(session.id()).await
        } else {
            transport.leave_session(session.id()).await
        };

        if let Err(err) = result {
            tracing::warn!("leave failed: {}", err);
            self.emit(LobbyEvent::Error {
                context: "leave".to_string(),
                message: err.to_string(),
            });
        }

        Ok(())
    }

    // ===== Discovery =====

    /// Watch for announced lobbies. Starting a new search stops any
    /// previous one; each match is republished as a SessionFound event.
    pub fn start_search(&mut self, prefix: Option<&str>) -> Result<(), CoordinatorError> {
        let transport = self.transport()?;
        self.stop_search();

        let events_tx = self.events_tx.clone();
        let handle = transport.search_sessions(
            prefix,
            Box::new(move |announcement| {
                let _ = events_tx.unbounded_send(LobbyEvent::SessionFound { announcement });
            }),
        )?;

        self.search = Some(handle);
        Ok(())
    }

    /// Release the active search subscription. Idempotent.
    pub fn stop_search(&mut self) {
        if let Some(handle) = self.search.take() {
            handle.unsubscribe();
        }
    }

    // ===== Signaling =====

    /// Send a chat line. Exhausted delivery propagates to the caller.
    pub async fn send_chat(&self, text: &str) -> Result<(), CoordinatorError> {
        let session = self.session.as_ref().ok_or(CoordinatorError::NotInSession)?;
        let pipeline = self.pipeline()?;

        pipeline
            .send(session.mailbox(), &SessionMessage::chat(text))
            .await?;
        Ok(())
    }

    /// Announce readiness. Advisory: exhausted delivery is swallowed
    /// and reported as `false`.
    pub async fn send_ready_state(&self, is_ready: bool) -> bool {
        let (session, pipeline) = match (self.session.as_ref(), self.pipeline.as_ref()) {
            (Some(session), Some(pipeline)) => (session, pipeline),
            _ => {
                tracing::warn!("ready-state with no active session");
                return false;
            }
        };

        match pipeline
            .send(session.mailbox(), &SessionMessage::ready_state(is_ready))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("ready-state delivery failed: {}", err);
                false
            }
        }
    }

    /// Announce the game start to the lobby. Host only; a non-host
    /// call is a logged no-op. Emits a local GameStarted event once the
    /// send has succeeded.
    pub async fn start_game(&self, plan: GameStartPlan) -> Result<(), CoordinatorError> {
        let session = self.session.as_ref().ok_or(CoordinatorError::NotInSession)?;
        if !session.is_host() {
            tracing::warn!("ignoring game start from non-host");
            return Ok(());
        }

        let pipeline = self.pipeline()?;
        pipeline
            .send(
                session.mailbox(),
                &SessionMessage::game_start(plan.game_id, plan.start_marker, plan.seed),
            )
            .await?;

        self.emit(LobbyEvent::GameStarted {
            game_id: plan.game_id,
            start_marker: plan.start_marker,
            seed: plan.seed,
        });

        Ok(())
    }

    /// Abort the game. No local event; the abort comes back through the
    /// notification path like everyone else's.
    pub async fn abort_game(&self, reason: &str) -> Result<(), CoordinatorError> {
        let session = self.session.as_ref().ok_or(CoordinatorError::NotInSession)?;
        let pipeline = self.pipeline()?;

        pipeline
            .send(session.mailbox(), &SessionMessage::game_abort(reason))
            .await?;
        Ok(())
    }

    // ===== Inbound translation =====

    /// Translate one relay notification into lobby events, 1:1.
    /// Notifications for foreign sessions are ignored; malformed
    /// payloads are logged and dropped.
    pub fn handle_notification(&mut self, notification: RelayNotification) {
        let events_tx = self.events_tx.clone();
        let emit = move |event: LobbyEvent| {
            let _ = events_tx.unbounded_send(event);
        };

        let Some(session) = self.session.as_mut() else {
            tracing::debug!("notification with no active session, ignoring");
            return;
        };

        let mut closed = false;

        match notification {
            RelayNotification::MemberJoined {
                session: sid,
                member,
                ..
            } => {
                if sid != *session.id() {
                    tracing::debug!("member-joined for foreign session {}, ignoring", sid);
                } else {
                    session.upsert_member(member.clone());
                    emit(LobbyEvent::MemberJoined { member });
                }
            }

            RelayNotification::MemberLeft {
                session: sid,
                actor,
                ..
            } => {
                if sid != *session.id() {
                    tracing::debug!("member-left for foreign session {}, ignoring", sid);
                } else {
                    if let Err(err) = session.remove_member(&actor) {
                        tracing::debug!("member-left for unknown member: {}", err);
                    }
                    emit(LobbyEvent::MemberLeft { actor });
                }
            }

            RelayNotification::SessionUpdated {
                session: sid,
                members,
                ..
            } => {
                if sid != *session.id() {
                    tracing::debug!("session-updated for foreign session {}, ignoring", sid);
                } else {
                    session.replace_members(members.clone());
                    emit(LobbyEvent::SessionUpdated { members });
                }
            }

            RelayNotification::SessionClosed {
                session: sid,
                reason,
                ..
            } => {
                if sid != *session.id() {
                    tracing::debug!("session-closed for foreign session {}, ignoring", sid);
                } else {
                    tracing::info!("lobby {} closed by relay", sid);
                    closed = true;
                    emit(LobbyEvent::SessionClosed { reason });
                }
            }

            RelayNotification::MessageReceived {
                session: sid,
                from,
                payload,
                ..
            } => {
                if sid != *session.id() {
                    tracing::debug!("message for foreign session {}, ignoring", sid);
                } else {
                    match SessionMessage::from_wire(&payload) {
                        Ok(SessionMessage::Chat { text, timestamp }) => {
                            emit(LobbyEvent::ChatReceived {
                                from,
                                text,
                                timestamp,
                            });
                        }
                        Ok(SessionMessage::ReadyState {
                            is_ready,
                            timestamp,
                        }) => {
                            if let Err(err) = session.set_member_ready(&from, is_ready) {
                                tracing::debug!("ready-state from unknown member: {}", err);
                            }
                            emit(LobbyEvent::ReadyStateReceived {
                                from,
                                is_ready,
                                timestamp,
                            });
                        }
                        Ok(SessionMessage::GameStart {
                            game_id,
                            start_marker,
                            seed,
                            timestamp,
                        }) => {
                            emit(LobbyEvent::GameStartReceived {
                                from,
                                game_id,
                                start_marker,
                                seed,
                                timestamp,
                            });
                        }
                        Ok(SessionMessage::GameAbort { reason, timestamp }) => {
                            emit(LobbyEvent::GameAbortReceived {
                                from,
                                reason,
                                timestamp,
                            });
                        }
                        Err(err) => {
                            // Fail closed: drop, never crash reconciliation
                            tracing::warn!("dropping malformed payload from {}: {}", from, err);
                        }
                    }
                }
            }
        }

        if closed {
            self.session = None;
        }
    }
}

impl Default for LobbyCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
