//! Conversation controller
//!
//! Owns the single authoritative send state machine for a chat session:
//!
//! ```text
//! send(text) ─▶ append user + pending assistant ─▶ gateway.send()
//!                                                      │
//!          ┌───────────────── pull loop ◀──────────────┘
//!          │  ThreadAssigned  → persist id (first assignment only)
//!          │  TextDelta       → grow pending text (first one: AwaitingFirstByte → Streaming)
//!          │  StreamFailed    → replace text with TURN_FAILED_TEXT, Errored
//!          │  Err(transport)  → same as StreamFailed
//!          └─ end of stream   → complete pending text, Idle
//! ```
//!
//! The controller is the sole writer of the [`MessageLog`]. Its lock is only
//! held for synchronous mutations, never across an `.await`; readers get
//! snapshots through [`messages`](ConversationController::messages).
//!
//! Every send gets a turn number and a [`CancellationToken`]. Interrupting
//! bumps the turn number under the lock, so events that arrive for an
//! abandoned turn can never touch the log.

use crate::ports::chat_gateway::{ChatGateway, GatewayError, SendRequest};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::session_observer::{NoSessionObserver, SessionObserver};
use crate::ports::thread_store::ThreadIdentityStore;
use crate::use_cases::hydrate_history::{HydrateHistoryUseCase, HydrationStatus};
use futures::StreamExt;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use threadline_domain::{
    Message, MessageLog, PendingOutcome, SessionState, StreamEvent, TURN_FAILED_TEXT, ThreadId,
    truncate,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Why a send was refused without touching the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A reply is still streaming.
    Busy,
    /// The message was empty or whitespace.
    EmptyMessage,
    /// The session has been closed.
    Closed,
}

/// Why a turn failed. Both kinds look the same to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnFailure {
    /// The service sent an explicit error record.
    Stream(String),
    /// The request or the body read failed.
    Transport(GatewayError),
}

impl TurnFailure {
    fn category(&self) -> &'static str {
        match self {
            TurnFailure::Stream(_) => "stream",
            TurnFailure::Transport(_) => "transport",
        }
    }

    fn detail(&self) -> String {
        match self {
            TurnFailure::Stream(message) => message.clone(),
            TurnFailure::Transport(e) => e.to_string(),
        }
    }
}

/// Result of a [`send`](ConversationController::send) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply completed; carries the final assistant message.
    Completed(Message),
    /// The reply failed; the assistant message shows [`TURN_FAILED_TEXT`].
    Failed(TurnFailure),
    /// The send was ignored.
    Rejected(RejectReason),
    /// The turn was interrupted or the session closed while streaming.
    Interrupted,
}

impl SendOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SendOutcome::Completed(_))
    }
}

/// Notifications collected under the lock and delivered after it is released.
enum Notice {
    State(SessionState),
    Delta(String),
    Thread(ThreadId),
    Completed(Message),
}

struct SessionShared {
    log: MessageLog,
    state: SessionState,
    thread_id: Option<ThreadId>,
    turn: u64,
    cancel: CancellationToken,
    closed: bool,
}

/// Orchestrates hydration, sending, stream consumption and error recovery
pub struct ConversationController {
    gateway: Arc<dyn ChatGateway>,
    store: Arc<dyn ThreadIdentityStore>,
    observer: Arc<dyn SessionObserver>,
    conversation_logger: Arc<dyn ConversationLogger>,
    shared: Mutex<SessionShared>,
}

impl ConversationController {
    /// Create a controller, reading the stored thread identity once.
    ///
    /// A store read failure is logged and treated as "no thread yet".
    pub fn new(gateway: Arc<dyn ChatGateway>, store: Arc<dyn ThreadIdentityStore>) -> Self {
        let thread_id = match store.load() {
            Ok(id) => id,
            Err(e) => {
                warn!("Could not read stored thread id, starting fresh: {}", e);
                None
            }
        };
        debug!(
            "Conversation controller created (thread: {})",
            thread_id.as_ref().map(ThreadId::as_str).unwrap_or("<none>")
        );

        Self {
            gateway,
            store,
            observer: Arc::new(NoSessionObserver),
            conversation_logger: Arc::new(NoConversationLogger),
            shared: Mutex::new(SessionShared {
                log: MessageLog::new(),
                state: SessionState::Idle,
                thread_id,
                turn: 0,
                cancel: CancellationToken::new(),
                closed: false,
            }),
        }
    }

    /// Create with a session observer.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    // ==================== Read model ====================

    /// Snapshot of the ordered message list.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().log.messages().to_vec()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// True until the first text fragment of the current reply arrives.
    pub fn is_loading(&self) -> bool {
        self.lock().state.is_loading()
    }

    pub fn thread_id(&self) -> Option<ThreadId> {
        self.lock().thread_id.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    // ==================== Operations ====================

    /// Seed the log with the stored thread's transcript.
    ///
    /// Call once at session start. Failures are absorbed.
    pub async fn hydrate(&self) -> HydrationStatus {
        let thread_id = self.thread_id();
        let outcome = HydrateHistoryUseCase::new(Arc::clone(&self.gateway))
            .execute(thread_id.as_ref())
            .await;

        let count = outcome.messages.len();
        self.lock().log.seed(outcome.messages);

        if outcome.status == HydrationStatus::Hydrated {
            self.conversation_logger.log(ConversationEvent::new(
                "history_hydrated",
                json!({
                    "thread_id": thread_id.as_ref().map(ThreadId::as_str),
                    "messages": count,
                }),
            ));
        }
        outcome.status
    }

    /// Send a user message and stream the reply into the log.
    ///
    /// Ignored (not queued) while a previous reply is still open. Never
    /// returns an error: failures end the turn in `Errored` and the next
    /// send starts normally.
    pub async fn send(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            debug!("Send ignored: empty message");
            return SendOutcome::Rejected(RejectReason::EmptyMessage);
        }

        let (request, turn, cancel) = {
            let mut shared = self.lock();
            if shared.closed {
                debug!("Send ignored: session closed");
                return SendOutcome::Rejected(RejectReason::Closed);
            }
            if !shared.state.accepts_send() {
                debug!("Send ignored: session is {}", shared.state);
                return SendOutcome::Rejected(RejectReason::Busy);
            }

            let user_id = shared.log.next_id();
            if let Err(e) = shared.log.append(Message::user(user_id, text)) {
                warn!("Send ignored: {}", e);
                return SendOutcome::Rejected(RejectReason::Busy);
            }
            let reply_id = shared.log.next_id();
            if let Err(e) = shared.log.append(Message::pending_assistant(reply_id)) {
                warn!("Send ignored: {}", e);
                return SendOutcome::Rejected(RejectReason::Busy);
            }

            shared.turn += 1;
            shared.cancel = CancellationToken::new();
            shared.state = SessionState::AwaitingFirstByte;

            (
                SendRequest::new(text, shared.thread_id.clone()),
                shared.turn,
                shared.cancel.clone(),
            )
        };

        info!("Sending message (turn {}): {}", turn, truncate(text, 80));
        self.observer.on_state_change(SessionState::AwaitingFirstByte);
        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            json!({
                "turn": turn,
                "thread_id": request.thread_id.as_ref().map(ThreadId::as_str),
                "text": text,
            }),
        ));

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return SendOutcome::Interrupted,
            opened = self.gateway.send(&request) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => return self.fail_turn(turn, TurnFailure::Transport(e)),
        };

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => return SendOutcome::Interrupted,
                item = stream.next() => item,
            };

            match item {
                None => return self.finish_turn(turn),
                Some(Err(e)) => return self.fail_turn(turn, TurnFailure::Transport(e)),
                Some(Ok(StreamEvent::StreamFailed { message })) => {
                    return self.fail_turn(turn, TurnFailure::Stream(message));
                }
                Some(Ok(event)) => {
                    if !self.apply_event(turn, event) {
                        return SendOutcome::Interrupted;
                    }
                }
            }
        }
    }

    /// Stop the current reply, keeping the text received so far.
    ///
    /// Returns `false` if no reply was open.
    pub fn interrupt(&self) -> bool {
        let notices = {
            let mut shared = self.lock();
            if !shared.state.is_busy() {
                return false;
            }
            shared.cancel.cancel();
            shared.turn += 1;
            shared.state = SessionState::Idle;

            let mut notices = Vec::with_capacity(2);
            if let Some(message) = shared.log.mark_pending_complete(PendingOutcome::Finished) {
                notices.push(Notice::Completed(message.clone()));
            }
            notices.push(Notice::State(SessionState::Idle));
            notices
        };

        info!("Reply interrupted");
        self.conversation_logger
            .log(ConversationEvent::new("turn_interrupted", json!({})));
        self.dispatch(notices);
        true
    }

    /// Close the session: interrupt any open reply and refuse further sends.
    pub fn close(&self) {
        self.lock().closed = true;
        self.interrupt();
        debug!("Conversation session closed");
    }

    // ==================== Internals ====================

    fn lock(&self) -> MutexGuard<'_, SessionShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a non-terminal event. Returns `false` if the turn is stale.
    fn apply_event(&self, turn: u64, event: StreamEvent) -> bool {
        trace!("Stream event: {}", event.kind());

        let notices = {
            let mut shared = self.lock();
            if shared.turn != turn {
                return false;
            }

            let mut notices = Vec::new();
            match event {
                StreamEvent::ThreadAssigned { id } => {
                    if let Some(current) = &shared.thread_id {
                        if *current != id {
                            debug!("Ignoring thread assignment {} (holding {})", id, current);
                        }
                    } else {
                        if let Err(e) = self.store.save(&id) {
                            warn!("Could not persist thread id {}: {}", id, e);
                        }
                        info!("Thread assigned: {}", id);
                        shared.thread_id = Some(id.clone());
                        notices.push(Notice::Thread(id));
                    }
                }
                StreamEvent::TextDelta { fragment } => {
                    if shared.state == SessionState::AwaitingFirstByte {
                        shared.state = SessionState::Streaming;
                        notices.push(Notice::State(SessionState::Streaming));
                    }
                    if shared.log.update_trailing_pending(|text| text.push_str(&fragment)) {
                        notices.push(Notice::Delta(fragment));
                    }
                }
                StreamEvent::StreamFailed { .. } => {}
            }
            notices
        };

        self.dispatch(notices);
        true
    }

    fn finish_turn(&self, turn: u64) -> SendOutcome {
        let completed = {
            let mut shared = self.lock();
            if shared.turn != turn {
                return SendOutcome::Interrupted;
            }
            shared.state = SessionState::Idle;
            shared
                .log
                .mark_pending_complete(PendingOutcome::Finished)
                .cloned()
        };

        let Some(message) = completed else {
            return SendOutcome::Interrupted;
        };

        debug!(
            "Reply complete (turn {}, {} bytes)",
            turn,
            message.text().len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "assistant_complete",
            json!({
                "turn": turn,
                "id": message.id().as_str(),
                "text": message.text(),
            }),
        ));
        self.dispatch(vec![
            Notice::Completed(message.clone()),
            Notice::State(SessionState::Idle),
        ]);
        SendOutcome::Completed(message)
    }

    fn fail_turn(&self, turn: u64, failure: TurnFailure) -> SendOutcome {
        let completed = {
            let mut shared = self.lock();
            if shared.turn != turn {
                return SendOutcome::Interrupted;
            }
            shared.state = SessionState::Errored;
            shared
                .log
                .mark_pending_complete(PendingOutcome::Replaced(TURN_FAILED_TEXT.to_string()))
                .cloned()
        };

        warn!(
            "Turn {} failed ({}): {}",
            turn,
            failure.category(),
            failure.detail()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "turn_failed",
            json!({
                "turn": turn,
                "category": failure.category(),
                "detail": failure.detail(),
            }),
        ));

        let mut notices = Vec::with_capacity(2);
        if let Some(message) = completed {
            notices.push(Notice::Completed(message));
        }
        notices.push(Notice::State(SessionState::Errored));
        self.dispatch(notices);

        SendOutcome::Failed(failure)
    }

    fn dispatch(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::State(state) => self.observer.on_state_change(state),
                Notice::Delta(fragment) => self.observer.on_delta(&fragment),
                Notice::Thread(id) => {
                    self.conversation_logger.log(ConversationEvent::new(
                        "thread_assigned",
                        json!({ "thread_id": id.as_str() }),
                    ));
                    self.observer.on_thread_assigned(&id);
                }
                Notice::Completed(message) => self.observer.on_turn_complete(&message),
            }
        }
    }
}
