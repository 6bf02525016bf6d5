//! Session controller — the read–classify–act loop.
//!
//! ```text
//! Starting ──start()──▶ Running ──exit keyword──────────▶ Terminated
//!                          │
//!                          └──EOF / read error / Ctrl-C──▶ Interrupted
//!                             (Ctrl-C also aborts a pending LLM call)
//! ```
//!
//! Lines are handled strictly one at a time: the next line is read only
//! after the current one (including any LLM round-trip) is finished. Only
//! the LLM call can fail at turn level, and it is contained to that turn.
//! Input bytes that are not valid UTF-8 are replaced, not rejected.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::knowledge::KnowledgeStore;
use crate::llm::Role;
use crate::llm::gateway::LlmGateway;
use crate::memory::ConversationMemory;
use super::commands::{Intent, classify};
use super::transcript::EntryLevel;
use super::{Session, SessionState};

const USER_PROMPT: &str = "Вы: ";
const BOT_PREFIX: &str = "Бот: ";
const BANNER: &str = "Начинаем диалог с ботом (для выхода введите 'выход')";
const GOODBYE: &str = "До свидания!";
const SHUTTING_DOWN: &str = "Завершение работы.";
const CONTEXT_CLEARED: &str = "Контекст диалога очищен.";
const ORDER_USAGE: &str = "Укажите номер заказа: /order <id>";
const TIMEOUT_REPLY: &str = "[Ошибка] Превышено время ожидания ответа.";

fn order_status_reply(order_id: &str, status: &str) -> String {
    format!("Статус заказа {order_id} - {status}")
}

fn order_not_found_reply(order_id: &str) -> String {
    format!(
        "К сожалению, заказ {order_id} не числится в нашей базе. \
         Пожалуйста, проверьте правильность написания ID заказа"
    )
}

/// What the loop should do after one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// Blank line; nothing printed, nothing logged.
    Ignored,
    Reply(String),
    /// Print the farewell and stop.
    Exit(String),
    /// Shutdown fired while the turn was in flight.
    Interrupted,
}

pub struct SessionController {
    session: Session,
    knowledge: KnowledgeStore,
    memory: ConversationMemory,
    gateway: LlmGateway,
    primer: String,
    state: SessionState,
    /// Replaced by the token passed to [`run`](Self::run).
    shutdown: CancellationToken,
}

impl SessionController {
    pub fn new(
        session: Session,
        knowledge: KnowledgeStore,
        gateway: LlmGateway,
        primer: impl Into<String>,
        memory_cap: Option<usize>,
    ) -> Self {
        Self {
            session,
            knowledge,
            memory: ConversationMemory::new(memory_cap),
            gateway,
            primer: primer.into(),
            state: SessionState::Starting,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Seed memory, log the start and print the banner.
    pub fn start<W: Write>(&mut self, out: &mut W) -> Result<(), AppError> {
        self.memory.seed(&self.primer);
        self.state = SessionState::Running;
        self.session.record(
            EntryLevel::Info,
            Role::System,
            &format!("session {} started (mode: {})", self.session.id, self.gateway.mode()),
            None,
        );
        info!(session_id = %self.session.id, mode = %self.gateway.mode(), "session started");
        writeln!(out, "{BANNER}")?;
        writeln!(out, "==== New Session {} ====", self.session.id)?;
        Ok(())
    }

    /// Drive the session until it reaches a terminal state.
    ///
    /// `shutdown` is raced against every line read and every LLM call; when
    /// it fires (Ctrl-C in `main`) the session ends as `Interrupted`. The
    /// transcript is closed before returning on every path that gets past
    /// `start`.
    pub async fn run<R, W>(
        &mut self,
        mut input: R,
        out: &mut W,
        shutdown: CancellationToken,
    ) -> Result<SessionState, AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.shutdown = shutdown;
        if self.state == SessionState::Starting {
            self.start(out)?;
        }
        let mut buf = Vec::new();

        let result: Result<(), AppError> = loop {
            if let Err(e) = write!(out, "{USER_PROMPT}").and_then(|_| out.flush()) {
                break Err(e.into());
            }

            buf.clear();
            let read = tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!("shutdown signal received");
                    None
                }

                read = input.read_until(b'\n', &mut buf) => match read {
                    Ok(0) => None,
                    Ok(_) => Some(()),
                    Err(e) => {
                        warn!(error = %e, "input read error");
                        None
                    }
                },
            };

            if read.is_none() {
                break self.shut_down(out);
            }
            let line = String::from_utf8_lossy(&buf).into_owned();

            match self.handle_line(&line).await {
                Turn::Ignored => continue,
                Turn::Reply(text) => {
                    if let Err(e) = writeln!(out, "{BOT_PREFIX}{text}") {
                        break Err(e.into());
                    }
                }
                Turn::Exit(text) => {
                    break writeln!(out, "{BOT_PREFIX}{text}").map_err(AppError::from);
                }
                Turn::Interrupted => break self.shut_down(out),
            }
        };

        self.finish()?;
        result.map(|_| self.state)
    }

    /// Classify and act on one line of input.
    pub async fn handle_line(&mut self, line: &str) -> Turn {
        let intent = classify(line, &self.knowledge.faq);
        if intent == Intent::Empty {
            return Turn::Ignored;
        }
        let text = line.trim();
        debug!(?intent, "classified input");
        self.session.record(EntryLevel::Info, Role::User, text, None);

        match intent {
            Intent::Empty => Turn::Ignored,
            Intent::Exit => {
                self.state = SessionState::Terminated;
                self.session.record(EntryLevel::Info, Role::System, "user initiated exit", None);
                info!(session_id = %self.session.id, "user initiated exit");
                Turn::Exit(GOODBYE.to_string())
            }
            Intent::Reset => {
                self.reset_memory();
                self.session.record(EntryLevel::Info, Role::System, "user cleared context", None);
                info!(session_id = %self.session.id, "conversation memory reset");
                Turn::Reply(CONTEXT_CLEARED.to_string())
            }
            Intent::Order(order_id) => {
                let reply = self.order_reply(order_id);
                self.reply_canned(reply)
            }
            Intent::Faq(answer) => self.reply_canned(answer),
            Intent::Query(query) => self.ask_gateway(query).await,
        }
    }

    fn order_reply(&self, order_id: Option<&str>) -> String {
        let Some(order_id) = order_id else {
            return ORDER_USAGE.to_string();
        };
        match self.knowledge.orders.get(order_id) {
            Some(record) => order_status_reply(order_id, &record.status),
            None => order_not_found_reply(order_id),
        }
    }

    /// Locally answered turn: logged, never added to memory.
    fn reply_canned(&mut self, reply: String) -> Turn {
        self.session.record(EntryLevel::Info, Role::Assistant, &reply, None);
        Turn::Reply(reply)
    }

    async fn ask_gateway(&mut self, query: &str) -> Turn {
        let outcome = tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => None,
            result = self.gateway.complete(query, &self.memory) => Some(result),
        };
        let Some(outcome) = outcome else {
            info!(session_id = %self.session.id, "llm request abandoned on shutdown");
            return Turn::Interrupted;
        };

        match outcome {
            Ok(response) => {
                self.memory.append(Role::User, query);
                self.memory.append(Role::Assistant, response.text.clone());
                info!(
                    total_tokens = response.usage.map(|u| u.total_tokens()),
                    memory_len = self.memory.len(),
                    "llm reply"
                );
                self.session.record(
                    EntryLevel::Info,
                    Role::Assistant,
                    &response.text,
                    response.usage,
                );
                Turn::Reply(response.text)
            }
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "llm request timed out");
                self.session.record(EntryLevel::Error, Role::System, &format!("Error: {e}"), None);
                Turn::Reply(TIMEOUT_REPLY.to_string())
            }
            Err(e) => {
                error!(error = %e, "llm request failed");
                self.session.record(EntryLevel::Error, Role::System, &format!("Error: {e}"), None);
                Turn::Reply(format!("[Ошибка] {e}"))
            }
        }
    }

    fn reset_memory(&mut self) {
        self.memory.clear();
        self.memory.seed(&self.primer);
    }

    fn shut_down<W: Write>(&mut self, out: &mut W) -> Result<(), AppError> {
        self.state = SessionState::Interrupted;
        let note = "input interrupted; session ended";
        self.session.record(EntryLevel::Info, Role::System, note, None);
        info!(session_id = %self.session.id, "session interrupted");
        writeln!(out, "\n{BOT_PREFIX}{SHUTTING_DOWN}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        self.session.close()?;
        info!(session_id = %self.session.id, state = ?self.state, "session closed");
        Ok(())
    }
}
