//! In-memory `AssistantBackend` driven by scripted run statuses.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{AiError, Role};

use super::backend::AssistantBackend;
use super::types::{AssistantInfo, ListOrder, Run, RunStatus, Thread, ThreadMessage};

/// One backend call, recorded in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CreateThread,
    RetrieveThread(String),
    CreateMessage(String),
    ListMessages(String),
    CreateRun(String),
    RetrieveRun(String),
    RetrieveAssistant(String),
}

struct ScriptedRun {
    thread_id: String,
    assistant_id: String,
    status: RunStatus,
    remaining: VecDeque<RunStatus>,
    replied: bool,
}

#[derive(Default)]
struct State {
    next_id: u64,
    clock: i64,
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, ScriptedRun>,
    run_scripts: VecDeque<Vec<RunStatus>>,
    reply: Option<String>,
    assistants: HashMap<String, AssistantInfo>,
    failing_assistant_lookups: usize,
    calls: Vec<Call>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        1_700_000_000 + self.clock
    }

    fn push_message(&mut self, thread_id: &str, role: Role, content: Option<String>) -> ThreadMessage {
        let msg = ThreadMessage {
            id: self.next_id("msg"),
            thread_id: thread_id.to_string(),
            role,
            content,
            created_at: self.tick(),
        };
        if let Some(messages) = self.threads.get_mut(thread_id) {
            messages.push(msg.clone());
        }
        msg
    }

    /// Append the scripted assistant reply once the run completes.
    fn settle(&mut self, run_id: &str) -> Run {
        let (thread_id, reply_due) = {
            let run = &self.runs[run_id];
            (
                run.thread_id.clone(),
                run.status == RunStatus::Completed && !run.replied,
            )
        };
        if reply_due {
            if let Some(reply) = self.reply.clone() {
                self.push_message(&thread_id, Role::Assistant, Some(reply));
            }
            if let Some(run) = self.runs.get_mut(run_id) {
                run.replied = true;
            }
        }
        let run = &self.runs[run_id];
        Run {
            id: run_id.to_string(),
            thread_id: run.thread_id.clone(),
            assistant_id: run.assistant_id.clone(),
            status: run.status.clone(),
            last_error: None,
        }
    }
}

fn not_found(kind: &str, id: &str) -> AiError {
    AiError::http(StatusCode::NOT_FOUND, &format!("No {kind} found with id '{id}'."))
}

/// Scripted provider. Runs follow the queued status scripts (default:
/// immediately `completed`) and stay on the last scripted status.
pub(crate) struct ScriptedBackend {
    state: Mutex<State>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        let state = State {
            reply: Some("Hi".to_string()),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn add_thread(&self, thread_id: &str) {
        self.state
            .lock()
            .unwrap()
            .threads
            .insert(thread_id.to_string(), Vec::new());
    }

    pub fn remove_thread(&self, thread_id: &str) {
        self.state.lock().unwrap().threads.remove(thread_id);
    }

    pub fn add_message(&self, thread_id: &str, role: Role, content: &str) {
        self.state
            .lock()
            .unwrap()
            .push_message(thread_id, role, Some(content.to_string()));
    }

    pub fn add_assistant(&self, assistant_id: &str, name: &str) {
        let info = AssistantInfo {
            name: Some(name.to_string()),
            model: "gpt-4o-mini".to_string(),
            instructions: Some("Be helpful.".to_string()),
            tools: Vec::new(),
        };
        self.state
            .lock()
            .unwrap()
            .assistants
            .insert(assistant_id.to_string(), info);
    }

    /// Statuses reported by the next created run, in order.
    pub fn script_run(&self, statuses: Vec<RunStatus>) {
        self.state.lock().unwrap().run_scripts.push_back(statuses);
    }

    /// Text appended as the assistant's message when a run completes.
    pub fn set_reply(&self, reply: Option<&str>) {
        self.state.lock().unwrap().reply = reply.map(String::from);
    }

    /// Make the next `count` assistant lookups fail with HTTP 500.
    pub fn fail_assistant_lookups(&self, count: usize) {
        self.state.lock().unwrap().failing_assistant_lookups = count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn messages(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.state
            .lock()
            .unwrap()
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn thread_count(&self) -> usize {
        self.state.lock().unwrap().threads.len()
    }
}

#[async_trait]
impl AssistantBackend for ScriptedBackend {
    async fn create_thread(&self) -> Result<Thread, AiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateThread);
        let id = state.next_id("thread");
        let created_at = state.tick();
        state.threads.insert(id.clone(), Vec::new());
        Ok(Thread { id, created_at })
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread, AiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveThread(thread_id.to_string()));
        if state.threads.contains_key(thread_id) {
            Ok(Thread {
                id: thread_id.to_string(),
                created_at: 1_700_000_000,
            })
        } else {
            Err(not_found("thread", thread_id))
        }
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateMessage(thread_id.to_string()));
        if !state.threads.contains_key(thread_id) {
            return Err(not_found("thread", thread_id));
        }
        Ok(state.push_message(thread_id, role, Some(content.to_string())))
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: u32,
        order: ListOrder,
    ) -> Result<Vec<ThreadMessage>, AiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListMessages(thread_id.to_string()));
        let mut messages = state
            .threads
            .get(thread_id)
            .cloned()
            .ok_or_else(|| not_found("thread", thread_id))?;
        if order == ListOrder::Desc {
            messages.reverse();
        }
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateRun(thread_id.to_string()));
        if !state.threads.contains_key(thread_id) {
            return Err(not_found("thread", thread_id));
        }
        let mut remaining: VecDeque<RunStatus> = state
            .run_scripts
            .pop_front()
            .unwrap_or_else(|| vec![RunStatus::Completed])
            .into();
        let status = remaining.pop_front().unwrap_or(RunStatus::Completed);
        let id = state.next_id("run");
        state.runs.insert(
            id.clone(),
            ScriptedRun {
                thread_id: thread_id.to_string(),
                assistant_id: assistant_id.to_string(),
                status,
                remaining,
                replied: false,
            },
        );
        Ok(state.settle(&id))
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RetrieveRun(run_id.to_string()));
        match state.runs.get_mut(run_id) {
            Some(run) if run.thread_id == thread_id => {
                if let Some(next) = run.remaining.pop_front() {
                    run.status = next;
                }
            }
            _ => return Err(not_found("run", run_id)),
        }
        Ok(state.settle(run_id))
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<AssistantInfo, AiError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::RetrieveAssistant(assistant_id.to_string()));
        if state.failing_assistant_lookups > 0 {
            state.failing_assistant_lookups -= 1;
            return Err(AiError::http(
                StatusCode::INTERNAL_SERVER_ERROR,
                "The server had an error while processing your request.",
            ));
        }
        state
            .assistants
            .get(assistant_id)
            .cloned()
            .ok_or_else(|| not_found("assistant", assistant_id))
    }
}
