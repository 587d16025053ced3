//! Scripted transport for driver tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use regex::bytes::Regex;

use super::Transport;
use crate::error::{ChannelError, Result, TransportError};

/// Prompt appended to every scripted command reply.
pub const PROMPT: &str = "HP-Switch-5406zl# ";

#[derive(Debug, Default)]
struct State {
    /// Replies per input. The last queued reply repeats.
    replies: HashMap<String, VecDeque<String>>,
    /// Everything written, in order.
    sent: Vec<String>,
    banner: String,
    refuse_connect: bool,
    link_down: bool,
}

/// Shared script; cloned into the transport on connect so tests can keep
/// inspecting it.
#[derive(Debug, Clone)]
pub struct MockScript {
    state: Arc<Mutex<State>>,
}

impl MockScript {
    pub fn new() -> Self {
        let state = State {
            banner: format!("\r\n{PROMPT}"),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Queue command output; the CLI prompt is appended.
    pub fn reply(&self, input: &str, body: &str) -> &Self {
        self.raw(input, &format!("{body}\r\n{PROMPT}"))
    }

    /// Queue raw output with no prompt appended (interactive prompts).
    pub fn raw(&self, input: &str, text: &str) -> &Self {
        self.state()
            .replies
            .entry(input.to_string())
            .or_default()
            .push_back(text.to_string());
        self
    }

    /// Replace the text shown right after connecting.
    pub fn banner(&self, text: &str) -> &Self {
        self.state().banner = text.to_string();
        self
    }

    pub fn refuse_connect(&self) -> &Self {
        self.state().refuse_connect = true;
        self
    }

    /// Simulate the device dropping the link.
    pub fn drop_link(&self) {
        self.state().link_down = true;
    }

    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    pub fn count(&self, input: &str) -> usize {
        self.state().sent.iter().filter(|s| *s == input).count()
    }

    fn next_reply(&self, input: &str) -> String {
        let mut state = self.state();
        state.sent.push(input.to_string());
        match state.replies.get_mut(input) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => format!("\r\nInvalid input: {input}\r\n{PROMPT}"),
        }
    }
}

/// Transport that answers from a [`MockScript`].
pub struct MockTransport {
    script: MockScript,
    pending: String,
}

impl Transport for MockTransport {
    type Config = MockScript;

    async fn connect(config: &MockScript) -> Result<Self> {
        let banner = {
            let state = config.state();
            if state.refuse_connect {
                return Err(TransportError::Disconnected.into());
            }
            state.banner.clone()
        };

        Ok(Self {
            script: config.clone(),
            pending: banner,
        })
    }

    async fn write(&mut self, input: &str) -> Result<()> {
        if self.script.state().link_down {
            return Err(ChannelError::Closed.into());
        }
        let reply = self.script.next_reply(input);
        self.pending.push_str(input);
        self.pending.push_str(&reply);
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<String> {
        if self.script.state().link_down {
            return Err(ChannelError::Closed.into());
        }
        match pattern.find(self.pending.as_bytes()) {
            Some(m) => {
                let rest = self.pending.split_off(m.end());
                Ok(std::mem::replace(&mut self.pending, rest))
            }
            None => Err(ChannelError::PatternTimeout(timeout).into()),
        }
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }

    fn is_alive(&self) -> bool {
        !self.script.state().link_down
    }
}
