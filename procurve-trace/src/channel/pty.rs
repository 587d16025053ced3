//! PTY channel abstraction for interactive sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Search depth for pattern matching.
    pub search_depth: usize,

    /// Terminal width.
    pub terminal_width: u32,

    /// Terminal height.
    pub terminal_height: u32,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
        }
    }
}

/// High-level PTY channel for interactive device sessions.
///
/// Wraps a russh session channel and provides pattern-based reads with
/// timeout handling.
pub struct PtyChannel {
    /// The underlying SSH channel.
    channel: Channel<Msg>,

    /// Pattern buffer for accumulating output.
    buffer: PatternBuffer,

    /// Set once the server sent EOF/close or the channel went away.
    closed: bool,
}

impl PtyChannel {
    /// Wrap an already opened channel (PTY and shell requested).
    pub fn new(channel: Channel<Msg>, config: &PtyConfig) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(config.search_depth),
            closed: false,
        }
    }

    /// Check if the channel is still open.
    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// Send `input` followed by a newline.
    pub async fn write_line(&mut self, input: &str) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }

        let mut data = Vec::with_capacity(input.len() + 1);
        data.extend_from_slice(input.as_bytes());
        data.push(b'\n');

        self.channel
            .data(&data[..])
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the buffer.
    ///
    /// Returns everything up to and including the match; bytes received
    /// after the match stay buffered for the next read.
    pub async fn read_until_pattern(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(end) = self.buffer.find_in_tail(pattern) {
                return Ok(self.buffer.take_until(end));
            }

            if self.closed {
                return Err(ChannelError::Closed.into());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => {
                    trace!("received {} bytes", data.len());
                    self.buffer.extend(&data);
                }
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    self.buffer.extend(&data);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    self.closed = true;
                }
                Some(_) => {}
            }
        }
    }

    /// Close the channel, discarding any buffered output.
    pub async fn close(&mut self) -> Result<()> {
        self.buffer.clear();
        if !self.closed {
            self.closed = true;
            self.channel.close().await.map_err(ChannelError::Ssh)?;
        }
        Ok(())
    }
}
