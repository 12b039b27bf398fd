//! Incremental decoder for newline-delimited event streams.

use modelgate_common::DONE_SENTINEL;

/// One decoded wire event: an `event:` name (explicit or defaulted) plus the
/// raw `data:` payload, preserved byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEvent {
    pub event: String,
    pub data: String,
}

/// Incremental SSE decoder.
///
/// Bytes arrive in arbitrarily sized, arbitrarily aligned chunks. The parser
/// buffers the trailing incomplete line between pushes, so the emitted event
/// sequence never depends on where chunk boundaries fall. Splitting only at
/// `\n` also keeps a multi-byte UTF-8 sequence that straddles a chunk
/// boundary in the buffer until its line completes.
///
/// Grammar: an `event: <name>` line sets the sticky event type for the
/// `data:` lines that follow it, until a blank line or the next `event:`
/// line. A `data:` line emits one event, typed by the register or by the
/// caller-configured default. Any other line is ignored. A `data: [DONE]`
/// payload emits one terminal `done` event, after which all further input is
/// discarded.
#[derive(Debug)]
pub struct FrameParser {
    buffer: Vec<u8>,
    event_type: Option<String>,
    default_event: String,
    finished: bool,
}

impl FrameParser {
    /// `default_event` names data lines with no preceding `event:` line:
    /// `"message"` for single-model chat, `"chunk"` for compare relay.
    pub fn new(default_event: &str) -> Self {
        Self {
            buffer: Vec::new(),
            event_type: None,
            default_event: default_event.to_string(),
            finished: false,
        }
    }

    /// Whether the `[DONE]` sentinel has been consumed.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Feed one chunk, returning every event it completes.
    ///
    /// A partial line left in the buffer at end of stream is incomplete by
    /// definition and carries no well-formed event; there is nothing to
    /// flush.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<WireEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            if let Some(event) = self.process_line(line.trim_end_matches(|c| c == '\n' || c == '\r'))
            {
                events.push(event);
            }
            if self.finished {
                self.buffer.clear();
                break;
            }
        }

        events
    }

    fn process_line(&mut self, line: &str) -> Option<WireEvent> {
        if line.is_empty() {
            self.event_type = None;
            return None;
        }

        if let Some(rest) = line.strip_prefix("event:") {
            self.event_type = Some(rest.trim().to_string());
            return None;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            // The wire format uses a single space after the colon; strip
            // exactly one so the payload survives byte-for-byte.
            let payload = rest.strip_prefix(' ').unwrap_or(rest);

            if payload == DONE_SENTINEL {
                self.finished = true;
                return Some(WireEvent {
                    event: "done".to_string(),
                    data: DONE_SENTINEL.to_string(),
                });
            }

            return Some(WireEvent {
                event: self
                    .event_type
                    .clone()
                    .unwrap_or_else(|| self.default_event.clone()),
                data: payload.to_string(),
            });
        }

        // Comments (`:`-prefixed) and unknown fields are ignored.
        None
    }
}
