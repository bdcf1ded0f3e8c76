//! Wire framing decoders
//!
//! Both decoders accept arbitrary byte slices (a network read can split an
//! event anywhere) and emit complete payload strings.

use super::merger::StreamFraming;

/// One decoded server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

impl SseEvent {
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Incremental SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning every event completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }

        events
    }

    /// Flush an event left open when the stream ends without a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).trim_end().to_string();
            if let Some(event) = self.process_line(&line) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent { event, data })
    }
}

/// Incremental newline-delimited JSON decoder
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest).trim().to_string();
        if line.is_empty() { None } else { Some(line) }
    }
}

/// Decoder selected by framing. Yields raw payload strings.
#[derive(Debug)]
pub enum ChunkDecoder {
    Sse(SseDecoder),
    Ndjson(NdjsonDecoder),
}

impl ChunkDecoder {
    pub fn new(framing: StreamFraming) -> Self {
        match framing {
            StreamFraming::Sse => Self::Sse(SseDecoder::new()),
            StreamFraming::Ndjson => Self::Ndjson(NdjsonDecoder::new()),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        match self {
            Self::Sse(d) => d
                .feed(bytes)
                .into_iter()
                .filter(|e| !e.is_done())
                .map(|e| e.data)
                .collect(),
            Self::Ndjson(d) => d.feed(bytes),
        }
    }

    pub fn finish(&mut self) -> Option<String> {
        match self {
            Self::Sse(d) => d.finish().filter(|e| !e.is_done()).map(|e| e.data),
            Self::Ndjson(d) => d.finish(),
        }
    }
}
