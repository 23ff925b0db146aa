//! Incremental Server-Sent-Events decoding.
//!
//! Network chunks split SSE lines at arbitrary byte boundaries; the decoder
//! buffers partial lines until their newline arrives, so callers can feed
//! bytes as they come off the wire and pull complete `data:` payloads.

/// A line-oriented SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw network bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete `data:` payload, if one is buffered.
    ///
    /// Blank lines and comment lines (leading colon) are skipped. Other SSE
    /// fields (`event:`, `id:`, `retry:`) carry nothing the adapters use —
    /// both providers dispatch on the JSON payload itself.
    pub fn next_data(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                return Some(data.trim_start().to_owned());
            }
        }
        None
    }
}
