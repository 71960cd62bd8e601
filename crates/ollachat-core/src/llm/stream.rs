use crate::llm::traits::GenerateChunk;

/// Splits a newline-delimited JSON byte stream into generate records.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across network chunks decode correctly. Lines that do
/// not parse are dropped.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every record completed by them.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<GenerateChunk> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            if let Some(record) = Self::parse_line(&line) {
                records.push(record);
            }
        }
        records
    }

    /// Parse whatever is left once the body has closed.
    pub fn finish(&mut self) -> Option<GenerateChunk> {
        let rest = std::mem::take(&mut self.buffer);
        Self::parse_line(&rest)
    }

    fn parse_line(line: &[u8]) -> Option<GenerateChunk> {
        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str::<GenerateChunk>(text) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping unparsable stream record: {e}");
                None
            }
        }
    }
}

/// Holds streamed text until it is worth showing.
///
/// A flush happens when a fragment carries a newline or when the unflushed
/// text reaches `threshold` characters. Everything pushed is also kept in
/// full for persistence.
#[derive(Debug)]
pub struct FlushBuffer {
    pending: String,
    full: String,
    threshold: usize,
}

impl FlushBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            pending: String::new(),
            full: String::new(),
            threshold,
        }
    }

    /// Add a fragment; returns the text to flush, if any.
    pub fn push(&mut self, fragment: &str) -> Option<String> {
        if fragment.is_empty() {
            return None;
        }
        self.pending.push_str(fragment);
        self.full.push_str(fragment);

        if fragment.contains('\n') || self.pending.chars().count() >= self.threshold {
            Some(std::mem::take(&mut self.pending))
        } else {
            None
        }
    }

    /// Flush the remainder at stream end.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    pub fn text(&self) -> &str {
        &self.full
    }

    pub fn into_text(self) -> String {
        self.full
    }
}
