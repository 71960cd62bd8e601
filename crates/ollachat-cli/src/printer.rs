use std::io::{self, Write};

use ollachat_core::llm::GenerationEvent;

use crate::render::render_markdown;

/// Writes generation events to a terminal.
///
/// Fragments are written raw while a stream is live. At `Done` the final
/// text is rendered as Markdown unless the stream already showed exactly
/// that text. A stream that broke off before a fallback tier answered is
/// followed by the complete reply.
pub struct EventPrinter<O: Write, E: Write> {
    out: O,
    err: E,
    streamed: String,
}

impl<O: Write, E: Write> EventPrinter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            streamed: String::new(),
        }
    }

    pub fn handle(&mut self, event: GenerationEvent) -> io::Result<()> {
        match event {
            GenerationEvent::Info(msg) => writeln!(self.err, "[info] {msg}"),
            GenerationEvent::Warning(msg) => writeln!(self.err, "[warn] {msg}"),
            GenerationEvent::Fragment(text) => {
                if self.streamed.is_empty() {
                    writeln!(self.out)?;
                }
                self.streamed.push_str(&text);
                write!(self.out, "{text}")?;
                self.out.flush()
            }
            GenerationEvent::Done(text) => {
                let streamed = std::mem::take(&mut self.streamed);
                if streamed.is_empty() {
                    writeln!(self.out, "\n{}\n", render_markdown(&text))
                } else if streamed == text {
                    writeln!(self.out, "\n")
                } else {
                    writeln!(self.err, "\n[info] (stream interrupted; full reply follows)")?;
                    writeln!(self.out, "\n\n{}\n", render_markdown(&text))
                }
            }
            GenerationEvent::Error(e) => {
                self.streamed.clear();
                writeln!(self.err, "[error] {e}")
            }
            GenerationEvent::ReadFailed { path, reason } => {
                writeln!(self.err, "[error] Could not read {}: {reason}", path.display())
            }
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
