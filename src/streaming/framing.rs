//! Chunk framing
//!
//! Plain-text bodies are forwarded read by read. JSON-lines bodies are cut at
//! the last newline so the decoder never sees half a record; the incomplete
//! remainder is carried into the next read.

/// How decoded body text is grouped into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Every read is one chunk.
    #[default]
    Passthrough,
    /// Chunks end on a newline.
    Lines,
}

/// Stateful framer for one response body.
#[derive(Debug, Default)]
pub struct ChunkFramer {
    framing: Framing,
    pending: String,
}

impl ChunkFramer {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            pending: String::new(),
        }
    }

    /// Feed decoded text; returns the chunk ready for the decoder, if any.
    pub fn push(&mut self, text: &str) -> Option<String> {
        match self.framing {
            Framing::Passthrough => (!text.is_empty()).then(|| text.to_string()),
            Framing::Lines => {
                self.pending.push_str(text);
                let cut = self.pending.rfind('\n')? + 1;
                let rest = self.pending.split_off(cut);
                Some(std::mem::replace(&mut self.pending, rest))
            }
        }
    }

    /// Flush the unterminated tail at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        (!rest.is_empty()).then_some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_forwards_each_read() {
        let mut framer = ChunkFramer::new(Framing::Passthrough);
        assert_eq!(framer.push("Hel").as_deref(), Some("Hel"));
        assert_eq!(framer.push(""), None);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn lines_hold_partial_records() {
        let mut framer = ChunkFramer::new(Framing::Lines);
        assert_eq!(framer.push("{\"message\":{\"con"), None);
        assert_eq!(
            framer.push("tent\":\"A\"}}\n{\"mess").as_deref(),
            Some("{\"message\":{\"content\":\"A\"}}\n")
        );
        assert_eq!(framer.push("age\""), None);
        assert_eq!(framer.finish().as_deref(), Some("{\"message\""));
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn lines_emit_several_complete_records_at_once() {
        let mut framer = ChunkFramer::new(Framing::Lines);
        assert_eq!(framer.push("a\nb\nc").as_deref(), Some("a\nb\n"));
        assert_eq!(framer.push("\n").as_deref(), Some("c\n"));
    }
}
