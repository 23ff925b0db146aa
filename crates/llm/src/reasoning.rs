//! In-text reasoning marker extraction.
//!
//! Some OpenAI-compatible backends inline their "thinking" in the visible
//! answer wrapped in literal `<think>` tags instead of using a dedicated
//! reasoning field. Splitting on the literal tag pair is a heuristic: a
//! message that legitimately contains the tag text will be misclassified.
//! Known limitation, kept because every affected backend uses exactly this
//! convention.

const OPEN_TAG: &str = "<think>";
const CLOSE_TAG: &str = "</think>";

/// Split inline reasoning out of a complete answer.
///
/// Returns the visible text and the reasoning, if any. An unterminated open
/// tag treats everything after it as reasoning.
pub fn split_reasoning(text: &str) -> (String, Option<String>) {
    let Some(start) = text.find(OPEN_TAG) else {
        return (text.to_owned(), None);
    };
    let after = &text[start + OPEN_TAG.len()..];
    let (reasoning, rest) = match after.find(CLOSE_TAG) {
        Some(end) => (&after[..end], &after[end + CLOSE_TAG.len()..]),
        None => (after, ""),
    };
    let mut visible = String::with_capacity(text.len());
    visible.push_str(&text[..start]);
    visible.push_str(rest);
    let visible = visible.trim().to_owned();
    let reasoning = reasoning.trim();
    let reasoning = (!reasoning.is_empty()).then(|| reasoning.to_owned());
    (visible, reasoning)
}

/// Stateful splitter for streamed text deltas.
///
/// A tag may arrive split across chunk boundaries, so the splitter holds
/// back any trailing bytes that could still grow into a tag.
#[derive(Debug, Default)]
pub struct StreamSplitter {
    in_reasoning: bool,
    carry: String,
}

impl StreamSplitter {
    /// Create a splitter in the visible state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a text delta; returns the (visible, reasoning) text released by
    /// this delta.
    pub fn push(&mut self, delta: &str) -> (String, String) {
        self.carry.push_str(delta);
        let mut visible = String::new();
        let mut reasoning = String::new();
        loop {
            let tag = if self.in_reasoning { CLOSE_TAG } else { OPEN_TAG };
            let out = if self.in_reasoning {
                &mut reasoning
            } else {
                &mut visible
            };
            if let Some(pos) = self.carry.find(tag) {
                out.push_str(&self.carry[..pos]);
                self.carry.drain(..pos + tag.len());
                self.in_reasoning = !self.in_reasoning;
                continue;
            }
            // Hold back a suffix that is a prefix of the tag we are
            // looking for.
            let keep = suffix_overlap(&self.carry, tag);
            let release = self.carry.len() - keep;
            out.push_str(&self.carry[..release]);
            self.carry.drain(..release);
            break;
        }
        (visible, reasoning)
    }

    /// Release any held-back text at end of stream.
    pub fn flush(&mut self) -> (String, String) {
        let rest = std::mem::take(&mut self.carry);
        if self.in_reasoning {
            (String::new(), rest)
        } else {
            (rest, String::new())
        }
    }
}

/// Length of the longest suffix of `s` that is a proper prefix of `tag`.
///
/// Tags are ASCII, so a matching suffix always starts on a char boundary.
fn suffix_overlap(s: &str, tag: &str) -> usize {
    let max = (tag.len() - 1).min(s.len());
    (1..=max)
        .rev()
        .find(|&n| tag.as_bytes()[..n] == s.as_bytes()[s.len() - n..])
        .unwrap_or(0)
}
