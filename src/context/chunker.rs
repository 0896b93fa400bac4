// Two-pass greedy line packer: plan the chunk count, then emit exactly that many chunks.
use crate::constants::MARKER_TAG;
use crate::tokenizer::TokenCounter;
use std::ops::Range;

/// Packing state for the chunk currently being filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PackState {
    running: usize,
}

impl PackState {
    /// Admit one line. Returns the new state and whether the line opens a new
    /// chunk. A line that alone exceeds the budget still gets admitted.
    fn admit(
        self,
        tokens: usize,
        budget: usize,
    ) -> (Self, bool) {
        if self.running > 0 && self.running + tokens > budget {
            (Self { running: tokens }, true)
        } else {
            (
                Self {
                    running: self.running + tokens,
                },
                false,
            )
        }
    }
}

/// Line ranges of each chunk. Shared by planning and materialization.
fn segments(
    line_tokens: &[usize],
    budget: usize,
) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut state = PackState::default();
    let mut start = 0usize;
    for (idx, &tokens) in line_tokens.iter().enumerate() {
        let (next, boundary) = state.admit(tokens, budget);
        if boundary {
            out.push(start..idx);
            start = idx;
        }
        state = next;
    }
    if start < line_tokens.len() {
        out.push(start..line_tokens.len());
    }
    out
}

/// Token count of every line, counted once so both passes see the same numbers.
pub struct ChunkPlan<'a> {
    lines: &'a [String],
    line_tokens: Vec<usize>,
    budget: usize,
    total_chunks: usize,
}

impl<'a> ChunkPlan<'a> {
    /// Planning pass.
    pub fn new(
        lines: &'a [String],
        budget: usize,
        counter: &dyn TokenCounter,
    ) -> Self {
        let line_tokens: Vec<usize> = lines.iter().map(|l| counter.count(l)).collect();
        let total_chunks = segments(&line_tokens, budget).len();
        Self {
            lines,
            line_tokens,
            budget,
            total_chunks,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Materialization pass: re-walks the same token counts with the same rule.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk<'a>> + '_ {
        let total = self.total_chunks;
        let lines = self.lines;
        let line_tokens = &self.line_tokens;
        segments(line_tokens, self.budget)
            .into_iter()
            .enumerate()
            .map(move |(i, range)| Chunk {
                index: i + 1,
                total,
                tokens: line_tokens[range.clone()].iter().sum(),
                lines: &lines[range],
            })
    }
}

/// One materialized chunk, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub total: usize,
    /// Sum of body line tokens; markers are not counted.
    pub tokens: usize,
    pub lines: &'a [String],
}

impl Chunk<'_> {
    pub fn is_final(&self) -> bool {
        self.index == self.total
    }

    pub fn marker(&self) -> String {
        if self.is_final() {
            format!(
                "{MARKER_TAG} This is chunk {} of {}. This is everything. Make an index of all the information you've been provided and summarize it, then ask me what I want to do next.",
                self.index, self.total
            )
        } else {
            format!(
                "{MARKER_TAG} This is chunk {} of {}. Do not respond yet, more chunks are coming.",
                self.index, self.total
            )
        }
    }

    pub fn file_name(&self) -> String {
        format!("chunk_{}_of_{}.txt", self.index, self.total)
    }

    /// Marker, body lines, marker; newline-terminated.
    pub fn render(&self) -> String {
        let marker = self.marker();
        let mut out = String::with_capacity(marker.len() * 2 + self.lines.len() * 32);
        out.push_str(&marker);
        out.push('\n');
        for line in self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&marker);
        out.push('\n');
        out
    }
}
