//! Terminator scanner
//!
//! A false conditional or a closed timer gate skips forward to the next
//! closing line. The search is byte-wise, so a match inside another
//! instruction's operands lands mid-line and the dispatch loop rejects it.

use std::fmt;

use codehandler_spec::{CODE_LINE_BYTES, RESET_TIMER_LINE, TERMINATOR_LINE};

/// Line that closes a skipped block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEnd {
    /// Closes a conditional block
    Terminator,
    /// Closes a time-gated block
    ResetTimer,
}

impl BlockEnd {
    pub fn line(self) -> &'static [u8; CODE_LINE_BYTES] {
        match self {
            BlockEnd::Terminator => &TERMINATOR_LINE,
            BlockEnd::ResetTimer => &RESET_TIMER_LINE,
        }
    }
}

impl fmt::Display for BlockEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockEnd::Terminator => write!(f, "terminator"),
            BlockEnd::ResetTimer => write!(f, "reset timer"),
        }
    }
}

/// Offset of the first occurrence of `pattern` within the first
/// `max_distance` bytes of `haystack`
pub fn find_pattern(haystack: &[u8], pattern: &[u8], max_distance: usize) -> Option<usize> {
    if pattern.is_empty() {
        return Some(0);
    }
    let window = &haystack[..max_distance.min(haystack.len())];
    window.windows(pattern.len()).position(|candidate| candidate == pattern)
}
