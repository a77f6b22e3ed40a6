//! Parse decision tracing.
//!
//! The parser reports what it tried and why it gave up through a
//! `ParseTrace` passed in by the caller. Tests record the events; the
//! engine forwards them to `tracing`.

use tracing::trace;

use super::Grammar;
use crate::models::{PartCategory, PartRecord};

/// One decision taken while parsing a build name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// Input was empty after trimming
    Empty,

    /// A grammar attempt started
    Attempt { grammar: Grammar },

    /// A part token was matched and removed
    Stripped {
        grammar: Grammar,
        category: PartCategory,
        name: String,
        remainder: String,
    },

    /// No part of `category` matched the remainder
    NoMatch {
        grammar: Grammar,
        category: PartCategory,
        remainder: String,
    },

    /// The input is also a valid Custom name but resolved as Standard
    AmbiguousGrammar { input: String },

    /// The blades split both ways; the trailing assist blade was kept
    AmbiguousAssist {
        remainder: String,
        kept: String,
        dropped: String,
    },

    Resolved { grammar: Grammar },

    /// Neither grammar matched
    Unresolved { input: String },
}

impl ParseEvent {
    pub(crate) fn stripped(grammar: Grammar, part: &PartRecord, remainder: &str) -> Self {
        ParseEvent::Stripped {
            grammar,
            category: part.category(),
            name: part.name().to_string(),
            remainder: remainder.to_string(),
        }
    }
}

/// Collector for parse decisions.
pub trait ParseTrace {
    fn record(&mut self, event: ParseEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl ParseTrace for NoTrace {
    fn record(&mut self, _event: ParseEvent) {}
}

/// Keeps every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrace {
    pub events: Vec<ParseEvent>,
}

impl RecordingTrace {
    /// Events that report an ambiguous name.
    pub fn ambiguous(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            ParseEvent::AmbiguousGrammar { input } => Some(input.as_str()),
            _ => None,
        })
    }
}

impl ParseTrace for RecordingTrace {
    fn record(&mut self, event: ParseEvent) {
        self.events.push(event);
    }
}

/// Forwards events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTrace;

impl ParseTrace for TracingTrace {
    fn record(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::AmbiguousGrammar { input } => {
                tracing::debug!(%input, "build name matches both grammars, using standard")
            }
            ParseEvent::AmbiguousAssist {
                remainder,
                kept,
                dropped,
            } => {
                tracing::debug!(
                    %remainder,
                    %kept,
                    %dropped,
                    "blades split both ways, using trailing assist"
                )
            }
            ParseEvent::Unresolved { input } => {
                tracing::debug!(%input, "build name matches no grammar")
            }
            other => trace!(event = ?other, "parse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_trace_keeps_order() {
        let mut trace = RecordingTrace::default();
        trace.record(ParseEvent::Attempt {
            grammar: Grammar::Standard,
        });
        trace.record(ParseEvent::AmbiguousGrammar {
            input: "X".to_string(),
        });

        assert_eq!(trace.events.len(), 2);
        assert_eq!(trace.ambiguous().collect::<Vec<_>>(), vec!["X"]);
    }

    #[test]
    fn test_stripped_event_from_part() {
        let event = ParseEvent::stripped(Grammar::Custom, &PartRecord::ratchet("1-60"), "Blast");
        assert_eq!(
            event,
            ParseEvent::Stripped {
                grammar: Grammar::Custom,
                category: PartCategory::Ratchet,
                name: "1-60".to_string(),
                remainder: "Blast".to_string(),
            }
        );
    }
}
