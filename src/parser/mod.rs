//! Build-name parser.
//!
//! Resolves a free-form build name into its parts under one of two
//! grammars, tried in a fixed order:
//!
//! - **Standard**: `Blade + Ratchet + Bit`, e.g. `Dran Sword 3-60F`
//! - **Custom**: `Lockchip + MainBlade + AssistBlade + Ratchet + Bit`,
//!   e.g. `PegasusBlast Wheel1-60B`
//!
//! The first grammar that fully matches wins. Names matching neither
//! resolve to [`Build::Unresolved`]; parsing never fails with an error.
//!
//! Parse decisions are reported to a [`ParseTrace`] supplied by the caller.

mod trace;

pub use trace::{NoTrace, ParseEvent, ParseTrace, RecordingTrace, TracingTrace};

use serde::{Deserialize, Serialize};

use crate::dictionary::PartDictionary;
use crate::models::{BladeLine, Build, PartCategory, PartRecord};

/// The two build-name grammars, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    Standard,
    Custom,
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grammar::Standard => write!(f, "standard"),
            Grammar::Custom => write!(f, "custom"),
        }
    }
}

/// Parser over a borrowed part dictionary.
#[derive(Debug, Clone, Copy)]
pub struct NameParser<'d> {
    dictionary: &'d PartDictionary,
}

impl<'d> NameParser<'d> {
    pub fn new(dictionary: &'d PartDictionary) -> Self {
        Self { dictionary }
    }

    /// Parse without collecting trace events.
    pub fn parse_quiet(&self, input: &str) -> Build {
        self.parse(input, &mut NoTrace)
    }

    /// Parse a build name, reporting each decision to `trace`.
    pub fn parse(&self, input: &str, trace: &mut dyn ParseTrace) -> Build {
        let input = input.trim();
        if input.is_empty() {
            trace.record(ParseEvent::Empty);
            return Build::Unresolved;
        }

        if let Some(build) = self.parse_standard(input, trace) {
            // Standard wins; a Custom reading is only reported.
            if self.parse_custom(input, &mut NoTrace).is_some() {
                trace.record(ParseEvent::AmbiguousGrammar {
                    input: input.to_string(),
                });
            }
            trace.record(ParseEvent::Resolved {
                grammar: Grammar::Standard,
            });
            return build;
        }

        if let Some(build) = self.parse_custom(input, trace) {
            trace.record(ParseEvent::Resolved {
                grammar: Grammar::Custom,
            });
            return build;
        }

        trace.record(ParseEvent::Unresolved {
            input: input.to_string(),
        });
        Build::Unresolved
    }

    fn parse_standard(&self, input: &str, trace: &mut dyn ParseTrace) -> Option<Build> {
        let grammar = Grammar::Standard;
        trace.record(ParseEvent::Attempt { grammar });

        let (bit, rest) = self.strip_bit(grammar, input, trace)?;
        let (ratchet, rest) = self.strip_suffix(grammar, PartCategory::Ratchet, rest, trace)?;
        let blade = self.match_blade(grammar, rest, BladeLine::is_standard, trace)?;

        Some(Build::Standard {
            blade: blade.clone(),
            ratchet: ratchet.clone(),
            bit: bit.clone(),
        })
    }

    fn parse_custom(&self, input: &str, trace: &mut dyn ParseTrace) -> Option<Build> {
        let grammar = Grammar::Custom;
        trace.record(ParseEvent::Attempt { grammar });

        let (lockchip, rest) = self.strip_prefix(grammar, PartCategory::Lockchip, input, trace)?;
        let (bit, rest) = self.strip_bit(grammar, rest, trace)?;
        let (ratchet, rest) = self.strip_suffix(grammar, PartCategory::Ratchet, rest, trace)?;
        let (assist_blade, main_blade) = self.split_blades(rest, trace)?;

        Some(Build::Custom {
            lockchip: lockchip.clone(),
            main_blade: main_blade.clone(),
            assist_blade: assist_blade.clone(),
            ratchet: ratchet.clone(),
            bit: bit.clone(),
        })
    }

    /// Strip a trailing bit: shortcuts first, then full names.
    fn strip_bit<'s>(
        &self,
        grammar: Grammar,
        input: &'s str,
        trace: &mut dyn ParseTrace,
    ) -> Option<(&'d PartRecord, &'s str)> {
        let shortcut_hit = self
            .dictionary
            .shortcut_candidates(PartCategory::Bit)
            .iter()
            .find_map(|part| {
                let shortcut = part.shortcut()?;
                input.strip_suffix(shortcut).map(|rest| (part, rest))
            });

        if let Some((part, rest)) = shortcut_hit {
            trace.record(ParseEvent::stripped(grammar, part, rest));
            return Some((part, rest));
        }

        self.strip_suffix(grammar, PartCategory::Bit, input, trace)
    }

    fn strip_suffix<'s>(
        &self,
        grammar: Grammar,
        category: PartCategory,
        input: &'s str,
        trace: &mut dyn ParseTrace,
    ) -> Option<(&'d PartRecord, &'s str)> {
        let hit = self
            .dictionary
            .candidates(category)
            .iter()
            .find_map(|part| input.strip_suffix(part.name()).map(|rest| (part, rest)));
        self.report(grammar, category, input, hit, trace)
    }

    fn strip_prefix<'s>(
        &self,
        grammar: Grammar,
        category: PartCategory,
        input: &'s str,
        trace: &mut dyn ParseTrace,
    ) -> Option<(&'d PartRecord, &'s str)> {
        let hit = self
            .dictionary
            .candidates(category)
            .iter()
            .find_map(|part| input.strip_prefix(part.name()).map(|rest| (part, rest)));
        self.report(grammar, category, input, hit, trace)
    }

    fn report<'s>(
        &self,
        grammar: Grammar,
        category: PartCategory,
        input: &'s str,
        hit: Option<(&'d PartRecord, &'s str)>,
        trace: &mut dyn ParseTrace,
    ) -> Option<(&'d PartRecord, &'s str)> {
        match hit {
            Some((part, rest)) => trace.record(ParseEvent::stripped(grammar, part, rest)),
            None => trace.record(ParseEvent::NoMatch {
                grammar,
                category,
                remainder: input.to_string(),
            }),
        }
        hit
    }

    /// The remainder must be exactly one blade of an allowed line.
    fn match_blade(
        &self,
        grammar: Grammar,
        input: &str,
        allowed: fn(&BladeLine) -> bool,
        trace: &mut dyn ParseTrace,
    ) -> Option<&'d PartRecord> {
        let name = input.trim();
        let hit = self
            .dictionary
            .get(PartCategory::Blade, name)
            .filter(|part| part.part.line().is_some_and(|l| allowed(&l)));
        match hit {
            Some(part) => trace.record(ParseEvent::stripped(grammar, part, "")),
            None => trace.record(ParseEvent::NoMatch {
                grammar,
                category: PartCategory::Blade,
                remainder: name.to_string(),
            }),
        }
        hit
    }

    /// Split `MainBlade AssistBlade` into its two blades.
    ///
    /// The assist blade is written against the ratchet, so it is looked for
    /// at the end of the remainder first. A remainder written assist-first
    /// is accepted when that fails. A remainder that splits both ways keeps
    /// the trailing reading and records `AmbiguousAssist`.
    fn split_blades(
        &self,
        input: &str,
        trace: &mut dyn ParseTrace,
    ) -> Option<(&'d PartRecord, &'d PartRecord)> {
        let grammar = Grammar::Custom;
        let rest = input.trim();
        let assists = self.dictionary.candidates(PartCategory::AssistBlade);

        let trailing = assists.iter().find_map(|assist| {
            let main = rest.strip_suffix(assist.name())?;
            Some((assist, self.custom_blade(main)?))
        });
        let leading = || {
            assists.iter().find_map(|assist| {
                let main = rest.strip_prefix(assist.name())?;
                Some((assist, self.custom_blade(main)?))
            })
        };

        if let (Some((kept, _)), Some((dropped, _))) = (trailing, leading()) {
            if kept != dropped {
                trace.record(ParseEvent::AmbiguousAssist {
                    remainder: rest.to_string(),
                    kept: kept.name().to_string(),
                    dropped: dropped.name().to_string(),
                });
            }
        }

        match trailing.or_else(leading) {
            Some((assist, main)) => {
                trace.record(ParseEvent::stripped(grammar, assist, main.name()));
                trace.record(ParseEvent::stripped(grammar, main, ""));
                Some((assist, main))
            }
            None => {
                trace.record(ParseEvent::NoMatch {
                    grammar,
                    category: PartCategory::AssistBlade,
                    remainder: rest.to_string(),
                });
                None
            }
        }
    }

    fn custom_blade(&self, name: &str) -> Option<&'d PartRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.dictionary
            .get(PartCategory::Blade, name)
            .filter(|part| part.part.line() == Some(BladeLine::Custom))
    }
}
