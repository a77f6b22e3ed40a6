//! Resolved build decompositions.

use serde::{Deserialize, Serialize};

use super::PartRecord;

/// A build name resolved into its parts.
///
/// The grammar is the variant, so a build can never be both Standard and
/// Custom. `Unresolved` is the failure sentinel: the build still counts
/// toward generic win/loss totals but not toward part or combo statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "grammar", rename_all = "lowercase")]
pub enum Build {
    /// `Blade + Ratchet + Bit`
    Standard {
        blade: PartRecord,
        ratchet: PartRecord,
        bit: PartRecord,
    },
    /// `Lockchip + MainBlade + AssistBlade + Ratchet + Bit`
    Custom {
        lockchip: PartRecord,
        main_blade: PartRecord,
        assist_blade: PartRecord,
        ratchet: PartRecord,
        bit: PartRecord,
    },
    Unresolved,
}

impl Build {
    pub fn is_custom(&self) -> bool {
        matches!(self, Build::Custom { .. })
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Build::Unresolved)
    }

    /// The blade of a Standard build or the main blade of a Custom one.
    pub fn blade(&self) -> Option<&PartRecord> {
        match self {
            Build::Standard { blade, .. } => Some(blade),
            Build::Custom { main_blade, .. } => Some(main_blade),
            Build::Unresolved => None,
        }
    }

    pub fn ratchet(&self) -> Option<&PartRecord> {
        match self {
            Build::Standard { ratchet, .. } | Build::Custom { ratchet, .. } => Some(ratchet),
            Build::Unresolved => None,
        }
    }

    pub fn bit(&self) -> Option<&PartRecord> {
        match self {
            Build::Standard { bit, .. } | Build::Custom { bit, .. } => Some(bit),
            Build::Unresolved => None,
        }
    }

    pub fn lockchip(&self) -> Option<&PartRecord> {
        match self {
            Build::Custom { lockchip, .. } => Some(lockchip),
            _ => None,
        }
    }

    pub fn assist_blade(&self) -> Option<&PartRecord> {
        match self {
            Build::Custom { assist_blade, .. } => Some(assist_blade),
            _ => None,
        }
    }

    /// All parts in build-string order. Empty for `Unresolved`.
    pub fn parts(&self) -> Vec<&PartRecord> {
        match self {
            Build::Standard {
                blade,
                ratchet,
                bit,
            } => vec![blade, ratchet, bit],
            Build::Custom {
                lockchip,
                main_blade,
                assist_blade,
                ratchet,
                bit,
            } => vec![lockchip, main_blade, assist_blade, ratchet, bit],
            Build::Unresolved => Vec::new(),
        }
    }

    /// Canonical build string, e.g. `Dran Sword 3-60F`.
    pub fn display_name(&self) -> Option<String> {
        match self {
            Build::Standard {
                blade,
                ratchet,
                bit,
            } => Some(format!(
                "{} {}{}",
                blade.part.display_name(),
                ratchet.part.display_name(),
                bit.part.display_name()
            )),
            Build::Custom {
                lockchip,
                main_blade,
                assist_blade,
                ratchet,
                bit,
            } => Some(format!(
                "{}{} {}{}{}",
                lockchip.part.display_name(),
                main_blade.part.display_name(),
                assist_blade.part.display_name(),
                ratchet.part.display_name(),
                bit.part.display_name()
            )),
            Build::Unresolved => None,
        }
    }
}
