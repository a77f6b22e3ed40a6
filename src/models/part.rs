//! Part reference data.
//!
//! Parts are immutable records loaded once per session from the external
//! store. Each category carries its own field schema, so a `Part` is a
//! tagged variant rather than a bag of optional fields.

use serde::{Deserialize, Serialize};

/// The five part categories a build can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartCategory {
    Blade,
    Ratchet,
    Bit,
    Lockchip,
    AssistBlade,
}

impl PartCategory {
    pub const ALL: [PartCategory; 5] = [
        PartCategory::Blade,
        PartCategory::Ratchet,
        PartCategory::Bit,
        PartCategory::Lockchip,
        PartCategory::AssistBlade,
    ];

    /// Stable lowercase key, used for store file names.
    pub fn key(&self) -> &'static str {
        match self {
            PartCategory::Blade => "blade",
            PartCategory::Ratchet => "ratchet",
            PartCategory::Bit => "bit",
            PartCategory::Lockchip => "lockchip",
            PartCategory::AssistBlade => "assist_blade",
        }
    }
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartCategory::Blade => write!(f, "Blade"),
            PartCategory::Ratchet => write!(f, "Ratchet"),
            PartCategory::Bit => write!(f, "Bit"),
            PartCategory::Lockchip => write!(f, "Lockchip"),
            PartCategory::AssistBlade => write!(f, "Assist Blade"),
        }
    }
}

/// Product line of a blade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BladeLine {
    Basic,
    Unique,
    #[serde(rename = "X-Over")]
    XOver,
    Custom,
}

impl BladeLine {
    /// Lines whose blades are used whole in the three-part grammar.
    pub fn is_standard(&self) -> bool {
        matches!(self, BladeLine::Basic | BladeLine::Unique | BladeLine::XOver)
    }
}

impl std::fmt::Display for BladeLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BladeLine::Basic => write!(f, "Basic"),
            BladeLine::Unique => write!(f, "Unique"),
            BladeLine::XOver => write!(f, "X-Over"),
            BladeLine::Custom => write!(f, "Custom"),
        }
    }
}

/// Numeric stat block printed on the part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(default)]
    pub attack: u32,
    #[serde(default)]
    pub defense: u32,
    #[serde(default)]
    pub stamina: u32,
    #[serde(default)]
    pub dash: u32,
    #[serde(default)]
    pub burst_resistance: u32,
}

/// A part, tagged by category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum Part {
    Blade {
        name: String,
        line: BladeLine,
    },
    Ratchet {
        name: String,
    },
    Bit {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shortcut: Option<String>,
    },
    Lockchip {
        name: String,
    },
    AssistBlade {
        name: String,
    },
}

impl Part {
    pub fn category(&self) -> PartCategory {
        match self {
            Part::Blade { .. } => PartCategory::Blade,
            Part::Ratchet { .. } => PartCategory::Ratchet,
            Part::Bit { .. } => PartCategory::Bit,
            Part::Lockchip { .. } => PartCategory::Lockchip,
            Part::AssistBlade { .. } => PartCategory::AssistBlade,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        match self {
            Part::Blade { name, .. }
            | Part::Ratchet { name }
            | Part::Bit { name, .. }
            | Part::Lockchip { name }
            | Part::AssistBlade { name } => name,
        }
    }

    pub fn shortcut(&self) -> Option<&str> {
        match self {
            Part::Bit { shortcut, .. } => shortcut.as_deref(),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<BladeLine> {
        match self {
            Part::Blade { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Name as it appears inside a build string.
    ///
    /// Bits are written with their shortcut (`3-60F`), every other
    /// category with its full name.
    pub fn display_name(&self) -> &str {
        match self {
            Part::Bit { name, shortcut } => shortcut.as_deref().unwrap_or(name),
            Part::Blade { name, .. }
            | Part::Ratchet { name }
            | Part::Lockchip { name }
            | Part::AssistBlade { name } => name,
        }
    }
}

/// A part together with its stat block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartRecord {
    #[serde(flatten)]
    pub part: Part,

    #[serde(default)]
    pub stats: StatBlock,
}

impl PartRecord {
    pub fn new(part: Part) -> Self {
        Self {
            part,
            stats: StatBlock::default(),
        }
    }

    pub fn blade(name: impl Into<String>, line: BladeLine) -> Self {
        Self::new(Part::Blade {
            name: name.into(),
            line,
        })
    }

    pub fn ratchet(name: impl Into<String>) -> Self {
        Self::new(Part::Ratchet { name: name.into() })
    }

    pub fn bit(name: impl Into<String>, shortcut: Option<&str>) -> Self {
        Self::new(Part::Bit {
            name: name.into(),
            shortcut: shortcut.map(str::to_string),
        })
    }

    pub fn lockchip(name: impl Into<String>) -> Self {
        Self::new(Part::Lockchip { name: name.into() })
    }

    pub fn assist_blade(name: impl Into<String>) -> Self {
        Self::new(Part::AssistBlade { name: name.into() })
    }

    /// Builder method to set the stat block.
    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    pub fn category(&self) -> PartCategory {
        self.part.category()
    }

    pub fn name(&self) -> &str {
        self.part.name()
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.part.shortcut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_name_per_category() {
        assert_eq!(PartRecord::bit("Flat", Some("F")).part.display_name(), "F");
        assert_eq!(PartRecord::bit("Gear Point", None).part.display_name(), "Gear Point");
        assert_eq!(PartRecord::ratchet("3-60").part.display_name(), "3-60");
        assert_eq!(
            PartRecord::blade("Dran Sword", BladeLine::Basic).part.display_name(),
            "Dran Sword"
        );
        assert_eq!(PartRecord::lockchip("Valkyrie").part.display_name(), "Valkyrie");
    }

    #[test]
    fn test_blade_line_standard() {
        assert!(BladeLine::Basic.is_standard());
        assert!(BladeLine::Unique.is_standard());
        assert!(BladeLine::XOver.is_standard());
        assert!(!BladeLine::Custom.is_standard());
    }

    #[test]
    fn test_part_record_from_json() {
        let json = r#"{"category":"Blade","name":"Wizard Rod","line":"X-Over","stats":{"attack":15,"stamina":60}}"#;
        let record: PartRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.category(), PartCategory::Blade);
        assert_eq!(record.name(), "Wizard Rod");
        assert_eq!(record.part.line(), Some(BladeLine::XOver));
        assert_eq!(record.stats.attack, 15);
        assert_eq!(record.stats.defense, 0);
        assert_eq!(record.stats.stamina, 60);
    }

    #[test]
    fn test_bit_without_stats_from_json() {
        let json = r#"{"category":"Bit","name":"Low Flat","shortcut":"LF"}"#;
        let record: PartRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record, PartRecord::bit("Low Flat", Some("LF")));
        assert_eq!(record.shortcut(), Some("LF"));
    }

    #[test]
    fn test_category_display_and_key() {
        assert_eq!(PartCategory::AssistBlade.to_string(), "Assist Blade");
        assert_eq!(PartCategory::AssistBlade.key(), "assist_blade");
        assert_eq!(PartCategory::ALL.len(), 5);
    }
}
