use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of data types a download call should cover. Combine freely.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StaticDataType: u8 {
        const ITEM = 1 << 0;
        const CHAMPION = 1 << 1;
        const RUNE = 1 << 2;

        const ALL = Self::ITEM.bits() | Self::CHAMPION.bits() | Self::RUNE.bits();
    }
}

/// A single data type, strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataDefinition {
    Item,
    Champion,
    Rune,
}

impl DataDefinition {
    /// Processing order for multi-type calls.
    pub const ALL: [DataDefinition; 3] = [
        DataDefinition::Item,
        DataDefinition::Champion,
        DataDefinition::Rune,
    ];

    /// Subdirectory name below a patch directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            DataDefinition::Item => "item",
            DataDefinition::Champion => "champion",
            DataDefinition::Rune => "rune",
        }
    }

    pub fn flag(self) -> StaticDataType {
        match self {
            DataDefinition::Item => StaticDataType::ITEM,
            DataDefinition::Champion => StaticDataType::CHAMPION,
            DataDefinition::Rune => StaticDataType::RUNE,
        }
    }

    /// Definitions selected by `types`, in processing order.
    pub fn selected(types: StaticDataType) -> impl Iterator<Item = DataDefinition> {
        Self::ALL
            .into_iter()
            .filter(move |def| types.contains(def.flag()))
    }
}

impl std::fmt::Display for DataDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_keeps_processing_order() {
        let picked: Vec<_> =
            DataDefinition::selected(StaticDataType::RUNE | StaticDataType::ITEM).collect();
        assert_eq!(picked, vec![DataDefinition::Item, DataDefinition::Rune]);
    }

    #[test]
    fn all_covers_every_definition() {
        assert_eq!(DataDefinition::selected(StaticDataType::ALL).count(), 3);
        assert_eq!(DataDefinition::selected(StaticDataType::empty()).count(), 0);
    }
}
