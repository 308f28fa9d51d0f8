use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::data_type::DataDefinition;

/// A record inside a property set, addressable by id.
pub trait StaticProperties: Serialize + DeserializeOwned + Send + Sync {
    const DEFINITION: DataDefinition;

    fn id(&self) -> &str;
}

/// Location of an entity's icon inside a sprite atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    /// Standalone image file name (e.g. `1001.png`).
    pub full: String,
    /// Atlas file name (e.g. `item0.png`).
    pub sprite: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plaintext: String,
    pub gold_base: u32,
    pub gold_total: u32,
    pub gold_sell: u32,
    pub purchasable: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: ImageReference,
}

impl StaticProperties for ItemProperties {
    const DEFINITION: DataDefinition = DataDefinition::Item;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ChampionRole {
    Assassin,
    Fighter,
    Mage,
    Marksman,
    Support,
    Tank,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChampionProperties {
    /// Name-like identifier (e.g. `MonkeyKing`).
    pub id: String,
    /// Numeric key as text (e.g. `62`).
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub roles: Vec<ChampionRole>,
    pub image: ImageReference,
}

impl StaticProperties for ChampionProperties {
    const DEFINITION: DataDefinition = DataDefinition::Champion;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Where a rune sits in its tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RuneSlot {
    /// The tree (style) itself.
    Path,
    Keystone,
    Minor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuneProperties {
    /// Numeric perk id as text (e.g. `8005`).
    pub id: String,
    /// Atlas key, also the key of the rune image file.
    pub key: String,
    pub name: String,
    pub slot: RuneSlot,
    /// Key of the owning tree; equals `key` for trees.
    pub tree: String,
    /// Icon path relative to the remote image root.
    pub icon_path: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub long_desc: String,
    /// End-of-game stat labels, filled from the secondary source.
    #[serde(default)]
    pub end_of_game_stat_descs: Vec<String>,
}

impl StaticProperties for RuneProperties {
    const DEFINITION: DataDefinition = DataDefinition::Rune;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A downloaded property set for one data type and language.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySet {
    Items(Vec<ItemProperties>),
    Champions(Vec<ChampionProperties>),
    Runes(Vec<RuneProperties>),
}

impl PropertySet {
    pub fn definition(&self) -> DataDefinition {
        match self {
            PropertySet::Items(_) => DataDefinition::Item,
            PropertySet::Champions(_) => DataDefinition::Champion,
            PropertySet::Runes(_) => DataDefinition::Rune,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PropertySet::Items(v) => v.len(),
            PropertySet::Champions(v) => v.len(),
            PropertySet::Runes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sprite atlases referenced by the set, deduplicated and sorted.
    pub fn sprite_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self {
            PropertySet::Items(v) => v.iter().map(|p| p.image.sprite.clone()).collect(),
            PropertySet::Champions(v) => v.iter().map(|p| p.image.sprite.clone()).collect(),
            PropertySet::Runes(_) => Vec::new(),
        };
        names.retain(|n| !n.is_empty());
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn champion(sprite: &str) -> ChampionProperties {
        ChampionProperties {
            id: "Ahri".into(),
            key: "103".into(),
            name: "Ahri".into(),
            title: "the Nine-Tailed Fox".into(),
            roles: vec![ChampionRole::Mage, ChampionRole::Assassin],
            image: ImageReference {
                full: "Ahri.png".into(),
                sprite: sprite.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn enums_serialize_in_camel_case() {
        let json = serde_json::to_string(&champion("champion0.png")).unwrap();
        assert!(json.contains(r#""roles":["mage","assassin"]"#));
        assert_eq!(
            serde_json::to_string(&RuneSlot::Keystone).unwrap(),
            r#""keystone""#
        );
    }

    #[test]
    fn sprite_names_are_unique() {
        let set = PropertySet::Champions(vec![
            champion("champion1.png"),
            champion("champion0.png"),
            champion("champion1.png"),
        ]);
        assert_eq!(set.sprite_names(), vec!["champion0.png", "champion1.png"]);
        assert_eq!(set.definition(), DataDefinition::Champion);
    }
}
