use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use super::StaticDataSource;
use crate::core::bundle::{RuneImageFile, SpriteFile};
use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::properties::{
    ChampionProperties, ChampionRole, DataDefinition, ImageReference, ItemProperties,
    PropertySet, RuneProperties, RuneSlot,
};

const DATA_DRAGON_BASE: &str = "https://ddragon.leagueoflegends.com";

/// Sprite names are the same in every language; this one always exists.
const SPRITE_LOOKUP_LANGUAGE: &str = "en_US";

// ── Raw Data Dragon payloads ────────────────────────────

#[derive(Debug, Deserialize)]
struct RawDataFile<T> {
    data: BTreeMap<String, T>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    full: String,
    sprite: String,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl From<RawImage> for ImageReference {
    fn from(raw: RawImage) -> Self {
        Self {
            full: raw.full,
            sprite: raw.sprite,
            x: raw.x,
            y: raw.y,
            w: raw.w,
            h: raw.h,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawGold {
    base: u32,
    total: u32,
    sell: u32,
    purchasable: bool,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    plaintext: String,
    gold: RawGold,
    #[serde(default)]
    tags: Vec<String>,
    image: RawImage,
}

#[derive(Debug, Deserialize)]
struct RawChampion {
    id: String,
    key: String,
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    tags: Vec<String>,
    image: RawImage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRune {
    id: i64,
    key: String,
    icon: String,
    name: String,
    #[serde(default)]
    short_desc: String,
    #[serde(default)]
    long_desc: String,
}

#[derive(Debug, Deserialize)]
struct RawRuneSlot {
    runes: Vec<RawRune>,
}

#[derive(Debug, Deserialize)]
struct RawRuneTree {
    id: i64,
    key: String,
    icon: String,
    name: String,
    slots: Vec<RawRuneSlot>,
}

fn items_from_raw(raw: RawDataFile<RawItem>) -> Vec<ItemProperties> {
    raw.data
        .into_iter()
        .map(|(id, item)| ItemProperties {
            id,
            name: item.name,
            description: item.description,
            plaintext: item.plaintext,
            gold_base: item.gold.base,
            gold_total: item.gold.total,
            gold_sell: item.gold.sell,
            purchasable: item.gold.purchasable,
            tags: item.tags,
            image: item.image.into(),
        })
        .collect()
}

fn parse_role(tag: &str) -> Option<ChampionRole> {
    match tag {
        "Assassin" => Some(ChampionRole::Assassin),
        "Fighter" => Some(ChampionRole::Fighter),
        "Mage" => Some(ChampionRole::Mage),
        "Marksman" => Some(ChampionRole::Marksman),
        "Support" => Some(ChampionRole::Support),
        "Tank" => Some(ChampionRole::Tank),
        _ => None,
    }
}

fn champions_from_raw(raw: RawDataFile<RawChampion>) -> Vec<ChampionProperties> {
    raw.data
        .into_values()
        .map(|champion| ChampionProperties {
            roles: champion.tags.iter().filter_map(|t| parse_role(t)).collect(),
            id: champion.id,
            key: champion.key,
            name: champion.name,
            title: champion.title,
            image: champion.image.into(),
        })
        .collect()
}

/// Flatten trees into one list: each tree, then its runes slot by slot.
/// The first slot of a tree holds the keystones.
fn runes_from_raw(trees: Vec<RawRuneTree>) -> Vec<RuneProperties> {
    let mut runes = Vec::new();
    for tree in trees {
        runes.push(RuneProperties {
            id: tree.id.to_string(),
            key: tree.key.clone(),
            name: tree.name,
            slot: RuneSlot::Path,
            tree: tree.key.clone(),
            icon_path: tree.icon,
            short_desc: String::new(),
            long_desc: String::new(),
            end_of_game_stat_descs: Vec::new(),
        });

        for (slot_index, slot) in tree.slots.into_iter().enumerate() {
            let kind = if slot_index == 0 {
                RuneSlot::Keystone
            } else {
                RuneSlot::Minor
            };
            for rune in slot.runes {
                runes.push(RuneProperties {
                    id: rune.id.to_string(),
                    key: rune.key,
                    name: rune.name,
                    slot: kind,
                    tree: tree.key.clone(),
                    icon_path: rune.icon,
                    short_desc: rune.short_desc,
                    long_desc: rune.long_desc,
                    end_of_game_stat_descs: Vec::new(),
                });
            }
        }
    }
    runes
}

fn rune_image_relative_path(patch: &str, rune: &RuneProperties) -> String {
    let extension = Path::new(&rune.icon_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    format!(
        "{}/{}/img/{}.{}",
        patch,
        DataDefinition::Rune.dir_name(),
        rune.key,
        extension
    )
}

/// Client for the public Data Dragon CDN.
pub struct DataDragonClient {
    client: Client,
    downloader: Downloader,
    base_url: String,
}

impl DataDragonClient {
    pub fn new(client: Client, downloader: Downloader) -> Self {
        Self {
            client,
            downloader,
            base_url: DATA_DRAGON_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> StaticDataResult<T> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(StaticDataError::DownloadFailed {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    fn data_url(&self, patch: &str, language: &str, file: &str) -> String {
        format!("{}/cdn/{}/data/{}/{}", self.base_url, patch, language, file)
    }
}

#[async_trait]
impl StaticDataSource for DataDragonClient {
    async fn get_patch_list(&self) -> StaticDataResult<Vec<String>> {
        info!("Fetching patch list...");
        let url = format!("{}/api/versions.json", self.base_url);
        let versions: Vec<String> = self.get_json(&url).await?;
        info!("Loaded {} patches", versions.len());
        Ok(versions)
    }

    async fn get_property_set(
        &self,
        patch: &str,
        definition: DataDefinition,
        language: &str,
    ) -> StaticDataResult<PropertySet> {
        info!("Fetching {} data for {} ({})", definition, patch, language);
        let set = match definition {
            DataDefinition::Item => {
                let raw = self.get_json(&self.data_url(patch, language, "item.json")).await?;
                PropertySet::Items(items_from_raw(raw))
            }
            DataDefinition::Champion => {
                let raw = self
                    .get_json(&self.data_url(patch, language, "champion.json"))
                    .await?;
                PropertySet::Champions(champions_from_raw(raw))
            }
            DataDefinition::Rune => {
                let raw = self
                    .get_json(&self.data_url(patch, language, "runesReforged.json"))
                    .await?;
                PropertySet::Runes(runes_from_raw(raw))
            }
        };
        Ok(set)
    }

    async fn get_sprite_images(
        &self,
        data_path: &Path,
        patch: &str,
        definition: DataDefinition,
    ) -> StaticDataResult<Vec<SpriteFile>> {
        if definition == DataDefinition::Rune {
            return Err(StaticDataError::Other(
                "Rune images are not sprite atlases".into(),
            ));
        }

        let set = self
            .get_property_set(patch, definition, SPRITE_LOOKUP_LANGUAGE)
            .await?;

        let sprites: Vec<SpriteFile> = set
            .sprite_names()
            .into_iter()
            .map(|name| SpriteFile {
                relative_path: format!("{}/{}/sprite/{}", patch, definition.dir_name(), name),
                name,
            })
            .collect();

        let entries = sprites
            .iter()
            .map(|sprite| DownloadEntry {
                url: format!("{}/cdn/{}/img/sprite/{}", self.base_url, patch, sprite.name),
                dest: data_path.join(&sprite.relative_path),
            })
            .collect();
        self.downloader.download_all(entries).await?;

        info!("Downloaded {} {} sprites for {}", sprites.len(), definition, patch);
        Ok(sprites)
    }

    async fn get_rune_images(
        &self,
        data_path: &Path,
        patch: &str,
        runes: &[RuneProperties],
    ) -> StaticDataResult<Vec<RuneImageFile>> {
        let files: Vec<RuneImageFile> = runes
            .iter()
            .map(|rune| RuneImageFile {
                key: rune.key.clone(),
                relative_path: rune_image_relative_path(patch, rune),
            })
            .collect();

        let entries = runes
            .iter()
            .zip(&files)
            .map(|(rune, file)| DownloadEntry {
                url: format!("{}/cdn/img/{}", self.base_url, rune.icon_path),
                dest: data_path.join(&file.relative_path),
            })
            .collect();
        self.downloader.download_all(entries).await?;

        info!("Downloaded {} rune images for {}", files.len(), patch);
        Ok(files)
    }
}
