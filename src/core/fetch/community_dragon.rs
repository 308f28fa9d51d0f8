use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::RuneDescriptionSource;
use crate::core::error::{StaticDataError, StaticDataResult};
use crate::core::properties::RuneProperties;

const COMMUNITY_DRAGON_BASE: &str = "https://raw.communitydragon.org";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerk {
    id: i64,
    #[serde(default)]
    end_of_game_stat_descs: Vec<String>,
}

/// Community Dragon publishes per-minor-version folders (`13.1`).
fn minor_version(patch: &str) -> String {
    patch.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// `en_US` lives in `default`, everything else in a lowercase locale folder.
fn locale_folder(language: &str) -> String {
    if language.eq_ignore_ascii_case("en_US") {
        "default".to_string()
    } else {
        language.to_ascii_lowercase()
    }
}

fn apply_stat_descriptions(runes: &mut [RuneProperties], perks: Vec<RawPerk>) -> usize {
    let by_id: HashMap<String, Vec<String>> = perks
        .into_iter()
        .map(|perk| (perk.id.to_string(), perk.end_of_game_stat_descs))
        .collect();

    let mut updated = 0;
    for rune in runes.iter_mut() {
        if let Some(descs) = by_id.get(&rune.id) {
            rune.end_of_game_stat_descs = descs.clone();
            updated += 1;
        }
    }
    updated
}

/// Secondary source for end-of-game rune stat labels.
pub struct CommunityDragonClient {
    client: Client,
    base_url: String,
}

impl CommunityDragonClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: COMMUNITY_DRAGON_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn perks_url(&self, patch: &str, language: &str) -> String {
        format!(
            "{}/{}/plugins/rcp-be-lol-game-data/global/{}/v1/perks.json",
            self.base_url,
            minor_version(patch),
            locale_folder(language)
        )
    }
}

#[async_trait]
impl RuneDescriptionSource for CommunityDragonClient {
    async fn get_rune_stat_descriptions(
        &self,
        runes: &mut [RuneProperties],
        patch: &str,
        language: &str,
    ) -> StaticDataResult<()> {
        let url = self.perks_url(patch, language);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(StaticDataError::DownloadFailed {
                url,
                status: resp.status().as_u16(),
            });
        }

        let perks: Vec<RawPerk> = resp.json().await?;
        let updated = apply_stat_descriptions(runes, perks);
        if updated == 0 && !runes.is_empty() {
            warn!("No rune stat descriptions matched for {} ({})", patch, language);
        }

        info!("Applied stat descriptions to {} runes", updated);
        Ok(())
    }
}
