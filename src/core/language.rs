use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display languages the cache can fetch property sets for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Cs,
    De,
    El,
    Es,
    EsMx,
    Fr,
    Hu,
    It,
    Ja,
    Ko,
    Pl,
    Pt,
    Ro,
    Ru,
    Th,
    Tr,
    ZhHans,
    ZhHant,
}

impl Language {
    pub const ALL: [Language; 19] = [
        Language::En,
        Language::Cs,
        Language::De,
        Language::El,
        Language::Es,
        Language::EsMx,
        Language::Fr,
        Language::Hu,
        Language::It,
        Language::Ja,
        Language::Ko,
        Language::Pl,
        Language::Pt,
        Language::Ro,
        Language::Ru,
        Language::Th,
        Language::Tr,
        Language::ZhHans,
        Language::ZhHant,
    ];

    /// Locale code used by the remote sources and as the data file name.
    pub fn riot_region_code(self) -> &'static str {
        match self {
            Language::En => "en_US",
            Language::Cs => "cs_CZ",
            Language::De => "de_DE",
            Language::El => "el_GR",
            Language::Es => "es_ES",
            Language::EsMx => "es_MX",
            Language::Fr => "fr_FR",
            Language::Hu => "hu_HU",
            Language::It => "it_IT",
            Language::Ja => "ja_JP",
            Language::Ko => "ko_KR",
            Language::Pl => "pl_PL",
            Language::Pt => "pt_BR",
            Language::Ro => "ro_RO",
            Language::Ru => "ru_RU",
            Language::Th => "th_TH",
            Language::Tr => "tr_TR",
            Language::ZhHans => "zh_CN",
            Language::ZhHant => "zh_TW",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cs => "cs",
            Language::De => "de",
            Language::El => "el",
            Language::Es => "es",
            Language::EsMx => "es_mx",
            Language::Fr => "fr",
            Language::Hu => "hu",
            Language::It => "it",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Pl => "pl",
            Language::Pt => "pt",
            Language::Ro => "ro",
            Language::Ru => "ru",
            Language::Th => "th",
            Language::Tr => "tr",
            Language::ZhHans => "zh_hans",
            Language::ZhHant => "zh_hant",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.riot_region_code())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts either the short name (`de`) or the region code (`de_DE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| {
                lang.short_name().eq_ignore_ascii_case(needle)
                    || lang.riot_region_code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| format!("Unknown language: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::Language;

    #[test]
    fn parses_short_names_and_region_codes() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::De);
        assert_eq!("ko_KR".parse::<Language>().unwrap(), Language::Ko);
        assert_eq!("zh_tw".parse::<Language>().unwrap(), Language::ZhHant);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn default_language_is_english() {
        assert_eq!(Language::default().riot_region_code(), "en_US");
    }
}
