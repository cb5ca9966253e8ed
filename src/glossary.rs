use std::{collections::HashMap, fs, path::Path};

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Error, Result};

const BUILTIN_GLOSSARY: &str = include_str!("../special_words/glossary.toml");

/// Curated translations for names the translation service gets wrong.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Glossary {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub terms: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}

impl Glossary {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_GLOSSARY).expect("bundled glossary.toml is valid")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let glossary = Self::from_toml(&source)?;
        info!(
            "Loaded glossary v{} with {} terms from {:?}",
            glossary.version,
            glossary.terms.len(),
            path
        );
        Ok(glossary)
    }

    /// Uses the file when it exists, the bundled copy otherwise.
    pub fn load_or_builtin(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("No glossary at {:?}, using the bundled one", path);
            Ok(Self::builtin())
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.terms.get(token).map(String::as_str)
    }

    /// Overwrites translations of tokens the glossary knows. Exact match only.
    pub fn apply(&self, translations: &mut HashMap<String, String>) {
        for (token, translation) in translations.iter_mut() {
            if let Some(curated) = self.terms.get(token) {
                debug!("  glossary: {token} -> {curated} (was '{translation}')");
                translation.clone_from(curated);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn translations() -> HashMap<String, String> {
        [
            ("圣杯", "chalice"),
            ("万事屋", ""),
            ("猫咪", "kitty"),
            ("黑子", "blackhead"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn builtin_has_curated_names() {
        let glossary = Glossary::builtin();

        assert_eq!(glossary.version, 1);
        assert_eq!(glossary.get("圣杯"), Some("Holy Grail"));
        assert_eq!(glossary.get("攘夷战争"), Some("Jyoui War"));
        assert_eq!(glossary.len(), 13);
    }

    #[test]
    fn overrides_only_known_keys() {
        let mut map = translations();

        Glossary::builtin().apply(&mut map);

        assert_eq!(map["圣杯"], "Holy Grail");
        assert_eq!(map["万事屋"], "Yorozuya");
        assert_eq!(map["黑子"], "Kuroko");
        assert_eq!(map["猫咪"], "kitty");
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn apply_is_idempotent() {
        let glossary = Glossary::builtin();
        let mut once = translations();
        glossary.apply(&mut once);
        let mut twice = once.clone();
        glossary.apply(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn match_is_exact() {
        let glossary = Glossary::from_toml("[terms]\n\"Saber\" = \"Arturia\"\n").unwrap();
        let mut map: HashMap<String, String> = [("saber".to_string(), String::new())].into();

        glossary.apply(&mut map);

        assert_eq!(map["saber"], "");
    }

    #[test]
    fn load_or_builtin_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("glossary.toml");
        assert_eq!(Glossary::load_or_builtin(&missing).unwrap(), Glossary::builtin());

        std::fs::write(&missing, "version = 2\n[terms]\n\"初春\" = \"Uiharu\"\n").unwrap();
        let loaded = Glossary::load_or_builtin(&missing).unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.get("初春"), Some("Uiharu"));
    }

    #[test]
    fn malformed_glossary_is_an_error() {
        assert!(matches!(
            Glossary::from_toml("[terms]\n圣杯 = "),
            Err(Error::Toml(_))
        ));
    }
}
