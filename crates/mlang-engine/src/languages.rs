//! Ordered language list and the toolbar menu built from it.
//!
//! Menu order is whatever order the languages were supplied in, so the list is
//! a `Vec` rather than a map and parsing keeps document order.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Language attribute used when nothing else is configured.
pub const DEFAULT_LANGUAGES_JSON: &str = r#"{"en":"English (en)"}"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub label: String,
}

impl Language {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Languages in caller order, one entry per code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageList(Vec<Language>);

impl LanguageList {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse the `{"code":"label",...}` attribute form, keeping key order.
    ///
    /// Anything other than a JSON object of strings is rejected.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let list = (&mut deserializer)
            .deserialize_map(ListVisitor { accept_seq: false })
            .and_then(|list| deserializer.end().map(|()| list))
            .map_err(|source| EngineError::MalformedLanguages { source })?;
        Ok(list)
    }

    /// Add a language. A code that is already present keeps its position and
    /// takes the new label, the way a repeated object key would.
    pub fn insert(&mut self, code: impl Into<String>, label: impl Into<String>) {
        let code = code.into();
        let label = label.into();
        match self.0.iter_mut().find(|lang| lang.code == code) {
            Some(existing) => existing.label = label,
            None => self.0.push(Language { code, label }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Language> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|lang| lang.code == code)
    }

    pub fn label(&self, code: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|lang| lang.code == code)
            .map(|lang| lang.label.as_str())
    }
}

impl Default for LanguageList {
    fn default() -> Self {
        Self(vec![Language::new("en", "English (en)")])
    }
}

impl<C: Into<String>, L: Into<String>> FromIterator<(C, L)> for LanguageList {
    fn from_iter<I: IntoIterator<Item = (C, L)>>(iter: I) -> Self {
        let mut list = Self::empty();
        for (code, label) in iter {
            list.insert(code, label);
        }
        list
    }
}

impl<'a> IntoIterator for &'a LanguageList {
    type Item = &'a Language;
    type IntoIter = std::slice::Iter<'a, Language>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Accepts a map of code to label, and (from config files) a list of
/// `{code, label}` entries.
impl<'de> Deserialize<'de> for LanguageList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ListVisitor { accept_seq: true })
    }
}

struct ListVisitor {
    accept_seq: bool,
}

impl<'de> Visitor<'de> for ListVisitor {
    type Value = LanguageList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.accept_seq {
            f.write_str("a map of language code to label, or a list of languages")
        } else {
            f.write_str("a map of language code to label")
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut list = LanguageList::empty();
        while let Some((code, label)) = map.next_entry::<String, String>()? {
            list.insert(code, label);
        }
        Ok(list)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        if !self.accept_seq {
            return Err(de::Error::invalid_type(Unexpected::Seq, &self));
        }

        let mut list = LanguageList::empty();
        while let Some(lang) = seq.next_element::<Language>()? {
            list.insert(lang.code, lang.label);
        }
        Ok(list)
    }
}

/// One toolbar menu item: the label shown and the code passed back on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub label: String,
    pub code: String,
}

/// Build toolbar entries in language-list order.
pub fn menu_entries(languages: &LanguageList) -> Vec<MenuEntry> {
    languages
        .iter()
        .map(|lang| MenuEntry {
            label: lang.label.clone(),
            code: lang.code.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn menu_preserves_mapping_order() {
        let languages = LanguageList::from_json(r#"{"en":"English","es":"Español"}"#).unwrap();

        let menu = menu_entries(&languages);

        assert_eq!(
            menu,
            vec![
                MenuEntry {
                    label: "English".into(),
                    code: "en".into()
                },
                MenuEntry {
                    label: "Español".into(),
                    code: "es".into()
                },
            ]
        );
    }

    #[test]
    fn order_is_not_sorted() {
        let languages =
            LanguageList::from_json(r#"{"zh_cn":"中文","de":"Deutsch","ar":"العربية"}"#).unwrap();
        let codes: Vec<&str> = languages.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["zh_cn", "de", "ar"]);
    }

    #[test]
    fn repeated_code_keeps_first_position_and_last_label() {
        let languages =
            LanguageList::from_json(r#"{"en":"English","es":"Español","en":"Inglés"}"#).unwrap();

        assert_eq!(languages.len(), 2);
        assert_eq!(languages.iter().next().unwrap().label, "Inglés");
        assert_eq!(languages.label("es"), Some("Español"));
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    #[case(r#"["en","es"]"#)]
    #[case(r#"{"en":1}"#)]
    #[case(r#"{"en":"English"} trailing"#)]
    #[case(r#""en""#)]
    fn malformed_mapping_is_an_error(#[case] json: &str) {
        let result = LanguageList::from_json(json);
        assert!(matches!(
            result,
            Err(EngineError::MalformedLanguages { .. })
        ));
    }

    #[test]
    fn empty_object_is_an_empty_list() {
        let languages = LanguageList::from_json("{}").unwrap();
        assert!(languages.is_empty());
        assert!(menu_entries(&languages).is_empty());
    }

    #[test]
    fn default_matches_default_attribute() {
        assert_eq!(
            LanguageList::default(),
            LanguageList::from_json(DEFAULT_LANGUAGES_JSON).unwrap()
        );
    }

    #[test]
    fn list_form_deserializes_in_order() {
        let json = r#"[{"code":"fr","label":"Français"},{"code":"en","label":"English"}]"#;
        let languages: LanguageList = serde_json::from_str(json).unwrap();

        assert_eq!(languages.iter().next().unwrap().code, "fr");
        assert!(languages.contains("en"));
        assert!(!languages.contains("es"));
    }

    #[test]
    fn from_iterator_collects_pairs() {
        let languages: LanguageList = [("en", "English"), ("eu", "Euskara")].into_iter().collect();
        assert_eq!(languages.label("eu"), Some("Euskara"));
        assert_eq!(languages.len(), 2);
    }
}
