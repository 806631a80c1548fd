//! Translation catalog.
//!
//! Bundles are nested JSON objects flattened to dotted keys
//! (`{"common": {"skip": "Skip"}}` becomes `common.skip`). Lookups try the
//! active locale, then the fallback locale.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::{AppError, LanguageCode, Listener, Result, Subscription, TranslationEngine};

use super::listeners::ListenerSet;

/// Bundles compiled into the binary.
const BUILTIN_BUNDLES: &[(LanguageCode, &str)] = &[
    (LanguageCode::En, include_str!("../../locales/en.json")),
    (LanguageCode::Hi, include_str!("../../locales/hi.json")),
    (LanguageCode::Or, include_str!("../../locales/or.json")),
    (LanguageCode::Bn, include_str!("../../locales/bn.json")),
];

type Bundle = HashMap<String, String>;

/// In-process [`TranslationEngine`].
pub struct CatalogTranslator {
    bundles: HashMap<String, Bundle>,
    fallback: String,
    active: Mutex<String>,
    listeners: ListenerSet<String>,
}

impl CatalogTranslator {
    /// Empty catalog with the given fallback and initial locale.
    #[must_use]
    pub fn new(fallback: &str, initial: &str) -> Self {
        Self {
            bundles: HashMap::new(),
            fallback: fallback.to_string(),
            active: Mutex::new(initial.to_string()),
            listeners: ListenerSet::new(),
        }
    }

    /// Catalog with the shipped bundles and `en` as fallback.
    ///
    /// # Errors
    /// Returns error if an embedded bundle is not valid JSON.
    pub fn builtin(initial: LanguageCode) -> Result<Self> {
        let mut catalog = Self::new(LanguageCode::En.as_str(), initial.as_str());
        for (code, json) in BUILTIN_BUNDLES {
            catalog.add_bundle_json(code.as_str(), json)?;
        }
        Ok(catalog)
    }

    /// Parse and register a bundle, merging over any existing keys.
    ///
    /// # Errors
    /// Returns error if `json` is not a JSON object.
    pub fn add_bundle_json(&mut self, locale: &str, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json).map_err(AppError::json_parse)?;
        if !value.is_object() {
            return Err(AppError::InvalidData {
                message: format!("Bundle for '{locale}' is not a JSON object"),
            });
        }

        let bundle = self.bundles.entry(locale.to_string()).or_default();
        flatten_into(bundle, "", &value);
        tracing::debug!(locale, keys = bundle.len(), "Loaded translation bundle");

        Ok(())
    }

    /// Locales that have a bundle.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Whether `locale` has a bundle of its own.
    #[must_use]
    pub fn has_bundle(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&String> {
        self.bundles.get(locale).and_then(|bundle| bundle.get(key))
    }
}

impl TranslationEngine for CatalogTranslator {
    fn translate(&self, key: &str) -> Option<String> {
        let active = self.active.lock().clone();
        self.lookup(&active, key)
            .or_else(|| self.lookup(&self.fallback, key))
            .cloned()
    }

    fn active_locale(&self) -> String {
        self.active.lock().clone()
    }

    fn set_locale(&self, code: &str) {
        {
            let mut active = self.active.lock();
            if *active == code {
                return;
            }
            active.clear();
            active.push_str(code);
        }

        if !self.has_bundle(code) {
            tracing::debug!(locale = code, fallback = %self.fallback, "No bundle for locale, using fallback");
        }
        self.listeners.notify(&code.to_string());
    }

    fn on_locale_changed(&self, listener: Listener<String>) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

/// Flatten nested objects into dotted keys; non-string leaves are skipped.
fn flatten_into(out: &mut Bundle, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(out, &path, child);
            }
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        _ => {}
    }
}
