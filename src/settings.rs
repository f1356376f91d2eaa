//! Settings persistence
//!
//! `SettingsStore` owns the canonical in-memory `SettingsRecord`, reads one
//! snapshot from durable storage at startup, and writes the whole record back
//! after every change. Missing or malformed fields fall back to their
//! defaults at read time and are not written back until the next change.

use crate::languages;
use crate::storage::Storage;
use crate::themes::ThemeRegistry;
use crate::{Error, Result};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_THEME: &str = "anOldHope";
pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_CODE: &str = "let x = 'cool';";

/// Indentation inserted by the editor's tab key, stored as a run of spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TabSize {
    Two,
    #[default]
    Four,
    Six,
}

impl TabSize {
    pub const ALL: [TabSize; 3] = [TabSize::Two, TabSize::Four, TabSize::Six];

    /// The literal indentation string.
    pub fn as_str(self) -> &'static str {
        match self {
            TabSize::Two => "  ",
            TabSize::Four => "    ",
            TabSize::Six => "      ",
        }
    }

    pub fn width(self) -> usize {
        self.as_str().len()
    }
}

impl TryFrom<usize> for TabSize {
    type Error = Error;

    fn try_from(width: usize) -> Result<Self> {
        TabSize::ALL
            .into_iter()
            .find(|t| t.width() == width)
            .ok_or_else(|| Error::InvalidSetting { field: "tabSize", value: width.to_string() })
    }
}

impl TryFrom<&str> for TabSize {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        TabSize::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidSetting { field: "tabSize", value: format!("{:?}", s) })
    }
}

impl TryFrom<String> for TabSize {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        TabSize::try_from(s.as_str())
    }
}

impl From<TabSize> for String {
    fn from(t: TabSize) -> String {
        t.as_str().to_string()
    }
}

/// The five persisted fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    CurrentTheme,
    Language,
    TabSize,
    Code,
    ShowLineNumber,
}

impl SettingsField {
    pub const ALL: [SettingsField; 5] = [
        SettingsField::CurrentTheme,
        SettingsField::Language,
        SettingsField::TabSize,
        SettingsField::Code,
        SettingsField::ShowLineNumber,
    ];

    /// Key of this field inside the stored blob.
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::CurrentTheme => "currentTheme",
            SettingsField::Language => "language",
            SettingsField::TabSize => "tabSize",
            SettingsField::Code => "code",
            SettingsField::ShowLineNumber => "showLineNumber",
        }
    }
}

/// The sole persisted entity. Always fully defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub current_theme: String,
    pub language: String,
    pub tab_size: TabSize,
    pub code: String,
    pub show_line_number: bool,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            current_theme: DEFAULT_THEME.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            tab_size: TabSize::default(),
            code: DEFAULT_CODE.to_string(),
            show_line_number: true,
        }
    }
}

impl SettingsRecord {
    /// Build a record from a parsed blob, substituting the default for every
    /// field that is absent, `null`, or malformed.
    pub fn from_stored(blob: &Value) -> Self {
        let defaults = SettingsRecord::default();
        let themes = ThemeRegistry::new();

        let current_theme = match present(blob, SettingsField::CurrentTheme) {
            None => defaults.current_theme,
            Some(Value::String(s)) if themes.contains(s) => s.clone(),
            Some(other) => malformed(SettingsField::CurrentTheme, other, defaults.current_theme),
        };
        let language = match present(blob, SettingsField::Language) {
            None => defaults.language,
            Some(Value::String(s)) if languages::is_supported(s) => s.clone(),
            Some(other) => malformed(SettingsField::Language, other, defaults.language),
        };
        let tab_size = match present(blob, SettingsField::TabSize) {
            None => defaults.tab_size,
            Some(v) => match v.as_str().map(|s| TabSize::try_from(s)) {
                Some(Ok(t)) => t,
                _ => malformed(SettingsField::TabSize, v, defaults.tab_size),
            },
        };
        let code = match present(blob, SettingsField::Code) {
            None => defaults.code,
            Some(Value::String(s)) => s.clone(),
            Some(other) => malformed(SettingsField::Code, other, defaults.code),
        };
        let show_line_number = match present(blob, SettingsField::ShowLineNumber) {
            None => defaults.show_line_number,
            Some(Value::Bool(b)) => *b,
            Some(other) => malformed(SettingsField::ShowLineNumber, other, defaults.show_line_number),
        };

        SettingsRecord { current_theme, language, tab_size, code, show_line_number }
    }
}

// null counts as absent; `false` and "" do not
fn present(blob: &Value, field: SettingsField) -> Option<&Value> {
    blob.get(field.key()).filter(|v| !v.is_null())
}

fn malformed<T>(field: SettingsField, found: &Value, fallback: T) -> T {
    warn!("Ignoring malformed stored value for {}: {}", field.key(), found);
    fallback
}

/// Owner of the in-memory settings record and its durable snapshot
pub struct SettingsStore<S: Storage> {
    key: String,
    storage: S,
    record: SettingsRecord,
}

impl<S: Storage> SettingsStore<S> {
    /// Load the initial record from `storage`. Nothing is written.
    pub fn open(key: impl Into<String>, storage: S) -> Self {
        let mut store = SettingsStore { key: key.into(), storage, record: SettingsRecord::default() };
        store.record = store.load();
        store
    }

    /// Read the stored snapshot with default substitution.
    ///
    /// A blob that is not valid JSON is treated as absent: defaults are
    /// returned and the blob is left in place until the next save.
    pub fn load(&self) -> SettingsRecord {
        match self.read_blob() {
            Some(blob) => SettingsRecord::from_stored(&blob),
            None => SettingsRecord::default(),
        }
    }

    /// A single field of the stored snapshot, `None` if nothing was stored.
    pub fn get(&self, field: SettingsField) -> Option<Value> {
        self.read_blob()
            .and_then(|mut blob| blob.get_mut(field.key()).map(Value::take))
            .filter(|v| !v.is_null())
    }

    /// Serialize the full record and overwrite the stored snapshot.
    pub fn save(&mut self, record: &SettingsRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.storage.set_item(&self.key, &json)?;
        debug!("Persisted settings under {} ({} bytes)", self.key, json.len());
        Ok(())
    }

    /// The in-memory record.
    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_theme(&mut self, name: &str) -> Result<bool> {
        if !ThemeRegistry::new().contains(name) {
            return Err(Error::InvalidSetting { field: "currentTheme", value: name.to_string() });
        }
        Ok(self.update(|r| replace(&mut r.current_theme, name.to_string())))
    }

    pub fn set_language(&mut self, name: &str) -> Result<bool> {
        if !languages::is_supported(name) {
            return Err(Error::InvalidSetting { field: "language", value: name.to_string() });
        }
        Ok(self.update(|r| replace(&mut r.language, name.to_string())))
    }

    pub fn set_tab_size(&mut self, tab: TabSize) -> bool {
        self.update(|r| replace(&mut r.tab_size, tab))
    }

    pub fn set_code(&mut self, code: impl Into<String>) -> bool {
        let code = code.into();
        self.update(|r| replace(&mut r.code, code))
    }

    pub fn set_show_line_number(&mut self, show: bool) -> bool {
        self.update(|r| replace(&mut r.show_line_number, show))
    }

    /// Restore every field to its default and persist.
    pub fn reset(&mut self) -> bool {
        self.update(|r| replace(r, SettingsRecord::default()))
    }

    /// Apply `change` to the in-memory record; persist once if it changed
    /// anything. Persist failures are logged and otherwise ignored.
    fn update(&mut self, change: impl FnOnce(&mut SettingsRecord) -> bool) -> bool {
        if !change(&mut self.record) {
            return false;
        }
        let snapshot = self.record.clone();
        if let Err(e) = self.save(&snapshot) {
            error!("Failed to persist settings: {}", e);
        }
        true
    }

    fn read_blob(&self) -> Option<Value> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Settings storage unreadable, using defaults: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(blob) => Some(blob),
            Err(e) => {
                warn!("Stored settings under {} are not valid JSON, using defaults: {}", self.key, e);
                None
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
