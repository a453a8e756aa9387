//! Light/dark theme preference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::tasks::{Scheduler, TaskPurpose};

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Whether the desktop currently asks for a dark appearance.
pub fn system_prefers_dark() -> bool {
    matches!(dark_light::detect(), Ok(dark_light::Mode::Dark))
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preference store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Preferences kept as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store, starting empty if the file does not exist yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.values).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Store for when nothing should outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeTask {
    Unlock,
}

pub struct ThemeSwitcher<S: KeyValueStore> {
    store: S,
    current: Theme,
    locked: bool,
    lock: Duration,
}

impl<S: KeyValueStore> ThemeSwitcher<S> {
    pub fn new(store: S, lock: Duration) -> Self {
        Self {
            store,
            current: Theme::Light,
            locked: false,
            lock,
        }
    }

    /// Apply the saved preference, or follow the system when there is none.
    pub fn initialize(&mut self, system_prefers_dark: bool) -> Theme {
        self.current = match self.saved() {
            Some(theme) => theme,
            None if system_prefers_dark => Theme::Dark,
            None => Theme::Light,
        };
        tracing::debug!(theme = self.current.as_str(), "Theme initialized");
        self.current
    }

    /// Apply and persist `theme`. The theme is applied even if saving fails.
    pub fn set(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.current = theme;
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Flip the saved preference. Returns `None` while a previous toggle is
    /// still settling.
    pub fn toggle<T: From<ThemeTask>>(&mut self, scheduler: &mut Scheduler<T>) -> Option<Theme> {
        if self.locked {
            return None;
        }

        let next = self.saved().unwrap_or_default().flipped();
        if let Err(e) = self.set(next) {
            tracing::warn!(error = %e, "Failed to save theme preference");
        }

        self.locked = true;
        scheduler.schedule(TaskPurpose::ThemeUnlock, self.lock, ThemeTask::Unlock.into());
        Some(next)
    }

    pub fn on_task(&mut self, task: ThemeTask) {
        match task {
            ThemeTask::Unlock => self.locked = false,
        }
    }

    /// The desktop appearance changed. Only followed without a saved choice.
    pub fn system_changed(&mut self, prefers_dark: bool) -> bool {
        if self.saved().is_some() {
            return false;
        }
        self.current = if prefers_dark { Theme::Dark } else { Theme::Light };
        true
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Label for the toggle control: the theme it switches to.
    pub fn label(&self) -> &'static str {
        match self.current {
            Theme::Dark => "Light Mode",
            Theme::Light => "Dark Mode",
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn saved(&self) -> Option<Theme> {
        self.store.get(THEME_KEY).as_deref().and_then(Theme::parse)
    }
}
