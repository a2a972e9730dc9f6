use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use marquee_core::selector::Selector;
use marquee_core::settings::SettingsOverride;
use marquee_core::widget::{Control, Markup, NavMarkup};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name a widget is addressed by on the control socket.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct WidgetName(String);

marquee_core::impl_string_newtype!(WidgetName);

fn default_height() -> f64 {
    300.0
}

fn default_panel_width() -> f64 {
    600.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelConfig {
    /// Link of the nav entry for this panel.
    #[serde(default)]
    pub href: Option<String>,
    /// Caption fragment nested in the nav entry.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub preselected: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WidgetConfig {
    pub name: WidgetName,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
    /// Whether the container has a nav list.
    #[serde(default = "default_true")]
    pub nav: bool,
    /// Class of the caption area inside the container.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub counter: bool,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default = "default_panel_width")]
    pub panel_width: f64,
    /// Defaults to one panel.
    #[serde(default)]
    pub viewport_width: Option<f64>,
    #[serde(default)]
    pub padding_left: f64,
}

impl WidgetConfig {
    pub fn markup(&self) -> Markup {
        let nav = if self.nav {
            self.panels
                .iter()
                .map(|p| NavMarkup {
                    href: p.href.clone(),
                    preselected: p.preselected,
                })
                .collect()
        } else {
            Vec::new()
        };

        Markup {
            classes: self.classes.clone(),
            panels: self.panels.len(),
            nav,
            caption_areas: self.caption.iter().cloned().collect(),
            counter: self.counter,
            controls: self.controls.clone(),
        }
    }
}

/// An explicit initialization call, run before the default passes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitConfig {
    pub selector: Selector,
    #[serde(default)]
    pub settings: SettingsOverride,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: SettingsOverride,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub init: Vec<InitConfig>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "marquee", "marquee").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("MARQUEE"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// The embedded default page.
pub fn default_config() -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_setup() -> Config {
    let loaded = match get_config_path() {
        Ok(path) if !path.exists() => default_config(),
        _ => load_config(),
    };

    match loaded {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using the built-in page: {}", e);
            default_config().unwrap_or_default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let touches_config = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) && event.paths.iter().any(|p| p == &config_path);

                if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
