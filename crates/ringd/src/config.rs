use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ringsel::{Color, KeyName};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Exec value that turns an item into the "write default config" action.
pub const SETUP_COMMAND: &str = "RINGD_SETUP";

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct MenuName(String);

ringsel::impl_string_newtype!(MenuName);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Anchor {
    #[default]
    #[strum(to_string = "screen", serialize = "center")]
    Screen,
    #[strum(to_string = "cursor", serialize = "pointer")]
    Cursor,
}

#[derive(Debug, Clone, Copy, PartialEq, SerializeDisplay, DeserializeFromStr)]
pub struct HexColor(pub Color);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color '{0}' must start with '#'")]
    MissingHash(String),
    #[error("color '{0}' must have 6 or 8 hex digits")]
    Length(String),
    #[error("color '{0}' contains invalid hex digits")]
    Digits(String),
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(ColorParseError::Length(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError::Digits(s.to_string()))
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };

        Ok(HexColor(ringsel::rgba8(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            alpha,
        )))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.0.into_components();
        let to_u8 = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            to_u8(r),
            to_u8(g),
            to_u8(b),
            to_u8(a)
        )
    }
}

/// Item given as a table. Every field is optional; `name` is required by the
/// menu builder, not by the parser.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemTable {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub key: Option<KeyName>,
    pub inner_radius: Option<f64>,
    pub outer_radius: Option<f64>,
    pub bg_color: Option<HexColor>,
    pub fg_color: Option<HexColor>,
    pub text_color: Option<HexColor>,
    pub text_scale: Option<f64>,
    /// Command line, split with shell quoting rules and run without a shell.
    pub exec: Option<String>,
    pub open: Option<MenuName>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemEntry {
    Label(String),
    Record(ItemTable),
    /// Anything else; kept so the menu builder can report it by kind.
    Invalid(String),
}

impl<'de> Deserialize<'de> for ItemEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = ItemEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a label string or an item table")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemEntry, E> {
                Ok(ItemEntry::Label(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<ItemEntry, A::Error> {
                ItemTable::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(ItemEntry::Record)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ItemEntry, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(ItemEntry::Invalid("array".to_string()))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<ItemEntry, E> {
                Ok(ItemEntry::Invalid("boolean".to_string()))
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> Result<ItemEntry, E> {
                Ok(ItemEntry::Invalid("integer".to_string()))
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> Result<ItemEntry, E> {
                Ok(ItemEntry::Invalid("integer".to_string()))
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> Result<ItemEntry, E> {
                Ok(ItemEntry::Invalid("float".to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<ItemEntry, E> {
                Ok(ItemEntry::Invalid("nothing".to_string()))
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuConfig {
    pub name: MenuName,
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default)]
    pub rot_offset: f64,
    #[serde(default)]
    pub clockwise: bool,
    pub inner_radius: Option<f64>,
    pub outer_radius: Option<f64>,
    pub bg_color: Option<HexColor>,
    pub fg_color: Option<HexColor>,
    pub line_sep_color: Option<HexColor>,
    pub text_color: Option<HexColor>,
    #[serde(default)]
    pub items: Vec<ItemEntry>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Menu shown by a bare `show`; the first menu when unset.
    pub default_menu: Option<MenuName>,
    #[serde(default)]
    pub menus: Vec<MenuConfig>,
}

impl Config {
    pub fn default_menu_name(&self) -> Option<&MenuName> {
        self.default_menu
            .as_ref()
            .or_else(|| self.menus.first().map(|m| &m.name))
    }

    /// Shown until the user has a config file: one item that writes the
    /// commented default config and opens it.
    pub fn setup() -> Self {
        Config {
            default_menu: None,
            menus: vec![MenuConfig {
                name: MenuName::from("setup"),
                anchor: Anchor::Cursor,
                rot_offset: 0.0,
                clockwise: false,
                inner_radius: Some(40.0),
                outer_radius: Some(120.0),
                bg_color: None,
                fg_color: None,
                line_sep_color: None,
                text_color: None,
                items: vec![ItemEntry::Record(ItemTable {
                    name: Some("Setup".to_string()),
                    exec: Some(SETUP_COMMAND.to_string()),
                    ..ItemTable::default()
                })],
            }],
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Menu '{menu}': {source}")]
    Menu {
        menu: MenuName,
        #[source]
        source: ringsel::ConfigError,
    },
    #[error("Menu '{menu}', item '{item}': bad command line: {source}")]
    Command {
        menu: MenuName,
        item: String,
        #[source]
        source: shell_words::ParseError,
    },
    #[error("Menu '{menu}', item '{item}': empty command line")]
    EmptyCommand { menu: MenuName, item: String },
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "ringsel", "ringd").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("RINGD"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        log::info!("No config at {}, showing setup menu", path.display());
        return Config::setup();
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            Config::setup()
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

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

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
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
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
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_anchor_deserialization() {
        let cases = vec![
            ("\"screen\"", Anchor::Screen),
            ("\"Screen\"", Anchor::Screen),
            ("\"CENTER\"", Anchor::Screen),
            ("\"cursor\"", Anchor::Cursor),
            ("\"Pointer\"", Anchor::Cursor),
        ];

        for (json, expected) in cases {
            let deserialized: Anchor = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        for anchor in Anchor::iter() {
            let json = serde_json::to_string(&anchor).unwrap();
            assert_eq!(serde_json::from_str::<Anchor>(&json).unwrap(), anchor);
        }
        assert!(serde_json::from_str::<Anchor>("\"north\"").is_err());
    }

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(
            "#32323296".parse::<HexColor>().unwrap(),
            HexColor(ringsel::rgba8(50, 50, 50, 150))
        );
        assert_eq!(
            "#FF0080".parse::<HexColor>().unwrap(),
            HexColor(ringsel::rgba8(255, 0, 128, 255))
        );
        assert_eq!(
            "ff0080".parse::<HexColor>(),
            Err(ColorParseError::MissingHash("ff0080".to_string()))
        );
        assert!(matches!(
            "#ff00".parse::<HexColor>(),
            Err(ColorParseError::Length(_))
        ));
        assert!(matches!(
            "#gg0000".parse::<HexColor>(),
            Err(ColorParseError::Digits(_))
        ));
        assert_eq!(HexColor(ringsel::rgba8(50, 50, 50, 125)).to_string(), "#3232327d");
    }

    #[test]
    fn test_item_entry_deserialization() {
        let entries: Vec<ItemEntry> = serde_json::from_str(
            r##"["primary1", {"name": "primary2", "key": "n", "width": 1.5, "bg_color": "#96960064"}, 42, [1, 2], true]"##,
        )
        .unwrap();

        assert_eq!(entries[0], ItemEntry::Label("primary1".to_string()));
        match &entries[1] {
            ItemEntry::Record(table) => {
                assert_eq!(table.name.as_deref(), Some("primary2"));
                assert_eq!(table.key, Some(KeyName::from("n")));
                assert_eq!(table.width, Some(1.5));
                assert_eq!(table.bg_color, Some(HexColor(ringsel::rgba8(150, 150, 0, 100))));
                assert_eq!(table.exec, None);
            }
            other => panic!("expected record, got {other:?}"),
        }
        assert_eq!(entries[2], ItemEntry::Invalid("integer".to_string()));
        assert_eq!(entries[3], ItemEntry::Invalid("array".to_string()));
        assert_eq!(entries[4], ItemEntry::Invalid("boolean".to_string()));
    }

    #[test]
    fn test_bad_record_field_is_an_error() {
        let res = serde_json::from_str::<ItemEntry>(r#"{"name": "x", "bg_color": "red"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_default_config_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert!(!config.menus.is_empty());
        assert_eq!(config.default_menu_name().map(|n| n.as_str()), Some("main"));

        let main = config.menus.iter().find(|m| m.name.as_str() == "main").unwrap();
        assert!(main.clockwise);
        assert_eq!(main.items.len(), 3);
        assert!(main.items.iter().all(|e| matches!(e, ItemEntry::Record(_))));

        let sub = config.menus.iter().find(|m| m.name.as_str() == "sub1").unwrap();
        assert!(sub.items.iter().all(|e| matches!(e, ItemEntry::Label(_))));
    }

    #[test]
    fn test_parse_config_toml() {
        let config = parse_config(
            r##"
            default_menu = "tools"

            [[menus]]
            name = "tools"
            anchor = "cursor"
            clockwise = true
            rot_offset = 0.5
            items = ["a", { name = "b", exec = "notify-send 'hello world'" }]
            "##,
        )
        .unwrap();

        let menu = &config.menus[0];
        assert_eq!(menu.anchor, Anchor::Cursor);
        assert_eq!(menu.rot_offset, 0.5);
        assert_eq!(menu.items.len(), 2);
        assert_eq!(config.default_menu_name(), Some(&MenuName::from("tools")));
    }

    #[test]
    fn test_setup_config() {
        let config = Config::setup();
        assert_eq!(config.default_menu_name(), Some(&MenuName::from("setup")));
        match &config.menus[0].items[0] {
            ItemEntry::Record(table) => assert_eq!(table.exec.as_deref(), Some(SETUP_COMMAND)),
            other => panic!("expected record, got {other:?}"),
        }
    }
}
