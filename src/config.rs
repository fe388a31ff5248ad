use std::path::PathBuf;

use anyhow::Result;
use crossterm::style::Stylize;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::default_colors::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    bold:   bool,
    italic: bool,
    color:  crossterm::style::Color,
}

impl StyleConfig {
    fn style(&self, s: impl ToString) -> String {
        let mut s = s.to_string().with(self.color);
        if self.bold {
            s = s.bold();
        }
        if self.italic {
            s = s.italic();
        }
        s.to_string()
    }
}

pub trait Styleable {
    fn style(&self, c: &StyleConfig) -> String;
}

impl<T> Styleable for T
where
    T: ToString + std::fmt::Display,
{
    fn style(&self, c: &StyleConfig) -> String {
        c.style(self)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color:  COLOR_WHITE,
            bold:   false,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub display_uuid:      bool,
    pub prefix:            String,
    pub suffix:            String,
    pub description:       String,
    pub style_prefix:      StyleConfig,
    pub style_suffix:      StyleConfig,
    pub style_description: StyleConfig,
    pub style_content:     StyleConfig,
}

impl OutputConfig {
    pub fn format_str(&self, content: impl ToString) -> String {
        let prefix = self.prefix.style(&self.style_prefix);
        let suffix = self.suffix.style(&self.style_suffix);
        let content = content.to_string().style(&self.style_content);
        if self.description.is_empty() {
            format!("{prefix}{content}{suffix}")
        } else {
            let description = self.description.style(&self.style_description);
            format!("{prefix}{description} {content}{suffix}")
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            display_uuid:      false,
            prefix:            "[".into(),
            suffix:            "]".into(),
            description:       "".into(),
            style_prefix:      StyleConfig::default(),
            style_suffix:      StyleConfig::default(),
            style_description: StyleConfig {
                italic: true,
                ..StyleConfig::default()
            },
            style_content:     StyleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database_location:    PathBuf,
    pub history_location:     PathBuf,
    pub log_level:            String,
    pub display_url:          bool,
    pub output_uuid:          OutputConfig,
    pub output_url:           OutputConfig,
    pub output_author:        OutputConfig,
    pub output_lifespan:      OutputConfig,
    pub output_book:          OutputConfig,
    pub output_book_instance: OutputConfig,
    pub output_status:        OutputConfig,
    pub output_due_back:      OutputConfig,
    pub output_error:         OutputConfig,
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    pub fn read_config() -> Result<Self> {
        Self::figment(Figment::new().merge(Toml::file("config.toml")))
    }

    /// Layers `CATALOG_` environment variables over `figment`, which in turn
    /// sits over the defaults.
    pub fn figment(figment: Figment) -> Result<Self> {
        Ok(Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(figment)
            .merge(Env::prefixed("CATALOG_"))
            .extract()?)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(shellexpand::path::full(&self.database_location)?.into_owned())
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        Ok(shellexpand::path::full(&self.history_location)?.into_owned())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_location:    PathBuf::from("~/.local/share/catalog/catalog.db"),
            history_location:     PathBuf::from("~/.local/share/catalog/history.txt"),
            log_level:            "warn".into(),
            display_url:          false,
            output_uuid:          OutputConfig {
                prefix: "(".into(),
                suffix: ")".into(),
                style_content: StyleConfig {
                    color: COLOR_DIMMED,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_url:           OutputConfig {
                prefix: "<".into(),
                suffix: ">".into(),
                style_content: StyleConfig {
                    color: COLOR_DIMMED,
                    italic: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_author:        OutputConfig {
                display_uuid: true,
                style_content: StyleConfig {
                    color: COLOR_AUTHOR,
                    bold: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_lifespan:      OutputConfig {
                style_content: StyleConfig {
                    color: COLOR_LIFESPAN,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_book:          OutputConfig {
                style_content: StyleConfig {
                    color: COLOR_BOOK,
                    bold: true,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_book_instance: OutputConfig {
                display_uuid: true,
                style_content: StyleConfig {
                    color: COLOR_BOOK_INSTANCE,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_status:        OutputConfig {
                style_content: StyleConfig {
                    color: COLOR_STATUS,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_due_back:      OutputConfig {
                description: "Due back:".into(),
                style_content: StyleConfig {
                    color: COLOR_DUE_BACK,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_error:         OutputConfig {
                description: "Error".into(),
                style_content: StyleConfig {
                    color: COLOR_ERROR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let s = Config::default_as_string().unwrap();
        let config = Config::figment(Figment::new().merge(Toml::string(&s))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = Config::figment(Figment::new().merge(Toml::string(
            r#"
            log_level = "debug"
            display_url = true
            "#,
        )))
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.display_url);
        assert_eq!(config.output_author, Config::default().output_author);
    }
}
