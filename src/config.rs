use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// トラック・ワールドマップの保存先ディレクトリ
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    /// 再生フレームレート（トラッキングフィードと同じ60fpsが基準）
    #[serde(default = "default_playback_fps")]
    pub fps: u32,
}

fn default_data_dir() -> String { "captures".to_string() }
fn default_playback_fps() -> u32 { 60 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_playback_fps(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルが無い・読めない場合はデフォルト設定で起動する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "config {} not loaded ({}), using defaults",
                    path.as_ref().display(),
                    e
                );
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, "captures");
        assert_eq!(config.playback.fps, 60);
    }

    #[test]
    fn test_parse_partial_toml() {
        // 欠けているセクション・フィールドはデフォルトで埋まる
        let config: Config = toml::from_str("[storage]\ndata_dir = \"/tmp/routes\"\n").unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/routes");
        assert_eq!(config.playback.fps, 60);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("no_such_config.toml");
        assert_eq!(config.storage.data_dir, "captures");
    }
}
