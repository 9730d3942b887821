use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coords::CoordinateMode;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub coordinates: CoordinateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// 受信アドレス (OSCeleton は同一マシンから送る前提)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// 受信ポート
    #[serde(default = "default_port")]
    pub port: u16,
    /// 受信スレッドのタイムアウト (ミリ秒)。停止要求の確認間隔になる
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoordinateConfig {
    /// "normalized" | "physical_millimeters"
    #[serde(default)]
    pub mode: CoordinateMode,
    /// 正規化X 0〜1 に対応する幅（ミリ）
    #[serde(default = "default_width_mm")]
    pub width_mm: f64,
    /// 正規化Y 0〜1 に対応する高さ（ミリ）
    #[serde(default = "default_height_mm")]
    pub height_mm: f64,
    /// 正規化Z 1.0 に対応する奥行き（ミリ）
    #[serde(default = "default_depth_mm")]
    pub depth_mm: f64,
}

pub const DEFAULT_PORT: u16 = 7110;

fn default_bind_addr() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_read_timeout_ms() -> u64 { 100 }
fn default_width_mm() -> f64 { 2560.0 }
fn default_height_mm() -> f64 { 1920.0 }
fn default_depth_mm() -> f64 { 1280.0 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            mode: CoordinateMode::default(),
            width_mm: default_width_mm(),
            height_mm: default_height_mm(),
            depth_mm: default_depth_mm(),
        }
    }
}

impl ServerConfig {
    /// "addr:port" 形式
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// ファイルが無い・読めない場合はデフォルト設定
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to load {}: {:#}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
