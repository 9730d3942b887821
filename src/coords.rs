use serde::Deserialize;

use crate::config::CoordinateConfig;
use crate::point::Point;

/// 受信座標の解釈
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateMode {
    /// センサーの正規化座標をそのまま保持
    #[default]
    Normalized,
    /// ミリ単位の実空間座標に変換
    PhysicalMillimeters,
}

/// 正規化座標 → 実空間座標（ミリ）の変換
///
/// センサー視野のキャリブレーション値。デフォルトは
/// `x' = 1280 - x*2560`, `y' = 960 - y*1920`, `z' = -z*1280`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub mode: CoordinateMode,
    pub width_mm: f64,
    pub height_mm: f64,
    pub depth_mm: f64,
}

impl CoordinateTransform {
    pub fn new(mode: CoordinateMode) -> Self {
        Self {
            mode,
            width_mm: 2560.0,
            height_mm: 1920.0,
            depth_mm: 1280.0,
        }
    }

    pub fn from_config(config: &CoordinateConfig) -> Self {
        Self {
            mode: config.mode,
            width_mm: config.width_mm,
            height_mm: config.height_mm,
            depth_mm: config.depth_mm,
        }
    }

    /// 受信した生座標を保存用の座標に変換
    pub fn apply(&self, x: f64, y: f64, z: f64) -> Point {
        match self.mode {
            CoordinateMode::Normalized => Point::new(x, y, z),
            CoordinateMode::PhysicalMillimeters => Point::new(
                self.width_mm / 2.0 - x * self.width_mm,
                self.height_mm / 2.0 - y * self.height_mm,
                -z * self.depth_mm,
            ),
        }
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(CoordinateMode::Normalized)
    }
}
