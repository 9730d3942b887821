use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{Result, SkeletonError};

/// 3次元座標
///
/// 値型なのでコピーはそれぞれ独立している。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// [x, y, z] の配列として取得
    pub fn vals(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// ユークリッドノルム
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// 自身を単位ベクトルに正規化する
    ///
    /// 長さ0の場合は [`SkeletonError::DegenerateNormalize`] を返し、値は変更しない。
    pub fn normalize(&mut self) -> Result<()> {
        let mag = self.magnitude();
        if mag == 0.0 || !mag.is_finite() {
            return Err(SkeletonError::DegenerateNormalize);
        }
        self.x /= mag;
        self.y /= mag;
        self.z /= mag;
        Ok(())
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl From<[f64; 3]> for Point {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}
