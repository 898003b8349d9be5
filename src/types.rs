//! 入力フォームの値と特徴量ベクトル
//!
//! フォームの各フィールドとモデル入力の位置対応はここで一元管理します。

use serde::{Deserialize, Serialize};

/// 特徴量の数
pub const NUM_FEATURES: usize = 7;

/// 学習時の特徴量の並び順
///
/// スケーラーと分類器はこの順序で学習されているため、並びを変えると
/// 予測が黙って壊れます。読み込み時にスケーラーの特徴名と照合します。
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "N", "P", "K", "temperature", "humidity", "ph", "rainfall",
];

/// 入力ウィジェットの範囲
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: f64,
    pub step: f64,
}

impl FieldBounds {
    const fn bounded(min: f64, max: f64, default: f64, step: f64) -> Self {
        Self { min: Some(min), max: Some(max), default, step }
    }

    const fn unbounded(default: f64, step: f64) -> Self {
        Self { min: None, max: None, default, step }
    }

    /// 範囲内に丸める（ウィジェットの挙動と同じ）
    pub fn clamp(&self, value: f64) -> f64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

pub const NITROGEN_BOUNDS: FieldBounds = FieldBounds::bounded(0.0, 150.0, 50.0, 1.0);
pub const PHOSPHORUS_BOUNDS: FieldBounds = FieldBounds::bounded(0.0, 150.0, 50.0, 1.0);
pub const POTASSIUM_BOUNDS: FieldBounds = FieldBounds::bounded(0.0, 250.0, 50.0, 1.0);
pub const TEMPERATURE_BOUNDS: FieldBounds = FieldBounds::unbounded(25.0, 0.1);
pub const HUMIDITY_BOUNDS: FieldBounds = FieldBounds::bounded(0.0, 100.0, 60.0, 0.1);
pub const PH_BOUNDS: FieldBounds = FieldBounds::bounded(0.0, 14.0, 6.5, 0.1);
pub const RAINFALL_BOUNDS: FieldBounds = FieldBounds::unbounded(100.0, 1.0);

/// フォームに入力された圃場データ
///
/// N/P/Kはスライダー（整数）、それ以外は数値入力です。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldReadings {
    pub nitrogen: u32,
    pub phosphorus: u32,
    pub potassium: u32,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl Default for FieldReadings {
    fn default() -> Self {
        Self {
            nitrogen: NITROGEN_BOUNDS.default as u32,
            phosphorus: PHOSPHORUS_BOUNDS.default as u32,
            potassium: POTASSIUM_BOUNDS.default as u32,
            temperature: TEMPERATURE_BOUNDS.default,
            humidity: HUMIDITY_BOUNDS.default,
            ph: PH_BOUNDS.default,
            rainfall: RAINFALL_BOUNDS.default,
        }
    }
}

impl FieldReadings {
    /// ウィジェットの範囲に丸めた値を返す
    ///
    /// 範囲以外の検証（フィールド間の整合性など）は行いません。
    pub fn clamped(&self) -> Self {
        Self {
            nitrogen: NITROGEN_BOUNDS.clamp(f64::from(self.nitrogen)) as u32,
            phosphorus: PHOSPHORUS_BOUNDS.clamp(f64::from(self.phosphorus)) as u32,
            potassium: POTASSIUM_BOUNDS.clamp(f64::from(self.potassium)) as u32,
            temperature: TEMPERATURE_BOUNDS.clamp(self.temperature),
            humidity: HUMIDITY_BOUNDS.clamp(self.humidity),
            ph: PH_BOUNDS.clamp(self.ph),
            rainfall: RAINFALL_BOUNDS.clamp(self.rainfall),
        }
    }

    /// モデル入力の順序に並べた特徴量ベクトルを作成
    pub fn to_feature_vector(&self) -> FeatureVector {
        FeatureVector([
            self.nitrogen as f32,
            self.phosphorus as f32,
            self.potassium as f32,
            self.temperature as f32,
            self.humidity as f32,
            self.ph as f32,
            self.rainfall as f32,
        ])
    }
}

/// モデル入力用の特徴量ベクトル（順序は [`FEATURE_NAMES`]）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f32; NUM_FEATURES]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}
