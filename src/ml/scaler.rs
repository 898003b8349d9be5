//! 特徴量スケーラー
//!
//! 学習時に当てはめた統計量で入力を正規化します。

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// スケーラーのインターフェース
pub trait FeatureScaler: Send {
    /// 当てはめ時の特徴量数
    fn n_features(&self) -> usize;

    /// 学習時の特徴名（保存されていれば）
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// 1行を正規化
    fn transform(&self, features: &[f32]) -> Result<Vec<f32>>;
}

/// 保存済みのスケーラー
///
/// JSONでは `kind` フィールドで種類を区別します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// 標準化: `(x - mean) / scale`
    Standard {
        mean: Vec<f32>,
        scale: Vec<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
    /// 最小最大スケーリング: `x * scale + min`
    MinMax {
        min: Vec<f32>,
        scale: Vec<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
}

impl FittedScaler {
    /// 統計量の長さが揃っているか確認
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let (name, offset, scale, names) = match self {
            FittedScaler::Standard { mean, scale, feature_names } => ("mean", mean, scale, feature_names),
            FittedScaler::MinMax { min, scale, feature_names } => ("min", min, scale, feature_names),
        };
        if offset.len() != scale.len() {
            return Err(format!(
                "{} has {} entries but scale has {}",
                name,
                offset.len(),
                scale.len()
            ));
        }
        if let Some(names) = names {
            if names.len() != scale.len() {
                return Err(format!(
                    "feature_names has {} entries but scale has {}",
                    names.len(),
                    scale.len()
                ));
            }
        }
        Ok(())
    }
}

impl FeatureScaler for FittedScaler {
    fn n_features(&self) -> usize {
        match self {
            FittedScaler::Standard { scale, .. } | FittedScaler::MinMax { scale, .. } => scale.len(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            FittedScaler::Standard { feature_names, .. } | FittedScaler::MinMax { feature_names, .. } => {
                feature_names.as_deref()
            }
        }
    }

    fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.n_features() {
            return Err(RecommendError::ShapeMismatch {
                stage: "scaler",
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        let scaled = match self {
            FittedScaler::Standard { mean, scale, .. } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| {
                    // 分散ゼロの特徴量はscikit-learnと同様に1で割る
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            FittedScaler::MinMax { min, scale, .. } => features
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };

        Ok(scaled)
    }
}
