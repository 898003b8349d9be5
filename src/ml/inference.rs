//! モデル推論機能
//!
//! 入力をスケーリングして分類器に通し、クラスごとの確率分布を得ます。

use serde::Serialize;
use tracing::debug;

use crate::error::{RecommendError, Result};
use crate::ml::{Classifier, FeatureScaler};
use crate::types::FeatureVector;

/// クラスごとの確率（インデックスはラベルエンコーダーに対応）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityDistribution {
    probabilities: Vec<f32>,
}

impl ProbabilityDistribution {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self { probabilities }
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// 最大確率のインデックス（同値の場合は小さいインデックス）
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in self.probabilities.iter().enumerate() {
            match best {
                Some((_, b)) if p.total_cmp(&b).is_le() => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// 全確率の合計（パーセント）
    pub fn total_percent(&self) -> f32 {
        self.probabilities.iter().sum::<f32>() * 100.0
    }
}

/// 推論エンジン
///
/// スケーラーと分類器は借用のみで、読み込みは呼び出し側で一度だけ行います。
pub struct InferenceEngine<'a> {
    scaler: &'a dyn FeatureScaler,
    classifier: &'a dyn Classifier,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(scaler: &'a dyn FeatureScaler, classifier: &'a dyn Classifier) -> Self {
        Self { scaler, classifier }
    }

    /// 1件の特徴量ベクトルを分類
    pub fn infer(&self, features: &FeatureVector) -> Result<ProbabilityDistribution> {
        let scaled = self.scaler.transform(features.as_slice())?;
        debug!(?scaled, "scaled feature vector");

        if scaled.len() != self.classifier.input_dim() {
            return Err(RecommendError::ShapeMismatch {
                stage: "classifier input",
                expected: self.classifier.input_dim(),
                actual: scaled.len(),
            });
        }

        let probabilities = self.classifier.predict(&scaled)?;
        if probabilities.len() != self.classifier.num_classes() {
            return Err(RecommendError::ShapeMismatch {
                stage: "classifier output",
                expected: self.classifier.num_classes(),
                actual: probabilities.len(),
            });
        }

        Ok(ProbabilityDistribution::new(probabilities))
    }
}
