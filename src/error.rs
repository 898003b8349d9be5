//! 推論パイプラインのエラー型

use std::path::PathBuf;

use thiserror::Error;

/// 推論パイプラインのエラー
///
/// 成果物の読み込み失敗は起動時の致命的エラー、形状の不一致は
/// プログラム上の契約違反として扱います。
#[derive(Error, Debug)]
pub enum RecommendError {
    /// 成果物ファイルが存在しない
    #[error("Artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// 成果物の内容が不正
    #[error("Artifact {} is malformed: {reason}", path.display())]
    ArtifactMalformed { path: PathBuf, reason: String },

    /// 特徴量やクラス数の次元不一致
    #[error("Shape mismatch in {stage}: expected {expected}, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// スケーラーの特徴名が学習時の並びと一致しない
    #[error("Feature order mismatch: expected [{expected}], got [{actual}]")]
    FeatureOrder { expected: String, actual: String },

    /// ラベルエンコーダーにクラスがない
    #[error("Label encoder has no classes")]
    EmptyEncoder,

    /// ラベルエンコーダーに存在しないクラスインデックス
    #[error("Class index {index} is out of range ({classes} classes)")]
    UnknownClass { index: usize, classes: usize },

    /// 確率分布が空
    #[error("Classifier returned an empty probability distribution")]
    EmptyDistribution,

    /// 上位件数に0が指定された
    #[error("Top-k must be at least 1")]
    ZeroTopK,

    /// 推論バックエンドのエラー
    #[error("Inference backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecommendError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactMalformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
