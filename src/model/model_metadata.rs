//! 成果物バンドルのメタデータ
//!
//! tar.gz形式のバンドルに同梱し、分類器・スケーラー・ラベルエンコーダーが
//! 同じ学習から書き出されたことを確認するために使います。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::FEATURE_NAMES;

/// バンドルのメタデータ
///
/// tar.gz形式で保存される情報：
/// - metadata.json: このメタデータ（JSON形式）
/// - model.json / scaler.json / label_encoder.json: 各成果物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// 特徴量の並び順
    /// 例: ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"]
    pub feature_names: Vec<String>,

    /// 全クラスラベル（ラベルエンコーダーと同じ順序）
    pub class_labels: Vec<String>,

    /// 隠れ層のユニット数
    #[serde(default)]
    pub hidden_layers: Vec<usize>,

    /// バンドル作成時刻（ISO8601形式）
    pub exported_at: String,

    /// 学習元などの任意メモ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ArtifactMetadata {
    /// 新しいメタデータを作成（特徴量は既定の並び順）
    pub fn new(class_labels: Vec<String>, hidden_layers: Vec<usize>, source: Option<String>) -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            class_labels,
            hidden_layers,
            exported_at: chrono::Local::now().to_rfc3339(),
            source,
        }
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }
}
