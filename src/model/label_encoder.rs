//! クラスインデックスと作物名の対応

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// ラベルエンコーダー
///
/// `classes[i]` が分類器の出力インデックス `i` に対応します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// クラス数
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// 全クラスラベル
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// クラスインデックスから作物名を取得
    pub fn inverse_lookup(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(RecommendError::UnknownClass {
                index,
                classes: self.classes.len(),
            })
    }

    /// 作物名からクラスインデックスを取得
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }
}
