//! 上位予測の抽出

use serde::Serialize;

use crate::error::{RecommendError, Result};
use crate::ml::ProbabilityDistribution;
use crate::model::LabelEncoder;

/// 表示する候補数
pub const TOP_K: usize = 3;

/// 順位付けされた作物候補
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCrop {
    /// クラスインデックス
    pub index: usize,
    /// 作物名（エンコーダーのラベルそのまま）
    pub label: String,
    /// 確信度（パーセント）
    pub confidence: f32,
}

/// 上位予測（確信度の降順）
///
/// クラス数が `TOP_K` 未満のモデルでは、その数だけの候補になります。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPredictions {
    entries: Vec<RankedCrop>,
}

impl TopPredictions {
    pub fn entries(&self) -> &[RankedCrop] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 最有力候補（空の結果は作られないため常に存在）
    pub fn best(&self) -> &RankedCrop {
        &self.entries[0]
    }

    /// 次点の候補
    pub fn runner_up(&self) -> Option<&RankedCrop> {
        self.entries.get(1)
    }
}

/// 確率分布から上位 `k` 件を抽出
///
/// 安定ソートのため、同じ確率のクラスはインデックス順に並びます。
/// `k` が0の場合は `ZeroTopK` を返します。
pub fn rank_top(
    distribution: &ProbabilityDistribution,
    encoder: &LabelEncoder,
    k: usize,
) -> Result<TopPredictions> {
    if k == 0 {
        return Err(RecommendError::ZeroTopK);
    }
    if distribution.is_empty() {
        return Err(RecommendError::EmptyDistribution);
    }

    let mut order: Vec<(usize, f32)> = distribution
        .probabilities()
        .iter()
        .copied()
        .enumerate()
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let entries = order
        .into_iter()
        .take(k)
        .map(|(index, probability)| -> Result<RankedCrop> {
            Ok(RankedCrop {
                index,
                label: encoder.inverse_lookup(index)?.to_string(),
                confidence: probability * 100.0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TopPredictions { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(n: usize) -> LabelEncoder {
        LabelEncoder::new((0..n).map(|i| format!("crop{}", i)).collect())
    }

    #[test]
    fn test_top_three_descending() {
        let dist = ProbabilityDistribution::new(vec![0.05, 0.5, 0.1, 0.3, 0.05]);
        let top = rank_top(&dist, &encoder(5), TOP_K).unwrap();

        let indices: Vec<usize> = top.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 3, 2]);
        assert_eq!(top.best().label, "crop1");
        assert!((top.best().confidence - 50.0).abs() < 1e-4);
        assert!(top
            .entries()
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
        assert_eq!(Some(top.best().index), dist.argmax());
    }

    #[test]
    fn test_ties_keep_index_order() {
        let dist = ProbabilityDistribution::new(vec![0.2, 0.3, 0.2, 0.3]);
        let top = rank_top(&dist, &encoder(4), TOP_K).unwrap();

        let indices: Vec<usize> = top.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 3, 0]);
        assert_eq!(Some(top.best().index), dist.argmax());
    }

    #[test]
    fn test_fewer_classes_than_k() {
        let dist = ProbabilityDistribution::new(vec![0.4, 0.6]);
        let top = rank_top(&dist, &encoder(2), TOP_K).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top.best().label, "crop1");
        assert_eq!(top.runner_up().map(|c| c.index), Some(0));

        let single = rank_top(&ProbabilityDistribution::new(vec![1.0]), &encoder(1), TOP_K).unwrap();
        assert_eq!(single.len(), 1);
        assert!(single.runner_up().is_none());
    }

    #[test]
    fn test_empty_distribution_is_error() {
        let result = rank_top(&ProbabilityDistribution::new(vec![]), &encoder(0), TOP_K);
        assert!(matches!(result, Err(RecommendError::EmptyDistribution)));
    }

    #[test]
    fn test_zero_k_is_error() {
        let dist = ProbabilityDistribution::new(vec![0.4, 0.6]);
        let result = rank_top(&dist, &encoder(2), 0);
        assert!(matches!(result, Err(RecommendError::ZeroTopK)));

        let one = rank_top(&dist, &encoder(2), 1).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one.best().index, 1);
    }

    #[test]
    fn test_missing_label_is_error() {
        let dist = ProbabilityDistribution::new(vec![0.1, 0.9]);
        let result = rank_top(&dist, &encoder(1), TOP_K);
        assert!(matches!(result, Err(RecommendError::UnknownClass { index: 1, .. })));
    }
}
