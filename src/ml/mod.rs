pub mod scaler;
pub mod inference;
pub mod ranking;
#[cfg(feature = "ml")]
pub mod ml_model;

use crate::error::Result;

pub use scaler::{FittedScaler, FeatureScaler};
pub use inference::{InferenceEngine, ProbabilityDistribution};
pub use ranking::{rank_top, RankedCrop, TopPredictions, TOP_K};
#[cfg(feature = "ml")]
pub use ml_model::{Activation, ClassifierSpec, CropNet, DenseLayerSpec, MlpClassifier};

/// 分類器のインターフェース
///
/// 正規化済みの1行を受け取り、クラスごとの確率を返します。
/// 実装の差し替え（burnのネットワーク、テスト用スタブなど）はここで行います。
pub trait Classifier: Send {
    /// 期待する入力次元
    fn input_dim(&self) -> usize;

    /// 出力クラス数
    fn num_classes(&self) -> usize;

    /// 確率分布を予測
    fn predict(&self, features: &[f32]) -> Result<Vec<f32>>;
}
