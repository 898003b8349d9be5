//! 作物分類ネットワークの定義
//!
//! 学習済みの全結合ネットワーク（Kerasから書き出したもの）をJSONから復元し、
//! burnのモジュールとして推論します。

use std::path::Path;

use burn::{
    module::{Module, Param},
    nn::{Linear, LinearConfig},
    tensor::{activation, backend::Backend, Tensor},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecommendError, Result};
use crate::ml::Classifier;

/// 層の活性化関数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
    Linear,
}

impl Activation {
    fn apply<B: Backend>(self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Activation::Relu => activation::relu(x),
            Activation::Sigmoid => activation::sigmoid(x),
            Activation::Tanh => activation::tanh(x),
            Activation::Softmax => activation::softmax(x, 1),
            Activation::Linear => x,
        }
    }
}

/// 全結合層1層分の重み
///
/// `kernel` は `[入力][ユニット]` の並び（Kerasと同じ）です。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayerSpec {
    pub activation: Activation,
    pub kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl DenseLayerSpec {
    pub fn units(&self) -> usize {
        self.bias.len()
    }
}

/// 分類器ファイル（`crop_ann_model.json`）の内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSpec {
    pub input_dim: usize,
    pub layers: Vec<DenseLayerSpec>,
}

impl ClassifierSpec {
    /// JSONファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecommendError::ArtifactMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content, path)
    }

    /// JSON文字列から読み込み、層の形状を検証する
    pub fn from_json_str(json: &str, source: &Path) -> Result<Self> {
        let spec: ClassifierSpec = serde_json::from_str(json)
            .map_err(|e| RecommendError::malformed(source, e.to_string()))?;
        spec.validate()
            .map_err(|reason| RecommendError::malformed(source, reason))?;
        Ok(spec)
    }

    /// 層同士の次元がつながっているか確認
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut d_in = self.input_dim;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.kernel.len() != d_in {
                return Err(format!(
                    "layer {} expects {} inputs but kernel has {} rows",
                    i,
                    d_in,
                    layer.kernel.len()
                ));
            }
            if layer.units() == 0 {
                return Err(format!("layer {} has no units", i));
            }
            if let Some(row) = layer.kernel.iter().position(|r| r.len() != layer.units()) {
                return Err(format!(
                    "layer {} kernel row {} has {} columns, bias has {}",
                    i,
                    row,
                    layer.kernel[row].len(),
                    layer.units()
                ));
            }
            d_in = layer.units();
        }

        Ok(())
    }

    /// 出力クラス数
    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, DenseLayerSpec::units)
    }
}

/// 作物分類用の全結合ネットワーク
///
/// # アーキテクチャ
/// - Dense x N（各層の活性化関数は `MlpClassifier` 側で保持）
/// - Softmax（最終層が線形の場合は推論時に適用）
#[derive(Module, Debug)]
pub struct CropNet<B: Backend> {
    layers: Vec<Linear<B>>,
}

impl<B: Backend> CropNet<B> {
    /// 重みを指定して各層を構築
    fn from_spec(spec: &ClassifierSpec, device: &B::Device) -> Self {
        let mut d_in = spec.input_dim;
        let mut layers = Vec::with_capacity(spec.layers.len());

        for layer_spec in &spec.layers {
            let d_out = layer_spec.units();
            let weights: Vec<f32> = layer_spec.kernel.iter().flatten().copied().collect();

            let mut linear = LinearConfig::new(d_in, d_out).init::<B>(device);
            linear.weight = Param::from_tensor(
                Tensor::<B, 1>::from_floats(weights.as_slice(), device).reshape([d_in, d_out]),
            );
            linear.bias = Some(Param::from_tensor(Tensor::<B, 1>::from_floats(
                layer_spec.bias.as_slice(),
                device,
            )));

            layers.push(linear);
            d_in = d_out;
        }

        Self { layers }
    }
}

/// burnで推論する分類器
pub struct MlpClassifier<B: Backend> {
    net: CropNet<B>,
    activations: Vec<Activation>,
    input_dim: usize,
    num_classes: usize,
    device: B::Device,
}

impl<B: Backend> MlpClassifier<B> {
    /// 検証済みの重みからモデルを初期化
    pub fn from_spec(spec: &ClassifierSpec, device: &B::Device) -> Self {
        let net = CropNet::from_spec(spec, device);
        let activations = spec.layers.iter().map(|l| l.activation).collect();

        info!(
            layers = spec.layers.len(),
            params = net.num_params(),
            input_dim = spec.input_dim,
            classes = spec.output_dim(),
            "crop network initialized"
        );

        Self {
            net,
            activations,
            input_dim: spec.input_dim,
            num_classes: spec.output_dim(),
            device: device.clone(),
        }
    }

    /// JSONファイルからモデルを読み込む
    pub fn load(path: &Path, device: &B::Device) -> Result<Self> {
        let spec = ClassifierSpec::load(path)?;
        Ok(Self::from_spec(&spec, device))
    }

    /// 順伝播
    ///
    /// # 引数
    /// - `input`: 正規化済みの特徴量 [batch_size, input_dim]
    ///
    /// # 戻り値
    /// - クラスごとの確率 [batch_size, num_classes]
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for (layer, activation) in self.net.layers.iter().zip(&self.activations) {
            x = activation.apply(layer.forward(x));
        }

        // 最終層がソフトマックスでなければ確率に変換する
        match self.activations.last() {
            Some(Activation::Softmax) => x,
            _ => activation::softmax(x, 1),
        }
    }
}

impl<B: Backend> Classifier for MlpClassifier<B> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.input_dim {
            return Err(RecommendError::ShapeMismatch {
                stage: "classifier input",
                expected: self.input_dim,
                actual: features.len(),
            });
        }

        let input = Tensor::<B, 1>::from_floats(features, &self.device).reshape([1, self.input_dim]);
        let output = self.forward(input);

        output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| RecommendError::Backend(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::{NdArray, NdArrayDevice};

    type TestBackend = NdArray<f32>;

    /// 7入力 → 4ユニット(relu) → 3クラス(softmax)
    fn small_spec() -> ClassifierSpec {
        let hidden = DenseLayerSpec {
            activation: Activation::Relu,
            kernel: (0..7)
                .map(|i| (0..4).map(|j| if i % 4 == j { 1.0 } else { -0.5 }).collect())
                .collect(),
            bias: vec![0.0, 0.1, 0.2, 0.3],
        };
        let output = DenseLayerSpec {
            activation: Activation::Softmax,
            kernel: vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![0.5, 0.5, 0.5],
            ],
            bias: vec![0.0, 0.0, 0.0],
        };
        ClassifierSpec {
            input_dim: 7,
            layers: vec![hidden, output],
        }
    }

    #[test]
    fn test_validate_rejects_broken_chain() {
        let mut spec = small_spec();
        assert!(spec.validate().is_ok());
        assert_eq!(spec.output_dim(), 3);

        spec.layers[1].kernel.pop();
        assert!(spec.validate().is_err());

        let empty = ClassifierSpec { input_dim: 7, layers: vec![] };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_predict_returns_distribution() {
        let device = NdArrayDevice::default();
        let classifier = MlpClassifier::<TestBackend>::from_spec(&small_spec(), &device);

        let probs = classifier.predict(&[0.5, -0.2, 1.0, 0.0, 0.3, -1.0, 0.8]).unwrap();
        assert_eq!(probs.len(), 3);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_forward_matches_manual_computation() {
        // 1入力 → 2クラス（線形出力 → ソフトマックス）
        let spec = ClassifierSpec {
            input_dim: 1,
            layers: vec![DenseLayerSpec {
                activation: Activation::Linear,
                kernel: vec![vec![1.0, -1.0]],
                bias: vec![0.0, 0.0],
            }],
        };
        let device = NdArrayDevice::default();
        let classifier = MlpClassifier::<TestBackend>::from_spec(&spec, &device);

        let probs = classifier.predict(&[1.0]).unwrap();
        let expected = 1.0 / (1.0 + (-2.0f32).exp());
        assert!((probs[0] - expected).abs() < 1e-5);
        assert!((probs[1] - (1.0 - expected)).abs() < 1e-5);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let device = NdArrayDevice::default();
        let classifier = MlpClassifier::<TestBackend>::from_spec(&small_spec(), &device);
        let input = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        assert_eq!(classifier.predict(&input).unwrap(), classifier.predict(&input).unwrap());
    }

    #[test]
    fn test_wrong_input_width() {
        let device = NdArrayDevice::default();
        let classifier = MlpClassifier::<TestBackend>::from_spec(&small_spec(), &device);
        assert!(matches!(
            classifier.predict(&[0.0; 5]),
            Err(RecommendError::ShapeMismatch { expected: 7, actual: 5, .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let device = NdArrayDevice::default();
        let result = MlpClassifier::<TestBackend>::load(Path::new("does/not/exist.json"), &device);
        assert!(matches!(result, Err(RecommendError::ArtifactMissing(_))));
    }
}
