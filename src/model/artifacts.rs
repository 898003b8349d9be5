//! 学習済み成果物の読み込み
//!
//! 分類器・スケーラー・ラベルエンコーダーを起動時に一度だけ読み込み、
//! 形状と特徴量の並びを検証してから推論パイプラインに渡します。

use serde::Serialize;

use crate::error::{RecommendError, Result};
use crate::ml::{Classifier, FeatureScaler};
use crate::model::LabelEncoder;
use crate::types::{FEATURE_NAMES, NUM_FEATURES};

/// 検証済みの成果物一式
pub struct CropArtifacts {
    classifier: Box<dyn Classifier>,
    scaler: Box<dyn FeatureScaler>,
    encoder: LabelEncoder,
    source: String,
}

/// 読み込んだモデルの概要（画面表示用）
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub source: String,
    pub feature_names: Vec<String>,
    pub class_labels: Vec<String>,
}

/// スケーラーの特徴名が学習時の並びと一致するか確認
fn check_feature_order(names: &[String]) -> Result<()> {
    let matches = names.len() == NUM_FEATURES
        && names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .all(|(actual, expected)| actual.eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        Err(RecommendError::FeatureOrder {
            expected: FEATURE_NAMES.join(", "),
            actual: names.join(", "),
        })
    }
}

impl CropArtifacts {
    /// 成果物を組み合わせて検証する
    ///
    /// - スケーラーの特徴量数は7
    /// - 特徴名があれば学習時の並びと一致
    /// - 分類器の入力幅は7、出力幅はクラス数と一致
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: Box<dyn FeatureScaler>,
        encoder: LabelEncoder,
        source: impl Into<String>,
    ) -> Result<Self> {
        if encoder.is_empty() {
            return Err(RecommendError::EmptyEncoder);
        }
        if scaler.n_features() != NUM_FEATURES {
            return Err(RecommendError::ShapeMismatch {
                stage: "scaler features",
                expected: NUM_FEATURES,
                actual: scaler.n_features(),
            });
        }
        if let Some(names) = scaler.feature_names() {
            check_feature_order(names)?;
        }
        if classifier.input_dim() != NUM_FEATURES {
            return Err(RecommendError::ShapeMismatch {
                stage: "classifier input",
                expected: NUM_FEATURES,
                actual: classifier.input_dim(),
            });
        }
        if classifier.num_classes() != encoder.len() {
            return Err(RecommendError::ShapeMismatch {
                stage: "classifier classes",
                expected: encoder.len(),
                actual: classifier.num_classes(),
            });
        }

        Ok(Self {
            classifier,
            scaler,
            encoder,
            source: source.into(),
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            source: self.source.clone(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            class_labels: self.encoder.classes().to_vec(),
        }
    }
}

#[cfg(feature = "ml")]
mod loader {
    use std::path::Path;

    use serde::de::DeserializeOwned;
    use tracing::{info, warn};

    use super::*;
    use crate::ml::{ClassifierSpec, FittedScaler, MlpClassifier};
    use crate::model::config::{AppConfig, DeviceType};
    use crate::model::model_metadata::ArtifactMetadata;
    use crate::model::model_storage::{self, LABEL_ENCODER_ENTRY, MODEL_ENTRY, SCALER_ENTRY};

    type CpuBackend = burn_ndarray::NdArray<f32>;

    fn parse_json<T: DeserializeOwned>(json: &str, source: &Path) -> Result<T> {
        serde_json::from_str(json).map_err(|e| RecommendError::malformed(source, e.to_string()))
    }

    fn read_artifact(path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(RecommendError::ArtifactMissing(path.to_path_buf()));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_scaler(json: &str, source: &Path) -> Result<FittedScaler> {
        let scaler: FittedScaler = parse_json(json, source)?;
        scaler
            .check_consistency()
            .map_err(|reason| RecommendError::malformed(source, reason))?;
        Ok(scaler)
    }

    /// 設定されたデバイスで分類器を構築
    fn build_classifier(spec: &ClassifierSpec, device_type: &DeviceType) -> Box<dyn Classifier> {
        match device_type {
            #[cfg(feature = "gpu")]
            DeviceType::Wgpu => {
                let device = burn::backend::wgpu::WgpuDevice::default();
                Box::new(MlpClassifier::<burn::backend::Wgpu>::from_spec(spec, &device))
            }
            #[cfg(not(feature = "gpu"))]
            DeviceType::Wgpu => {
                warn!("Built without the `gpu` feature, running the classifier on CPU");
                Box::new(MlpClassifier::<CpuBackend>::from_spec(spec, &Default::default()))
            }
            DeviceType::Cpu => Box::new(MlpClassifier::<CpuBackend>::from_spec(spec, &Default::default())),
        }
    }

    impl CropArtifacts {
        /// 設定に従って成果物を読み込む（バンドル指定があればそちらを優先）
        pub fn load(config: &AppConfig) -> Result<Self> {
            match config.artifacts.bundle_path {
                Some(ref bundle) => Self::load_bundle(Path::new(bundle), &config.device_type),
                None => Self::load_files(
                    Path::new(&config.artifacts.model_path),
                    Path::new(&config.artifacts.scaler_path),
                    Path::new(&config.artifacts.label_encoder_path),
                    &config.device_type,
                ),
            }
        }

        /// 個別のJSONファイルから読み込む
        pub fn load_files(
            model_path: &Path,
            scaler_path: &Path,
            encoder_path: &Path,
            device_type: &DeviceType,
        ) -> Result<Self> {
            let spec = ClassifierSpec::load(model_path)?;
            let scaler = parse_scaler(&read_artifact(scaler_path)?, scaler_path)?;
            let encoder: LabelEncoder = parse_json(&read_artifact(encoder_path)?, encoder_path)?;

            info!(
                model = %model_path.display(),
                scaler = %scaler_path.display(),
                encoder = %encoder_path.display(),
                classes = encoder.len(),
                "artifacts loaded"
            );

            Self::new(
                build_classifier(&spec, device_type),
                Box::new(scaler),
                encoder,
                model_path.display().to_string(),
            )
        }

        /// tar.gzバンドルから読み込む
        pub fn load_bundle(bundle_path: &Path, device_type: &DeviceType) -> Result<Self> {
            if !bundle_path.exists() {
                return Err(RecommendError::ArtifactMissing(bundle_path.to_path_buf()));
            }
            let bundle = model_storage::load_artifact_bundle(bundle_path)
                .map_err(|e| RecommendError::malformed(bundle_path, format!("{:#}", e)))?;

            let spec = ClassifierSpec::from_json_str(&bundle.model_json, &bundle_path.join(MODEL_ENTRY))?;
            let scaler = parse_scaler(&bundle.scaler_json, &bundle_path.join(SCALER_ENTRY))?;
            let encoder: LabelEncoder =
                parse_json(&bundle.label_encoder_json, &bundle_path.join(LABEL_ENCODER_ENTRY))?;

            // メタデータとエンコーダーが同じ学習から来ているか確認
            if bundle.metadata.class_labels != encoder.classes() {
                return Err(RecommendError::malformed(
                    bundle_path,
                    "metadata class labels differ from the label encoder",
                ));
            }
            check_feature_order(&bundle.metadata.feature_names)?;

            info!(
                bundle = %bundle_path.display(),
                exported_at = %bundle.metadata.exported_at,
                classes = encoder.len(),
                "artifact bundle loaded"
            );

            Self::new(
                build_classifier(&spec, device_type),
                Box::new(scaler),
                encoder,
                bundle_path.display().to_string(),
            )
        }
    }

    /// 個別の成果物ファイルを検証してからバンドルにまとめる
    ///
    /// 保存先のパスを返します。
    pub fn bundle_artifact_files(
        model_path: &Path,
        scaler_path: &Path,
        encoder_path: &Path,
        output_path: &Path,
        source: Option<String>,
    ) -> anyhow::Result<std::path::PathBuf> {
        // 推論できる組み合わせかを先に確認する
        let artifacts = CropArtifacts::load_files(model_path, scaler_path, encoder_path, &DeviceType::Cpu)?;
        let spec = ClassifierSpec::load(model_path)?;

        let hidden_layers = spec
            .layers
            .iter()
            .take(spec.layers.len().saturating_sub(1))
            .map(|layer| layer.units())
            .collect();

        let bundle = model_storage::ArtifactBundle {
            metadata: ArtifactMetadata::new(artifacts.encoder().classes().to_vec(), hidden_layers, source),
            model_json: std::fs::read_to_string(model_path)?,
            scaler_json: std::fs::read_to_string(scaler_path)?,
            label_encoder_json: std::fs::read_to_string(encoder_path)?,
        };

        let saved = model_storage::save_artifact_bundle(output_path, &bundle)?;
        info!(bundle = %saved.display(), "artifact bundle written");
        Ok(saved)
    }
}

#[cfg(feature = "ml")]
pub use loader::bundle_artifact_files;


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::ml::inference::stub::StubClassifier;
    use crate::ml::FittedScaler;

    #[test]
    fn test_valid_artifacts() {
        let artifacts = CropArtifacts::new(
            Box::new(StubClassifier::with_classes(22)),
            Box::new(crop_scaler()),
            crop_encoder(),
            "memory",
        )
        .unwrap();
        let info = artifacts.info();
        assert_eq!(info.class_labels.len(), 22);
        assert_eq!(info.feature_names[0], "N");
    }

    #[test]
    fn test_class_count_mismatch() {
        let result = CropArtifacts::new(
            Box::new(StubClassifier::with_classes(21)),
            Box::new(crop_scaler()),
            crop_encoder(),
            "memory",
        );
        assert!(matches!(
            result,
            Err(RecommendError::ShapeMismatch { stage: "classifier classes", expected: 22, actual: 21 })
        ));
    }

    #[test]
    fn test_scaler_feature_count_mismatch() {
        let scaler = FittedScaler::Standard {
            mean: vec![0.0; 6],
            scale: vec![1.0; 6],
            feature_names: None,
        };
        let result = CropArtifacts::new(
            Box::new(StubClassifier::with_classes(22)),
            Box::new(scaler),
            crop_encoder(),
            "memory",
        );
        assert!(matches!(result, Err(RecommendError::ShapeMismatch { stage: "scaler features", .. })));
    }

    #[test]
    fn test_reordered_feature_names_rejected() {
        let mut scaler = crop_scaler();
        if let FittedScaler::Standard { feature_names: Some(ref mut names), .. } = scaler {
            names.swap(4, 5);
        }
        let result = CropArtifacts::new(
            Box::new(StubClassifier::with_classes(22)),
            Box::new(scaler),
            crop_encoder(),
            "memory",
        );
        assert!(matches!(result, Err(RecommendError::FeatureOrder { .. })));
    }

    #[test]
    fn test_empty_encoder_rejected() {
        let result = CropArtifacts::new(
            Box::new(StubClassifier::with_classes(0)),
            Box::new(crop_scaler()),
            crate::model::LabelEncoder::new(vec![]),
            "memory",
        );
        assert!(matches!(result, Err(RecommendError::EmptyEncoder)));
    }
}
