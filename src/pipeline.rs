//! 入力から推薦結果までの一方向パイプライン
//!
//! 入力 → 推論 → 順位付け → 表示用データ の順に1回で処理します。
//! 成果物は起動時に一度だけ読み込んだものを保持し、以降は読み取りのみです。

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::error::Result;
use crate::ml::{rank_top, InferenceEngine, ProbabilityDistribution, TopPredictions, TOP_K};
use crate::model::{CropArtifacts, ModelInfo};
use crate::presenter::{present, Recommendation};
use crate::types::FieldReadings;

/// 作物推薦の実行単位
pub struct CropAdvisor {
    artifacts: CropArtifacts,
}

impl CropAdvisor {
    pub fn new(artifacts: CropArtifacts) -> Self {
        Self { artifacts }
    }

    /// 設定に従って成果物を読み込んで作成
    #[cfg(feature = "ml")]
    pub fn load(config: &crate::model::AppConfig) -> Result<Self> {
        Ok(Self::new(CropArtifacts::load(config)?))
    }

    pub fn model_info(&self) -> ModelInfo {
        self.artifacts.info()
    }

    /// 全クラスの確率分布
    pub fn distribution(&self, readings: &FieldReadings) -> Result<ProbabilityDistribution> {
        self.infer(&readings.clamped())
    }

    /// 上位候補のみ
    pub fn rank(&self, readings: &FieldReadings) -> Result<TopPredictions> {
        self.rank_clamped(&readings.clamped())
    }

    // 以下の2つは範囲内に収めた入力のみを受け取る
    fn infer(&self, clamped: &FieldReadings) -> Result<ProbabilityDistribution> {
        let engine = InferenceEngine::new(self.artifacts.scaler(), self.artifacts.classifier());
        engine.infer(&clamped.to_feature_vector())
    }

    fn rank_clamped(&self, clamped: &FieldReadings) -> Result<TopPredictions> {
        let distribution = self.infer(clamped)?;
        debug!(total_percent = distribution.total_percent(), "class distribution");
        rank_top(&distribution, self.artifacts.encoder(), TOP_K)
    }

    /// 現在時刻で推薦結果を作成
    pub fn recommend(&self, readings: &FieldReadings) -> Result<Recommendation> {
        self.recommend_at(readings, &Local::now().naive_local())
    }

    /// 指定時刻で推薦結果を作成（レポートの日時に使用）
    pub fn recommend_at(&self, readings: &FieldReadings, generated_at: &NaiveDateTime) -> Result<Recommendation> {
        let readings = readings.clamped();
        let top = self.rank_clamped(&readings)?;

        let best = top.best();
        info!(crop = %best.label, confidence = best.confidence, "recommendation ready");

        Ok(present(&readings, &top, generated_at))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ml::inference::stub::{FixedClassifier, StubClassifier};
    use crate::model::artifacts::fixtures::{crop_encoder, crop_scaler, CROP_CLASSES};

    fn stub_advisor() -> CropAdvisor {
        let artifacts = CropArtifacts::new(
            Box::new(StubClassifier::with_classes(CROP_CLASSES.len())),
            Box::new(crop_scaler()),
            crop_encoder(),
            "stub",
        )
        .unwrap();
        CropAdvisor::new(artifacts)
    }

    fn fixed_advisor(probabilities: Vec<f32>) -> CropAdvisor {
        let mut probs = probabilities;
        probs.resize(CROP_CLASSES.len(), 0.0);
        let artifacts = CropArtifacts::new(
            Box::new(FixedClassifier(probs)),
            Box::new(crop_scaler()),
            crop_encoder(),
            "fixed",
        )
        .unwrap();
        CropAdvisor::new(artifacts)
    }

    /// (index, label, 小数1桁の信頼度) の組
    fn summarize(top: &TopPredictions) -> Vec<(usize, String, String)> {
        top.entries()
            .iter()
            .map(|e| (e.index, e.label.clone(), format!("{:.1}", e.confidence)))
            .collect()
    }

    fn expected(rows: &[(usize, &str, &str)]) -> Vec<(usize, String, String)> {
        rows.iter().map(|&(i, l, c)| (i, l.to_string(), c.to_string())).collect()
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap().and_hms_opt(12, 30, 0).unwrap()
    }

    fn sample_readings() -> Vec<FieldReadings> {
        vec![
            FieldReadings::default(),
            FieldReadings {
                nitrogen: 90,
                phosphorus: 42,
                potassium: 43,
                temperature: 20.9,
                humidity: 82.0,
                ph: 6.5,
                rainfall: 202.9,
            },
            FieldReadings {
                nitrogen: 20,
                phosphorus: 130,
                potassium: 200,
                temperature: 22.6,
                humidity: 92.3,
                ph: 5.9,
                rainfall: 112.6,
            },
            FieldReadings {
                nitrogen: 0,
                phosphorus: 0,
                potassium: 0,
                temperature: 40.0,
                humidity: 15.0,
                ph: 8.8,
                rainfall: 30.0,
            },
        ]
    }

    #[test]
    fn test_default_readings_top_three() {
        let advisor = stub_advisor();
        let first = advisor.rank(&FieldReadings::default()).unwrap();
        assert_eq!(
            summarize(&first),
            expected(&[(12, "mango", "19.4"), (11, "maize", "17.6"), (13, "mothbeans", "16.0")])
        );

        // 別インスタンスでも同じ結果
        let other = stub_advisor().rank(&FieldReadings::default()).unwrap();
        assert_eq!(first, other);
    }

    #[test]
    fn test_top_entry_is_argmax_and_sorted() {
        let advisor = stub_advisor();
        for readings in sample_readings() {
            let distribution = advisor.distribution(&readings).unwrap();
            let top = advisor.rank(&readings).unwrap();

            assert_eq!(top.len(), TOP_K);
            assert_eq!(Some(top.best().index), distribution.argmax());
            assert!(top.entries().windows(2).all(|w| w[0].confidence >= w[1].confidence));
            assert!(top.entries().iter().all(|e| (0.0..=100.0).contains(&e.confidence)));
            assert!((distribution.total_percent() - 100.0).abs() <= 0.5);
        }
    }

    #[test]
    fn test_recommendation_with_fixed_distribution() {
        // rice=0.875, jute=0.09375, maize=0.03125
        let mut probs = vec![0.0; CROP_CLASSES.len()];
        probs[20] = 0.875;
        probs[8] = 0.09375;
        probs[11] = 0.03125;
        let advisor = fixed_advisor(probs);

        let view = advisor.recommend_at(&FieldReadings::default(), &noon()).unwrap();
        assert_eq!(view.crop, "rice");
        assert_eq!(view.display_name, "RICE");
        assert_eq!(view.icon, "🌾");
        assert!(view.celebrate);
        let labels: Vec<&str> = view.bars.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Rice", "Jute", "Maize"]);

        let report = &view.report.contents;
        assert!(report.contains("Date: 2026-06-01 12:30"));
        assert!(report.contains("- Nitrogen (N): 50"));
        assert!(report.contains("- Temperature: 25.0C"));
        assert!(report.contains("- Humidity: 60.0%"));
        assert!(report.contains("- Soil pH: 6.5"));
        assert!(report.contains("- Rainfall: 100.0mm"));
        assert!(report.contains("- Recommended Crop: RICE"));
        assert!(report.contains("- AI Confidence: 87.5%"));
        assert!(report.contains("- Second Best: Jute (9.4%)"));
        assert_eq!(view.report.file_name, "AgriSmart_rice_report.txt");
    }

    #[test]
    fn test_out_of_range_readings_are_clamped_before_inference() {
        let advisor = fixed_advisor(vec![1.0]);
        let readings = FieldReadings { ph: 19.0, humidity: 140.0, ..FieldReadings::default() };

        let view = advisor.recommend_at(&readings, &noon()).unwrap();
        assert!(view.report.contents.contains("- Soil pH: 14.0"));
        assert!(view.report.contents.contains("- Humidity: 100.0%"));
        assert_eq!(view.soil_note, Some(crate::presenter::SoilNote::Alkaline));
    }

    #[test]
    fn test_recommend_matches_rank_of_clamped_readings() {
        let advisor = stub_advisor();
        let readings = FieldReadings { nitrogen: 400, temperature: -20.0, rainfall: 900.0, ..FieldReadings::default() };

        let view = advisor.recommend_at(&readings, &noon()).unwrap();
        let top = advisor.rank(&readings.clamped()).unwrap();
        assert_eq!(view.crop, top.best().label);
        assert_eq!(advisor.rank(&readings).unwrap(), top);
        assert_eq!(advisor.distribution(&readings).unwrap(), advisor.distribution(&readings.clamped()).unwrap());
    }

    #[test]
    fn test_model_info() {
        let info = stub_advisor().model_info();
        assert_eq!(info.source, "stub");
        assert_eq!(info.class_labels.len(), 22);
    }
}

#[cfg(all(test, feature = "ml"))]
mod network_tests {
    use burn_ndarray::{NdArray, NdArrayDevice};

    use super::*;
    use crate::ml::{Activation, ClassifierSpec, DenseLayerSpec, MlpClassifier};
    use crate::model::artifacts::fixtures::{crop_encoder, crop_scaler, CROP_CLASSES};
    use crate::types::NUM_FEATURES;

    /// 固定重みの 7 → 8 → 22 ネットワーク
    fn fixed_network() -> ClassifierSpec {
        let hidden = 8;
        let classes = CROP_CLASSES.len();
        ClassifierSpec {
            input_dim: NUM_FEATURES,
            layers: vec![
                DenseLayerSpec {
                    activation: Activation::Relu,
                    kernel: (0..NUM_FEATURES)
                        .map(|i| (0..hidden).map(|j| ((i * 3 + j * 5) % 7) as f32 * 0.5 - 1.5).collect())
                        .collect(),
                    bias: (0..hidden).map(|j| j as f32 * 0.1).collect(),
                },
                DenseLayerSpec {
                    activation: Activation::Softmax,
                    kernel: (0..hidden)
                        .map(|i| (0..classes).map(|j| ((i * 7 + j * 2) % 9) as f32 * 0.1 - 0.4).collect())
                        .collect(),
                    bias: (0..classes).map(|j| (j % 5) as f32 * 0.1 + j as f32 * 0.03).collect(),
                },
            ],
        }
    }

    #[test]
    fn test_burn_network_default_readings() {
        let device = NdArrayDevice::default();
        let build = || {
            let classifier = MlpClassifier::<NdArray<f32>>::from_spec(&fixed_network(), &device);
            let artifacts =
                CropArtifacts::new(Box::new(classifier), Box::new(crop_scaler()), crop_encoder(), "fixed").unwrap();
            CropAdvisor::new(artifacts)
        };

        let advisor = build();
        let readings = FieldReadings::default();
        let distribution = advisor.distribution(&readings).unwrap();
        let top = advisor.rank(&readings).unwrap();

        assert_eq!(distribution.len(), CROP_CLASSES.len());
        assert!((distribution.total_percent() - 100.0).abs() <= 0.5);
        assert_eq!(Some(top.best().index), distribution.argmax());
        let summary: Vec<(usize, &str, String)> = top
            .entries()
            .iter()
            .map(|e| (e.index, e.label.as_str(), format!("{:.1}", e.confidence)))
            .collect();
        assert_eq!(
            summary,
            vec![
                (18, "pigeonpeas", "10.8".to_string()),
                (9, "kidneybeans", "9.1".to_string()),
                (19, "pomegranate", "7.6".to_string()),
            ]
        );
        assert_eq!(top, build().rank(&readings).unwrap());
    }
}
