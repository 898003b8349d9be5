//! アプリケーション設定管理モジュール
//!
//! 計算デバイスや成果物のパスなどをJSON形式で保存・読み込みします。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::types::FieldReadings;

/// 計算デバイスの種類
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DeviceType {
    /// WGPU (GPU) バックエンド
    Wgpu,
    /// NdArray (CPU) バックエンド
    Cpu,
}

impl Default for DeviceType {
    fn default() -> Self {
        // 7入力の小さなネットワークなのでCPUで十分
        DeviceType::Cpu
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Wgpu => write!(f, "WGPU (GPU)"),
            DeviceType::Cpu => write!(f, "CPU (NdArray)"),
        }
    }
}

/// 成果物ファイルの設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSettings {
    /// 分類器ファイルのパス
    pub model_path: String,
    /// スケーラーファイルのパス
    pub scaler_path: String,
    /// ラベルエンコーダーファイルのパス
    pub label_encoder_path: String,
    /// バンドル（tar.gz）のパス。指定時は個別ファイルより優先
    #[serde(default)]
    pub bundle_path: Option<String>,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            model_path: "models/crop_ann_model.json".to_string(),
            scaler_path: "models/crop_scaler.json".to_string(),
            label_encoder_path: "models/crop_label_encoder.json".to_string(),
            bundle_path: None,
        }
    }
}

/// レポート出力の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// レポートの保存先ディレクトリ
    pub output_dir: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: "reports".to_string(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 計算デバイスの種類
    #[serde(default)]
    pub device_type: DeviceType,
    /// 成果物設定
    #[serde(default)]
    pub artifacts: ArtifactSettings,
    /// レポート設定
    #[serde(default)]
    pub report: ReportSettings,
    /// 最後に入力した圃場データ（フォームの初期値に使用）
    #[serde(default)]
    pub last_readings: Option<FieldReadings>,
}

impl AppConfig {
    /// 設定ファイル名
    pub const FILE_NAME: &'static str = "agrismart.config.json";

    /// 設定ファイルのデフォルトパス（カレントディレクトリ）
    pub fn default_path() -> PathBuf {
        PathBuf::from(Self::FILE_NAME)
    }

    /// 設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 指定パスから設定を読み込む、存在しない場合はデフォルト設定を返す
    pub fn load_or_default_from(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to read config ({}): {}", path.display(), e);
                    warn!("Falling back to default settings");
                    Self::default()
                }
            }
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default()
        }
    }

    /// デフォルトパスから設定を読み込む
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::default_path())
    }

    /// 設定を保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// コマンドライン引数で設定を上書き（ファイルには書き戻さない）
    pub fn apply_overrides(&mut self, device_type: Option<DeviceType>, bundle: Option<&Path>) {
        if let Some(device_type) = device_type {
            info!(device = %device_type, "device overridden");
            self.device_type = device_type;
        }
        if let Some(bundle) = bundle {
            info!(bundle = %bundle.display(), "artifact bundle overridden");
            self.artifacts.bundle_path = Some(bundle.display().to_string());
        }
    }

    /// 最後に使用した入力値を更新
    pub fn update_last_readings(&mut self, readings: FieldReadings) {
        self.last_readings = Some(readings);
    }

    /// 入力値を記録して指定パスに保存
    ///
    /// 親ディレクトリがなければ作成します。
    pub fn remember_readings(&mut self, readings: FieldReadings, path: &Path) -> anyhow::Result<()> {
        self.update_last_readings(readings);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        self.save(path)?;
        debug!("Saved config: {}", path.display());
        Ok(())
    }

    /// フォームの初期値（前回値がなければ既定値）
    pub fn initial_readings(&self) -> FieldReadings {
        self.last_readings.unwrap_or_default()
    }

    /// 設定情報を表示
    pub fn display(&self) {
        println!("=== AgriSmart settings ===");
        println!("Device: {}", self.device_type);
        match self.artifacts.bundle_path {
            Some(ref bundle) => println!("Artifact bundle: {}", bundle),
            None => {
                println!("Model: {}", self.artifacts.model_path);
                println!("Scaler: {}", self.artifacts.scaler_path);
                println!("Label encoder: {}", self.artifacts.label_encoder_path);
            }
        }
        println!("Report directory: {}", self.report.output_dir);
        println!("==========================\n");
    }
}
