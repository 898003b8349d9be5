//! 成果物バンドルの永続化
//!
//! Tar.gz形式で分類器・スケーラー・ラベルエンコーダーとメタデータを
//! 1ファイルに統合して保存・読み込みします。
//!
//! ファイル構成（tar.gz内部）:
//! - metadata.json      - メタデータ（特徴量の並び、クラスラベルなど）
//! - model.json         - 分類器の重み
//! - scaler.json        - スケーラーの統計量
//! - label_encoder.json - クラスラベル

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};

use crate::model::model_metadata::ArtifactMetadata;

pub const METADATA_ENTRY: &str = "metadata.json";
pub const MODEL_ENTRY: &str = "model.json";
pub const SCALER_ENTRY: &str = "scaler.json";
pub const LABEL_ENCODER_ENTRY: &str = "label_encoder.json";

/// バンドルの中身（各成果物はJSON文字列のまま保持）
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub metadata: ArtifactMetadata,
    pub model_json: String,
    pub scaler_json: String,
    pub label_encoder_json: String,
}

fn append_entry<W: std::io::Write>(builder: &mut Builder<W>, name: &str, bytes: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_path(name)?;
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append(&header, bytes)
        .with_context(|| format!("Failed to add {} to tar", name))
}

/// バンドルをTar.gz形式で保存
///
/// 保存先のパスを返します（拡張子がない場合は `.tar.gz` を付加）。
pub fn save_artifact_bundle(output_path: &Path, bundle: &ArtifactBundle) -> Result<PathBuf> {
    // output_pathがすでに.gzで終わっている場合はそのまま、そうでなければ拡張子を追加
    let tar_gz_path = if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("tar.gz")
    };

    if let Some(parent) = tar_gz_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tar_gz_file = File::create(&tar_gz_path)
        .with_context(|| format!("Failed to create tar.gz file: {:?}", tar_gz_path))?;

    let encoder = GzEncoder::new(tar_gz_file, Compression::default());
    let mut tar_builder = Builder::new(encoder);

    let json_str = bundle.metadata.to_json_string()?;
    append_entry(&mut tar_builder, METADATA_ENTRY, json_str.as_bytes())?;
    append_entry(&mut tar_builder, MODEL_ENTRY, bundle.model_json.as_bytes())?;
    append_entry(&mut tar_builder, SCALER_ENTRY, bundle.scaler_json.as_bytes())?;
    append_entry(&mut tar_builder, LABEL_ENCODER_ENTRY, bundle.label_encoder_json.as_bytes())?;

    // gzipストリームまで閉じる
    tar_builder
        .into_inner()
        .context("Failed to finalize tar archive")?
        .finish()
        .context("Failed to finalize gzip stream")?;

    Ok(tar_gz_path)
}

/// Tar.gzからメタデータのみ読み込む
pub fn load_metadata(tar_gz_path: &Path) -> Result<ArtifactMetadata> {
    let tar_gz_file = File::open(tar_gz_path)
        .with_context(|| format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;

    let decoder = GzDecoder::new(tar_gz_file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        if path.to_str() == Some(METADATA_ENTRY) {
            let mut json_str = String::new();
            entry.read_to_string(&mut json_str)?;
            return ArtifactMetadata::from_json_string(&json_str);
        }
    }

    Err(anyhow::anyhow!("{} not found in tar.gz archive", METADATA_ENTRY))
}

/// Tar.gzからすべての成果物を読み込む
pub fn load_artifact_bundle(tar_gz_path: &Path) -> Result<ArtifactBundle> {
    let tar_gz_file = File::open(tar_gz_path)
        .with_context(|| format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;

    let decoder = GzDecoder::new(tar_gz_file);
    let mut archive = Archive::new(decoder);

    let mut metadata_opt: Option<ArtifactMetadata> = None;
    let mut model_opt: Option<String> = None;
    let mut scaler_opt: Option<String> = None;
    let mut encoder_opt: Option<String> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().to_string();

        let mut content = String::new();
        match name.as_str() {
            METADATA_ENTRY => {
                entry.read_to_string(&mut content)?;
                metadata_opt = Some(ArtifactMetadata::from_json_string(&content)?);
            }
            MODEL_ENTRY => {
                entry.read_to_string(&mut content)?;
                model_opt = Some(content);
            }
            SCALER_ENTRY => {
                entry.read_to_string(&mut content)?;
                scaler_opt = Some(content);
            }
            LABEL_ENCODER_ENTRY => {
                entry.read_to_string(&mut content)?;
                encoder_opt = Some(content);
            }
            _ => {}
        }
    }

    match (metadata_opt, model_opt, scaler_opt, encoder_opt) {
        (Some(metadata), Some(model_json), Some(scaler_json), Some(label_encoder_json)) => Ok(ArtifactBundle {
            metadata,
            model_json,
            scaler_json,
            label_encoder_json,
        }),
        (None, ..) => Err(anyhow::anyhow!("{} not found in tar.gz archive", METADATA_ENTRY)),
        (_, None, ..) => Err(anyhow::anyhow!("{} not found in tar.gz archive", MODEL_ENTRY)),
        (_, _, None, _) => Err(anyhow::anyhow!("{} not found in tar.gz archive", SCALER_ENTRY)),
        (.., None) => Err(anyhow::anyhow!("{} not found in tar.gz archive", LABEL_ENCODER_ENTRY)),
    }
}

/// メタデータをコンソールに表示
pub fn print_metadata_info(metadata: &ArtifactMetadata) {
    println!("\n=== Artifact metadata ===");
    println!("Features: {}", metadata.feature_names.join(", "));
    println!("Classes ({}): {}", metadata.class_labels.len(), metadata.class_labels.join(", "));
    if !metadata.hidden_layers.is_empty() {
        let widths: Vec<String> = metadata.hidden_layers.iter().map(|w| w.to_string()).collect();
        println!("Hidden layers: {}", widths.join(" -> "));
    }
    println!("Exported at: {}", metadata.exported_at);
    if let Some(ref source) = metadata.source {
        println!("Source: {}", source);
    }
    println!("=========================");
}
