//! ダッシュボード用のTauriコマンド

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tauri::State;
use tracing::{info, warn};

use crate::model::{AppConfig, ModelInfo};
use crate::pipeline::CropAdvisor;
use crate::presenter::{Recommendation, PLACEHOLDER_MESSAGE};
use crate::types::FieldReadings;

/// アプリ全体で共有する状態
///
/// 成果物は起動時に読み込み済みで、コマンドからは読み取りのみです。
pub struct AppState {
    pub advisor: Mutex<CropAdvisor>,
    pub config: Mutex<AppConfig>,
    /// 前回の入力値を書き戻す設定ファイル
    pub config_path: PathBuf,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, String> {
    mutex.lock().map_err(|_| format!("{} state is poisoned", name))
}

/// フォームの初期値（前回の入力があればそれを使う）
#[tauri::command]
pub fn get_default_readings(state: State<AppState>) -> Result<FieldReadings, String> {
    let config = lock(&state.config, "config")?;
    Ok(config.initial_readings())
}

/// 予測前のメッセージ
#[tauri::command]
pub fn get_placeholder_message() -> &'static str {
    PLACEHOLDER_MESSAGE
}

/// 推薦を実行
#[tauri::command]
pub fn recommend_crop(readings: FieldReadings, state: State<AppState>) -> Result<Recommendation, String> {
    let recommendation = {
        let advisor = lock(&state.advisor, "advisor")?;
        advisor
            .recommend(&readings)
            .map_err(|e| format!("Recommendation failed: {}", e))?
    };

    // 次回起動時のフォーム初期値として保存（失敗しても結果は返す）
    let mut config = lock(&state.config, "config")?;
    if let Err(e) = config.remember_readings(readings.clamped(), &state.config_path) {
        warn!("Failed to save last readings to {}: {}", state.config_path.display(), e);
    }

    Ok(recommendation)
}

/// ダイアログで選ばれたパスにレポートを書き出す
#[tauri::command]
pub fn save_report(path: String, contents: String) -> Result<String, String> {
    let path = PathBuf::from(path);
    std::fs::write(&path, contents)
        .map_err(|e| format!("Failed to write report {}: {}", path.display(), e))?;
    info!(path = %path.display(), "report saved");
    Ok(path.display().to_string())
}

/// 読み込み済みモデルの情報
#[tauri::command]
pub fn get_model_info(state: State<AppState>) -> Result<ModelInfo, String> {
    let advisor = lock(&state.advisor, "advisor")?;
    Ok(advisor.model_info())
}
