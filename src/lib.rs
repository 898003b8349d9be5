pub mod types;
pub mod error;
pub mod logging;
pub mod ml;
pub mod model;
pub mod presenter;
pub mod pipeline;
#[cfg(feature = "desktop")]
mod commands;

pub use error::{RecommendError, Result};
pub use pipeline::CropAdvisor;
pub use types::{FeatureVector, FieldReadings};

#[cfg(feature = "desktop")]
pub use commands::AppState;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Mutex;
    use tauri::Manager;
    use tracing::{error, info};

    use crate::model::AppConfig;

    if let Err(e) = logging::init_logging(false) {
        eprintln!("{e}");
    }

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            // 保存先はユーザーごとの設定ディレクトリ。初回のみカレントの設定を引き継ぐ
            let config_path = app.path().app_config_dir()?.join(AppConfig::FILE_NAME);
            let config = if config_path.exists() {
                AppConfig::load_or_default_from(&config_path)
            } else {
                AppConfig::load_or_default()
            };
            config.display();

            // 成果物が読めなければ起動を中止する
            let advisor = CropAdvisor::load(&config).map_err(|e| {
                error!("Failed to load model artifacts: {e}");
                Box::new(e) as Box<dyn std::error::Error>
            })?;
            info!(classes = advisor.model_info().class_labels.len(), "AgriSmart ready");

            app.manage(AppState {
                advisor: Mutex::new(advisor),
                config: Mutex::new(config),
                config_path,
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_default_readings,
            commands::get_placeholder_message,
            commands::recommend_crop,
            commands::save_report,
            commands::get_model_info,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        error!("error while running tauri application: {e}");
        std::process::exit(1);
    }
}
