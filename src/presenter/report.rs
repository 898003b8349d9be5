//! ダウンロード用のテキストレポート

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::ml::TopPredictions;
use crate::presenter::crop::{title_case, Crop};
use crate::types::FieldReadings;

pub const REPORT_MIME_TYPE: &str = "text/plain";

const RULE: &str = "-----------------------------------------";

/// 生成済みのレポート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestReport {
    /// `AgriSmart_<作物名小文字>_report.txt`
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

/// レポートのファイル名
pub fn report_file_name(crop_label: &str) -> String {
    format!("AgriSmart_{}_report.txt", crop_label.to_lowercase())
}

/// 入力値を表示用に整形（整数値でも小数点以下1桁を残す）
pub fn format_reading(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// レポートを作成
///
/// `generated_at` は表示時刻（分単位で記載）。
pub fn build_report(readings: &FieldReadings, top: &TopPredictions, generated_at: &NaiveDateTime) -> HarvestReport {
    let best = top.best();
    let advice = Crop::from_label(&best.label).advice();
    let second_best = match top.runner_up() {
        Some(second) => format!("{} ({:.1}%)", title_case(&second.label), second.confidence),
        None => "n/a".to_string(),
    };

    let lines = [
        "AGRISMART AI - CROP RECOMMENDATION REPORT".to_string(),
        format!("Date: {}", generated_at.format("%Y-%m-%d %H:%M")),
        RULE.to_string(),
        "FIELD DATA PROVIDED:".to_string(),
        format!("- Nitrogen (N): {}", readings.nitrogen),
        format!("- Phosphorus (P): {}", readings.phosphorus),
        format!("- Potassium (K): {}", readings.potassium),
        format!("- Temperature: {}C", format_reading(readings.temperature)),
        format!("- Humidity: {}%", format_reading(readings.humidity)),
        format!("- Soil pH: {}", format_reading(readings.ph)),
        format!("- Rainfall: {}mm", format_reading(readings.rainfall)),
        String::new(),
        "AI RECOMMENDATION:".to_string(),
        format!("- Recommended Crop: {}", best.label.to_uppercase()),
        format!("- AI Confidence: {:.1}%", best.confidence),
        format!("- Second Best: {}", second_best),
        String::new(),
        "EXPERT ADVICE:".to_string(),
        advice.to_string(),
        RULE.to_string(),
        "Generated by AgriSmart Intelligence".to_string(),
    ];

    HarvestReport {
        file_name: report_file_name(&best.label),
        mime_type: REPORT_MIME_TYPE.to_string(),
        contents: lines.join("\n") + "\n",
    }
}
