//! 推論結果の表示用データ
//!
//! ここには業務ロジックはなく、上位予測と入力値から画面・レポートの内容を組み立てます。

pub mod charts;
pub mod crop;
pub mod report;
pub mod soil;

pub use charts::{render_text, Bar, BarChart, GaugeChart, GaugeStep};
pub use crop::{title_case, Crop, DEFAULT_ADVICE, DEFAULT_ICON};
pub use report::{build_report, format_reading, report_file_name, HarvestReport, REPORT_MIME_TYPE};
pub use soil::SoilNote;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::ml::{RankedCrop, TopPredictions};
use crate::types::FieldReadings;

/// これを超える確信度でお祝い表示
pub const CELEBRATION_THRESHOLD: f32 = 80.0;

/// 予測前に表示するメッセージ
pub const PLACEHOLDER_MESSAGE: &str =
    "👈 Enter your field data and click the green button to see the AI's suggestion.";

/// 画面に表示する推薦結果
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// エンコーダーのラベル
    pub crop: String,
    /// 大文字表記
    pub display_name: String,
    pub icon: &'static str,
    /// 最有力候補の確信度（パーセント）
    pub confidence: f32,
    pub headline: String,
    pub top: Vec<RankedCrop>,
    pub gauge: GaugeChart,
    pub bars: BarChart,
    /// 次点がある場合のみ
    pub alternative_note: Option<String>,
    pub advice_title: String,
    pub advice: &'static str,
    pub soil_note: Option<SoilNote>,
    pub soil_message: Option<&'static str>,
    pub report: HarvestReport,
    pub celebrate: bool,
}

/// 次点候補の案内文
pub fn alternative_note(second: &RankedCrop) -> String {
    format!(
        "🧐 Scientist's Note: Your soil is also {:.1}% suitable for {}. Small adjustments to your nutrients could make this a viable second option!",
        second.confidence,
        title_case(&second.label)
    )
}

/// 表示内容を組み立てる
pub fn present(readings: &FieldReadings, top: &TopPredictions, generated_at: &NaiveDateTime) -> Recommendation {
    let best = top.best();
    let crop = Crop::from_label(&best.label);
    let soil_note = SoilNote::from_ph(readings.ph);

    Recommendation {
        crop: best.label.clone(),
        display_name: best.label.to_uppercase(),
        icon: crop.icon(),
        confidence: best.confidence,
        headline: format!(
            "Our Neural Network is {:.1}% confident in this recommendation.",
            best.confidence
        ),
        top: top.entries().to_vec(),
        gauge: GaugeChart::new(best.confidence),
        bars: BarChart::new(top),
        alternative_note: top.runner_up().map(alternative_note),
        advice_title: format!("Pro Tip for {}", title_case(&best.label)),
        advice: crop.advice(),
        soil_note,
        soil_message: soil_note.map(SoilNote::message),
        report: build_report(readings, top, generated_at),
        celebrate: best.confidence > CELEBRATION_THRESHOLD,
    }
}
