//! ゲージと棒グラフの描画仕様
//!
//! 描画そのものはフロントエンド（SVG）とCLI（テキスト）が行い、ここでは
//! 値・範囲・色だけを決めます。

use serde::Serialize;

use crate::ml::TopPredictions;
use crate::presenter::crop::title_case;

/// ゲージの帯
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeStep {
    pub from: f32,
    pub to: f32,
    pub color: &'static str,
}

/// 確信度ゲージ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeChart {
    pub title: &'static str,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub bar_color: &'static str,
    pub steps: Vec<GaugeStep>,
    /// 値が入る帯の色（上限値は最後の帯）
    pub band_color: &'static str,
    /// 値が入る帯の番号（0: 低, 1: 中, 2: 高）
    pub band: usize,
}

impl GaugeChart {
    pub fn new(confidence: f32) -> Self {
        let steps = vec![
            GaugeStep { from: 0.0, to: 50.0, color: "#ffcccb" },
            GaugeStep { from: 50.0, to: 80.0, color: "#fff9c4" },
            GaugeStep { from: 80.0, to: 100.0, color: "#c8e6c9" },
        ];
        let band = steps
            .iter()
            .position(|s| confidence >= s.from && confidence < s.to)
            .unwrap_or(steps.len() - 1);

        Self {
            title: "AI Confidence %",
            value: confidence,
            min: 0.0,
            max: 100.0,
            bar_color: "#2e7d32",
            band_color: steps[band].color,
            band,
            steps,
        }
    }
}

/// 棒グラフの1本
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f32,
    /// `87.3%` 形式
    pub text: String,
    pub color: &'static str,
}

/// 上位候補の横棒グラフ（先頭が最上段）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub x_max: f32,
    pub bars: Vec<Bar>,
}

const BAR_COLORS: [&str; 3] = ["#1b5e20", "#66bb6a", "#a5d6a7"];

impl BarChart {
    pub fn new(top: &TopPredictions) -> Self {
        let bars = top
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| Bar {
                label: title_case(&entry.label),
                value: entry.confidence,
                text: format!("{:.1}%", entry.confidence),
                color: BAR_COLORS[i.min(BAR_COLORS.len() - 1)],
            })
            .collect();

        Self {
            title: "Alternative Crop Suitability",
            x_max: 110.0,
            bars,
        }
    }
}

/// 端末向けの簡易表示
pub fn render_text(gauge: &GaugeChart, bars: &BarChart) -> String {
    const WIDTH: usize = 40;
    let fill = |value: f32, max: f32| -> usize {
        let ratio = (value / max).clamp(0.0, 1.0);
        (ratio * WIDTH as f32).round() as usize
    };

    const BAND_NAMES: [&str; 3] = ["low", "medium", "high"];

    let mut out = String::new();
    let filled = fill(gauge.value, gauge.max);
    out.push_str(&format!(
        "{}\n[{}{}] {:.1}% ({})\n\n{}\n",
        gauge.title,
        "#".repeat(filled),
        ".".repeat(WIDTH - filled),
        gauge.value,
        BAND_NAMES[gauge.band.min(BAND_NAMES.len() - 1)],
        bars.title
    ));

    let label_width = bars.bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for bar in &bars.bars {
        out.push_str(&format!(
            "{:<width$} {} {}\n",
            bar.label,
            "=".repeat(fill(bar.value, bars.x_max)),
            bar.text,
            width = label_width
        ));
    }
    out
}
