//! 土壌pHの注意表示
//!
//! モデル出力ではなく入力されたpHそのものに対する閾値判定です。

use serde::Serialize;

/// これ未満は酸性として注意
pub const ACIDIC_BELOW: f64 = 5.5;
/// これを超えるとアルカリ性として注意
pub const ALKALINE_ABOVE: f64 = 7.5;

/// 土壌改良の注意
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilNote {
    Acidic,
    Alkaline,
}

impl SoilNote {
    /// pHから注意を判定（5.5以上7.5以下は注意なし）
    pub fn from_ph(ph: f64) -> Option<Self> {
        if ph < ACIDIC_BELOW {
            Some(SoilNote::Acidic)
        } else if ph > ALKALINE_ABOVE {
            Some(SoilNote::Alkaline)
        } else {
            None
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SoilNote::Acidic => {
                "⚠️ Soil Note: Your pH is quite acidic. Consider adding lime to improve nutrient uptake."
            }
            SoilNote::Alkaline => {
                "⚠️ Soil Note: Your soil is alkaline. Consider adding organic mulch to balance it."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ph_boundaries() {
        assert_eq!(SoilNote::from_ph(5.4), Some(SoilNote::Acidic));
        assert_eq!(SoilNote::from_ph(5.5), None);
        assert_eq!(SoilNote::from_ph(6.5), None);
        assert_eq!(SoilNote::from_ph(7.5), None);
        assert_eq!(SoilNote::from_ph(7.6), Some(SoilNote::Alkaline));
    }

    #[test]
    fn test_messages_name_the_amendment() {
        assert!(SoilNote::Acidic.message().contains("lime"));
        assert!(SoilNote::Alkaline.message().contains("organic mulch"));
    }
}
