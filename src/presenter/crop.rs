//! 作物ごとの表示情報（アイコンと栽培アドバイス）

/// 未知の作物に使うアイコン
pub const DEFAULT_ICON: &str = "🌱";

/// アドバイスがない作物に使う汎用メッセージ
pub const DEFAULT_ADVICE: &str = "Ensure regular soil testing and proper irrigation for best results.";

/// 既知の作物
///
/// ラベルエンコーダーの文字列から変換します。未知のラベルは `Other` になり、
/// 表示は既定のアイコンとアドバイスにフォールバックします。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crop {
    Rice,
    Maize,
    Chickpea,
    KidneyBeans,
    PigeonPeas,
    MothBeans,
    MungBean,
    BlackGram,
    Lentil,
    Pomegranate,
    Banana,
    Mango,
    Grapes,
    Watermelon,
    Muskmelon,
    Apple,
    Orange,
    Papaya,
    Coconut,
    Cotton,
    Jute,
    Coffee,
    Other,
}

impl Crop {
    /// ラベルから作物を判定（大文字小文字は無視）
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "rice" => Crop::Rice,
            "maize" => Crop::Maize,
            "chickpea" => Crop::Chickpea,
            "kidneybeans" => Crop::KidneyBeans,
            "pigeonpeas" => Crop::PigeonPeas,
            "mothbeans" => Crop::MothBeans,
            "mungbean" => Crop::MungBean,
            "blackgram" => Crop::BlackGram,
            "lentil" => Crop::Lentil,
            "pomegranate" => Crop::Pomegranate,
            "banana" => Crop::Banana,
            "mango" => Crop::Mango,
            "grapes" => Crop::Grapes,
            "watermelon" => Crop::Watermelon,
            "muskmelon" => Crop::Muskmelon,
            "apple" => Crop::Apple,
            "orange" => Crop::Orange,
            "papaya" => Crop::Papaya,
            "coconut" => Crop::Coconut,
            "cotton" => Crop::Cotton,
            "jute" => Crop::Jute,
            "coffee" => Crop::Coffee,
            _ => Crop::Other,
        }
    }

    /// 表示用アイコン
    pub fn icon(self) -> &'static str {
        match self {
            Crop::Rice => "🌾",
            Crop::Maize => "🌽",
            Crop::Chickpea => "🌱",
            Crop::KidneyBeans => "🫘",
            Crop::PigeonPeas | Crop::MothBeans | Crop::MungBean | Crop::BlackGram | Crop::Lentil => "🌿",
            Crop::Pomegranate | Crop::Apple => "🍎",
            Crop::Banana => "🍌",
            Crop::Mango | Crop::Papaya => "🥭",
            Crop::Grapes => "🍇",
            Crop::Watermelon => "🍉",
            Crop::Muskmelon => "🍈",
            Crop::Orange => "🍊",
            Crop::Coconut => "🥥",
            Crop::Cotton => "☁️",
            Crop::Jute => "🧵",
            Crop::Coffee => "☕",
            Crop::Other => DEFAULT_ICON,
        }
    }

    /// 栽培アドバイス
    pub fn advice(self) -> &'static str {
        match self {
            Crop::Rice => "Requires constant water. Maintain 2-4 inches of water depth in the field. Best in heavy clay soils.",
            Crop::Maize => "Needs high nitrogen during the vegetative stage. Ensure good drainage to avoid root rot.",
            Crop::Chickpea => "Drought-tolerant. Avoid excess water during flowering. Needs well-aerated soil.",
            Crop::KidneyBeans => "Needs moderate moisture. Very sensitive to frost and high winds.",
            Crop::PigeonPeas => "Slow-growing initially; great for soil health as it fixes nitrogen.",
            Crop::Pomegranate => "Requires hot, dry summers for fruit ripening. Prune regularly for better yield.",
            Crop::Banana => "Heavy feeder of Potassium. Needs protection from strong winds and plenty of water.",
            Crop::Mango => "Deep-rooted tree. Avoid heavy irrigation during the flowering period.",
            Crop::Grapes => "Requires a trellis system. Pruning is key to controlling fruit quality.",
            Crop::Watermelon => "Needs sandy soil and lots of space. Water heavily until fruit reaches full size.",
            Crop::Apple => "Requires 'chilling hours' in winter to produce fruit.",
            Crop::Orange => "Needs well-drained soil. Sensitive to cold; maintain consistent soil moisture.",
            Crop::Papaya => "Very fast-growing. Avoid waterlogging at all costs as the stems rot easily.",
            Crop::Coconut => "Thrives in coastal saline soils. Needs high humidity and year-round warmth.",
            Crop::Cotton => "Requires a long frost-free period and plenty of sunshine.",
            Crop::Jute => "Needs a hot and wet climate. Best grown in alluvial soil.",
            Crop::Coffee => "Grows best under a canopy of shade trees. Requires acidic soil.",
            Crop::MothBeans | Crop::MungBean | Crop::BlackGram | Crop::Lentil | Crop::Muskmelon | Crop::Other => {
                DEFAULT_ADVICE
            }
        }
    }
}

/// 単語の先頭を大文字にする（`kidneybeans` → `Kidneybeans`, `pigeon peas` → `Pigeon Peas`）
pub fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut at_word_start = true;
    for c in label.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_label_is_case_insensitive() {
        assert_eq!(Crop::from_label("Rice"), Crop::Rice);
        assert_eq!(Crop::from_label(" KIDNEYBEANS "), Crop::KidneyBeans);
        assert_eq!(Crop::from_label("rice").icon(), "🌾");
        assert!(Crop::from_label("coffee").advice().contains("shade trees"));
    }

    #[test]
    fn test_unknown_label_falls_back() {
        let crop = Crop::from_label("quinoa");
        assert_eq!(crop, Crop::Other);
        assert_eq!(crop.icon(), "🌱");
        assert_eq!(crop.advice(), DEFAULT_ADVICE);
    }

    #[test]
    fn test_known_crop_without_advice_uses_default() {
        let crop = Crop::from_label("lentil");
        assert_eq!(crop.icon(), "🌿");
        assert_eq!(crop.advice(), DEFAULT_ADVICE);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("kidneybeans"), "Kidneybeans");
        assert_eq!(title_case("pigeon peas"), "Pigeon Peas");
        assert_eq!(title_case("MUNG-bean"), "Mung-Bean");
        assert_eq!(title_case(""), "");
    }
}
