//! Keyword-weighted category classification for Thai (and mixed) text.
//!
//! [`CategoryClassifier`] scores the input against every category's keyword
//! list and returns the best-scoring [`Category`]. Each matched keyword adds
//! the category's weight, plus one when the keyword is longer than three
//! characters (long keywords are rarely accidental substring hits). Ties keep
//! the category listed first; no match at all yields [`Category::Other`].

use serde::{Deserialize, Serialize};

use crate::action::Language;
use crate::nlp::lexicon::matches_keyword;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Categories the local engine can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Food,
    Transport,
    Bills,
    Health,
    Education,
    Entertainment,
    Shopping,
    Other,
}

impl Category {
    /// Label shown to the user.
    pub fn label(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (Category::Income, Language::Th) => "รายได้",
            (Category::Food, Language::Th) => "อาหาร",
            (Category::Transport, Language::Th) => "เดินทาง",
            (Category::Bills, Language::Th) => "บิล/ค่าใช้จ่ายประจำ",
            (Category::Health, Language::Th) => "สุขภาพ",
            (Category::Education, Language::Th) => "การศึกษา",
            (Category::Entertainment, Language::Th) => "บันเทิง",
            (Category::Shopping, Language::Th) => "ช้อปปิ้ง",
            (Category::Other, Language::Th) => "อื่นๆ",
            (Category::Income, Language::En) => "Income",
            (Category::Food, Language::En) => "Food",
            (Category::Transport, Language::En) => "Transport",
            (Category::Bills, Language::En) => "Bills",
            (Category::Health, Language::En) => "Health",
            (Category::Education, Language::En) => "Education",
            (Category::Entertainment, Language::En) => "Entertainment",
            (Category::Shopping, Language::En) => "Shopping",
            (Category::Other, Language::En) => "Other",
        }
    }

    /// Default icon name from the allow-list for this category.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Income => "banknote",
            Category::Food => "utensils",
            Category::Transport => "car",
            Category::Bills => "receipt",
            Category::Health => "heart-pulse",
            Category::Education => "graduation-cap",
            Category::Entertainment => "film",
            Category::Shopping => "shopping-bag",
            Category::Other => "circle",
        }
    }
}

// ---------------------------------------------------------------------------
// Static category definitions
// ---------------------------------------------------------------------------

struct CategoryConfig {
    category: Category,
    keywords: &'static [&'static str],
    /// Added per matched keyword; decisive categories weigh more.
    weight: u32,
}

static CATEGORIES: &[CategoryConfig] = &[
    CategoryConfig {
        category: Category::Income,
        keywords: &[
            "เงินเดือน", "รายได้", "โบนัส", "ได้รับเงิน", "ค่าจ้าง", "ค่าคอม", "ขายของได้", "ปันผล",
            "salary", "income", "bonus", "wage", "dividend", "refund", "เงินคืน",
        ],
        weight: 3,
    },
    CategoryConfig {
        category: Category::Food,
        keywords: &[
            "กิน", "ข้าว", "อาหาร", "กาแฟ", "ชาเย็น", "ชาไทย", "น้ำดื่ม", "ก๋วยเตี๋ยว", "หมู", "ไก่", "ย่าง",
            "ขนม", "ชานม", "บุฟเฟ่ต์", "ร้านอาหาร", "มื้อ", "pizza", "coffee", "lunch",
            "dinner", "breakfast", "food", "meal", "snack", "starbucks", "kfc",
        ],
        weight: 2,
    },
    CategoryConfig {
        category: Category::Transport,
        keywords: &[
            "รถ", "แท็กซี่", "วินมอไซค์", "bts", "mrt", "น้ำมัน", "ทางด่วน", "ค่ารถ", "รถไฟ",
            "เครื่องบิน", "grab", "bolt", "taxi", "bus", "fuel", "gas", "parking", "ที่จอดรถ",
        ],
        weight: 2,
    },
    CategoryConfig {
        category: Category::Bills,
        keywords: &[
            "ค่าไฟ", "ค่าน้ำ", "ค่าเน็ต", "อินเทอร์เน็ต", "ค่าโทรศัพท์", "ค่าเช่า", "ผ่อน",
            "บิล", "ประกัน", "ภาษี", "rent", "bill", "electricity", "internet", "insurance",
            "netflix", "spotify", "subscription",
        ],
        weight: 3,
    },
    CategoryConfig {
        category: Category::Health,
        keywords: &[
            "ยา", "หมอ", "โรงพยาบาล", "คลินิก", "ทำฟัน", "ฟิตเนส", "วิตามิน", "pharmacy",
            "hospital", "clinic", "doctor", "medicine", "gym", "dentist",
        ],
        weight: 2,
    },
    CategoryConfig {
        category: Category::Education,
        keywords: &[
            "ค่าเทอม", "หนังสือ", "เรียน", "คอร์ส", "ติว", "tuition", "course", "book",
            "school", "class",
        ],
        weight: 2,
    },
    CategoryConfig {
        category: Category::Entertainment,
        keywords: &[
            "หนัง", "คอนเสิร์ต", "เกม", "เที่ยว", "ปาร์ตี้", "เหล้า", "เบียร์", "movie",
            "cinema", "concert", "game", "party", "beer", "travel", "hotel",
        ],
        weight: 2,
    },
    CategoryConfig {
        category: Category::Shopping,
        keywords: &[
            "ซื้อ", "เสื้อ", "รองเท้า", "กระเป๋า", "ของใช้", "ช้อป", "ห้าง", "shopee",
            "lazada", "เซเว่น", "7-11", "shopping", "clothes", "shoes", "bag", "mall",
        ],
        weight: 1,
    },
];

/// Keywords longer than this (in characters) earn a +1 bonus.
const LONG_KEYWORD_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// CategoryClassifier
// ---------------------------------------------------------------------------

/// Scores text against the weighted keyword table.
///
/// # Example
/// ```rust
/// use voice_ledger::nlp::{Category, CategoryClassifier};
///
/// let classifier = CategoryClassifier::new();
/// assert_eq!(classifier.classify("ข้าวมันไก่ 45 บาท"), Category::Food);
/// assert_eq!(classifier.classify(""), Category::Other);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CategoryClassifier;

impl CategoryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Best-matching category for `text`, [`Category::Other`] when nothing
    /// matches.
    pub fn classify(&self, text: &str) -> Category {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Category::Other;
        }

        let mut best = Category::Other;
        let mut best_score = 0;
        for config in CATEGORIES {
            let score = score(&text, config);
            // Strictly greater: ties keep the earlier category.
            if score > best_score {
                best = config.category;
                best_score = score;
            }
        }
        log::debug!("category: {best:?} (score {best_score})");
        best
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn score(text: &str, config: &CategoryConfig) -> u32 {
    config
        .keywords
        .iter()
        .filter(|kw| matches_keyword(text, kw))
        .map(|kw| {
            if kw.chars().count() > LONG_KEYWORD_CHARS {
                config.weight + 1
            } else {
                config.weight
            }
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
