//! Amount parsing for mixed Thai-word / digit text.
//!
//! Speech recognition hands us things like `"กาแฟ 1, 520 บาท"`,
//! `"ห้าแสน"`, `"2 พัน 5 ร้อย"` or `"ยี่สิบเอ็ด"`. [`parse_amount`] turns
//! all of these into a single number using the traditional Thai magnitude
//! words:
//!
//! | word   | value     |
//! |--------|-----------|
//! | สิบ    | 10        |
//! | ร้อย   | 100       |
//! | พัน    | 1,000     |
//! | หมื่น  | 10,000    |
//! | แสน    | 100,000   |
//! | ล้าน   | 1,000,000 |
//!
//! Digit words map 0–9 (plus สิบ = 10); "เอ็ด" and "ยี่" are the compound
//! forms of one and two ("ยี่สิบเอ็ด" = 21) and resolve to the same values.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// ---------------------------------------------------------------------------
// Word tables
// ---------------------------------------------------------------------------

/// Words that contain a digit word but are not numbers ("สามารถ" able-to
/// contains "สาม" three). Blanked before any digit-word scanning.
pub static BLOCKED_WORDS: &[&str] = &[
    "สามารถ", // able to
    "สามี",   // husband
    "สามล้อ", // tricycle
    "ห้าง",   // department store
    "ห้าม",   // forbid
    "เก้าอี้", // chair
    "หกล้ม",  // fall over
    "สองแถว", // songthaew
    "พันธ",   // breed, alliance
    "แสนดี",  // very good
    "ล้านนา", // Lanna
];

/// Digit words, including the compound forms of one and two.
pub static DIGIT_WORDS: &[(&str, f64)] = &[
    ("ศูนย์", 0.0),
    ("หนึ่ง", 1.0),
    ("เอ็ด", 1.0),
    ("สอง", 2.0),
    ("ยี่", 2.0),
    ("สาม", 3.0),
    ("สี่", 4.0),
    ("ห้า", 5.0),
    ("หก", 6.0),
    ("เจ็ด", 7.0),
    ("แปด", 8.0),
    ("เก้า", 9.0),
    ("สิบ", 10.0),
];

/// Magnitude words, largest first (the order pass B consumes them in).
pub static MAGNITUDE_WORDS: &[(&str, f64)] = &[
    ("ล้าน", 1_000_000.0),
    ("แสน", 100_000.0),
    ("หมื่น", 10_000.0),
    ("พัน", 1_000.0),
    ("ร้อย", 100.0),
    ("สิบ", 10.0),
];

/// How far (in characters) pass B looks back for a multiplier.
const LOOKBACK_CHARS: usize = 10;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static SPLIT_THOUSANDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)\s*,\s*(\d)").unwrap());
static PURE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static DIGITS_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(ล้าน|แสน|หมื่น|พัน|ร้อย|สิบ)").unwrap()
});
static AMOUNT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\s*,\s*\d+)*(?:\.\d+)?").unwrap());

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse the numeric quantity in `text`; `0.0` when there is none.
///
/// Never fails. Bare digit groups and leftover digit words are summed, so
/// `"สองพันห้าร้อย"` is 2,500 and `"ยี่สิบเอ็ด"` is 21.
///
/// ```
/// use voice_ledger::nlp::parse_amount;
///
/// assert_eq!(parse_amount("1,520 บาท"), 1520.0);
/// assert_eq!(parse_amount("ห้าแสน"), 500_000.0);
/// assert_eq!(parse_amount("coffee 50 baht"), 50.0);
/// assert_eq!(parse_amount("ไม่มีตัวเลข"), 0.0);
/// ```
pub fn parse_amount(text: &str) -> f64 {
    // 1. Blocked words
    let mut s = thai_digits_to_ascii(text);
    for word in BLOCKED_WORDS {
        if s.contains(word) {
            s = s.replace(word, " ");
        }
    }

    // 2. Thousands-separator healing ("1, 520" → "1520"), then stray commas
    s = SPLIT_THOUSANDS.replace_all(&s, "$1$2").into_owned();
    s = s.replace(',', "");

    // 3. Fast path
    let trimmed = s.trim();
    if PURE_NUMBER.is_match(trimmed) {
        return trimmed.parse().unwrap_or(0.0);
    }

    // 4A. "<digits> <unit>"
    let mut total = 0.0;
    s = DIGITS_WITH_UNIT
        .replace_all(&s, |caps: &Captures| {
            let digits: f64 = caps[1].parse().unwrap_or(0.0);
            total += digits * magnitude_value(&caps[2]);
            " ".to_string()
        })
        .into_owned();

    // 4B. "<digit word>? <magnitude word>"
    total += take_word_magnitudes(&mut s);

    // 5. Leftovers
    total += take_bare_digits(&mut s);
    total += take_digit_words(&mut s);

    total
}

/// Remove every amount-looking fragment (digit groups and Thai numeral
/// words) from `text`, leaving blocked words such as "ห้าง" intact.
///
/// Used to derive a description from an utterance.
pub fn strip_amounts(text: &str) -> String {
    let mut s = thai_digits_to_ascii(text);

    // Park blocked words behind private-use placeholders so the numeral
    // words inside them survive.
    let mut parked: Vec<(char, &str)> = Vec::new();
    for (i, word) in BLOCKED_WORDS.iter().enumerate() {
        if s.contains(word) {
            let Some(marker) = char::from_u32(0xE100 + i as u32) else {
                continue;
            };
            s = s.replace(word, &marker.to_string());
            parked.push((marker, *word));
        }
    }

    s = AMOUNT_TOKEN.replace_all(&s, " ").into_owned();
    for (word, _) in MAGNITUDE_WORDS.iter().chain(DIGIT_WORDS) {
        s = s.replace(word, " ");
    }

    for (marker, word) in parked {
        s = s.replace(marker, word);
    }
    s
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// `๑๒๓` → `123`.
fn thai_digits_to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0E50}'..='\u{0E59}' => {
                char::from_digit(c as u32 - 0x0E50, 10).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

fn magnitude_value(word: &str) -> f64 {
    MAGNITUDE_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map_or(0.0, |(_, v)| *v)
}

/// Pass B. For every magnitude word, largest first, find the nearest digit
/// word in the preceding [`LOOKBACK_CHARS`] characters (multiplier 1 when
/// there is none), add the product and blank both tokens.
fn take_word_magnitudes(s: &mut String) -> f64 {
    let mut total = 0.0;
    for &(word, value) in MAGNITUDE_WORDS {
        while let Some(pos) = s.find(word) {
            let window_start = back_chars(s, pos, LOOKBACK_CHARS);
            let multiplier = nearest_digit_word(&s[window_start..pos])
                .map(|(start, len, v)| (window_start + start, len, v));

            // Blank the later token first so the earlier offsets stay valid.
            s.replace_range(pos..pos + word.len(), " ");
            match multiplier {
                Some((start, len, digit)) => {
                    s.replace_range(start..start + len, " ");
                    total += digit * value;
                }
                None => total += value,
            }
        }
    }
    total
}

/// Byte offset `n` characters before `pos` (clamped at 0).
fn back_chars(s: &str, pos: usize, n: usize) -> usize {
    s[..pos]
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map_or(0, |(i, _)| i)
}

/// Digit word ending closest to the end of `window`:
/// `(byte start, byte len, value)`.
fn nearest_digit_word(window: &str) -> Option<(usize, usize, f64)> {
    DIGIT_WORDS
        .iter()
        .filter_map(|&(word, value)| window.rfind(word).map(|start| (start, word.len(), value)))
        .max_by(|a, b| (a.0 + a.1).cmp(&(b.0 + b.1)).then(a.1.cmp(&b.1)))
}

fn take_bare_digits(s: &mut String) -> f64 {
    let total = DIGITS
        .find_iter(s)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .sum();
    *s = DIGITS.replace_all(s, " ").into_owned();
    total
}

fn take_digit_words(s: &mut String) -> f64 {
    let mut total = 0.0;
    for &(word, value) in DIGIT_WORDS {
        let count = s.matches(word).count();
        if count > 0 {
            total += value * count as f64;
            *s = s.replace(word, " ");
        }
    }
    total
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
