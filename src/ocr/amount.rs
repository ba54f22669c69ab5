//! Transaction-amount extraction from noisy slip / receipt OCR text.
//!
//! "Largest number on the page" does not work on bank slips: the remaining
//! balance is almost always larger than the transfer itself. Instead the
//! extractor:
//!
//! 1. records signed decimals (`+1,250.00`, `-80.00`) as top-tier
//!    candidates, since slips print the delta with a sign,
//! 2. removes thousands separators and currency symbols,
//! 3. masks times, dates, long reference numbers and masked account
//!    numbers so they can never be read as amounts,
//! 4. looks for total-like keywords in two priority tiers and reads the
//!    first decimal number in the window after each one, ignoring keywords
//!    that sit next to balance/change phrases,
//! 5. filters and ranks the candidates, and
//! 6. falls back to the largest plausible number outside balance/change
//!    lines when no keyword matched.

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{OcrConfig, TieBreak};

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

/// Phrases that introduce the authoritative transaction total.
static PRIMARY_KEYWORDS: &[&str] = &[
    "โอนเงินสำเร็จ",
    "ทำรายการสำเร็จ",
    "ชำระเงินสำเร็จ",
    "จำนวนเงินที่โอน",
    "ยอดสุทธิ",
    "ยอดชำระ",
    "รวมทั้งสิ้น",
    "transfer successful",
    "successful transfer",
    "payment successful",
    "grand total",
    "net amount",
    "total amount",
    "amount paid",
];

/// Phrases that usually, but not always, precede the amount.
static SECONDARY_KEYWORDS: &[&str] = &[
    "จำนวนเงิน",
    "จำนวน",
    "ยอดรวม",
    "ยอดเงิน",
    "ราคา",
    "โอนเงิน",
    "amount",
    "subtotal",
    "total",
    "price",
];

/// Figures next to these phrases are balances or change, never the amount.
static EXCLUDED_CONTEXT: &[&str] = &[
    "ยอดเงินคงเหลือ",
    "ยอดคงเหลือ",
    "คงเหลือ",
    "เงินทอน",
    "ทอน",
    "available balance",
    "balance",
    "change due",
    "change",
];

/// Characters on either side of a keyword checked for excluded phrases
/// (never crossing a line break).
const CONTEXT_CHARS: usize = 20;

/// Amounts with this many integer digits are reference numbers.
const MAX_AMOUNT_DIGITS: usize = 9;

/// Inert token left where a date, time or reference number was.
const MASK: &str = " # ";

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static SIGNED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(?:^|\s)[+\-]\s?(\d[\d,]*\.\d{2})\b").unwrap());

static THOUSANDS_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d),(\d{3})").unwrap());

static CURRENCY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:฿|\$|thb)\s*(\d)").unwrap());

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:น\.|am|pm))?|\b\d{1,2}\.\d{2}\s*น\.")
        .unwrap()
});

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b").unwrap()
});

static MONTH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d{1,2}\s*(?:ม\.ค\.|ก\.พ\.|มี\.ค\.|เม\.ย\.|พ\.ค\.|มิ\.ย\.|ก\.ค\.|ส\.ค\.|ก\.ย\.|ต\.ค\.|พ\.ย\.|ธ\.ค\.|มกราคม|กุมภาพันธ์|มีนาคม|เมษายน|พฤษภาคม|มิถุนายน|กรกฎาคม|สิงหาคม|กันยายน|ตุลาคม|พฤศจิกายน|ธันวาคม|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s*\d{2,4}",
    )
    .unwrap()
});

static MASKED_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[\dx*]{3,}(?:-[\dx*]+){2,}").unwrap());

static LONG_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{9,}").unwrap());

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d{2}").unwrap());

static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// How an extracted amount was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    /// A `+`/`-` prefixed decimal.
    Signed,
    /// The window after a primary (total-like) keyword.
    PrimaryKeyword,
    /// The window after a secondary keyword.
    SecondaryKeyword,
    /// Largest plausible number outside balance/change lines.
    LargestNumber,
    /// Nothing plausible anywhere.
    NotFound,
}

/// Result of [`AmountExtractor::extract`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcrAmount {
    pub amount: f64,
    pub found: bool,
    pub source: AmountSource,
}

impl OcrAmount {
    fn not_found() -> Self {
        Self {
            amount: 0.0,
            found: false,
            source: AmountSource::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    amount: f64,
    priority: u8,
    position: usize,
}

// ---------------------------------------------------------------------------
// AmountExtractor
// ---------------------------------------------------------------------------

/// Keyword-priority amount extractor for slip and receipt text.
///
/// # Example
/// ```rust
/// use voice_ledger::config::OcrConfig;
/// use voice_ledger::ocr::AmountExtractor;
///
/// let extractor = AmountExtractor::new(&OcrConfig::default());
/// let result = extractor.extract("โอนเงิน 500.00\nยอดเงินคงเหลือ 10,000.00");
/// assert!(result.found);
/// assert_eq!(result.amount, 500.0);
/// ```
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    tie_break: TieBreak,
    window_chars: usize,
    max_amount: f64,
    reference_year: i32,
}

impl AmountExtractor {
    /// Build from config, using the current year for date rejection.
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            tie_break: config.tie_break,
            window_chars: config.window_chars,
            max_amount: config.max_amount,
            reference_year: chrono::Local::now().year(),
        }
    }

    /// Override the year used to recognize leaked calendar years.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Extract the most likely transaction amount from `text`.
    pub fn extract(&self, text: &str) -> OcrAmount {
        let signed = self.signed_candidates(text);
        let cleaned = mask_noise(&normalize(text));
        let lowered = cleaned.to_ascii_lowercase();

        let mut candidates = signed;
        candidates.extend(self.keyword_candidates(&lowered, PRIMARY_KEYWORDS, 2));
        candidates.extend(self.keyword_candidates(&lowered, SECONDARY_KEYWORDS, 1));
        candidates.retain(|c| self.is_plausible(c.amount));

        if let Some(best) = self.select(&candidates) {
            log::debug!(
                "ocr: picked {} (priority {}, {} candidates)",
                best.amount,
                best.priority,
                candidates.len()
            );
            let source = match best.priority {
                3 => AmountSource::Signed,
                2 => AmountSource::PrimaryKeyword,
                _ => AmountSource::SecondaryKeyword,
            };
            return OcrAmount {
                amount: best.amount,
                found: true,
                source,
            };
        }

        match self.largest_outside_excluded(&lowered) {
            Some(amount) => {
                log::debug!("ocr: no keyword candidate, largest plausible number {amount}");
                OcrAmount {
                    amount,
                    found: true,
                    source: AmountSource::LargestNumber,
                }
            }
            None => {
                log::debug!("ocr: no plausible amount");
                OcrAmount::not_found()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Candidate collection
    // -----------------------------------------------------------------------

    fn signed_candidates(&self, text: &str) -> Vec<Candidate> {
        let lowered = text.to_ascii_lowercase();
        SIGNED_DECIMAL
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(1)?;
                if line_has_excluded(&lowered, m.start()) {
                    return None;
                }
                let amount = m.as_str().replace(',', "").parse().ok()?;
                Some(Candidate {
                    amount,
                    priority: 3,
                    position: m.start(),
                })
            })
            .collect()
    }

    fn keyword_candidates(&self, lowered: &str, keywords: &[&str], priority: u8) -> Vec<Candidate> {
        let mut out = Vec::new();
        for keyword in keywords {
            for (at, _) in lowered.match_indices(keyword) {
                let end = at + keyword.len();
                if near_excluded(lowered, at, end) {
                    log::debug!("ocr: skipping '{keyword}' next to balance/change phrase");
                    continue;
                }
                let window = window_after(lowered, end, self.window_chars);
                let Some(m) = DECIMAL.find(window) else {
                    continue;
                };
                let position = end + m.start();
                if line_has_excluded(lowered, position) {
                    continue;
                }
                if let Ok(amount) = m.as_str().parse() {
                    out.push(Candidate {
                        amount,
                        priority,
                        position,
                    });
                }
            }
        }
        out
    }

    fn largest_outside_excluded(&self, lowered: &str) -> Option<f64> {
        lowered
            .lines()
            .filter(|line| !EXCLUDED_CONTEXT.iter().any(|p| line.contains(p)))
            .flat_map(|line| ANY_NUMBER.find_iter(line))
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .filter(|amount| self.is_plausible(*amount))
            .fold(None, |best: Option<f64>, amount| {
                Some(best.map_or(amount, |b| b.max(amount)))
            })
    }

    // -----------------------------------------------------------------------
    // Filtering and ranking
    // -----------------------------------------------------------------------

    fn is_plausible(&self, amount: f64) -> bool {
        amount.is_finite()
            && amount > 0.0
            && amount < self.max_amount
            && !self.is_calendar_year(amount)
            && integer_digits(amount) < MAX_AMOUNT_DIGITS
    }

    /// Gregorian or Buddhist-era year within one of the reference year.
    fn is_calendar_year(&self, amount: f64) -> bool {
        if amount.fract() != 0.0 {
            return false;
        }
        let value = amount as i64;
        let year = i64::from(self.reference_year);
        (year - 1..=year + 1).contains(&value) || (year + 542..=year + 544).contains(&value)
    }

    fn select(&self, candidates: &[Candidate]) -> Option<Candidate> {
        let top = candidates.iter().map(|c| c.priority).max()?;
        let tier = candidates.iter().filter(|c| c.priority == top);
        match self.tie_break {
            TieBreak::EarliestPosition => tier.min_by_key(|c| c.position).copied(),
            TieBreak::LargestAmount => tier.max_by(|a, b| a.amount.total_cmp(&b.amount)).copied(),
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Drop thousands separators and currency prefixes.
fn normalize(text: &str) -> String {
    let mut s = text.to_string();
    // One pass only joins every other group of "1,234,567".
    while THOUSANDS_COMMA.is_match(&s) {
        s = THOUSANDS_COMMA.replace_all(&s, "${1}${2}").into_owned();
    }
    CURRENCY_PREFIX.replace_all(&s, " ${1}").into_owned()
}

/// Replace times, dates, masked accounts and long digit runs with [`MASK`].
fn mask_noise(text: &str) -> String {
    let mut s = text.to_string();
    for pattern in [&*MONTH_DATE, &*NUMERIC_DATE, &*TIME, &*MASKED_ACCOUNT, &*LONG_DIGITS] {
        s = pattern.replace_all(&s, MASK).into_owned();
    }
    s
}

fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    let start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
    (start, end)
}

fn line_has_excluded(text: &str, pos: usize) -> bool {
    let (start, end) = line_bounds(text, pos);
    let line = &text[start..end];
    EXCLUDED_CONTEXT.iter().any(|p| line.contains(p))
}

/// `true` when an excluded phrase sits within [`CONTEXT_CHARS`] of the
/// keyword spanning `at..end`, on the keyword's own line.
fn near_excluded(text: &str, at: usize, end: usize) -> bool {
    let (line_start, line_end) = line_bounds(text, at);
    let from = step_back(text, at, CONTEXT_CHARS).max(line_start);
    let to = step_forward(text, end, CONTEXT_CHARS).min(line_end);
    if from >= to {
        return false;
    }
    let context = &text[from..to];
    EXCLUDED_CONTEXT.iter().any(|p| context.contains(p))
}

/// Up to `chars` characters after `from`, cut at the first excluded phrase.
fn window_after(text: &str, from: usize, chars: usize) -> &str {
    let to = step_forward(text, from, chars);
    let window = &text[from..to];
    let cut = EXCLUDED_CONTEXT
        .iter()
        .filter_map(|p| window.find(p))
        .min()
        .unwrap_or(window.len());
    &window[..cut]
}

fn step_back(text: &str, from: usize, chars: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .nth(chars.saturating_sub(1))
        .map_or(0, |(i, _)| i)
}

fn step_forward(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| from + i)
}

fn integer_digits(amount: f64) -> usize {
    format!("{:.0}", amount.trunc()).len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> AmountExtractor {
        AmountExtractor::new(&OcrConfig::default()).with_reference_year(2026)
    }

    #[test]
    fn transfer_slip_total_after_success_phrase() {
        let out = extractor().extract("โอนเงินสำเร็จ\nจำนวนเงิน\n1,250.00\nบาท");
        assert_eq!(out.amount, 1250.0);
        assert!(out.found);
        assert_eq!(out.source, AmountSource::PrimaryKeyword);
    }

    #[test]
    fn balance_figure_is_excluded() {
        let out = extractor().extract("โอนเงิน 500.00\nยอดเงินคงเหลือ 10,000.00");
        assert_eq!(out.amount, 500.0);
        assert!(out.found);
    }

    #[test]
    fn english_receipt_prefers_grand_total() {
        let text = "Coffee 65.00\nCake 90.00\nSubtotal 155.00\nVAT 10.85\nGrand Total 165.85\nCash 200.00\nChange 34.15";
        let out = extractor().extract(text);
        assert_eq!(out.amount, 165.85);
        assert_eq!(out.source, AmountSource::PrimaryKeyword);
    }

    #[test]
    fn signed_delta_outranks_keywords() {
        let text = "Transfer successful\nAmount 300.00\n-1,200.00\nAvailable balance 54,321.00";
        let out = extractor().extract(text);
        assert_eq!(out.amount, 1200.0);
        assert_eq!(out.source, AmountSource::Signed);
    }

    #[test]
    fn dates_times_and_references_never_win() {
        let text = "16/10/2026 14:35\nRef 012345678901\nจาก xxx-x-x1234-x\nจำนวนเงิน 75.00";
        let out = extractor().extract(text);
        assert_eq!(out.amount, 75.0);
    }

    #[test]
    fn fallback_takes_largest_number_outside_balance_lines() {
        let text = "ร้านป้าแดง\nข้าวผัด 60\nชาเย็น 25\nคงเหลือ 5000";
        let out = extractor().extract(text);
        assert!(out.found);
        assert_eq!(out.amount, 60.0);
        assert_eq!(out.source, AmountSource::LargestNumber);
    }

    #[test]
    fn calendar_years_are_rejected() {
        // 2026 and its Buddhist-era form 2569 are dates, not amounts.
        let out = extractor().extract("ใบเสร็จ 2026\nพ.ศ. 2569");
        assert!(!out.found);
        assert_eq!(out.amount, 0.0);
    }

    #[test]
    fn nothing_plausible_is_not_found() {
        let out = extractor().extract("ขอบคุณที่ใช้บริการ");
        assert_eq!(out, OcrAmount::not_found());
        let out = extractor().extract("");
        assert!(!out.found);
    }

    #[test]
    fn keyword_next_to_balance_is_skipped() {
        // "ยอดเงิน" inside "ยอดเงินคงเหลือ" must not anchor a candidate.
        let out = extractor().extract("ยอดเงินคงเหลือ 9,999.00\nราคา 120.00");
        assert_eq!(out.amount, 120.0);
    }

    #[test]
    fn tie_break_policy_is_configurable() {
        let text = "ราคา 40.00\nราคา 90.00";
        assert_eq!(extractor().extract(text).amount, 40.0);

        let config = OcrConfig {
            tie_break: TieBreak::LargestAmount,
            ..OcrConfig::default()
        };
        let largest = AmountExtractor::new(&config).with_reference_year(2026);
        assert_eq!(largest.extract(text).amount, 90.0);
    }

    #[test]
    fn amounts_over_the_cap_are_ignored() {
        let out = extractor().extract("จำนวนเงิน 2,500,000.00\nราคา 80.00");
        assert_eq!(out.amount, 80.0);
    }

    #[test]
    fn currency_symbol_is_normalized() {
        let out = extractor().extract("Total ฿1,234.50");
        assert_eq!(out.amount, 1234.5);
    }
}
