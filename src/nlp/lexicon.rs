//! Keyword matching with an explicit exception table.
//!
//! Thai is written without spaces, so plain substring matching produces
//! false positives whenever a keyword is embedded in a longer, unrelated
//! word ("ย่าง" grill inside "อย่าง" such-as). Those collisions are listed
//! here as data and checked before the general substring rule.

/// A keyword that must not match when it only occurs inside one of `hosts`.
pub struct Exception {
    pub keyword: &'static str,
    pub hosts: &'static [&'static str],
}

/// Collisions shared by every keyword classifier.
pub static EXCEPTIONS: &[Exception] = &[
    // grill / such-as
    Exception { keyword: "ย่าง", hosts: &["อย่าง"] },
    // question particle / burn, silk
    Exception { keyword: "ไหม", hosts: &["ไหม้", "ผ้าไหม"] },
    // "what" / "anything"
    Exception { keyword: "อะไร", hosts: &["อะไรก็ได้"] },
    // fee / wages, commission, remuneration
    Exception { keyword: "ค่า", hosts: &["ค่าจ้าง", "ค่าคอม", "ค่าตอบแทน"] },
    // receive / polite particle, "for", recipient (slips), eat
    Exception { keyword: "รับ", hosts: &["ครับ", "สำหรับ", "ผู้รับ", "รับประทาน"] },
];

/// `true` when `keyword` occurs in `text` outside every host word listed
/// for it in [`EXCEPTIONS`].
///
/// `text` is expected to be lowercased already.
pub fn contains_guarded(text: &str, keyword: &str) -> bool {
    if !text.contains(keyword) {
        return false;
    }
    let hosts: Vec<&str> = EXCEPTIONS
        .iter()
        .filter(|e| e.keyword == keyword)
        .flat_map(|e| e.hosts.iter().copied())
        .collect();
    if hosts.is_empty() {
        return true;
    }

    let mut masked = text.to_string();
    for host in hosts {
        masked = masked.replace(host, " ");
    }
    masked.contains(keyword)
}

/// `true` when the ASCII phrase `phrase` occurs in `text` on word
/// boundaries ("how" matches "how much" but not "show").
pub fn contains_word(text: &str, phrase: &str) -> bool {
    let mut start = 0;
    while let Some(offset) = text[start..].find(phrase) {
        let at = start + offset;
        let end = at + phrase.len();
        let before_ok = text[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = at + phrase.chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Match an entry of a mixed keyword table: ASCII entries on word
/// boundaries, Thai (and symbol) entries by guarded substring.
pub fn matches_keyword(text: &str, keyword: &str) -> bool {
    if keyword.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        contains_word(text, keyword)
    } else {
        contains_guarded(text, keyword)
    }
}
