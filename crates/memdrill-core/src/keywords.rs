//! Keyword distillation for recall tests.
//!
//! Derives a short, ranked list of salient terms from a generated passage
//! without any NLP dependency. The passage's script decides which set of
//! pattern passes runs:
//!
//! - Chinese: discourse markers, domain concepts, verb-object phrases, then
//!   short runs before punctuation (cap 8)
//! - Korean: discourse markers, noun-like spans before particles, predicate
//!   stems, then plain tokens (cap 6)
//! - anything else: medium-length whitespace tokens (cap 5)
//!
//! Passes are concatenated in that priority order, deduplicated keeping the
//! first occurrence, and capped. Thin results are backfilled from a looser
//! scan, and a fixed default list guarantees the output is never empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::LanguageHint;

const CHINESE_CAP: usize = 8;
const KOREAN_CAP: usize = 6;
const OTHER_CAP: usize = 5;

/// Results shorter than this are topped up by the backfill scan.
const BACKFILL_THRESHOLD: usize = 3;
/// Backfill never grows the result past this many entries.
const BACKFILL_TARGET: usize = 5;

const CHINESE_DEFAULTS: [&str; 5] = ["项目", "市场", "产品", "测试", "生产"];
const KOREAN_DEFAULTS: [&str; 5] = ["프로젝트", "시장", "제품", "테스트", "생산"];
const OTHER_DEFAULTS: [&str; 5] = ["project", "market", "product", "test", "production"];

const CHINESE_ACTION_PREFIXES: [&str; 5] = ["进行", "完成", "启动", "策划", "执行"];
const KOREAN_STOP_WORDS: [&str; 6] = ["것을", "것이", "하는", "되는", "있는", "없는"];

static HAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]").expect("valid Han pattern"));
static HANGUL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣]").expect("valid Hangul pattern"));

static CHINESE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("首先|其次|然后|接着|最后|第一|第二|第三|另外|此外|同时|因此|所以|但是|然而")
        .expect("valid marker pattern")
});
static CHINESE_CONCEPTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "市场调研|需求分析|可行性评估|功能设计|界面规划|技术研发|内部测试|性能测试|兼容性测试|用户体验|批量生产|市场推广|产品发布",
    )
    .expect("valid concept pattern")
});
static CHINESE_ACTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:进行|完成|启动|策划|执行)[\x{4e00}-\x{9fff}]{1,4}")
        .expect("valid action pattern")
});
static CHINESE_LOOSE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]{2,4}").expect("valid run pattern"));

static KOREAN_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("먼저|첫째|둘째|셋째|다음|그리고|또한|마지막|따라서|그러나|하지만|즉|결국")
        .expect("valid marker pattern")
});
static KOREAN_LOOSE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣]{2,4}").expect("valid run pattern"));

/// An ordered, deduplicated list of keywords, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    /// Build a set from candidates in priority order, dropping repeats and
    /// anything past `cap`.
    fn from_ranked<I>(candidates: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut words: Vec<String> = Vec::new();
        for word in candidates {
            if words.len() == cap {
                break;
            }
            if !words.contains(&word) {
                words.push(word);
            }
        }
        Self(words)
    }

    fn defaults(words: &[&str]) -> Self {
        Self(words.iter().map(|w| w.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|w| w == word)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Classify the script family of `text`.
///
/// Any Han ideograph makes the text Chinese, even when Hangul is present too.
pub fn detect_script(text: &str) -> LanguageHint {
    if HAN.is_match(text) {
        LanguageHint::Chinese
    } else if HANGUL.is_match(text) {
        LanguageHint::Korean
    } else {
        LanguageHint::Other
    }
}

/// Maximum number of keywords returned for a script family.
pub fn family_cap(family: LanguageHint) -> usize {
    match family {
        LanguageHint::Chinese => CHINESE_CAP,
        LanguageHint::Korean => KOREAN_CAP,
        LanguageHint::Other => OTHER_CAP,
    }
}

/// Extract recall-test keywords from a generated passage.
pub fn extract(text: &str) -> KeywordSet {
    let family = detect_script(text);

    let mut keywords = match family {
        LanguageHint::Chinese => distill_chinese(text),
        LanguageHint::Korean => distill_korean(text),
        LanguageHint::Other => distill_other(text),
    };

    if keywords.len() < BACKFILL_THRESHOLD {
        let loose = match family {
            LanguageHint::Chinese => Some(&*CHINESE_LOOSE_RUN),
            LanguageHint::Korean => Some(&*KOREAN_LOOSE_RUN),
            LanguageHint::Other => None,
        };
        if let Some(pattern) = loose {
            backfill(&mut keywords, text, pattern);
        }
    }

    if keywords.is_empty() {
        tracing::warn!(%family, "keyword extraction found nothing, using defaults");
        return match family {
            LanguageHint::Chinese => KeywordSet::defaults(&CHINESE_DEFAULTS),
            LanguageHint::Korean => KeywordSet::defaults(&KOREAN_DEFAULTS),
            LanguageHint::Other => KeywordSet::defaults(&OTHER_DEFAULTS),
        };
    }

    keywords
}

fn backfill(keywords: &mut KeywordSet, text: &str, pattern: &Regex) {
    for m in pattern.find_iter(text) {
        if keywords.len() >= BACKFILL_TARGET {
            break;
        }
        if !keywords.contains(m.as_str()) {
            keywords.0.push(m.as_str().to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Chinese
// ---------------------------------------------------------------------------

fn distill_chinese(text: &str) -> KeywordSet {
    let markers = all_matches(&CHINESE_MARKERS, text);
    let concepts = all_matches(&CHINESE_CONCEPTS, text);
    let actions = all_matches(&CHINESE_ACTIONS, text);
    let short: Vec<String> = chinese_short_runs(text)
        .into_iter()
        .filter(|w| {
            !markers.contains(w)
                && !concepts.contains(w)
                && !CHINESE_ACTION_PREFIXES.contains(&w.as_str())
        })
        .collect();

    let ranked = markers
        .into_iter()
        .take(3)
        .chain(concepts.into_iter().take(4))
        .chain(actions.into_iter().take(2))
        .chain(short.into_iter().take(3));
    KeywordSet::from_ranked(ranked, CHINESE_CAP)
}

/// 2–3 ideograph runs sitting right before a clause break or the end of text.
fn chinese_short_runs(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    scan_runs(&chars, 2, 3, is_han, |rest| match rest.first() {
        None => true,
        Some(&c) => matches!(c, '，' | '。' | '、' | '：' | '；'),
    })
}

// ---------------------------------------------------------------------------
// Korean
// ---------------------------------------------------------------------------

fn distill_korean(text: &str) -> KeywordSet {
    let markers = all_matches(&KOREAN_MARKERS, text);
    let nouns: Vec<String> = korean_noun_spans(text)
        .into_iter()
        .filter(|w| !markers.contains(w) && !KOREAN_STOP_WORDS.contains(&w.as_str()))
        .collect();
    let stems: Vec<String> = korean_predicate_stems(text)
        .into_iter()
        .filter(|w| (2..=4).contains(&w.chars().count()))
        .collect();
    let tokens = korean_tokens(text);

    let ranked = markers
        .into_iter()
        .take(2)
        .chain(nouns.into_iter().take(4))
        .chain(stems.into_iter().take(2))
        .chain(tokens.into_iter().take(4));
    KeywordSet::from_ranked(ranked, KOREAN_CAP)
}

/// 2–4 syllable spans directly followed by a particle, a space, or punctuation.
fn korean_noun_spans(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    scan_runs(&chars, 2, 4, is_hangul, |rest| {
        rest.first().is_some_and(|&c| {
            matches!(
                c,
                '을' | '를' | '이' | '가' | '는' | '은' | ' ' | '.' | ',' | '!' | '?'
            )
        })
    })
}

/// Stems directly followed by 하/되/있/없 and a 다/며/면/고 ending.
fn korean_predicate_stems(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    scan_runs(&chars, 1, usize::MAX, is_hangul, |rest| {
        rest.len() >= 2
            && matches!(rest[0], '하' | '되' | '있' | '없')
            && matches!(rest[1], '다' | '며' | '면' | '고')
    })
}

fn korean_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| {
            let len = word.chars().count();
            HANGUL.is_match(word)
                && (2..=5).contains(&len)
                && !word.starts_with(|c: char| "은는이가을를에서로부터까지".contains(c))
        })
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Other scripts
// ---------------------------------------------------------------------------

fn distill_other(text: &str) -> KeywordSet {
    let words = text
        .split_whitespace()
        .filter(|word| {
            let len = word.chars().count();
            len > 3 && len < 8
        })
        .map(str::to_string);
    KeywordSet::from_ranked(words, OTHER_CAP)
}

// ---------------------------------------------------------------------------
// Scanning helpers
// ---------------------------------------------------------------------------

fn is_han(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_hangul(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

fn all_matches(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Left-to-right scan for runs of `body` characters, `min..=max` long, that
/// are immediately followed by something `followed_by` accepts.
///
/// At each start position the longest qualifying run wins. The boundary is
/// looked at but not consumed, so the next run may begin on it.
fn scan_runs(
    chars: &[char],
    min: usize,
    max: usize,
    body: impl Fn(char) -> bool,
    followed_by: impl Fn(&[char]) -> bool,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let run = chars[start..]
            .iter()
            .take(max)
            .take_while(|c| body(**c))
            .count();
        let hit = (min..=run)
            .rev()
            .find(|&len| followed_by(&chars[start + len..]));
        match hit {
            Some(len) => {
                found.push(chars[start..start + len].iter().collect());
                start += len;
            }
            None => start += 1,
        }
    }
    found
}
