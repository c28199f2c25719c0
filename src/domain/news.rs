use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// Free-text fields are capped after cleaning; long summaries get an
/// ellipsis appended.
const MAX_TEXT_LEN: usize = 1000;

/// Path segment ids taken from aggregator article links are truncated to
/// keep the natural key bounded.
const MAX_LINK_ID_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Lenient parse for classifier output and stored rows. Anything
    /// outside the enum maps to `None`; callers coerce to neutral.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" => Some(Self::Positive),
            "NEGATIVE" => Some(Self::Negative),
            "NEUTRAL" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier output for one headline.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentVerdict {
    pub label: SentimentLabel,
    /// Confidence in [0.0, 1.0].
    pub score: f64,
}

impl SentimentVerdict {
    /// The stand-in verdict for a failed, disabled, or out-of-enum
    /// classification. One bad classification must not drop a batch.
    pub fn neutral_fallback() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
        }
    }
}

/// A candidate item parsed out of a feed document, before cleaning and
/// dedup.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub source: Option<String>,
    pub summary: Option<String>,
}

/// A news item staged for persistence. Immutable once stored; sentiment
/// is assigned at ingestion time and never re-evaluated.
#[derive(Debug, Clone)]
pub struct NewsDraft {
    pub natural_id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

/// A persisted news item.
#[derive(Debug, Clone)]
pub struct NewsItem {
    pub id: i64,
    pub instrument_id: i64,
    pub natural_id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

/// Derive the natural identifier for a news entry.
///
/// Identifier-first policy: aggregator links carry a stable article id in
/// their path, which survives re-crawls of the same underlying article.
/// Failing that, a content fingerprint of the link, and as a last resort
/// a fingerprint of the title.
pub fn natural_id_for(link: &str, title: &str) -> String {
    let link = link.trim();
    if !link.is_empty() {
        if let Some(segment) = article_segment(link) {
            return segment;
        }
        return fingerprint(link);
    }
    fingerprint(title.trim())
}

fn article_segment(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "articles" {
            return segments
                .next()
                .filter(|id| !id.is_empty())
                .map(|id| id.chars().take(MAX_LINK_ID_LEN).collect());
        }
    }
    None
}

fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Strip HTML markup, decode common entities, collapse whitespace and cap
/// the length. Applied to every free-text field coming off the feed.
pub fn clean_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_TEXT_LEN {
        let capped: String = collapsed.chars().take(MAX_TEXT_LEN).collect();
        format!("{capped}...")
    } else {
        collapsed
    }
}
