use std::collections::HashSet;

use chrono::{DateTime, TimeZone as _, Utc};
use serde::{Deserialize, Serialize};

/// Synopsis length cap, in characters.
pub const SYNOPSIS_MAX_CHARS: usize = 180;
/// Talking point length cap, in characters.
pub const TALKING_POINT_MAX_CHARS: usize = 90;
/// Maximum talking points derived per story.
pub const MAX_TALKING_POINTS: usize = 3;

/// Freshness/momentum tag derived from a story's score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    Surging,
    Trending,
    Rising,
    Emerging,
}

impl Cadence {
    /// Total over all scores; thresholds are inclusive lower bounds.
    pub fn from_points(points: u64) -> Self {
        match points {
            150.. => Self::Surging,
            50..=149 => Self::Trending,
            10..=49 => Self::Rising,
            _ => Self::Emerging,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Surging => "Surging",
            Self::Trending => "Trending",
            Self::Rising => "Rising",
            Self::Emerging => "Emerging",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One hit from the upstream search API.
///
/// Every field is optional on the wire; normalization defaults whatever is missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStory {
    #[serde(rename = "objectID")]
    pub object_id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub points: Option<i64>,
    pub created_at: Option<String>,
    pub created_at_i: Option<i64>,
    pub author: Option<String>,
    pub story_text: Option<String>,
    pub comment_text: Option<String>,
    #[serde(rename = "_tags")]
    pub tags: Vec<String>,
}

/// Upstream search response body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<RawStory>,
}

/// A normalized news item ready for display and narration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub talking_points: Vec<String>,
    pub posted_at: DateTime<Utc>,
    pub points: u64,
    pub url: Option<String>,
    pub cadence: Cadence,
}

impl Story {
    /// Case-insensitive, whitespace-normalized title used for deduplication.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.title)
    }

    /// Host of the source URL without a leading `www.`.
    pub fn source_domain(&self) -> Option<String> {
        self.url.as_deref().and_then(source_domain)
    }
}

/// Convert one raw record into a [`Story`].
///
/// `ordinal` is the record's position in its batch and only matters when the record has no id.
pub fn normalize_story(raw: &RawStory, ordinal: usize) -> Story {
    let id = raw
        .object_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("story-{ordinal}"));
    let title = sanitize_text(raw.title.as_deref().unwrap_or_default());
    let author = raw
        .author
        .as_deref()
        .map(sanitize_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_owned());
    let points = raw.points.unwrap_or(0).max(0) as u64;
    let url = raw
        .url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    let posted_at = parse_posted_at(raw.created_at.as_deref(), raw.created_at_i);
    let cadence = Cadence::from_points(points);
    let domain = url.as_deref().and_then(source_domain);

    let body = raw
        .story_text
        .as_deref()
        .map(sanitize_text)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            raw.comment_text
                .as_deref()
                .map(sanitize_text)
                .filter(|s| !s.is_empty())
        });
    let sentences = body.as_deref().map(split_sentences).unwrap_or_default();

    let synopsis = match sentences.first() {
        Some(first) => truncate_at_word(first, SYNOPSIS_MAX_CHARS),
        None => {
            let via = domain
                .as_deref()
                .map(|d| format!(" via {d}"))
                .unwrap_or_default();
            truncate_at_word(
                &format!("{author} surfaced \"{title}\" with {points} points{via}."),
                SYNOPSIS_MAX_CHARS,
            )
        }
    };

    let mut talking_points: Vec<String> = sentences
        .iter()
        .skip(1)
        .take(MAX_TALKING_POINTS)
        .map(|s| truncate_at_word(s, TALKING_POINT_MAX_CHARS))
        .collect();
    if talking_points.is_empty() {
        talking_points.push(format!(
            "Community score: {points} points ({})",
            cadence.label()
        ));
        talking_points.push(format!("Posted by {author}"));
        if let Some(d) = domain.as_deref() {
            talking_points.push(format!("Source: {d}"));
        }
    }

    Story {
        id,
        title,
        author,
        synopsis,
        talking_points,
        posted_at,
        points,
        url,
        cadence,
    }
}

/// Keep the first story for every dedup key, preserving input order.
pub fn dedupe_stories(stories: impl IntoIterator<Item = Story>) -> Vec<Story> {
    let mut seen = HashSet::new();
    stories
        .into_iter()
        .filter(|s| seen.insert(s.dedup_key()))
        .collect()
}

pub fn dedup_key(title: &str) -> String {
    collapse_whitespace(title).to_lowercase()
}

/// Strip HTML tags, decode common entities and collapse whitespace.
pub fn sanitize_text(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                stripped.push(' ');
            }
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }
    collapse_whitespace(&decode_entities(&stripped))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split prose into sentences ending in `.`, `!` or `?` followed by whitespace or end of text.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let terminal = matches!(c, '.' | '!' | '?');
        if terminal && chars.peek().is_none_or(|n| n.is_whitespace()) {
            let s = current.trim();
            if !s.is_empty() {
                out.push(s.to_owned());
            }
            current.clear();
        }
    }
    let s = current.trim();
    if !s.is_empty() {
        out.push(s.to_owned());
    }
    out
}

/// Truncate to at most `max_chars` characters, cutting at a word boundary and appending `…`.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let budget = max_chars.saturating_sub(1);
    let mut out = String::new();
    for word in text.split_whitespace() {
        let needed = if out.is_empty() {
            word.chars().count()
        } else {
            out.chars().count() + 1 + word.chars().count()
        };
        if needed > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        out = text.chars().take(budget).collect();
    }
    let trimmed = out.trim_end_matches([',', ';', ':', ' ']);
    format!("{trimmed}…")
}

fn source_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_owned())
}

fn parse_posted_at(created_at: Option<&str>, created_at_i: Option<i64>) -> DateTime<Utc> {
    created_at
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| created_at_i.and_then(|secs| Utc.timestamp_opt(secs, 0).single()))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/news/story.rs"]
mod tests;
