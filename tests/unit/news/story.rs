use super::*;

fn raw(id: &str, title: &str) -> RawStory {
    RawStory {
        object_id: Some(id.to_owned()),
        title: Some(title.to_owned()),
        points: Some(42),
        created_at: Some("2024-05-01T12:30:00Z".to_owned()),
        author: Some("pg".to_owned()),
        ..Default::default()
    }
}

#[test]
fn cadence_is_total_and_monotonic() {
    assert_eq!(Cadence::from_points(0), Cadence::Emerging);
    assert_eq!(Cadence::from_points(9), Cadence::Emerging);
    assert_eq!(Cadence::from_points(10), Cadence::Rising);
    assert_eq!(Cadence::from_points(49), Cadence::Rising);
    assert_eq!(Cadence::from_points(50), Cadence::Trending);
    assert_eq!(Cadence::from_points(149), Cadence::Trending);
    assert_eq!(Cadence::from_points(150), Cadence::Surging);
    assert_eq!(Cadence::from_points(u64::MAX), Cadence::Surging);
}

#[test]
fn missing_fields_are_defaulted() {
    let story = normalize_story(&RawStory::default(), 7);
    assert_eq!(story.id, "story-7");
    assert_eq!(story.title, "");
    assert_eq!(story.author, "unknown");
    assert_eq!(story.points, 0);
    assert_eq!(story.url, None);
    assert_eq!(story.posted_at, DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(story.cadence, Cadence::Emerging);
}

#[test]
fn negative_points_clamp_to_zero_and_epoch_seconds_are_used() {
    let r = RawStory {
        points: Some(-5),
        created_at: Some("not a date".to_owned()),
        created_at_i: Some(1_700_000_000),
        ..Default::default()
    };
    let story = normalize_story(&r, 0);
    assert_eq!(story.points, 0);
    assert_eq!(story.posted_at.timestamp(), 1_700_000_000);
}

#[test]
fn body_text_drives_synopsis_and_talking_points() {
    let mut r = raw("1", "New AI tool ships");
    r.story_text = Some(
        "<p>We built a compiler for prompts.</p><p>It runs locally. It is open source! Try it &amp; tell us? Last one.</p>"
            .to_owned(),
    );
    let story = normalize_story(&r, 0);
    assert_eq!(story.synopsis, "We built a compiler for prompts.");
    assert_eq!(
        story.talking_points,
        vec![
            "It runs locally.".to_owned(),
            "It is open source!".to_owned(),
            "Try it & tell us?".to_owned(),
        ]
    );
}

#[test]
fn metadata_points_fill_in_without_body() {
    let mut r = raw("2", "AI agents everywhere");
    r.url = Some("https://www.example.com/post".to_owned());
    let story = normalize_story(&r, 0);
    assert!(story.synopsis.contains("AI agents everywhere"));
    assert!(story.synopsis.contains("example.com"));
    assert_eq!(story.talking_points.len(), 3);
    assert_eq!(story.talking_points[0], "Community score: 42 points (Rising)");
    assert_eq!(story.talking_points[1], "Posted by pg");
    assert_eq!(story.talking_points[2], "Source: example.com");
}

#[test]
fn synopsis_is_truncated_at_a_word_boundary() {
    let mut r = raw("3", "AI");
    r.story_text = Some("word ".repeat(100));
    let story = normalize_story(&r, 0);
    assert!(story.synopsis.chars().count() <= SYNOPSIS_MAX_CHARS);
    assert!(story.synopsis.ends_with("word…"));
}

#[test]
fn truncate_hard_cuts_a_single_giant_word() {
    let s = truncate_at_word(&"x".repeat(50), 10);
    assert_eq!(s.chars().count(), 10);
    assert!(s.ends_with('…'));
    assert_eq!(truncate_at_word("short", 10), "short");
}

#[test]
fn sanitize_strips_tags_and_decodes_entities() {
    assert_eq!(
        sanitize_text("a<i>b</i>  &lt;c&gt; &#x27;d&#39; &quot;e&quot; &#x2F; &bogus; &"),
        "a b <c> 'd' \"e\" / &bogus; &"
    );
}

#[test]
fn dedupe_keeps_first_of_case_and_whitespace_variants() {
    let a = normalize_story(&raw("a", "The  AI Tool"), 0);
    let b = normalize_story(&raw("b", "the ai   tool "), 1);
    let c = normalize_story(&raw("c", "Another AI tool"), 2);
    let out = dedupe_stories(vec![a, b, c]);
    let ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn story_serializes_with_camel_case_keys() {
    let story = normalize_story(&raw("9", "AI"), 0);
    let json = serde_json::to_value(&story).unwrap();
    assert!(json.get("talkingPoints").is_some());
    assert_eq!(json["postedAt"], "2024-05-01T12:30:00Z");
    assert_eq!(json["cadence"], "Rising");
    let back: Story = serde_json::from_value(json).unwrap();
    assert_eq!(back, story);
}
