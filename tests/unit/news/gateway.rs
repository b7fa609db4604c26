use super::*;
use crate::news::story::RawStory;

fn hit(id: &str, title: &str) -> RawStory {
    RawStory {
        object_id: Some(id.to_owned()),
        title: Some(title.to_owned()),
        points: Some(3),
        ..Default::default()
    }
}

fn payload(hits: Vec<RawStory>) -> SearchResponse {
    SearchResponse { hits }
}

#[test]
fn filter_keeps_keyword_titles_only() {
    let p = payload(vec![
        hit("1", "Open-source AI tool"),
        hit("2", "Rust 2024 released"),
        hit("3", "Faster trains"),
        hit("4", "New ai agent"),
        RawStory {
            object_id: Some("5".to_owned()),
            ..Default::default()
        },
    ]);
    let out = curate(&p, &GatewayConfig::default());
    let ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
    // "Faster trains" contains the substring "ai" and is kept on purpose.
    assert_eq!(ids, vec!["1", "3", "4"]);
    for s in &out {
        assert!(s.title.to_lowercase().contains("ai"));
    }
}

#[test]
fn filter_matches_the_cleaned_title() {
    let p = payload(vec![
        hit("1", "<main>Rust 2024 released</main>"),
        hit("2", "Tr&#97;ins"),
        hit("3", "<b>AI</b> &amp; robotics"),
    ]);
    let out = curate(&p, &GatewayConfig::default());
    let ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"]);
    assert_eq!(out[0].title, "Trains");
    for s in &out {
        assert!(s.title.to_lowercase().contains("ai"), "{:?}", s.title);
    }
}

#[test]
fn output_is_capped_at_twelve() {
    let hits = (0..30).map(|i| hit(&i.to_string(), &format!("AI thing {i}"))).collect();
    let out = curate(&payload(hits), &GatewayConfig::default());
    assert_eq!(out.len(), 12);
    assert_eq!(out[0].id, "0");
    assert_eq!(out[11].id, "11");
}

#[test]
fn duplicates_keep_the_earlier_record() {
    let hits = vec![
        hit("first", "AI Tool  Launch"),
        hit("second", "ai tool launch"),
        hit("third", "Other AI news"),
    ];
    let out = curate(&payload(hits), &GatewayConfig::default());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, "first");
    assert_eq!(out[1].id, "third");
}

#[test]
fn curation_is_idempotent() {
    let hits = vec![hit("1", "AI one"), hit("2", "AI two"), hit("3", "AI one")];
    let p = payload(hits);
    let cfg = GatewayConfig::default();
    assert_eq!(curate(&p, &cfg), curate(&p, &cfg));
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(GatewayConfig::default().validate().is_ok());
    assert!(
        GatewayConfig {
            upstream_url: "not a url".to_owned(),
            ..Default::default()
        }
        .validate()
        .is_err()
    );
    assert!(
        GatewayConfig {
            keyword: "  ".to_owned(),
            ..Default::default()
        }
        .validate()
        .is_err()
    );
    assert!(
        GatewayConfig {
            max_stories: 0,
            ..Default::default()
        }
        .validate()
        .is_err()
    );
}
