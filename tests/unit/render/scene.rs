use super::*;
use crate::news::story::{RawStory, normalize_story};
use crate::render::wrap::ApproxMeasure;

fn story(url: Option<&str>) -> Story {
    let mut s = normalize_story(
        &RawStory {
            object_id: Some("42".to_owned()),
            title: Some("A forty character title about AI tooling".to_owned()),
            points: Some(77),
            created_at: Some("2024-05-01T12:30:00Z".to_owned()),
            author: Some("dang".to_owned()),
            url: url.map(str::to_owned),
            ..Default::default()
        },
        0,
    );
    s.talking_points = vec![
        "First point".to_owned(),
        "Second point".to_owned(),
        "Third point".to_owned(),
        "Fourth point is never drawn".to_owned(),
    ];
    s
}

fn texts(cmds: &[DrawCmd]) -> Vec<String> {
    cmds.iter()
        .filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn scene_index_endpoints_and_monotonicity() {
    let total = 300;
    assert_eq!(scene_index(FrameIndex(0), total), 0);
    assert_eq!(scene_index(FrameIndex(total - 1), total), 2);
    assert_eq!(scene_index(FrameIndex(total), total), 2);

    let mut seen = std::collections::BTreeSet::new();
    let mut prev = 0;
    for f in 0..=total {
        let s = scene_index(FrameIndex(f), total);
        assert!(s >= prev);
        prev = s;
        seen.insert(s);
    }
    assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn scenes_are_equal_length() {
    let total = 300;
    let mut counts = [0u32; 3];
    for f in 0..total {
        counts[scene_index(FrameIndex(f), total)] += 1;
    }
    assert_eq!(counts, [100, 100, 100]);
}

#[test]
fn opacity_is_floored_and_clamped() {
    let total = 300;
    for f in 0..=total {
        let scene = Scene::from_index(scene_index(FrameIndex(f), total));
        let a = transition_opacity(FrameIndex(f), total, scene.opacity_floor());
        assert!(a >= scene.opacity_floor());
        assert!(a <= 1.0);
    }
    assert!((transition_opacity(FrameIndex(0), total, 0.2) - 0.2).abs() < 1e-6);
    assert!((transition_opacity(FrameIndex(100), total, 0.3) - 0.3).abs() < 1e-6);
    assert_eq!(transition_opacity(FrameIndex(99), total, 0.3), 1.0);
}

#[test]
fn title_scene_wraps_title_within_content_width() {
    let renderer = SceneRenderer::default();
    let s = story(None);
    let cmds = renderer.render_frame(&s, FrameIndex(0), 300, &mut ApproxMeasure);
    let t = texts(&cmds);
    assert_eq!(t[0], "AI Briefing Studio");
    assert_eq!(t[1], "May 1, 2024, 12:30 UTC");
    let title_lines = &t[2..];
    assert!(title_lines.len() >= 2);
    assert_eq!(title_lines.join(" "), s.title);

    let mut m = ApproxMeasure;
    for line in title_lines {
        assert!(m.measure(line, TextStyle::bold(72.0)) <= 1280.0 - 144.0);
    }
}

#[test]
fn insights_scene_draws_at_most_three_bullets() {
    let renderer = SceneRenderer::default();
    let cmds = renderer.render_frame(&story(None), FrameIndex(150), 300, &mut ApproxMeasure);
    let t = texts(&cmds);
    assert!(t.contains(&"Key Insights".to_owned()));
    assert!(t.contains(&"Third point".to_owned()));
    assert!(!t.iter().any(|s| s.contains("Fourth")));
    let bullets = cmds
        .iter()
        .filter(|c| matches!(c, DrawCmd::FillEllipse { blur_px, .. } if *blur_px == 0.0))
        .count();
    assert_eq!(bullets, 3);
}

#[test]
fn next_steps_substitutes_source_url() {
    let renderer = SceneRenderer::default();
    let with_url = renderer.render_frame(
        &story(Some("https://example.com/a")),
        FrameIndex(250),
        300,
        &mut ApproxMeasure,
    );
    let t = texts(&with_url);
    assert!(t.contains(&"Next Steps".to_owned()));
    assert_eq!(t.last().unwrap(), "Full story: https://example.com/a");

    let without = renderer.render_frame(&story(None), FrameIndex(250), 300, &mut ApproxMeasure);
    assert_eq!(
        texts(&without).last().unwrap(),
        "Track community traction over the next 48h."
    );
}

#[test]
fn grid_scrolls_with_frame_index() {
    let renderer = SceneRenderer::default();
    let s = story(None);
    let first_rect = |f: u64| {
        renderer
            .render_frame(&s, FrameIndex(f), 300, &mut ApproxMeasure)
            .into_iter()
            .find_map(|c| match c {
                DrawCmd::FillRect { rect, .. } => Some(rect),
                _ => None,
            })
            .unwrap()
    };
    assert!((first_rect(0).x0 - -0.5).abs() < 1e-9);
    assert!((first_rect(1).x0 - 3.5).abs() < 1e-9);
    assert!((first_rect(20).x0 - -0.5).abs() < 1e-9);
}

#[test]
fn opacity_layers_are_balanced() {
    let renderer = SceneRenderer::default();
    for f in [0, 120, 299, 300] {
        let cmds = renderer.render_frame(&story(None), FrameIndex(f), 300, &mut ApproxMeasure);
        let mut depth = 0i32;
        for c in &cmds {
            match c {
                DrawCmd::PushOpacity(_) => depth += 1,
                DrawCmd::PopOpacity => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
    }
}
