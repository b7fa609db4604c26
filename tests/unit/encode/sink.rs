use super::*;
use crate::foundation::core::Canvas;

fn cfg(stem: &str) -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
        file_stem: stem.to_owned(),
    }
}

fn frame(fill: u8) -> FrameRGBA {
    let mut f = FrameRGBA::transparent(Canvas {
        width: 4,
        height: 2,
    });
    f.data.fill(fill);
    f
}

#[test]
fn file_stems_are_path_safe() {
    assert_eq!(file_stem_for("39871234"), "39871234");
    assert_eq!(file_stem_for("abc-DEF_9"), "abc-DEF_9");
    assert_eq!(file_stem_for("../etc/passwd"), "___etc_passwd");
    assert_eq!(file_stem_for(""), "briefing");
}

#[test]
fn digest_sink_records_frames_in_order() {
    let mut sink = DigestSink::new();
    let log = sink.log();
    sink.begin(cfg("42")).unwrap();
    sink.push_frame(FrameIndex(0), &frame(0)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(7)).unwrap();
    sink.push_frame(FrameIndex(2), &frame(0)).unwrap();
    let artifact = sink.end().unwrap();

    assert_eq!(artifact.file_name, "42.digest");
    assert_eq!(artifact.url, "memory://42.digest");
    assert_eq!(artifact.bytes.len(), 3 * 8);
    assert!(artifact.path.is_none());

    let log = log.lock().unwrap();
    assert!(log.ended);
    assert!(!log.aborted);
    assert_eq!(log.frames.len(), 3);
    assert_eq!(log.frames[0].1, log.frames[2].1);
    assert_ne!(log.frames[0].1, log.frames[1].1);
}

#[test]
fn digest_sink_rejects_out_of_order_and_wrong_size() {
    let mut sink = DigestSink::new();
    sink.begin(cfg("x")).unwrap();
    sink.push_frame(FrameIndex(3), &frame(0)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(0)).is_err());
    assert!(sink.push_frame(FrameIndex(2), &frame(0)).is_err());

    let big = FrameRGBA::transparent(Canvas {
        width: 8,
        height: 8,
    });
    assert!(sink.push_frame(FrameIndex(4), &big).is_err());
}

#[test]
fn digest_sink_requires_begin_and_frames() {
    let mut sink = DigestSink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(0)).is_err());
    assert!(sink.end().is_err());

    sink.begin(cfg("empty")).unwrap();
    let err = sink.end().unwrap_err();
    assert!(err.to_string().contains("no frames"));
}

#[test]
fn abort_marks_log_and_is_idempotent() {
    let mut sink = DigestSink::new();
    let log = sink.log();
    sink.begin(cfg("a")).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.abort();
    sink.abort();
    assert!(log.lock().unwrap().aborted);
    assert!(sink.end().is_err());
}

#[test]
fn artifact_debug_omits_payload() {
    let a = VideoArtifact {
        bytes: vec![1, 2, 3],
        mime: "video/webm".to_owned(),
        file_name: "1.webm".to_owned(),
        url: "file:///tmp/1.webm".to_owned(),
        path: None,
    };
    let s = format!("{a:?}");
    assert!(s.contains("bytes: 3"));
}
