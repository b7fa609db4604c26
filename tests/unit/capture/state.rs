use super::*;

#[test]
fn progress_is_floored_and_capped() {
    assert_eq!(progress_percent(0, 300), 0);
    assert_eq!(progress_percent(2, 300), 0);
    assert_eq!(progress_percent(3, 300), 1);
    assert_eq!(progress_percent(149, 300), 49);
    assert_eq!(progress_percent(297, 300), 99);
    assert_eq!(progress_percent(300, 300), 99);

    let mut prev = 0;
    for f in 0..=300 {
        let p = progress_percent(f, 300);
        assert!(p >= prev);
        assert!(p <= 99);
        prev = p;
    }
}

#[test]
fn messages_follow_state() {
    assert_eq!(CaptureState::Idle.message(), IDLE_MESSAGE);
    assert_eq!(
        CaptureState::Capturing {
            frame: FrameIndex(3),
            progress: 1
        }
        .message(),
        "Rendering video intelligence package…"
    );
    assert_eq!(CaptureState::Encoding.message(), "Encoding video payload…");
    let err = CaptureState::Error {
        message: "video recorder is not supported on this host.".to_owned(),
    };
    assert_eq!(err.message(), "video recorder is not supported on this host.");
    assert_eq!(err.status(), CaptureStatus::Error);
    assert!(!err.is_active());
    assert!(CaptureState::Encoding.is_active());
}

#[test]
fn ready_exposes_artifact() {
    let artifact = VideoArtifact {
        bytes: vec![1],
        mime: "video/webm".to_owned(),
        file_name: "1.webm".to_owned(),
        url: "memory://1.webm".to_owned(),
        path: None,
    };
    let s = CaptureState::Ready {
        artifact: artifact.clone(),
    };
    assert_eq!(s.artifact(), Some(&artifact));
    assert_eq!(s.message(), READY_MESSAGE);
    assert_eq!(CaptureStatus::Ready.to_string(), "ready");
    assert_eq!(
        serde_json::to_string(&CaptureStatus::Capturing).unwrap(),
        "\"capturing\""
    );
}
