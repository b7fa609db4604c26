use super::*;

#[test]
fn default_settings_schedule_three_hundred_frames() {
    let s = CaptureSettings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.total_frames(), 300);
    assert_eq!(s.canvas, Canvas::BRIEFING);
}

#[test]
fn settings_validation() {
    let bad_fps = CaptureSettings {
        fps: Fps { num: 0, den: 1 },
        ..Default::default()
    };
    assert!(bad_fps.validate().is_err());

    let too_short = CaptureSettings {
        duration_secs: 0.01,
        ..Default::default()
    };
    assert!(too_short.validate().is_err());

    let nan = CaptureSettings {
        duration_secs: f64::NAN,
        ..Default::default()
    };
    assert!(nan.validate().is_err());

    let ntsc = CaptureSettings {
        fps: Fps {
            num: 30_000,
            den: 1001,
        },
        ..Default::default()
    };
    assert!(ntsc.validate().is_ok());
    assert_eq!(ntsc.total_frames(), 299);
}
