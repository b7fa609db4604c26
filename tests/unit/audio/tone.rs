use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn envelope_hits_its_breakpoints() {
    let spec = ToneSpec::default();
    assert!(close(spec.gain_at(0.0, 10.0), 0.0001));
    assert!(close(spec.gain_at(1.0, 10.0), 0.06));
    assert!(close(spec.gain_at(10.0, 10.0), 0.025));
    assert!(close(spec.gain_at(5.5, 10.0), (0.06 + 0.025) / 2.0));
    // Outside the tone the envelope holds its endpoints.
    assert!(close(spec.gain_at(-1.0, 10.0), 0.0001));
    assert!(close(spec.gain_at(42.0, 10.0), 0.025));
}

#[test]
fn sweep_is_exponential_between_endpoints() {
    let spec = ToneSpec::default();
    assert!(close(spec.frequency_at(0.0, 10.0), 180.0));
    assert!(close(spec.frequency_at(10.0, 10.0), 90.0));
    // Geometric mean at the midpoint.
    assert!(close(spec.frequency_at(5.0, 10.0), (180.0f64 * 90.0).sqrt()));
}

#[test]
fn synthesized_pcm_is_interleaved_and_bounded() {
    let spec = ToneSpec {
        sample_rate: 8_000,
        ..Default::default()
    };
    let pcm = spec.synthesize(2.0);
    assert_eq!(pcm.len(), 16_000 * 2);
    assert_eq!(pcm[0], 0.0);
    for frame in pcm.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
        assert!(frame[0].abs() <= 0.06 + 1e-6);
    }
    let peak = pcm.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.05);
}

#[test]
fn triangle_shape() {
    assert!(close(triangle(0.0), 0.0));
    assert!(close(triangle(0.25), 1.0));
    assert!(close(triangle(0.5), 0.0));
    assert!(close(triangle(0.75), -1.0));
}

#[test]
fn spec_validation() {
    assert!(ToneSpec::default().validate().is_ok());
    assert!(
        ToneSpec {
            end_hz: 0.0,
            ..Default::default()
        }
        .validate()
        .is_err()
    );
    assert!(
        ToneSpec {
            peak_gain: 2.0,
            ..Default::default()
        }
        .validate()
        .is_err()
    );
    assert!(
        ToneSpec {
            channels: 0,
            ..Default::default()
        }
        .validate()
        .is_err()
    );
}

#[test]
fn source_spools_and_releases_its_file() {
    let dir = std::env::temp_dir().join(format!("newsreel-tone-{}", std::process::id()));
    let mut tone = ToneSource::new(ToneSpec {
        sample_rate: 1_000,
        channels: 1,
        ..Default::default()
    });
    assert!(!tone.is_running());

    let cfg = tone.start_in(&dir, 0.5).unwrap();
    assert!(tone.is_running());
    assert_eq!(cfg.sample_rate, 1_000);
    assert_eq!(cfg.channels, 1);
    let bytes = std::fs::read(&cfg.path).unwrap();
    assert_eq!(bytes.len(), 500 * 4);

    tone.stop();
    assert!(!tone.is_running());
    assert!(!cfg.path.exists());
    tone.stop();

    let cfg = tone.start_in(&dir, 0.1).unwrap();
    drop(tone);
    assert!(!cfg.path.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stop_tolerates_a_spool_removed_underneath_it() {
    let dir = std::env::temp_dir().join(format!("newsreel-tone-gone-{}", std::process::id()));
    let mut tone = ToneSource::new(ToneSpec {
        sample_rate: 1_000,
        channels: 1,
        ..Default::default()
    });
    let cfg = tone.start_in(&dir, 0.1).unwrap();
    std::fs::remove_file(&cfg.path).unwrap();

    tone.stop();
    assert!(!tone.is_running());
    assert!(tone.spool_path().is_none());
    let _ = std::fs::remove_dir_all(&dir);
}
