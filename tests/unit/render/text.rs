use super::*;

#[test]
fn explicit_missing_font_is_a_setup_error() {
    let cfg = FontConfig {
        regular: Some(PathBuf::from("/definitely/not/here.ttf")),
        bold: None,
    };
    let err = cfg.load().unwrap_err();
    assert!(matches!(err, NewsreelError::CaptureSetup(_)));
    assert!(err.to_string().contains("/definitely/not/here.ttf"));
}

#[test]
fn load_reads_configured_font_files() {
    let dir = std::env::temp_dir().join(format!("newsreel-font-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("fake.ttf");
    std::fs::write(&path, b"not really a font").unwrap();

    let set = FontConfig {
        regular: Some(path.clone()),
        bold: Some(path.clone()),
    }
    .load()
    .unwrap();
    assert_eq!(set.bytes(FontWeight::Regular).as_slice(), b"not really a font");
    assert_eq!(set.bytes(FontWeight::Bold).as_slice(), b"not really a font");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn layout_measures_real_fonts_when_installed() {
    let Ok(fonts) = FontConfig::default().load() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    let short = engine.measure("AI", TextStyle::regular(28.0)).unwrap();
    let long = engine.measure("AI tooling digest", TextStyle::regular(28.0)).unwrap();
    let big = engine.measure("AI", TextStyle::regular(56.0)).unwrap();
    assert!(short > 0.0);
    assert!(long > short);
    assert!(big > short * 1.5);
    assert!(engine.measure("x", TextStyle::regular(0.0)).is_err());
}
