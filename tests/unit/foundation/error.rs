use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        NewsreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        NewsreelError::upstream("x")
            .to_string()
            .contains("upstream fetch failed:")
    );
    assert!(NewsreelError::render("x").to_string().contains("render error:"));
    assert!(
        NewsreelError::capture_unsupported("x")
            .to_string()
            .contains("capture unsupported:")
    );
    assert!(
        NewsreelError::capture_setup("x")
            .to_string()
            .contains("capture setup failed:")
    );
    assert!(NewsreelError::encode("x").to_string().contains("encode error:"));
    assert!(
        NewsreelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = NewsreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
