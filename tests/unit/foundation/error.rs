use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ScrawlError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ScrawlError::registry("x")
            .to_string()
            .contains("registry error:")
    );
    assert!(ScrawlError::render("x").to_string().contains("render error:"));
    assert!(ScrawlError::load("x").to_string().contains("load error:"));
    assert!(
        ScrawlError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ScrawlError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_become_serde_errors() {
    let err: ScrawlError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, ScrawlError::Serde(_)));
}
