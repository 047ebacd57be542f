use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TrackovlError::schema("x")
            .to_string()
            .contains("schema error:")
    );
    assert!(TrackovlError::parse("x").to_string().contains("parse error:"));
    assert!(
        TrackovlError::lookup("x")
            .to_string()
            .contains("lookup error:")
    );
    assert!(
        TrackovlError::out_of_bounds("x")
            .to_string()
            .contains("out of bounds error:")
    );
    assert!(
        TrackovlError::color_format("x")
            .to_string()
            .contains("color format error:")
    );
    assert!(TrackovlError::arity("x").to_string().contains("arity error:"));
    assert!(
        TrackovlError::naming_convention("x")
            .to_string()
            .contains("naming convention error:")
    );
    assert!(
        TrackovlError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TrackovlError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn recoverability_splits_item_misses_from_bad_input() {
    assert!(TrackovlError::lookup("t").is_recoverable());
    assert!(TrackovlError::naming_convention("f").is_recoverable());
    assert!(TrackovlError::out_of_bounds("c").is_recoverable());
    assert!(TrackovlError::Other(anyhow::anyhow!("io")).is_recoverable());

    assert!(!TrackovlError::schema("h").is_recoverable());
    assert!(!TrackovlError::parse("v").is_recoverable());
    assert!(!TrackovlError::color_format("c").is_recoverable());
    assert!(!TrackovlError::arity("n").is_recoverable());
    assert!(!TrackovlError::validation("o").is_recoverable());
}
