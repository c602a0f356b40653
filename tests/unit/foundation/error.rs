use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LdiError::from(FormatError::BadFieldCount {
            declared: 2,
            trailing: 3
        })
        .to_string()
        .contains("format error:")
    );
    assert!(
        LdiError::invalid_scene("x")
            .to_string()
            .contains("invalid scene description:")
    );
    assert!(
        LdiError::image_decode("x")
            .to_string()
            .contains("image decode error:")
    );
    assert!(
        LdiError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert_eq!(
        LdiError::MissingSceneDescription.to_string(),
        "missing scene description"
    );
}

#[test]
fn not_container_format_prints_markers_in_hex() {
    let err = FormatError::NotContainerFormat {
        found: 0x1e1b,
        expected: 0x1e1a,
    };
    assert_eq!(
        err.to_string(),
        "not an LDI container (end marker 0x1e1b, expected 0x1e1a)"
    );
}

#[test]
fn format_error_accessor_only_matches_format_variant() {
    let truncated = FormatError::Truncated {
        offset: 4,
        needed: 8,
        available: 2,
    };
    assert_eq!(LdiError::from(truncated).format_error(), Some(truncated));
    assert_eq!(LdiError::MissingSceneDescription.format_error(), None);
}

#[test]
fn unresolved_reference_names_path_and_blob() {
    let err = LdiError::UnresolvedBlobReference {
        path: "$.views[0].albedo".to_string(),
        blob_id: 42,
    };
    let s = err.to_string();
    assert!(s.contains("$.views[0].albedo"));
    assert!(s.contains("42"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LdiError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
