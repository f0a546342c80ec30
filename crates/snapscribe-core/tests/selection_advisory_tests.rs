//! Tests advisory type and size checks on selected files.

use snapscribe_core::{SOFT_MAX_UPLOAD_BYTES, SelectedFile, SelectionAdvisory};

#[test]
fn selection_advisory_tests_accepts_small_jpeg() {
    let file = SelectedFile::from_named_bytes("photo.jpg", vec![0_u8; 2 * 1024 * 1024])
        .expect("file should build");

    assert_eq!(file.content_type(), "image/jpeg");
    assert!(file.advisories().is_empty());
}

#[test]
fn selection_advisory_tests_flags_but_keeps_oversized_gif() {
    let file = SelectedFile::from_named_bytes("anim.gif", vec![0_u8; SOFT_MAX_UPLOAD_BYTES + 1])
        .expect("file should build even when advisories apply");

    let advisories = file.advisories();
    assert_eq!(advisories.len(), 2);
    assert!(matches!(
        advisories[0],
        SelectionAdvisory::UnsupportedType { .. }
    ));
    assert_eq!(advisories[1].message(), "File is larger than 5MB.");
}

#[test]
fn selection_advisory_tests_requires_file_name() {
    assert!(SelectedFile::new("  ", "image/png", vec![1_u8]).is_err());
}

#[test]
fn selection_advisory_tests_fingerprint_is_stable() {
    let a = SelectedFile::new("a.png", "image/png", vec![1_u8, 2, 3]).expect("valid");
    let b = SelectedFile::new("b.png", "image/png", vec![1_u8, 2, 3]).expect("valid");

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint().len(), 16);
}
