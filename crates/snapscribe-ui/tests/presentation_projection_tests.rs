//! Integration tests for view model projection.

use snapscribe_core::{SelectedFile, Tier, UsageSnapshot, WorkflowResult};
use snapscribe_ui::{ProjectionInput, project};

#[test]
fn presentation_projection_tests_free_limit_disables_button() {
    let usage = UsageSnapshot::new(Tier::Free, 1, Some(1));
    let result = WorkflowResult::new("A cat on a windowsill.", usage);

    let view = project(&ProjectionInput {
        usage: Some(&usage),
        has_file: true,
        has_preview: true,
        result: Some(&result),
        ..ProjectionInput::default()
    });

    assert!(view.limit_reached);
    assert!(view.analyze_disabled);
    assert_eq!(view.button_label, "Limit reached");
    assert_eq!(view.usage_label, "Free · 1/1 used");
    assert_eq!(view.tier_badge, Some("Free"));
    assert_eq!(view.result_text, "A cat on a windowsill.");
    let notice = view.limit_notice.expect("limit notice should be shown");
    assert_eq!(notice.title, "Free tier limit reached");
    assert!(notice.body.contains("1 image per session"));
}

#[test]
fn presentation_projection_tests_premium_is_never_limited() {
    let usage = UsageSnapshot::new(Tier::Premium, 250, None);

    let view = project(&ProjectionInput {
        usage: Some(&usage),
        has_file: true,
        ..ProjectionInput::default()
    });

    assert!(!view.limit_reached);
    assert!(!view.analyze_disabled);
    assert_eq!(view.usage_label, "Premium · Unlimited");
    assert!(view.limit_notice.is_none());
}

#[test]
fn presentation_projection_tests_loading_and_error_states() {
    let view = project(&ProjectionInput {
        loading_usage: true,
        error: Some("Invalid token"),
        ..ProjectionInput::default()
    });

    assert_eq!(view.usage_label, "—");
    assert_eq!(view.usage_pill, "Loading usage…");
    assert_eq!(view.error_banner.as_deref(), Some("Invalid token"));
    assert_eq!(view.result_text, "No result yet");
    assert!(!view.has_result);
    assert!(view.tier_badge.is_none());
}

#[test]
fn presentation_projection_tests_surfaces_selection_hints() {
    let file = SelectedFile::from_named_bytes("clip.gif", vec![0_u8; 8]).expect("file");
    let advisories = file.advisories();

    let view = project(&ProjectionInput {
        has_file: true,
        advisories: &advisories,
        ..ProjectionInput::default()
    });

    assert_eq!(view.selection_hints.len(), 1);
    assert!(view.selection_hints[0].contains("not supported"));
}
