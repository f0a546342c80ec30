#![warn(missing_docs)]
//! # snapscribe-ui
//!
//! ## Purpose
//! Projects workflow state into everything the view renders.
//!
//! ## Responsibilities
//! - Format the usage label and tier badge.
//! - Derive the limit-reached flag and the analyze button state.
//! - Surface the error banner, limit notice, result text and selection hints.
//!
//! ## Data flow
//! Controller snapshot -> [`ProjectionInput`] -> [`project`] -> [`ViewModel`]
//! rendered by the host after every state change.
//!
//! ## Ownership and lifetimes
//! [`ProjectionInput`] borrows from the caller's snapshot; [`ViewModel`] owns
//! its strings so it can outlive that snapshot.
//!
//! ## Error model
//! Projection is total; there is nothing to fail.
//!
//! ## Security and privacy notes
//! The view model carries no tokens and no file bytes.

use snapscribe_core::{FREE_TIER_DEFAULT_LIMIT, SelectionAdvisory, Tier, UsageSnapshot, WorkflowResult};

/// Usage label shown before the first successful sync.
pub const USAGE_UNKNOWN_LABEL: &str = "—";
/// Usage label for premium accounts.
pub const PREMIUM_USAGE_LABEL: &str = "Premium · Unlimited";
/// Usage pill text while a refresh is in flight.
pub const LOADING_USAGE_LABEL: &str = "Loading usage…";
/// Button label once the free quota is exhausted.
pub const LIMIT_REACHED_BUTTON: &str = "Limit reached";
/// Button label while analyzing.
pub const ANALYZING_BUTTON: &str = "Analyzing…";
/// Idle button label.
pub const ANALYZE_BUTTON: &str = "Analyze";
/// Result panel text before any analysis.
pub const NO_RESULT_PLACEHOLDER: &str = "No result yet";

/// Everything the projector reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionInput<'a> {
    /// Last synced quota, if any.
    pub usage: Option<&'a UsageSnapshot>,
    /// Usage refresh in flight.
    pub loading_usage: bool,
    /// Analyze request in flight.
    pub analyzing: bool,
    /// A file is selected.
    pub has_file: bool,
    /// A preview handle is live.
    pub has_preview: bool,
    /// Last successful analysis.
    pub result: Option<&'a WorkflowResult>,
    /// Current error message.
    pub error: Option<&'a str>,
    /// Advisory observations about the selected file.
    pub advisories: &'a [SelectionAdvisory],
}

/// Notice shown when the free quota is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitNotice {
    /// Bold heading.
    pub title: String,
    /// Explanation and upgrade hint.
    pub body: String,
}

/// Derived view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Quota label.
    pub usage_label: String,
    /// Text for the header pill; the loading label while refreshing.
    pub usage_pill: String,
    /// "Premium" / "Free" badge once the tier is known.
    pub tier_badge: Option<&'static str>,
    /// Free quota exhausted.
    pub limit_reached: bool,
    /// Analyze button disabled.
    pub analyze_disabled: bool,
    /// Analyze button label.
    pub button_label: &'static str,
    /// Shown when `limit_reached`.
    pub limit_notice: Option<LimitNotice>,
    /// Current error banner.
    pub error_banner: Option<String>,
    /// Result text, or the placeholder when there is none.
    pub result_text: String,
    /// `true` when `result_text` is an actual description.
    pub has_result: bool,
    /// Render the preview image.
    pub show_preview: bool,
    /// Advisory hints about the selected file.
    pub selection_hints: Vec<String>,
}

/// Formats the usage label.
pub fn usage_label(usage: Option<&UsageSnapshot>) -> String {
    match usage {
        None => USAGE_UNKNOWN_LABEL.to_string(),
        Some(usage) if usage.tier == Tier::Premium => PREMIUM_USAGE_LABEL.to_string(),
        Some(usage) => format!(
            "Free · {}/{} used",
            usage.used,
            usage.limit.unwrap_or(FREE_TIER_DEFAULT_LIMIT)
        ),
    }
}

/// `tier = free && used >= (limit ?? 1)`.
pub fn limit_reached(usage: Option<&UsageSnapshot>) -> bool {
    usage.is_some_and(UsageSnapshot::limit_reached)
}

/// Button label with limit > analyzing > idle precedence.
pub fn button_label(limit_reached: bool, analyzing: bool) -> &'static str {
    if limit_reached {
        LIMIT_REACHED_BUTTON
    } else if analyzing {
        ANALYZING_BUTTON
    } else {
        ANALYZE_BUTTON
    }
}

fn limit_notice(usage: &UsageSnapshot) -> LimitNotice {
    let limit = usage.limit.unwrap_or(FREE_TIER_DEFAULT_LIMIT);
    let noun = if limit == 1 { "image" } else { "images" };
    LimitNotice {
        title: "Free tier limit reached".to_string(),
        body: format!(
            "You can analyze {limit} {noun} per session. Upgrade to Premium for unlimited analyses."
        ),
    }
}

/// Projects the full view model.
pub fn project(input: &ProjectionInput<'_>) -> ViewModel {
    let limit_reached = limit_reached(input.usage);
    let usage_label = usage_label(input.usage);
    let usage_pill = if input.loading_usage {
        LOADING_USAGE_LABEL.to_string()
    } else {
        usage_label.clone()
    };

    let (result_text, has_result) = match input.result {
        Some(result) => (result.description.clone(), true),
        None => (NO_RESULT_PLACEHOLDER.to_string(), false),
    };

    ViewModel {
        usage_label,
        usage_pill,
        tier_badge: input.usage.map(|usage| match usage.tier {
            Tier::Premium => "Premium",
            Tier::Free => "Free",
        }),
        limit_reached,
        analyze_disabled: input.analyzing || limit_reached || !input.has_file,
        button_label: button_label(limit_reached, input.analyzing),
        limit_notice: input
            .usage
            .filter(|_| limit_reached)
            .map(limit_notice),
        error_banner: input.error.map(str::to_string),
        result_text,
        has_result,
        show_preview: input.has_preview,
        selection_hints: input
            .advisories
            .iter()
            .map(SelectionAdvisory::message)
            .collect(),
    }
}
