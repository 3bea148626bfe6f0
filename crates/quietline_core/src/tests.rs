use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

#[test]
fn popup_config_defaults_match_tool_contract() {
    let config = PopupConfig::default();
    assert_eq!(config.title, DEFAULT_POPUP_TITLE);
    assert_eq!(config.width, 500);
    assert_eq!(config.height, 600);
    assert!(config.topmost);
    assert_eq!(config.timeout, None);
    assert!(config.show_history);
    assert_eq!(config.history_limit, 5);
    assert!(!config.chime_enabled);
    assert_eq!(config.theme, Theme::Auto);
    assert_eq!(config.font_size, 14);
}

#[test]
fn popup_config_builder_overrides() {
    let config = PopupConfig::new()
        .with_title("Standup")
        .with_size(600, 700)
        .with_timeout_secs(30.0)
        .with_theme(Theme::Dark)
        .with_font("Inter", 16);
    assert_eq!(config.title, "Standup");
    assert_eq!((config.width, config.height), (600, 700));
    assert_eq!(config.timeout_duration(), Some(Duration::from_secs(30)));
    assert_eq!(config.theme, Theme::Dark);
    assert_eq!(config.font_family, "Inter");
    assert_eq!(config.font_size, 16);
}

#[test]
fn timeout_duration_ignores_non_positive_values() {
    assert_eq!(PopupConfig::new().with_timeout_secs(0.0).timeout_duration(), None);
    assert_eq!(PopupConfig::new().with_timeout_secs(-3.0).timeout_duration(), None);
    assert_eq!(
        PopupConfig::new().with_timeout_secs(f64::NAN).timeout_duration(),
        None
    );
}

#[test]
fn timeout_duration_treats_huge_values_as_no_timer() {
    assert_eq!(PopupConfig::new().with_timeout_secs(1e20).timeout_duration(), None);
    assert_eq!(
        PopupConfig::new().with_timeout_secs(f64::INFINITY).timeout_duration(),
        None
    );
    assert_eq!(
        PopupConfig::new().with_timeout_secs(1e6).timeout_duration(),
        Some(Duration::from_secs(1_000_000))
    );
}

#[test]
fn popup_config_deserializes_partial_documents() {
    let config: PopupConfig =
        serde_json::from_value(json!({"title": "Hi", "theme": "light"})).expect("config");
    assert_eq!(config.title, "Hi");
    assert_eq!(config.theme, Theme::Light);
    assert_eq!(config.width, 500);
}

#[test]
fn palette_resolution_is_deterministic() {
    assert_eq!(resolve_palette(Theme::Dark, false), resolve_palette(Theme::Dark, true));
    assert_eq!(resolve_palette(Theme::Dark, false), ThemeColors::dark());
    assert_eq!(resolve_palette(Theme::Light, true), ThemeColors::light());
    assert_eq!(resolve_palette(Theme::Auto, true), ThemeColors::dark());
    assert_eq!(resolve_palette(Theme::Auto, false), ThemeColors::light());
    assert_eq!(resolve_palette(Theme::Auto, true), resolve_palette(Theme::Auto, true));
}

#[test]
fn palettes_carry_expected_anchor_colors() {
    let dark = ThemeColors::dark();
    assert_eq!(dark.window_bg, "#1c1c1e");
    assert_eq!(dark.user_bubble_bg, "#0a84ff");
    assert_eq!(dark.assistant_bubble_bg, "#2c2c2e");
    assert!(dark.is_dark());

    let light = ThemeColors::light();
    assert_eq!(light.window_bg, "#f5f5f7");
    assert_eq!(light.text_primary, "#1d1d1f");
    assert_eq!(light.accent, "#007aff");
    assert!(!light.is_dark());
}

#[test]
fn outcome_kind_names_are_stable() {
    assert_eq!(PopupOutcome::success("hi").kind(), "success");
    assert_eq!(PopupOutcome::Empty.kind(), "empty");
    assert_eq!(PopupOutcome::Cancelled.kind(), "cancelled");
    assert_eq!(PopupOutcome::Dismissed.kind(), "dismissed");
    assert_eq!(PopupOutcome::Timeout.kind(), "timeout");
    assert_eq!(PopupOutcome::Timeout.response(), None);
}

#[test]
fn outcome_document_omits_absent_response() {
    let doc = serde_json::to_value(PopupOutcome::Cancelled.to_document()).expect("doc");
    assert_eq!(doc, json!({"kind": "cancelled"}));

    let doc = serde_json::to_value(PopupOutcome::success("hello").to_document()).expect("doc");
    assert_eq!(doc, json!({"kind": "success", "response": "hello"}));
}

#[test]
fn parse_outcome_accepts_kind_and_legacy_type_field() {
    assert_eq!(
        parse_outcome_document(r#"{"kind":"success","response":"hello"}"#),
        Ok(PopupOutcome::success("hello"))
    );
    assert_eq!(
        parse_outcome_document(r#"{"type":"cancelled","response":null}"#),
        Ok(PopupOutcome::Cancelled)
    );
}

#[test]
fn parse_outcome_normalizes_unknown_and_hollow_documents() {
    assert_eq!(
        parse_outcome_document(r#"{"kind":"exploded"}"#),
        Ok(PopupOutcome::Dismissed)
    );
    assert_eq!(
        parse_outcome_document(r#"{"kind":"success"}"#),
        Ok(PopupOutcome::Empty)
    );
    assert_eq!(
        parse_outcome_document(r#"{"kind":"success","response":"  \n "}"#),
        Ok(PopupOutcome::Empty)
    );
}

#[test]
fn parse_outcome_uses_last_line_after_noise() {
    let raw = "loading fonts...\nwarning: something\n{\"kind\":\"timeout\"}\n";
    assert_eq!(parse_outcome_document(raw), Ok(PopupOutcome::Timeout));
}

#[test]
fn parse_outcome_rejects_empty_and_garbage() {
    assert_eq!(parse_outcome_document("  \n"), Err(OutcomeParseError::Empty));
    assert!(matches!(
        parse_outcome_document("not json"),
        Err(OutcomeParseError::Malformed(_))
    ));
    assert!(matches!(
        parse_outcome_document("noise\nstill not json"),
        Err(OutcomeParseError::Malformed(_))
    ));
}

#[test]
fn visible_history_respects_flag_and_limit() {
    let history = (0..8)
        .map(|n| HistoryEntry::user(format!("m{n}")))
        .collect::<Vec<_>>();
    let request = PopupRequest::new("hi", PopupConfig::new().with_history_limit(3))
        .with_history(history.clone());
    let visible = request
        .visible_history()
        .iter()
        .map(|entry| entry.content.as_str())
        .collect::<Vec<_>>();
    assert_eq!(visible, vec!["m5", "m6", "m7"]);

    let hidden = PopupRequest::new("hi", PopupConfig::new().with_show_history(false))
        .with_history(history);
    assert!(hidden.visible_history().is_empty());
}

#[test]
fn worker_request_flattens_request_fields() {
    let request = PopupRequest::new("Status", PopupConfig::new())
        .with_history(vec![HistoryEntry::assistant("earlier")])
        .with_wait_for_response(false);
    let doc = serde_json::to_value(WorkerRequest {
        request: request.clone(),
        colors: ThemeColors::light(),
    })
    .expect("serialize");

    assert_eq!(doc["message"], "Status");
    assert_eq!(doc["wait_for_response"], false);
    assert_eq!(doc["history"][0]["role"], "assistant");
    assert_eq!(doc["config"]["theme"], "auto");
    assert_eq!(doc["colors"]["window_bg"], "#f5f5f7");

    let back: WorkerRequest = serde_json::from_value(doc).expect("deserialize");
    assert_eq!(back.request, request);
}

#[test]
fn session_submit_trims_and_closes() {
    let mut session = PopupSession::new(true);
    assert_eq!(
        session.handle(Gesture::Submit("  hello \n".to_owned())),
        Some(PopupOutcome::success("hello"))
    );
    assert!(!session.is_open());
    assert_eq!(session.into_outcome(), PopupOutcome::success("hello"));
}

#[test]
fn session_whitespace_submit_is_empty() {
    let mut session = PopupSession::new(true);
    assert_eq!(
        session.handle(Gesture::Submit(" \t\n ".to_owned())),
        Some(PopupOutcome::Empty)
    );
}

#[test]
fn session_newline_never_transitions() {
    let mut session = PopupSession::new(true);
    assert_eq!(session.handle(Gesture::NewLine), None);
    assert_eq!(session.handle(Gesture::NewLine), None);
    assert!(session.is_open());
    assert_eq!(session.handle(Gesture::Cancel), Some(PopupOutcome::Cancelled));
}

#[test]
fn session_first_transition_wins() {
    let mut session = PopupSession::new(true);
    assert_eq!(session.handle(Gesture::TimerFired), Some(PopupOutcome::Timeout));
    assert_eq!(session.handle(Gesture::Submit("late".to_owned())), None);
    assert_eq!(session.handle(Gesture::Close), None);
    assert_eq!(session.outcome(), Some(&PopupOutcome::Timeout));
}

#[test]
fn notification_session_only_dismisses_or_times_out() {
    let mut session = PopupSession::new(false);
    assert_eq!(session.handle(Gesture::Submit("ignored".to_owned())), None);
    assert!(session.is_open());
    assert_eq!(session.handle(Gesture::Close), Some(PopupOutcome::Dismissed));

    let mut session = PopupSession::new(false);
    assert_eq!(session.handle(Gesture::Cancel), Some(PopupOutcome::Dismissed));

    let mut session = PopupSession::new(false);
    assert_eq!(session.handle(Gesture::TimerFired), Some(PopupOutcome::Timeout));
}

#[test]
fn unfinished_session_counts_as_dismissed() {
    let session = PopupSession::new(true);
    assert_eq!(session.state(), &SessionState::Open);
    assert_eq!(session.into_outcome(), PopupOutcome::Dismissed);
}
