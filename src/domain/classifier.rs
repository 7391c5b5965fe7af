//! Classifier decision types and raw-output parsing.
//!
//! The classification model is instructed to answer with exactly one word
//! from the stage vocabulary, but model output drifts: extra prose, wrapped
//! JSON, capitalization. Parsing recovers the stage through progressively
//! looser matching and coerces anything outside the closed set to
//! [`StageDecision::Ambiguous`]; a value outside the vocabulary is never
//! passed through to dispatch.

use serde::Deserialize;

use super::stage::Stage;

/// Outcome of parsing raw classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDecision {
    /// A concrete stage from the closed vocabulary.
    Stage(Stage),
    /// The output could not be mapped to the vocabulary; the router
    /// resolves this per its ambiguity policy.
    Ambiguous,
}

#[derive(Deserialize)]
struct StageField {
    stage: String,
}

/// Parse raw classifier output into a decision.
///
/// Matching steps, strictest first:
/// 1. exact match after trim + lowercase;
/// 2. first whitespace-separated word;
/// 3. whole-word scan, longest stage names first;
/// 4. embedded JSON object with a `"stage"` field;
/// 5. substring scan, longest first.
///
/// Anything else is `Ambiguous`.
pub fn parse_stage_output(raw: &str) -> StageDecision {
    let cleaned = raw.trim().to_lowercase();
    if cleaned.is_empty() {
        return StageDecision::Ambiguous;
    }

    if let Ok(stage) = cleaned.parse::<Stage>() {
        return StageDecision::Stage(stage);
    }

    if let Some(first) = cleaned.split_whitespace().next() {
        if let Ok(stage) = first.parse::<Stage>() {
            return StageDecision::Stage(stage);
        }
    }

    // Longest names first so "booking_to_master" wins over "booking".
    let mut by_length: Vec<Stage> = Stage::ALL.to_vec();
    by_length.sort_by_key(|s| std::cmp::Reverse(s.as_str().len()));

    for stage in &by_length {
        if contains_word(&cleaned, stage.as_str()) {
            return StageDecision::Stage(*stage);
        }
    }

    if let Some(stage) = stage_from_embedded_json(&cleaned) {
        return StageDecision::Stage(stage);
    }

    for stage in &by_length {
        if cleaned.contains(stage.as_str()) {
            return StageDecision::Stage(*stage);
        }
    }

    StageDecision::Ambiguous
}

/// Whole-word containment: the needle must not be flanked by word characters
/// (alphanumerics or `_`, since stage names contain underscores).
fn contains_word(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok = haystack[..start].chars().next_back().map_or(true, |c| !is_word(c));
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_word(c));
        if before_ok && after_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

fn stage_from_embedded_json(cleaned: &str) -> Option<Stage> {
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    let parsed: StageField = serde_json::from_str(&cleaned[start..=end]).ok()?;
    parsed.stage.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_match_wins() {
        assert_eq!(parse_stage_output("greeting"), StageDecision::Stage(Stage::Greeting));
        assert_eq!(
            parse_stage_output("  View_My_Booking \n"),
            StageDecision::Stage(Stage::ViewMyBooking)
        );
    }

    #[test]
    fn first_word_is_recognized() {
        assert_eq!(
            parse_stage_output("booking — the client wants an appointment"),
            StageDecision::Stage(Stage::Booking)
        );
    }

    #[test]
    fn whole_word_scan_prefers_longer_names() {
        assert_eq!(
            parse_stage_output("the stage is booking_to_master here"),
            StageDecision::Stage(Stage::BookingToMaster)
        );
    }

    #[test]
    fn whole_word_match_beats_a_name_embedded_in_another_word() {
        // "booking" inside "rebookings" is only a substring; the whole-word
        // step finds view_my_booking first.
        assert_eq!(
            parse_stage_output("rebookings, or rather view_my_booking"),
            StageDecision::Stage(Stage::ViewMyBooking)
        );
    }

    #[test]
    fn embedded_json_is_parsed() {
        assert_eq!(
            parse_stage_output("sure: {\"stage\": \"reschedule\"}"),
            StageDecision::Stage(Stage::Reschedule)
        );
    }

    #[test]
    fn substring_is_the_last_resort() {
        assert_eq!(
            parse_stage_output("probably cancellation_requested"),
            StageDecision::Stage(Stage::CancellationRequest)
        );
    }

    #[test]
    fn empty_and_garbage_are_ambiguous() {
        assert_eq!(parse_stage_output(""), StageDecision::Ambiguous);
        assert_eq!(parse_stage_output("   "), StageDecision::Ambiguous);
        assert_eq!(parse_stage_output("I cannot tell"), StageDecision::Ambiguous);
        assert_eq!(parse_stage_output("{\"stage\": \"checkout\"}"), StageDecision::Ambiguous);
    }

    proptest! {
        /// Output never escapes the closed vocabulary: any input either
        /// resolves to a known stage or collapses to Ambiguous.
        #[test]
        fn never_yields_unknown_stage(raw in ".*") {
            match parse_stage_output(&raw) {
                StageDecision::Stage(stage) => {
                    prop_assert!(Stage::ALL.contains(&stage));
                }
                StageDecision::Ambiguous => {}
            }
        }

        /// Inputs without any stage name are always Ambiguous.
        #[test]
        fn stage_free_text_is_ambiguous(raw in "[ a-z]{0,40}") {
            prop_assume!(!Stage::ALL.iter().any(|s| raw.contains(s.as_str())));
            // Single stage words can still appear split by spaces only if the
            // full name is present, which the assume above excludes.
            prop_assert_eq!(parse_stage_output(&raw), StageDecision::Ambiguous);
        }
    }
}
