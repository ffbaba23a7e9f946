//! Strict parser for judgment replies.

use cadence_core::error::JudgeError;
use cadence_core::types::AdvisoryAction;

/// A validated judgment: a tagged action and its stated reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedJudgment {
    pub action: AdvisoryAction,
    pub reason: String,
}

/// Parse the two-line `ACTION:` / `REASON:` reply protocol.
///
/// The action word must be exactly one of confirm, reduce, skip, or
/// override; a missing or unknown action is a malformed reply, never a
/// default. The reason line is optional.
pub fn parse_reply(text: &str) -> Result<ParsedJudgment, JudgeError> {
    let mut action = None;
    let mut reason = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = strip_prefix_ci(line, "ACTION:") {
            if action.is_none() {
                action = Some(parse_action_word(rest)?);
            }
        } else if let Some(rest) = strip_prefix_ci(line, "REASON:") {
            let rest = rest.trim();
            if reason.is_none() && !rest.is_empty() {
                reason = Some(rest.to_string());
            }
        }
    }

    let action = action.ok_or_else(|| JudgeError::MalformedReply("missing ACTION line".into()))?;
    Ok(ParsedJudgment {
        action,
        reason: reason.unwrap_or_else(|| "no reason given".to_string()),
    })
}

fn parse_action_word(rest: &str) -> Result<AdvisoryAction, JudgeError> {
    let word = rest
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(['.', ','])
        .to_ascii_lowercase();

    match word.as_str() {
        "confirm" => Ok(AdvisoryAction::Confirm),
        "reduce" => Ok(AdvisoryAction::Reduce),
        "skip" => Ok(AdvisoryAction::Skip),
        // "override_sell" is the long form some models echo back
        "override" | "override_sell" => Ok(AdvisoryAction::Override),
        other => Err(JudgeError::MalformedReply(format!(
            "unknown action {other:?}"
        ))),
    }
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confirm() {
        let parsed = parse_reply("ACTION: confirm\nREASON: earnings beat expectations").unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Confirm);
        assert_eq!(parsed.reason, "earnings beat expectations");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let parsed = parse_reply("action: REDUCE\nreason: mixed headlines").unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Reduce);
    }

    #[test]
    fn test_parse_override_long_form() {
        let parsed = parse_reply("ACTION: override_sell\nREASON: negative guidance").unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Override);
    }

    #[test]
    fn test_parse_trailing_punctuation() {
        let parsed = parse_reply("ACTION: skip.\nREASON: no clear read").unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Skip);
    }

    #[test]
    fn test_parse_surrounding_chatter() {
        let text = "Here is my assessment.\n\nACTION: confirm\nREASON: momentum intact\n\nGood luck!";
        let parsed = parse_reply(text).unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Confirm);
        assert_eq!(parsed.reason, "momentum intact");
    }

    #[test]
    fn test_missing_action_is_error() {
        assert!(parse_reply("REASON: looks fine").is_err());
        assert!(parse_reply("").is_err());
        assert!(parse_reply("I would confirm this trade.").is_err());
    }

    #[test]
    fn test_unknown_action_is_error() {
        assert!(parse_reply("ACTION: hold\nREASON: unsure").is_err());
        assert!(parse_reply("ACTION: yes").is_err());
    }

    #[test]
    fn test_missing_reason_gets_default() {
        let parsed = parse_reply("ACTION: skip").unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Skip);
        assert_eq!(parsed.reason, "no reason given");
    }

    #[test]
    fn test_first_action_line_wins() {
        let parsed = parse_reply("ACTION: confirm\nACTION: skip\nREASON: first wins").unwrap();
        assert_eq!(parsed.action, AdvisoryAction::Confirm);
    }
}
