use std::fmt::Write as _;

use serde_json::Value;

use super::assessor::AssessmentError;
use crate::workflows::contacts::ContactDraft;

const RESPONSE_SCHEMA: &str = r#"{
  "is_genuine_person": boolean,
  "is_suspicious": boolean,
  "suspicion_score": number between 0.0 and 1.0 (1.0 is very suspicious),
  "suspicion_reason": string,
  "data_completeness_score": number between 0.0 and 1.0,
  "data_accuracy_score": number between 0.0 and 1.0,
  "quality_issues": [string],
  "recommendations": [string]
}"#;

pub(crate) fn build_assessment_prompt(draft: &ContactDraft) -> String {
    let field = |value: &Option<String>, fallback: &'static str| -> String {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    };

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Assess the quality and authenticity of the following sales contact. \
         Respond ONLY with a JSON object and no text outside it, using this structure:"
    );
    let _ = writeln!(prompt, "{RESPONSE_SCHEMA}");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Contact data:");
    let _ = writeln!(prompt, "Name: {}", field(&draft.name, "not provided"));
    let _ = writeln!(prompt, "Phone: {}", field(&draft.phone, "not provided"));
    let _ = writeln!(prompt, "Email: {}", field(&draft.email, "not provided"));
    let _ = writeln!(prompt, "Source: {}", field(&draft.source, "not provided"));
    let _ = writeln!(prompt, "Notes: {}", field(&draft.notes, "none"));
    prompt
}

/// Pull the first well-formed JSON object out of free-form model output.
///
/// A fenced ```json block wins when present; otherwise every `{` is tried in order and
/// the first one that starts a complete object is returned, ignoring trailing text.
pub(crate) fn extract_json_object(text: &str) -> Result<Value, AssessmentError> {
    if let Some(fenced) = fenced_block(text) {
        return match serde_json::from_str::<Value>(fenced) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) => Err(AssessmentError::InvalidJson(
                "fenced block is not a JSON object".to_string(),
            )),
            Err(err) => Err(AssessmentError::InvalidJson(err.to_string())),
        };
    }

    let mut last_error = None;
    for (offset, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[offset..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value @ Value::Object(_))) => return Ok(value),
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                last_error.get_or_insert_with(|| err.to_string());
            }
            None => {}
        }
    }

    match last_error {
        Some(err) => Err(AssessmentError::InvalidJson(err)),
        None => Err(AssessmentError::MissingJson),
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n').map(|idx| idx + 1).unwrap_or(0);
    let info = after_fence[..body_start].trim();
    if !(info.is_empty() || info.eq_ignore_ascii_case("json")) {
        return None;
    }
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json() {
        let text = "Here you go:\n```json\n{\"is_suspicious\": true, \"suspicion_score\": 0.9}\n```\nThanks";
        let value = extract_json_object(text).expect("json extracted");
        assert_eq!(value["is_suspicious"], Value::Bool(true));
    }

    #[test]
    fn extracts_bare_object_with_trailing_text() {
        let text = "Analysis {\"is_suspicious\": false} -- end {not json";
        let value = extract_json_object(text).expect("json extracted");
        assert_eq!(value["is_suspicious"], Value::Bool(false));
    }

    #[test]
    fn skips_malformed_braces_before_a_valid_object() {
        let text = "{broken {\"quality_issues\": [\"short name\"]}";
        let value = extract_json_object(text).expect("json extracted");
        assert_eq!(value["quality_issues"][0], "short name");
    }

    #[test]
    fn reports_missing_json() {
        assert_eq!(
            extract_json_object("the contact looks fine"),
            Err(AssessmentError::MissingJson)
        );
    }

    #[test]
    fn reports_invalid_json() {
        assert!(matches!(
            extract_json_object("{\"is_suspicious\": tru"),
            Err(AssessmentError::InvalidJson(_))
        ));
    }

    #[test]
    fn prompt_lists_fields_with_fallbacks() {
        let draft = ContactDraft {
            name: Some("Ana Lopez".to_string()),
            phone: Some("+525512345678".to_string()),
            ..ContactDraft::default()
        };
        let prompt = build_assessment_prompt(&draft);
        assert!(prompt.contains("Name: Ana Lopez"));
        assert!(prompt.contains("Email: not provided"));
        assert!(prompt.contains("\"suspicion_score\""));
    }
}
