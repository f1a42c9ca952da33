//! Boundary validation of test JSON coming from the generation service or
//! from the history store.

use serde_json::Value;

use crate::error::{QuizError, Result};
use crate::models::{AnswerOption, Question, Test};
use crate::quiz::{OPTION_PLACEHOLDER, QUESTION_PLACEHOLDER};

/// Parses the body of a successful `generate-test` response.
pub fn parse_test_response(body: &str) -> Result<Test> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| QuizError::MalformedResponse(format!("invalid JSON: {}", e)))?;
    validate_test(&value).map_err(QuizError::MalformedResponse)
}

/// Parses a test previously stored as JSON. Structural problems surface as
/// `MalformedTest` so the quiz screen can show them in place of questions.
pub fn parse_stored_test(json: &str) -> Result<Test> {
    let value: Value = serde_json::from_str(json).map_err(|_| QuizError::MalformedTest)?;
    validate_test(&value).map_err(|reason| {
        tracing::warn!(%reason, "Stored test failed validation");
        QuizError::MalformedTest
    })
}

/// Required: an object with a `questions` array whose items are objects with
/// at least one option. Missing texts fall back to placeholders and a missing
/// `correct` flag means false.
fn validate_test(value: &Value) -> std::result::Result<Test, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "test is not a JSON object".to_string())?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);

    let questions = object
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| "questions missing or not a list".to_string())?;

    let questions = questions
        .iter()
        .enumerate()
        .map(|(index, q)| validate_question(index, q))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Test { name, questions })
}

fn validate_question(index: usize, value: &Value) -> std::result::Result<Question, String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("question {} is not an object", index + 1))?;

    let question_text = object
        .get("question")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(QUESTION_PLACEHOLDER)
        .to_string();

    let options: Vec<AnswerOption> = match object.get("options") {
        Some(Value::Array(items)) => items.iter().map(validate_option).collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => return Err(format!("options of question {} are not a list", index + 1)),
    };

    if options.is_empty() {
        return Err(format!("question {} has no options", index + 1));
    }

    Ok(Question {
        question_text,
        options,
    })
}

fn validate_option(value: &Value) -> AnswerOption {
    let answer_text = value
        .get("answer")
        .and_then(Value::as_str)
        .unwrap_or(OPTION_PLACEHOLDER)
        .to_string();
    let is_correct = value
        .get("correct")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    AnswerOption {
        answer_text,
        is_correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response() {
        let body = r#"{
            "name": "Biology Quiz",
            "questions": [
                {"question": "What is produced?", "options": [
                    {"answer": "Light", "correct": false},
                    {"answer": "Chemical energy", "correct": true}
                ]}
            ]
        }"#;
        let test = parse_test_response(body).unwrap();
        assert_eq!(test.name.as_deref(), Some("Biology Quiz"));
        assert_eq!(test.questions.len(), 1);
        assert_eq!(test.questions[0].options.len(), 2);
        assert_eq!(test.questions[0].correct_index(), Some(1));
    }

    #[test]
    fn test_missing_questions_is_malformed() {
        let result = parse_test_response(r#"{"name": "x"}"#);
        assert!(matches!(result, Err(QuizError::MalformedResponse(_))));

        let result = parse_test_response(r#"{"questions": "nope"}"#);
        assert!(matches!(result, Err(QuizError::MalformedResponse(_))));

        let result = parse_test_response("[1, 2]");
        assert!(matches!(result, Err(QuizError::MalformedResponse(_))));

        let result = parse_test_response("not json");
        assert!(matches!(result, Err(QuizError::MalformedResponse(_))));
    }

    #[test]
    fn test_empty_question_list_is_accepted() {
        let test = parse_test_response(r#"{"questions": []}"#).unwrap();
        assert!(test.name.is_none());
        assert!(test.questions.is_empty());
    }

    #[test]
    fn test_question_without_options_is_rejected() {
        let result = parse_test_response(r#"{"questions": [{"question": "Q"}]}"#);
        assert!(matches!(result, Err(QuizError::MalformedResponse(_))));
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let body = r#"{"questions": [{"options": [{"answer": "a"}, {"correct": true}]}]}"#;
        let test = parse_test_response(body).unwrap();
        let question = &test.questions[0];
        assert_eq!(question.question_text, QUESTION_PLACEHOLDER);
        assert_eq!(question.options[0].answer_text, "a");
        assert!(!question.options[0].is_correct);
        assert_eq!(question.options[1].answer_text, OPTION_PLACEHOLDER);
        assert!(question.options[1].is_correct);
    }

    #[test]
    fn test_stored_test_maps_to_malformed_test() {
        assert!(matches!(
            parse_stored_test(r#"{"name": "x"}"#),
            Err(QuizError::MalformedTest)
        ));
        assert!(matches!(parse_stored_test("{"), Err(QuizError::MalformedTest)));
    }
}
