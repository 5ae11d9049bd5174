//! Domain records decoded from upstream payloads.
//!
//! Records are immutable after decode; each is routed exactly once to the
//! partition its fetch window selects.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use devpulse_warehouse::{AnswerRow, IssueRow, QuestionRow};

/// A GitHub issue as returned by the repository issues listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "number")]
    pub github_id: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Issue {
    pub fn to_row(&self) -> IssueRow {
        IssueRow {
            github_id: self.github_id,
            title: self.title.clone(),
            body: self.body.clone(),
            state: self.state.clone(),
            created_at: format_rfc3339(self.created_at),
            updated_at: format_rfc3339(self.updated_at),
        }
    }
}

/// A Stack Exchange question from the tagged questions listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default)]
    pub creation_date: Option<i64>,
}

impl Question {
    pub fn to_row(&self) -> QuestionRow {
        QuestionRow {
            question_id: self.question_id,
            title: self.title.clone(),
            body: self.body.clone(),
            is_answered: self.is_answered,
            creation_date: self.creation_date,
        }
    }
}

/// A Stack Exchange answer. `question_id` is filled in by the fan-out
/// fetch, which knows which question it asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer_id: i64,
    #[serde(default)]
    pub question_id: i64,
    #[serde(default)]
    pub body: Option<String>,
}

impl Answer {
    pub fn to_row(&self) -> AnswerRow {
        AnswerRow {
            answer_id: self.answer_id,
            question_id: self.question_id,
            body: self.body.clone(),
        }
    }
}

fn format_rfc3339(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("<unformattable>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_decodes_from_github_payload() {
        let issue: Issue = serde_json::from_str(
            r#"{
                "number": 1234,
                "title": "panic on empty config",
                "body": null,
                "state": "open",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-02T11:30:00Z",
                "labels": []
            }"#,
        )
        .expect("decodes");

        assert_eq!(issue.github_id, 1234);
        assert_eq!(issue.body, None);

        let row = issue.to_row();
        assert_eq!(row.created_at, "2024-03-01T10:00:00Z");
        assert_eq!(row.state, "open");
    }

    #[test]
    fn question_decodes_with_missing_optional_fields() {
        let question: Question = serde_json::from_str(
            r#"{"question_id": 55, "title": "how do slices work", "is_answered": true}"#,
        )
        .expect("decodes");

        assert!(question.is_answered);
        assert_eq!(question.body, None);
        assert_eq!(question.creation_date, None);
    }

    #[test]
    fn answer_row_carries_question_reference() {
        let mut answer: Answer =
            serde_json::from_str(r#"{"answer_id": 9, "body": "use ranges"}"#).expect("decodes");
        answer.question_id = 55;

        let row = answer.to_row();
        assert_eq!(row.answer_id, 9);
        assert_eq!(row.question_id, 55);
    }
}
