//! Request and response shapes for the `getUserQuestionStats` query.

use leetboard_core::counts::SolvedCounts;
use leetboard_core::fetch::FetchError;
use serde::{Deserialize, Serialize};

/// GraphQL document asking for accepted-question counts per difficulty.
pub const SOLVED_QUERY: &str = "\
query getUserQuestionStats($userSlug: String!) {
    userProfileUserQuestionProgressV2(userSlug: $userSlug) {
        numAcceptedQuestions {
            difficulty
            count
        }
    }
}";

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
pub struct Variables<'a> {
    #[serde(rename = "userSlug")]
    pub user_slug: &'a str,
}

impl<'a> GraphQlRequest<'a> {
    pub fn solved_counts(user_slug: &'a str) -> Self {
        Self {
            query: SOLVED_QUERY,
            variables: Variables { user_slug },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "userProfileUserQuestionProgressV2")]
    progress: Option<QuestionProgress>,
}

#[derive(Debug, Deserialize)]
struct QuestionProgress {
    #[serde(rename = "numAcceptedQuestions", default)]
    num_accepted_questions: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DifficultyCount {
    difficulty: String,
    count: i64,
}

/// Decode a GraphQL response body into solved counts.
///
/// - A non-empty `errors` array or a null progress object means the user
///   does not exist on the platform.
/// - An empty `numAcceptedQuestions` list is treated as malformed.
/// - Entries that are not `{difficulty, count}` objects, or carry an unknown
///   difficulty, are logged and skipped. Missing difficulties count as zero.
pub fn parse_solved_counts(
    user_id: &str,
    body: serde_json::Value,
) -> Result<SolvedCounts, FetchError> {
    let response: GraphQlResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if let Some(errors) = response.errors.as_ref().filter(|e| !e.is_empty()) {
        tracing::warn!(user_id, ?errors, "Platform returned GraphQL errors");
        return Err(FetchError::UserNotFound(user_id.to_string()));
    }

    let progress = response
        .data
        .ok_or_else(|| FetchError::Malformed("missing 'data' object".to_string()))?
        .progress
        .ok_or_else(|| FetchError::UserNotFound(user_id.to_string()))?;

    if progress.num_accepted_questions.is_empty() {
        return Err(FetchError::Malformed(
            "empty 'numAcceptedQuestions' list".to_string(),
        ));
    }

    let mut counts = SolvedCounts::ZERO;
    for entry in progress.num_accepted_questions {
        let parsed: DifficultyCount = match serde_json::from_value(entry.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(user_id, %entry, error = %e, "Skipping unreadable difficulty entry");
                continue;
            }
        };
        match parsed.difficulty.to_ascii_uppercase().as_str() {
            "EASY" => counts.easy = parsed.count,
            "MEDIUM" => counts.medium = parsed.count,
            "HARD" => counts.hard = parsed.count,
            other => {
                tracing::warn!(user_id, difficulty = other, "Skipping unknown difficulty");
            }
        }
    }

    Ok(counts)
}
