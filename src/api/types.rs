use serde::{Deserialize, Serialize};

/// Body of `POST /api/query`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    /// Serialized as `null` (not omitted) before the backend has issued an id.
    pub session_id: Option<String>,
}

/// Successful answer from `POST /api/query`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// Markdown-bearing answer text.
    pub answer: String,
    pub session_id: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Aggregate catalogue numbers from `GET /api/courses`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CourseStats {
    pub total_courses: u64,
    pub course_titles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_null_session() {
        let req = QueryRequest {
            query: "What is RAG?".to_string(),
            session_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "What is RAG?");
        assert!(json["session_id"].is_null());
    }

    #[test]
    fn test_response_sources_default_to_empty() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"answer":"hi","session_id":"session_1"}"#).unwrap();
        assert!(resp.sources.is_empty());
        assert_eq!(resp.session_id, "session_1");
    }

    #[test]
    fn test_response_missing_session_is_rejected() {
        let parsed = serde_json::from_str::<QueryResponse>(r#"{"answer":"hi","sources":[]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_course_stats_parse() {
        let stats: CourseStats =
            serde_json::from_str(r#"{"total_courses":2,"course_titles":["MCP","RAG"]}"#).unwrap();
        assert_eq!(stats.total_courses, 2);
        assert_eq!(stats.course_titles, vec!["MCP", "RAG"]);
    }
}
