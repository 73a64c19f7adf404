//! RFC 9457 problem details for gate rejections and failures.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use authz_decision_sdk::DecisionError;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, title: &str, detail: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank".to_owned(),
            title: title.to_owned(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: None,
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            detail,
        )
    }

    /// Map a decision error to a response. Deliberate rejections keep their
    /// own message; failures are prefixed with `context`.
    #[must_use]
    pub fn from_decision_error(err: &DecisionError, context: &str) -> Self {
        match err {
            DecisionError::Unauthenticated(_) => {
                Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", err.to_string())
            }
            DecisionError::Forbidden(_) | DecisionError::AuthorizationDenied { .. } => {
                Self::new(StatusCode::FORBIDDEN, "Forbidden", err.to_string())
            }
            DecisionError::ServiceUnavailable(_)
            | DecisionError::MalformedResponse(_)
            | DecisionError::InvalidRequest(_)
            | DecisionError::Internal(_) => Self::internal(format!("{context}: {err}")),
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
            )],
            Json(self),
        )
            .into_response()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn rejections_keep_their_status_and_message() {
        let p = Problem::from_decision_error(&DecisionError::denied("object/dataset/read"), "ctx");
        assert_eq!(p.status, 403);
        assert_eq!(
            p.detail,
            "you are not permitted to perform `object/dataset/read` on required resources."
        );

        let p = Problem::from_decision_error(
            &DecisionError::Unauthenticated("Not authorized".to_owned()),
            "ctx",
        );
        assert_eq!(p.status, 401);
        assert_eq!(p.detail, "Not authorized");
    }

    #[test]
    fn failures_are_500_with_upstream_detail() {
        let p = Problem::from_decision_error(
            &DecisionError::ServiceUnavailable("decision request timed out after 50ms".to_owned()),
            "An error occurred while retrieving auth decision for the request",
        );
        assert_eq!(p.status, 500);
        assert_eq!(
            p.detail,
            "An error occurred while retrieving auth decision for the request: \
             service unavailable: decision request timed out after 50ms"
        );
    }

    #[test]
    fn response_uses_problem_content_type() {
        let response = Problem::internal("boom").with_instance("/x").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PROBLEM_CONTENT_TYPE
        );
    }
}
