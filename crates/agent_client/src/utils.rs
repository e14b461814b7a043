use crate::ui_node::{ComponentKind, UiNode};
use crate::ApiError;
use reqwest::{Response, StatusCode};

/// Map a non-success HTTP status to an [`ApiError`].
pub async fn check_response_error(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let response_text = response
        .text()
        .await
        .map_err(|e| ApiError::NetworkError(e.to_string()))?;

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(response_text),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Authentication(response_text)
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => ApiError::InvalidRequest(format!(
            "Status {status}: {response_text}"
        )),
        status if status.is_server_error() => ApiError::ServiceError(response_text),
        _ => ApiError::Unknown(format!("Status {status}: {response_text}")),
    })
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse model output into a UI tree.
///
/// Accepts a single node or a top-level array of nodes, which is wrapped in a
/// `container` so the caller always gets one root.
pub fn parse_ui_response(text: &str) -> Result<UiNode, ApiError> {
    let payload = strip_code_fence(text);
    if payload.is_empty() {
        return Err(ApiError::InvalidResponse("empty reply".to_string()));
    }

    match serde_json::from_str::<UiNode>(payload) {
        Ok(node) => Ok(node),
        Err(node_err) => match serde_json::from_str::<Vec<UiNode>>(payload) {
            Ok(nodes) => Ok(UiNode::new(ComponentKind::Container).with_children(nodes)),
            Err(_) => Err(ApiError::InvalidResponse(node_err.to_string())),
        },
    }
}
