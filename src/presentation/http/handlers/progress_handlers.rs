//! Progress Handlers
//!
//! SSE endpoint streaming a job's progress events. Grounded on
//! `streaming_handlers.rs`'s `Body::from_stream` habit of handing a
//! use-case-produced stream straight to the response, adapted here to
//! axum's `Sse` response type; framing semantics (`data:` payloads,
//! `:`-prefixed keep-alives, a final synthetic close event) come from
//! `application/use_cases/stream_progress.rs`'s `ProgressEvent`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::stream::StreamExt;
use uuid::Uuid;

use crate::application::use_cases::stream_progress::{ProgressEvent, StreamProgressUseCase};
use crate::shared::error::{ApplicationError, JobError};

/// `GET {api_prefix}/progress/{job_id}` — fails fast with 404 before any
/// SSE framing is written if the job doesn't exist.
pub async fn stream_progress(
    State(use_case): State<Arc<StreamProgressUseCase>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let events = use_case.stream(job_id).await.map_err(map_error)?;

    let sse_stream = events.map(|event| -> Result<Event, std::convert::Infallible> {
        Ok(match event {
            ProgressEvent::Payload(value) => Event::default()
                .json_data(value)
                .unwrap_or_else(|_| Event::default().event("error").data("{}")),
            ProgressEvent::KeepAlive => Event::default().comment("keep-alive"),
            ProgressEvent::Close => Event::default().event("close").data("{}"),
        })
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn map_error(e: ApplicationError) -> (StatusCode, String) {
    match e {
        ApplicationError::Job(JobError::NotFound(id)) => (StatusCode::NOT_FOUND, format!("job {id} not found")),
        other => {
            tracing::error!("progress stream error: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_error_reports_unknown_job_as_404() {
        let (status, body) = map_error(ApplicationError::Job(JobError::NotFound("abc".to_string())));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("abc"));
    }
}
