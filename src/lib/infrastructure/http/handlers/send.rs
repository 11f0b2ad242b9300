//! Send notice handlers

use askama::Template;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    domain::communication::{
        emails::{billing_notice, NoticeTemplate, BILLING_NOTICE_SUBJECT},
        mailer::{Mailer, Message},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// The send response
#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    /// The subject of the message
    pub subject: String,

    /// When the message was handed to the mailer
    pub queued_at: DateTime<Utc>,
}

fn notice<M: Mailer>(state: &AppState<M>) -> Result<Message, ApiError> {
    let template = NoticeTemplate::new(billing_notice().to_string(), &state.config.footer);
    let body = css_inline::inline(&template.render()?)?;

    Ok(Message::new(
        &state.config.sender,
        &state.config.recipient,
        BILLING_NOTICE_SUBJECT,
        body,
    ))
}

/// Send the notice in the background
pub async fn handler<M: Mailer>(
    State(state): State<AppState<M>>,
) -> Result<Json<SendResponse>, ApiError> {
    let message = notice(&state)?;

    debug!(to = message.to(), "queueing notice");

    state.mailer.send_async(state.config.deadline(), message);

    Ok(Json(SendResponse {
        subject: BILLING_NOTICE_SUBJECT.to_string(),
        queued_at: Utc::now(),
    }))
}

/// Send the notice and wait for the mail server
pub async fn wait_handler<M: Mailer>(
    State(state): State<AppState<M>>,
) -> Result<(StatusCode, Json<SendResponse>), ApiError> {
    let message = notice(&state)?;
    let queued_at = Utc::now();

    state.mailer.send(state.config.deadline(), message).await?;

    Ok((
        StatusCode::CREATED,
        Json(SendResponse {
            subject: BILLING_NOTICE_SUBJECT.to_string(),
            queued_at,
        }),
    ))
}
