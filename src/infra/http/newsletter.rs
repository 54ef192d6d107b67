//! Datastar endpoints for the newsletter signup form.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::{Form, Query, State},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use datastar::prelude::ElementPatchMode;
use serde::Deserialize;
use tracing::error;

use crate::{
    application::{
        newsletter::{KeyEventOutcome, RemoteStatus, SubmitOutcome, SubscribeForm},
        stream::{element_patch, finite_sse},
    },
    presentation::views::{NewsletterStatusPartial, NewsletterStatusView, TemplateRenderError},
};

use super::public::HttpState;
use askama::Template;

/// Element the status patches replace.
const NEWSLETTER_STATUS: &str = "#newsletter-status";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct NewsletterFormBody {
    email: Option<String>,
    consent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct KeyQuery {
    key: Option<String>,
}

fn parse_checkbox_flag(input: &Option<String>) -> bool {
    matches!(input.as_deref(), Some("on") | Some("true"))
}

fn hydrate_form(body: &NewsletterFormBody) -> SubscribeForm {
    let mut form = SubscribeForm::new();
    form.set_email(body.email.clone().unwrap_or_default());
    form.set_consent(parse_checkbox_flag(&body.consent));
    form
}

pub(super) async fn subscribe(
    State(state): State<HttpState>,
    Form(body): Form<NewsletterFormBody>,
) -> Response {
    let mut form = hydrate_form(&body);
    let outcome = state.newsletter.submit(&mut form).await;
    respond_with_outcome(state, form, outcome)
}

pub(super) async fn key_event(
    State(state): State<HttpState>,
    Query(query): Query<KeyQuery>,
    Form(body): Form<NewsletterFormBody>,
) -> Response {
    let mut form = hydrate_form(&body);
    let key = query.key.unwrap_or_default();

    match state.newsletter.handle_key_event(&mut form, &key).await {
        KeyEventOutcome::Committed(outcome) => respond_with_outcome(state, form, outcome),
        KeyEventOutcome::Ignored => status_patch_response(&state, &form),
    }
}

/// Answer a submission with status patches. A locally rejected submission
/// patches once; a dispatched one streams a patch per status report until the
/// submission resolves or a newer one supersedes it.
fn respond_with_outcome(
    state: HttpState,
    mut form: SubscribeForm,
    outcome: SubmitOutcome,
) -> Response {
    let mut submission = match outcome {
        SubmitOutcome::RejectedLocally => return status_patch_response(&state, &form),
        SubmitOutcome::Dispatched(submission) => submission,
    };

    let updates = stream! {
        while let Some(update) = submission.updates.recv().await {
            let terminal = matches!(
                update.status,
                RemoteStatus::Success | RemoteStatus::Error
            );
            if !state
                .newsletter
                .apply_update(&mut form, submission.ticket, update)
            {
                break;
            }

            match render_status_html(&state, &form) {
                Ok(html) => {
                    yield Ok::<Event, Infallible>(element_patch(
                        html,
                        NEWSLETTER_STATUS,
                        ElementPatchMode::Replace,
                    ));
                }
                Err(err) => {
                    error!(
                        target = "vetrina::http::newsletter",
                        error = ?err,
                        "Status partial failed to render mid-stream"
                    );
                    break;
                }
            }

            if terminal {
                break;
            }
        }
    };

    Sse::new(updates).into_response()
}

fn status_patch_response(state: &HttpState, form: &SubscribeForm) -> Response {
    match render_status_html(state, form) {
        Ok(html) => finite_sse(vec![element_patch(
            html,
            NEWSLETTER_STATUS,
            ElementPatchMode::Replace,
        )]),
        Err(err) => err.into_response(),
    }
}

fn render_status_html(
    state: &HttpState,
    form: &SubscribeForm,
) -> Result<String, TemplateRenderError> {
    let status = NewsletterStatusView::from_status(&form.status_view(), state.trust_remote_markup);
    NewsletterStatusPartial { status }.render().map_err(|err| {
        TemplateRenderError::new(
            "infra::http::newsletter::render_status_html",
            "Template rendering failed",
            err,
        )
    })
}
