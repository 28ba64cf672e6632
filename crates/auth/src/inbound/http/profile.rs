use app_core::error::AppError;
use app_core::extractors::AppForm;
use app_core::response::Response;
use axum::debug_handler;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect};

use crate::domain::entity::identity::ContactField;
use crate::domain::inout::prelude::*;
use crate::inbound::middleware::CurrentIdentity;
use crate::inbound::model::prelude::*;
use crate::inbound::state::AuthState;

#[debug_handler]
pub async fn get_profile(
    State(state): State<AuthState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<impl IntoResponse, AppError> {
    state
        .profile
        .get_profile(GetProfileInput { identity_id: identity.id })
        .await
        .map(ProfileResponse::from)
        .map(Response::from)
}

#[debug_handler]
pub async fn add_email(
    State(state): State<AuthState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppForm(req): AppForm<AddEmailRequest>,
) -> Result<Redirect, AppError> {
    state
        .profile
        .update_contact(UpdateContactInput {
            identity_id: identity.id,
            field: ContactField::Email,
            value: req.email,
        })
        .await?;

    Ok(Redirect::to("/profile"))
}

#[debug_handler]
pub async fn add_phone(
    State(state): State<AuthState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppForm(req): AppForm<AddPhoneRequest>,
) -> Result<Redirect, AppError> {
    state
        .profile
        .update_contact(UpdateContactInput {
            identity_id: identity.id,
            field: ContactField::Phone,
            value: req.phone,
        })
        .await?;

    Ok(Redirect::to("/profile"))
}

#[debug_handler]
pub async fn add_location(
    State(state): State<AuthState>,
    CurrentIdentity(identity): CurrentIdentity,
    AppForm(req): AppForm<AddLocationRequest>,
) -> Result<Redirect, AppError> {
    state
        .profile
        .update_contact(UpdateContactInput {
            identity_id: identity.id,
            field: ContactField::Location,
            value: req.location,
        })
        .await?;

    Ok(Redirect::to("/profile"))
}
