use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::{CurrentUser, JwtKeys},
        password, tokens,
    },
    error::ApiError,
    response::{message, success, Envelope, MessageEnvelope},
    state::AppState,
    users::{
        dto::{
            ForgotPasswordRequest, FriendUpdateRequest, LogInRequest, ResetPasswordRequest,
            SessionData, SignUpRequest, UserData, UserWithFriendsData, UsersData,
        },
        repo::{NewUser, User},
        services,
    },
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(sign_up))
        .route("/users/login", post(log_in))
        .route("/users/logout", get(log_out))
        .route("/users/verify/:activation_string", get(verify_account))
        .route("/users/forgotPassword", post(forgot_password))
        .route(
            "/users/resetPassword/:token",
            axum::routing::patch(reset_password),
        )
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user).patch(add_remove_friends))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Envelope<UserData>>), ApiError> {
    let valid = services::validate_sign_up(payload)?;

    if User::find_by_email(&state.db, &valid.email).await?.is_some() {
        warn!(email = %valid.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered.".into()));
    }

    let password_hash = password::hash_password(&valid.password)?;
    let activation_string = tokens::generate();

    let user = User::create(
        &state.db,
        &NewUser {
            first_name: valid.first_name,
            last_name: valid.last_name,
            image: valid.image,
            email: valid.email,
            password_hash,
            location: valid.location,
            occupation: valid.occupation,
            activation_string: activation_string.clone(),
        },
    )
    .await?;

    // Fire-and-forget; a failed send is logged, never fatal to sign-up.
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    let body =
        services::verification_email_body(&state.config.mail.public_base_url, &activation_string);
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, "Verify your account", &body).await {
            error!(error = %e, "verification email dispatch failed");
        }
    });

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((StatusCode::CREATED, success(UserData { user })))
}

#[instrument(skip(state, jar, payload))]
pub async fn log_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LogInRequest>,
) -> Result<(CookieJar, Json<Envelope<SessionData>>), ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::Validation(
            "Please provide your email and password.".into(),
        ));
    };
    let email = email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email).await?.ok_or_else(|| {
        warn!(email = %email, "login unknown email");
        ApiError::Auth(
            "No user found with those inputs. Please check your email or password.".into(),
        )
    })?;

    services::check_login(&user, &password).map_err(|e| {
        warn!(user_id = %user.id, "login rejected");
        e
    })?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(user.id)?;
    let jar = jar.add(keys.session_cookie(&token));

    info!(user_id = %user.id, "user logged in");
    Ok((jar, success(SessionData { token })))
}

#[instrument(skip(state, jar))]
pub async fn log_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageEnvelope>) {
    let keys = JwtKeys::from_ref(&state);
    (
        jar.add(keys.clear_session_cookie()),
        message("Successfully logged out."),
    )
}

#[instrument(skip(state, activation_string))]
pub async fn verify_account(
    State(state): State<AppState>,
    Path(activation_string): Path<String>,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let user = User::activate(&state.db, &activation_string)
        .await?
        .ok_or_else(|| {
            warn!("activation string matched no unverified account");
            ApiError::NotFound("No account matches that activation link.".into())
        })?;

    info!(user_id = %user.id, "account verified");
    Ok(success(UserData { user }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let email = payload
        .email
        .ok_or_else(|| ApiError::Validation("Please provide your email address.".into()))?
        .trim()
        .to_lowercase();

    let user = User::find_by_email(&state.db, &email).await?.ok_or_else(|| {
        ApiError::NotFound("No user found with that email address.".into())
    })?;

    let (plaintext, token_hash) = tokens::issue();
    let expires_at = OffsetDateTime::now_utc() + services::RESET_TOKEN_TTL;
    User::set_reset_token(&state.db, user.id, &token_hash, expires_at).await?;

    let body = services::reset_email_body(&state.config.mail.public_base_url, &plaintext);
    if let Err(e) = state
        .mailer
        .send(
            &user.email,
            "Your password reset token (valid for 10 minutes)",
            &body,
        )
        .await
    {
        // A stale unusable token must never linger.
        error!(error = %e, user_id = %user.id, "reset email dispatch failed");
        if let Err(e) = User::clear_reset_token(&state.db, user.id).await {
            error!(error = %e, user_id = %user.id, "reset token cleanup failed");
        }
        return Err(ApiError::Delivery(
            "There was an error sending the email. Try again later.".into(),
        ));
    }

    info!(user_id = %user.id, "reset token issued");
    Ok(message("Reset token sent to email."))
}

#[instrument(skip(state, payload, token))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let token_hash = tokens::hash(&token);
    let user = User::find_by_reset_token(&state.db, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Validation("Token is invalid or has expired.".into()))?;

    let valid_window = user
        .password_reset_token
        .as_deref()
        .zip(user.password_reset_expires)
        .map(|(stored_hash, expires_at)| tokens::verify(&token, stored_hash, expires_at))
        .unwrap_or(false);
    if !valid_window {
        return Err(ApiError::Validation("Token is invalid or has expired.".into()));
    }

    let new_password =
        services::validate_new_password(payload.password, payload.password_confirm)?;
    let password_hash = password::hash_password(&new_password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(message(
        "Password reset successfully. Please log in with your new password.",
    ))
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Envelope<UsersData>>, ApiError> {
    let users = User::list(&state.db).await?;
    Ok(success(UsersData { users }))
}

#[instrument(skip(state, _user))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Envelope<UserWithFriendsData>>, ApiError> {
    let target = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user found with that ID.".into()))?;
    let friends = User::friends_of(&state.db, target.id).await?;
    Ok(success(UserWithFriendsData {
        user: target,
        friends,
    }))
}

/// Toggles `friend_id` in the friend set of the identity named in the path:
/// added when absent, removed when present.
#[instrument(skip(state, _user))]
pub async fn add_remove_friends(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<FriendUpdateRequest>,
) -> Result<Json<Envelope<UserWithFriendsData>>, ApiError> {
    let friend_id = payload
        .friend_id
        .ok_or_else(|| ApiError::Validation("Please provide a friend ID.".into()))?;

    let target = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user found with that ID.".into()))?;
    if User::find_by_id(&state.db, friend_id).await?.is_none() {
        return Err(ApiError::NotFound("No user found with that ID.".into()));
    }

    let added = User::add_friend(&state.db, target.id, friend_id).await?;
    if !added {
        User::remove_friend(&state.db, target.id, friend_id).await?;
    }
    info!(user_id = %target.id, %friend_id, added, "friend list updated");

    let friends = User::friends_of(&state.db, target.id).await?;
    Ok(success(UserWithFriendsData {
        user: target,
        friends,
    }))
}
