use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    Res,
    api::{AppState, browser_session, existing_session, forget_session},
    error::{AppError, AuthError},
    management::{LoginOutcome, SharedSession},
    spotify::AuthorizationServer,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub expires_at: Option<u64>,
}

fn page(body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>Spotify Playlist Analyzer</title></head>\
         <body><h1>Spotify Playlist Analyzer</h1>{body}</body></html>"
    ))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const LOGIN_LINK: &str = "<p><a href=\"/login\">Login with Spotify</a></p>";

/// Landing page: login link, failed login notice, or links to the views.
///
/// Only reads the browser's session; a visit without one gets the login link
/// and leaves nothing behind in the store.
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let Ok(session) = existing_session(&state, &jar).await else {
        return page(LOGIN_LINK);
    };
    let mut session = session.lock().await;

    let body = if let Some(reason) = session.take_failure() {
        format!(
            "<p>Failed to authenticate: {}</p><p><a href=\"/login\">Try again</a></p>",
            escape(&reason)
        )
    } else if session.is_authenticated() {
        "<p>Logged in with Spotify.</p>\
         <ul><li><a href=\"/api/playlists\">Playlists</a></li></ul>\
         <form method=\"post\" action=\"/logout\"><button>Log out</button></form>"
            .to_string()
    } else {
        LOGIN_LINK.to_string()
    };

    page(&body)
}

/// Starts a login and shows the link to the provider's authorization page.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, session) = browser_session(&state, jar).await;
    let started = session.lock().await.begin_login(state.authorizer.as_ref());

    match started {
        Ok(Some(url)) => (
            jar,
            page(&format!(
                "<p>Please log in <a href=\"{}\">here</a>.</p>\
                 <p>You will be sent back to the dashboard afterwards.</p>",
                escape(&url)
            )),
        )
            .into_response(),
        Ok(None) => (jar, Redirect::to("/")).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Provider redirect target; redeems the code and returns to the landing page,
/// which shows the failure if there was one.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let session = match existing_session(&state, &jar).await {
        Ok(session) => session,
        Err(_) => {
            return page("<p>Your login session expired. <a href=\"/login\">Log in again</a>.</p>")
                .into_response();
        }
    };

    // Other failures are kept in the session and rendered by the index page.
    match finish_login(&session, state.authorizer.as_ref(), params).await {
        Err(AppError::Auth(AuthError::NoPendingLogin)) => page(
            "<p>Failed to authenticate: this login link was already used or replaced.</p>\
             <p><a href=\"/login\">Log in again</a></p>",
        )
        .into_response(),
        _ => Redirect::to("/").into_response(),
    }
}

/// Login callback of the CLI's one-shot callback server.
pub async fn terminal_callback(
    Query(params): Query<CallbackParams>,
    Extension(session): Extension<SharedSession>,
    Extension(authorizer): Extension<Arc<dyn AuthorizationServer>>,
) -> Html<&'static str> {
    match finish_login(&session, authorizer.as_ref(), params).await {
        Ok(_) => Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
        Err(_) => Html("<h4>Login failed.</h4><p>Check the terminal for details.</p>"),
    }
}

async fn finish_login(
    session: &SharedSession,
    authorizer: &dyn AuthorizationServer,
    params: CallbackParams,
) -> Res<LoginOutcome> {
    let mut session = session.lock().await;

    if let Some(error) = params.error {
        return Err(session.reject_login(&error).into());
    }

    match (params.code, params.state) {
        (Some(code), Some(state)) => session.complete_login(authorizer, &code, &state).await,
        _ => Err(session
            .reject_login("callback without authorization code")
            .into()),
    }
}

/// Ends the browser's session: the store entry goes away and the cookie expires.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, session) = forget_session(&state, jar).await;
    if let Some(session) = session {
        session.lock().await.logout();
    }
    (jar, Redirect::to("/"))
}

pub async fn session_status(State(state): State<AppState>, jar: CookieJar) -> Json<SessionStatus> {
    let status = match existing_session(&state, &jar).await {
        Ok(session) => {
            let session = session.lock().await;
            SessionStatus {
                authenticated: session.is_authenticated(),
                expires_at: session.expires_at(),
            }
        }
        Err(_) => SessionStatus {
            authenticated: false,
            expires_at: None,
        },
    };
    Json(status)
}
