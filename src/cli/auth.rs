use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::time::sleep;

use crate::{
    config::Settings,
    error,
    management::{Session, SharedSession},
    server::start_callback_server,
    spotify::AuthorizationServer,
    success, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Logs in through the browser and returns the authenticated in-memory session.
///
/// Starts the callback server on `SERVER_ADDRESS`, opens the provider's
/// authorization page and waits until the callback completed the exchange.
/// The token only lives in the returned session.
pub async fn login(settings: &Settings, authorizer: Arc<dyn AuthorizationServer>) -> SharedSession {
    let session = Session::shared();

    let server_session = Arc::clone(&session);
    let server_authorizer = Arc::clone(&authorizer);
    let addr = settings.server_address;
    tokio::spawn(async move {
        if let Err(e) = start_callback_server(addr, server_session, server_authorizer).await {
            warning!("Login callback server stopped: {}", e);
        }
    });

    let started = session.lock().await.begin_login(authorizer.as_ref());
    let auth_url = match started {
        Ok(Some(url)) => url,
        Ok(None) => return session,
        Err(e) => error!("Cannot start login: {}", e),
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_login(&session).await {
        Ok(()) => success!("Authentication successful!"),
        Err(reason) => error!("Authentication failed: {}", reason),
    }

    session
}

/// Polls the session until the callback authenticated it, failed, or timed out.
async fn wait_for_login(session: &SharedSession) -> Result<(), String> {
    let start = Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        {
            let mut session = session.lock().await;
            if session.is_authenticated() {
                return Ok(());
            }
            if let Some(reason) = session.take_failure() {
                return Err(reason);
            }
        }
        sleep(Duration::from_millis(500)).await;
    }

    Err("timed out waiting for the browser login".to_string())
}
