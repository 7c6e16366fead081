use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{
    Res,
    config::SpotifySettings,
    error::{AppError, AuthError, Service},
    spotify::{AuthorizationServer, check_status, read_json},
    types::{Token, TokenResponse},
};

/// Spotify accounts service: authorize URL and code exchange.
#[derive(Clone)]
pub struct SpotifyAuthorizer {
    http: Client,
    settings: SpotifySettings,
}

impl SpotifyAuthorizer {
    pub fn new(settings: &SpotifySettings, timeout: Duration) -> Res<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::from_reqwest(Service::Spotify, e))?;

        Ok(Self {
            http,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl AuthorizationServer for SpotifyAuthorizer {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> Res<String> {
        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("scope", self.settings.scope.as_str()),
                ("state", state),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid SPOTIFY_API_AUTH_URL: {e}")))?;

        Ok(url.into())
    }

    /// Exchanges the code with client credentials in the Basic auth header and
    /// the PKCE verifier that matches the challenge of the authorize request.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Res<Token> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        let response = check_status(response).await.map_err(|e| match e {
            AppError::Upstream { message, .. } => AuthError::ExchangeFailed(message).into(),
            AppError::Auth(_) => AuthError::ExchangeFailed("client credentials rejected".into()).into(),
            other => other,
        })?;

        let token: TokenResponse = read_json(response).await?;
        Ok(token.into())
    }
}
