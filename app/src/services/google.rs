use crate::config::app_config;
use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Profile of a google account, from the openid userinfo endpoint
#[derive(Deserialize, Debug, Clone)]
pub struct GoogleProfile {
    /// google account id
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

/// Google OAuth2 authorization code flow client
#[derive(Clone)]
pub struct GoogleOAuth {
    client: GoogleClient,
    http: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(
        http: reqwest::Client,
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(client_id))
            .set_client_secret(ClientSecret::new(client_secret))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string())?)
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?)
            .set_redirect_uri(
                RedirectUrl::new(redirect_url).context("invalid GOOGLE_REDIRECT_URL")?,
            );

        Ok(Self { client, http })
    }

    /// creates the client from the app config, returns `None` when the google
    /// credentials are not configured
    pub fn from_config(http: reqwest::Client) -> Result<Option<Self>> {
        let cfg = app_config();

        match (&cfg.google_client_id, &cfg.google_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok(Some(
                Self::new(http, id.clone(), secret.clone(), cfg.google_redirect_url.clone())?,
            )),
            _ => Ok(None),
        }
    }

    /// url to redirect the user to and the CSRF state that must be checked on the callback
    pub fn authorize_url(&self) -> (Url, CsrfToken) {
        self.client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(String::from("openid")))
            .add_scope(Scope::new(String::from("profile")))
            .add_scope(Scope::new(String::from("email")))
            .url()
    }

    /// exchanges the authorization code for a access token and fetches the account profile
    pub async fn fetch_profile(&self, code: String) -> Result<GoogleProfile> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&self.http)
            .await
            .context("failed to exchange google authorization code")?;

        let profile = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleProfile>()
            .await
            .context("failed to parse google profile")?;

        Ok(profile)
    }
}
