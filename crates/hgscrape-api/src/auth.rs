// Router authentication
//
// Two-step login: fetch a random anti-forgery token, then submit it with
// the credentials. The router answers by setting a session cookie in the
// client's jar; subsequent page requests carry it automatically.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::RouterClient;
use crate::error::Error;

const TOKEN_PATH: &str = "/asp/GetRandCount.asp";
const LOGIN_PATH: &str = "/login.cgi";

/// Language cookie the login form expects to be present.
const LANGUAGE_COOKIE: &str = "Cookie=body:Language:portuguese:id=1";

impl RouterClient {
    /// Authenticate with the router using username/password.
    ///
    /// On success the session cookie is stored in the client's cookie jar
    /// and used for all subsequent requests.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let token = self.request_token().await?;

        let url = self.url(LOGIN_PATH)?;
        debug!("logging in at {}", url);

        let form = [
            ("UserName", username),
            ("PassWord", password.expose_secret()),
            ("x.X_HW_Token", token.as_str()),
        ];

        let resp = self
            .http()
            .post(url)
            .header(reqwest::header::COOKIE, LANGUAGE_COOKIE)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {status})"),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// Fetch the one-time token the login form must echo back.
    async fn request_token(&self) -> Result<String, Error> {
        let url = self.url(TOKEN_PATH)?;
        debug!("requesting login token at {}", url);

        let resp = self.http().post(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status})"),
            });
        }

        let body = resp.text().await?;
        let token = body.trim_start_matches('\u{feff}').trim();
        if token.is_empty() {
            return Err(Error::Authentication {
                message: "router returned an empty login token".into(),
            });
        }

        Ok(token.to_owned())
    }
}
