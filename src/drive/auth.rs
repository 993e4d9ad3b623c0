use error_stack::{Result, ResultExt};
use google_drive3::oauth2::{self, authenticator::Authenticator};
use google_drive3::{hyper, hyper_rustls};

use crate::config::drive_config::DriveConfig;

#[derive(Debug)]
pub enum AuthError {
    KeyFileUnreadable,
    AuthenticatorBuild,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl error_stack::Context for AuthError {}

pub async fn auth(
    config: &DriveConfig,
    client: hyper::Client<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
) -> Result<Authenticator<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>, AuthError> {
    let key_path = config.key_file.as_ref();
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(key_path)
        .await
        .change_context(AuthError::KeyFileUnreadable)
        .attach_printable_lazy(|| format!("key file: {key_path}"))?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(AuthError::AuthenticatorBuild)
}
