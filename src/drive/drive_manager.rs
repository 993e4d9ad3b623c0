use std::io::Cursor;
use std::path::Path;

use error_stack::{report, Context, Result, ResultExt};
use google_drive3::{api::File, DriveHub};
use serde::{Deserialize, Serialize};

use crate::config::drive_config::DriveConfig;
use crate::directory::{DirectoryMapping, ProvisionPlan};

use super::{auth, http_client};

/// MIME type Drive uses for native Google Sheets files.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

pub struct DriveManager {
    pub config: DriveConfig,
    hub: DriveHub<
        google_drive3::hyper_rustls::HttpsConnector<google_drive3::hyper::client::HttpConnector>,
    >,
}

impl std::fmt::Debug for DriveManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum DriveManagerError {
    NoScopes,
    AuthFailed,
    DirectoryUnavailable,
    FailedToCopyTemplate,
    FailedToCreateSheet,
}

impl std::fmt::Display for DriveManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Context for DriveManagerError {}

/// The slice of Drive file metadata callers care about after provisioning.
/// Whatever the API returns is passed through, no fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub kind: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

impl From<File> for SheetSummary {
    fn from(file: File) -> Self {
        SheetSummary {
            kind: file.kind,
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
        }
    }
}

fn copy_request(sheet_name: &str, folder_id: &str) -> File {
    File {
        name: Some(sheet_name.to_owned()),
        parents: Some(vec![folder_id.to_owned()]),
        ..Default::default()
    }
}

fn create_request(sheet_name: &str, folder_id: &str) -> File {
    File {
        name: Some(sheet_name.to_owned()),
        mime_type: Some(SPREADSHEET_MIME_TYPE.to_owned()),
        parents: Some(vec![folder_id.to_owned()]),
        ..Default::default()
    }
}

impl DriveManager {
    /// Builds a Drive hub authorized with the configured service account.
    pub async fn connect(config: DriveConfig) -> Result<Self, DriveManagerError> {
        if config.scopes.is_empty() {
            return Err(report!(DriveManagerError::NoScopes));
        }

        let client = http_client::http_client();
        let auth = match auth::auth(&config, client.clone()).await {
            Ok(auth) => auth,
            Err(error) => {
                log::error!("unable to connect to Drive: {error:?}");
                return Err(error.change_context(DriveManagerError::AuthFailed));
            }
        };

        let hub = DriveHub::new(client, auth);
        log::info!("drive service created successfully");

        Ok(DriveManager { config, hub })
    }

    /// Provisions a sheet named `sheet_name` for `request_type`, resolving
    /// template and destination folder from the directory file at
    /// `directory_path`. The file is re-read on every call so edits take
    /// effect without a restart.
    pub async fn provision_sheet(
        &self,
        sheet_name: &str,
        request_type: &str,
        directory_path: &Path,
    ) -> Result<SheetSummary, DriveManagerError> {
        let plan = DirectoryMapping::load(directory_path, self.config.folder_field.as_ref())
            .and_then(|mapping| mapping.plan(request_type))
            .map_err(|error| {
                log::error!("error resolving directory mapping: {error}");
                error
            })
            .change_context(DriveManagerError::DirectoryUnavailable)?;

        match plan {
            ProvisionPlan::CopyTemplate {
                source_file_id,
                folder_id,
            } => self.copy_template(&source_file_id, sheet_name, &folder_id).await,
            ProvisionPlan::CreateBlank { folder_id } => {
                self.create_blank(sheet_name, &folder_id).await
            }
        }
    }

    pub async fn copy_template(
        &self,
        source_file_id: &str,
        sheet_name: &str,
        folder_id: &str,
    ) -> Result<SheetSummary, DriveManagerError> {
        let call = self
            .hub
            .files()
            .copy(copy_request(sheet_name, folder_id), source_file_id);
        let call = self
            .config
            .scopes
            .iter()
            .fold(call, |call, scope| call.add_scope(scope));

        let (_, file) = call
            .doit()
            .await
            .change_context(DriveManagerError::FailedToCopyTemplate)
            .map_err(|report| {
                log::error!("error copying template: {report:?}");
                report
            })?;

        Ok(file.into())
    }

    pub async fn create_blank(
        &self,
        sheet_name: &str,
        folder_id: &str,
    ) -> Result<SheetSummary, DriveManagerError> {
        let mime_type: mime::Mime = SPREADSHEET_MIME_TYPE
            .parse::<mime::Mime>()
            .change_context(DriveManagerError::FailedToCreateSheet)?;

        let call = self.hub.files().create(create_request(sheet_name, folder_id));
        let call = self
            .config
            .scopes
            .iter()
            .fold(call, |call, scope| call.add_scope(scope));

        // Metadata-only create: Drive ignores empty media for native types.
        let (_, file) = call
            .upload(Cursor::new(Vec::new()), mime_type)
            .await
            .change_context(DriveManagerError::FailedToCreateSheet)
            .map_err(|report| {
                log::error!("error creating file: {report:?}");
                report
            })?;

        Ok(file.into())
    }
}
