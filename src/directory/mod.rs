use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("could not read directory file '{path}'")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("directory file is not a valid mapping document")]
    Malformed(#[from] serde_json::Error),
    #[error("directory file has no '{0}' mapping")]
    MissingFolderField(String),
    #[error("no destination folder for request type '{0}'")]
    UnknownRequestType(String),
}

/// On-disk shape of the directory file: a `templates` mapping plus one
/// folder mapping whose field name is configurable.
#[derive(Debug, Deserialize)]
struct RawDirectory {
    #[serde(default)]
    templates: HashMap<String, String>,
    #[serde(flatten)]
    sections: HashMap<String, HashMap<String, String>>,
}

/// Lookup table translating request types into Drive resource ids:
/// template source files to copy and destination folders to place new
/// sheets into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMapping {
    templates: HashMap<String, String>,
    folders: HashMap<String, String>,
}

/// The single branch of the provisioning flow: copy an existing template
/// when the directory lists one for the request type, otherwise create a
/// blank spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionPlan {
    CopyTemplate {
        source_file_id: String,
        folder_id: String,
    },
    CreateBlank {
        folder_id: String,
    },
}

impl DirectoryMapping {
    /// Reads the directory file from disk. Called once per provisioning
    /// request, the file is never cached.
    pub fn load(path: &Path, folder_field: &str) -> Result<Self, DirectoryError> {
        let document = fs::read_to_string(path).map_err(|source| DirectoryError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&document, folder_field)
    }

    pub fn from_json(document: &str, folder_field: &str) -> Result<Self, DirectoryError> {
        let raw: RawDirectory = serde_json::from_str(document)?;
        let folders = raw
            .sections
            .get(folder_field)
            .cloned()
            .ok_or_else(|| DirectoryError::MissingFolderField(folder_field.to_owned()))?;

        Ok(DirectoryMapping {
            templates: raw.templates,
            folders,
        })
    }

    pub fn template_for(&self, request_type: &str) -> Option<&str> {
        self.templates.get(request_type).map(String::as_str)
    }

    pub fn folder_for(&self, request_type: &str) -> Result<&str, DirectoryError> {
        self.folders
            .get(request_type)
            .map(String::as_str)
            .ok_or_else(|| DirectoryError::UnknownRequestType(request_type.to_owned()))
    }

    /// Branch selection only consults `templates`; the destination folder
    /// must exist on either path.
    pub fn plan(&self, request_type: &str) -> Result<ProvisionPlan, DirectoryError> {
        let folder_id = self.folder_for(request_type)?.to_owned();
        match self.template_for(request_type) {
            Some(source_file_id) => Ok(ProvisionPlan::CopyTemplate {
                source_file_id: source_file_id.to_owned(),
                folder_id,
            }),
            None => Ok(ProvisionPlan::CreateBlank { folder_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DIRECTORY: &str = r#"{
        "templates": { "monthly": "tpl123" },
        "folders": { "monthly": "f1", "adhoc": "f2" }
    }"#;

    #[test]
    fn test_plan_copies_when_template_listed() {
        let mapping = DirectoryMapping::from_json(DIRECTORY, "folders").unwrap();
        assert_eq!(
            mapping.plan("monthly").unwrap(),
            ProvisionPlan::CopyTemplate {
                source_file_id: "tpl123".to_owned(),
                folder_id: "f1".to_owned(),
            }
        );
    }

    #[test]
    fn test_plan_creates_blank_when_no_template() {
        let mapping = DirectoryMapping::from_json(DIRECTORY, "folders").unwrap();
        assert_eq!(
            mapping.plan("adhoc").unwrap(),
            ProvisionPlan::CreateBlank {
                folder_id: "f2".to_owned(),
            }
        );
    }

    #[test]
    fn test_plan_unknown_request_type() {
        let mapping = DirectoryMapping::from_json(DIRECTORY, "folders").unwrap();
        assert!(matches!(
            mapping.plan("quarterly"),
            Err(DirectoryError::UnknownRequestType(request_type)) if request_type == "quarterly"
        ));
    }

    #[test]
    fn test_template_without_folder_is_an_error() {
        let document = r#"{
            "templates": { "monthly": "tpl123" },
            "folders": { "adhoc": "f2" }
        }"#;
        let mapping = DirectoryMapping::from_json(document, "folders").unwrap();
        assert!(matches!(
            mapping.plan("monthly"),
            Err(DirectoryError::UnknownRequestType(_))
        ));
    }

    #[test]
    fn test_missing_templates_section_means_create() {
        let document = r#"{ "folders": { "adhoc": "f2" } }"#;
        let mapping = DirectoryMapping::from_json(document, "folders").unwrap();
        assert!(mapping.template_for("adhoc").is_none());
        assert_eq!(
            mapping.plan("adhoc").unwrap(),
            ProvisionPlan::CreateBlank {
                folder_id: "f2".to_owned(),
            }
        );
    }

    #[test]
    fn test_folder_field_is_configurable() {
        let document = r#"{
            "templates": {},
            "destinations": { "adhoc": "f9" }
        }"#;
        let mapping = DirectoryMapping::from_json(document, "destinations").unwrap();
        assert_eq!(mapping.folder_for("adhoc").unwrap(), "f9");

        assert!(matches!(
            DirectoryMapping::from_json(document, "folders"),
            Err(DirectoryError::MissingFolderField(field)) if field == "folders"
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            DirectoryMapping::from_json("not json at all", "folders"),
            Err(DirectoryError::Malformed(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{DIRECTORY}").unwrap();

        let mapping = DirectoryMapping::load(file.path(), "folders").unwrap();
        assert_eq!(mapping.template_for("monthly"), Some("tpl123"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            DirectoryMapping::load(Path::new("no/such/directory.json"), "folders"),
            Err(DirectoryError::Unreadable { .. })
        ));
    }
}
