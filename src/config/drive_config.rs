use config::Config;

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/drive".to_owned()]
}

fn default_folder_field() -> Box<str> {
    "folders".into()
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct DriveConfig {
    /// Path to the service account JSON key file.
    pub key_file: Box<str>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Name of the folder mapping inside the directory file.
    #[serde(default = "default_folder_field")]
    pub folder_field: Box<str>,
}

impl DriveConfig {
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()
    }
}
