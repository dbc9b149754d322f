//! Connector configuration, read from the file named by `NDC_CONFIGURATION`.

use ndc_connector::schema::SchemaResponse;
use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MySqlConfiguration {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
    /// Published as-is from `/schema`; collections map to tables.
    pub schema: SchemaResponse,
}

impl Default for MySqlConfiguration {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            db: String::new(),
            user: "root".to_string(),
            password: String::new(),
            schema: SchemaResponse::default(),
        }
    }
}

impl MySqlConfiguration {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password);
        if self.db.is_empty() {
            options
        } else {
            options.database(&self.db)
        }
    }
}
