use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogLoader, FetchError, QuestionRecord, parse_rows};

pub const DEFAULT_TABLE: &str = "interview_questions";

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn supabase_config(supabase_url: String, supabase_anon_key: String) -> SupabaseConfig {
    SupabaseConfig {
        supabase_url,
        supabase_anon_key,
        table: default_table(),
    }
}

impl SupabaseConfig {
    /// PostgREST endpoint returning every column of every row.
    pub fn rows_url(&self) -> String {
        format!(
            "{base}/rest/v1/{table}?select=*",
            base = self.supabase_url.trim_end_matches('/'),
            table = self.table
        )
    }
}

/// Reads the question table through Supabase's REST interface with the anonymous key.
#[derive(Clone, Debug)]
pub struct SupabaseCatalog {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseCatalog {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl CatalogLoader for SupabaseCatalog {
    async fn load(&self) -> Result<Vec<QuestionRecord>, FetchError> {
        let response = self
            .client
            .get(self.config.rows_url())
            .header("apikey", &self.config.supabase_anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.supabase_anon_key),
            )
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        Ok(parse_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_url() {
        let config = supabase_config(
            "https://example.supabase.co/".to_string(),
            "anon".to_string(),
        );
        assert_eq!(
            config.rows_url(),
            "https://example.supabase.co/rest/v1/interview_questions?select=*"
        );
    }

    #[test]
    fn test_config_table_defaults() {
        let config: SupabaseConfig = serde_json::from_str(
            r#"{"supabase_url": "https://x.supabase.co", "supabase_anon_key": "k"}"#,
        )
        .unwrap();
        assert_eq!(config.table, DEFAULT_TABLE);
    }
}
