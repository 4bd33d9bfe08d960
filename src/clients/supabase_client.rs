/// Supabase 客户端
///
/// 通过 PostgREST 读取职位表，通过 Storage 下载定制简历
use crate::clients::{resume_object_name, JobSource, ResumeStore};
use crate::config::Config;
use crate::error::{AppResult, StoreError};
use crate::models::JobRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const JOBS_ENDPOINT: &str = "/rest/v1/jobs?select=*";
const STORAGE_ENDPOINT: &str = "/storage/v1/object";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Supabase 客户端
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl SupabaseClient {
    /// 创建新的 Supabase 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| StoreError::RequestFailed {
                endpoint: config.supabase_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            api_key: config.supabase_key.clone(),
            bucket: config.resume_bucket.clone(),
        })
    }

    fn jobs_url(&self) -> String {
        format!("{}{}", self.base_url, JOBS_ENDPOINT)
    }

    fn resume_url(&self, object: &str) -> String {
        format!("{}{}/{}/{}", self.base_url, STORAGE_ENDPOINT, self.bucket, object)
    }

    async fn get(&self, url: &str) -> AppResult<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|source| StoreError::RequestFailed {
                endpoint: url.to_string(),
                source,
            })?;
        Ok(response)
    }
}

#[async_trait]
impl JobSource for SupabaseClient {
    async fn fetch_jobs(&self) -> AppResult<Vec<JobRecord>> {
        let url = self.jobs_url();
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            return Err(StoreError::BadResponse {
                endpoint: url,
                status: response.status().as_u16(),
            }
            .into());
        }

        let records = response
            .json::<Vec<JobRecord>>()
            .await
            .map_err(|source| StoreError::RequestFailed {
                endpoint: url.clone(),
                source,
            })?;
        debug!("职位表返回 {} 条记录", records.len());
        Ok(records)
    }
}

#[async_trait]
impl ResumeStore for SupabaseClient {
    async fn fetch_resume(&self, resume_id: &str, job_id: &str) -> AppResult<Vec<u8>> {
        let object = resume_object_name(resume_id, job_id);
        let url = self.resume_url(&object);
        let response = self.get(&url).await?;

        // Storage 对不存在的对象可能返回 400 或 404
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                return Err(StoreError::NotFound { key: object }.into());
            }
            status if !status.is_success() => {
                return Err(StoreError::BadResponse {
                    endpoint: url,
                    status: status.as_u16(),
                }
                .into());
            }
            _ => {}
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| StoreError::RequestFailed {
                endpoint: url.clone(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_built_from_config() {
        let config = Config {
            supabase_url: "https://demo.supabase.co/".to_string(),
            supabase_key: "key".to_string(),
            ..Config::default()
        };
        let client = SupabaseClient::new(&config).unwrap();

        assert_eq!(
            client.jobs_url(),
            "https://demo.supabase.co/rest/v1/jobs?select=*"
        );
        assert_eq!(
            client.resume_url(&resume_object_name("r1", "j9")),
            "https://demo.supabase.co/storage/v1/object/customizedresumes/enhanced_r1_j9.docx"
        );
    }
}
