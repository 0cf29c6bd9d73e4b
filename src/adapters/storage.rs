use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}

#[cfg(feature = "lambda")]
pub use self::s3::S3Storage;

#[cfg(feature = "lambda")]
mod s3 {
    use crate::core::Storage;
    use crate::utils::error::{MatchError, Result};
    use aws_sdk_s3::Client as S3Client;

    #[derive(Debug, Clone)]
    pub struct S3Storage {
        client: S3Client,
        bucket: String,
    }

    impl S3Storage {
        pub fn new(client: S3Client, bucket: String) -> Self {
            Self { client, bucket }
        }
    }

    impl Storage for S3Storage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let resp = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(path)
                .send()
                .await
                .map_err(|e| MatchError::ProviderError {
                    message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
                })?;

            let data = resp
                .body
                .collect()
                .await
                .map_err(|e| MatchError::ProviderError {
                    message: format!("Failed to collect S3 data: {}", e),
                })?;

            Ok(data.into_bytes().to_vec())
        }
    }
}
