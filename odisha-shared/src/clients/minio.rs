use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },
    #[error("delete of {key} failed: {reason}")]
    Delete { key: String, reason: String },
}

/// Object storage for user-uploaded images, served from `{public_url}/{bucket}/{key}`.
#[derive(Clone)]
pub struct MinioClient {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl MinioClient {
    pub async fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new(access_key, secret_key, None, None, "minio"))
            .force_path_style(true)
            .build();
        let client = S3Client::from_conf(config);

        if let Err(e) = client.create_bucket().bucket(bucket).send().await {
            tracing::debug!(bucket = %bucket, error = %e, "bucket not created, assuming it exists");
        }
        tracing::info!(endpoint = %endpoint, bucket = %bucket, "object storage ready");

        Self {
            client,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_prefix(&self) -> String {
        format!("{}/{}/", self.public_url, self.bucket)
    }

    pub fn public_url_for(&self, key: &str) -> String {
        format!("{}{key}", self.url_prefix())
    }

    /// Returns the public URL of the stored object.
    pub async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body.into())
            .send()
            .await
            .map_err(|e| StorageError::Upload { key: key.to_string(), reason: e.to_string() })?;

        tracing::debug!(key = %key, "object uploaded");
        Ok(self.public_url_for(key))
    }

    /// Delete the object behind a URL returned by [`MinioClient::upload`].
    /// Foreign URLs are left alone.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), StorageError> {
        let Some(key) = key_for_url(&self.url_prefix(), url) else {
            tracing::debug!(url = %url, "not a stored object, skipping delete");
            return Ok(());
        };

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete { key: key.to_string(), reason: e.to_string() })?;

        tracing::debug!(key = %key, "object deleted");
        Ok(())
    }
}

fn key_for_url<'a>(prefix: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(prefix).filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "http://localhost:9000/host-photos/";

    #[test]
    fn keys_are_recovered_from_own_urls() {
        assert_eq!(
            key_for_url(PREFIX, "http://localhost:9000/host-photos/hosts/1/a.jpg"),
            Some("hosts/1/a.jpg")
        );
        assert_eq!(key_for_url(PREFIX, PREFIX), None);
    }

    #[test]
    fn foreign_urls_are_ignored() {
        assert_eq!(key_for_url(PREFIX, "https://cdn.example.com/host-photos/a.jpg"), None);
        assert_eq!(key_for_url(PREFIX, "http://localhost:9000/avatars/a.jpg"), None);
    }
}
