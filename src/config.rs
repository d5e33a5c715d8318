//! Component factory for run configuration
//!
//! Turns explicit configuration values into the object stores, sink and
//! DataFusion session a pipeline runs on. Nothing here reads process
//! environment variables; AWS keys come from a [`Credentials`] value loaded
//! from the credentials file.

use crate::source::Session;
use crate::storage::{ObjectStoreSink, TableSink};
use crate::{CloudProvider, EngineConfig, Error, Result, SourceLocations, StorageConfig};

use configparser::ini::Ini;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

const AWS_SECTION: &str = "AWS";
const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// AWS key pair read from an INI credentials file
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from an INI file with an `[AWS]` section
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }

    /// Parse INI text. Keys and section names are case-insensitive, `=` and
    /// `:` both separate a key from its value, lines starting with `#` or `;`
    /// are comments and indented lines continue the previous value.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut ini = Ini::new();
        ini.set_multiline(true);
        ini.read(contents.to_string())
            .map_err(|e| Error::Config(format!("invalid credentials file: {}", e)))?;

        let required = |key: &str| {
            ini.get(AWS_SECTION, key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::Config(format!(
                        "credentials file has no {} in its [{}] section",
                        key, AWS_SECTION
                    ))
                })
        };

        Ok(Self {
            access_key_id: required(ACCESS_KEY_ID)?,
            secret_access_key: required(SECRET_ACCESS_KEY)?,
        })
    }
}

/// Object store plus the prefix tables are written under
#[derive(Clone)]
pub struct StorageTarget {
    pub object_store: Arc<dyn ObjectStore>,
    pub root: Path,
    /// Backing directory when the store is the local filesystem
    pub local_dir: Option<PathBuf>,
}

pub struct ComponentFactory;

impl ComponentFactory {
    /// Create the warehouse object store
    ///
    /// - `Local`: a directory, created if missing
    /// - `Memory`: a fresh in-memory store, rooted at the URL's host and path
    /// - `Aws`: `s3://bucket/prefix`, requires credentials
    pub fn create_object_store(
        storage: &StorageConfig,
        credentials: Option<&Credentials>,
    ) -> Result<StorageTarget> {
        match storage.provider {
            CloudProvider::Local => {
                let dir = local_directory(&storage.location)?;
                std::fs::create_dir_all(&dir)?;
                info!(directory = %dir.display(), "Using local filesystem object store");

                Ok(StorageTarget {
                    object_store: Arc::new(LocalFileSystem::new_with_prefix(&dir)?),
                    root: Path::default(),
                    local_dir: Some(dir),
                })
            }
            CloudProvider::Memory => {
                let url = parse_url(&storage.location)?;
                let root = format!(
                    "{}/{}",
                    url.host_str().unwrap_or_default(),
                    url.path().trim_matches('/')
                );
                info!("Using in-memory object store (development mode)");

                Ok(StorageTarget {
                    object_store: Arc::new(InMemory::new()),
                    root: Path::from(root.trim_matches('/')),
                    local_dir: None,
                })
            }
            CloudProvider::Aws => {
                let url = parse_url(&storage.location)?;
                let bucket = bucket_name(&url)?;
                let credentials = credentials.ok_or_else(|| {
                    Error::Config(format!(
                        "AWS credentials are required to write to {}",
                        storage.location
                    ))
                })?;
                info!(
                    "Using S3 object store: bucket={}, region={}",
                    bucket, storage.region
                );

                Ok(StorageTarget {
                    object_store: Self::create_s3_store(bucket, &storage.region, credentials)?,
                    root: Path::from(url.path().trim_matches('/')),
                    local_dir: None,
                })
            }
        }
    }

    /// Create the sink that persists warehouse tables
    pub fn create_sink(
        storage: &StorageConfig,
        credentials: Option<&Credentials>,
    ) -> Result<Arc<dyn TableSink>> {
        let target = Self::create_object_store(storage, credentials)?;
        let sink = ObjectStoreSink::new(target.object_store, target.root);
        Ok(Arc::new(match target.local_dir {
            Some(dir) => sink.with_local_directory(dir),
            None => sink,
        }))
    }

    /// Create the reading session and register an S3 store for every
    /// bucket the sources live in
    pub fn create_session(
        engine: &EngineConfig,
        sources: &SourceLocations,
        region: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Session> {
        let session = Session::new(engine);

        for location in sources.iter() {
            let Ok(url) = Url::parse(location) else {
                continue;
            };
            if url.scheme().parse::<CloudProvider>() != Ok(CloudProvider::Aws) {
                continue;
            }

            let bucket = bucket_name(&url)?;
            let credentials = credentials.ok_or_else(|| {
                Error::Config(format!("AWS credentials are required to read {}", location))
            })?;
            let store = Self::create_s3_store(bucket, region, credentials)?;

            let store_url = parse_url(&format!("{}://{}", url.scheme(), bucket))?;
            session.register_object_store(&store_url, store);
            info!(bucket, "Registered S3 source bucket");
        }

        Ok(session)
    }

    fn create_s3_store(
        bucket: &str,
        region: &str,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ObjectStore>> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(region)
            .with_access_key_id(&credentials.access_key_id)
            .with_secret_access_key(&credentials.secret_access_key)
            .build()?;
        Ok(Arc::new(store))
    }
}

fn parse_url(location: &str) -> Result<Url> {
    Url::parse(location)
        .map_err(|e| Error::Config(format!("invalid storage location '{}': {}", location, e)))
}

fn bucket_name(url: &Url) -> Result<&str> {
    url.host_str()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| Error::Config(format!("storage location '{}' has no bucket", url)))
}

fn local_directory(location: &str) -> Result<PathBuf> {
    if location.starts_with("file://") {
        return parse_url(location)?
            .to_file_path()
            .map_err(|_| Error::Config(format!("invalid file location '{}'", location)));
    }
    Ok(PathBuf::from(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let contents = "\
# AWS keys
[AWS]
AWS_ACCESS_KEY_ID = AKIAEXAMPLE
aws_secret_access_key: s3cr3t

[OTHER]
AWS_ACCESS_KEY_ID = ignored
";
        let credentials = Credentials::parse(contents).unwrap();
        assert_eq!(credentials.access_key_id, "AKIAEXAMPLE");
        assert_eq!(credentials.secret_access_key, "s3cr3t");
    }

    #[test]
    fn test_credentials_outside_aws_section_are_ignored() {
        let contents = "\
AWS_ACCESS_KEY_ID = top-level
[default]
AWS_SECRET_ACCESS_KEY = other
";
        let err = Credentials::parse(contents).unwrap_err();
        assert!(err.to_string().contains(ACCESS_KEY_ID));
    }

    #[test]
    fn test_key_without_value_is_missing() {
        let err = Credentials::parse("[AWS]\nAWS_ACCESS_KEY_ID = a\nAWS_SECRET_ACCESS_KEY\n")
            .unwrap_err();
        assert!(err.to_string().contains(SECRET_ACCESS_KEY));
    }

    #[test]
    fn test_indented_line_continues_previous_value() {
        let contents = "[AWS]\nAWS_ACCESS_KEY_ID = a\nAWS_SECRET_ACCESS_KEY =\n    s3cr3t\n";
        let credentials = Credentials::parse(contents).unwrap();
        assert_eq!(credentials.access_key_id, "a");
        assert_eq!(credentials.secret_access_key, "s3cr3t");
    }

    #[test]
    fn test_section_name_is_case_insensitive() {
        let credentials =
            Credentials::parse("[aws]\naws_access_key_id = a\naws_secret_access_key = b\n")
                .unwrap();
        assert_eq!(credentials.secret_access_key, "b");
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let err = Credentials::parse("[AWS]\nAWS_ACCESS_KEY_ID=a\nAWS_SECRET_ACCESS_KEY=\n")
            .unwrap_err();
        assert!(err.to_string().contains(SECRET_ACCESS_KEY));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials {
            access_key_id: "id".to_string(),
            secret_access_key: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }

    #[test]
    fn test_credentials_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.cfg");
        std::fs::write(&path, "[AWS]\nAWS_ACCESS_KEY_ID=a\nAWS_SECRET_ACCESS_KEY=b\n").unwrap();

        let credentials = Credentials::from_file(&path).unwrap();
        assert_eq!(credentials.access_key_id, "a");

        assert!(matches!(
            Credentials::from_file(dir.path().join("missing.cfg")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_local_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("warehouse");
        let storage = StorageConfig::from_location(location.to_str().unwrap()).unwrap();

        let target = ComponentFactory::create_object_store(&storage, None).unwrap();
        assert!(location.is_dir());
        assert_eq!(target.root, Path::default());
        assert_eq!(target.local_dir, Some(location));
    }

    #[test]
    fn test_memory_store_root() {
        let storage = StorageConfig::from_location("memory://warehouse/run").unwrap();
        let target = ComponentFactory::create_object_store(&storage, None).unwrap();
        assert_eq!(target.root.as_ref(), "warehouse/run");
    }

    #[test]
    fn test_s3_requires_credentials() {
        let storage = StorageConfig::from_location("s3://bucket/warehouse").unwrap();
        assert!(matches!(
            ComponentFactory::create_object_store(&storage, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_s3_store_with_credentials() {
        let storage = StorageConfig::from_location("s3://bucket/warehouse/star").unwrap();
        let credentials = Credentials {
            access_key_id: "id".to_string(),
            secret_access_key: "secret".to_string(),
        };

        let target = ComponentFactory::create_object_store(&storage, Some(&credentials)).unwrap();
        assert_eq!(target.root.as_ref(), "warehouse/star");
    }

    #[test]
    fn test_session_needs_credentials_for_s3_sources() {
        let sources = SourceLocations {
            immigration: "s3://raw/sas_data".to_string(),
            ..SourceLocations::default()
        };
        let result =
            ComponentFactory::create_session(&EngineConfig::default(), &sources, "us-east-1", None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
