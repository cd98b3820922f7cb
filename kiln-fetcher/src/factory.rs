//! Build release sources from Kilnfile configuration.

use std::path::Path;

use tracing::debug;

use kiln_core::{Kilnfile, ReleaseSourceConfig, SourceKind};
use kiln_template::{PathTemplate, DEFAULT_LOCAL_TEMPLATE};

use crate::community::CommunityIndexSource;
use crate::error::FetchError;
use crate::http::{default_endpoint, HttpIndexClient, HttpObjectStore, DEFAULT_REGION};
use crate::local::LocalDirectorySource;
use crate::multi::MultiReleaseSource;
use crate::object_store::ObjectStoreSource;
use crate::source::ReleaseSource;

fn require<'a>(
    config: &'a ReleaseSourceConfig,
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, FetchError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FetchError::MissingField {
            source_id: config.source_id(),
            field,
        })
}

fn object_store(config: &ReleaseSourceConfig) -> Result<ObjectStoreSource, FetchError> {
    let bucket = require(config, &config.bucket, "bucket")?;
    let template = PathTemplate::parse(require(config, &config.path_template, "path_template")?)?;
    let region = config
        .region
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REGION);
    let endpoint = match config.endpoint.as_deref() {
        Some(e) if !e.is_empty() => e.to_owned(),
        _ => default_endpoint(config.region.as_deref()),
    };
    let mut client = HttpObjectStore::new(&endpoint, region)?;
    let credentials = (
        config.access_key_id.as_deref().filter(|k| !k.is_empty()),
        config.secret_access_key.as_deref().filter(|s| !s.is_empty()),
    );
    match credentials {
        (Some(key), Some(secret)) => client = client.with_credentials(key, secret),
        (None, None) => {}
        (Some(_), None) => {
            return Err(FetchError::MissingField {
                source_id: config.source_id(),
                field: "secret_access_key",
            })
        }
        (None, Some(_)) => {
            return Err(FetchError::MissingField {
                source_id: config.source_id(),
                field: "access_key_id",
            })
        }
    }
    debug!(
        bucket,
        endpoint = %endpoint,
        region,
        signed = matches!(credentials, (Some(_), Some(_))),
        "configuring object store source"
    );
    Ok(ObjectStoreSource::new(
        config.source_id(),
        bucket,
        template,
        config.publishable,
        Box::new(client),
    ))
}

/// Construct the source described by `config`. Relative local directories
/// resolve against `base_dir` (the Kilnfile's directory).
pub fn release_source_from_config(
    config: &ReleaseSourceConfig,
    base_dir: &Path,
) -> Result<Box<dyn ReleaseSource>, FetchError> {
    match config.kind {
        SourceKind::ObjectStore => Ok(Box::new(object_store(config)?)),
        SourceKind::CommunityIndex => Ok(Box::new(CommunityIndexSource::with_catalog(
            config.source_id(),
            Default::default(),
            Box::new(HttpIndexClient::default()),
        ))),
        SourceKind::Local => {
            let directory = config
                .directory
                .as_deref()
                .ok_or_else(|| FetchError::MissingField {
                    source_id: config.source_id(),
                    field: "directory",
                })?;
            let template = PathTemplate::parse(
                config
                    .path_template
                    .as_deref()
                    .unwrap_or(DEFAULT_LOCAL_TEMPLATE),
            )?;
            Ok(Box::new(
                LocalDirectorySource::with_template(
                    config.source_id(),
                    base_dir.join(directory),
                    template,
                )
                .with_publishable(config.publishable),
            ))
        }
    }
}

/// All configured sources in Kilnfile order.
pub fn multi_release_source(
    kilnfile: &Kilnfile,
    base_dir: &Path,
    allow_only_publishable: bool,
) -> Result<MultiReleaseSource, FetchError> {
    let sources = kilnfile
        .release_sources
        .iter()
        .map(|config| release_source_from_config(config, base_dir))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MultiReleaseSource::new(sources, allow_only_publishable))
}

/// The object-store source whose bucket is `bucket`.
pub fn object_store_for_bucket(
    kilnfile: &Kilnfile,
    bucket: &str,
) -> Result<ObjectStoreSource, FetchError> {
    let stores: Vec<&ReleaseSourceConfig> = kilnfile
        .release_sources
        .iter()
        .filter(|c| c.kind == SourceKind::ObjectStore)
        .collect();
    if stores.is_empty() {
        return Err(FetchError::NoObjectStore);
    }
    match stores.iter().find(|c| c.bucket.as_deref() == Some(bucket)) {
        Some(config) => object_store(config),
        None => Err(FetchError::BucketNotConfigured {
            bucket: bucket.to_owned(),
            known: stores
                .iter()
                .filter_map(|c| c.bucket.as_deref())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn s3(bucket: &str) -> ReleaseSourceConfig {
        let mut config = ReleaseSourceConfig::new(SourceKind::ObjectStore);
        config.bucket = Some(bucket.to_owned());
        config.path_template = Some("{{ name }}/{{ name }}-{{ version }}.tgz".to_owned());
        config
    }

    fn kilnfile(sources: Vec<ReleaseSourceConfig>) -> Kilnfile {
        Kilnfile {
            release_sources: sources,
            ..Default::default()
        }
    }

    #[rstest]
    #[case("bucket")]
    #[case("path_template")]
    fn object_store_requires_fields(#[case] missing: &str) {
        let mut config = s3("compiled-releases");
        match missing {
            "bucket" => config.bucket = None,
            _ => config.path_template = None,
        }
        let err = release_source_from_config(&config, Path::new(".")).err().unwrap();
        assert!(err.to_string().contains(missing), "got: {err}");
    }

    #[rstest]
    #[case(Some("AKIAEXAMPLE"), None, "secret_access_key")]
    #[case(None, Some("secret"), "access_key_id")]
    fn credentials_come_in_pairs(
        #[case] key: Option<&str>,
        #[case] secret: Option<&str>,
        #[case] missing: &str,
    ) {
        let mut config = s3("private");
        config.access_key_id = key.map(str::to_owned);
        config.secret_access_key = secret.map(str::to_owned);
        let err = release_source_from_config(&config, Path::new(".")).err().unwrap();
        assert!(err.to_string().contains(missing), "got: {err}");
    }

    #[test]
    fn configured_credentials_build_a_source() {
        let mut config = s3("private");
        config.region = Some("eu-west-1".into());
        config.access_key_id = Some("AKIAEXAMPLE".into());
        config.secret_access_key = Some("secret".into());
        let source = release_source_from_config(&config, Path::new(".")).unwrap();
        assert_eq!(source.id(), "private");
    }

    #[test]
    fn local_requires_directory() {
        let config = ReleaseSourceConfig::new(SourceKind::Local);
        let err = release_source_from_config(&config, Path::new(".")).err().unwrap();
        assert!(err.to_string().contains("directory"), "got: {err}");
    }

    #[test]
    fn malformed_template_fails_at_construction() {
        let mut config = s3("b");
        config.path_template = Some("{{ name ".to_owned());
        let err = release_source_from_config(&config, Path::new(".")).err().unwrap();
        assert!(matches!(err, FetchError::Template(_)));
    }

    #[test]
    fn ids_follow_configuration() {
        let mut local = ReleaseSourceConfig::new(SourceKind::Local);
        local.directory = Some("cache".into());
        let multi = multi_release_source(
            &kilnfile(vec![
                s3("compiled-releases"),
                ReleaseSourceConfig::new(SourceKind::CommunityIndex),
                local,
            ]),
            Path::new("/tmp"),
            false,
        )
        .unwrap();
        let ids: Vec<&str> = multi.sources().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["compiled-releases", "bosh.io", "local"]);
    }

    #[test]
    fn publishable_filter_applies() {
        let mut published = s3("published");
        published.publishable = true;
        let multi = multi_release_source(
            &kilnfile(vec![
                s3("private"),
                ReleaseSourceConfig::new(SourceKind::CommunityIndex),
                published,
            ]),
            Path::new("."),
            true,
        )
        .unwrap();
        let ids: Vec<&str> = multi.sources().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["published"]);
    }

    #[test]
    fn bucket_lookup() {
        let file = kilnfile(vec![s3("one"), s3("two")]);
        assert_eq!(object_store_for_bucket(&file, "two").unwrap().bucket(), "two");

        let err = object_store_for_bucket(&file, "three").err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("one, two"), "got: {msg}");
    }

    #[test]
    fn bucket_lookup_without_object_stores() {
        let file = kilnfile(vec![ReleaseSourceConfig::new(SourceKind::CommunityIndex)]);
        let err = object_store_for_bucket(&file, "any").err().unwrap();
        assert_eq!(
            err.to_string(),
            "only release sources of type s3 are supported"
        );
    }
}
