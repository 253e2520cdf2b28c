//! Tests for repository selection and server configuration from the
//! environment and from `repository.toml`.

mod support;

use std::io::Write;
use std::str::FromStr;

use helpdesk::config::{AppConfig, ConfigError};
use helpdesk::db::factory::{RepositoryFactory, RepositoryType};
use helpdesk::db::{RepositoryError, TicketRepository, UserRepository};
use tempfile::NamedTempFile;

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("POSTGRES").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("invalid").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/helpdesk")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_from_env_explicit_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("memory")),
            ("DATABASE_URL", Some("postgres://localhost/helpdesk")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_invalid_defaults_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("invalid"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
}

#[tokio::test]
async fn test_postgres_without_config_fails() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    let err = result.err().unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    assert!(err.to_string().contains("requires PostgresConfig"));
}

#[tokio::test]
async fn test_local_repository_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_config_file_is_configuration_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"cassandra\"").unwrap();

    let result = RepositoryFactory::from_config_file(file.path()).await;
    assert!(matches!(
        result.err(),
        Some(RepositoryError::ConfigurationError { .. })
    ));
}

#[test]
fn test_app_config_requires_jwt_secret() {
    support::with_scoped_env(&[("JWT_SECRET", None)], || {
        assert_eq!(AppConfig::from_env(), Err(ConfigError::Missing("JWT_SECRET")));
    });
}

#[test]
fn test_app_config_defaults() {
    support::with_scoped_env(
        &[
            ("JWT_SECRET", Some("s3cret")),
            ("HOST", None),
            ("PORT", None),
            ("JWT_TTL_SECS", None),
            ("FORECAST_URL", None),
            ("CORS", None),
        ],
        || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 5000);
            assert_eq!(config.jwt_ttl_secs, 3600);
            assert_eq!(config.forecast_url, "http://127.0.0.1:5000");
            assert!(config.cors_origins.is_empty());
        },
    );
}

#[test]
fn test_app_config_overrides() {
    support::with_scoped_env(
        &[
            ("JWT_SECRET", Some("s3cret")),
            ("PORT", Some("8080")),
            ("FORECAST_URL", Some("http://forecast:5001")),
            ("CORS", Some("http://localhost:3000,https://desk.example.com")),
        ],
        || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.forecast_url, "http://forecast:5001");
            assert_eq!(config.cors_origins.len(), 2);
        },
    );
}

#[test]
fn test_app_config_invalid_port() {
    support::with_scoped_env(
        &[("JWT_SECRET", Some("s3cret")), ("PORT", Some("eighty"))],
        || {
            assert!(matches!(
                AppConfig::from_env(),
                Err(ConfigError::Invalid { key: "PORT", .. })
            ));
        },
    );
}
