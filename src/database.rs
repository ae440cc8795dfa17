//! Datastore initialization.
//!
//! The engine talks to PostgreSQL, MongoDB, Redis and an S3-compatible
//! object store. At startup every endpoint is parsed from the settings and
//! probed over TCP; the result feeds the readiness endpoint. Unreachable
//! stores are reported, not fatal: they are usually still starting up next
//! to the engine. Malformed URLs are fatal.

use std::fmt;
use std::time::Duration;

use futures::future::join_all;
use serde::{Serialize, Serializer};
use tokio::net::TcpStream;
use url::{Host, Url};

use crate::config::Settings;

/// Per-endpoint connect timeout used by [`init_database`].
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("invalid {kind} url: {source}")]
    InvalidUrl {
        kind: DatastoreKind,
        #[source]
        source: url::ParseError,
    },

    #[error("{kind} url has no host")]
    MissingHost { kind: DatastoreKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatastoreKind {
    Postgres,
    Mongodb,
    Redis,
    ObjectStorage,
}

impl DatastoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatastoreKind::Postgres => "postgres",
            DatastoreKind::Mongodb => "mongodb",
            DatastoreKind::Redis => "redis",
            DatastoreKind::ObjectStorage => "object_storage",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            DatastoreKind::Postgres => 5432,
            DatastoreKind::Mongodb => 27017,
            DatastoreKind::Redis => 6379,
            DatastoreKind::ObjectStorage => 9000,
        }
    }
}

impl fmt::Display for DatastoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network location of a datastore. Credentials and paths are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn parse(kind: DatastoreKind, raw: &str) -> Result<Self, DatabaseError> {
        let raw = match kind {
            DatastoreKind::Mongodb => first_mongodb_host(raw),
            _ => raw.trim().to_string(),
        };
        let url = Url::parse(&raw).map_err(|source| DatabaseError::InvalidUrl { kind, source })?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(DatabaseError::MissingHost { kind }),
        };
        let port = url
            .port_or_known_default()
            .unwrap_or_else(|| kind.default_port());

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl Serialize for Endpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// MongoDB replica-set URLs list several hosts; the first one is probed.
fn first_mongodb_host(raw: &str) -> String {
    let raw = raw.trim();
    let Some((scheme, rest)) = raw.split_once("://") else {
        return raw.to_string();
    };
    let (authority, tail) = match rest.find(['/', '?']) {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let (credentials, hosts) = match authority.rsplit_once('@') {
        Some((creds, hosts)) => (Some(creds), hosts),
        None => (None, authority),
    };
    let first = hosts.split(',').next().unwrap_or(hosts);

    match credentials {
        Some(creds) => format!("{scheme}://{creds}@{first}{tail}"),
        None => format!("{scheme}://{first}{tail}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Connectivity {
    /// Not probed yet.
    Unchecked,
    Reachable,
    Unreachable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DatastoreStatus {
    pub kind: DatastoreKind,
    pub endpoint: Endpoint,
    pub connectivity: Connectivity,
}

/// The datastores the engine depends on and what the last probe saw.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Datastores {
    datastores: Vec<DatastoreStatus>,
}

impl Datastores {
    /// Parse every datastore endpoint from `settings` without any I/O.
    pub fn from_settings(settings: &Settings) -> Result<Self, DatabaseError> {
        let sources = [
            (DatastoreKind::Postgres, settings.database_url.clone()),
            (DatastoreKind::Mongodb, settings.mongodb_url.clone()),
            (DatastoreKind::Redis, settings.redis_url.clone()),
            (DatastoreKind::ObjectStorage, settings.s3_endpoint_url()),
        ];

        let datastores = sources
            .into_iter()
            .map(|(kind, raw)| {
                Ok(DatastoreStatus {
                    kind,
                    endpoint: Endpoint::parse(kind, &raw)?,
                    connectivity: Connectivity::Unchecked,
                })
            })
            .collect::<Result<Vec<_>, DatabaseError>>()?;

        Ok(Self { datastores })
    }

    /// Probe every endpoint concurrently.
    pub async fn probe(mut self, timeout: Duration) -> Self {
        let results = join_all(
            self.datastores
                .iter()
                .map(|status| probe_endpoint(&status.endpoint, timeout)),
        )
        .await;

        for (status, connectivity) in self.datastores.iter_mut().zip(results) {
            status.connectivity = connectivity;
        }
        self
    }

    pub fn statuses(&self) -> &[DatastoreStatus] {
        &self.datastores
    }

    pub fn get(&self, kind: DatastoreKind) -> Option<&DatastoreStatus> {
        self.datastores.iter().find(|status| status.kind == kind)
    }

    /// True unless a probe found a datastore unreachable.
    pub fn is_ready(&self) -> bool {
        !self
            .datastores
            .iter()
            .any(|status| matches!(status.connectivity, Connectivity::Unreachable { .. }))
    }
}

async fn probe_endpoint(endpoint: &Endpoint, timeout: Duration) -> Connectivity {
    let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(_stream)) => Connectivity::Reachable,
        Ok(Err(err)) => Connectivity::Unreachable {
            reason: err.to_string(),
        },
        Err(_) => Connectivity::Unreachable {
            reason: format!("timed out after {}ms", timeout.as_millis()),
        },
    }
}

/// Initialize datastore connectivity.
///
/// Idempotent: nothing is created or mutated, so repeated calls produce
/// equivalent reports.
pub async fn init_database(settings: &Settings) -> Result<Datastores, DatabaseError> {
    let datastores = Datastores::from_settings(settings)?
        .probe(PROBE_TIMEOUT)
        .await;

    for status in datastores.statuses() {
        match &status.connectivity {
            Connectivity::Reachable => {
                tracing::info!(datastore = %status.kind, endpoint = %status.endpoint, "Datastore reachable");
            }
            Connectivity::Unreachable { reason } => {
                tracing::warn!(
                    datastore = %status.kind,
                    endpoint = %status.endpoint,
                    reason = %reason,
                    "Datastore unreachable"
                );
            }
            Connectivity::Unchecked => {}
        }
    }

    Ok(datastores)
}
