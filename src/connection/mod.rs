//! Connection management for Redis
//!
//! This module turns explicit [`ConnectionSettings`] into an open
//! [`RedisStore`]:
//! - Direct connections to a single `host[:port]`
//! - Sentinel connections, where the master for a service name is resolved
//!   through one or more sentinel endpoints first
//!
//! The database index and password are applied at connect time, and every
//! later store call is bounded by the response timeout fixed here.

use std::time::Duration;

use redis::sentinel::{Sentinel, SentinelNodeConnectionInfo};
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::{debug, info};

use crate::error::{ConnectionError, Result};
use crate::store::RedisStore;

/// Default port of a Redis server
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default port of a Redis sentinel
pub const DEFAULT_SENTINEL_PORT: u16 = 26379;

/// A single `host:port` endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Everything needed to open a store connection
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Server endpoints, or sentinel endpoints when `service_name` is set
    pub endpoints: Vec<Endpoint>,

    /// Password for the data node
    pub password: Option<String>,

    /// Sentinel service name
    pub service_name: Option<String>,

    /// Logical database index
    pub db: i64,

    /// Ceiling on any single store call
    pub response_timeout: Duration,

    /// Ceiling on establishing the connection
    pub connect_timeout: Duration,
}

impl Endpoint {
    /// Parse `host`, `host:port`, `[v6addr]` or `[v6addr]:port`
    pub fn parse(descriptor: &str, default_port: u16) -> Result<Self> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(ConnectionError::InvalidHost(descriptor.to_string()).into());
        }

        let (host, port) = if let Some(rest) = descriptor.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| ConnectionError::InvalidHost(descriptor.to_string()))?;
            match tail.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if tail.is_empty() => (host, None),
                None => return Err(ConnectionError::InvalidHost(descriptor.to_string()).into()),
            }
        } else if descriptor.matches(':').count() == 1 {
            let (host, port) = descriptor
                .split_once(':')
                .ok_or_else(|| ConnectionError::InvalidHost(descriptor.to_string()))?;
            (host, Some(port))
        } else {
            // Bare IPv6 addresses carry several colons and no port
            (descriptor, None)
        };

        if host.is_empty() {
            return Err(ConnectionError::InvalidHost(descriptor.to_string()).into());
        }

        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| ConnectionError::InvalidHost(descriptor.to_string()))?,
            None => default_port,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Parse a comma-separated list of endpoints
    pub fn parse_list(descriptor: &str, default_port: u16) -> Result<Vec<Self>> {
        let endpoints = descriptor
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| Self::parse(part, default_port))
            .collect::<Result<Vec<_>>>()?;

        if endpoints.is_empty() {
            return Err(ConnectionError::InvalidHost(descriptor.to_string()).into());
        }
        Ok(endpoints)
    }

    fn to_addr(&self) -> ConnectionAddr {
        ConnectionAddr::Tcp(self.host.clone(), self.port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl ConnectionSettings {
    /// Build settings from a host descriptor
    ///
    /// The default port depends on whether the hosts are sentinels.
    pub fn new(
        host: &str,
        service_name: Option<String>,
        db: i64,
        password: Option<String>,
    ) -> Result<Self> {
        let default_port = if service_name.is_some() {
            DEFAULT_SENTINEL_PORT
        } else {
            DEFAULT_REDIS_PORT
        };

        Ok(Self {
            endpoints: Endpoint::parse_list(host, default_port)?,
            password,
            service_name,
            db,
            response_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        })
    }

    /// Set the response and connect timeouts
    pub fn with_timeouts(mut self, response: Duration, connect: Duration) -> Self {
        self.response_timeout = response;
        self.connect_timeout = connect;
        self
    }

    fn redis_info(&self) -> RedisConnectionInfo {
        RedisConnectionInfo {
            db: self.db,
            password: self.password.clone(),
            ..Default::default()
        }
    }
}

/// Redis connection manager
///
/// Holds the settings and opens the single connection an export run uses.
pub struct ConnectionManager {
    settings: ConnectionSettings,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    /// Settings this manager connects with
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Establish the connection and return a store handle
    ///
    /// Unreachable hosts and rejected credentials both surface as
    /// [`ConnectionError`]s; nothing is retried.
    pub async fn connect(&self) -> Result<RedisStore> {
        info!("Connecting to {}", self.sanitized_target());

        let client = match &self.settings.service_name {
            Some(name) => self.resolve_master(name).await?,
            None => self.direct_client()?,
        };

        let conn = client
            .get_multiplexed_async_connection_with_timeouts(
                self.settings.response_timeout,
                self.settings.connect_timeout,
            )
            .await
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        debug!("Connected, database {} selected", self.settings.db);
        Ok(RedisStore::new(conn))
    }

    /// Connection target with the password masked, safe to log
    pub fn sanitized_target(&self) -> String {
        let auth = if self.settings.password.is_some() {
            ":****@"
        } else {
            ""
        };
        let hosts = self
            .settings
            .endpoints
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(",");

        match &self.settings.service_name {
            Some(name) => format!(
                "redis+sentinel://{}{}/{}/{}",
                auth, hosts, name, self.settings.db
            ),
            None => format!("redis://{}{}/{}", auth, hosts, self.settings.db),
        }
    }

    fn direct_client(&self) -> Result<Client> {
        // Only the first endpoint is used without a sentinel
        let endpoint = &self.settings.endpoints[0];
        let info = ConnectionInfo {
            addr: endpoint.to_addr(),
            redis: self.settings.redis_info(),
        };
        Client::open(info).map_err(|e| ConnectionError::ConnectionFailed(e.to_string()).into())
    }

    async fn resolve_master(&self, service_name: &str) -> Result<Client> {
        let sentinels = self
            .settings
            .endpoints
            .iter()
            .map(|e| ConnectionInfo {
                addr: e.to_addr(),
                redis: RedisConnectionInfo::default(),
            })
            .collect::<Vec<_>>();

        let node_info = SentinelNodeConnectionInfo {
            tls_mode: None,
            redis_connection_info: Some(self.settings.redis_info()),
        };

        let mut sentinel =
            Sentinel::build(sentinels).map_err(|e| ConnectionError::SentinelFailed(e.to_string()))?;

        let client = tokio::time::timeout(
            self.settings.connect_timeout,
            sentinel.async_master_for(service_name, Some(&node_info)),
        )
        .await
        .map_err(|_| ConnectionError::Timeout)?
        .map_err(|e| ConnectionError::SentinelFailed(e.to_string()))?;

        debug!("Sentinel resolved master for service '{}'", service_name);
        Ok(client)
    }
}
