use std::env;

/// Connection settings for the temple and trip-plan store.
///
/// `YATRA_DATABASE_URL` and `YATRA_DB_MAX_CONNECTIONS` override the
/// defaults when set.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL, database name included.
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/yatra";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Build a config from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let database_url =
            env::var("YATRA_DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        let max_connections = env::var("YATRA_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(Self::DEFAULT_MAX_CONNECTIONS);
        Self {
            database_url,
            max_connections,
        }
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// The database name at the end of the URL, ignoring any query string.
    pub fn database_name(&self) -> Option<&str> {
        self.database_url
            .split('?')
            .next()
            .and_then(|base| base.rsplit_once('/'))
            .map(|(_, name)| name)
            .filter(|name| !name.is_empty() && !name.contains(':'))
    }

    /// Same server, `postgres` maintenance database. Used to issue
    /// `CREATE DATABASE` before the target exists.
    pub fn maintenance_url(&self) -> String {
        self.with_database("postgres")
    }

    /// Same server, different database.
    pub fn with_database(&self, name: &str) -> String {
        let (base, query) = match self.database_url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (self.database_url.as_str(), None),
        };
        let mut url = match base.rfind('/') {
            Some(pos) if !base[..pos].ends_with('/') => base[..pos].to_owned(),
            _ => base.to_owned(),
        };
        url.push('/');
        url.push_str(name);
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL);
        assert_eq!(cfg.database_url, "postgresql://localhost:5432/yatra");
        assert_eq!(cfg.max_connections, 5);
    }

    #[test]
    fn database_name_extraction() {
        let cfg = DbConfig::new("postgresql://localhost:5432/temples");
        assert_eq!(cfg.database_name(), Some("temples"));
    }

    #[test]
    fn database_name_ignores_query_string() {
        let cfg = DbConfig::new("postgresql://localhost:5432/temples?sslmode=disable");
        assert_eq!(cfg.database_name(), Some("temples"));
    }

    #[test]
    fn database_name_missing() {
        let cfg = DbConfig::new("postgresql://localhost:5432");
        assert_eq!(cfg.database_name(), None);
    }

    #[test]
    fn maintenance_url_replaces_db() {
        let cfg = DbConfig::new("postgresql://localhost:5432/yatra");
        assert_eq!(cfg.maintenance_url(), "postgresql://localhost:5432/postgres");
    }

    #[test]
    fn with_database_keeps_query_string() {
        let cfg = DbConfig::new("postgresql://u:p@db:5433/yatra?sslmode=require");
        assert_eq!(
            cfg.with_database("yatra_test"),
            "postgresql://u:p@db:5433/yatra_test?sslmode=require"
        );
    }

    #[test]
    fn max_connections_never_zero() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL).with_max_connections(0);
        assert_eq!(cfg.max_connections, 1);
    }
}
