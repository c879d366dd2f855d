//! LDAP directory resolver
//!
//! Implements `DirectoryResolver` over a single bound LDAP connection that is
//! opened on first use and reused for every mapping of a run.

use async_trait::async_trait;
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use chansync_connector::config::ConnectorConfig;
use chansync_connector::error::{ConnectorError, ConnectorResult, DirectoryError};
use chansync_connector::traits::{Connector, DirectoryResolver};
use chansync_connector::types::{ConnectorType, IdentityHandle};

use crate::config::LdapConfig;

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result code for a filter the server could not evaluate.
const RC_FILTER_ERROR: u32 = 87;

/// Directory resolver backed by LDAP/Active Directory.
pub struct LdapDirectory {
    /// Configuration.
    config: LdapConfig,

    /// Display name for this connector instance.
    display_name: String,

    /// Cached LDAP connection (lazily initialized).
    connection: Arc<RwLock<Option<Ldap>>>,

    /// Whether the connector has been disposed.
    disposed: Arc<RwLock<bool>>,
}

impl LdapDirectory {
    /// Create a new directory resolver with the given configuration.
    pub fn new(config: LdapConfig) -> ConnectorResult<Self> {
        config.validate()?;
        config.tls.validate_security(&config.host);

        let display_name = format!("LDAP: {}", config.host);

        Ok(Self {
            config,
            display_name,
            connection: Arc::new(RwLock::new(None)),
            disposed: Arc::new(RwLock::new(false)),
        })
    }

    /// Get an LDAP connection, creating one if necessary.
    async fn get_connection(&self) -> ConnectorResult<Ldap> {
        if *self.disposed.read().await {
            return Err(ConnectorError::Disposed);
        }

        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let conn = self.create_connection().await?;

        {
            let mut conn_guard = self.connection.write().await;
            *conn_guard = Some(conn.clone());
        }

        Ok(conn)
    }

    /// Create and bind a new LDAP connection.
    async fn create_connection(&self) -> ConnectorResult<Ldap> {
        let url = self.config.url();

        debug!(url = %url, "Connecting to LDAP server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.config.connection.connection_timeout())
            .set_starttls(self.config.use_starttls)
            .set_no_tls_verify(!self.config.tls.verify_certificate);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                ConnectorError::connection_failed_with_source(
                    format!("Failed to connect to LDAP server at {url}"),
                    e,
                )
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let bind_dn = &self.config.bind_dn;
        let bind_password = self.config.bind_password.as_deref().unwrap_or("");

        debug!(bind_dn = %bind_dn, "Performing LDAP bind");

        let result = ldap
            .with_timeout(self.config.connection.read_timeout())
            .simple_bind(bind_dn, bind_password)
            .await
            .map_err(|e| {
                ConnectorError::connection_failed_with_source(
                    format!("LDAP bind failed for {bind_dn}"),
                    e,
                )
            })?;

        if result.rc != 0 {
            if result.rc == RC_INVALID_CREDENTIALS {
                return Err(ConnectorError::AuthenticationFailed);
            }
            return Err(ConnectorError::connection_failed(format!(
                "LDAP bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        info!(host = %self.config.host, "LDAP connection established successfully");

        Ok(ldap)
    }

    /// Pull the normalised handle out of a search entry.
    ///
    /// Attribute names are case-insensitive in LDAP, so the configured name
    /// is matched ignoring case. Multi-valued attributes use the first value.
    fn extract_handle(entry: &SearchEntry, attribute: &str) -> Option<IdentityHandle> {
        entry
            .attrs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .and_then(|(_, values)| values.first())
            .and_then(|value| IdentityHandle::parse(value))
    }

    /// Map a client-side failure while searching.
    fn search_error(query: &str, error: LdapError) -> DirectoryError {
        match error {
            LdapError::FilterParsing => DirectoryError::InvalidQuery {
                query: query.to_string(),
                message: "filter could not be parsed".to_string(),
            },
            other => DirectoryError::SearchFailed {
                message: other.to_string(),
            },
        }
    }

    /// Map a non-success LDAP result code at the end of a search.
    fn result_code_error(query: &str, rc: u32, text: &str) -> DirectoryError {
        if rc == RC_FILTER_ERROR {
            DirectoryError::InvalidQuery {
                query: query.to_string(),
                message: text.to_string(),
            }
        } else {
            DirectoryError::SearchFailed {
                message: format!("result code {rc}: {text}"),
            }
        }
    }
}

#[async_trait]
impl Connector for LdapDirectory {
    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Ldap
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        let mut ldap = self.get_connection().await?;

        let result = ldap
            .search(
                &self.config.search_base,
                Scope::Base,
                "(objectClass=*)",
                vec!["dn"],
            )
            .await
            .map_err(|e| ConnectorError::connection_failed_with_source("Test search failed", e))?;

        let (entries, _res) = result.success().map_err(|e| {
            ConnectorError::connection_failed(format!("Test search failed: {e}"))
        })?;

        if entries.is_empty() {
            return Err(ConnectorError::connection_failed(format!(
                "Search base '{}' not found or not accessible",
                self.config.search_base
            )));
        }

        info!("LDAP connection test successful");
        Ok(())
    }

    async fn dispose(&self) -> ConnectorResult<()> {
        *self.disposed.write().await = true;

        let mut conn_guard = self.connection.write().await;
        if let Some(mut ldap) = conn_guard.take() {
            if let Err(e) = ldap.unbind().await {
                warn!(error = %e, "Error during LDAP unbind");
            }
        }

        debug!("LDAP directory disposed");
        Ok(())
    }
}

#[async_trait]
impl DirectoryResolver for LdapDirectory {
    #[instrument(skip(self), fields(base = %self.config.search_base))]
    async fn resolve(&self, query: &str) -> Result<BTreeSet<IdentityHandle>, DirectoryError> {
        let mut ldap = self
            .get_connection()
            .await
            .map_err(DirectoryError::Unavailable)?;

        let attribute = self.config.handle_attribute.as_str();

        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(self.config.page_size)),
        ];

        let mut search = ldap
            .with_timeout(self.config.connection.read_timeout())
            .streaming_search_with(
                adapters,
                &self.config.search_base,
                Scope::Subtree,
                query,
                vec![attribute],
            )
            .await
            .map_err(|e| Self::search_error(query, e))?;

        let mut handles = BTreeSet::new();
        let mut entries = 0usize;
        let mut without_handle = 0usize;

        while let Some(entry) = search
            .next()
            .await
            .map_err(|e| Self::search_error(query, e))?
        {
            entries += 1;
            let entry = SearchEntry::construct(entry);
            match Self::extract_handle(&entry, attribute) {
                Some(handle) => {
                    handles.insert(handle);
                }
                None => {
                    without_handle += 1;
                    debug!(dn = %entry.dn, attribute = %attribute, "Entry has no handle attribute");
                }
            }
        }

        let result = search.finish().await;
        if result.rc != 0 {
            return Err(Self::result_code_error(query, result.rc, &result.text));
        }

        if without_handle > 0 {
            warn!(
                skipped = without_handle,
                attribute = %attribute,
                "Directory entries without a handle attribute were ignored"
            );
        }

        info!(
            entries = entries,
            handles = handles.len(),
            "Directory query resolved"
        );

        Ok(handles)
    }
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("display_name", &self.display_name)
            .field("config", &self.config.redacted())
            .finish()
    }
}
