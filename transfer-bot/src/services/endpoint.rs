//! Derives the database to use from a connection string.

/// Which database a connection should operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSelector {
    Named(String),
    /// The default database declared by the connection string itself.
    Default,
}

impl DatabaseSelector {
    pub fn from_uri(uri: &str) -> Self {
        match resolve_database_name(uri) {
            "" => DatabaseSelector::Default,
            name => DatabaseSelector::Named(name.to_string()),
        }
    }

    /// Name for logging; never contains credentials.
    pub fn label(&self) -> &str {
        match self {
            DatabaseSelector::Named(name) => name,
            DatabaseSelector::Default => "<default>",
        }
    }
}

/// Text after the last `/`, cut at the first `?`.
///
/// Total over all strings and never touches the network. An empty result
/// means "use the connection's default database".
pub fn resolve_database_name(uri: &str) -> &str {
    let tail = uri.rsplit('/').next().unwrap_or(uri);
    tail.split('?').next().unwrap_or(tail)
}
