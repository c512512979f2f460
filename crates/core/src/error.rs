use thiserror::Error;

/// Result type for cypherlink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cypherlink operations
#[derive(Error, Debug)]
pub enum Error {
    /// The transport is unavailable or the connection was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The engine rejected a statement or failed while producing results
    #[error("Query error: {0}")]
    Query(String),

    /// The accumulated clauses do not form a valid statement
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value cannot be expressed as a Cypher literal or query parameter
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A value returned by the engine could not be converted
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// A lookup by id or by properties matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Structural problems detected while rendering a query
///
/// These are raised before anything is sent to the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("query has no clauses")]
    EmptyQuery,

    #[error("{0} clause has no pattern")]
    EmptyPattern(String),

    #[error("relationship has no preceding node to start from")]
    MissingLeftEndpoint,

    #[error("pattern element must follow MATCH, OPTIONAL MATCH, CREATE or MERGE")]
    PatternOutsideClause,

    #[error("filter must follow a MATCH or OPTIONAL MATCH pattern")]
    MisplacedFilter,

    #[error("{0} cannot follow RETURN")]
    ClauseAfterReturn(String),

    #[error("{0} requires a RETURN clause")]
    MissingReturn(String),

    #[error("query binds no variables to return")]
    NothingToReturn,

    #[error("{0} clause has no items")]
    EmptyItems(String),

    #[error("{0} must come before {1}")]
    ModifierOrder(String, String),

    #[error("{0} given more than once")]
    RepeatedModifier(String),

    #[error("MATCH after a write needs a variable to carry over")]
    ReadAfterWrite,

    #[error("'{0}' is not a variable or variable.property")]
    InvalidItem(String),

    #[error("identifiers must not be empty")]
    EmptyIdentifier,

    #[error("unsupported literal: {0}")]
    UnsupportedLiteral(String),
}

impl Error {
    /// Creates a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid value error
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// Creates a conversion error
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Creates a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
