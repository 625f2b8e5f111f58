//! Errors returned by parameter requests.

use std::collections::BTreeSet;
use thiserror::Error;

/// Boxed error produced by a parameter store client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Required parameters that the store never returned.
///
/// Names are deduplicated and sorted so the error reads the same on every run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing ssm parameters: [{}]", .0.join(" "))]
pub struct MissingParameters(Vec<String>);

impl MissingParameters {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self(names.into_iter().collect())
    }

    /// Fully qualified names of the missing parameters, in lexicographic order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn into_names(self) -> Vec<String> {
        self.0
    }
}

/// Errors that can occur while executing a parameter request.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Missing(#[from] MissingParameters),

    #[error("failed to fetch parameters: {0}")]
    Fetch(#[source] BoxError),

    #[error("parameter request cancelled")]
    Cancelled,

    #[error("no more pages available")]
    NoMorePages,
}

impl Error {
    /// Returns the missing parameter names when this is a [`Error::Missing`].
    pub fn missing(&self) -> Option<&MissingParameters> {
        match self {
            Error::Missing(missing) => Some(missing),
            _ => None,
        }
    }
}
