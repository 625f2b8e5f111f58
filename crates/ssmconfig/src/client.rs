//! Contract for clients that list parameters under a path.

use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of value held by a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    #[default]
    String,
    StringList,
    SecureString,
}

/// A single parameter returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: ParameterType,
    #[serde(default = "default_version")]
    pub version: i64,
}

fn default_version() -> i64 {
    1
}

impl Parameter {
    /// Create a plain `String` parameter at version 1.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: ParameterType::String,
            version: default_version(),
        }
    }

    /// Create a `SecureString` parameter at version 1.
    pub fn secure(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ParameterType::SecureString,
            ..Self::new(name, value)
        }
    }
}

/// Input for a single page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetParametersByPathInput {
    pub path: String,
    pub with_decryption: bool,
    pub recursive: bool,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

/// One page of parameters, with the token for the next page if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetParametersByPathOutput {
    pub parameters: Vec<Parameter>,
    pub next_token: Option<String>,
}

/// Client able to list parameters under a path, one page per call.
///
/// Transport, authentication and retries belong to the implementation.
#[async_trait::async_trait]
pub trait GetParametersByPath: Send + Sync {
    async fn get_parameters_by_path(
        &self,
        input: GetParametersByPathInput,
    ) -> Result<GetParametersByPathOutput, BoxError>;
}

#[async_trait::async_trait]
impl<C> GetParametersByPath for Arc<C>
where
    C: GetParametersByPath + ?Sized,
{
    async fn get_parameters_by_path(
        &self,
        input: GetParametersByPathInput,
    ) -> Result<GetParametersByPathOutput, BoxError> {
        (**self).get_parameters_by_path(input).await
    }
}

#[async_trait::async_trait]
impl<C> GetParametersByPath for &C
where
    C: GetParametersByPath + ?Sized,
{
    async fn get_parameters_by_path(
        &self,
        input: GetParametersByPathInput,
    ) -> Result<GetParametersByPathOutput, BoxError> {
        (**self).get_parameters_by_path(input).await
    }
}
