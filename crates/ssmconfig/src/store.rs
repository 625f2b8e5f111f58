//! In-memory parameter store.
//!
//! Serves path listings with the same paging and decryption rules a remote
//! store applies, which makes it usable in tests and for local development
//! against a YAML file of parameters:
//!
//! ```yaml
//! parameters:
//!   - name: /app/db/url
//!     value: postgres://localhost/app
//!   - name: /app/db/password
//!     value: hunter2
//!     type: SecureString
//! ```

use crate::client::{GetParametersByPath, GetParametersByPathInput, GetParametersByPathOutput, Parameter, ParameterType};
use crate::error::BoxError;
use crate::options::MAX_PAGE_SIZE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, trace};

const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid parameter path '{0}': must start with '/'")]
    InvalidPath(String),

    #[error("invalid parameter name '{0}': must start with '/' and not end with '/'")]
    InvalidName(String),

    #[error("max results must be between 1 and 10, got {0}")]
    InvalidMaxResults(i32),

    #[error("failed to read parameter file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse parameter document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreDocument {
    #[serde(default)]
    parameters: Vec<Parameter>,
}

/// Parameter store kept in memory, ordered by name.
///
/// Every page request is recorded and kept for the lifetime of the store,
/// so a long-lived store grows with each listing.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    parameters: BTreeMap<String, Parameter>,
    received: Mutex<Vec<GetParametersByPathInput>>,
}

impl MemoryParameterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load parameters from a YAML (or JSON) document.
    pub fn from_yaml_str(content: &str) -> Result<Self, StoreError> {
        let document: StoreDocument = serde_yaml::from_str(content)?;
        let mut store = Self::new();
        for parameter in document.parameters {
            store.insert(parameter)?;
        }
        debug!(parameters = store.len(), "loaded parameter document");
        Ok(store)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Builder form of [`insert`](Self::insert) for plain string parameters.
    ///
    /// # Panics
    ///
    /// Panics when `name` is not a valid parameter name.
    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        if let Err(err) = self.insert(Parameter::new(name, value)) {
            panic!("{err}");
        }
        self
    }

    /// Insert or replace a parameter. Replacing bumps the version.
    pub fn insert(&mut self, mut parameter: Parameter) -> Result<(), StoreError> {
        if !parameter.name.starts_with('/') || (parameter.name.len() > 1 && parameter.name.ends_with('/')) {
            return Err(StoreError::InvalidName(parameter.name));
        }
        if let Some(existing) = self.parameters.get(&parameter.name) {
            parameter.version = existing.version + 1;
        }
        self.parameters.insert(parameter.name.clone(), parameter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Every input received so far, oldest first.
    pub async fn received_inputs(&self) -> Vec<GetParametersByPathInput> {
        self.received.lock().await.clone()
    }

    fn list(&self, input: &GetParametersByPathInput) -> Result<GetParametersByPathOutput, StoreError> {
        if !input.path.starts_with('/') {
            return Err(StoreError::InvalidPath(input.path.clone()));
        }
        let page_size = match input.max_results {
            None => DEFAULT_PAGE_SIZE,
            Some(max) if (1..=MAX_PAGE_SIZE).contains(&max) => max as usize,
            Some(max) => return Err(StoreError::InvalidMaxResults(max)),
        };

        let prefix = match input.path.trim_end_matches('/') {
            "" => "/".to_string(),
            path => format!("{}/", path),
        };
        let start = match &input.next_token {
            Some(token) => Bound::Excluded(token.clone()),
            None => Bound::Included(prefix.clone()),
        };

        let mut matching = self
            .parameters
            .range((start, Bound::Unbounded))
            .map(|(_, parameter)| parameter)
            .take_while(|parameter| parameter.name.starts_with(&prefix))
            .filter(|parameter| input.recursive || !parameter.name[prefix.len()..].contains('/'));

        let parameters: Vec<Parameter> = matching
            .by_ref()
            .take(page_size)
            .map(|parameter| reveal(parameter, input.with_decryption))
            .collect();
        let next_token = match matching.next() {
            Some(_) => parameters.last().map(|parameter| parameter.name.clone()),
            None => None,
        };

        trace!(
            path = %input.path,
            returned = parameters.len(),
            more = next_token.is_some(),
            "listed parameters"
        );
        Ok(GetParametersByPathOutput { parameters, next_token })
    }
}

fn reveal(parameter: &Parameter, with_decryption: bool) -> Parameter {
    let mut parameter = parameter.clone();
    if parameter.kind == ParameterType::SecureString && !with_decryption {
        parameter.value = format!("ciphertext:{}", parameter.value.len());
    }
    parameter
}

#[async_trait::async_trait]
impl GetParametersByPath for MemoryParameterStore {
    async fn get_parameters_by_path(
        &self,
        input: GetParametersByPathInput,
    ) -> Result<GetParametersByPathOutput, BoxError> {
        self.received.lock().await.push(input.clone());
        Ok(self.list(&input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn input(path: &str) -> GetParametersByPathInput {
        GetParametersByPathInput {
            path: path.into(),
            with_decryption: true,
            ..Default::default()
        }
    }

    fn names(output: &GetParametersByPathOutput) -> Vec<&str> {
        output.parameters.iter().map(|parameter| parameter.name.as_str()).collect()
    }

    fn sample_store() -> MemoryParameterStore {
        MemoryParameterStore::new()
            .with_parameter("/app/a", "1")
            .with_parameter("/app/b", "2")
            .with_parameter("/app/db/url", "postgres://db")
            .with_parameter("/application/x", "other tree")
            .with_parameter("/root", "top")
    }

    #[test]
    fn lists_direct_children_only() {
        let output = sample_store().list(&input("/app")).expect("list");
        assert_eq!(names(&output), ["/app/a", "/app/b"]);
        assert_eq!(output.next_token, None);
    }

    #[test]
    fn recursive_lists_descendants() {
        let mut request = input("/app");
        request.recursive = true;
        let output = sample_store().list(&request).expect("list");
        assert_eq!(names(&output), ["/app/a", "/app/b", "/app/db/url"]);
    }

    #[test]
    fn root_path_lists_top_level() {
        let output = sample_store().list(&input("/")).expect("list");
        assert_eq!(names(&output), ["/root"]);
    }

    #[test]
    fn pages_follow_tokens() {
        let store = sample_store();
        let mut request = input("/app");
        request.recursive = true;
        request.max_results = Some(2);

        let first = store.list(&request).expect("first page");
        assert_eq!(names(&first), ["/app/a", "/app/b"]);
        assert_eq!(first.next_token.as_deref(), Some("/app/b"));

        request.next_token = first.next_token;
        let second = store.list(&request).expect("second page");
        assert_eq!(names(&second), ["/app/db/url"]);
        assert_eq!(second.next_token, None);
    }

    #[test]
    fn exact_page_fit_has_no_token() {
        let mut request = input("/app");
        request.max_results = Some(2);
        let output = sample_store().list(&request).expect("list");
        assert_eq!(output.parameters.len(), 2);
        assert_eq!(output.next_token, None);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let store = sample_store();
        assert!(matches!(store.list(&input("app")), Err(StoreError::InvalidPath(_))));

        let mut request = input("/app");
        request.max_results = Some(11);
        assert!(matches!(store.list(&request), Err(StoreError::InvalidMaxResults(11))));
        request.max_results = Some(0);
        assert!(matches!(store.list(&request), Err(StoreError::InvalidMaxResults(0))));
    }

    #[test]
    fn secure_values_need_decryption() {
        let mut store = MemoryParameterStore::new();
        store.insert(Parameter::secure("/app/password", "hunter2")).expect("insert");

        let output = store.list(&input("/app")).expect("list");
        assert_eq!(output.parameters[0].value, "hunter2");

        let mut request = input("/app");
        request.with_decryption = false;
        let output = store.list(&request).expect("list");
        assert_eq!(output.parameters[0].value, "ciphertext:7");
    }

    #[test]
    fn insert_validates_names_and_bumps_versions() {
        let mut store = MemoryParameterStore::new();
        assert!(matches!(
            store.insert(Parameter::new("app/x", "v")),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.insert(Parameter::new("/app/x/", "v")),
            Err(StoreError::InvalidName(_))
        ));

        store.insert(Parameter::new("/app/x", "v1")).expect("insert");
        store.insert(Parameter::new("/app/x", "v2")).expect("replace");
        let parameter = store.get("/app/x").expect("present");
        assert_eq!(parameter.value, "v2");
        assert_eq!(parameter.version, 2);
    }

    #[test]
    fn loads_yaml_document() {
        let store = MemoryParameterStore::from_yaml_str(
            r#"
parameters:
  - name: /app/db/url
    value: postgres://localhost/app
  - name: /app/db/password
    value: hunter2
    type: SecureString
    version: 4
"#,
        )
        .expect("yaml");

        assert_eq!(store.len(), 2);
        let password = store.get("/app/db/password").expect("password");
        assert_eq!(password.kind, ParameterType::SecureString);
        assert_eq!(password.version, 4);
        assert_eq!(store.get("/app/db/url").map(|p| p.version), Some(1));
    }

    #[test]
    fn yaml_errors_are_reported() {
        assert!(matches!(
            MemoryParameterStore::from_yaml_str("parameters: [{name: /a}]"),
            Err(StoreError::Parse(_))
        ));
        assert!(matches!(
            MemoryParameterStore::from_yaml_str("parameters: [{name: a, value: b}]"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "parameters:\n  - name: /svc/key\n    value: abc").expect("write");

        let store = MemoryParameterStore::from_yaml_file(file.path()).expect("load");
        assert_eq!(store.get("/svc/key").map(|p| p.value.as_str()), Some("abc"));

        let missing = MemoryParameterStore::from_yaml_file(Path::new("/nonexistent/params.yaml"));
        assert!(matches!(missing, Err(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn records_received_inputs() {
        let store = sample_store();
        let output = store.get_parameters_by_path(input("/app")).await.expect("list");
        assert_eq!(output.parameters.len(), 2);
        assert!(store.get_parameters_by_path(input("bad")).await.is_err());

        let inputs = store.received_inputs().await;
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[1].path, "bad");
    }
}
