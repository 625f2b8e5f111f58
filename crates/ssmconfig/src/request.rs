//! Building and executing parameter requests.

use crate::client::GetParametersByPath;
use crate::error::{Error, MissingParameters};
use crate::options::{OptionsError, RequestOptions};
use crate::paginator::{Paginator, PathPaginator};
use crate::path::{join_name, normalize_path};
use crate::schema::{Parameters, Schema, Setter};
use crate::tag::Tag;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A request that loads parameters once.
#[async_trait::async_trait]
pub trait Request: Send + Sync {
    /// Fetch every page and populate the target.
    ///
    /// # Panics
    ///
    /// Panics when the request has already been sent.
    async fn send(&self, cancel: &CancellationToken) -> Result<(), Error>;
}

/// Loads tagged fields of `T` from every parameter under one path.
pub struct ParameterRequest<'a, T, P> {
    path: String,
    setters: HashMap<String, Vec<Setter<T>>>,
    execution: Mutex<Execution<'a, T, P>>,
}

struct Execution<'a, T, P> {
    executed: bool,
    target: &'a mut T,
    missing: BTreeSet<String>,
    paginator: P,
}

impl<'a, T, C> ParameterRequest<'a, T, PathPaginator<C>>
where
    T: Parameters,
    C: GetParametersByPath,
{
    /// Request for the fields `T` declares, listing `path` through `client`.
    pub fn new(target: &'a mut T, path: &str, client: C) -> Self {
        Self::over_client(target, T::schema(), path, client, &RequestOptions::default())
    }

    /// Request for the fields `T` declares, listed with `options`.
    ///
    /// Fails when `options` does not pass [`RequestOptions::validate`].
    pub fn with_options(
        target: &'a mut T,
        path: &str,
        client: C,
        options: RequestOptions,
    ) -> Result<Self, OptionsError> {
        Self::with_schema(target, T::schema(), path, client, options)
    }
}

impl<'a, T, C> ParameterRequest<'a, T, PathPaginator<C>>
where
    C: GetParametersByPath,
{
    /// Request driven by an explicit schema instead of a derived one.
    pub fn with_schema(
        target: &'a mut T,
        schema: Schema<T>,
        path: &str,
        client: C,
        options: RequestOptions,
    ) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self::over_client(target, schema, path, client, &options))
    }

    fn over_client(target: &'a mut T, schema: Schema<T>, path: &str, client: C, options: &RequestOptions) -> Self {
        let path = normalize_path(path);
        let paginator = PathPaginator::new(client, options.input_for(&path), options.paginator_options());
        Self::build(target, schema, path, paginator)
    }
}

impl<'a, T, P> ParameterRequest<'a, T, P>
where
    P: Paginator,
{
    /// Request over a caller-supplied paginator. `path` is only used to
    /// resolve tags; the paginator decides what gets listed.
    pub fn from_paginator(target: &'a mut T, schema: Schema<T>, path: &str, paginator: P) -> Self {
        Self::build(target, schema, normalize_path(path), paginator)
    }

    fn build(target: &'a mut T, schema: Schema<T>, path: String, paginator: P) -> Self {
        let mut setters: HashMap<String, Vec<Setter<T>>> = HashMap::with_capacity(schema.len());
        let mut missing = BTreeSet::new();

        for spec in schema.into_fields() {
            let Some(tag) = Tag::parse(&spec.tag) else {
                trace!(field = %spec.field, tag = %spec.tag, "skipping field without a parameter name");
                continue;
            };
            let name = join_name(&path, &tag.suffix);
            trace!(field = %spec.field, parameter = %name, optional = tag.optional, "binding field");

            setters.entry(name.clone()).or_default().push(spec.setter);
            if !tag.optional {
                missing.insert(name);
            }
        }

        debug!(path = %path, bound = setters.len(), required = missing.len(), "built parameter request");

        Self {
            path,
            setters,
            execution: Mutex::new(Execution {
                executed: false,
                target,
                missing,
                paginator,
            }),
        }
    }
}

impl<T, P> ParameterRequest<'_, T, P> {
    /// Normalized base path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fully qualified names with at least one bound field, sorted.
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.setters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait::async_trait]
impl<T, P> Request for ParameterRequest<'_, T, P>
where
    T: Send,
    P: Paginator,
{
    async fn send(&self, cancel: &CancellationToken) -> Result<(), Error> {
        let mut execution = self.execution.lock().await;
        if execution.executed {
            panic!("request executed more than once");
        }
        execution.executed = true;

        let Execution {
            target,
            missing,
            paginator,
            ..
        } = &mut *execution;

        let mut page_index = 0usize;
        while paginator.has_more_pages() {
            let page = paginator.next_page(cancel).await?;
            trace!(path = %self.path, page = page_index, parameters = page.parameters.len(), "fetched parameter page");

            for parameter in page.parameters {
                if let Some(setters) = self.setters.get(&parameter.name) {
                    for setter in setters {
                        setter(&mut **target, &parameter.value);
                    }
                }
                missing.remove(&parameter.name);
            }
            page_index += 1;
        }

        if !missing.is_empty() {
            let missing = MissingParameters::new(missing.iter().cloned());
            debug!(path = %self.path, missing = ?missing.names(), "required parameters not found");
            return Err(missing.into());
        }

        debug!(path = %self.path, pages = page_index, "parameter request complete");
        Ok(())
    }
}
