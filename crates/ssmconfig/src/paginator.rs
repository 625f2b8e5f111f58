//! Continuation-token pagination over a [`GetParametersByPath`] client.

use crate::client::{GetParametersByPath, GetParametersByPathInput, GetParametersByPathOutput};
use crate::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Iteration contract a request drives: ask for more pages, then fetch one.
#[async_trait::async_trait]
pub trait Paginator: Send {
    /// Whether another page can be fetched. True before the first fetch.
    fn has_more_pages(&self) -> bool;

    /// Fetch the next page, or fail with [`Error::NoMorePages`] once exhausted.
    async fn next_page(&mut self, cancel: &CancellationToken) -> Result<GetParametersByPathOutput, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorOptions {
    /// Maximum number of parameters per page, sent as `max_results`.
    pub limit: Option<i32>,
    /// End pagination when the store hands back the token it was just given.
    pub stop_on_duplicate_token: bool,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            limit: None,
            stop_on_duplicate_token: true,
        }
    }
}

/// Paginator following the `next_token` chain of a path listing.
pub struct PathPaginator<C> {
    client: C,
    input: GetParametersByPathInput,
    options: PaginatorOptions,
    first_page: bool,
    next_token: Option<String>,
}

impl<C> PathPaginator<C>
where
    C: GetParametersByPath,
{
    /// Create a paginator starting at `input.next_token`, if any.
    pub fn new(client: C, input: GetParametersByPathInput, options: PaginatorOptions) -> Self {
        let next_token = input.next_token.clone();
        Self {
            client,
            input,
            options,
            first_page: true,
            next_token,
        }
    }
}

#[async_trait::async_trait]
impl<C> Paginator for PathPaginator<C>
where
    C: GetParametersByPath,
{
    fn has_more_pages(&self) -> bool {
        self.first_page || self.next_token.is_some()
    }

    async fn next_page(&mut self, cancel: &CancellationToken) -> Result<GetParametersByPathOutput, Error> {
        if !self.has_more_pages() {
            return Err(Error::NoMorePages);
        }

        let mut input = self.input.clone();
        input.next_token = self.next_token.clone();
        if let Some(limit) = self.options.limit {
            input.max_results = Some(limit);
        }
        trace!(path = %input.path, next_token = ?input.next_token, "requesting parameter page");

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.client.get_parameters_by_path(input) => result.map_err(Error::Fetch)?,
        };

        self.first_page = false;
        let previous = self.next_token.take();
        let mut next = output.next_token.clone().filter(|token| !token.is_empty());
        if self.options.stop_on_duplicate_token && previous.is_some() && next == previous {
            trace!(next_token = ?next, "store repeated its continuation token; stopping");
            next = None;
        }
        self.next_token = next;

        Ok(output)
    }
}
