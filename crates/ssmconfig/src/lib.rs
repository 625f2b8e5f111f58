//! Load configuration structs from a hierarchical parameter store.
//!
//! Fields are bound to parameter names through `#[ssm("...")]` attributes.
//! A [`ParameterRequest`] joins each tag with a base path, drains every page
//! the store returns for that path, writes the values into the target struct
//! and reports required parameters that were never returned.
//!
//! # Example
//!
//! ```ignore
//! use ssmconfig::{MemoryParameterStore, ParameterRequest, Parameters, Request};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Default, Parameters)]
//! struct DatabaseConfig {
//!     #[ssm("url")]
//!     url: String,
//!     #[ssm("replica_url,optional")]
//!     replica_url: String,
//! }
//!
//! async fn load() -> Result<DatabaseConfig, ssmconfig::Error> {
//!     let store = MemoryParameterStore::new().with_parameter("/app/db/url", "postgres://db");
//!     let mut config = DatabaseConfig::default();
//!     ParameterRequest::new(&mut config, "app/db", store)
//!         .send(&CancellationToken::new())
//!         .await?;
//!     Ok(config)
//! }
//! ```
//!
//! A request runs once. Sending the same request a second time panics, since
//! it means the caller lost track of which values were already loaded.

extern crate self as ssmconfig;

mod client;
mod error;
mod options;
mod paginator;
mod path;
mod request;
mod schema;
mod store;
mod tag;

pub use client::{GetParametersByPath, GetParametersByPathInput, GetParametersByPathOutput, Parameter, ParameterType};
pub use error::{BoxError, Error, MissingParameters};
pub use options::{OptionsError, RequestOptions};
pub use paginator::{Paginator, PaginatorOptions, PathPaginator};
pub use path::{join_name, normalize_path};
pub use request::{ParameterRequest, Request};
pub use schema::{FieldSpec, Parameters, Schema, Setter};
pub use store::{MemoryParameterStore, StoreError};
pub use tag::Tag;

pub use ssmconfig_derive::Parameters;
