//! Request options and their environment overrides.

use crate::client::GetParametersByPathInput;
use crate::paginator::PaginatorOptions;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub const WITH_DECRYPTION_ENV_VAR: &str = "SSMCONFIG_WITH_DECRYPTION";
pub const RECURSIVE_ENV_VAR: &str = "SSMCONFIG_RECURSIVE";
pub const PAGE_SIZE_ENV_VAR: &str = "SSMCONFIG_PAGE_SIZE";
pub const STOP_ON_DUPLICATE_TOKEN_ENV_VAR: &str = "SSMCONFIG_STOP_ON_DUPLICATE_TOKEN";

/// Largest page a parameter store hands out for a path listing.
pub const MAX_PAGE_SIZE: i32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must be an integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("page size must be between 1 and 10, got {0}")]
    PageSizeOutOfRange(i32),
}

/// Options controlling how a request lists parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RequestOptions {
    /// Ask the store to decrypt `SecureString` values.
    pub with_decryption: bool,
    /// List every descendant of the path instead of its direct children.
    pub recursive: bool,
    /// Parameters per page. The store default applies when unset.
    pub page_size: Option<i32>,
    pub stop_on_duplicate_token: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            with_decryption: true,
            recursive: false,
            page_size: None,
            stop_on_duplicate_token: true,
        }
    }
}

impl RequestOptions {
    /// Defaults overridden by any `SSMCONFIG_*` variables that are set.
    ///
    /// Blank variables are treated as unset.
    pub fn from_env() -> Result<Self, OptionsError> {
        let mut options = Self::default();

        if let Some(value) = read_var(WITH_DECRYPTION_ENV_VAR) {
            options.with_decryption = parse_bool(WITH_DECRYPTION_ENV_VAR, &value)?;
        }
        if let Some(value) = read_var(RECURSIVE_ENV_VAR) {
            options.recursive = parse_bool(RECURSIVE_ENV_VAR, &value)?;
        }
        if let Some(value) = read_var(PAGE_SIZE_ENV_VAR) {
            let page_size = value.parse::<i32>().map_err(|_| OptionsError::InvalidNumber {
                var: PAGE_SIZE_ENV_VAR,
                value: value.clone(),
            })?;
            options.page_size = Some(page_size);
        }
        if let Some(value) = read_var(STOP_ON_DUPLICATE_TOKEN_ENV_VAR) {
            options.stop_on_duplicate_token = parse_bool(STOP_ON_DUPLICATE_TOKEN_ENV_VAR, &value)?;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        match self.page_size {
            Some(size) if !(1..=MAX_PAGE_SIZE).contains(&size) => Err(OptionsError::PageSizeOutOfRange(size)),
            _ => Ok(()),
        }
    }

    /// Base input for listing `path`, which must already be normalized.
    pub fn input_for(&self, path: &str) -> GetParametersByPathInput {
        GetParametersByPathInput {
            path: path.to_string(),
            with_decryption: self.with_decryption,
            recursive: self.recursive,
            max_results: None,
            next_token: None,
        }
    }

    pub fn paginator_options(&self) -> PaginatorOptions {
        PaginatorOptions {
            limit: self.page_size,
            stop_on_duplicate_token: self.stop_on_duplicate_token,
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, OptionsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OptionsError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 4] = [
        WITH_DECRYPTION_ENV_VAR,
        RECURSIVE_ENV_VAR,
        PAGE_SIZE_ENV_VAR,
        STOP_ON_DUPLICATE_TOKEN_ENV_VAR,
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS.iter().map(|var| (*var, None)).collect()
    }

    #[test]
    fn defaults_decrypt_and_list_direct_children() {
        let options = RequestOptions::default();
        assert!(options.with_decryption);
        assert!(!options.recursive);
        assert_eq!(options.page_size, None);

        let input = options.input_for("/app");
        assert_eq!(input.path, "/app");
        assert!(input.with_decryption);
        assert_eq!(input.next_token, None);
    }

    #[test]
    fn from_env_without_variables_matches_defaults() {
        temp_env::with_vars(unset_all(), || {
            assert_eq!(RequestOptions::from_env(), Ok(RequestOptions::default()));
        });
    }

    #[test]
    fn from_env_reads_overrides() {
        let mut vars = unset_all();
        vars.extend([
            (WITH_DECRYPTION_ENV_VAR, Some("false")),
            (RECURSIVE_ENV_VAR, Some("YES")),
            (PAGE_SIZE_ENV_VAR, Some(" 5 ")),
        ]);
        temp_env::with_vars(vars, || {
            let options = RequestOptions::from_env().expect("options");
            assert!(!options.with_decryption);
            assert!(options.recursive);
            assert_eq!(options.page_size, Some(5));
            assert_eq!(options.paginator_options().limit, Some(5));
        });
    }

    #[test]
    fn blank_variables_keep_defaults() {
        let mut vars = unset_all();
        vars.push((RECURSIVE_ENV_VAR, Some("   ")));
        temp_env::with_vars(vars, || {
            assert_eq!(RequestOptions::from_env(), Ok(RequestOptions::default()));
        });
    }

    #[test]
    fn rejects_bad_boolean() {
        let mut vars = unset_all();
        vars.push((STOP_ON_DUPLICATE_TOKEN_ENV_VAR, Some("maybe")));
        temp_env::with_vars(vars, || {
            let err = RequestOptions::from_env().expect_err("invalid bool");
            assert_eq!(
                err,
                OptionsError::InvalidBool {
                    var: STOP_ON_DUPLICATE_TOKEN_ENV_VAR,
                    value: "maybe".into()
                }
            );
        });
    }

    #[test]
    fn rejects_page_size_out_of_range() {
        let mut vars = unset_all();
        vars.push((PAGE_SIZE_ENV_VAR, Some("50")));
        temp_env::with_vars(vars, || {
            assert_eq!(RequestOptions::from_env(), Err(OptionsError::PageSizeOutOfRange(50)));
        });

        let mut vars = unset_all();
        vars.push((PAGE_SIZE_ENV_VAR, Some("ten")));
        temp_env::with_vars(vars, || {
            assert!(matches!(
                RequestOptions::from_env(),
                Err(OptionsError::InvalidNumber { .. })
            ));
        });
    }

    #[test]
    fn deserializes_partial_yaml_with_defaults() {
        let options: RequestOptions = serde_yaml::from_str("recursive: true\npageSize: 4\n").expect("yaml");
        assert!(options.recursive);
        assert!(options.with_decryption);
        assert_eq!(options.page_size, Some(4));
        assert!(options.stop_on_duplicate_token);
    }
}
