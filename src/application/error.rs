use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::entities::EntityKind;
use crate::infra::error::InfraError;

/// Diagnostic payload carried on error responses.
///
/// Holds the full source chain so the response logger can emit it without
/// leaking internals to the client body.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    fn new(source: &'static str, status: StatusCode, messages: Vec<String>) -> Self {
        Self {
            source,
            status,
            messages,
        }
    }

    /// Collects `error` and its whole source chain, outermost first.
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut cause = error.source();
        while let Some(err) = cause {
            messages.push(err.to_string());
            cause = err.source();
        }
        Self::new(source, status, messages)
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self::new(source, status, vec![message.into()])
    }

    /// Leaves the report in the response extensions for the logging
    /// middleware to pick up.
    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failures raised by the catalog services.
///
/// `NotFound` and `AlreadyExists` are the two domain outcomes clients can
/// act on; everything the store raises passes through untouched.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} not found")]
    NotFound { kind: EntityKind },
    #[error("{kind} already exists")]
    AlreadyExists { kind: EntityKind },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind) -> Self {
        Self::NotFound { kind }
    }

    pub fn already_exists(kind: EntityKind) -> Self {
        Self::AlreadyExists { kind }
    }

    /// Folds a unique-constraint rejection into the domain duplicate error.
    pub fn from_repo_for(kind: EntityKind, err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => Self::AlreadyExists { kind },
            other => Self::Repo(other),
        }
    }
}

/// Failures outside a single request, reported once at process exit.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_kind() {
        assert_eq!(
            CatalogError::not_found(EntityKind::SubMenu).to_string(),
            "submenu not found"
        );
        assert_eq!(
            CatalogError::not_found(EntityKind::Dish).to_string(),
            "dish not found"
        );
    }

    #[test]
    fn duplicate_repo_error_becomes_already_exists() {
        let err = CatalogError::from_repo_for(
            EntityKind::Menu,
            RepoError::Duplicate {
                constraint: "menus_title_key".to_string(),
            },
        );
        assert!(matches!(
            err,
            CatalogError::AlreadyExists {
                kind: EntityKind::Menu
            }
        ));
    }

    #[test]
    fn other_repo_errors_pass_through() {
        let err = CatalogError::from_repo_for(EntityKind::Menu, RepoError::Timeout);
        assert!(matches!(err, CatalogError::Repo(RepoError::Timeout)));
    }

    #[test]
    fn report_collects_the_source_chain() {
        let repo = RepoError::Duplicate {
            constraint: "dishes_title_key".to_string(),
        };
        let err = CatalogError::Repo(repo);
        let report = ErrorReport::from_error("test", StatusCode::BAD_REQUEST, &err);

        assert_eq!(report.source, "test");
        assert!(!report.messages.is_empty());
        assert!(report.messages[0].contains("dishes_title_key"));
    }
}
