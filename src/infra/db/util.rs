use sqlx::error::DatabaseError;

use crate::application::repos::RepoError;

/// Translate driver errors into the repository error taxonomy.
///
/// Postgres reports constraint problems through message text, so the
/// matching here is substring-based.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return RepoError::NotFound;
    }
    if let sqlx::Error::Database(db) = &err {
        if let Some(mapped) = classify_database_message(db.as_ref()) {
            return mapped;
        }
    }
    RepoError::from_persistence(err)
}

fn classify_database_message(db: &dyn DatabaseError) -> Option<RepoError> {
    let message = db.message();
    if message.contains("duplicate key") {
        return Some(RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        });
    }
    if message.contains("violates foreign key constraint")
        || message.contains("invalid input syntax")
    {
        return Some(RepoError::InvalidInput {
            message: message.to_string(),
        });
    }
    if message.contains("violates") {
        return Some(RepoError::Integrity {
            message: message.to_string(),
        });
    }
    message
        .contains("canceling statement due to user request")
        .then_some(RepoError::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let mapped = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, RepoError::NotFound));
    }

    #[test]
    fn other_errors_map_to_persistence() {
        let mapped = map_sqlx_error(sqlx::Error::PoolClosed);
        assert!(matches!(mapped, RepoError::Persistence(_)));
    }
}
