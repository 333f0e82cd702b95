//! Shared admin PIN.
//!
//! The PIN is a single plaintext secret compared by exact string match.
//! It gates client-side admin screens and is not a credential store.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    database::{models::admin_settings_from_document, Collection, Database, Document},
    errors::NavigationError,
};

/// Key of the singleton admin settings document
pub const ADMIN_KEY: &str = "admin";

#[derive(Debug, Clone)]
pub struct AdminGate {
    database: Database,
    default_pin: String,
}

impl AdminGate {
    pub fn new(database: Database, default_pin: impl Into<String>) -> Self {
        Self {
            database,
            default_pin: default_pin.into(),
        }
    }

    /// Seed the admin record with the default PIN if it is missing.
    ///
    /// Returns true when a record was created. An existing record is
    /// never touched.
    pub async fn initialize(&self) -> Result<bool, NavigationError> {
        info!("Initializing admin settings");
        if self
            .database
            .find_one(Collection::AdminSettings, ADMIN_KEY)
            .await?
            .is_some()
        {
            info!("Admin settings already exist");
            return Ok(false);
        }

        let mut document = Document::new();
        document.insert("pin".to_string(), Value::String(self.default_pin.clone()));
        self.database
            .insert_one(Collection::AdminSettings, ADMIN_KEY, document)
            .await?;

        info!("Admin settings initialized with default PIN");
        Ok(true)
    }

    /// Check `candidate` against the stored PIN.
    ///
    /// A wrong PIN, a missing admin record and a malformed one all yield
    /// `Unauthorized`.
    pub async fn verify_pin(&self, candidate: &str) -> Result<(), NavigationError> {
        let stored = match self
            .database
            .find_one(Collection::AdminSettings, ADMIN_KEY)
            .await?
        {
            Some(document) => match admin_settings_from_document(ADMIN_KEY, document) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    error!("Unreadable admin settings: {}", e);
                    None
                }
            },
            None => None,
        };

        match stored {
            Some(settings) if settings.pin == candidate => {
                info!("PIN verified");
                Ok(())
            }
            _ => {
                warn!("PIN verification failed");
                Err(NavigationError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gate() -> AdminGate {
        AdminGate::new(Database::in_memory(), "1234")
    }

    #[tokio::test]
    async fn test_initialize_seeds_default_pin() -> Result<(), NavigationError> {
        let gate = gate();
        assert!(gate.initialize().await?);
        gate.verify_pin("1234").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() -> Result<(), NavigationError> {
        let database = Database::in_memory();
        let mut document = Document::new();
        document.insert("pin".to_string(), Value::String("9876".to_string()));
        database
            .insert_one(Collection::AdminSettings, ADMIN_KEY, document)
            .await?;

        let gate = AdminGate::new(database, "1234");
        assert!(!gate.initialize().await?);
        assert!(!gate.initialize().await?);
        gate.verify_pin("9876").await?;
        assert!(matches!(
            gate.verify_pin("1234").await,
            Err(NavigationError::Unauthorized)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_wrong_and_empty_pin() -> Result<(), NavigationError> {
        let gate = gate();
        gate.initialize().await?;

        for candidate in ["0000", "", "1234 ", "12345"] {
            assert!(
                matches!(
                    gate.verify_pin(candidate).await,
                    Err(NavigationError::Unauthorized)
                ),
                "accepted {candidate:?}"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_malformed_record() -> Result<(), NavigationError> {
        let records = [
            json!({"pin": 1234}),
            json!({"code": "1234"}),
            json!({"pin": null}),
        ];

        for record in records {
            let database = Database::in_memory();
            let Value::Object(document) = record.clone() else {
                unreachable!()
            };
            database
                .insert_one(Collection::AdminSettings, ADMIN_KEY, document)
                .await?;

            let gate = AdminGate::new(database, "1234");
            for candidate in ["1234", "0000", ""] {
                assert!(
                    matches!(
                        gate.verify_pin(candidate).await,
                        Err(NavigationError::Unauthorized)
                    ),
                    "record {record} accepted {candidate:?}"
                );
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_without_record() {
        let gate = gate();
        assert!(matches!(
            gate.verify_pin("1234").await,
            Err(NavigationError::Unauthorized)
        ));
    }
}
