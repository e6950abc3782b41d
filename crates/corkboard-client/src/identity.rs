//! Local identity management.
//!
//! "Authentication" here is a locally chosen display name, not verified
//! identity: login generates a stable id, stores the record under a fixed
//! key, and that's the whole ceremony. The record is read once at startup,
//! rewritten on login or profile update, and removed on logout.

use corkboard_shared::constants::IDENTITY_KEY;
use corkboard_shared::sanitize::{detect_dangerous, sanitize};
use corkboard_shared::User;
use corkboard_store::Database;

use crate::error::{AppError, Result};

/// Issues and persists the local user handle.
pub struct IdentityProvider {
    db: Database,
}

impl IdentityProvider {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn prepare_name(name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("display name cannot be empty".into()));
        }
        if detect_dangerous(name) {
            return Err(AppError::Validation(
                "display name matches a blocked content pattern".into(),
            ));
        }
        Ok(sanitize(name))
    }

    /// Create and persist a fresh identity. Replaces any existing one.
    pub fn login(&self, name: &str) -> Result<User> {
        let user = User::new(Self::prepare_name(name)?);
        self.db.set_record(IDENTITY_KEY, &user)?;
        tracing::info!(id = %user.id, "logged in");
        Ok(user)
    }

    /// The persisted identity, if any.
    pub fn current(&self) -> Result<Option<User>> {
        Ok(self.db.get_record(IDENTITY_KEY)?)
    }

    /// Change the display name, keeping the stable id.
    pub fn update_name(&self, name: &str) -> Result<User> {
        let mut user: User = self
            .db
            .get_record(IDENTITY_KEY)?
            .ok_or_else(|| AppError::NotFound("no identity to update".into()))?;
        user.name = Self::prepare_name(name)?;
        self.db.set_record(IDENTITY_KEY, &user)?;
        tracing::info!(id = %user.id, "display name updated");
        Ok(user)
    }

    /// Remove the persisted identity. Idempotent.
    pub fn logout(&self) -> Result<()> {
        self.db.delete_record(IDENTITY_KEY)?;
        tracing::info!("logged out");
        Ok(())
    }
}
