//! # Drink Entity
//!
//! The single record type managed by SipDB, plus the field validation shared
//! by the CLI and HTTP front ends. Mutation helpers persist immediately
//! through the store; `delete` consumes the instance so a deleted drink
//! cannot be saved or updated again.

use crate::db::SipStore;
use crate::error::{SipError, SipResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a drink name
pub const NAME_MAX_LEN: usize = 80;

/// Maximum length of a drink description
pub const DESCRIPTION_MAX_LEN: usize = 120;

/// One persisted drink row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Partial update: only fields explicitly provided are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validates a drink name (required, unique names are enforced by the store)
pub fn validate_name(name: &str) -> SipResult<()> {
    if name.trim().is_empty() {
        return Err(SipError::validation("name", "must not be empty"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(SipError::validation(
            "name",
            format!("must be at most {} characters", NAME_MAX_LEN),
        ));
    }
    Ok(())
}

/// Validates a drink description
pub fn validate_description(description: &str) -> SipResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(SipError::validation(
            "description",
            format!("must be at most {} characters", DESCRIPTION_MAX_LEN),
        ));
    }
    Ok(())
}

impl DrinkPatch {
    /// True if the patch carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Validates whichever fields are present
    pub fn validate(&self) -> SipResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

impl Drink {
    /// Builds an unsaved drink; the id is assigned by the store on `save`
    pub fn new(name: impl Into<String>, description: Option<String>) -> SipResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        if let Some(description) = &description {
            validate_description(description)?;
        }
        Ok(Self {
            id: 0,
            name,
            description,
        })
    }

    /// Persists this drink as a new row and records the assigned id
    pub async fn save(&mut self, store: &SipStore) -> SipResult<()> {
        self.id = store
            .insert(&self.name, self.description.as_deref())
            .await?;
        Ok(())
    }

    /// Applies a partial patch and persists it, refreshing this instance
    pub async fn update(&mut self, store: &SipStore, patch: DrinkPatch) -> SipResult<()> {
        *self = store.update(self.id, patch).await?;
        Ok(())
    }

    /// Removes the row. Takes ownership so the deleted instance cannot be
    /// saved or updated afterwards.
    pub async fn delete(self, store: &SipStore) -> SipResult<()> {
        store.delete(self.id).await
    }
}

impl fmt::Display for Drink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} - {}",
            self.id,
            self.name,
            self.description.as_deref().unwrap_or("")
        )
    }
}
