//! Call sheet status machine and child-row enumerations.
//!
//! Defines the call sheet lifecycle (`DRAFT` -> `PUBLISHED` -> `UPDATED`, or
//! `CANCELLED`) with an exhaustive transition table, plus the scene status and
//! crew department enums stored on child rows.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Call sheet status
// ---------------------------------------------------------------------------

/// Lifecycle status of a call sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallSheetStatus {
    #[default]
    Draft,
    Published,
    Updated,
    Cancelled,
}

impl CallSheetStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [CallSheetStatus; 4] = [
        Self::Draft,
        Self::Published,
        Self::Updated,
        Self::Cancelled,
    ];

    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "UPDATED" => Ok(Self::Updated),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid call sheet status '{s}'. Must be one of: DRAFT, PUBLISHED, UPDATED, CANCELLED"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Updated => "UPDATED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns the set of statuses this status may transition to.
    ///
    /// Transition rules:
    /// - `DRAFT`     -> `PUBLISHED`, `CANCELLED`
    /// - `PUBLISHED` -> `UPDATED`, `CANCELLED`
    /// - `UPDATED`   -> `PUBLISHED` (re-issue), `CANCELLED`
    /// - `CANCELLED` -> (terminal)
    pub fn valid_transitions(self) -> &'static [CallSheetStatus] {
        match self {
            Self::Draft => &[Self::Published, Self::Cancelled],
            Self::Published => &[Self::Updated, Self::Cancelled],
            Self::Updated => &[Self::Published, Self::Cancelled],
            Self::Cancelled => &[],
        }
    }

    /// Whether `self -> next` is in the transition table.
    pub fn can_transition_to(self, next: CallSheetStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Validate that a transition from `self` to `next` is allowed.
    pub fn validate_transition(self, next: CallSheetStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    /// Whether a call sheet in this status may have its content saved.
    pub fn accepts_edits(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Status a call sheet ends up in after its content is saved.
    ///
    /// Saving a distributed (published) sheet marks it as updated so the
    /// recipients know to re-read it. Drafts and already-updated sheets keep
    /// their status.
    pub fn after_content_save(self) -> Result<CallSheetStatus, CoreError> {
        match self {
            Self::Draft | Self::Updated => Ok(self),
            Self::Published => Ok(Self::Updated),
            Self::Cancelled => Err(CoreError::InvalidTransition {
                from: self.as_str().to_string(),
                to: Self::Updated.as_str().to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CallSheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Scene status
// ---------------------------------------------------------------------------

/// Shooting status of a scene scheduled on a call sheet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Moved,
}

impl SceneStatus {
    /// Parse a scene status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "SCHEDULED" => Ok(Self::Scheduled),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "MOVED" => Ok(Self::Moved),
            _ => Err(CoreError::Validation(format!(
                "Invalid scene status '{s}'. Must be one of: SCHEDULED, COMPLETED, CANCELLED, MOVED"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Moved => "MOVED",
        }
    }
}

// ---------------------------------------------------------------------------
// Crew departments
// ---------------------------------------------------------------------------

/// Fixed production departments a crew member can be assigned to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Camera,
    Sound,
    Lighting,
    Grip,
    Electric,
    Production,
    Art,
    Makeup,
    Wardrobe,
    Vfx,
    #[default]
    Other,
}

impl Department {
    /// All departments in display order.
    pub const ALL: [Department; 11] = [
        Self::Camera,
        Self::Sound,
        Self::Lighting,
        Self::Grip,
        Self::Electric,
        Self::Production,
        Self::Art,
        Self::Makeup,
        Self::Wardrobe,
        Self::Vfx,
        Self::Other,
    ];

    /// Parse a department string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid department '{s}'")))
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "CAMERA",
            Self::Sound => "SOUND",
            Self::Lighting => "LIGHTING",
            Self::Grip => "GRIP",
            Self::Electric => "ELECTRIC",
            Self::Production => "PRODUCTION",
            Self::Art => "ART",
            Self::Makeup => "MAKEUP",
            Self::Wardrobe => "WARDROBE",
            Self::Vfx => "VFX",
            Self::Other => "OTHER",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
