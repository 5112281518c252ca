//! Data model for the exercise collection
//!
//! The collection is an ordered list of exercises, each owning its
//! sessions, each session owning its sets. The whole collection is
//! serialized as one JSON blob; field names stay camelCase so blobs
//! written by earlier app versions keep parsing.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// The full ordered sequence of exercises, the unit of storage.
pub type Collection = Vec<Exercise>;

/// Perceived effort of a single set
///
/// The closed three-level scale is the authoritative representation
/// store-wide. Blobs missing the field default to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "easy" => Ok(Difficulty::Low),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "high" | "hard" => Ok(Difficulty::High),
            other => Err(format!(
                "unknown difficulty '{}' (expected low, medium, or high)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Low => write!(f, "low"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::High => write!(f, "high"),
        }
    }
}

/// One unit of work within a session: a weight/rep pair plus difficulty
///
/// `weight` and `reps` are `None` while not yet entered. A set with both
/// missing is *blank*: a draft placeholder that is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetItem {
    /// Unique set identifier (ULID)
    pub id: String,

    /// Weight in kilograms, `None` until entered
    pub weight: Option<f64>,

    /// Repetition count, `None` until entered
    pub reps: Option<u32>,

    /// Perceived effort marker
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl SetItem {
    /// Create a blank set draft with a fresh id
    pub fn blank() -> Self {
        Self {
            id: new_record_id(),
            weight: None,
            reps: None,
            difficulty: Difficulty::default(),
        }
    }

    /// A set is blank iff both weight and reps are missing
    pub fn is_blank(&self) -> bool {
        self.weight.is_none() && self.reps.is_none()
    }
}

/// One completed, timestamped occurrence of performing an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier (ULID)
    pub id: String,

    /// Save timestamp (RFC-3339)
    pub created_at: String,

    /// Sets in insertion order; never persisted empty
    pub sets: Vec<SetItem>,
}

impl Session {
    /// Create a session from already-filtered, non-blank sets
    pub fn new(sets: Vec<SetItem>) -> Self {
        Self {
            id: new_record_id(),
            created_at: now_rfc3339(),
            sets,
        }
    }
}

/// A named, user-defined activity tracked over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Unique exercise identifier (ULID), immutable
    pub id: String,

    /// User-editable display title, non-empty after trimming
    pub title: String,

    /// Sessions, newest-first
    pub sessions: Vec<Session>,

    /// Creation timestamp (RFC-3339), immutable
    pub created_at: String,
}

impl Exercise {
    /// Create a new exercise with a fresh id, no sessions, and the
    /// current timestamp
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            title: title.into(),
            sessions: Vec::new(),
            created_at: now_rfc3339(),
        }
    }
}

/// Generate a new ULID for an exercise, session, or set
///
/// ULIDs are sortable by timestamp, which keeps ids stable to eyeball
/// in the CLI and cheap to prefix-match.
pub fn new_record_id() -> String {
    Ulid::new().to_string()
}

/// Current UTC time as an RFC-3339 string
///
/// Used for every `createdAt` field so stored timestamps stay
/// comparable and parseable.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
