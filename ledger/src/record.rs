//! # Traceability Records
//!
//! The payload side of the data model: what actually goes inside a block.
//!
//! A [`TraceRecord`] is a schema-validated traceability entry — the fields
//! every coffee entry must carry are typed and required at construction,
//! while unknown fields submitted by callers survive round-trips through
//! the open extension bag. This keeps required fields type-safe without
//! freezing the schema against forward-compatible additions.
//!
//! [`BlockData`] wraps the record with the engine-stamped metadata
//! (`entry_type` tag and submission timestamp) and distinguishes ordinary
//! entries from the genesis sentinel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// TraceRecord
// ---------------------------------------------------------------------------

/// One coffee traceability record as submitted by an authorized inspector.
///
/// The required fields (`coffee_batch`, `origin`, `harvest_date`,
/// `quality_grade`, `weight_kg`) are enforced by the type itself — a
/// caller cannot construct a record without them. Everything else is
/// optional, and fields the schema does not know about are preserved
/// verbatim in [`extra`](TraceRecord::extra).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Unique batch identifier, e.g. `BATCH-2026-001`.
    pub coffee_batch: String,
    /// Farm or region of origin.
    pub origin: String,
    /// Harvest date as an ISO-8601 date string.
    pub harvest_date: String,
    /// Quality grade assigned by the inspector.
    pub quality_grade: String,
    /// Batch weight in kilograms.
    pub weight_kg: u64,
    /// Certifications held by the batch (Organic, Fair Trade, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    /// Processing method (Natural, Washed, Honey, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_method: Option<String>,
    /// Free-form inspector notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Identifier of the submitting inspector, stamped by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_id: Option<String>,
    /// Display name of the submitting inspector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_name: Option<String>,
    /// Open extension bag: fields the schema does not model are kept
    /// here so they round-trip through persistence unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TraceRecord {
    /// Construct a record from the required fields only.
    pub fn new(
        coffee_batch: impl Into<String>,
        origin: impl Into<String>,
        harvest_date: impl Into<String>,
        quality_grade: impl Into<String>,
        weight_kg: u64,
    ) -> Self {
        TraceRecord {
            coffee_batch: coffee_batch.into(),
            origin: origin.into(),
            harvest_date: harvest_date.into(),
            quality_grade: quality_grade.into(),
            weight_kg,
            certifications: Vec::new(),
            processing_method: None,
            notes: None,
            submitter_id: None,
            submitter_name: None,
            extra: Map::new(),
        }
    }

    /// Attach the submitting inspector's identity.
    pub fn with_submitter(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.submitter_id = Some(id.into());
        self.submitter_name = Some(name.into());
        self
    }

    /// Attach certifications.
    pub fn with_certifications(mut self, certifications: Vec<String>) -> Self {
        self.certifications = certifications;
        self
    }

    /// Attach a processing method.
    pub fn with_processing_method(mut self, method: impl Into<String>) -> Self {
        self.processing_method = Some(method.into());
        self
    }

    /// Attach free-form notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach an extension field outside the known schema.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// BlockData
// ---------------------------------------------------------------------------

/// An entry as committed to the chain: the record plus engine stamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    /// The inspector-submitted traceability record.
    #[serde(flatten)]
    pub record: TraceRecord,
    /// RFC3339 submission timestamp, stamped by the ledger on append.
    pub entry_timestamp: String,
}

/// Payload of a block: either the genesis sentinel or a coffee entry.
///
/// Serialized with an internal `entry_type` tag, so on disk an entry
/// block's `data` reads as `{ "entry_type": "coffee_entry", ... }` and
/// the genesis block as `{ "entry_type": "genesis", "message": ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry_type", rename_all = "snake_case")]
pub enum BlockData {
    /// Fixed sentinel payload of block 0.
    Genesis {
        /// Human-readable genesis message.
        message: String,
    },
    /// An ordinary traceability entry.
    CoffeeEntry(EntryData),
}

impl BlockData {
    /// Return the entry data, or `None` for the genesis sentinel.
    pub fn as_entry(&self) -> Option<&EntryData> {
        match self {
            BlockData::CoffeeEntry(entry) => Some(entry),
            BlockData::Genesis { .. } => None,
        }
    }

    /// True for the genesis sentinel payload.
    pub fn is_genesis(&self) -> bool {
        matches!(self, BlockData::Genesis { .. })
    }
}
