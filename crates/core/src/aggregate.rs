//! The call sheet aggregate and its local editing operations.
//!
//! [`CallSheetData`] is the in-memory unit the editor works on: the call sheet
//! header plus its scenes, cast and crew. All mutation helpers here are
//! synchronous and pure; persisting the result is the job of
//! [`crate::editor::CallSheetEditor`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::call_sheet::{CallSheetStatus, Department, SceneStatus};
use crate::error::CoreError;
use crate::row_key::RowKey;
use crate::types::{DbId, Timestamp, Version, INITIAL_VERSION};

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// A name + phone pair for one of the key production contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Scalar fields of a call sheet, everything except identity and lifecycle.
///
/// Absent fields deserialize to their defaults so partially-populated records
/// still produce a complete header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallSheetHeader {
    pub production_title: String,
    pub production_company: Option<String>,
    pub shoot_day_number: i32,
    pub total_shoot_days: Option<i32>,
    pub shoot_date: Option<NaiveDate>,
    pub crew_call_time: Option<String>,
    pub wrap_time: Option<String>,
    pub timezone: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub director: Contact,
    pub producer: Contact,
    pub first_ad: Contact,
    pub production_manager: Contact,
    pub weather_summary: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub temperature_high: Option<String>,
    pub temperature_low: Option<String>,
    pub general_notes: Option<String>,
    pub safety_notes: Option<String>,
    pub parking_notes: Option<String>,
    pub catering_notes: Option<String>,
}

impl Default for CallSheetHeader {
    fn default() -> Self {
        Self {
            production_title: String::new(),
            production_company: None,
            shoot_day_number: 1,
            total_shoot_days: None,
            shoot_date: None,
            crew_call_time: None,
            wrap_time: None,
            timezone: None,
            location_name: None,
            location_address: None,
            director: Contact::default(),
            producer: Contact::default(),
            first_ad: Contact::default(),
            production_manager: Contact::default(),
            weather_summary: None,
            sunrise: None,
            sunset: None,
            temperature_high: None,
            temperature_low: None,
            general_notes: None,
            safety_notes: None,
            parking_notes: None,
            catering_notes: None,
        }
    }
}

/// A persisted call sheet row, without children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSheetRecord {
    pub id: DbId,
    pub organization_id: DbId,
    pub project_id: DbId,
    #[serde(flatten)]
    pub header: CallSheetHeader,
    pub status: CallSheetStatus,
    pub version: Version,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Child rows
// ---------------------------------------------------------------------------

/// A scene slated for the shoot day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRow {
    pub key: RowKey,
    pub scene_number: String,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Script pages, usually in eighths (e.g. `1.375` = 1 3/8).
    pub page_count: f64,
    pub estimated_minutes: Option<i32>,
    pub scheduled_time: Option<String>,
    pub status: SceneStatus,
    pub notes: Option<String>,
    pub sort_order: i32,
}

impl Default for SceneRow {
    fn default() -> Self {
        Self {
            key: RowKey::new_draft(),
            scene_number: String::new(),
            heading: None,
            description: None,
            location: None,
            page_count: 0.0,
            estimated_minutes: None,
            scheduled_time: None,
            status: SceneStatus::default(),
            notes: None,
            sort_order: 0,
        }
    }
}

/// One actor's call-time details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastRow {
    pub key: RowKey,
    pub actor_name: String,
    pub character_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub makeup_call: Option<String>,
    pub wardrobe_call: Option<String>,
    pub on_set_call: Option<String>,
    pub pickup_location: Option<String>,
    pub pickup_time: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

impl Default for CastRow {
    fn default() -> Self {
        Self {
            key: RowKey::new_draft(),
            actor_name: String::new(),
            character_name: None,
            phone: None,
            email: None,
            makeup_call: None,
            wardrobe_call: None,
            on_set_call: None,
            pickup_location: None,
            pickup_time: None,
            notes: None,
            sort_order: 0,
        }
    }
}

/// One crew member's assignment for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewRow {
    pub key: RowKey,
    pub name: String,
    pub role: Option<String>,
    pub department: Department,
    pub phone: Option<String>,
    pub call_time: Option<String>,
    pub radio_channel: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

impl Default for CrewRow {
    fn default() -> Self {
        Self {
            key: RowKey::new_draft(),
            name: String::new(),
            role: None,
            department: Department::default(),
            phone: None,
            call_time: None,
            radio_channel: None,
            notes: None,
            sort_order: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Partial update for a [`SceneRow`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenePatch {
    pub scene_number: Option<String>,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub page_count: Option<f64>,
    pub estimated_minutes: Option<i32>,
    pub scheduled_time: Option<String>,
    pub status: Option<SceneStatus>,
    pub notes: Option<String>,
}

/// Partial update for a [`CastRow`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastPatch {
    pub actor_name: Option<String>,
    pub character_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub makeup_call: Option<String>,
    pub wardrobe_call: Option<String>,
    pub on_set_call: Option<String>,
    pub pickup_location: Option<String>,
    pub pickup_time: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for a [`CrewRow`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub department: Option<Department>,
    pub phone: Option<String>,
    pub call_time: Option<String>,
    pub radio_channel: Option<String>,
    pub notes: Option<String>,
}

/// Assign `Some` patch values onto the target; plain fields are replaced,
/// optional fields become `Some`.
macro_rules! apply_fields {
    ($target:expr, $patch:expr; plain: [$($plain:ident),*]; optional: [$($opt:ident),*]) => {
        $( if let Some(v) = $patch.$plain { $target.$plain = v; } )*
        $( if let Some(v) = $patch.$opt { $target.$opt = Some(v); } )*
    };
}

// ---------------------------------------------------------------------------
// ChildRow
// ---------------------------------------------------------------------------

/// Common behaviour of the three child collections.
pub trait ChildRow: Clone + PartialEq {
    /// Collection name used in errors and logs.
    const COLLECTION: &'static str;

    type Patch;

    fn key(&self) -> RowKey;
    fn set_key(&mut self, key: RowKey);
    fn sort_order(&self) -> i32;
    fn set_sort_order(&mut self, sort_order: i32);
    fn apply_patch(&mut self, patch: Self::Patch);
}

impl ChildRow for SceneRow {
    const COLLECTION: &'static str = "scenes";
    type Patch = ScenePatch;

    fn key(&self) -> RowKey {
        self.key
    }
    fn set_key(&mut self, key: RowKey) {
        self.key = key;
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
    fn apply_patch(&mut self, patch: ScenePatch) {
        apply_fields!(self, patch;
            plain: [scene_number, page_count, status];
            optional: [heading, description, location, estimated_minutes, scheduled_time, notes]);
    }
}

impl ChildRow for CastRow {
    const COLLECTION: &'static str = "cast";
    type Patch = CastPatch;

    fn key(&self) -> RowKey {
        self.key
    }
    fn set_key(&mut self, key: RowKey) {
        self.key = key;
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
    fn apply_patch(&mut self, patch: CastPatch) {
        apply_fields!(self, patch;
            plain: [actor_name];
            optional: [character_name, phone, email, makeup_call, wardrobe_call,
                       on_set_call, pickup_location, pickup_time, notes]);
    }
}

impl ChildRow for CrewRow {
    const COLLECTION: &'static str = "crew";
    type Patch = CrewPatch;

    fn key(&self) -> RowKey {
        self.key
    }
    fn set_key(&mut self, key: RowKey) {
        self.key = key;
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
    fn apply_patch(&mut self, patch: CrewPatch) {
        apply_fields!(self, patch;
            plain: [name, department];
            optional: [role, phone, call_time, radio_channel, notes]);
    }
}

// -- generic collection helpers ---------------------------------------------

fn check_index<R: ChildRow>(rows: &[R], index: usize) -> Result<(), CoreError> {
    if index < rows.len() {
        Ok(())
    } else {
        Err(CoreError::IndexOutOfRange {
            collection: R::COLLECTION,
            index,
            len: rows.len(),
        })
    }
}

fn push_blank<R: ChildRow + Default>(rows: &mut Vec<R>) -> usize {
    let mut row = R::default();
    row.set_key(RowKey::new_draft());
    row.set_sort_order(rows.len() as i32);
    rows.push(row);
    rows.len() - 1
}

fn patch_at<R: ChildRow>(rows: &mut [R], index: usize, patch: R::Patch) -> Result<(), CoreError> {
    check_index(rows, index)?;
    rows[index].apply_patch(patch);
    Ok(())
}

fn remove_at<R: ChildRow>(rows: &mut Vec<R>, index: usize) -> Result<R, CoreError> {
    check_index(rows, index)?;
    Ok(rows.remove(index))
}

fn move_within<R: ChildRow>(rows: &mut Vec<R>, from: usize, to: usize) -> Result<(), CoreError> {
    check_index(rows, from)?;
    check_index(rows, to)?;
    let row = rows.remove(from);
    rows.insert(to, row);
    Ok(())
}

/// Assign `sort_order = index` to every row.
pub fn renumber<R: ChildRow>(rows: &mut [R]) {
    for (i, row) in rows.iter_mut().enumerate() {
        row.set_sort_order(i as i32);
    }
}

/// Stable sort by `sort_order` ascending; ties keep their fetched order.
pub fn sort_by_order<R: ChildRow>(rows: &mut [R]) {
    rows.sort_by_key(|r| r.sort_order());
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// A call sheet with its scenes, cast and crew, as held by an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSheetData {
    /// `None` until the call sheet has been created in the store.
    pub id: Option<DbId>,
    pub organization_id: Option<DbId>,
    pub project_id: DbId,
    #[serde(flatten)]
    pub header: CallSheetHeader,
    pub status: CallSheetStatus,
    pub version: Version,
    pub published_at: Option<Timestamp>,
    pub scenes: Vec<SceneRow>,
    pub cast: Vec<CastRow>,
    pub crew: Vec<CrewRow>,
}

impl CallSheetData {
    /// A new, unsaved call sheet in `DRAFT` with no children.
    pub fn new_draft(project_id: DbId, header: CallSheetHeader) -> Self {
        Self {
            id: None,
            organization_id: None,
            project_id,
            header,
            status: CallSheetStatus::Draft,
            version: INITIAL_VERSION,
            published_at: None,
            scenes: Vec::new(),
            cast: Vec::new(),
            crew: Vec::new(),
        }
    }

    /// Build the aggregate from a persisted record and its children,
    /// ordering each collection by `sort_order`.
    pub fn from_parts(
        record: CallSheetRecord,
        mut scenes: Vec<SceneRow>,
        mut cast: Vec<CastRow>,
        mut crew: Vec<CrewRow>,
    ) -> Self {
        sort_by_order(&mut scenes);
        sort_by_order(&mut cast);
        sort_by_order(&mut crew);
        Self {
            id: Some(record.id),
            organization_id: Some(record.organization_id),
            project_id: record.project_id,
            header: record.header,
            status: record.status,
            version: record.version,
            published_at: record.published_at,
            scenes,
            cast,
            crew,
        }
    }

    // -- scenes --------------------------------------------------------------

    /// Append a blank scene and return its index.
    pub fn add_scene(&mut self) -> usize {
        push_blank(&mut self.scenes)
    }

    pub fn update_scene(&mut self, index: usize, patch: ScenePatch) -> Result<(), CoreError> {
        patch_at(&mut self.scenes, index, patch)
    }

    pub fn remove_scene(&mut self, index: usize) -> Result<SceneRow, CoreError> {
        remove_at(&mut self.scenes, index)
    }

    pub fn move_scene(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        move_within(&mut self.scenes, from, to)
    }

    // -- cast ----------------------------------------------------------------

    /// Append a blank cast member and return its index.
    pub fn add_cast(&mut self) -> usize {
        push_blank(&mut self.cast)
    }

    pub fn update_cast(&mut self, index: usize, patch: CastPatch) -> Result<(), CoreError> {
        patch_at(&mut self.cast, index, patch)
    }

    pub fn remove_cast(&mut self, index: usize) -> Result<CastRow, CoreError> {
        remove_at(&mut self.cast, index)
    }

    pub fn move_cast(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        move_within(&mut self.cast, from, to)
    }

    // -- crew ----------------------------------------------------------------

    /// Append a blank crew member and return its index.
    pub fn add_crew(&mut self) -> usize {
        push_blank(&mut self.crew)
    }

    pub fn update_crew(&mut self, index: usize, patch: CrewPatch) -> Result<(), CoreError> {
        patch_at(&mut self.crew, index, patch)
    }

    pub fn remove_crew(&mut self, index: usize) -> Result<CrewRow, CoreError> {
        remove_at(&mut self.crew, index)
    }

    pub fn move_crew(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        move_within(&mut self.crew, from, to)
    }

    /// Make `sort_order` dense and zero-based in all three collections.
    pub fn renumber(&mut self) {
        renumber(&mut self.scenes);
        renumber(&mut self.cast);
        renumber(&mut self.crew);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
