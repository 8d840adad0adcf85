//! Rows of `call_sheets`, `call_sheet_scenes`, `call_sheet_cast` and
//! `call_sheet_crew`.

use chrono::NaiveDate;
use serde::Serialize;
use slate_core::aggregate::{CallSheetHeader, CallSheetRecord, CastRow, Contact, CrewRow, SceneRow};
use slate_core::call_sheet::{CallSheetStatus, Department, SceneStatus};
use slate_core::error::CoreError;
use slate_core::row_key::RowKey;
use slate_core::types::{DbId, Timestamp, Version};
use sqlx::FromRow;

/// A row from the `call_sheets` table.
///
/// Contacts are stored as flat `<role>_name` / `<role>_phone` column pairs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallSheet {
    pub id: DbId,
    pub organization_id: DbId,
    pub project_id: DbId,
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
    pub director_name: Option<String>,
    pub director_phone: Option<String>,
    pub producer_name: Option<String>,
    pub producer_phone: Option<String>,
    pub first_ad_name: Option<String>,
    pub first_ad_phone: Option<String>,
    pub production_manager_name: Option<String>,
    pub production_manager_phone: Option<String>,
    pub weather_summary: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub temperature_high: Option<String>,
    pub temperature_low: Option<String>,
    pub general_notes: Option<String>,
    pub safety_notes: Option<String>,
    pub parking_notes: Option<String>,
    pub catering_notes: Option<String>,
    pub status: String,
    pub version: Version,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CallSheet {
    pub fn into_record(self) -> Result<CallSheetRecord, CoreError> {
        Ok(CallSheetRecord {
            id: self.id,
            organization_id: self.organization_id,
            project_id: self.project_id,
            status: CallSheetStatus::from_str_db(&self.status)?,
            version: self.version,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            header: CallSheetHeader {
                production_title: self.production_title,
                production_company: self.production_company,
                shoot_day_number: self.shoot_day_number,
                total_shoot_days: self.total_shoot_days,
                shoot_date: self.shoot_date,
                crew_call_time: self.crew_call_time,
                wrap_time: self.wrap_time,
                timezone: self.timezone,
                location_name: self.location_name,
                location_address: self.location_address,
                director: contact(self.director_name, self.director_phone),
                producer: contact(self.producer_name, self.producer_phone),
                first_ad: contact(self.first_ad_name, self.first_ad_phone),
                production_manager: contact(
                    self.production_manager_name,
                    self.production_manager_phone,
                ),
                weather_summary: self.weather_summary,
                sunrise: self.sunrise,
                sunset: self.sunset,
                temperature_high: self.temperature_high,
                temperature_low: self.temperature_low,
                general_notes: self.general_notes,
                safety_notes: self.safety_notes,
                parking_notes: self.parking_notes,
                catering_notes: self.catering_notes,
            },
        })
    }
}

fn contact(name: Option<String>, phone: Option<String>) -> Contact {
    Contact { name, phone }
}

/// A row from the `call_sheet_scenes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallSheetScene {
    pub id: DbId,
    pub call_sheet_id: DbId,
    pub scene_number: String,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub page_count: f64,
    pub estimated_minutes: Option<i32>,
    pub scheduled_time: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CallSheetScene {
    pub fn into_row(self) -> Result<SceneRow, CoreError> {
        Ok(SceneRow {
            key: RowKey::Persisted(self.id),
            scene_number: self.scene_number,
            heading: self.heading,
            description: self.description,
            location: self.location,
            page_count: self.page_count,
            estimated_minutes: self.estimated_minutes,
            scheduled_time: self.scheduled_time,
            status: SceneStatus::from_str_db(&self.status)?,
            notes: self.notes,
            sort_order: self.sort_order,
        })
    }
}

/// A row from the `call_sheet_cast` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallSheetCast {
    pub id: DbId,
    pub call_sheet_id: DbId,
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
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CallSheetCast> for CastRow {
    fn from(row: CallSheetCast) -> Self {
        CastRow {
            key: RowKey::Persisted(row.id),
            actor_name: row.actor_name,
            character_name: row.character_name,
            phone: row.phone,
            email: row.email,
            makeup_call: row.makeup_call,
            wardrobe_call: row.wardrobe_call,
            on_set_call: row.on_set_call,
            pickup_location: row.pickup_location,
            pickup_time: row.pickup_time,
            notes: row.notes,
            sort_order: row.sort_order,
        }
    }
}

/// A row from the `call_sheet_crew` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallSheetCrew {
    pub id: DbId,
    pub call_sheet_id: DbId,
    pub name: String,
    pub role: Option<String>,
    pub department: String,
    pub phone: Option<String>,
    pub call_time: Option<String>,
    pub radio_channel: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CallSheetCrew {
    pub fn into_row(self) -> Result<CrewRow, CoreError> {
        Ok(CrewRow {
            key: RowKey::Persisted(self.id),
            name: self.name,
            role: self.role,
            department: Department::from_str_db(&self.department)?,
            phone: self.phone,
            call_time: self.call_time,
            radio_channel: self.radio_channel,
            notes: self.notes,
            sort_order: self.sort_order,
        })
    }
}
