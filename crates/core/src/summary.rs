//! Derived statistics for a call sheet (page totals, completion, headcounts).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::CallSheetData;
use crate::call_sheet::{Department, SceneStatus};

/// Script pages are counted in eighths.
pub const EIGHTHS_PER_PAGE: i64 = 8;

/// At-a-glance numbers for one shoot day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSheetSummary {
    pub scene_count: usize,
    pub scenes_by_status: BTreeMap<SceneStatus, usize>,
    pub total_pages: f64,
    /// Page total in the "N M/8" notation used on printed call sheets.
    pub total_pages_display: String,
    pub estimated_minutes: i64,
    /// Completed scenes as a share of scenes still on the day (excludes
    /// cancelled and moved), rounded to one decimal.
    pub completion_percent: f64,
    pub cast_count: usize,
    pub crew_count: usize,
    pub crew_by_department: BTreeMap<Department, usize>,
}

impl CallSheetSummary {
    pub fn from_data(data: &CallSheetData) -> Self {
        let mut scenes_by_status = BTreeMap::new();
        for scene in &data.scenes {
            *scenes_by_status.entry(scene.status).or_insert(0) += 1;
        }

        let mut crew_by_department = BTreeMap::new();
        for member in &data.crew {
            *crew_by_department.entry(member.department).or_insert(0) += 1;
        }

        let total_pages: f64 = data.scenes.iter().map(|s| s.page_count).sum();
        let estimated_minutes = data
            .scenes
            .iter()
            .filter_map(|s| s.estimated_minutes)
            .map(i64::from)
            .sum();

        let count = |status| scenes_by_status.get(&status).copied().unwrap_or(0);
        let completed = count(SceneStatus::Completed);
        let on_the_day = completed + count(SceneStatus::Scheduled);

        Self {
            scene_count: data.scenes.len(),
            total_pages,
            total_pages_display: format_page_count(total_pages),
            estimated_minutes,
            completion_percent: percent(completed, on_the_day),
            cast_count: data.cast.len(),
            crew_count: data.crew.len(),
            scenes_by_status,
            crew_by_department,
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 * 100.0 / whole as f64;
    (raw * 10.0).round() / 10.0
}

/// Format a page count in eighths, e.g. `1.375` -> `"1 3/8"`, `0.25` -> `"2/8"`.
///
/// Values are rounded to the nearest eighth; negatives clamp to zero.
pub fn format_page_count(pages: f64) -> String {
    let eighths = (pages.max(0.0) * EIGHTHS_PER_PAGE as f64).round() as i64;
    let whole = eighths / EIGHTHS_PER_PAGE;
    let rest = eighths % EIGHTHS_PER_PAGE;
    match (whole, rest) {
        (0, 0) => "0".to_string(),
        (0, r) => format!("{r}/8"),
        (w, 0) => w.to_string(),
        (w, r) => format!("{w} {r}/8"),
    }
}
