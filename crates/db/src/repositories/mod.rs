//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads accept any Postgres executor (pool or open transaction); writes take
//! the save transaction so a whole save commits or rolls back together.

pub mod call_sheet_cast_repo;
pub mod call_sheet_crew_repo;
pub mod call_sheet_repo;
pub mod call_sheet_scene_repo;

pub use call_sheet_cast_repo::CallSheetCastRepo;
pub use call_sheet_crew_repo::CallSheetCrewRepo;
pub use call_sheet_repo::CallSheetRepo;
pub use call_sheet_scene_repo::CallSheetSceneRepo;
