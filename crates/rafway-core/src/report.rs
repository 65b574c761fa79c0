//! Parent dashboard access.

use serde::Serialize;

use rafway_types::profile::Profile;
use rafway_types::report::ReportData;

/// Message shown to free users who open the dashboard.
pub const LOCKED_MESSAGE: &str = "L'espace parent est exclusif aux membres Premium.";

/// What the dashboard shows for a given profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum ReportView {
    Locked,
    Available(ReportData),
}

/// Premium profiles see the report; everyone else sees the lock screen.
pub fn view_report(profile: &Profile, report: &ReportData) -> ReportView {
    if profile.is_premium {
        ReportView::Available(report.clone())
    } else {
        ReportView::Locked
    }
}
