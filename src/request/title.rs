use chrono::NaiveDate;
use crate::models::{ReportScope, Target};

/// Title used when the user leaves it blank.
///
/// `"<scope label> - <target name> - YYYY-MM-DD"`, the name part only when the
/// target carries one. Bulk runs get a plural label since the server titles
/// each entity's report itself.
pub fn default_title(scope: ReportScope, target: Option<&Target>, today: NaiveDate) -> String {
    let label = match target {
        Some(t) if t.is_bulk() => "Entity reports",
        _ => scope.label(),
    };

    let mut parts = vec![label.to_string()];
    if let Some(name) = target.and_then(Target::display_name) {
        parts.push(name.to_string());
    }
    parts.push(today.format("%Y-%m-%d").to_string());
    parts.join(" - ")
}
