//! Review checklists and their persisted state.
//!
//! Each component under review has one current checklist at
//! `<review_dir>/<component>_checklist.json`. A checklist starts
//! `pending` and moves exactly once, to `approved` or `rejected`.
//! Starting a new review archives the current file under `history/`.

use crate::archive;
use crate::lock::ComponentLock;
use crate::result::{ProofError, ProofResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Checks every review carries, in display order
pub const STANDARD_CHECKS: [(&str, &str); 6] = [
    ("layout", "Overall layout matches the design"),
    ("colors", "Colors match the design system"),
    ("typography", "Fonts, sizes and weights match the specification"),
    ("spacing", "Margins, padding and gaps match the design"),
    (
        "interactive_states",
        "Hover, focus and active states work correctly",
    ),
    ("responsive", "Component works on mobile, tablet and desktop"),
];

/// Review lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Awaiting a decision
    Pending,
    /// Accepted; the screenshot became the baseline
    Approved,
    /// Sent back with feedback
    Rejected,
}

impl ReviewStatus {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Not yet looked at
    #[default]
    Pending,
    /// Matches the design
    Pass,
    /// Differs from the design
    Fail,
}

impl CheckStatus {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item on a checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    /// What the reviewer verifies
    pub description: String,
    /// Reviewer verdict for this item
    #[serde(default)]
    pub status: CheckStatus,
    /// Free-form reviewer notes
    #[serde(default)]
    pub notes: String,
}

impl CheckItem {
    /// Pending item with a description
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: CheckStatus::Pending,
            notes: String::new(),
        }
    }
}

/// Checks keyed by name, in insertion order.
///
/// Serialized as a JSON object whose key order is the display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checks(Vec<(String, CheckItem)>);

impl Checks {
    /// Insert or replace a check, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, item: CheckItem) {
        let name = name.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = item;
        } else {
            self.0.push((name, item));
        }
    }

    /// Look up a check by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CheckItem> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Mutable lookup
    pub fn get_mut(&mut self, name: &str) -> Option<&mut CheckItem> {
        self.0.iter_mut().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Iterate in display order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckItem)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check names in display order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Whether a check with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Number of checks
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no checks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Checks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, item) in &self.0 {
            map.serialize_entry(name, item)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Checks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChecksVisitor;

        impl<'de> Visitor<'de> for ChecksVisitor {
            type Value = Checks;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of check name to check item")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Checks, A::Error> {
                let mut checks = Checks::default();
                while let Some((name, item)) = access.next_entry::<String, CheckItem>()? {
                    checks.insert(name, item);
                }
                Ok(checks)
            }
        }

        deserializer.deserialize_map(ChecksVisitor)
    }
}

/// Review record for one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewChecklist {
    /// Component under review
    pub component: String,
    /// When the review was opened (RFC 3339)
    pub review_date: String,
    /// Who reviewed it
    #[serde(default)]
    pub reviewer: Option<String>,
    /// Lifecycle state
    pub status: ReviewStatus,
    /// Checks in display order
    pub checks: Checks,
    /// Set on approval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,
    /// Set on rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_date: Option<String>,
    /// Rejection feedback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ReviewChecklist {
    /// Pending checklist with the standard checks plus one per spec entry.
    ///
    /// Spec checks are keyed by attribute name; a name that collides with
    /// a standard check is prefixed with `spec_`.
    #[must_use]
    pub fn new(component: impl Into<String>, spec_checks: &[(String, String)]) -> Self {
        let mut checks = Checks::default();
        for (name, description) in STANDARD_CHECKS {
            checks.insert(name, CheckItem::new(description));
        }
        for (name, value) in spec_checks {
            let key = if checks.contains(name) {
                format!("spec_{name}")
            } else {
                name.clone()
            };
            checks.insert(key, CheckItem::new(format!("Verify {name}: {value}")));
        }

        Self {
            component: component.into(),
            review_date: now(),
            reviewer: None,
            status: ReviewStatus::Pending,
            checks,
            approval_date: None,
            rejection_date: None,
            feedback: None,
        }
    }

    /// Record who is reviewing
    #[must_use]
    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }

    /// Fail unless the review is still pending
    pub fn ensure_pending(&self, action: &str) -> ProofResult<()> {
        if self.status == ReviewStatus::Pending {
            Ok(())
        } else {
            Err(ProofError::InvalidTransition {
                action: action.to_string(),
                status: self.status.to_string(),
            })
        }
    }

    /// Move `pending → approved`
    pub fn approve(&mut self) -> ProofResult<()> {
        self.ensure_pending("approve")?;
        self.status = ReviewStatus::Approved;
        self.approval_date = Some(now());
        Ok(())
    }

    /// Move `pending → rejected`, recording non-empty feedback
    pub fn reject(&mut self, feedback: &str) -> ProofResult<()> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(ProofError::MissingFeedback);
        }
        self.ensure_pending("reject")?;
        self.status = ReviewStatus::Rejected;
        self.rejection_date = Some(now());
        self.feedback = Some(feedback.to_string());
        Ok(())
    }

    /// Set a check's verdict, optionally with notes
    pub fn mark(&mut self, check: &str, status: CheckStatus, notes: Option<&str>) -> ProofResult<()> {
        let item = self
            .checks
            .get_mut(check)
            .ok_or_else(|| ProofError::parse(format!("unknown check {check:?}")))?;
        item.status = status;
        if let Some(notes) = notes {
            item.notes = notes.to_string();
        }
        Ok(())
    }
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Persisted checklists under a review directory
#[derive(Debug, Clone)]
pub struct ChecklistStore {
    dir: PathBuf,
}

impl ChecklistStore {
    /// Store rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Review directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the current checklist for `component`
    #[must_use]
    pub fn path(&self, component: &str) -> PathBuf {
        self.dir.join(format!("{component}_checklist.json"))
    }

    /// Whether a current checklist exists
    #[must_use]
    pub fn exists(&self, component: &str) -> bool {
        self.path(component).is_file()
    }

    /// Load the current checklist
    pub fn load(&self, component: &str) -> ProofResult<ReviewChecklist> {
        let path = self.path(component);
        if !path.is_file() {
            return Err(ProofError::ChecklistNotFound {
                component: component.to_string(),
            });
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the checklist as the component's current one
    pub fn save(&self, checklist: &ReviewChecklist) -> ProofResult<PathBuf> {
        let _lock = ComponentLock::acquire(&self.dir, &checklist.component)?;
        self.write(checklist)
    }

    /// Open a fresh pending review, archiving the current checklist if any
    pub fn start_fresh(
        &self,
        component: &str,
        spec_checks: &[(String, String)],
    ) -> ProofResult<(ReviewChecklist, PathBuf)> {
        let _lock = ComponentLock::acquire(&self.dir, component)?;
        let current = self.path(component);
        if current.is_file() {
            let history = self.history_dir();
            fs::create_dir_all(&history)?;
            let archived =
                archive::next_path(&history, &format!("{component}_checklist."), "json");
            fs::rename(&current, &archived)?;
            tracing::debug!(archived = %archived.display(), "archived previous checklist");
        }

        let checklist = ReviewChecklist::new(component, spec_checks);
        let path = self.write(&checklist)?;
        Ok((checklist, path))
    }

    /// Load, modify and save under the component lock
    pub fn update<F>(&self, component: &str, apply: F) -> ProofResult<ReviewChecklist>
    where
        F: FnOnce(&mut ReviewChecklist) -> ProofResult<()>,
    {
        let _lock = ComponentLock::acquire(&self.dir, component)?;
        let mut checklist = self.load(component)?;
        apply(&mut checklist)?;
        self.write(&checklist)?;
        Ok(checklist)
    }

    /// Archived checklists for `component`, oldest first
    pub fn history(&self, component: &str) -> ProofResult<Vec<ReviewChecklist>> {
        let prefix = format!("{component}_checklist.");
        archive::list(&self.history_dir(), &prefix, "json")?
            .iter()
            .map(|path| {
                let text = fs::read_to_string(path)?;
                Ok(serde_json::from_str(&text)?)
            })
            .collect()
    }

    fn history_dir(&self) -> PathBuf {
        self.dir.join("history")
    }

    fn write(&self, checklist: &ReviewChecklist) -> ProofResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(&checklist.component);
        let staging = self.dir.join(format!(".{}_checklist.tmp", checklist.component));
        fs::write(&staging, serde_json::to_string_pretty(checklist)?)?;
        fs::rename(&staging, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec_checks() -> Vec<(String, String)> {
        vec![
            ("height".to_string(), "48px".to_string()),
            ("background".to_string(), "#004AAD".to_string()),
        ]
    }

    #[test]
    fn test_new_checklist_has_standard_checks_in_order() {
        let checklist = ReviewChecklist::new("inbox", &[]);
        assert_eq!(checklist.status, ReviewStatus::Pending);
        assert_eq!(
            checklist.checks.names(),
            vec![
                "layout",
                "colors",
                "typography",
                "spacing",
                "interactive_states",
                "responsive"
            ]
        );
        assert!(checklist
            .checks
            .iter()
            .all(|(_, item)| item.status == CheckStatus::Pending));
    }

    #[test]
    fn test_spec_checks_are_appended() {
        let checklist = ReviewChecklist::new("button", &spec_checks());
        assert_eq!(checklist.checks.len(), 8);
        assert_eq!(
            checklist.checks.get("height").unwrap().description,
            "Verify height: 48px"
        );
        assert_eq!(checklist.checks.names()[7], "background");
    }

    #[test]
    fn test_spec_check_does_not_replace_standard_check() {
        let checks = vec![("spacing".to_string(), "8px".to_string())];
        let checklist = ReviewChecklist::new("button", &checks);
        assert_eq!(checklist.checks.len(), 7);
        assert_eq!(
            checklist.checks.get("spacing").unwrap().description,
            "Margins, padding and gaps match the design"
        );
        assert_eq!(
            checklist.checks.get("spec_spacing").unwrap().description,
            "Verify spacing: 8px"
        );
    }

    #[test]
    fn test_approve_from_pending() {
        let mut checklist = ReviewChecklist::new("inbox", &[]);
        checklist.approve().unwrap();
        assert_eq!(checklist.status, ReviewStatus::Approved);
        assert!(checklist.approval_date.is_some());
        assert!(checklist.rejection_date.is_none());
    }

    #[test]
    fn test_reject_requires_feedback() {
        let mut checklist = ReviewChecklist::new("inbox", &[]);
        assert!(matches!(
            checklist.reject("   ").unwrap_err(),
            ProofError::MissingFeedback
        ));
        assert_eq!(checklist.status, ReviewStatus::Pending);

        checklist.reject("Spacing is off").unwrap();
        assert_eq!(checklist.status, ReviewStatus::Rejected);
        assert_eq!(checklist.feedback.as_deref(), Some("Spacing is off"));
        assert!(checklist.rejection_date.is_some());
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        let mut approved = ReviewChecklist::new("inbox", &[]);
        approved.approve().unwrap();
        assert!(matches!(
            approved.reject("late").unwrap_err(),
            ProofError::InvalidTransition { .. }
        ));
        assert!(approved.approve().is_err());

        let mut rejected = ReviewChecklist::new("inbox", &[]);
        rejected.reject("no").unwrap();
        assert!(rejected.approve().is_err());
        assert_eq!(rejected.status, ReviewStatus::Rejected);
    }

    #[test]
    fn test_mark_check() {
        let mut checklist = ReviewChecklist::new("inbox", &[]);
        checklist
            .mark("colors", CheckStatus::Pass, Some("brand blue ok"))
            .unwrap();
        let item = checklist.checks.get("colors").unwrap();
        assert_eq!(item.status, CheckStatus::Pass);
        assert_eq!(item.notes, "brand blue ok");

        checklist.mark("layout", CheckStatus::Fail, None).unwrap();
        let item = checklist.checks.get("layout").unwrap();
        assert_eq!(item.status, CheckStatus::Fail);
        assert!(item.notes.is_empty());

        assert!(checklist.mark("nope", CheckStatus::Pass, None).is_err());
    }

    #[test]
    fn test_json_shape() {
        let checklist = ReviewChecklist::new("inbox", &spec_checks()).with_reviewer("dana");
        let json = serde_json::to_value(&checklist).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["reviewer"], "dana");
        assert!(json["checks"].is_object());
        assert_eq!(json["checks"]["layout"]["status"], "pending");
        assert_eq!(json["checks"]["height"]["status"], "pending");
        assert!(json.get("approval_date").is_none());

        let text = serde_json::to_string(&checklist).unwrap();
        let layout = text.find("\"layout\"").unwrap();
        let responsive = text.find("\"responsive\"").unwrap();
        let spec = text.find("\"height\"").unwrap();
        assert!(layout < responsive && responsive < spec);

        let back: ReviewChecklist = serde_json::from_str(&text).unwrap();
        assert_eq!(back, checklist);
    }

    #[test]
    fn test_store_load_missing() {
        let dir = TempDir::new().unwrap();
        let store = ChecklistStore::new(dir.path());
        assert!(matches!(
            store.load("inbox").unwrap_err(),
            ProofError::ChecklistNotFound { .. }
        ));
    }

    #[test]
    fn test_store_update_persists() {
        let dir = TempDir::new().unwrap();
        let store = ChecklistStore::new(dir.path());
        store.start_fresh("inbox", &[]).unwrap();

        store.update("inbox", ReviewChecklist::approve).unwrap();
        let loaded = store.load("inbox").unwrap();
        assert_eq!(loaded.status, ReviewStatus::Approved);
    }

    #[test]
    fn test_failed_update_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = ChecklistStore::new(dir.path());
        store.start_fresh("inbox", &[]).unwrap();

        let err = store.update("inbox", |c| c.reject("")).unwrap_err();
        assert!(matches!(err, ProofError::MissingFeedback));
        assert_eq!(store.load("inbox").unwrap().status, ReviewStatus::Pending);
    }

    #[test]
    fn test_start_fresh_archives_previous_review() {
        let dir = TempDir::new().unwrap();
        let store = ChecklistStore::new(dir.path());
        store.start_fresh("inbox", &[]).unwrap();
        store.update("inbox", |c| c.reject("Wrong blue")).unwrap();

        let (fresh, path) = store.start_fresh("inbox", &[]).unwrap();
        assert_eq!(fresh.status, ReviewStatus::Pending);
        assert_eq!(path, store.path("inbox"));

        let history = store.history("inbox").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ReviewStatus::Rejected);
        assert_eq!(history[0].feedback.as_deref(), Some("Wrong blue"));
    }

    #[test]
    fn test_history_ignores_other_components() {
        let dir = TempDir::new().unwrap();
        let store = ChecklistStore::new(dir.path());
        store.start_fresh("inbox", &[]).unwrap();
        store.start_fresh("inbox", &[]).unwrap();
        store.start_fresh("inbox_header", &[]).unwrap();
        store.start_fresh("inbox_header", &[]).unwrap();
        assert_eq!(store.history("inbox").unwrap().len(), 1);
        assert_eq!(store.history("inbox_header").unwrap().len(), 1);
    }

    #[test]
    fn test_history_keeps_creation_order() {
        let dir = TempDir::new().unwrap();
        let store = ChecklistStore::new(dir.path());
        store.start_fresh("inbox", &[]).unwrap();
        for round in 1..=12 {
            store
                .update("inbox", |c| c.reject(&format!("round {round}")))
                .unwrap();
            store.start_fresh("inbox", &[]).unwrap();
        }

        let feedback: Vec<String> = store
            .history("inbox")
            .unwrap()
            .into_iter()
            .filter_map(|c| c.feedback)
            .collect();
        let expected: Vec<String> = (1..=12).map(|round| format!("round {round}")).collect();
        assert_eq!(feedback, expected);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CheckStatus::Fail).unwrap(), "\"fail\"");
        assert_eq!(
            serde_json::to_string(&ReviewStatus::Approved).unwrap(),
            "\"approved\""
        );
    }
}
