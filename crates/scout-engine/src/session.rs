use anyhow::{Context, Result};
use scout_contracts::candidates::{Candidate, SearchRequest};
use scout_contracts::events::{payload, EventWriter};
use scout_contracts::filters::{
    Category, FilterCategory, FilterError, FilterState, FilterValue, FlatFilters, ImportReport,
};
use scout_contracts::storage::{Storage, APPLIED_FILTERS_KEY, FILTERS_KEY};
use serde_json::json;
use tracing::{info, warn};

use crate::{emit_or_warn, CandidateSearch};

/// Candidate-search stage. Owns the reconciled filter state seeded from the
/// generator's published filters, and the last successful search result.
pub struct CandidateSession<S: Storage> {
    storage: S,
    events: EventWriter,
    account_number: u32,
    state: FilterState,
    report: ImportReport,
    candidates: Vec<Candidate>,
}

impl<S: Storage> CandidateSession<S> {
    pub fn open(storage: S, events: EventWriter, account_number: u32) -> Result<Self> {
        let mut session = Self {
            storage,
            events,
            account_number,
            state: FilterState::new(),
            report: ImportReport::default(),
            candidates: Vec::new(),
        };
        session.reload()?;
        Ok(session)
    }

    /// Re-imports `filters` from storage, discarding local edits.
    pub fn reload(&mut self) -> Result<&ImportReport> {
        let raw = self
            .storage
            .get(FILTERS_KEY)
            .context("failed to read published filters")?;
        let flat = match raw.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                Some(FlatFilters::from_json(raw).context("published filters are not valid JSON")?)
            }
            _ => None,
        };
        let (state, report) = FilterState::import(flat.as_ref());
        let applied: Vec<&str> = report.applied.iter().map(Category::as_str).collect();
        info!(
            applied = applied.len(),
            ignored = report.ignored.len(),
            "filters imported"
        );
        self.events.emit(
            "filters_imported",
            payload(json!({
                "applied": applied,
                "ignored": report.ignored,
            })),
        )?;
        self.state = state;
        self.report = report;
        Ok(&self.report)
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn import_report(&self) -> &ImportReport {
        &self.report
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn events(&self) -> &EventWriter {
        &self.events
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn toggle_picker(&mut self) -> bool {
        let open = self.state.toggle_picker();
        emit_or_warn(
            &self.events,
            "picker_toggled",
            payload(json!({ "open": open })),
        );
        open
    }

    pub fn add_category(&mut self, category: Category) -> Result<(), FilterError> {
        self.state.add_category(category)?;
        emit_or_warn(
            &self.events,
            "category_added",
            payload(json!({ "category": category.as_str() })),
        );
        Ok(())
    }

    pub fn update_values(
        &mut self,
        category: Category,
        values: Vec<FilterValue>,
    ) -> Result<(), FilterError> {
        let count = values.len();
        self.state.update_values(category, values)?;
        emit_or_warn(
            &self.events,
            "values_updated",
            payload(json!({ "category": category.as_str(), "values": count })),
        );
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state.reset();
        emit_or_warn(&self.events, "filters_reset", payload(json!({})));
    }

    pub fn export(&self) -> Vec<FilterCategory> {
        self.state.export()
    }

    /// Runs one search with the current export. On failure the previous
    /// candidate list is kept. A search is not started unless its
    /// `search_started` event was recorded.
    pub fn apply(&mut self, search: &dyn CandidateSearch) -> Result<&[Candidate]> {
        let filters = self.state.export();
        let snapshot = serde_json::to_string(&filters)?;
        self.storage
            .set(APPLIED_FILTERS_KEY, &snapshot)
            .context("failed to store applied filters")?;

        let request = SearchRequest {
            account_number: self.account_number,
            page: 1,
            filters,
        };
        self.events.emit(
            "search_started",
            payload(json!({
                "provider": search.name(),
                "filters": request.filters,
            })),
        )?;

        match search.search(&request) {
            Ok(candidates) => {
                info!(
                    provider = search.name(),
                    count = candidates.len(),
                    "search completed"
                );
                emit_or_warn(
                    &self.events,
                    "search_completed",
                    payload(json!({
                        "provider": search.name(),
                        "candidates": candidates.len(),
                    })),
                );
                self.candidates = candidates;
                Ok(&self.candidates)
            }
            Err(err) => {
                warn!(provider = search.name(), "candidate search failed: {err:#}");
                emit_or_warn(
                    &self.events,
                    "search_failed",
                    payload(json!({
                        "provider": search.name(),
                        "error": format!("{err:#}"),
                    })),
                );
                Err(err.context(format!("candidate search via {} failed", search.name())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use scout_contracts::candidates::{Candidate, SearchRequest};
    use scout_contracts::events::EventWriter;
    use scout_contracts::filters::{Category, FilterError, FilterValue};
    use scout_contracts::storage::{MemoryStorage, Storage, APPLIED_FILTERS_KEY, FILTERS_KEY};
    use serde_json::Value;

    use super::CandidateSession;
    use crate::{CandidateSearch, DryrunSearch};

    struct Offline;

    impl CandidateSearch for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn search(&self, _request: &SearchRequest) -> Result<Vec<Candidate>> {
            bail!("RapidAPI request failed (429): quota exceeded")
        }
    }

    fn open(filters: Option<&str>) -> Result<CandidateSession<MemoryStorage>> {
        let mut storage = MemoryStorage::new();
        if let Some(filters) = filters {
            storage = storage.with_entry(FILTERS_KEY, filters);
        }
        CandidateSession::open(storage, EventWriter::disabled(), 1)
    }

    #[test]
    fn open_without_published_filters_starts_empty() -> Result<()> {
        let session = open(None)?;
        assert!(session.state().applied().is_empty());
        assert_eq!(session.state().available(), Category::ALL.as_slice());
        assert!(session.candidates().is_empty());
        Ok(())
    }

    #[test]
    fn open_imports_published_filters() -> Result<()> {
        let session = open(Some(
            r#"{"job_role": "Data Engineer", "job_location": "Remote", "positions": "2"}"#,
        ))?;
        assert_eq!(
            session.state().values(Category::JobTitles),
            Some(vec![FilterValue::included("Data Engineer")].as_slice())
        );
        assert!(session.state().is_applied(Category::Locations));
        assert_eq!(session.import_report().ignored, vec!["positions"]);
        Ok(())
    }

    #[test]
    fn open_rejects_malformed_filters() {
        assert!(open(Some("{not json")).is_err());
    }

    #[test]
    fn apply_stores_snapshot_and_replaces_candidates() -> Result<()> {
        let mut session = open(Some(r#"{"Job Titles": ["Engineer"], "Companies": []}"#))?;
        let found = session.apply(&DryrunSearch)?.len();
        assert_eq!(found, 2);
        assert_eq!(session.candidates(), DryrunSearch::sample_candidates().as_slice());

        let snapshot = session
            .storage_mut()
            .get(APPLIED_FILTERS_KEY)?
            .unwrap_or_default();
        let snapshot: Value = serde_json::from_str(&snapshot)?;
        let entries = snapshot.as_array().cloned().unwrap_or_default();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["type"], "Job Titles");
        assert_eq!(entries[0]["selectedSubFilter"], 50);
        Ok(())
    }

    #[test]
    fn failed_search_keeps_previous_candidates() -> Result<()> {
        let mut session = open(None)?;
        session.apply(&DryrunSearch)?;
        let err = session.apply(&Offline).unwrap_err();
        assert!(format!("{err:#}").contains("quota exceeded"));
        assert_eq!(session.candidates().len(), 2);
        Ok(())
    }

    #[test]
    fn mutations_follow_reconciler_rules() -> Result<()> {
        let mut session = open(None)?;
        assert!(session.toggle_picker());
        session.add_category(Category::Years)?;
        assert!(!session.state().picker_open());
        assert_eq!(
            session.add_category(Category::Years),
            Err(FilterError::CategoryUnavailable(Category::Years))
        );
        session.update_values(Category::Years, vec![FilterValue::included("5")])?;
        assert_eq!(session.export().len(), 1);
        session.reset();
        assert!(session.export().is_empty());
        assert_eq!(session.state().available(), Category::ALL.as_slice());
        Ok(())
    }

    #[test]
    fn reload_discards_local_edits() -> Result<()> {
        let mut session = open(Some(r#"{"Years": "3"}"#))?;
        session.add_category(Category::Companies)?;
        session
            .storage_mut()
            .set(FILTERS_KEY, r#"{"Locations": ["Berlin"]}"#)?;
        session.reload()?;
        assert!(!session.state().is_applied(Category::Companies));
        assert!(!session.state().is_applied(Category::Years));
        assert!(session.state().is_applied(Category::Locations));
        Ok(())
    }

    #[test]
    fn session_events_are_logged() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let mut session = CandidateSession::open(
            MemoryStorage::new(),
            EventWriter::new(&events_path, "session-7"),
            1,
        )?;
        session.add_category(Category::Companies)?;
        session.update_values(Category::Companies, vec![FilterValue::excluded("Initech")])?;
        session.apply(&DryrunSearch)?;
        let _ = session.apply(&Offline);

        let raw = std::fs::read_to_string(events_path)?;
        let rows: Vec<Value> = raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .collect();
        let types: Vec<&str> = rows
            .iter()
            .filter_map(|row| row.get("type").and_then(Value::as_str))
            .collect();
        assert_eq!(
            types,
            vec![
                "filters_imported",
                "category_added",
                "values_updated",
                "search_started",
                "search_completed",
                "search_started",
                "search_failed",
            ]
        );
        assert!(rows.iter().all(|row| row["session_id"] == "session-7"));
        assert_eq!(
            rows[3]["filters"][0]["values"][0]["selectionType"],
            "EXCLUDED"
        );
        Ok(())
    }

    #[test]
    fn unwritable_event_log_fails_open() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let result = CandidateSession::open(
            MemoryStorage::new(),
            EventWriter::new(temp.path(), "session-1"),
            1,
        );
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn event_log_lost_mid_session() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let mut session = CandidateSession::open(
            MemoryStorage::new(),
            EventWriter::new(&events_path, "session-1"),
            1,
        )?;
        session.apply(&DryrunSearch)?;
        std::fs::remove_file(&events_path)?;
        std::fs::create_dir(&events_path)?;

        session.add_category(Category::Companies)?;
        assert!(session.state().is_applied(Category::Companies));
        session.update_values(Category::Companies, vec![FilterValue::included("Acme")])?;

        assert!(session.apply(&DryrunSearch).is_err());
        assert_eq!(session.candidates().len(), 2);
        Ok(())
    }
}
