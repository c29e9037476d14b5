//! # In-Memory Adapter
//!
//! Implements [`ControlLibrary`] and [`RemediationStore`] over insertion-ordered
//! tables guarded by `parking_lot` locks. Locks are never held across an
//! `.await`; every operation is synchronous.
//!
//! Query order is insertion order, which is what "first N in query order"
//! means for the dashboard's capped lists when running on this adapter.
//!
//! Findings and trackers share one lock so a transaction can stage writes to
//! both and publish them together. A transaction holds the write lock for its
//! whole duration: concurrent completions serialize, and the second one sees
//! the first one's committed tracker when it recounts open siblings.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use grc_core::{
    Assessment, AssessmentId, AssessmentResult, AssessmentResultId, AssessmentStatus, Control,
    ControlId, FindingId, Framework, FrameworkId, GrcError, Mapping, MappingId, Requirement,
    RequirementId, TrackerId,
};
use grc_state::{Finding, FindingStatus, RemediationTracker};

use crate::ports::{
    ControlLibrary, MappingRecord, RemediationStore, RemediationTx, RequirementFilter,
    StoreResult,
};
use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Keyed rows
// ---------------------------------------------------------------------------

/// Insertion-ordered keyed rows. Upserting an existing key replaces the row
/// in place and keeps its position.
#[derive(Debug, Clone)]
struct Rows<K, V> {
    rows: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash, V: Clone> Rows<K, V> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn upsert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.rows[pos], value)),
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(value);
                None
            }
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.rows[pos])
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn iter(&self) -> impl Iterator<Item = &V> {
        self.rows.iter()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

impl<K: Copy + Eq + Hash, V: Clone> Default for Rows<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Thread-safe, cloneable keyed table. Clones share the same data.
#[derive(Debug)]
pub struct Table<K, V> {
    data: Arc<RwLock<Rows<K, V>>>,
}

impl<K, V> Clone for Table<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Copy + Eq + Hash, V: Clone> Table<K, V> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Rows::new())),
        }
    }

    /// Insert or replace a record, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().upsert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<V> {
        self.data.read().iter().cloned().collect()
    }

    /// Records matching `pred`, in insertion order.
    pub fn filter(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.data.read().iter().filter(|v| pred(v)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Copy + Eq + Hash, V: Clone> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Remediation tables
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RemediationTables {
    findings: Rows<FindingId, Finding>,
    trackers: Rows<TrackerId, RemediationTracker>,
}

/// Writes staged by a running transaction, layered over the committed tables.
struct MemoryTx<'a> {
    base: &'a RemediationTables,
    findings: Rows<FindingId, Finding>,
    trackers: Rows<TrackerId, RemediationTracker>,
}

impl RemediationTx for MemoryTx<'_> {
    fn find_finding(&self, id: FindingId) -> StoreResult<Option<Finding>> {
        Ok(self
            .findings
            .get(&id)
            .or_else(|| self.base.findings.get(&id))
            .cloned())
    }

    fn save_finding(&mut self, finding: &Finding) -> StoreResult<()> {
        self.findings.upsert(finding.id, finding.clone());
        Ok(())
    }

    fn find_tracker(&self, id: TrackerId) -> StoreResult<Option<RemediationTracker>> {
        Ok(self
            .trackers
            .get(&id)
            .or_else(|| self.base.trackers.get(&id))
            .cloned())
    }

    fn save_tracker(&mut self, tracker: &RemediationTracker) -> StoreResult<()> {
        self.trackers.upsert(tracker.id, tracker.clone());
        Ok(())
    }

    fn count_open_trackers_for_finding(&self, finding_id: FindingId) -> StoreResult<usize> {
        let is_open_sibling =
            |t: &&RemediationTracker| t.finding_id == finding_id && t.is_open();
        let committed = self
            .base
            .trackers
            .iter()
            .filter(|t| !self.trackers.contains(&t.id))
            .filter(is_open_sibling)
            .count();
        let staged = self.trackers.iter().filter(is_open_sibling).count();
        Ok(committed + staged)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process adapter for both collaborator ports.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    frameworks: Table<FrameworkId, Framework>,
    requirements: Table<RequirementId, Requirement>,
    controls: Table<ControlId, Control>,
    mappings: Table<MappingId, Mapping>,
    assessments: Table<AssessmentId, Assessment>,
    assessment_results: Table<AssessmentResultId, AssessmentResult>,
    remediation: Arc<RwLock<RemediationTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, validating record-level constraints.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, GrcError> {
        snapshot.validate()?;
        let store = Self::new();
        for fw in snapshot.frameworks {
            store.insert_framework(fw);
        }
        for req in snapshot.requirements {
            store.insert_requirement(req);
        }
        for control in snapshot.controls {
            store.insert_control(control);
        }
        for mapping in snapshot.mappings {
            store.insert_mapping(mapping);
        }
        for assessment in snapshot.assessments {
            store.insert_assessment(assessment);
        }
        for result in snapshot.assessment_results {
            store.insert_assessment_result(result);
        }
        for finding in snapshot.findings {
            store.insert_finding(finding);
        }
        for tracker in snapshot.trackers {
            store.insert_tracker(tracker);
        }
        tracing::debug!(
            frameworks = store.frameworks.len(),
            requirements = store.requirements.len(),
            controls = store.controls.len(),
            "memory store seeded from snapshot"
        );
        Ok(store)
    }

    /// Export the current contents.
    pub fn snapshot(&self) -> Snapshot {
        let remediation = self.remediation.read();
        Snapshot {
            frameworks: self.frameworks.list(),
            requirements: self.requirements.list(),
            controls: self.controls.list(),
            mappings: self.mappings.list(),
            assessments: self.assessments.list(),
            assessment_results: self.assessment_results.list(),
            findings: remediation.findings.iter().cloned().collect(),
            trackers: remediation.trackers.iter().cloned().collect(),
        }
    }

    pub fn insert_framework(&self, framework: Framework) {
        self.frameworks.insert(framework.id, framework);
    }

    pub fn insert_requirement(&self, requirement: Requirement) {
        self.requirements.insert(requirement.id, requirement);
    }

    pub fn insert_control(&self, control: Control) {
        self.controls.insert(control.id, control);
    }

    pub fn insert_mapping(&self, mapping: Mapping) {
        self.mappings.insert(mapping.id, mapping);
    }

    pub fn insert_assessment(&self, assessment: Assessment) {
        self.assessments.insert(assessment.id, assessment);
    }

    pub fn insert_assessment_result(&self, result: AssessmentResult) {
        self.assessment_results.insert(result.id, result);
    }

    pub fn insert_finding(&self, finding: Finding) {
        self.remediation.write().findings.upsert(finding.id, finding);
    }

    pub fn insert_tracker(&self, tracker: RemediationTracker) {
        self.remediation.write().trackers.upsert(tracker.id, tracker);
    }
}

impl ControlLibrary for MemoryStore {
    fn list_frameworks(&self, ids: Option<&[FrameworkId]>) -> StoreResult<Vec<Framework>> {
        Ok(match ids {
            Some(ids) => self.frameworks.filter(|fw| ids.contains(&fw.id)),
            None => self.frameworks.list(),
        })
    }

    fn list_requirements(
        &self,
        framework_id: FrameworkId,
        filter: Option<&RequirementFilter>,
    ) -> StoreResult<Vec<Requirement>> {
        Ok(self.requirements.filter(|req| {
            req.framework_id == framework_id && filter.map_or(true, |f| f.matches(req))
        }))
    }

    fn list_mappings_for_framework(
        &self,
        framework_id: FrameworkId,
    ) -> StoreResult<Vec<MappingRecord>> {
        let requirement_ids: HashSet<RequirementId> = self
            .requirements
            .filter(|req| req.framework_id == framework_id)
            .into_iter()
            .map(|req| req.id)
            .collect();
        Ok(self
            .mappings
            .filter(|m| requirement_ids.contains(&m.requirement_id))
            .into_iter()
            .map(|mapping| MappingRecord {
                control: self.controls.get(&mapping.control_id),
                mapping,
            })
            .collect())
    }

    fn list_controls_by_ids(&self, ids: &[ControlId]) -> StoreResult<Vec<Control>> {
        Ok(ids.iter().filter_map(|id| self.controls.get(id)).collect())
    }

    fn list_assessments(&self, status_in: &[AssessmentStatus]) -> StoreResult<Vec<Assessment>> {
        Ok(self.assessments.filter(|a| status_in.contains(&a.status)))
    }

    fn list_assessment_results(
        &self,
        assessment_ids: &[AssessmentId],
    ) -> StoreResult<Vec<AssessmentResult>> {
        Ok(self
            .assessment_results
            .filter(|r| assessment_ids.contains(&r.assessment_id)))
    }
}

impl RemediationStore for MemoryStore {
    fn find_finding(&self, id: FindingId) -> StoreResult<Option<Finding>> {
        Ok(self.remediation.read().findings.get(&id).cloned())
    }

    fn list_findings_by_ids(&self, ids: &[FindingId]) -> StoreResult<Vec<Finding>> {
        let tables = self.remediation.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.findings.get(id).cloned())
            .collect())
    }

    fn count_findings_with_status(&self, status: FindingStatus) -> StoreResult<usize> {
        Ok(self
            .remediation
            .read()
            .findings
            .iter()
            .filter(|f| f.status == status)
            .count())
    }

    fn find_tracker(&self, id: TrackerId) -> StoreResult<Option<RemediationTracker>> {
        Ok(self.remediation.read().trackers.get(&id).cloned())
    }

    fn save_tracker(&self, tracker: &RemediationTracker) -> StoreResult<()> {
        self.remediation
            .write()
            .trackers
            .upsert(tracker.id, tracker.clone());
        Ok(())
    }

    fn list_open_trackers(&self) -> StoreResult<Vec<RemediationTracker>> {
        Ok(self
            .remediation
            .read()
            .trackers
            .iter()
            .filter(|t| t.is_open())
            .cloned()
            .collect())
    }

    fn list_trackers_completed_after(
        &self,
        after: NaiveDate,
    ) -> StoreResult<Vec<RemediationTracker>> {
        Ok(self
            .remediation
            .read()
            .trackers
            .iter()
            .filter(|t| t.completion_date.is_some_and(|d| d > after))
            .cloned()
            .collect())
    }

    fn list_trackers_for_finding(
        &self,
        finding_id: FindingId,
    ) -> StoreResult<Vec<RemediationTracker>> {
        Ok(self
            .remediation
            .read()
            .trackers
            .iter()
            .filter(|t| t.finding_id == finding_id)
            .cloned()
            .collect())
    }

    fn transaction<R, F>(&self, work: F) -> StoreResult<R>
    where
        F: FnOnce(&mut dyn RemediationTx) -> StoreResult<R>,
    {
        let mut guard = self.remediation.write();
        let mut tx = MemoryTx {
            base: &*guard,
            findings: Rows::new(),
            trackers: Rows::new(),
        };
        let out = work(&mut tx)?;

        let MemoryTx {
            findings, trackers, ..
        } = tx;
        let (staged_findings, staged_trackers) = (findings.len(), trackers.len());
        for finding in findings.rows {
            guard.findings.upsert(finding.id, finding);
        }
        for tracker in trackers.rows {
            guard.trackers.upsert(tracker.id, tracker);
        }
        tracing::debug!(
            findings = staged_findings,
            trackers = staged_trackers,
            "remediation transaction committed"
        );
        Ok(out)
    }
}
