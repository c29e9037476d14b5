//! End-to-end scoring scenarios over the in-memory store.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use grc_core::{
    Assessment, AssessmentId, AssessmentStatus, Clock, Control, ControlId, CoverageLevel,
    FixedClock, Framework, FrameworkId, GrcError, ImplementationStatus, Mapping, MappingId,
    Priority, Requirement, RequirementId,
};
use grc_scoring::{
    ComplianceStatus, GapAnalysisQuery, GapAnalyzer, GapSeverity, ScorecardAggregator,
};
use grc_store::{
    framework_view, ControlLibrary, MappingRecord, MemoryStore, RequirementFilter, StoreResult,
};

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 6, 15, 9, 0, 0).unwrap()))
}

struct Library {
    store: MemoryStore,
}

impl Library {
    fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    fn framework(&self, name: &str) -> Framework {
        let fw = Framework {
            id: FrameworkId::new(),
            name: name.into(),
            code: name.replace(' ', "").to_uppercase(),
        };
        self.store.insert_framework(fw.clone());
        fw
    }

    fn requirement(&self, fw: &Framework, priority: Option<Priority>) -> Requirement {
        let req = Requirement {
            id: RequirementId::new(),
            framework_id: fw.id,
            identifier: format!("REQ-{}", self.store.list_requirements(fw.id, None).unwrap().len() + 1),
            text: "The organization shall ...".into(),
            domain: Some("Access Control".into()),
            category: Some("Technical".into()),
            priority,
        };
        self.store.insert_requirement(req.clone());
        req
    }

    fn control(&self, status: ImplementationStatus) -> Control {
        let c = Control {
            id: ControlId::new(),
            identifier: "CTL".into(),
            implementation_status: status,
            domain: None,
            updated_at: None,
        };
        self.store.insert_control(c.clone());
        c
    }

    fn map(&self, req: &Requirement, control_id: ControlId, level: CoverageLevel) {
        self.store.insert_mapping(Mapping {
            id: MappingId::new(),
            requirement_id: req.id,
            control_id,
            coverage_level: level,
        });
    }
}

fn resolve(lib: &Library, fw: &Framework, req: &Requirement) -> ComplianceStatus {
    let view = framework_view(&lib.store, fw.clone()).unwrap();
    let entry = view
        .requirements
        .iter()
        .find(|r| r.requirement.id == req.id)
        .unwrap();
    grc_scoring::resolve_requirement(&entry.mappings)
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[test]
fn scenario_full_implemented_with_partial_unimplemented_is_met() {
    let lib = Library::new();
    let fw = lib.framework("ISO 27001");
    let r1 = lib.requirement(&fw, None);
    let implemented = lib.control(ImplementationStatus::Implemented);
    let missing = lib.control(ImplementationStatus::NotImplemented);
    lib.map(&r1, implemented.id, CoverageLevel::Full);
    lib.map(&r1, missing.id, CoverageLevel::Partial);

    assert_eq!(resolve(&lib, &fw, &r1), ComplianceStatus::Met);
}

#[test]
fn scenario_partial_in_progress_is_partially_met() {
    let lib = Library::new();
    let fw = lib.framework("ISO 27001");
    let r2 = lib.requirement(&fw, None);
    let c = lib.control(ImplementationStatus::InProgress);
    lib.map(&r2, c.id, CoverageLevel::Partial);

    assert_eq!(resolve(&lib, &fw, &r2), ComplianceStatus::PartiallyMet);
}

#[test]
fn deleted_control_is_excluded_not_fatal() {
    let lib = Library::new();
    let fw = lib.framework("ISO 27001");
    let req = lib.requirement(&fw, None);
    lib.map(&req, ControlId::new(), CoverageLevel::Full);

    assert_eq!(resolve(&lib, &fw, &req), ComplianceStatus::NotMet);
}

// ---------------------------------------------------------------------------
// Scorecard
// ---------------------------------------------------------------------------

#[test]
fn scenario_six_met_one_na_three_not_met_is_seventy_percent() {
    let lib = Library::new();
    let fw = lib.framework("SOC 2");
    for _ in 0..6 {
        let req = lib.requirement(&fw, Some(Priority::Medium));
        let c = lib.control(ImplementationStatus::Implemented);
        lib.map(&req, c.id, CoverageLevel::Full);
    }
    let na = lib.requirement(&fw, None);
    let c = lib.control(ImplementationStatus::NotImplemented);
    lib.map(&na, c.id, CoverageLevel::NotApplicable);
    for priority in [Some(Priority::Critical), Some(Priority::High), None] {
        lib.requirement(&fw, priority);
    }

    let aggregator = ScorecardAggregator::new(Arc::new(lib.store.clone()), clock());
    let scorecard = aggregator.generate(None).unwrap();

    assert_eq!(scorecard.frameworks.len(), 1);
    let card = &scorecard.frameworks[0];
    assert_eq!(card.total_requirements, 10);
    assert_eq!(card.met_requirements, 6);
    assert_eq!(card.not_applicable_requirements, 1);
    assert_eq!(card.not_met_requirements, 3);
    assert_eq!(card.overall_compliance, 70);
    assert_eq!((card.gaps.critical, card.gaps.high, card.gaps.low), (1, 1, 1));
    assert_eq!(scorecard.summary.average_compliance, 70);
    assert_eq!(scorecard.overall_compliance, 70.0);
}

#[test]
fn scorecard_links_assessments_by_selected_framework() {
    let lib = Library::new();
    let fw = lib.framework("PCI DSS");
    let other = lib.framework("HIPAA");
    let req = lib.requirement(&fw, None);
    lib.requirement(&other, None);
    let c = lib.control(ImplementationStatus::Implemented);
    lib.map(&req, c.id, CoverageLevel::Full);
    for (status, selected) in [
        (AssessmentStatus::Completed, vec![fw.id]),
        (AssessmentStatus::InProgress, vec![fw.id, other.id]),
        (AssessmentStatus::Completed, vec![other.id]),
    ] {
        lib.store.insert_assessment(Assessment {
            id: AssessmentId::new(),
            status,
            selected_framework_ids: selected,
        });
    }

    let aggregator = ScorecardAggregator::new(Arc::new(lib.store.clone()), clock());
    let scorecard = aggregator.generate(Some(&[fw.id])).unwrap();
    let card = &scorecard.frameworks[0];
    assert_eq!(card.assessment_results.completed, 1);
    assert_eq!(card.assessment_results.in_progress, 1);
}

#[test]
fn unknown_framework_id_is_not_found() {
    let lib = Library::new();
    lib.framework("SOC 2");
    let aggregator = ScorecardAggregator::new(Arc::new(lib.store.clone()), clock());
    let err = aggregator.generate(Some(&[FrameworkId::new()])).unwrap_err();
    assert!(err.is_not_found());
}

/// Library whose mapping reads fail for one framework.
struct FlakyLibrary {
    inner: MemoryStore,
    broken: FrameworkId,
}

impl ControlLibrary for FlakyLibrary {
    fn list_frameworks(&self, ids: Option<&[FrameworkId]>) -> StoreResult<Vec<Framework>> {
        self.inner.list_frameworks(ids)
    }

    fn list_requirements(
        &self,
        framework_id: FrameworkId,
        filter: Option<&RequirementFilter>,
    ) -> StoreResult<Vec<Requirement>> {
        self.inner.list_requirements(framework_id, filter)
    }

    fn list_mappings_for_framework(
        &self,
        framework_id: FrameworkId,
    ) -> StoreResult<Vec<MappingRecord>> {
        if framework_id == self.broken {
            return Err(GrcError::Storage("mapping table unavailable".into()));
        }
        self.inner.list_mappings_for_framework(framework_id)
    }

    fn list_controls_by_ids(&self, ids: &[ControlId]) -> StoreResult<Vec<Control>> {
        self.inner.list_controls_by_ids(ids)
    }

    fn list_assessments(
        &self,
        status_in: &[AssessmentStatus],
    ) -> StoreResult<Vec<Assessment>> {
        self.inner.list_assessments(status_in)
    }

    fn list_assessment_results(
        &self,
        assessment_ids: &[AssessmentId],
    ) -> StoreResult<Vec<grc_core::AssessmentResult>> {
        self.inner.list_assessment_results(assessment_ids)
    }
}

#[test]
fn one_bad_framework_degrades_without_blocking_the_report() {
    let lib = Library::new();
    let good = lib.framework("Good");
    let bad = lib.framework("Bad");
    let req = lib.requirement(&good, None);
    let c = lib.control(ImplementationStatus::Implemented);
    lib.map(&req, c.id, CoverageLevel::Full);
    lib.requirement(&bad, Some(Priority::Critical));

    let flaky = Arc::new(FlakyLibrary {
        inner: lib.store.clone(),
        broken: bad.id,
    });

    let scorecard = ScorecardAggregator::new(flaky.clone(), clock())
        .generate(None)
        .unwrap();
    assert_eq!(scorecard.frameworks.len(), 2);
    assert!(!scorecard.frameworks[0].degraded);
    assert_eq!(scorecard.frameworks[0].overall_compliance, 100);
    assert!(scorecard.frameworks[1].degraded);
    assert_eq!(scorecard.frameworks[1].overall_compliance, 0);

    let gaps = GapAnalyzer::new(flaky, clock())
        .analyze(&GapAnalysisQuery::default())
        .unwrap();
    assert_eq!(gaps.total_frameworks, 1);
    assert_eq!(gaps.frameworks[0].framework_id, good.id);
}

// ---------------------------------------------------------------------------
// Gap analysis
// ---------------------------------------------------------------------------

#[test]
fn scenario_priority_only_keeps_critical_and_high_gaps() {
    let lib = Library::new();
    let fw = lib.framework("NIST CSF");
    for priority in [Priority::Critical, Priority::High, Priority::Medium] {
        lib.requirement(&fw, Some(priority));
    }

    let analyzer = GapAnalyzer::new(Arc::new(lib.store.clone()), clock());
    let result = analyzer
        .analyze(&GapAnalysisQuery {
            priority_only: true,
            ..Default::default()
        })
        .unwrap();

    let severities: Vec<_> = result.all_gaps.iter().map(|g| g.gap_severity).collect();
    assert_eq!(severities, vec![GapSeverity::Critical, GapSeverity::High]);
    assert_eq!(result.total_requirements, 2);
    assert_eq!(result.critical_gaps_count, 2);
    assert_eq!(result.frameworks[0].critical_gaps_count, 1);
}

#[test]
fn gap_filters_are_and_combined_and_scoped() {
    let lib = Library::new();
    let fw = lib.framework("SOC 2");
    let skipped = lib.framework("Other");
    let in_scope = lib.requirement(&fw, Some(Priority::Low));
    lib.store.insert_requirement(Requirement {
        id: RequirementId::new(),
        framework_id: fw.id,
        identifier: "PHY-1".into(),
        text: "Badge readers".into(),
        domain: Some("Physical".into()),
        category: Some("Technical".into()),
        priority: Some(Priority::Critical),
    });
    lib.requirement(&skipped, Some(Priority::Critical));

    let analyzer = GapAnalyzer::new(Arc::new(lib.store.clone()), clock());
    let result = analyzer
        .analyze(&GapAnalysisQuery {
            framework_ids: Some(vec![fw.id]),
            domain: Some("Access Control".into()),
            category: Some("Technical".into()),
            priority_only: false,
        })
        .unwrap();

    assert_eq!(result.total_frameworks, 1);
    assert_eq!(result.all_gaps.len(), 1);
    assert_eq!(result.all_gaps[0].requirement_id, in_scope.id);
    assert_eq!(result.all_gaps[0].gap_severity, GapSeverity::Low);
    assert_eq!(result.overall_coverage_percentage, 0);
}

#[test]
fn mapped_only_needs_a_mapping_not_an_implementation() {
    let lib = Library::new();
    let fw = lib.framework("SOC 2");
    let req = lib.requirement(&fw, Some(Priority::Critical));
    let c = lib.control(ImplementationStatus::NotImplemented);
    lib.map(&req, c.id, CoverageLevel::Partial);

    let result = GapAnalyzer::new(Arc::new(lib.store.clone()), clock())
        .analyze(&GapAnalysisQuery::default())
        .unwrap();
    assert!(result.all_gaps.is_empty());
    assert_eq!(result.frameworks[0].partial_coverage_requirements, 1);
    assert_eq!(result.overall_coverage_percentage, 100);
    assert_eq!(
        result.generated_at.date_naive(),
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    );
}
