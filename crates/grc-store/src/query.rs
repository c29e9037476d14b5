//! # Read-Side Queries
//!
//! Flat, pre-joined views built from the [`ControlLibrary`] port. Scoring
//! code consumes these values and never walks relations itself.

use std::collections::{HashMap, HashSet};

use grc_core::{
    Assessment, AssessmentResult, AssessmentStatus, Control, ControlId, CoverageLevel, Framework,
    FrameworkId, Requirement, RequirementId,
};

use crate::ports::{ControlLibrary, RequirementFilter, StoreResult};

/// A mapping as the resolver sees it. `control` is `None` when the mapped
/// control is missing from the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    pub control_id: ControlId,
    pub coverage_level: CoverageLevel,
    pub control: Option<Control>,
}

/// A requirement with every mapping that targets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementMappings {
    pub requirement: Requirement,
    pub mappings: Vec<ResolvedMapping>,
}

/// Everything the scorecard needs about one framework.
#[derive(Debug, Clone)]
pub struct FrameworkView {
    pub framework: Framework,
    pub requirements: Vec<RequirementMappings>,
    /// Distinct controls mapped anywhere in the framework that exist in the
    /// library, in first-mapped order.
    pub controls: Vec<Control>,
}

impl FrameworkView {
    pub fn mapped_control_ids(&self) -> HashSet<ControlId> {
        self.controls.iter().map(|c| c.id).collect()
    }
}

/// Load a framework's requirements joined to their mappings and controls.
pub fn framework_view<L>(library: &L, framework: Framework) -> StoreResult<FrameworkView>
where
    L: ControlLibrary + ?Sized,
{
    let requirements = library.list_requirements(framework.id, None)?;
    let records = library.list_mappings_for_framework(framework.id)?;

    let mut by_requirement: HashMap<RequirementId, Vec<ResolvedMapping>> = HashMap::new();
    let mut control_ids: Vec<ControlId> = Vec::new();
    let mut seen: HashSet<ControlId> = HashSet::new();
    for record in records {
        if seen.insert(record.mapping.control_id) {
            control_ids.push(record.mapping.control_id);
        }
        by_requirement
            .entry(record.mapping.requirement_id)
            .or_default()
            .push(ResolvedMapping {
                control_id: record.mapping.control_id,
                coverage_level: record.mapping.coverage_level,
                control: record.control,
            });
    }

    let controls = library.list_controls_by_ids(&control_ids)?;
    let requirements = requirements
        .into_iter()
        .map(|requirement| RequirementMappings {
            mappings: by_requirement.remove(&requirement.id).unwrap_or_default(),
            requirement,
        })
        .collect();

    Ok(FrameworkView {
        framework,
        requirements,
        controls,
    })
}

/// Mapping counts for one requirement, as gap analysis sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementCoverage {
    pub requirement: Requirement,
    pub mapped_controls_count: usize,
    pub has_full_coverage: bool,
}

/// Filtered requirements of a framework with their mapping counts.
pub fn requirement_coverage<L>(
    library: &L,
    framework_id: FrameworkId,
    filter: &RequirementFilter,
) -> StoreResult<Vec<RequirementCoverage>>
where
    L: ControlLibrary + ?Sized,
{
    let requirements = library.list_requirements(framework_id, Some(filter))?;
    if requirements.is_empty() {
        return Ok(Vec::new());
    }
    let mut counts: HashMap<RequirementId, (usize, bool)> = HashMap::new();
    for record in library.list_mappings_for_framework(framework_id)? {
        let entry = counts.entry(record.mapping.requirement_id).or_default();
        entry.0 += 1;
        entry.1 |= record.mapping.coverage_level == CoverageLevel::Full;
    }
    Ok(requirements
        .into_iter()
        .map(|requirement| {
            let (mapped_controls_count, has_full_coverage) =
                counts.get(&requirement.id).copied().unwrap_or_default();
            RequirementCoverage {
                requirement,
                mapped_controls_count,
                has_full_coverage,
            }
        })
        .collect())
}

/// Completed and in-progress assessments with the results of the completed ones.
#[derive(Debug, Clone, Default)]
pub struct AssessmentView {
    pub completed: Vec<Assessment>,
    pub in_progress: Vec<Assessment>,
    pub completed_results: Vec<AssessmentResult>,
}

impl AssessmentView {
    /// Assessments selecting `framework_id`, as (completed, in_progress) counts.
    pub fn counts_for(&self, framework_id: FrameworkId) -> (usize, usize) {
        let count = |list: &[Assessment]| list.iter().filter(|a| a.covers(framework_id)).count();
        (count(&self.completed), count(&self.in_progress))
    }

    /// Results of completed assessments selecting `framework_id` whose control
    /// is one of `mapped`.
    pub fn results_for<'a>(
        &'a self,
        framework_id: FrameworkId,
        mapped: &'a HashSet<ControlId>,
    ) -> impl Iterator<Item = &'a AssessmentResult> + 'a {
        let completed: HashSet<_> = self
            .completed
            .iter()
            .filter(|a| a.covers(framework_id))
            .map(|a| a.id)
            .collect();
        self.completed_results
            .iter()
            .filter(move |r| completed.contains(&r.assessment_id) && mapped.contains(&r.control_id))
    }
}

/// Load assessments once for a whole scorecard run.
pub fn assessment_view<L>(library: &L) -> StoreResult<AssessmentView>
where
    L: ControlLibrary + ?Sized,
{
    let assessments =
        library.list_assessments(&[AssessmentStatus::Completed, AssessmentStatus::InProgress])?;
    let (completed, in_progress): (Vec<_>, Vec<_>) = assessments
        .into_iter()
        .partition(|a| a.status == AssessmentStatus::Completed);
    let ids: Vec<_> = completed.iter().map(|a| a.id).collect();
    let completed_results = if ids.is_empty() {
        Vec::new()
    } else {
        library.list_assessment_results(&ids)?
    };
    Ok(AssessmentView {
        completed,
        in_progress,
        completed_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use grc_core::{
        AssessmentId, AssessmentResultId, ImplementationStatus, Mapping, MappingId, Priority,
    };

    struct Fixture {
        store: MemoryStore,
        framework: Framework,
        r1: Requirement,
        r2: Requirement,
        control: Control,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let framework = Framework {
            id: FrameworkId::new(),
            name: "SOC 2".into(),
            code: "SOC2".into(),
        };
        let req = |identifier: &str, priority| Requirement {
            id: RequirementId::new(),
            framework_id: framework.id,
            identifier: identifier.into(),
            text: "text".into(),
            domain: Some("Access Control".into()),
            category: None,
            priority,
        };
        let r1 = req("CC6.1", Some(Priority::High));
        let r2 = req("CC6.2", Some(Priority::Low));
        let control = Control {
            id: ControlId::new(),
            identifier: "AC-1".into(),
            implementation_status: ImplementationStatus::Implemented,
            domain: None,
            updated_at: None,
        };
        store.insert_framework(framework.clone());
        store.insert_requirement(r1.clone());
        store.insert_requirement(r2.clone());
        store.insert_control(control.clone());
        for (control_id, level) in [
            (control.id, CoverageLevel::Partial),
            (ControlId::new(), CoverageLevel::Full),
        ] {
            store.insert_mapping(Mapping {
                id: MappingId::new(),
                requirement_id: r1.id,
                control_id,
                coverage_level: level,
            });
        }
        Fixture {
            store,
            framework,
            r1,
            r2,
            control,
        }
    }

    #[test]
    fn framework_view_joins_mappings_and_drops_missing_controls() {
        let fx = fixture();
        let view = framework_view(&fx.store, fx.framework.clone()).unwrap();

        assert_eq!(view.requirements.len(), 2);
        let r1 = &view.requirements[0];
        assert_eq!(r1.requirement.id, fx.r1.id);
        assert_eq!(r1.mappings.len(), 2);
        assert_eq!(r1.mappings[0].control.as_ref(), Some(&fx.control));
        assert!(r1.mappings[1].control.is_none());
        assert!(view.requirements[1].mappings.is_empty());

        assert_eq!(view.controls, vec![fx.control.clone()]);
        assert!(view.mapped_control_ids().contains(&fx.control.id));
    }

    #[test]
    fn requirement_coverage_counts_mappings() {
        let fx = fixture();
        let rows = requirement_coverage(&fx.store, fx.framework.id, &RequirementFilter::default())
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mapped_controls_count, 2);
        assert!(rows[0].has_full_coverage);
        assert_eq!(rows[1].requirement.id, fx.r2.id);
        assert_eq!(rows[1].mapped_controls_count, 0);
        assert!(!rows[1].has_full_coverage);
    }

    #[test]
    fn requirement_coverage_applies_filter() {
        let fx = fixture();
        let filter = RequirementFilter {
            priority_only: true,
            ..Default::default()
        };
        let rows = requirement_coverage(&fx.store, fx.framework.id, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].requirement.id, fx.r1.id);
    }

    #[test]
    fn assessment_view_partitions_and_scopes_results() {
        let fx = fixture();
        let completed = Assessment {
            id: AssessmentId::new(),
            status: AssessmentStatus::Completed,
            selected_framework_ids: vec![fx.framework.id],
        };
        let running = Assessment {
            id: AssessmentId::new(),
            status: AssessmentStatus::InProgress,
            selected_framework_ids: vec![fx.framework.id],
        };
        let cancelled = Assessment {
            id: AssessmentId::new(),
            status: AssessmentStatus::Cancelled,
            selected_framework_ids: vec![fx.framework.id],
        };
        for a in [&completed, &running, &cancelled] {
            fx.store.insert_assessment(a.clone());
        }
        let mapped_result = AssessmentResult {
            id: AssessmentResultId::new(),
            assessment_id: completed.id,
            control_id: fx.control.id,
            effectiveness_rating: Some(4),
        };
        let unmapped_result = AssessmentResult {
            id: AssessmentResultId::new(),
            assessment_id: completed.id,
            control_id: ControlId::new(),
            effectiveness_rating: Some(1),
        };
        fx.store.insert_assessment_result(mapped_result.clone());
        fx.store.insert_assessment_result(unmapped_result);

        let view = assessment_view(&fx.store).unwrap();
        assert_eq!(view.counts_for(fx.framework.id), (1, 1));
        assert_eq!(view.counts_for(FrameworkId::new()), (0, 0));

        let mapped: HashSet<_> = [fx.control.id].into_iter().collect();
        let results: Vec<_> = view.results_for(fx.framework.id, &mapped).collect();
        assert_eq!(results, vec![&mapped_result]);
    }
}
