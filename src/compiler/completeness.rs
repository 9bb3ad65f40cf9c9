use crate::mapping::{
    Correspondence, Endpoint, FillPlan, IncompleteReason, ReasonLocation,
};
use crate::schema::ParameterNode;

/// Every empty leaf of the plan, reported by field name.
pub(super) fn body_reasons(plan: &FillPlan) -> Vec<IncompleteReason> {
    plan.empty_leaves()
        .into_iter()
        .map(|path| {
            let name = match path.rsplit('.').next() {
                Some(last) if !last.is_empty() => last.to_string(),
                _ => "body".to_string(),
            };
            IncompleteReason::new(name, ReasonLocation::TargetBody)
        })
        .collect()
}

/// Every required parameter on either side that no correspondence targets.
pub(super) fn parameter_reasons(
    source: &Endpoint,
    target: &Endpoint,
    correspondences: &[Correspondence],
) -> Vec<IncompleteReason> {
    let fed = |param: &ParameterNode| correspondences.iter().any(|c| c.target == param.id);

    let source_missing = source
        .parameters()
        .iter()
        .filter(|p| p.required && !fed(p))
        .map(|p| IncompleteReason::new(p.name.clone(), ReasonLocation::SourceParameter));
    let target_missing = target
        .parameters()
        .iter()
        .filter(|p| p.required && !fed(p))
        .map(|p| IncompleteReason::new(p.name.clone(), ReasonLocation::TargetParameter));

    source_missing.chain(target_missing).collect()
}
