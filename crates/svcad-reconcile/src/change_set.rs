use std::collections::BTreeSet;

use svcad_schemas::{Plan, Service};

use crate::ChangeSet;

fn same_plan_unique_id(catalog: &Plan, registered: &Plan) -> bool {
    match catalog.stable_id() {
        Some(id) => registered.stable_id() == Some(id),
        None => false,
    }
}

fn same_plan_name(catalog: &Plan, registered: &Plan) -> bool {
    catalog.name == registered.name
}

/// Diff the plans of `catalog` against its registry counterpart.
///
/// Plans are matched with the same two-tier rule as services (`unique_id`,
/// then `name`) and each registry plan is claimed at most once. With no
/// registry counterpart every catalog plan is an add.
pub fn compute_change_set(catalog: &Service, registered: Option<&Service>) -> ChangeSet {
    let Some(registered) = registered else {
        return ChangeSet {
            plans_to_add: catalog.plans.clone(),
            plans_to_update: Vec::new(),
        };
    };

    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut out = ChangeSet::default();

    for plan in &catalog.plans {
        let find = |pred: fn(&Plan, &Plan) -> bool| {
            registered
                .plans
                .iter()
                .enumerate()
                .find(|(i, rp)| !claimed.contains(i) && pred(plan, rp))
                .map(|(i, _)| i)
        };

        let hit = find(same_plan_unique_id).or_else(|| find(same_plan_name));

        match hit {
            None => out.plans_to_add.push(plan.clone()),
            Some(idx) => {
                claimed.insert(idx);
                let existing = &registered.plans[idx];
                if !plan.same_attributes(existing) {
                    let mut update = plan.clone();
                    update.guid = existing.guid.clone();
                    out.plans_to_update.push(update);
                }
            }
        }
    }

    out
}
