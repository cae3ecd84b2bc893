use std::collections::BTreeSet;

use svcad_schemas::Service;
use tracing::warn;

use crate::{ActiveService, Classification, MatchKind, TupleMatchDiagnostic};

/// Exact identity: both sides carry the same non-empty `unique_id`.
pub fn same_unique_id(catalog: &Service, registered: &Service) -> bool {
    match catalog.stable_id() {
        Some(id) => registered.stable_id() == Some(id),
        None => false,
    }
}

/// Fallback identity: same `(label, version, provider)`.
pub fn same_tuple(catalog: &Service, registered: &Service) -> bool {
    catalog.tuple() == registered.tuple()
}

fn find_unclaimed(
    registered: &[Service],
    claimed: &BTreeSet<usize>,
    pred: impl Fn(&Service) -> bool,
) -> Option<usize> {
    registered
        .iter()
        .enumerate()
        .find(|(i, rs)| !claimed.contains(i) && pred(rs))
        .map(|(i, _)| i)
}

/// Classify catalog services against the registry snapshot.
///
/// Catalog order decides precedence: the first catalog service to match a
/// registry entry claims it, and a claimed entry is invisible to later
/// catalog services under either identity rule.
pub fn classify(catalog: &[Service], registered: &[Service]) -> Classification {
    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut out = Classification::default();

    for service in catalog {
        let hit = find_unclaimed(registered, &claimed, |rs| same_unique_id(service, rs))
            .map(|i| (i, MatchKind::UniqueId))
            .or_else(|| {
                find_unclaimed(registered, &claimed, |rs| same_tuple(service, rs))
                    .map(|i| (i, MatchKind::Tuple))
            });

        let Some((idx, matched_by)) = hit else {
            out.new.push(service.clone());
            continue;
        };

        let registered_service = &registered[idx];

        if matched_by == MatchKind::Tuple {
            if let Some(catalog_id) = service.stable_id() {
                warn!(
                    unique_id = catalog_id,
                    registered_unique_id = registered_service.unique_id.as_deref().unwrap_or(""),
                    label = %service.label,
                    version = %service.version,
                    provider = %service.provider,
                    "catalog service matched registry service by label-version-provider tuple, not unique id"
                );
                out.diagnostics.push(TupleMatchDiagnostic {
                    label: service.label.clone(),
                    version: service.version.clone(),
                    provider: service.provider.clone(),
                    catalog_unique_id: catalog_id.to_string(),
                    registered_unique_id: registered_service.unique_id.clone(),
                    registered_guid: registered_service.guid.clone(),
                });
            }
        }

        let mut bound = service.clone();
        bound.guid = registered_service.guid.clone();
        claimed.insert(idx);
        out.active.push(ActiveService {
            service: bound,
            registered: registered_service.clone(),
            matched_by,
        });
    }

    out.inactive = registered
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed.contains(i))
        .map(|(_, rs)| rs.clone())
        .collect();

    out
}
