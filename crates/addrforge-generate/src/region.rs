use rand::Rng;
use tracing::warn;

use addrforge_core::{CountryCatalog, SubdivisionKind};

use crate::model::SubdivisionFilter;

/// Subdivision keys records may be drawn from, in catalog order.
///
/// Catalogs without subdivisions yield no candidates; their cities come from
/// the flat city index instead.
pub fn select_candidates(
    catalog: &CountryCatalog,
    filter: Option<&SubdivisionFilter>,
) -> Vec<String> {
    let kind = catalog.subdivision_kind;
    if kind == SubdivisionKind::None {
        return Vec::new();
    }

    let all = || {
        catalog
            .subdivisions
            .keys()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    let keys = match filter {
        None | Some(SubdivisionFilter::All) => return all(),
        Some(SubdivisionFilter::Keys(keys)) => keys,
    };

    let mut candidates = Vec::with_capacity(keys.len());
    for key in keys {
        let normalized = kind.normalize_key(key);
        if catalog.subdivisions.contains_key(&normalized) {
            candidates.push(normalized);
        } else {
            warn!(kind = %kind, subdivision = %key, "unknown subdivision in filter; skipping");
        }
    }

    if candidates.is_empty() {
        warn!(kind = %kind, "no requested subdivision exists; using every subdivision");
        return all();
    }
    candidates
}

/// Picks one candidate uniformly; `None` when there are no candidates.
pub fn choose_candidate<'a, R: Rng + ?Sized>(
    candidates: &'a [String],
    rng: &mut R,
) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog(kind: &str) -> CountryCatalog {
        serde_json::from_value(serde_json::json!({
            "subdivisionKind": kind,
            "callingCode": "+1 ",
            "phoneTemplate": "(AAA) XXX-XXXX",
            "subdivisions": {
                "CA": {"name": "California", "cities": {}},
                "NY": {"name": "New York", "cities": {}},
                "Nova Scotia": {"name": "Nova Scotia", "cities": {}}
            },
            "cities": {"Singapore": {"zipCodes": ["018989"]}}
        }))
        .expect("catalog")
    }

    #[test]
    fn no_filter_selects_everything_in_order() {
        let catalog = catalog("state");
        assert_eq!(
            select_candidates(&catalog, None),
            vec!["CA", "NY", "Nova Scotia"]
        );
        assert_eq!(
            select_candidates(&catalog, Some(&SubdivisionFilter::All)).len(),
            3
        );
    }

    #[test]
    fn state_filters_are_upper_cased() {
        let catalog = catalog("state");
        let filter = SubdivisionFilter::Keys(vec!["ny".to_string()]);
        assert_eq!(select_candidates(&catalog, Some(&filter)), vec!["NY"]);
    }

    #[test]
    fn province_filters_keep_their_casing() {
        let catalog = catalog("province");
        let filter = SubdivisionFilter::Keys(vec!["Nova Scotia".to_string(), "ny".to_string()]);
        assert_eq!(select_candidates(&catalog, Some(&filter)), vec!["Nova Scotia"]);
    }

    #[test]
    fn unknown_filter_falls_back_to_everything() {
        let catalog = catalog("state");
        let filter = SubdivisionFilter::Keys(vec!["ZZ".to_string()]);
        assert_eq!(select_candidates(&catalog, Some(&filter)).len(), 3);
    }

    #[test]
    fn catalogs_without_subdivisions_have_no_candidates() {
        let catalog = catalog("none");
        assert!(select_candidates(&catalog, None).is_empty());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(choose_candidate(&[], &mut rng), None);
    }
}
