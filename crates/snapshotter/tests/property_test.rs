//! Property tests for retention planning
//!
//! Snapshots are generated with timestamps drawn from a small range so that
//! ties are common.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use snapshotter::rotation::{CREATED_AT_FORMAT, plan_deletions};
use snapshotter_cloud::Snapshot;

/// Strategy for a listing of uniquely named snapshots
fn listing_strategy() -> impl Strategy<Value = Vec<Snapshot>> {
    prop::collection::vec(0i64..12, 0..20).prop_map(|offsets| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        offsets
            .into_iter()
            .enumerate()
            .map(|(i, hours)| {
                let created_at = (base + Duration::hours(hours))
                    .format(CREATED_AT_FORMAT)
                    .to_string();
                Snapshot::new(format!("snap-{i}"), "vol-1", format!("snap-{i}"), created_at)
            })
            .collect()
    })
}

/// Position of each snapshot in the listing, ordered oldest first with ties
/// broken by listing position
fn reference_order(listing: &[Snapshot]) -> Vec<String> {
    let mut indexed: Vec<(usize, &Snapshot)> = listing.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| a.created_at.cmp(&b.created_at).then(ia.cmp(ib)));
    indexed.into_iter().map(|(_, s)| s.id.clone()).collect()
}

proptest! {
    /// |S| <= N never deletes anything
    #[test]
    fn within_retention_deletes_nothing(listing in listing_strategy(), extra in 0usize..5) {
        let keep = listing.len() + extra;
        let doomed = plan_deletions("vol-1", listing, keep).unwrap();
        prop_assert!(doomed.is_empty());
    }

    /// |S| = C > N deletes exactly C - N, and the survivors are the N newest
    #[test]
    fn deletes_exact_excess_oldest_first(listing in listing_strategy(), keep in 0usize..20) {
        prop_assume!(listing.len() > keep);

        let expected = reference_order(&listing);
        let excess = listing.len() - keep;

        let doomed: Vec<String> = plan_deletions("vol-1", listing.clone(), keep)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();

        prop_assert_eq!(doomed.len(), excess);
        prop_assert_eq!(&doomed[..], &expected[..excess]);

        let retained: Vec<&String> = listing
            .iter()
            .map(|s| &s.id)
            .filter(|id| !doomed.contains(id))
            .collect();
        prop_assert_eq!(retained.len(), keep);
    }

    /// One malformed timestamp anywhere fails the plan whenever pruning is needed
    #[test]
    fn malformed_timestamp_fails_plan(
        mut listing in listing_strategy(),
        position in any::<prop::sample::Index>(),
    ) {
        prop_assume!(listing.len() > 1);

        let i = position.index(listing.len());
        listing[i].created_at = "2024-13-45T99:99:99Z".to_string();

        prop_assert!(plan_deletions("vol-1", listing, 1).is_err());
    }
}
