#![forbid(unsafe_code)]

//! Property tests for [`reconcile`].
//!
//! Validates:
//! - The result is always a permutation of the fresh items.
//! - An empty saved order yields the fresh items unchanged.
//! - Surviving saved items keep their saved relative order, ahead of new
//!   arrivals, which keep their fresh relative order.

use albumkit_core::ItemId;
use albumkit_store::reconcile;
use proptest::prelude::*;

fn id_pool() -> impl Strategy<Value = Vec<ItemId>> {
    prop::collection::btree_set(0u16..64, 0..32)
        .prop_map(|set| set.into_iter().map(|n| ItemId::new(n.to_string())).collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn result_is_permutation_of_fresh(saved in id_pool(), fresh in id_pool()) {
        let out = reconcile(&saved, &fresh);
        prop_assert_eq!(out.len(), fresh.len());
        let mut a = out.clone();
        let mut b = fresh.clone();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn empty_saved_is_identity(fresh in id_pool()) {
        prop_assert_eq!(reconcile(&[], &fresh), fresh);
    }

    #[test]
    fn saved_order_leads_then_new_arrivals(saved in id_pool(), fresh in id_pool()) {
        prop_assume!(!saved.is_empty());
        let out = reconcile(&saved, &fresh);

        let survivors: Vec<ItemId> = saved.iter().filter(|i| fresh.contains(i)).cloned().collect();
        let arrivals: Vec<ItemId> = fresh.iter().filter(|i| !saved.contains(i)).cloned().collect();

        prop_assert_eq!(&out[..survivors.len()], &survivors[..]);
        prop_assert_eq!(&out[survivors.len()..], &arrivals[..]);
    }

    #[test]
    fn duplicated_saved_ids_fall_back(fresh in id_pool()) {
        prop_assume!(!fresh.is_empty());
        let mut saved = fresh.clone();
        saved.push(fresh[0].clone());
        prop_assert_eq!(reconcile(&saved, &fresh), fresh);
    }
}
