#![no_main]

use albumkit_core::ItemId;
use albumkit_store::reconcile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, Vec<u8>)| {
    let (saved, fresh) = data;
    let saved: Vec<ItemId> = saved.iter().map(|b| ItemId::new(format!("p{b}"))).collect();
    let mut seen = std::collections::HashSet::new();
    let fresh: Vec<ItemId> = fresh
        .iter()
        .filter(|b| seen.insert(**b))
        .map(|b| ItemId::new(format!("p{b}")))
        .collect();

    let merged = reconcile(&saved, &fresh);

    assert_eq!(merged.len(), fresh.len());
    let mut a = merged.clone();
    let mut b = fresh.clone();
    a.sort();
    b.sort();
    assert_eq!(a, b, "reconcile must return a permutation of fresh");
});
