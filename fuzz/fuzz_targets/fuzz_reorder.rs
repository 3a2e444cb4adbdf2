#![no_main]

use albumkit_core::{
    HeaderSet, ItemId, SelectionController, SelectionMode, reorder, visible_items,
};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Tap(u8),
    DragBegin(u8),
    DragOver(Option<u8>),
    DragEnd,
    Anchor(Option<u8>),
    Header(u8),
    Collapse(u8),
    SwitchMode,
    Clear,
}

#[derive(Arbitrary, Debug)]
struct Input {
    len: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let len = usize::from(input.len % 48) + 1;
    let full: Vec<ItemId> = (0..len).map(|i| ItemId::new(format!("p{i}"))).collect();
    let mut headers = HeaderSet::new();
    let mut controller = SelectionController::new(SelectionMode::Toggle);

    for op in input.ops.iter().take(256) {
        let display = visible_items(&full, &headers);
        let at = |i: u8| usize::from(i) % (display.len() + 1);
        match op {
            Op::Tap(i) => {
                controller.tap(&display, at(*i));
            }
            Op::DragBegin(i) => {
                controller.drag_begin(&display, at(*i));
            }
            Op::DragOver(i) => {
                controller.drag_over(&display, i.map(at));
            }
            Op::DragEnd => controller.drag_end(),
            Op::Anchor(i) => {
                controller.set_anchor(i.and_then(|i| display.get(at(i)).cloned()));
            }
            Op::Header(i) => {
                headers.set_header(full[usize::from(*i) % len].clone());
            }
            Op::Collapse(i) => {
                headers.toggle_collapse(&full[usize::from(*i) % len]);
            }
            Op::SwitchMode => {
                let next = match controller.mode() {
                    SelectionMode::Toggle => SelectionMode::Range,
                    SelectionMode::Range => SelectionMode::Toggle,
                };
                controller.set_mode(next);
            }
            Op::Clear => {
                controller.clear();
            }
        }
        let _ = controller.drain_events();
    }

    let selection = controller.selection();
    // Ranks are 1..=n without gaps.
    for (i, item) in selection.selected_items_in_order().iter().enumerate() {
        assert_eq!(selection.rank_of(item), Some(i + 1));
    }

    let Ok(first) = reorder(&full, selection) else {
        return;
    };
    let mut sorted_full = full.clone();
    let mut sorted_new = first.clone();
    sorted_full.sort();
    sorted_new.sort();
    assert_eq!(sorted_full, sorted_new, "reorder must be a permutation");

    let second = reorder(&first, selection).expect("selection still valid");
    assert_eq!(first, second, "reorder must be idempotent");

    let visible = visible_items(&first, &headers);
    for header in headers.headers() {
        assert!(visible.contains(header), "headers stay visible");
    }
});
