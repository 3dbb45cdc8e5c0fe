#![no_main]

use libfuzzer_sys::fuzz_target;
use pointer_list::{DropPosition, PointerList, SortFn};

fuzz_target!(|data: &[u8]| {
    let mut list: PointerList<u8> = PointerList::new();
    let descending = SortFn::new(|a: &u8, b: &u8| b.cmp(a));

    for pair in data.chunks(2) {
        let op = pair[0];
        let value = pair.get(1).copied().unwrap_or(0) % 32;
        match op % 12 {
            0 | 1 => {
                list.add(value);
            }
            2 => {
                list.remove(&value);
            }
            3 => {
                if let Some(anchor) = list.get_index(usize::from(value)).copied() {
                    let drop = if op & 0x80 == 0 {
                        DropPosition::Before
                    } else {
                        DropPosition::After
                    };
                    list.insert_relative(value.wrapping_add(32), &anchor, drop);
                }
            }
            4 => {
                list.set_current(Some(&value));
            }
            5 => {
                list.next();
            }
            6 => {
                list.prev();
            }
            7 => list.sort(|a, b| a.cmp(b)),
            8 => list.set_sorting(Some(descending.clone())),
            9 => list.set_sorting(None),
            10 => {
                let keep: Vec<u8> = list.iter().copied().filter(|item| item % 4 != value % 4).collect();
                list.remove_delta(&keep);
            }
            _ => {
                if let Some(position) = list.position_at(usize::from(value)) {
                    list.remove_at(position);
                } else {
                    list.clear();
                }
            }
        }

        if let Some(index) = list.current_index() {
            assert!(index < list.len());
            assert_eq!(list.get_index(index), list.get_current());
        }
        for (index, item) in list.iter().enumerate() {
            assert_eq!(list.index_of(item), Some(index));
        }
    }
});
