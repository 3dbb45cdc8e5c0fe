use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use pointer_list::{DropPosition, ListEvent, PointerList, SortFn};
use tempfile::tempdir;

fn recorder<T: Clone + Eq + std::hash::Hash + 'static>(
    list: &mut PointerList<T>,
) -> Rc<RefCell<Vec<ListEvent<T>>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    list.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn add_leaves_cursor_unset() {
    let mut list = PointerList::new();
    assert!(list.add("A"));
    assert_eq!(list.len(), 1);
    assert_eq!(list.get_current(), None);
}

#[test]
fn duplicate_add_is_rejected() {
    let mut list = PointerList::new();
    let events = recorder(&mut list);

    assert!(list.add("A"));
    assert!(!list.add("A"));

    assert_eq!(list.len(), 1);
    assert_eq!(
        *events.borrow(),
        vec![ListEvent::Inserted {
            index: 0,
            item: "A"
        }]
    );
}

#[test]
fn next_walks_to_the_end() {
    let mut list = PointerList::new();
    list.add("A");
    list.add("B");
    list.add("C");

    assert!(list.set_current(Some(&"B")));
    assert_eq!(list.next(), Some(&"C"));
    assert!(!list.has_next());
    assert!(list.has_prev());
}

#[test]
fn comparator_positions_new_elements() {
    let mut list = PointerList::new();
    list.set_sorting(Some(SortFn::new(|a: &u32, b: &u32| a.cmp(b))));
    list.add(3);
    list.add(1);
    list.add(2);
    assert_eq!(list.items(), vec![1, 2, 3]);
}

#[test]
fn sort_emits_one_permutation() {
    let mut list = PointerList::new();
    list.add("C");
    list.add("A");
    list.add("B");
    let events = recorder(&mut list);

    list.sort(|a, b| a.cmp(b));
    assert_eq!(list.items(), vec!["A", "B", "C"]);
    assert_eq!(
        *events.borrow(),
        vec![ListEvent::Reordered {
            permutation: vec![1, 2, 0]
        }]
    );

    list.sort(|a, b| a.cmp(b));
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn remove_delta_deletes_in_ascending_order() {
    let mut list = PointerList::new();
    for item in ["A", "B", "C", "D"] {
        list.add(item);
    }
    let events = recorder(&mut list);

    list.remove_delta(&["A", "C"]);

    assert_eq!(list.items(), vec!["A", "C"]);
    assert_eq!(
        *events.borrow(),
        vec![
            ListEvent::Deleted { index: 1 },
            ListEvent::Deleted { index: 2 },
        ]
    );
}

#[test]
fn drag_reorder_flow() {
    let mut list = PointerList::new();
    for item in ["a", "b", "c"] {
        list.add(item);
    }
    list.set_current(Some(&"c"));

    assert!(list.drop_possible(0));
    list.remove(&"c");
    list.insert_relative("c", &"a", DropPosition::Before);

    assert_eq!(list.items(), vec!["c", "a", "b"]);
    assert_eq!(list.get_current(), None);
    assert_eq!(list.first(), Some(&"c"));
}

#[test]
fn playlist_survives_save_and_restore() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("playlist.json");

    let mut list = PointerList::new();
    for name in ["one.flac", "two.flac", "three.flac"] {
        list.add(PathBuf::from(name));
    }
    list.set_current(Some(&PathBuf::from("two.flac")));
    pointer_list::store::save_snapshot_to_path(&path, &list.snapshot(false)).expect("save");

    let mut restored: PointerList<PathBuf> = PointerList::new();
    let snapshot = pointer_list::store::load_snapshot_from_path(&path).expect("load");
    assert_eq!(restored.restore(snapshot), 3);

    assert_eq!(restored.items(), list.items());
    assert_eq!(restored.get_current(), Some(&PathBuf::from("two.flac")));
    assert_eq!(restored.next(), Some(&PathBuf::from("three.flac")));
}

#[test]
fn now_playing_follows_current_changes() {
    let mut list = PointerList::new();
    for item in ["a", "b", "c"] {
        list.add(item);
    }
    let now_playing = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&now_playing);
    list.subscribe(move |event| {
        if let ListEvent::CurrentChanged { item } = event {
            sink.borrow_mut().push(*item);
        }
    });

    list.first();
    list.next();
    list.changed(&"b");
    list.remove(&"b");

    assert_eq!(*now_playing.borrow(), vec![Some("a"), Some("b"), None]);
}

#[test]
fn playlist_text_without_playing_entry() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("playlist.m3u");

    let mut list = PointerList::new();
    for name in ["one.flac", "two.flac"] {
        list.add(String::from(name));
    }
    list.last();
    let snapshot = list.snapshot(false).without_current();
    pointer_list::store::save_playlist_file(&path, &snapshot).expect("save");

    let loaded: pointer_list::ListSnapshot<String> =
        pointer_list::store::load_playlist_file(&path).expect("load");
    assert_eq!(loaded.items, list.items());
    assert_eq!(loaded.current, None);
}
