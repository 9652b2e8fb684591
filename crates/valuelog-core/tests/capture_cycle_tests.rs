//! Cycle termination and aliased-node rendering.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use valuelog_core::capture::ADDRESS_NOTE_KEY;
use valuelog_core::{capture, diff, Capture, CapturedValue};

#[derive(Capture)]
struct Node {
    id: u32,
    next: Option<Rc<RefCell<Node>>>,
}

fn ring(len: u32) -> Rc<RefCell<Node>> {
    let head = Rc::new(RefCell::new(Node { id: 0, next: None }));
    let mut tail = head.clone();
    for id in 1..len {
        let node = Rc::new(RefCell::new(Node { id, next: None }));
        tail.borrow_mut().next = Some(node.clone());
        tail = node;
    }
    tail.borrow_mut().next = Some(head.clone());
    head
}

fn collect_back_references(value: &CapturedValue, out: &mut Vec<String>) {
    match value {
        CapturedValue::Text(text) if text.starts_with("(pointer: 0x") => out.push(text.clone()),
        CapturedValue::Array(items) => items.iter().for_each(|v| collect_back_references(v, out)),
        CapturedValue::Object(map) => map.values().for_each(|v| collect_back_references(v, out)),
        _ => {}
    }
}

fn count_address_notes(value: &CapturedValue) -> usize {
    match value {
        CapturedValue::Array(items) => items.iter().map(count_address_notes).sum(),
        CapturedValue::Object(map) => {
            usize::from(map.contains_key(ADDRESS_NOTE_KEY))
                + map.values().map(count_address_notes).sum::<usize>()
        }
        _ => 0,
    }
}

#[test]
fn test_self_cycle_terminates_with_one_back_reference() {
    let node = ring(1);
    let tree = capture(&node).unwrap();

    let note = tree.get(ADDRESS_NOTE_KEY).and_then(CapturedValue::as_text).unwrap();
    assert!(note.starts_with("Address: 0x"));
    assert_eq!(tree.get("id"), Some(&CapturedValue::from(0u64)));

    let mut refs = Vec::new();
    collect_back_references(&tree, &mut refs);
    assert_eq!(refs.len(), 1);
    // the back reference points at the rendered node
    assert_eq!(
        refs[0].trim_start_matches("(pointer: ").trim_end_matches(')'),
        note.trim_start_matches("Address: ")
    );
}

#[test]
fn test_cycle_back_to_the_root_renders_the_root_once() {
    let node = ring(1);
    let tree = capture(&*node).unwrap();

    // the root itself carries the note; its `next` is the back reference
    assert_eq!(count_address_notes(&tree), 1);
    assert!(tree.get(ADDRESS_NOTE_KEY).is_some());
    assert_eq!(tree.get("id"), Some(&CapturedValue::from(0u64)));
    let next = tree.get("next").and_then(CapturedValue::as_text).unwrap();
    assert!(next.starts_with("(pointer: 0x"));

    node.borrow_mut().next = None;
}

#[test]
fn test_overlapping_slices_are_not_aliases() {
    #[derive(Capture)]
    struct Views<'a> {
        head: &'a [u32],
        all: &'a [u32],
    }

    let buf = [1u32, 2, 3, 4, 5];
    let views = Views {
        head: &buf[..2],
        all: &buf[..],
    };
    let tree = capture(&views).unwrap();
    assert_eq!(tree.to_string(), r#"{"all":[1,2,3,4,5],"head":[1,2]}"#);
}

#[test]
fn test_boxed_slices_sharing_a_prefix_render_in_full() {
    let shared: Rc<[u32]> = Rc::from(&[0u32, 1, 2, 3][..]);
    let pair = (shared.clone(), &shared[..2]);
    let tree = capture(&pair).unwrap();
    assert_eq!(tree.to_string(), "[[0,1,2,3],[0,1]]");
}

#[test]
fn test_rings_render_every_node_once() {
    for len in [2, 3, 10] {
        let head = ring(len);
        let tree = capture(&head).unwrap();

        // only the head is reached twice
        assert_eq!(count_address_notes(&tree), 1, "ring of {}", len);
        let mut refs = Vec::new();
        collect_back_references(&tree, &mut refs);
        assert_eq!(refs.len(), 1, "ring of {}", len);

        let mut depth = 0;
        let mut cursor = &tree;
        while let Some(next) = cursor.get("next").filter(|n| n.as_object().is_some()) {
            depth += 1;
            cursor = next;
        }
        assert_eq!(depth, len - 1, "ring of {}", len);

        head.borrow_mut().next = None;
    }
}

#[test]
fn test_shared_leaf_vectors_render_once() {
    #[derive(Capture)]
    struct Pair {
        left: Rc<Vec<u32>>,
        right: Rc<Vec<u32>>,
    }

    let shared = Rc::new(vec![1, 2, 3]);
    let pair = Pair {
        left: shared.clone(),
        right: shared,
    };
    let tree = capture(&pair).unwrap();

    // arrays carry no address note; the second visit is a back reference
    assert_eq!(tree.get("left").unwrap().to_string(), "[1,2,3]");
    assert!(tree
        .get("right")
        .and_then(CapturedValue::as_text)
        .unwrap()
        .starts_with("(pointer: 0x"));
}

#[test]
fn test_unshared_graph_has_no_bookkeeping() {
    let list = Rc::new(RefCell::new(Node {
        id: 1,
        next: Some(Rc::new(RefCell::new(Node { id: 2, next: None }))),
    }));
    let tree = capture(&list).unwrap();
    assert_eq!(tree.to_string(), r#"{"id":1,"next":{"id":2,"next":null}}"#);
}

#[test]
fn test_same_static_string_twice_is_not_aliased() {
    let tree = capture(&("same", "same")).unwrap();
    assert_eq!(tree.to_string(), r#"["same","same"]"#);
}

#[test]
fn test_arc_mutex_cycle_terminates() {
    #[derive(Capture)]
    struct Shared {
        name: String,
        peer: Option<Arc<Mutex<Shared>>>,
    }

    let a = Arc::new(Mutex::new(Shared {
        name: "a".into(),
        peer: None,
    }));
    let b = Arc::new(Mutex::new(Shared {
        name: "b".into(),
        peer: Some(a.clone()),
    }));
    a.lock().unwrap().peer = Some(b.clone());

    let tree = capture(&a).unwrap();
    assert_eq!(tree.get("name"), Some(&CapturedValue::from("a")));
    assert_eq!(count_address_notes(&tree), 1);

    a.lock().unwrap().peer = None;
}

#[test]
fn test_cyclic_capture_is_idempotent_under_diff() {
    let head = ring(4);
    let first = capture(&head).unwrap();
    let second = capture(&head).unwrap();
    assert_eq!(diff(&first, &second), "");
    head.borrow_mut().next = None;
}
