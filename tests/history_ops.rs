use pixelsketch::HistoryManager;

fn snapshot(tag: u8) -> Vec<u8> {
    vec![tag; 8]
}

#[test]
fn pushing_an_unchanged_snapshot_is_a_no_op() {
    let mut history = HistoryManager::new();
    assert!(history.push(snapshot(1)));
    assert!(!history.push(snapshot(1)));
    assert_eq!(history.len(), 1);
    assert_eq!(history.cursor(), 0);
}

#[test]
fn sequence_is_bounded_with_fifo_eviction() {
    let mut history = HistoryManager::with_max_len(3);
    for tag in 0..5 {
        assert!(history.push(snapshot(tag)));
    }
    assert_eq!(history.len(), 3);
    // Oldest entries dropped first: 2, 3, 4 remain.
    let tags: Vec<u8> = history.entries().iter().map(|e| e.bytes()[0]).collect();
    assert_eq!(tags, vec![2, 3, 4]);
    assert_eq!(history.cursor(), 2);
}

#[test]
fn undo_then_edit_truncates_the_forward_branch() {
    let mut history = HistoryManager::new();
    history.push(snapshot(1));
    history.push(snapshot(2));
    history.push(snapshot(3));

    assert!(history.undo().is_some());
    assert!(history.can_redo());

    history.push(snapshot(9));
    assert!(!history.can_redo());
    let tags: Vec<u8> = history.entries().iter().map(|e| e.bytes()[0]).collect();
    assert_eq!(tags, vec![1, 2, 9]);
}

#[test]
fn undo_redo_round_trip_restores_both_ends() {
    let mut history = HistoryManager::new();
    let initial = snapshot(0);
    history.push(initial.clone());
    for tag in 1..=4 {
        history.push(snapshot(tag));
    }

    for _ in 0..4 {
        assert!(history.undo().is_some());
    }
    assert_eq!(history.entry(history.cursor()).unwrap().bytes(), &initial[..]);
    assert!(history.undo().is_none(), "already at the front");

    for _ in 0..4 {
        assert!(history.redo().is_some());
    }
    assert_eq!(history.entry(history.cursor()).unwrap().bytes(), &snapshot(4)[..]);
    assert!(history.redo().is_none(), "already at the tail");
}

#[test]
fn entries_compare_by_content_not_identity() {
    let mut history = HistoryManager::new();
    history.push(snapshot(1));
    history.push(snapshot(2));
    // Going back and pushing the snapshot already under the cursor must
    // not create a branch.
    history.undo();
    assert!(!history.push(snapshot(1)));
    assert!(history.can_redo());
}
