use super::*;
use proptest::prelude::*;

fn add(
    queue: &mut TaskQueue,
    scheduler: &mut SessionScheduler,
    kind: TaskKind,
) -> Result<TaskId, FarmError> {
    let description = describe_task(&kind);
    let cost = task_cost(&kind);
    queue.add(description, kind, cost, scheduler)
}

#[test]
fn test_cost_table() {
    assert_eq!(task_cost(&investigate("A1")), 1);
    assert_eq!(task_cost(&irrigate("A1", 20.0)), 2);
    assert_eq!(task_cost(&pesticide("A1")), 1);
}

#[test]
fn test_descriptions() {
    assert_eq!(describe_task(&investigate("B3")), "Investigate B3");
    assert_eq!(
        describe_task(&TaskKind::Irrigate {
            target: TaskTarget::All,
            depth_mm: 20.0
        }),
        "Irrigate ALL 20mm"
    );
    assert_eq!(describe_task(&irrigate("C2", 12.5)), "Irrigate C2 12.5mm");
    assert_eq!(describe_task(&pesticide("D4")), "Pesticide D4");
}

#[test]
fn test_add_assigns_ids_from_one_and_charges_budget() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();

    let first = add(&mut queue, &mut scheduler, investigate("A1")).unwrap();
    let second = add(&mut queue, &mut scheduler, irrigate("A2", 20.0)).unwrap();

    assert_eq!(first, TaskId(1));
    assert_eq!(second, TaskId(2));
    assert_eq!(scheduler.activity_points_used(), 3);
    assert_eq!(queue.total_cost(), 3);
    assert_eq!(queue.pending()[1].created_session_date, date(1979, 10, 1));
}

#[test]
fn test_add_over_budget_leaves_state_untouched() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    add(&mut queue, &mut scheduler, irrigate("A1", 20.0)).unwrap();
    add(&mut queue, &mut scheduler, irrigate("B1", 20.0)).unwrap();
    assert_eq!(scheduler.activity_points_used(), 4);

    let result = add(&mut queue, &mut scheduler, pesticide("C1"));

    assert!(matches!(result, Err(FarmError::BudgetExceeded { cost: 1, used: 4, max: 4 })));
    assert_eq!(scheduler.activity_points_used(), 4);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.next_id(), TaskId(3), "rejected add must not consume an id");
}

#[test]
fn test_zero_cost_rejected() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    let result = queue.add("free", investigate("A1"), 0, &mut scheduler);
    assert_eq!(result, Err(FarmError::InvalidCost));
    assert!(queue.is_empty());
}

#[test]
fn test_remove_refunds_cost() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    add(&mut queue, &mut scheduler, investigate("A1")).unwrap();
    let irrigation = add(&mut queue, &mut scheduler, irrigate("A2", 20.0)).unwrap();
    assert_eq!(scheduler.activity_points_used(), 3);

    let removed = queue.remove(irrigation, &mut scheduler).unwrap();

    assert_eq!(removed.cost, 2);
    assert_eq!(scheduler.activity_points_used(), 1);
    assert!(queue.get(irrigation).is_none());
}

#[test]
fn test_remove_unknown_id_leaves_state_untouched() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    add(&mut queue, &mut scheduler, investigate("A1")).unwrap();

    let result = queue.remove(TaskId(9), &mut scheduler);

    assert_eq!(result, Err(FarmError::NotFound(TaskId(9))));
    assert_eq!(queue.len(), 1);
    assert_eq!(scheduler.activity_points_used(), 1);
}

#[test]
fn test_ids_not_reused_after_remove() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    let first = add(&mut queue, &mut scheduler, investigate("A1")).unwrap();
    queue.remove(first, &mut scheduler).unwrap();

    let next = add(&mut queue, &mut scheduler, investigate("A1")).unwrap();
    assert_eq!(next, TaskId(2));
}

#[test]
fn test_commit_groups_same_date_into_one_entry() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    let mut journal = JournalLedger::new();
    add(&mut queue, &mut scheduler, investigate("B3")).unwrap();
    add(&mut queue, &mut scheduler, pesticide("D4")).unwrap();
    add(&mut queue, &mut scheduler, investigate("A1")).unwrap();

    let committed = queue.commit_and_clear(&mut journal);

    assert_eq!(committed.len(), 3);
    assert!(queue.is_empty());
    assert_eq!(journal.len(), 1);
    assert_eq!(journal.entries()[0].session_date, date(1979, 10, 1));
    assert_eq!(
        journal.entries()[0].descriptions,
        vec!["Investigate B3", "Pesticide D4", "Investigate A1"]
    );
}

#[test]
fn test_commit_splits_by_creation_date() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    let mut journal = JournalLedger::new();
    add(&mut queue, &mut scheduler, investigate("A1")).unwrap();
    scheduler.on_session_advanced(ClockReading {
        date: date(1979, 10, 31),
        season_index: 0,
    });
    add(&mut queue, &mut scheduler, investigate("A2")).unwrap();
    add(&mut queue, &mut scheduler, investigate("A3")).unwrap();

    queue.commit_and_clear(&mut journal);

    assert_eq!(journal.len(), 2);
    assert_eq!(journal.entries()[0].descriptions, vec!["Investigate A1"]);
    assert_eq!(journal.entries()[1].session_date, date(1979, 10, 31));
    assert_eq!(
        journal.entries()[1].descriptions,
        vec!["Investigate A2", "Investigate A3"]
    );
}

#[test]
fn test_commit_of_empty_queue_appends_nothing() {
    let mut queue = TaskQueue::new();
    let mut journal = JournalLedger::new();
    assert!(queue.commit_and_clear(&mut journal).is_empty());
    assert!(journal.is_empty());
}

#[test]
fn test_commit_does_not_reset_id_counter() {
    let mut scheduler = scheduler_at(4);
    let mut queue = TaskQueue::new();
    let mut journal = JournalLedger::new();
    add(&mut queue, &mut scheduler, investigate("A1")).unwrap();
    add(&mut queue, &mut scheduler, investigate("A2")).unwrap();
    queue.commit_and_clear(&mut journal);

    assert_eq!(add(&mut queue, &mut scheduler, investigate("A3")).unwrap(), TaskId(3));
}

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Remove(usize),
    Commit,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1u32..=3).prop_map(Op::Add),
        3 => (0usize..6).prop_map(Op::Remove),
        1 => Just(Op::Commit),
    ]
}

proptest! {
    #[test]
    fn prop_budget_conserved_and_ids_monotonic(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut scheduler = scheduler_at(4);
        let mut queue = TaskQueue::new();
        let mut journal = JournalLedger::new();
        let mut last_id = 0u64;

        for op in ops {
            match op {
                Op::Add(cost) => {
                    let before = queue.len();
                    match queue.add("task", investigate("A1"), cost, &mut scheduler) {
                        Ok(id) => {
                            prop_assert!(id.0 > last_id);
                            last_id = id.0;
                        }
                        Err(err) => {
                            prop_assert!(
                                matches!(err, FarmError::BudgetExceeded { .. }),
                                "unexpected error {:?}",
                                err
                            );
                            prop_assert_eq!(queue.len(), before);
                        }
                    }
                }
                Op::Remove(slot) => {
                    let id = queue.pending().get(slot).map_or(TaskId(u64::MAX), |t| t.id);
                    let _ = queue.remove(id, &mut scheduler);
                }
                Op::Commit => {
                    queue.commit_and_clear(&mut journal);
                    scheduler.on_session_advanced(ClockReading {
                        date: scheduler.current_session_date().succ_opt().unwrap(),
                        season_index: 0,
                    });
                }
            }
            prop_assert_eq!(scheduler.activity_points_used(), queue.total_cost());
            prop_assert!(scheduler.activity_points_used() <= scheduler.max_activity_points());
        }
    }
}
