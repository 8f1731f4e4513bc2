use chrono::NaiveDate;
use lifeos_core::db::open_db_in_memory;
use lifeos_core::{
    critical_due_today_count, Clock, FlushPolicy, KvTaskRepository, MemoryStorage,
    MutationOutcome, NewTask, Persistence, Rejection, SqliteKvStorage, StoreConfig, Task, TaskId,
    TaskPatch, TaskPriority, TaskRepository, TaskStatus, TaskStore, TASKS_STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Advances by one second per call so creation order is observable.
struct StepClock(Cell<i64>);

impl Clock for StepClock {
    fn now_epoch_ms(&self) -> i64 {
        let now = self.0.get();
        self.0.set(now + 1_000);
        now
    }
}

fn store_on(storage: &MemoryStorage) -> TaskStore<KvTaskRepository<&MemoryStorage>> {
    TaskStore::with_clock(
        KvTaskRepository::new(storage),
        StoreConfig::default(),
        StepClock(Cell::new(1_700_000_000_000)),
    )
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date should be valid")
}

fn added_id(outcome: MutationOutcome<TaskId>) -> TaskId {
    outcome.into_value().expect("task should be added")
}

#[test]
fn add_task_creates_one_open_task_at_the_front() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let first = added_id(store.add_task("first"));

    let outcome = store.add_task(
        NewTask::new("  Call bank  ")
            .with_priority(TaskPriority::Critical)
            .with_due_date(Some(day(2025, 1, 2))),
    );

    assert_eq!(outcome.persistence(), Some(Persistence::Saved));
    let id = added_id(outcome);
    assert_eq!(store.len(), 2);
    let task = &store.tasks()[0];
    assert_eq!(task.id, id);
    assert_eq!(task.title, "Call bank");
    assert_eq!(task.priority, TaskPriority::Critical);
    assert_eq!(task.due_date, Some(day(2025, 1, 2)));
    assert_eq!(task.status, TaskStatus::Open);
    assert_eq!(store.tasks()[1].id, first);
    assert!(store.tasks()[0].created_at > store.tasks()[1].created_at);
}

#[test]
fn add_task_defaults_to_normal_without_due_date() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let id = added_id(store.add_task("stretch"));

    let task = store.get(id).expect("task should exist");
    assert_eq!(task.priority, TaskPriority::Normal);
    assert_eq!(task.due_date, None);
}

#[test]
fn add_whitespace_title_leaves_collection_unchanged() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    store.add_task("keep");
    let before = store.tasks().to_vec();

    let outcome = store.add_task("   ");

    assert_eq!(outcome, MutationOutcome::Rejected(Rejection::EmptyTitle));
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn toggle_twice_restores_original_status() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let id = added_id(store.add_task("read"));

    assert_eq!(store.toggle_task(id).into_value(), Some(TaskStatus::Done));
    assert_eq!(store.toggle_task(id).into_value(), Some(TaskStatus::Open));
    assert_eq!(store.get(id).expect("task should exist").status, TaskStatus::Open);
}

#[test]
fn unknown_ids_are_rejected_without_changes() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    store.add_task("a");
    store.add_task("b");
    let before = store.tasks().to_vec();
    let missing = TaskId::new();

    assert_eq!(
        store.remove_task(missing).rejection(),
        Some(&Rejection::UnknownTask(missing))
    );
    assert!(!store.toggle_task(missing).is_applied());
    assert!(!store
        .update_task(missing, TaskPatch::default().title("x"))
        .is_applied());
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn remove_task_deletes_permanently_and_returns_it() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let id = added_id(store.add_task("temporary"));

    let removed = store.remove_task(id).into_value().expect("mutation should apply");

    assert_eq!(removed.title, "temporary");
    assert!(store.get(id).is_none());
    assert!(KvTaskRepository::new(&storage).load().is_empty());
}

#[test]
fn update_task_changes_only_given_fields() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let id = added_id(
        store.add_task(NewTask::new("draft").with_due_date(Some(day(2025, 5, 1)))),
    );
    let created_at = store.get(id).expect("task should exist").created_at;

    let outcome = store.update_task(id, TaskPatch::default().priority(TaskPriority::Low));
    assert!(outcome.is_applied());

    let task = store.get(id).expect("task should exist");
    assert_eq!(task.title, "draft");
    assert_eq!(task.priority, TaskPriority::Low);
    assert_eq!(task.due_date, Some(day(2025, 5, 1)));
    assert_eq!(task.created_at, created_at);

    store.update_task(id, TaskPatch::default().title("  final  ").due_date(None));
    let task = store.get(id).expect("task should exist");
    assert_eq!(task.title, "final");
    assert_eq!(task.due_date, None);
}

#[test]
fn notes_and_tags_flow_through_add_update_and_reopen() {
    let storage = MemoryStorage::new();
    let id = {
        let mut store = store_on(&storage);
        let id = added_id(
            store.add_task(
                NewTask::new("Book flights")
                    .with_notes(Some(" window seat ".to_string()))
                    .with_tags(vec!["travel".to_string(), " ".to_string()]),
            ),
        );
        let task = store.get(id).expect("task should exist");
        assert_eq!(task.notes.as_deref(), Some("window seat"));
        assert_eq!(task.tags, vec!["travel"]);

        let outcome = store.update_task(id, TaskPatch::default().tags(Vec::new()));
        assert!(outcome.is_applied());
        id
    };

    let reopened = store_on(&storage);
    let task = reopened.get(id).expect("task should exist");
    assert_eq!(task.notes.as_deref(), Some("window seat"));
    assert!(task.tags.is_empty());
}

#[test]
fn update_task_rejects_blank_title_and_empty_patch() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let id = added_id(store.add_task("stable"));
    let before = store.get(id).expect("task should exist").clone();

    let blank = store.update_task(
        id,
        TaskPatch::default().title("   ").priority(TaskPriority::Critical),
    );
    assert_eq!(blank.rejection(), Some(&Rejection::EmptyTitle));
    assert_eq!(
        store.update_task(id, TaskPatch::default()).rejection(),
        Some(&Rejection::EmptyPatch)
    );
    assert_eq!(store.get(id).expect("task should exist"), &before);
}

#[test]
fn clear_done_removes_all_and_only_done_preserving_order() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let ids: Vec<TaskId> = ["a", "b", "c", "d", "e"]
        .into_iter()
        .map(|title| added_id(store.add_task(title)))
        .collect();
    store.toggle_task(ids[1]);
    store.toggle_task(ids[3]);
    let expected: Vec<Task> = store
        .tasks()
        .iter()
        .filter(|task| task.is_open())
        .cloned()
        .collect();

    assert_eq!(store.clear_done().into_value(), Some(2));
    assert_eq!(store.tasks(), expected.as_slice());
    assert_eq!(
        store.clear_done().rejection(),
        Some(&Rejection::NothingToClear)
    );
}

#[test]
fn subscribers_see_each_applied_change_until_unsubscribed() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = store.subscribe(move |tasks: &[Task]| sink.borrow_mut().push(tasks.len()));

    let id = added_id(store.add_task("one"));
    store.add_task("  ");
    store.toggle_task(id);
    store.add_task("two");
    assert_eq!(*seen.borrow(), vec![1, 1, 2]);

    assert!(store.unsubscribe(subscription));
    assert!(!store.unsubscribe(subscription));
    store.add_task("three");
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn persistence_failure_keeps_memory_authoritative() {
    let storage = MemoryStorage::new();
    let mut store = store_on(&storage);
    store.add_task("saved");
    storage.set_unavailable(true);

    let outcome = store.add_task("memory only");

    assert_eq!(outcome.persistence(), Some(Persistence::Failed));
    assert_eq!(store.len(), 2);
    assert!(store.has_pending_writes());

    storage.set_unavailable(false);
    assert_eq!(store.flush(), Persistence::Saved);
    assert_eq!(KvTaskRepository::new(&storage).load().len(), 2);
}

#[test]
fn quota_exceeded_is_reported_as_failed_persistence() {
    let storage = MemoryStorage::with_quota(8);
    let mut store = store_on(&storage);

    let outcome = store.add_task("does not fit");

    assert!(outcome.is_applied());
    assert_eq!(outcome.persistence(), Some(Persistence::Failed));
    assert_eq!(store.len(), 1);
}

#[test]
fn deferred_policy_writes_on_flush_and_drop() {
    let storage = MemoryStorage::new();
    let config = StoreConfig {
        flush_policy: FlushPolicy::Deferred,
    };
    {
        let mut store = TaskStore::open(KvTaskRepository::new(&storage), config.clone());
        let outcome = store.add_task("batched");
        assert_eq!(outcome.persistence(), Some(Persistence::Pending));
        assert!(storage.raw(TASKS_STORAGE_KEY).is_none());

        assert_eq!(store.flush(), Persistence::Saved);
        assert!(!store.has_pending_writes());
        assert_eq!(KvTaskRepository::new(&storage).load().len(), 1);

        store.add_task("written on drop");
    }
    assert_eq!(KvTaskRepository::new(&storage).load().len(), 2);
}

#[test]
fn reopening_store_hydrates_saved_tasks() {
    let storage = MemoryStorage::new();
    let id = {
        let mut store = store_on(&storage);
        let id = added_id(
            store.add_task(NewTask::new("persist me").with_priority(TaskPriority::Low)),
        );
        store.toggle_task(id);
        id
    };

    let reopened = store_on(&storage);
    let task = reopened.get(id).expect("task should exist");
    assert_eq!(task.title, "persist me");
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.priority, TaskPriority::Low);
}

#[test]
fn pay_invoice_scenario_end_to_end_on_sqlite() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    let mut store = TaskStore::open(
        KvTaskRepository::new(SqliteKvStorage::new(&conn)),
        StoreConfig::default(),
    );
    store.add_task("existing");
    let today = day(2025, 6, 3);
    let len_before = store.len();

    let id = added_id(
        store.add_task(
            NewTask::new("Pay invoice")
                .with_priority(TaskPriority::Critical)
                .with_due_date(Some(today)),
        ),
    );
    assert_eq!(critical_due_today_count(store.tasks(), today), 1);

    store.toggle_task(id);
    assert_eq!(critical_due_today_count(store.tasks(), today), 0);

    assert_eq!(store.clear_done().into_value(), Some(1));
    assert_eq!(store.len(), len_before);
    assert_eq!(store.repository().load().len(), len_before);
}
