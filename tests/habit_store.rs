use aquaritual::database::{self, DatabaseError, HABITS_KEY};
use aquaritual::{AquaError, BlobStore, Clock, Database, DayKey, FixedClock, Habit, HabitStore};
use std::rc::Rc;
use uuid::Uuid;

fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

fn setup(today: &str) -> (Rc<Database>, Rc<FixedClock>, HabitStore) {
    let db = Rc::new(Database::open_in_memory().unwrap());
    let clock = Rc::new(FixedClock::new(day(today)));
    let store = HabitStore::load(db.clone(), clock.clone());
    (db, clock, store)
}

#[test]
fn add_creates_habit_with_empty_history() {
    let (_db, _clock, mut store) = setup("2024-06-01");

    let habit = store.add("Drink water").unwrap();

    assert_eq!(store.habits().len(), 1);
    assert_eq!(store.habits()[0].title, "Drink water");
    assert!(store.habits()[0].completed_day_keys.is_empty());
    assert_eq!(store.habits()[0].id, habit.id);
}

#[test]
fn add_trims_title() {
    let (_db, _clock, mut store) = setup("2024-06-01");
    let habit = store.add("  Read  ").unwrap();
    assert_eq!(habit.title, "Read");
}

#[test]
fn add_rejects_blank_title() {
    let (_db, _clock, mut store) = setup("2024-06-01");

    assert!(matches!(store.add(""), Err(AquaError::InvalidInput(_))));
    assert!(matches!(store.add("   \t"), Err(AquaError::InvalidInput(_))));
    assert!(store.habits().is_empty());
}

#[test]
fn toggle_alternates_and_restores_history() {
    let (_db, clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;

    let before = store.get(id).unwrap().completed_day_keys.clone();
    assert!(store.toggle(id).unwrap().completed_now);
    assert!(store.get(id).unwrap().is_completed_on(clock.today()));
    assert!(!store.toggle(id).unwrap().completed_now);
    assert_eq!(store.get(id).unwrap().completed_day_keys, before);
    assert!(store.toggle(id).unwrap().completed_now);
}

#[test]
fn toggle_only_touches_today() {
    let (_db, clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;

    store.toggle(id).unwrap();
    clock.advance(1);
    assert!(!store.is_completed_today(id));
    assert!(store.toggle(id).unwrap().completed_now);

    let keys: Vec<DayKey> = store.get(id).unwrap().completed_day_keys.iter().copied().collect();
    assert_eq!(keys, vec![day("2024-06-01"), day("2024-06-02")]);
}

#[test]
fn toggle_unknown_id_is_not_found() {
    let (_db, _clock, mut store) = setup("2024-06-01");
    store.add("Walk").unwrap();

    let missing = Uuid::new_v4();
    assert!(matches!(store.toggle(missing), Err(AquaError::NotFound(id)) if id == missing));
}

#[test]
fn delete_is_idempotent() {
    let (_db, _clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;
    store.add("Read").unwrap();

    assert!(store.delete(id).unwrap());
    assert!(!store.delete(id).unwrap());
    assert!(!store.delete(Uuid::new_v4()).unwrap());

    assert_eq!(store.habits().len(), 1);
    assert_eq!(store.habits()[0].title, "Read");
}

#[test]
fn daily_progress_is_completed_fraction() {
    let (_db, _clock, mut store) = setup("2024-06-01");
    assert_eq!(store.daily_progress(), 0.0);

    let ids: Vec<Uuid> = ["a", "b", "c", "d"]
        .iter()
        .map(|t| store.add(t).unwrap().id)
        .collect();
    assert_eq!(store.daily_progress(), 0.0);

    store.toggle(ids[0]).unwrap();
    assert_eq!(store.daily_progress(), 0.25);
    store.toggle(ids[2]).unwrap();
    store.toggle(ids[3]).unwrap();
    assert_eq!(store.daily_progress(), 0.75);
}

#[test]
fn streak_survives_open_today() {
    let (_db, clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;

    // D-3, D-2, D-1 done, today not yet
    for _ in 0..3 {
        store.toggle(id).unwrap();
        clock.advance(1);
    }
    assert_eq!(clock.today(), day("2024-06-04"));
    assert_eq!(store.streak(), 3);

    store.toggle(id).unwrap();
    assert_eq!(store.streak(), 4);
}

#[test]
fn gap_before_yesterday_leaves_streak_of_one() {
    let (_db, clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;

    store.toggle(id).unwrap(); // D-3
    clock.advance(2);
    store.toggle(id).unwrap(); // D-1
    clock.advance(1);

    assert_eq!(store.streak(), 1);
}

#[test]
fn streak_counts_days_across_habits() {
    let (_db, clock, mut store) = setup("2024-06-01");
    let walk = store.add("Walk").unwrap().id;
    let read = store.add("Read").unwrap().id;

    store.toggle(walk).unwrap();
    clock.advance(1);
    store.toggle(read).unwrap();
    clock.advance(1);
    store.toggle(walk).unwrap();
    store.toggle(read).unwrap();

    assert_eq!(store.streak(), 3);
}

#[test]
fn missing_two_days_resets_streak() {
    let (_db, clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;
    store.toggle(id).unwrap();

    clock.advance(2);
    assert_eq!(store.streak(), 0);
}

#[test]
fn state_survives_reload() {
    let (db, clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;
    store.toggle(id).unwrap();

    let reloaded = HabitStore::load(db.clone(), clock.clone());
    assert_eq!(reloaded.habits(), store.habits());
    assert!(reloaded.is_completed_today(id));
}

#[test]
fn persisted_day_keys_are_plain_dates() {
    let (db, _clock, mut store) = setup("2024-06-01");
    let id = store.add("Walk").unwrap().id;
    store.toggle(id).unwrap();

    let raw = db.read_blob(HABITS_KEY).unwrap().unwrap();
    assert!(raw.contains("\"2024-06-01\""));
}

#[test]
fn corrupt_blob_falls_back_to_empty() {
    let db = Rc::new(Database::open_in_memory().unwrap());
    db.write_blob(HABITS_KEY, "[{\"broken\":").unwrap();
    let clock = Rc::new(FixedClock::new(day("2024-06-01")));

    let store = HabitStore::load(db.clone(), clock);
    assert!(store.habits().is_empty());
}

#[test]
fn loads_habits_written_elsewhere() {
    let db = Rc::new(Database::open_in_memory().unwrap());
    let mut habit = Habit::new("Meditate".to_string());
    habit.completed_day_keys.insert(day("2024-05-31"));
    database::save_json(db.as_ref(), HABITS_KEY, &vec![habit.clone()]).unwrap();

    let clock = Rc::new(FixedClock::new(day("2024-06-01")));
    let store = HabitStore::load(db.clone(), clock);
    assert_eq!(store.habits(), &[habit]);
    assert_eq!(store.streak(), 1);
}

struct ReadOnlyStore;

impl BlobStore for ReadOnlyStore {
    fn read_blob(&self, _key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(None)
    }

    fn write_blob(&self, _key: &str, _value: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::DirectoryError("read-only".to_string()))
    }
}

#[test]
fn write_failure_is_surfaced_and_memory_kept() {
    let clock = Rc::new(FixedClock::new(day("2024-06-01")));
    let mut store = HabitStore::load(Rc::new(ReadOnlyStore), clock);

    let result = store.add("Walk");
    assert!(matches!(result, Err(AquaError::PersistenceFailure(_))));
    assert_eq!(store.habits().len(), 1);
}
