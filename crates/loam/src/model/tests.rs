use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::events::{Events, ModelEvent};
use crate::test_support::FakeConnection;

#[derive(Debug, Clone, Default)]
struct User {
    base: BaseModel,
    name: String,
    email: Option<String>,
}

impl FieldSet for User {
    fn columns() -> Vec<&'static str> {
        let mut columns = BaseModel::columns();
        columns.extend(["name", "email"]);
        columns
    }

    fn get_field(&self, column: &str) -> Option<Value> {
        match column {
            "name" => Some(self.name.to_value()),
            "email" => Some(self.email.to_value()),
            _ => self.base.get_field(column),
        }
    }

    fn set_field(&mut self, column: &str, value: Value) -> OrmResult<bool> {
        match column {
            "name" => {
                self.name = FromValue::from_value(value).map_err(|m| OrmError::decode(column, m))?;
                Ok(true)
            }
            "email" => {
                self.email =
                    FromValue::from_value(value).map_err(|m| OrmError::decode(column, m))?;
                Ok(true)
            }
            _ => self.base.set_field(column, value),
        }
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Model::hydrate(row)
    }
}

impl Model for User {
    fn table() -> &'static str {
        "users"
    }

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }
}

fn recording_events(seen: &Rc<RefCell<Vec<&'static str>>>) -> Events<User> {
    let mut events = Events::new();
    let log = Rc::clone(seen);
    events.on_any(move |event: ModelEvent, _: &mut User| {
        log.borrow_mut().push(event.as_str());
        Ok(())
    });
    events
}

#[test]
fn create_marks_clean_and_existing() {
    let conn = FakeConnection::sqlite();
    conn.next_insert_id.set(11);

    let mut user = User {
        name: "ada".into(),
        ..Default::default()
    };
    user.create(&conn, &Events::default()).unwrap();

    assert_eq!(user.id(), 11);
    assert!(user.exists());
    assert!(!user.is_dirty());
    assert!(user.base.created_at.is_some());

    let (sql, _) = conn.last_statement();
    assert!(sql.starts_with("INSERT INTO users ("), "got: {}", sql);
    assert!(!sql.contains("(id"), "primary key must not be inserted: {}", sql);
    assert!(sql.contains("name"));
}

#[test]
fn create_dispatches_events_in_order() {
    let conn = FakeConnection::sqlite();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let events = recording_events(&seen);

    let mut user = User::default();
    user.create(&conn, &events).unwrap();
    assert_eq!(*seen.borrow(), vec!["saving", "creating", "created", "saved"]);
}

#[test]
fn aborted_creating_listener_prevents_insert() {
    let conn = FakeConnection::sqlite();
    let mut events = Events::<User>::new();
    events.on(ModelEvent::Creating, |_, _: &mut User| {
        Err(OrmError::Unsupported("blocked".into()))
    });

    let mut user = User::default();
    let err = user.create(&conn, &events).unwrap_err();
    assert!(err.is_event_aborted());
    assert!(conn.statements().is_empty(), "no SQL may run after an abort");
    assert!(!user.exists());
}

#[test]
fn update_without_changes_performs_no_io() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();
    user.create(&conn, &Events::default()).unwrap();
    let statements_after_create = conn.statements().len();

    user.update(&conn, &Events::default()).unwrap();
    assert_eq!(conn.statements().len(), statements_after_create);
}

#[test]
fn update_writes_only_dirty_columns() {
    let conn = FakeConnection::sqlite();
    let mut user = User {
        name: "ada".into(),
        email: Some("ada@example.com".into()),
        ..Default::default()
    };
    user.create(&conn, &Events::default()).unwrap();

    user.name = "ada lovelace".into();
    user.update(&conn, &Events::default()).unwrap();

    let (sql, params) = conn.last_statement();
    assert!(sql.starts_with("UPDATE users SET "), "got: {}", sql);
    assert!(sql.contains("name = ?"));
    assert!(sql.contains("updated_at = ?"));
    assert!(!sql.contains("email = ?"), "clean column written: {}", sql);
    assert!(sql.ends_with("WHERE id = ?"));
    assert_eq!(params.last(), Some(&Value::Int(user.id())));
    assert!(!user.is_dirty());
}

#[test]
fn reverted_change_is_not_dirty() {
    let conn = FakeConnection::sqlite();
    let mut user = User {
        name: "ada".into(),
        ..Default::default()
    };
    user.create(&conn, &Events::default()).unwrap();

    user.name = "grace".into();
    assert!(user.is_dirty());
    user.name = "ada".into();
    assert!(!user.is_dirty());
}

#[test]
fn update_with_stale_id_reports_no_rows_affected() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();
    user.create(&conn, &Events::default()).unwrap();

    user.name = "ghost".into();
    conn.rows_affected.set(0);
    let err = user.update(&conn, &Events::default()).unwrap_err();
    assert!(err.is_no_rows_affected());
}

#[test]
fn save_routes_on_existence() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();

    user.save(&conn, &Events::default()).unwrap();
    let (sql, _) = conn.last_statement();
    assert!(sql.starts_with("INSERT"));

    user.name = "ada".into();
    user.save(&conn, &Events::default()).unwrap();
    let (sql, _) = conn.last_statement();
    assert!(sql.starts_with("UPDATE"));
}

#[test]
fn soft_delete_stamps_and_unmarks_existence() {
    let conn = FakeConnection::sqlite();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let events = recording_events(&seen);

    let mut user = User::default();
    user.create(&conn, &events).unwrap();
    seen.borrow_mut().clear();

    user.delete(&conn, &events).unwrap();
    assert!(!user.exists());
    assert!(user.base.deleted_at.is_some());
    assert_eq!(*seen.borrow(), vec!["deleting", "deleted"]);

    let (sql, _) = conn.last_statement();
    assert!(sql.starts_with("UPDATE users SET deleted_at = ?"), "got: {}", sql);
}

#[test]
fn delete_requires_identifier() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();
    let err = user.delete(&conn, &Events::default()).unwrap_err();
    assert!(matches!(err, OrmError::Unsupported(_)));
}

#[test]
fn delete_with_stale_id_reports_no_rows_affected() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();
    user.create(&conn, &Events::default()).unwrap();

    conn.rows_affected.set(0);
    let err = user.delete(&conn, &Events::default()).unwrap_err();
    assert!(err.is_no_rows_affected());
}

#[test]
fn force_delete_issues_true_delete() {
    let conn = FakeConnection::sqlite();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let events = recording_events(&seen);

    let mut user = User::default();
    user.create(&conn, &events).unwrap();
    seen.borrow_mut().clear();

    user.force_delete(&conn, &events).unwrap();
    assert!(!user.exists());
    assert_eq!(*seen.borrow(), vec!["deleting", "deleted"]);

    let (sql, _) = conn.last_statement();
    assert_eq!(sql, "DELETE FROM users WHERE id = ?");
}

#[test]
fn restore_clears_deletion_and_fires_no_events() {
    let conn = FakeConnection::sqlite();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let events = recording_events(&seen);

    let mut user = User::default();
    user.create(&conn, &events).unwrap();
    user.delete(&conn, &events).unwrap();
    seen.borrow_mut().clear();

    user.restore(&conn).unwrap();
    assert!(user.exists());
    assert!(user.base.deleted_at.is_none());
    // Deliberate asymmetry with delete.
    assert!(seen.borrow().is_empty());

    let (sql, params) = conn.last_statement();
    assert!(sql.starts_with("UPDATE users SET deleted_at = ?"));
    assert_eq!(params[0], Value::Null);
}

#[test]
fn restore_persists_the_stamp_it_keeps_in_memory() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();
    user.create(&conn, &Events::default()).unwrap();
    user.delete(&conn, &Events::default()).unwrap();

    user.restore(&conn).unwrap();
    let (_, params) = conn.last_statement();
    // SET deleted_at = ?, updated_at = ? WHERE id = ?
    assert_eq!(params[1], Value::DateTime(user.base.updated_at.unwrap()));
}

#[test]
fn hydration_marks_existing_and_clean() {
    let row = Row::new(
        vec![
            "id".into(),
            "name".into(),
            "email".into(),
            "ignored_extra".into(),
        ],
        vec![
            Value::Int(5),
            Value::Text("ada".into()),
            Value::Null,
            Value::Text("discarded".into()),
        ],
    );
    let user = User::from_row(&row).unwrap();
    assert_eq!(user.id(), 5);
    assert_eq!(user.name, "ada");
    assert_eq!(user.email, None);
    assert!(user.exists());
    assert!(!user.is_dirty());
}

#[test]
fn find_queries_by_id() {
    let conn = FakeConnection::sqlite();
    conn.queue_result(vec![Row::new(
        vec!["id".into(), "name".into()],
        vec![Value::Int(3), Value::Text("ada".into())],
    )]);

    let user = User::find(&conn, 3).unwrap().unwrap();
    assert_eq!(user.id(), 3);

    let (sql, params) = conn.last_statement();
    assert!(sql.contains("WHERE id = ?"));
    assert_eq!(params[0], Value::Int(3));
}

#[test]
fn fresh_reloads_including_trashed() {
    let conn = FakeConnection::sqlite();
    let mut user = User::default();
    user.create(&conn, &Events::default()).unwrap();

    conn.queue_result(vec![Row::new(
        vec!["id".into(), "name".into()],
        vec![Value::Int(user.id()), Value::Text("fresh".into())],
    )]);
    let reloaded = user.fresh(&conn).unwrap().unwrap();
    assert_eq!(reloaded.name, "fresh");

    let (sql, _) = conn.last_statement();
    assert!(!sql.contains("deleted_at IS NULL"), "fresh must see trashed rows");
}
