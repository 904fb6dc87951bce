use super::*;
use crate::test_support::FakeConnection;

fn build(dialect: Dialect, mode_create: bool, f: impl FnOnce(&mut Blueprint)) -> Vec<String> {
    let mut blueprint = if mode_create {
        Blueprint::create("t")
    } else {
        Blueprint::alter("t")
    };
    f(&mut blueprint);
    blueprint.build(dialect)
}

#[test]
fn sqlite_identity_column() {
    let stmts = build(Dialect::Sqlite, true, |t| {
        t.id();
    });
    assert_eq!(
        stmts,
        vec!["CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT)"]
    );
}

#[test]
fn identity_never_mixes_dialect_spellings() {
    for dialect in [Dialect::Mysql, Dialect::Postgres, Dialect::Sqlite] {
        let stmts = build(dialect, true, |t| {
            t.id();
        });
        assert!(
            !stmts[0].contains("BIGINT NOT NULL AUTOINCREMENT"),
            "{:?}: {}",
            dialect,
            stmts[0]
        );
    }
}

#[test]
fn mysql_identity_column() {
    let stmts = build(Dialect::Mysql, true, |t| {
        t.id();
    });
    assert_eq!(
        stmts,
        vec!["CREATE TABLE t (id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY)"]
    );
}

#[test]
fn postgres_identity_column() {
    let stmts = build(Dialect::Postgres, true, |t| {
        t.id();
    });
    assert_eq!(stmts, vec!["CREATE TABLE t (id BIGSERIAL PRIMARY KEY)"]);
}

#[test]
fn create_users_full_shape() {
    let stmts = build(Dialect::Sqlite, true, |t| {
        t.id();
        t.string("email", 255).unique();
        t.string("name", 100);
        t.timestamps();
        t.soft_deletes();
    });
    assert_eq!(
        stmts,
        vec![
            "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             email VARCHAR(255) NOT NULL UNIQUE, \
             name VARCHAR(100) NOT NULL, \
             created_at DATETIME, \
             updated_at DATETIME, \
             deleted_at DATETIME)"
        ]
    );
}

#[test]
fn default_and_nullable_modifiers() {
    let stmts = build(Dialect::Postgres, true, |t| {
        t.boolean("active").default_to(true);
        t.integer("score").nullable();
    });
    assert_eq!(
        stmts,
        vec!["CREATE TABLE t (active BOOLEAN NOT NULL DEFAULT 1, score INTEGER)"]
    );
}

#[test]
fn text_default_is_escaped() {
    let stmts = build(Dialect::Sqlite, true, |t| {
        t.string("nick", 50).default_to("o'brien");
    });
    assert!(stmts[0].contains("DEFAULT 'o''brien'"), "got: {}", stmts[0]);
}

#[test]
fn enum_emulated_with_check_on_sqlite_and_postgres() {
    let sqlite = build(Dialect::Sqlite, true, |t| {
        t.enumeration("status", &["draft", "live"]);
    });
    assert!(
        sqlite[0].contains("status TEXT CHECK (status IN ('draft', 'live'))"),
        "got: {}",
        sqlite[0]
    );

    let pg = build(Dialect::Postgres, true, |t| {
        t.enumeration("status", &["draft", "live"]);
    });
    assert!(
        pg[0].contains("status VARCHAR(255) CHECK (status IN ('draft', 'live'))"),
        "got: {}",
        pg[0]
    );

    let mysql = build(Dialect::Mysql, true, |t| {
        t.enumeration("status", &["draft", "live"]);
    });
    assert!(
        mysql[0].contains("status ENUM('draft', 'live')"),
        "got: {}",
        mysql[0]
    );
}

#[test]
fn sqlite_foreign_key_stays_inside_create() {
    let stmts = build(Dialect::Sqlite, true, |t| {
        t.id();
        t.big_integer("user_id");
        t.foreign("user_id").references("id").on("users").on_delete("cascade");
    });
    assert_eq!(stmts.len(), 1, "sqlite must not emit ALTER for keys: {:?}", stmts);
    assert!(
        stmts[0].ends_with("FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE)"),
        "got: {}",
        stmts[0]
    );
}

#[test]
fn mysql_foreign_key_as_named_constraint() {
    let stmts = build(Dialect::Mysql, true, |t| {
        t.id();
        t.big_integer("user_id");
        t.foreign("user_id").references("id").on("users");
    });
    assert_eq!(stmts.len(), 2);
    assert_eq!(
        stmts[1],
        "ALTER TABLE t ADD CONSTRAINT t_user_id_foreign \
         FOREIGN KEY (user_id) REFERENCES users (id)"
    );
}

#[test]
fn sqlite_alter_emits_one_statement_per_column() {
    let stmts = build(Dialect::Sqlite, false, |t| {
        t.string("bio", 500).nullable();
        t.integer("age").nullable();
    });
    assert_eq!(
        stmts,
        vec![
            "ALTER TABLE t ADD COLUMN bio VARCHAR(500)",
            "ALTER TABLE t ADD COLUMN age INTEGER",
        ]
    );
}

#[test]
fn postgres_alter_combines_added_columns() {
    let stmts = build(Dialect::Postgres, false, |t| {
        t.string("bio", 500).nullable();
        t.integer("age").nullable();
    });
    assert_eq!(
        stmts,
        vec!["ALTER TABLE t ADD COLUMN bio VARCHAR(500), ADD COLUMN age INTEGER"]
    );
}

#[test]
fn sqlite_alter_skips_foreign_keys() {
    let stmts = build(Dialect::Sqlite, false, |t| {
        t.big_integer("team_id");
        t.foreign("team_id").on("teams");
    });
    assert_eq!(stmts, vec!["ALTER TABLE t ADD COLUMN team_id BIGINT NOT NULL"]);
}

#[test]
fn indexes_are_separate_statements_with_derived_names() {
    let stmts = build(Dialect::Postgres, true, |t| {
        t.id();
        t.string("email", 255);
        t.unique_index(&["email"]);
        t.index(&["email", "id"]);
    });
    assert_eq!(stmts[1], "CREATE UNIQUE INDEX t_email_unique ON t (email)");
    assert_eq!(stmts[2], "CREATE INDEX t_email_id_index ON t (email, id)");
}

#[test]
fn morphs_adds_pair_and_index() {
    let stmts = build(Dialect::Sqlite, true, |t| {
        t.morphs("owner");
    });
    assert!(stmts[0].contains("owner_id BIGINT NOT NULL"));
    assert!(stmts[0].contains("owner_type VARCHAR(255) NOT NULL"));
    assert_eq!(
        stmts[1],
        "CREATE INDEX t_owner_id_owner_type_index ON t (owner_id, owner_type)"
    );
}

#[test]
fn comments_follow_dialect_rules() {
    let mysql = build(Dialect::Mysql, true, |t| {
        t.string("email", 255).comment("login address");
    });
    assert!(
        mysql[0].contains("email VARCHAR(255) NOT NULL COMMENT 'login address'"),
        "got: {}",
        mysql[0]
    );

    let pg = build(Dialect::Postgres, true, |t| {
        t.string("email", 255).comment("login address");
    });
    assert_eq!(
        pg[1],
        "COMMENT ON COLUMN t.email IS 'login address'"
    );

    let sqlite = build(Dialect::Sqlite, true, |t| {
        t.string("email", 255).comment("login address");
    });
    assert_eq!(sqlite.len(), 1);
    assert!(!sqlite[0].contains("login address"));
}

#[test]
fn schema_executes_statements_in_order() {
    let conn = FakeConnection::sqlite();
    Schema::create(&conn, "users", |t| {
        t.id();
        t.string("email", 255);
        t.unique_index(&["email"]);
    })
    .unwrap();

    let statements = conn.statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE TABLE users ("));
    assert!(statements[1].starts_with("CREATE UNIQUE INDEX"));
    assert!(conn.has_table("users"));
}

#[test]
fn has_table_probes_the_catalog() {
    let conn = FakeConnection::sqlite();
    assert!(!Schema::has_table(&conn, "users").unwrap());

    Schema::create(&conn, "users", |t| {
        t.id();
    })
    .unwrap();
    assert!(Schema::has_table(&conn, "users").unwrap());

    let (sql, params) = conn.last_statement();
    assert!(sql.contains("sqlite_master"));
    assert_eq!(params[0], Value::Text("users".into()));
}

#[test]
fn drop_variants() {
    let conn = FakeConnection::sqlite();
    Schema::create(&conn, "users", |t| {
        t.id();
    })
    .unwrap();

    Schema::drop(&conn, "users").unwrap();
    assert!(!conn.has_table("users"));

    Schema::drop_if_exists(&conn, "users").unwrap();
    let (sql, _) = conn.last_statement();
    assert_eq!(sql, "DROP TABLE IF EXISTS users");
}

#[test]
fn rename_is_portable_alter() {
    let conn = FakeConnection::sqlite();
    Schema::rename(&conn, "users", "accounts").unwrap();
    let (sql, _) = conn.last_statement();
    assert_eq!(sql, "ALTER TABLE users RENAME TO accounts");
}
