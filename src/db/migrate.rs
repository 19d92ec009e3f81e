//! Schema migrations.
//!
//! Each migration is applied once and recorded in the `log` table as
//! `migration_applied` with its version as target.

use crate::ui::messages::success;
use rusqlite::{Connection, Error, OptionalExtension, Result};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_roster",
        description: "Created labour_groups and labourers tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS labour_groups (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS labourers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            village     TEXT NOT NULL DEFAULT '',
            group_id    INTEGER NOT NULL REFERENCES labour_groups(id),
            daily_wage  TEXT,
            phone       TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_labourers_group ON labourers(group_id);
        "#,
    },
    Migration {
        version: "20250301_0002_attendance",
        description: "Created attendance and attendance_revisions tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            labourer_id      INTEGER NOT NULL REFERENCES labourers(id),
            attendance_date  TEXT NOT NULL,
            status           TEXT NOT NULL CHECK(status IN ('full','half','absent')),
            updated_at       TEXT NOT NULL,
            UNIQUE(labourer_id, attendance_date)
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(attendance_date);

        CREATE TABLE IF NOT EXISTS attendance_revisions (
            group_id         INTEGER NOT NULL REFERENCES labour_groups(id),
            attendance_date  TEXT NOT NULL,
            revision         INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (group_id, attendance_date)
        );
        "#,
    },
    Migration {
        version: "20250301_0003_payments",
        description: "Created payments table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS payments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            labourer_id   INTEGER NOT NULL REFERENCES labourers(id),
            amount        TEXT NOT NULL,
            payment_date  TEXT NOT NULL,
            payment_type  TEXT NOT NULL DEFAULT 'daily'
                          CHECK(payment_type IN ('daily','weekly','monthly','advance','bonus')),
            notes         TEXT NOT NULL DEFAULT '',
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_payments_labourer ON payments(labourer_id);
        "#,
    },
    Migration {
        version: "20250301_0004_group_work",
        description: "Created group_work table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS group_work (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            group_id           INTEGER NOT NULL REFERENCES labour_groups(id),
            work_date          TEXT NOT NULL,
            small_packets      INTEGER NOT NULL DEFAULT 0,
            medium_packets     INTEGER NOT NULL DEFAULT 0,
            large_packets      INTEGER NOT NULL DEFAULT 0,
            overlarge_packets  INTEGER NOT NULL DEFAULT 0,
            total_packets      INTEGER NOT NULL DEFAULT 0,
            notes              TEXT NOT NULL DEFAULT '',
            updated_at         TEXT NOT NULL,
            UNIQUE(group_id, work_date)
        );
        "#,
    },
];

/// Ensure that the `log` table exists; migrations are tracked in it.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    conn.execute_batch(m.sql).map_err(|e| {
        Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some(format!("Migration {} failed: {}", m.version, e)),
        )
    })?;

    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;

    success(format!("Migration applied: {} → {}", m.version, m.description));
    Ok(())
}

/// Public entry point: run all pending migrations, return how many ran.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied += 1;
    }

    Ok(applied)
}
