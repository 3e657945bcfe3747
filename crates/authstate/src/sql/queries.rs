//! SQL statements for the supported databases.

/// Schema (PostgreSQL).
pub const CREATE_TABLE_PG: &str = r#"
CREATE TABLE IF NOT EXISTS auth_state (
    id SERIAL PRIMARY KEY,
    phone_number BIGINT NOT NULL,
    key_name TEXT NOT NULL,
    value JSONB,
    UNIQUE (phone_number, key_name)
)
"#;

/// Schema (MySQL/MariaDB).
pub const CREATE_TABLE_MYSQL: &str = r#"
CREATE TABLE IF NOT EXISTS auth_state (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    phone_number BIGINT NOT NULL,
    key_name VARCHAR(255) NOT NULL,
    value JSON,
    UNIQUE KEY uq_auth_state_identity_key (phone_number, key_name)
)
"#;

/// Schema (SQLite).
pub const CREATE_TABLE_SQLITE: &str = r#"
CREATE TABLE IF NOT EXISTS auth_state (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number INTEGER NOT NULL,
    key_name TEXT NOT NULL,
    value TEXT,
    UNIQUE (phone_number, key_name)
)
"#;

/// Insert or replace a value (PostgreSQL).
pub const UPSERT_PG: &str = r#"
INSERT INTO auth_state (phone_number, key_name, value)
VALUES ($1, $2, $3::jsonb)
ON CONFLICT (phone_number, key_name)
DO UPDATE SET value = EXCLUDED.value
"#;

/// Insert or replace a value (MySQL/MariaDB).
pub const UPSERT_MYSQL: &str = r#"
INSERT INTO auth_state (phone_number, key_name, value)
VALUES (?, ?, ?)
ON DUPLICATE KEY UPDATE value = VALUES(value)
"#;

/// Insert or replace a value (SQLite).
pub const UPSERT_SQLITE: &str = r#"
INSERT INTO auth_state (phone_number, key_name, value)
VALUES (?, ?, ?)
ON CONFLICT (phone_number, key_name)
DO UPDATE SET value = excluded.value
"#;

/// Point lookup (PostgreSQL).
pub const SELECT_PG: &str = r#"
SELECT value::text AS value
FROM auth_state
WHERE phone_number = $1 AND key_name = $2
LIMIT 1
"#;

/// Point lookup (MySQL/MariaDB).
pub const SELECT_MYSQL: &str = r#"
SELECT CAST(value AS CHAR) AS value
FROM auth_state
WHERE phone_number = ? AND key_name = ?
LIMIT 1
"#;

/// Point lookup (SQLite).
pub const SELECT_SQLITE: &str = r#"
SELECT value
FROM auth_state
WHERE phone_number = ? AND key_name = ?
LIMIT 1
"#;

/// Point delete (PostgreSQL).
pub const DELETE_PG: &str = r#"
DELETE FROM auth_state
WHERE phone_number = $1 AND key_name = $2
"#;

/// Point delete (MySQL/SQLite).
pub const DELETE_MYSQL: &str = r#"
DELETE FROM auth_state
WHERE phone_number = ? AND key_name = ?
"#;

/// Delete every row of an identity (PostgreSQL).
pub const DELETE_ALL_PG: &str = r#"
DELETE FROM auth_state
WHERE phone_number = $1
"#;

/// Delete every row of an identity (MySQL/SQLite).
pub const DELETE_ALL_MYSQL: &str = r#"
DELETE FROM auth_state
WHERE phone_number = ?
"#;

/// List rows of an identity (PostgreSQL).
pub const LIST_PG: &str = r#"
SELECT key_name, value::text AS value
FROM auth_state
WHERE phone_number = $1
ORDER BY key_name
"#;

/// List rows of an identity (MySQL/MariaDB).
pub const LIST_MYSQL: &str = r#"
SELECT key_name, CAST(value AS CHAR) AS value
FROM auth_state
WHERE phone_number = ?
ORDER BY key_name
"#;

/// List rows of an identity (SQLite).
pub const LIST_SQLITE: &str = r#"
SELECT key_name, value
FROM auth_state
WHERE phone_number = ?
ORDER BY key_name
"#;
