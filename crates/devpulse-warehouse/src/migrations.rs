use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

// Four structurally identical partitions per entity kind: the primary
// all-time table plus the three rolling-lookback tables. Row ids come from
// one sequence per entity kind; upstream ids are deliberately not unique
// keys, so re-polling the same records inserts fresh rows.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_issue_partitions",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS issues_row_id START 1;

CREATE TABLE IF NOT EXISTS issues (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('issues_row_id'),
    github_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    state TEXT NOT NULL,
    created_at TIMESTAMP,
    updated_at TIMESTAMP
);

CREATE TABLE IF NOT EXISTS twodays_issues (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('issues_row_id'),
    github_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    state TEXT NOT NULL,
    created_at TIMESTAMP,
    updated_at TIMESTAMP
);

CREATE TABLE IF NOT EXISTS sevendays_issues (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('issues_row_id'),
    github_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    state TEXT NOT NULL,
    created_at TIMESTAMP,
    updated_at TIMESTAMP
);

CREATE TABLE IF NOT EXISTS fortyfivedays_issues (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('issues_row_id'),
    github_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    state TEXT NOT NULL,
    created_at TIMESTAMP,
    updated_at TIMESTAMP
);
"#,
    },
    Migration {
        version: "0002_question_partitions",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS questions_row_id START 1;

CREATE TABLE IF NOT EXISTS questions (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('questions_row_id'),
    question_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    is_answered BOOLEAN NOT NULL,
    creation_date BIGINT
);

CREATE TABLE IF NOT EXISTS twodays_questions (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('questions_row_id'),
    question_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    is_answered BOOLEAN NOT NULL,
    creation_date BIGINT
);

CREATE TABLE IF NOT EXISTS sevendays_questions (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('questions_row_id'),
    question_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    is_answered BOOLEAN NOT NULL,
    creation_date BIGINT
);

CREATE TABLE IF NOT EXISTS fortyfivedays_questions (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('questions_row_id'),
    question_id BIGINT NOT NULL,
    title TEXT NOT NULL,
    body TEXT,
    is_answered BOOLEAN NOT NULL,
    creation_date BIGINT
);
"#,
    },
    Migration {
        version: "0003_answer_partitions",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS answers_row_id START 1;

CREATE TABLE IF NOT EXISTS answers (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('answers_row_id'),
    answer_id BIGINT NOT NULL,
    question_id BIGINT NOT NULL,
    body TEXT
);

CREATE TABLE IF NOT EXISTS twodays_answers (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('answers_row_id'),
    answer_id BIGINT NOT NULL,
    question_id BIGINT NOT NULL,
    body TEXT
);

CREATE TABLE IF NOT EXISTS sevendays_answers (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('answers_row_id'),
    answer_id BIGINT NOT NULL,
    question_id BIGINT NOT NULL,
    body TEXT
);

CREATE TABLE IF NOT EXISTS fortyfivedays_answers (
    row_id BIGINT PRIMARY KEY DEFAULT nextval('answers_row_id'),
    answer_id BIGINT NOT NULL,
    question_id BIGINT NOT NULL,
    body TEXT
);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            [migration.version],
            |row| row.get(0),
        )?;
        if already_applied > 0 {
            continue;
        }

        connection.execute_batch(migration.sql)?;
        connection.execute(
            "INSERT INTO schema_migrations (version) VALUES (?)",
            [migration.version],
        )?;
    }

    Ok(())
}
