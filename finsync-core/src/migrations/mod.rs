//! Embedded schema migrations for the document store
//!
//! Each entry is `(file name, SQL)`. Entries are applied in list order and
//! recorded in `sys_migrations`, so a migration never runs twice.

/// New files are named `NNN_description.sql` and appended here.
pub const MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_documents.sql", include_str!("001_documents.sql")),
];
