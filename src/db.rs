use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};
use tokio::fs;

const MIGRATIONS_DIR: &str = "migrations";
const MAX_CONNECTIONS: u32 = 20;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(8);

/// Opens the Postgres pool. Statements are traced by SeaORM at debug level.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(MAX_CONNECTIONS)
        .connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);

    Database::connect(opt)
        .await
        .context("failed to connect to the catalog database")
}

/// Applies every `migrations/*.sql` file in name order, one transaction per file.
/// The files only contain `IF NOT EXISTS` style DDL, so this runs on every start.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let backend = conn.get_database_backend();

    for file in migration_files().await? {
        let sql = fs::read_to_string(&file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        let statements = split_statements(&sql);

        let txn = conn.begin().await?;
        for stmt in &statements {
            txn.execute(Statement::from_string(backend, stmt.clone()))
                .await
                .with_context(|| format!("applying {}", file.display()))?;
        }
        txn.commit().await?;

        tracing::debug!(file = %file.display(), statements = statements.len(), "migration applied");
    }

    Ok(())
}

async fn migration_files() -> Result<Vec<PathBuf>> {
    let mut dir = fs::read_dir(MIGRATIONS_DIR)
        .await
        .with_context(|| format!("opening {MIGRATIONS_DIR}/"))?;
    let mut files = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Postgres prepared statements hold a single command, so a file is run
/// statement by statement. Line comments are dropped first.
fn split_statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{stmt};"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_and_skips_comments() {
        let sql = "-- categories\nCREATE TABLE a (id INT);\n\n  -- index; not a statement\n\
                   CREATE INDEX i ON a (id);\n";
        assert_eq!(
            split_statements(sql),
            vec![
                "CREATE TABLE a (id INT);".to_string(),
                "CREATE INDEX i ON a (id);".to_string(),
            ]
        );
    }

    #[test]
    fn blank_file_has_no_statements() {
        assert!(split_statements("\n  \n-- nothing here\n").is_empty());
    }
}
