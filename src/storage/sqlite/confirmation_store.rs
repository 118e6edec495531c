//! SQLite ConfirmationStore implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sea_query::{Expr, Order, Query, SelectStatement, SimpleExpr, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::model::{GuestConfirmation, NewConfirmation, RecordField};
use crate::storage::schema::{
    Confirmations, CREATE_CONFIRMATIONS_TABLE, CREATE_CONTACT_KEY_INDEX,
    CREATE_SUBMITTED_AT_INDEX,
};
use crate::storage::{ConfirmationStore, Result, StorageError};

/// SQLite implementation of ConfirmationStore.
///
/// A unique index on `contact_key` makes `insert` an atomic
/// insert-if-absent: a second writer with the same key gets
/// `StorageError::DuplicateKey` even if it passed the workflow's read check.
pub struct SqliteConfirmationStore {
    pool: SqlitePool,
}

impl SqliteConfirmationStore {
    /// Create a new SQLite confirmation store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they don't exist.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_CONFIRMATIONS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_CONTACT_KEY_INDEX)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_SUBMITTED_AT_INDEX)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Base select with newest-first ordering.
    fn select() -> SelectStatement {
        Query::select()
            .columns([
                Confirmations::Id,
                Confirmations::SubmittedAt,
                Confirmations::FullName,
                Confirmations::ContactKey,
                Confirmations::Choices,
            ])
            .from(Confirmations::Table)
            .order_by(Confirmations::SubmittedAt, Order::Desc)
            .order_by(Confirmations::Seq, Order::Desc)
            .to_owned()
    }

    /// Run a rendered select. Statements are rendered before any await since
    /// sea-query statements are not `Send`.
    async fn fetch(&self, sql: &str) -> Result<Vec<GuestConfirmation>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    fn field_condition(field: &RecordField, value: &str) -> SimpleExpr {
        match field {
            RecordField::FullName => Expr::col(Confirmations::FullName).eq(value),
            RecordField::ContactKey => Expr::col(Confirmations::ContactKey).eq(value),
            RecordField::Choice(name) => Expr::cust_with_values(
                "json_extract(choices, ?) = ?",
                [format!("$.\"{}\"", name), value.to_string()],
            ),
        }
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_row(row: &SqliteRow) -> Result<GuestConfirmation> {
    let submitted_at: String = row.get("submitted_at");
    let submitted_at = DateTime::parse_from_rfc3339(&submitted_at)
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", submitted_at, e)))?
        .with_timezone(&Utc);
    let choices: String = row.get("choices");
    let choices: BTreeMap<String, String> = serde_json::from_str(&choices)?;

    Ok(GuestConfirmation {
        id: row.get("id"),
        submitted_at,
        full_name: row.get("full_name"),
        contact_key: row.get("contact_key"),
        choices,
    })
}

#[async_trait]
impl ConfirmationStore for SqliteConfirmationStore {
    async fn insert(&self, record: NewConfirmation) -> Result<GuestConfirmation> {
        // Truncated to what the text column keeps, so the returned record
        // equals what later reads decode.
        let stored = record.into_stored(Uuid::new_v4().to_string(), Utc::now().trunc_subsecs(6));
        let choices = serde_json::to_string(&stored.choices)?;

        let query = Query::insert()
            .into_table(Confirmations::Table)
            .columns([
                Confirmations::Id,
                Confirmations::SubmittedAt,
                Confirmations::FullName,
                Confirmations::ContactKey,
                Confirmations::Choices,
            ])
            .values_panic([
                stored.id.clone().into(),
                format_timestamp(&stored.submitted_at).into(),
                stored.full_name.clone().into(),
                stored.contact_key.clone().into(),
                choices.into(),
            ])
            .to_string(SqliteQueryBuilder);

        match sqlx::query(&query).execute(&self.pool).await {
            Ok(_) => {
                debug!(id = %stored.id, "Inserted confirmation");
                Ok(stored)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StorageError::DuplicateKey {
                    contact_key: stored.contact_key,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn query_all(&self) -> Result<Vec<GuestConfirmation>> {
        let sql = Self::select().to_string(SqliteQueryBuilder);
        self.fetch(&sql).await
    }

    async fn query_by_field(
        &self,
        field: &RecordField,
        value: &str,
    ) -> Result<Vec<GuestConfirmation>> {
        let sql = Self::select()
            .and_where(Self::field_condition(field, value))
            .to_string(SqliteQueryBuilder);
        self.fetch(&sql).await
    }

    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<GuestConfirmation>> {
        let sql = Self::select()
            .and_where(Expr::col(Confirmations::SubmittedAt).gte(format_timestamp(&since)))
            .to_string(SqliteQueryBuilder);
        self.fetch(&sql).await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
