//! PostgreSQL store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use super::{CloseReason, NewPosting, OpenPosting, PostingStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connecting to postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("running migrations")?;
        Ok(())
    }
}

#[async_trait]
impl PostingStore for PgStore {
    async fn upsert(&self, p: &NewPosting) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO interpello (
                source_name, source_url, url, title, abstract, regione, provincia,
                comune, scuola, classe, categorie, is_open, scadenza, pubblicato_il, allegati
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                abstract = EXCLUDED.abstract,
                categorie = EXCLUDED.categorie,
                scadenza = EXCLUDED.scadenza,
                pubblicato_il = EXCLUDED.pubblicato_il,
                is_open = CASE
                    WHEN interpello.closed_reason IS NOT NULL THEN interpello.is_open
                    ELSE EXCLUDED.is_open
                END
            "#,
        )
        .bind(&p.source_name)
        .bind(&p.source_url)
        .bind(&p.url)
        .bind(&p.title)
        .bind(&p.abstract_text)
        .bind(&p.regione)
        .bind(&p.provincia)
        .bind(&p.comune)
        .bind(&p.scuola)
        .bind(&p.classe)
        .bind(&p.categorie)
        .bind(p.is_open)
        .bind(p.scadenza)
        .bind(p.pubblicato_il)
        .bind(serde_json::to_value(&p.allegati)?)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upserting posting {}", p.url))?;
        Ok(())
    }

    async fn open_postings(&self) -> Result<Vec<OpenPosting>> {
        let rows = sqlx::query("SELECT id, url, scadenza FROM interpello WHERE is_open = TRUE")
            .fetch_all(&self.pool)
            .await
            .context("loading open postings")?;
        Ok(rows
            .into_iter()
            .map(|r| OpenPosting {
                id: r.get("id"),
                url: r.get("url"),
                scadenza: r.get("scadenza"),
            })
            .collect())
    }

    async fn mark_closed(&self, id: i64, reason: CloseReason, when: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE interpello SET is_open = FALSE, closed_reason = $1, closed_at = $2 WHERE id = $3",
        )
        .bind(reason.as_str())
        .bind(when)
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("marking posting {id} closed"))?;
        Ok(())
    }
}
