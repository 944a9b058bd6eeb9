use {
    async_trait::async_trait,
    gymflow_channels::{
        Error, IncomingMessageEntry, MessageLog, OutgoingMessageEntry, Result, StatusUpdateEntry,
        error::Context,
    },
    sqlx::SqlitePool,
};

/// SQLite-backed message log.
pub struct SqliteMessageLog {
    pool: SqlitePool,
}

impl SqliteMessageLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the message database under `data_dir`.
    pub async fn open(data_dir: &std::path::Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let url = format!("sqlite://{}?mode=rwc", data_dir.join("messages.db").display());
        let pool = SqlitePool::connect(&url).await?;
        Self::init(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Initialize the message log schema.
    pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS outgoing_messages (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                recipient           TEXT    NOT NULL,
                content             TEXT    NOT NULL,
                channel             TEXT    NOT NULL,
                provider_message_id TEXT,
                status              TEXT    NOT NULL,
                raw_response        TEXT,
                created_at          INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS incoming_messages (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                provider_message_id TEXT    NOT NULL,
                sender              TEXT    NOT NULL,
                body                TEXT    NOT NULL,
                received_at         INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS status_updates (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                provider_message_id TEXT    NOT NULL,
                recipient           TEXT    NOT NULL,
                status              TEXT    NOT NULL,
                occurred_at         INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_outgoing_created
             ON outgoing_messages (created_at DESC)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl MessageLog for SqliteMessageLog {
    async fn log_outgoing(&self, entry: OutgoingMessageEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO outgoing_messages
             (recipient, content, channel, provider_message_id, status, raw_response, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.recipient)
        .bind(&entry.content)
        .bind(&entry.channel)
        .bind(&entry.provider_message_id)
        .bind(&entry.status)
        .bind(&entry.raw_response)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::external("insert outgoing message", e))?;
        Ok(())
    }

    async fn log_incoming(&self, entry: IncomingMessageEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO incoming_messages
             (provider_message_id, sender, body, received_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.provider_message_id)
        .bind(&entry.sender)
        .bind(&entry.body)
        .bind(entry.received_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::external("insert incoming message", e))?;
        Ok(())
    }

    async fn log_status(&self, entry: StatusUpdateEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO status_updates
             (provider_message_id, recipient, status, occurred_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.provider_message_id)
        .bind(&entry.recipient)
        .bind(&entry.status)
        .bind(entry.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::external("insert status update", e))?;
        Ok(())
    }

    async fn list_outgoing(&self, limit: u32) -> Result<Vec<OutgoingMessageEntry>> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                String,
                String,
                String,
                Option<String>,
                String,
                Option<String>,
                i64,
            ),
        >(
            "SELECT id, recipient, content, channel, provider_message_id, status,
                    raw_response, created_at
             FROM outgoing_messages
             ORDER BY created_at DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("list outgoing messages")?;

        Ok(rows
            .into_iter()
            .map(|r| OutgoingMessageEntry {
                id: r.0,
                recipient: r.1,
                content: r.2,
                channel: r.3,
                provider_message_id: r.4,
                status: r.5,
                raw_response: r.6,
                created_at: r.7,
            })
            .collect())
    }

    async fn list_incoming(&self, limit: u32) -> Result<Vec<IncomingMessageEntry>> {
        let rows = sqlx::query_as::<_, (i64, String, String, String, i64)>(
            "SELECT id, provider_message_id, sender, body, received_at
             FROM incoming_messages
             ORDER BY received_at DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("list incoming messages")?;

        Ok(rows
            .into_iter()
            .map(|r| IncomingMessageEntry {
                id: r.0,
                provider_message_id: r.1,
                sender: r.2,
                body: r.3,
                received_at: r.4,
            })
            .collect())
    }
}
