use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio_rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use common::{cosine_similarity, AgentError, Embedder};

use crate::models::{SearchHit, SearchOutcome, UpsertReceipt};

/// Advisory similarity threshold echoed to callers. The store itself never
/// filters by it; accept/reject is the consumer's decision.
pub const SIMILARITY_THRESHOLD: f64 = 0.4;

pub const DEFAULT_SEARCH_LIMIT: usize = 2;
pub const DEFAULT_SOURCE: &str = "agent_response";

/// Content cache over one sqlite database. Entries are embedded at write
/// time and partitioned into per-topic namespaces; similarity search only
/// ever compares entries within the queried namespace.
pub struct CacheStore {
    conn: Connection,
    embedder: Arc<dyn Embedder>,
    index_name: String,
}

impl CacheStore {
    /// Open (or create) the index's backing database.
    pub async fn open(
        db_path: &str,
        index_name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AgentError> {
        let conn = Connection::open(db_path)
            .await
            .map_err(|e| AgentError::Store(format!("failed to open cache database: {e}")))?;

        Ok(Self {
            conn,
            embedder,
            index_name: index_name.to_string(),
        })
    }

    /// In-memory store for tests and throwaway sessions.
    pub async fn open_in_memory(embedder: Arc<dyn Embedder>) -> Result<Self, AgentError> {
        Self::open(":memory:", "cryptocurrency-expert-agent", embedder).await
    }

    /// Idempotent create-if-absent of the entry table. One-time startup
    /// concern, safe to call repeatedly.
    pub async fn ensure_index(&self) -> Result<(), AgentError> {
        self.conn
            .call(|conn| -> Result<(), tokio_rusqlite::rusqlite::Error> {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS cache_entries (
                        id TEXT PRIMARY KEY,
                        namespace TEXT NOT NULL,
                        chunk_text TEXT NOT NULL,
                        topic TEXT NOT NULL,
                        source TEXT NOT NULL,
                        timestamp TEXT NOT NULL,
                        metadata TEXT NOT NULL,
                        embedding TEXT NOT NULL
                    )",
                    [],
                )?;
                conn.execute(
                    "CREATE INDEX IF NOT EXISTS idx_cache_entries_namespace
                     ON cache_entries (namespace)",
                    [],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| AgentError::Store(format!("failed to provision index: {e}")))?;

        info!(index = %self.index_name, "content cache index ready");
        Ok(())
    }

    /// Rank the topic's namespace by similarity to the topic string and
    /// return up to `limit` hits, best first. Hits below the advisory
    /// threshold are returned too.
    pub async fn search(&self, topic: &str, limit: usize) -> Result<SearchOutcome, AgentError> {
        let query_vec = self.embedder.embed(topic).await?;

        let namespace = topic.to_string();
        let rows: Vec<(String, String, String)> = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String, String)>, tokio_rusqlite::rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, metadata, embedding FROM cache_entries WHERE namespace = ?1",
                )?;
                let rows = stmt.query_map([&namespace], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            })
            .await
            .map_err(|e| AgentError::Store(format!("cache query failed: {e}")))?;

        let mut hits = Vec::with_capacity(rows.len());
        for (id, metadata, embedding) in rows {
            let stored: Vec<f64> = serde_json::from_str(&embedding)
                .map_err(|e| AgentError::Store(format!("corrupt embedding for {id}: {e}")))?;
            let metadata: Value = serde_json::from_str(&metadata)
                .map_err(|e| AgentError::Store(format!("corrupt metadata for {id}: {e}")))?;

            hits.push(SearchHit {
                id,
                score: cosine_similarity(&query_vec, &stored),
                metadata,
            });
        }

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        if hits.is_empty() {
            info!(topic, "no cached content found");
        } else {
            info!(topic, count = hits.len(), "found cached content");
        }

        Ok(SearchOutcome {
            found: !hits.is_empty(),
            count: hits.len(),
            results: hits,
            topic: topic.to_string(),
            threshold: SIMILARITY_THRESHOLD,
        })
    }

    /// Embed and store one entry in the topic's namespace. Ids combine the
    /// write time with a random suffix; uniqueness is best-effort, not
    /// cryptographically guaranteed. Namespaces accumulate without cap.
    pub async fn upsert(
        &self,
        content: &str,
        topic: &str,
        source: &str,
        extra: Map<String, Value>,
    ) -> Result<UpsertReceipt, AgentError> {
        let embedding = self.embedder.embed(content).await?;

        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("content_{}_{}", now.timestamp_millis(), &suffix[..9]);
        let timestamp = now.to_rfc3339();

        // The metadata blob mirrors the row so hits can be consumed without
        // a second lookup; extra keys ride along untouched.
        let mut metadata = Map::new();
        metadata.insert("id".to_string(), json!(id));
        metadata.insert("chunk_text".to_string(), json!(content));
        metadata.insert("topic".to_string(), json!(topic));
        metadata.insert("source".to_string(), json!(source));
        metadata.insert("timestamp".to_string(), json!(timestamp));
        for (key, value) in extra {
            metadata.insert(key, value);
        }

        let metadata_text = serde_json::to_string(&metadata)
            .map_err(|e| AgentError::Store(format!("failed to serialize metadata: {e}")))?;
        let embedding_text = serde_json::to_string(&embedding)
            .map_err(|e| AgentError::Store(format!("failed to serialize embedding: {e}")))?;

        let row_id = id.clone();
        let namespace = topic.to_string();
        let chunk_text = content.to_string();
        let row_topic = topic.to_string();
        let row_source = source.to_string();
        let row_timestamp = timestamp.clone();

        self.conn
            .call(move |conn| -> Result<(), tokio_rusqlite::rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO cache_entries
                     (id, namespace, chunk_text, topic, source, timestamp, metadata, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    [
                        &row_id,
                        &namespace,
                        &chunk_text,
                        &row_topic,
                        &row_source,
                        &row_timestamp,
                        &metadata_text,
                        &embedding_text,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| AgentError::Store(format!("cache write failed: {e}")))?;

        info!(topic, id = %id, "content stored");

        Ok(UpsertReceipt {
            success: true,
            id,
            topic: topic.to_string(),
            content_length: content.len(),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: identical text always embeds identically, so
    /// an exact-topic match scores 1.0.
    #[derive(Clone, Default)]
    struct HashEmbedder;

    #[async_trait]
    impl Embedder for HashEmbedder {
        fn ndims(&self) -> usize {
            16
        }

        async fn embed(&self, text: &str) -> Result<Vec<f64>, AgentError> {
            let mut vec = vec![0.0f64; 16];
            for (i, byte) in text.bytes().enumerate() {
                vec[(byte as usize + i) % 16] += 1.0;
            }
            Ok(vec)
        }
    }

    async fn store() -> CacheStore {
        let store = CacheStore::open_in_memory(Arc::new(HashEmbedder)).await.unwrap();
        store.ensure_index().await.unwrap();
        store
    }

    #[tokio::test]
    async fn empty_store_finds_nothing() {
        let store = store().await;
        let outcome = store.search("DeFi category", 2).await.unwrap();

        assert!(!outcome.found);
        assert_eq!(outcome.count, 0);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.topic, "DeFi category");
        assert_eq!(outcome.threshold, 0.4);
    }

    #[tokio::test]
    async fn ensure_index_is_idempotent() {
        let store = store().await;
        store.ensure_index().await.unwrap();
        store.ensure_index().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_then_search_round_trips() {
        let store = store().await;
        let content = "Top DeFi protocols by TVL: Lido, Aave, EigenLayer.";

        let receipt = store
            .upsert(content, "defi overview", DEFAULT_SOURCE, Map::new())
            .await
            .unwrap();
        assert!(receipt.success);
        assert!(receipt.id.starts_with("content_"));
        assert_eq!(receipt.content_length, content.len());

        let outcome = store.search("defi overview", 2).await.unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.count, 1);

        let hit = &outcome.results[0];
        assert_eq!(hit.id, receipt.id);
        assert_eq!(hit.metadata["chunk_text"], content);
        assert_eq!(hit.metadata["topic"], "defi overview");
        assert_eq!(hit.metadata["source"], DEFAULT_SOURCE);
    }

    #[tokio::test]
    async fn exact_topic_match_scores_above_point_nine() {
        let store = store().await;
        store
            .upsert("solana ecosystem", "solana ecosystem", DEFAULT_SOURCE, Map::new())
            .await
            .unwrap();

        let outcome = store.search("solana ecosystem", 2).await.unwrap();
        assert!(outcome.results[0].score > 0.9);
    }

    #[tokio::test]
    async fn limit_is_respected_and_hits_are_sorted() {
        let store = store().await;
        for content in [
            "layer 2 rollups",
            "optimistic rollup fees",
            "zero knowledge proofs on ethereum",
        ] {
            store
                .upsert(content, "layer 2 rollups", DEFAULT_SOURCE, Map::new())
                .await
                .unwrap();
        }

        let outcome = store.search("layer 2 rollups", 2).await.unwrap();
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results[0].score >= outcome.results[1].score);
        // The verbatim-content entry must rank first.
        assert_eq!(outcome.results[0].metadata["chunk_text"], "layer 2 rollups");
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let store = store().await;
        store
            .upsert("bitcoin halving schedule", "bitcoin", DEFAULT_SOURCE, Map::new())
            .await
            .unwrap();

        let outcome = store.search("ethereum", 2).await.unwrap();
        assert!(!outcome.found);
        assert_eq!(outcome.count, 0);
    }

    #[tokio::test]
    async fn extra_metadata_rides_along() {
        let store = store().await;
        let mut extra = Map::new();
        extra.insert("coins".to_string(), json!(3));

        store
            .upsert("top meme coins", "meme coins", DEFAULT_SOURCE, extra)
            .await
            .unwrap();

        let outcome = store.search("meme coins", 1).await.unwrap();
        assert_eq!(outcome.results[0].metadata["coins"], 3);
    }
}
