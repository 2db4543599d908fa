//! The planner store collaborator.
//!
//! The editor core never talks HTTP. The host plugs in a [`PlannerStore`]
//! (usually a thin client for `GET/PUT /api/planners/:id`), and tests and
//! demos use the in-process [`MemoryStore`].

use async_trait::async_trait;
use hp_core::record::{ConnectionPayload, ConnectionRecord, HexagonPayload, HexagonRecord};
use hp_core::{HexError, HexResult, PlannerRecord, SavePayload};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Load/save contract with the persistence collaborator.
///
/// Implementations must be `Send + Sync`; the bridge shares one store across
/// concurrent saves.
#[async_trait]
pub trait PlannerStore: Send + Sync {
    /// Fetch a planner with its hexagons and connections.
    async fn load(&self, planner_id: &str) -> HexResult<PlannerRecord>;

    /// Replace the planner's metadata, hexagons, and connections, and return
    /// the planner as now stored.
    async fn save(&self, planner_id: &str, payload: SavePayload) -> HexResult<PlannerRecord>;
}

/// In-process store with replace-on-save semantics.
///
/// Hexagons and connections sent without an `id` are assigned one, and
/// connections that refer to a new hexagon by its `client_id` are rewritten
/// to the assigned ID.
#[derive(Debug, Default)]
pub struct MemoryStore {
    planners: Mutex<HashMap<String, PlannerRecord>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a planner.
    pub async fn insert(&self, record: PlannerRecord) {
        self.planners.lock().await.insert(record.id.clone(), record);
    }

    pub async fn get(&self, planner_id: &str) -> Option<PlannerRecord> {
        self.planners.lock().await.get(planner_id).cloned()
    }

    fn mint(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }

    fn apply(&self, planner_id: &str, payload: SavePayload) -> HexResult<PlannerRecord> {
        let mut assigned: HashMap<String, String> = HashMap::new();
        let mut hexagons = Vec::with_capacity(payload.hexagons.len());
        for hex in payload.hexagons {
            let id = match (&hex.id, &hex.client_id) {
                (Some(id), _) => id.clone(),
                (None, Some(client)) => {
                    let id = self.mint("hex");
                    assigned.insert(client.clone(), id.clone());
                    id
                }
                (None, None) => self.mint("hex"),
            };
            hexagons.push(stored_hexagon(id, hex));
        }

        let known = |id: &str| hexagons.iter().any(|h| h.id.as_deref() == Some(id));
        let resolve = |id: String| assigned.get(&id).cloned().unwrap_or(id);

        let mut connections = Vec::with_capacity(payload.connections.len());
        for conn in payload.connections {
            let ConnectionPayload {
                id,
                from_hexagon_id,
                to_hexagon_id,
                label,
                ..
            } = conn;
            let from = resolve(from_hexagon_id);
            let to = resolve(to_hexagon_id);
            if !known(&from) || !known(&to) {
                return Err(HexError::PersistenceFailure(format!(
                    "connection {from} -> {to} refers to an unknown hexagon"
                )));
            }
            connections.push(ConnectionRecord {
                id: Some(id.unwrap_or_else(|| self.mint("conn"))),
                from_hexagon_id: Some(from),
                to_hexagon_id: Some(to),
                label,
            });
        }

        Ok(PlannerRecord {
            id: planner_id.to_string(),
            title: payload.title,
            description: payload.description,
            metadata: payload.metadata,
            hexagons,
            connections,
        })
    }
}

fn stored_hexagon(id: String, hex: HexagonPayload) -> HexagonRecord {
    HexagonRecord {
        id: Some(id),
        x: Some(hex.x),
        y: Some(hex.y),
        size: Some(hex.size),
        label: hex.label,
        concept_id: hex.concept_id,
        free_text: hex.free_text,
        settings: hex.settings,
    }
}

#[async_trait]
impl PlannerStore for MemoryStore {
    async fn load(&self, planner_id: &str) -> HexResult<PlannerRecord> {
        self.get(planner_id)
            .await
            .ok_or_else(|| HexError::NotFound(planner_id.to_string()))
    }

    async fn save(&self, planner_id: &str, payload: SavePayload) -> HexResult<PlannerRecord> {
        let mut planners = self.planners.lock().await;
        if !planners.contains_key(planner_id) {
            return Err(HexError::PersistenceFailure(format!(
                "planner {planner_id} not found"
            )));
        }
        let record = self.apply(planner_id, payload)?;
        planners.insert(planner_id.to_string(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seeded() -> PlannerRecord {
        PlannerRecord {
            id: "p1".into(),
            title: Some("Waves".into()),
            ..PlannerRecord::default()
        }
    }

    #[tokio::test]
    async fn client_ids_are_resolved_on_save() {
        let store = MemoryStore::new();
        store.insert(seeded()).await;

        let payload = SavePayload {
            title: Some("Waves".into()),
            hexagons: vec![
                HexagonPayload {
                    id: Some("h-old".into()),
                    size: 1.0,
                    ..HexagonPayload::default()
                },
                HexagonPayload {
                    client_id: Some("h-new".into()),
                    x: 120.0,
                    size: 2.0,
                    free_text: Some("Sound".into()),
                    ..HexagonPayload::default()
                },
            ],
            connections: vec![ConnectionPayload {
                client_id: Some("c-new".into()),
                from_hexagon_id: "h-old".into(),
                to_hexagon_id: "h-new".into(),
                ..ConnectionPayload::default()
            }],
            ..SavePayload::default()
        };

        let saved = store.save("p1", payload).await.unwrap();
        assert_eq!(saved.hexagons[0].id.as_deref(), Some("h-old"));
        let new_id = saved.hexagons[1].id.clone().unwrap();
        assert_eq!(new_id, "hex-1");
        assert_eq!(saved.connections[0].to_hexagon_id.as_deref(), Some("hex-1"));
        assert_eq!(saved.connections[0].id.as_deref(), Some("conn-2"));
        assert_eq!(store.get("p1").await, Some(saved));
    }

    #[tokio::test]
    async fn save_replaces_everything() {
        let store = MemoryStore::new();
        store.insert(seeded()).await;
        let one = SavePayload {
            hexagons: vec![HexagonPayload {
                id: Some("a".into()),
                size: 1.0,
                ..HexagonPayload::default()
            }],
            ..SavePayload::default()
        };
        store.save("p1", one).await.unwrap();
        let saved = store.save("p1", SavePayload::default()).await.unwrap();
        assert!(saved.hexagons.is_empty());
        assert_eq!(saved.title, None);
    }

    #[tokio::test]
    async fn dangling_connection_fails_the_save() {
        let store = MemoryStore::new();
        store.insert(seeded()).await;
        let bad = SavePayload {
            connections: vec![ConnectionPayload {
                from_hexagon_id: "x".into(),
                to_hexagon_id: "y".into(),
                ..ConnectionPayload::default()
            }],
            ..SavePayload::default()
        };
        let err = store.save("p1", bad).await.unwrap_err();
        assert!(err.is_persistence());
        // The stored planner is untouched.
        assert_eq!(store.get("p1").await, Some(seeded()));
    }

    #[tokio::test]
    async fn unknown_planner() {
        let store = MemoryStore::new();
        assert!(matches!(store.load("nope").await, Err(HexError::NotFound(_))));
        assert!(store.save("nope", SavePayload::default()).await.unwrap_err().is_persistence());
    }
}
