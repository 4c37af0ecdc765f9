use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Page, TitleSummary},
    services::catalog::{validate_page, CatalogProvider},
};

/// Search result returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// Set when a newer request from the same client superseded this one.
    /// Stale responses carry no results and should be dropped.
    pub stale: bool,
    #[serde(flatten)]
    pub page: Page<TitleSummary>,
}

impl SearchResponse {
    fn empty(query: &str, seq: Option<u64>, stale: bool) -> Self {
        Self {
            query: query.to_string(),
            seq,
            stale,
            page: Page::empty(),
        }
    }
}

/// Idle time after which a client's sequence may be forgotten
pub const CLIENT_IDLE_TTL: Duration = Duration::from_secs(10 * 60);

/// Most clients tracked at once
pub const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Tracks the newest search sequence number seen per client
///
/// Clients number their searches; any request overtaken by a newer one from
/// the same client is reported stale instead of delivering out-of-order
/// results.
///
/// The table is bounded. Once it holds `max_clients` entries, clients idle
/// for longer than `idle_ttl` are dropped; if it is still full, new clients
/// are served without sequencing.
#[derive(Debug)]
pub struct SearchSequencer {
    latest: DashMap<String, ClientSeq>,
    idle_ttl: Duration,
    max_clients: usize,
}

#[derive(Debug, Clone, Copy)]
struct ClientSeq {
    seq: u64,
    seen: Instant,
}

/// A sequenced search in flight
#[derive(Debug, Clone)]
pub struct SearchTicket {
    key: String,
    seq: u64,
}

/// Outcome of registering a search with the sequencer
#[derive(Debug, Clone)]
pub enum Admission {
    /// Newest search for its client
    Current(SearchTicket),
    /// A newer search from the same client was already seen
    Superseded,
    /// The table is full; the search runs unsequenced
    Untracked,
}

impl Default for SearchSequencer {
    fn default() -> Self {
        Self::with_limits(CLIENT_IDLE_TTL, MAX_TRACKED_CLIENTS)
    }
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_ttl: Duration, max_clients: usize) -> Self {
        Self {
            latest: DashMap::new(),
            idle_ttl,
            max_clients,
        }
    }

    /// Records `seq` for `client`
    pub fn begin(&self, client: &str, seq: u64) -> Admission {
        let now = Instant::now();

        if !self.latest.contains_key(client) && self.latest.len() >= self.max_clients {
            self.latest
                .retain(|_, entry| now.duration_since(entry.seen) < self.idle_ttl);
            if self.latest.len() >= self.max_clients {
                tracing::warn!(
                    clients = self.latest.len(),
                    "Search sequencer full, serving search unsequenced"
                );
                return Admission::Untracked;
            }
        }

        let mut entry = self
            .latest
            .entry(client.to_string())
            .or_insert(ClientSeq { seq, seen: now });
        entry.seen = now;
        if entry.seq > seq {
            return Admission::Superseded;
        }
        entry.seq = seq;

        Admission::Current(SearchTicket {
            key: client.to_string(),
            seq,
        })
    }

    /// Whether the ticket is still the client's newest search
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        self.latest
            .get(&ticket.key)
            .map(|latest| latest.seq == ticket.seq)
            .unwrap_or(false)
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.latest.len()
    }
}

/// Runs a catalog search on behalf of a client
///
/// An empty or blank query yields an empty result without touching the
/// catalog. When both `client` and `seq` are given, the search is sequenced
/// through `sequencer`. A rejected page number never advances the sequence.
pub async fn search_titles(
    catalog: Arc<dyn CatalogProvider>,
    sequencer: &SearchSequencer,
    client: Option<&str>,
    query: &str,
    seq: Option<u64>,
    page: u32,
) -> AppResult<SearchResponse> {
    let blank = query.trim().is_empty();
    let page = if blank { page } else { validate_page(page)? };

    let ticket = match (client, seq) {
        (Some(client), Some(seq)) => match sequencer.begin(client, seq) {
            Admission::Current(ticket) => Some(ticket),
            Admission::Untracked => None,
            Admission::Superseded => {
                tracing::debug!(client = %client, seq = seq, "Search superseded before dispatch");
                return Ok(SearchResponse::empty(query, Some(seq), true));
            }
        },
        _ => None,
    };

    if blank {
        return Ok(SearchResponse::empty(query, seq, false));
    }

    let results = catalog.search(query, page).await?;

    if let Some(ticket) = &ticket {
        if !sequencer.is_current(ticket) {
            tracing::debug!(
                client = %ticket.key,
                seq = ticket.seq,
                "Search superseded while in flight, discarding results"
            );
            return Ok(SearchResponse::empty(query, seq, true));
        }
    }

    Ok(SearchResponse {
        query: query.to_string(),
        seq,
        stale: false,
        page: results,
    })
}
