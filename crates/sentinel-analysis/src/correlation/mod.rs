//! Alert correlation: groups related alerts into situation reports.
//!
//! Pairs are scored on scope, known causal links between detector types and
//! shared vocabulary; pairs at or above the minimum score are merged with
//! union-find, and every group of two or more becomes a report.

pub mod narrative;
pub mod similarity;

use chrono::{DateTime, Duration, Utc};

use sentinel_core::config::CorrelationConfig;
use sentinel_core::traits::ReasoningService;
use sentinel_core::types::{Alert, SituationReport};

pub use narrative::{narrate, narrative_prompt, situation_title, template_narrative};
pub use similarity::{is_causal_pair, pair_score, significant_words};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationPolicy {
    pub lookback_secs: i64,
    pub proximity_secs: i64,
    pub min_score: u32,
    pub title_members: usize,
}

impl Default for CorrelationPolicy {
    fn default() -> Self {
        Self::from_config(&CorrelationConfig::default())
    }
}

impl CorrelationPolicy {
    pub fn from_config(config: &CorrelationConfig) -> Self {
        Self {
            lookback_secs: config.effective_lookback_secs(),
            proximity_secs: config.effective_proximity_secs(),
            min_score: config.effective_min_score(),
            title_members: config.effective_title_members().max(1),
        }
    }

    /// Oldest creation time considered at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::seconds(self.lookback_secs)
    }
}

// ─── Union-find ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

// ─── Clustering ─────────────────────────────────────────────────────────────

/// Groups of two or more correlated alerts, as indices into `alerts`.
///
/// Members keep input order; groups are ordered by their first member.
/// Alerts that already belong to a situation are ignored.
pub fn cluster(alerts: &[Alert], policy: &CorrelationPolicy) -> Vec<Vec<usize>> {
    let candidates: Vec<usize> = (0..alerts.len())
        .filter(|&i| !alerts[i].is_correlated())
        .collect();
    let mut uf = UnionFind::new(alerts.len());
    for (pos, &i) in candidates.iter().enumerate() {
        for &j in &candidates[pos + 1..] {
            let score = pair_score(&alerts[i], &alerts[j], policy.proximity_secs);
            if score >= policy.min_score {
                tracing::trace!(
                    a = %alerts[i].id,
                    b = %alerts[j].id,
                    score,
                    "correlated pair"
                );
                uf.union(i, j);
            }
        }
    }

    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for &i in &candidates {
        let root = uf.find(i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(i),
            None => groups.push((root, vec![i])),
        }
    }
    groups
        .into_iter()
        .map(|(_, members)| members)
        .filter(|members| members.len() >= 2)
        .collect()
}

/// Build situation reports for the uncorrelated alerts in `alerts`.
///
/// Alerts are sorted by creation time first so titles list the earliest
/// signals. Narratives come from `service` when present.
pub async fn correlate<S: ReasoningService>(
    alerts: &[Alert],
    policy: &CorrelationPolicy,
    service: Option<&S>,
    now: DateTime<Utc>,
) -> Vec<SituationReport> {
    let mut ordered: Vec<&Alert> = alerts.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    let ordered: Vec<Alert> = ordered.into_iter().cloned().collect();

    let mut reports = Vec::new();
    for group in cluster(&ordered, policy) {
        let members: Vec<&Alert> = group.iter().map(|&i| &ordered[i]).collect();
        let title = situation_title(&members, policy.title_members);
        let narrative = narrate(service, &members).await;
        let report = SituationReport {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            member_alert_ids: members.iter().map(|a| a.id.clone()).collect(),
            narrative,
            created_at: now,
            window_start: policy.window_start(now),
        };
        tracing::info!(
            situation_id = %report.id,
            members = report.member_alert_ids.len(),
            title = %report.title,
            "situation formed"
        );
        reports.push(report);
    }
    reports
}
