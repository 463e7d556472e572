//! Component C: pure, deterministic multi-factor ranking.
//!
//! Every function here is a plain math function over plain data — no I/O,
//! no locking, nothing to mock in tests.

use chrono::{DateTime, Utc};

use crate::models::{Memory, ScoreBreakdown, ScoredMemory};

/// Weights applied to each component score when computing the composite.
/// Not required to sum to 1; used exactly as configured.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub similarity: f32,
    pub recency: f32,
    pub priority: f32,
    pub usage: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            similarity: 0.4,
            recency: 0.2,
            priority: 0.2,
            usage: 0.2,
        }
    }
}

const RECENCY_HALF_LIFE_DAYS: f64 = 30.0;
const USAGE_LOG_BASE: f64 = 100.0;

/// Clamps a similarity value (expected `[-1, 1]` from cosine similarity, but
/// accepts anything) into `[0, 1]`.
pub fn similarity_score(similarity: f32) -> f32 {
    similarity.clamp(0.0, 1.0)
}

/// `exp(-days/30)` where `days = max(0, (now - created_at) / 1 day)`. Future
/// timestamps saturate at 1.0.
pub fn recency_score(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let elapsed = now.signed_duration_since(created_at);
    let days = elapsed.num_milliseconds() as f64 / 86_400_000.0;
    if days <= 0.0 {
        return 1.0;
    }
    (-days / RECENCY_HALF_LIFE_DAYS).exp() as f32
}

/// Case-insensitive priority mapping; anything outside the closed set
/// (including empty/null) defaults to `0.5`, matching `NORMAL`.
pub fn priority_score(priority: &str) -> f32 {
    match priority.to_ascii_uppercase().as_str() {
        "CORE" => 1.0,
        "HIGH" => 0.75,
        "NORMAL" => 0.5,
        "LOW" => 0.25,
        _ => 0.5,
    }
}

/// `log(access_count + 1) / log(100)`, clamped to `[0, 1]`. Negative counts
/// are treated as 0, which also yields exactly `0.0`.
pub fn usage_score(access_count: i64) -> f32 {
    let access_count = access_count.max(0) as f64;
    if access_count == 0.0 {
        return 0.0;
    }
    (((access_count + 1.0).ln() / USAGE_LOG_BASE.ln()) as f32).clamp(0.0, 1.0)
}

/// Weighted sum of the four component scores, clamped to `[0, 1]`.
pub fn composite_score(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f32 {
    let raw = weights.similarity * breakdown.similarity
        + weights.recency * breakdown.recency
        + weights.priority * breakdown.priority
        + weights.usage * breakdown.usage;
    raw.clamp(0.0, 1.0)
}

/// Ranks hydrated memories against their pre-computed similarity, sorted by
/// composite score descending (ties broken by stable input order, which
/// `sort_by` on a stable sort already guarantees).
pub fn rank(
    candidates: Vec<(Memory, f32)>,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> Vec<ScoredMemory> {
    let mut scored: Vec<ScoredMemory> = candidates
        .into_iter()
        .map(|(memory, similarity)| {
            let breakdown = ScoreBreakdown {
                similarity: similarity_score(similarity),
                recency: recency_score(memory.created_at, now),
                priority: priority_score(memory.priority.as_str()),
                usage: usage_score(memory.access_count),
            };
            let score = composite_score(&breakdown, weights);
            ScoredMemory { memory, score, breakdown }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_priority_score_mapping_and_case_insensitivity() {
        assert_eq!(priority_score("CORE"), 1.0);
        assert_eq!(priority_score("core"), 1.0);
        assert_eq!(priority_score("High"), 0.75);
        assert_eq!(priority_score("normal"), 0.5);
        assert_eq!(priority_score("LOW"), 0.25);
        assert_eq!(priority_score(""), 0.5);
        assert_eq!(priority_score("unknown"), 0.5);
    }

    #[test]
    fn test_usage_score_boundaries() {
        assert_eq!(usage_score(0), 0.0);
        assert_eq!(usage_score(-5), 0.0);
        assert!((usage_score(100) - 1.0).abs() < 0.02);
        assert_eq!(usage_score(1_000_000), 1.0);
    }

    #[test]
    fn test_recency_score_boundaries() {
        let now = Utc::now();
        assert!(recency_score(now, now) >= 0.99);
        assert!(recency_score(now + Duration::days(5), now) >= 1.0 - 1e-6);

        let thirty_days_ago = now - Duration::days(30);
        let score_30 = recency_score(thirty_days_ago, now);
        assert!((score_30 - (1.0f32 / std::f32::consts::E)).abs() < 0.01);

        let sixty_days_ago = now - Duration::days(60);
        let score_60 = recency_score(sixty_days_ago, now);
        assert!((score_60 - (1.0f32 / std::f32::consts::E.powi(2))).abs() < 0.01);
    }

    #[test]
    fn test_composite_score_is_clamped_and_weighted() {
        let breakdown = ScoreBreakdown {
            similarity: 1.0,
            recency: 1.0,
            priority: 1.0,
            usage: 1.0,
        };
        let weights = ScoringWeights::default();
        assert!((composite_score(&breakdown, &weights) - 1.0).abs() < 1e-6);

        let zero = ScoreBreakdown {
            similarity: 0.0,
            recency: 0.0,
            priority: 0.0,
            usage: 0.0,
        };
        assert_eq!(composite_score(&zero, &weights), 0.0);
    }

    #[test]
    fn test_rank_sorts_by_composite_descending() {
        use crate::models::Priority;

        let now = Utc::now();
        let make = |id: i64, priority: Priority| Memory {
            id,
            content: "x".to_string(),
            content_hash: format!("h{id}"),
            priority,
            category: None,
            tags: vec![],
            project_id: None,
            source: None,
            created_at: now,
            updated_at: now,
            embedding_model: "stub".to_string(),
            embedding_model_version: "1".to_string(),
            embedding_dimension: 4,
            access_count: 0,
            last_accessed_at: None,
            usage_contexts: vec![],
        };

        let candidates = vec![
            (make(1, Priority::Low), 0.9),
            (make(2, Priority::High), 0.9),
        ];
        let ranked = rank(candidates, &ScoringWeights::default(), now);
        assert_eq!(ranked[0].memory.id, 2);
        assert_eq!(ranked[1].memory.id, 1);
        assert!(ranked[0].score >= ranked[1].score);
    }
}
