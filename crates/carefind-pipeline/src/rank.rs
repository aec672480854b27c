//! Ranking by driving distance from the origin.

use carefind_clients::{RouteLeg, RoutingClient};
use carefind_core::{Candidate, GeoPoint, RankedCandidate};

use crate::error::PipelineError;

/// Ranks geocoded candidates by driving distance from `origin`, nearest first.
///
/// Issues a single distance-matrix request for every located candidate.
/// Candidates without a point are skipped before the request.
///
/// # Errors
///
/// Returns [`PipelineError::Routing`] if the matrix request fails or its
/// response cannot be aligned with the candidates.
pub async fn rank(
    routing: &RoutingClient,
    origin: GeoPoint,
    candidates: Vec<Candidate>,
) -> Result<Vec<RankedCandidate>, PipelineError> {
    let (located, points): (Vec<Candidate>, Vec<GeoPoint>) = candidates
        .into_iter()
        .filter_map(|candidate| match candidate.geo {
            Some(point) => Some((candidate, point)),
            None => {
                tracing::warn!(
                    organization = %candidate.organization_name,
                    "candidate has no coordinates, excluded from ranking"
                );
                None
            }
        })
        .unzip();

    let legs = routing
        .distance_matrix(origin, &points)
        .await
        .map_err(PipelineError::Routing)?;

    let ranked = rank_with_legs(located, &legs);
    tracing::info!(
        requested = points.len(),
        ranked = ranked.len(),
        "distance matrix ranking complete"
    );
    Ok(ranked)
}

/// Attaches each leg to the candidate at the same index and sorts ascending by
/// distance in miles.
///
/// The sort is stable, so equal distances keep registry recency order.
/// Candidates whose leg has no route are dropped.
#[must_use]
pub fn rank_with_legs(candidates: Vec<Candidate>, legs: &[RouteLeg]) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .zip(legs)
        .filter_map(|(candidate, leg)| {
            if let (Some(meters), Some(seconds)) = (leg.distance_meters, leg.duration_seconds) {
                Some(RankedCandidate::new(candidate, meters, seconds))
            } else {
                tracing::warn!(
                    organization = %candidate.organization_name,
                    "no driving route to candidate, excluded from ranking"
                );
                None
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    ranked
}
