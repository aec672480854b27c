//! End-to-end recommendation run: classify, locate, discover, rank.

use serde::Serialize;

use carefind_clients::{Geocoder, RadiusClient, RegistryClient, RoutingClient};
use carefind_core::{Address, CareTier, GeoPoint, RankedCandidate, SymptomTable, SymptomTerm};

use crate::discovery::{DiscoveryConfig, DiscoveryEngine, SearchScope};
use crate::error::PipelineError;
use crate::rank::rank;

/// Result of one recommendation run.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub care_tier: CareTier,
    pub origin_address: Address,
    pub origin: GeoPoint,
    pub scope: SearchScope,
    /// Nearest first; never empty.
    pub ranked: Vec<RankedCandidate>,
}

impl Recommendation {
    /// The nearest facility.
    #[must_use]
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.ranked.first()
    }
}

/// Owns the service clients for a run. Each `recommend` call is independent;
/// the only state shared between calls is the geocoder's request gate.
pub struct CareFinder {
    registry: RegistryClient,
    radius: RadiusClient,
    geocoder: Geocoder,
    routing: RoutingClient,
    symptoms: SymptomTable,
    discovery: DiscoveryConfig,
}

impl CareFinder {
    #[must_use]
    pub fn new(
        registry: RegistryClient,
        radius: RadiusClient,
        geocoder: Geocoder,
        routing: RoutingClient,
        symptoms: SymptomTable,
        discovery: DiscoveryConfig,
    ) -> Self {
        Self {
            registry,
            radius,
            geocoder,
            routing,
            symptoms,
            discovery,
        }
    }

    #[must_use]
    pub fn classify(&self, terms: &[SymptomTerm]) -> CareTier {
        self.symptoms.classify(terms)
    }

    /// Geocoder handle, for resolving free-text addresses before a run.
    #[must_use]
    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Runs the full pipeline for one user.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Geocoder`] / [`PipelineError::OriginNotGeocoded`]
    ///   when the home address cannot be placed on the map.
    /// - [`PipelineError::NotFound`] when no facility of the tier exists in or
    ///   near the home postal code.
    /// - [`PipelineError::NoCandidates`] when facilities were found but
    ///   none could be geocoded or routed to.
    /// - [`PipelineError::Registry`], [`PipelineError::Radius`] and
    ///   [`PipelineError::Routing`] on service failures.
    pub async fn recommend(
        &self,
        terms: &[SymptomTerm],
        home: &Address,
    ) -> Result<Recommendation, PipelineError> {
        let care_tier = self.classify(terms);
        tracing::info!(care_tier = %care_tier, symptoms = terms.len(), "symptoms classified");

        let origin = self
            .geocoder
            .geocode(home)
            .await
            .map_err(PipelineError::Geocoder)?
            .ok_or_else(|| PipelineError::OriginNotGeocoded {
                address: home.to_string(),
            })?;

        let engine = DiscoveryEngine::new(
            &self.registry,
            &self.radius,
            &self.geocoder,
            &self.discovery,
        );
        let discovery = engine.discover(care_tier, &home.postal_code).await?;
        if discovery.candidates.is_empty() {
            return Err(PipelineError::NoCandidates { care_tier });
        }

        let ranked = rank(&self.routing, origin, discovery.candidates).await?;
        if ranked.is_empty() {
            return Err(PipelineError::NoCandidates { care_tier });
        }

        if let Some(best) = ranked.first() {
            tracing::info!(
                care_tier = %care_tier,
                organization = %best.candidate.organization_name,
                distance_miles = best.distance_miles,
                alternatives = ranked.len() - 1,
                "recommendation ready"
            );
        }

        Ok(Recommendation {
            care_tier,
            origin_address: home.clone(),
            origin,
            scope: discovery.scope,
            ranked,
        })
    }
}
