//! Discovery engine: adaptive-radius registry search, then dedup and geocode.
//!
//! The search is an explicit state machine:
//!
//! | State    | Action                                               | Next                              |
//! |----------|------------------------------------------------------|-----------------------------------|
//! | `Exact`  | registry query scoped to the home postal code        | `Accepted` or first `Expand`      |
//! | `Expand` | radius lookup + citywide query filtered to that set  | `Accepted`, wider `Expand`, `Failed` |
//! | `Accepted` | FILTER produced at least one candidate             | DEDUP → cap → GEOCODE → done      |
//! | `Failed` | expansion budget spent with nothing accepted         | `PipelineError::NotFound`         |
//!
//! Every attempt restarts its registry query; nothing is carried between
//! attempts except the radius and attempt counter.

use serde::Serialize;

use carefind_clients::{Geocoder, RadiusClient, RegistryClient};
use carefind_core::{AppConfig, Candidate, CareTier, ServiceArea};

use crate::error::PipelineError;
use crate::filter::{accept_results, dedup_candidates};

/// Tunables for one discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub area: ServiceArea,
    /// Upper bound on returned candidates; also bounds geocoder calls.
    pub max_candidates: usize,
    /// Radius expansions allowed after the exact search comes up empty.
    pub max_radius_expansions: u32,
    pub initial_radius_miles: u32,
    pub radius_step_miles: u32,
}

impl DiscoveryConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            area: config.service_area.clone(),
            max_candidates: config.max_candidates,
            max_radius_expansions: config.max_radius_expansions,
            initial_radius_miles: config.initial_radius_miles,
            radius_step_miles: config.radius_step_miles,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            area: ServiceArea::default(),
            max_candidates: 20,
            max_radius_expansions: 2,
            initial_radius_miles: 1,
            radius_step_miles: 1,
        }
    }
}

/// Which search produced the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchScope {
    /// The home postal code alone.
    Exact,
    /// Postal codes within `radius_miles`; `attempt` counts from 1.
    Expanded { radius_miles: u32, attempt: u32 },
}

#[derive(Debug)]
enum SearchState {
    Exact,
    Expand { radius_miles: u32, attempt: u32 },
    Accepted {
        scope: SearchScope,
        candidates: Vec<Candidate>,
    },
    Failed,
}

/// Where to go after an attempt at `scope` accepted nothing.
fn after_empty(scope: SearchScope, config: &DiscoveryConfig) -> SearchState {
    match scope {
        SearchScope::Exact if config.max_radius_expansions > 0 => SearchState::Expand {
            radius_miles: config.initial_radius_miles,
            attempt: 1,
        },
        SearchScope::Expanded {
            radius_miles,
            attempt,
        } if attempt < config.max_radius_expansions => SearchState::Expand {
            radius_miles: radius_miles.saturating_add(config.radius_step_miles),
            attempt: attempt + 1,
        },
        SearchScope::Exact | SearchScope::Expanded { .. } => SearchState::Failed,
    }
}

/// Outcome of a successful discovery.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub scope: SearchScope,
    /// Geocoded candidates, newest registry entry first, at most `max_candidates`.
    pub candidates: Vec<Candidate>,
    /// Candidates dropped because the geocoder could not place them.
    pub geocode_misses: usize,
}

pub struct DiscoveryEngine<'a> {
    registry: &'a RegistryClient,
    radius: &'a RadiusClient,
    geocoder: &'a Geocoder,
    config: &'a DiscoveryConfig,
}

impl<'a> DiscoveryEngine<'a> {
    #[must_use]
    pub fn new(
        registry: &'a RegistryClient,
        radius: &'a RadiusClient,
        geocoder: &'a Geocoder,
        config: &'a DiscoveryConfig,
    ) -> Self {
        Self {
            registry,
            radius,
            geocoder,
            config,
        }
    }

    /// Finds up to `max_candidates` geocoded facilities offering `tier` in or
    /// near `home_postal_code`.
    ///
    /// The returned list may be empty if every accepted candidate failed to
    /// geocode.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] when the exact search and every allowed
    ///   radius expansion accept nothing.
    /// - [`PipelineError::Registry`] / [`PipelineError::Radius`] on any
    ///   transport failure from those services.
    pub async fn discover(
        &self,
        tier: CareTier,
        home_postal_code: &str,
    ) -> Result<Discovery, PipelineError> {
        let (scope, accepted) = self.search(tier, home_postal_code).await?;

        let accepted_count = accepted.len();
        let mut unique = dedup_candidates(accepted);
        let unique_count = unique.len();
        unique.truncate(self.config.max_candidates);
        tracing::info!(
            ?scope,
            accepted = accepted_count,
            unique = unique_count,
            to_geocode = unique.len(),
            "registry candidates deduplicated"
        );

        let (mut candidates, geocode_misses) = self.geocode_all(unique).await;
        candidates.truncate(self.config.max_candidates);

        tracing::info!(
            ?scope,
            candidates = candidates.len(),
            geocode_misses,
            "discovery complete"
        );
        Ok(Discovery {
            scope,
            candidates,
            geocode_misses,
        })
    }

    async fn search(
        &self,
        tier: CareTier,
        home_postal_code: &str,
    ) -> Result<(SearchScope, Vec<Candidate>), PipelineError> {
        let description = tier.registry_description();
        let mut state = SearchState::Exact;

        loop {
            state = match state {
                SearchState::Exact => {
                    let results = self
                        .registry
                        .query_providers(description, Some(home_postal_code))
                        .await
                        .map_err(PipelineError::Registry)?;
                    let candidates = accept_results(&results, tier, &self.config.area, None);
                    tracing::info!(
                        postal_code = home_postal_code,
                        raw = results.len(),
                        accepted = candidates.len(),
                        "exact postal code search"
                    );
                    if candidates.is_empty() {
                        after_empty(SearchScope::Exact, self.config)
                    } else {
                        SearchState::Accepted {
                            scope: SearchScope::Exact,
                            candidates,
                        }
                    }
                }
                SearchState::Expand {
                    radius_miles,
                    attempt,
                } => {
                    let nearby = self
                        .radius
                        .expand_radius(home_postal_code, radius_miles)
                        .await
                        .map_err(PipelineError::Radius)?;
                    let results = self
                        .registry
                        .query_providers(description, None)
                        .await
                        .map_err(PipelineError::Registry)?;
                    let candidates =
                        accept_results(&results, tier, &self.config.area, Some(&nearby));
                    tracing::info!(
                        postal_code = home_postal_code,
                        radius_miles,
                        attempt,
                        nearby_codes = nearby.len(),
                        raw = results.len(),
                        accepted = candidates.len(),
                        "expanded radius search"
                    );
                    let scope = SearchScope::Expanded {
                        radius_miles,
                        attempt,
                    };
                    if candidates.is_empty() {
                        after_empty(scope, self.config)
                    } else {
                        SearchState::Accepted { scope, candidates }
                    }
                }
                SearchState::Accepted { scope, candidates } => return Ok((scope, candidates)),
                SearchState::Failed => {
                    tracing::warn!(
                        care_tier = %tier,
                        postal_code = home_postal_code,
                        "no candidates after radius expansion"
                    );
                    return Err(PipelineError::NotFound {
                        care_tier: tier,
                        postal_code: home_postal_code.to_owned(),
                    });
                }
            };
        }
    }

    /// Geocodes serially; the geocoder's gate enforces spacing between calls.
    async fn geocode_all(&self, candidates: Vec<Candidate>) -> (Vec<Candidate>, usize) {
        let mut located = Vec::with_capacity(candidates.len());
        let mut misses = 0usize;

        for candidate in candidates {
            match self.geocoder.geocode(&candidate.address).await {
                Ok(Some(point)) => located.push(candidate.with_geo(point)),
                Ok(None) => {
                    misses += 1;
                    tracing::warn!(
                        organization = %candidate.organization_name,
                        address = %candidate.address,
                        "geocoder found no match, dropping candidate"
                    );
                }
                Err(e) => {
                    misses += 1;
                    tracing::warn!(
                        organization = %candidate.organization_name,
                        address = %candidate.address,
                        error = %e,
                        "geocoding failed, dropping candidate"
                    );
                }
            }
        }

        (located, misses)
    }
}
