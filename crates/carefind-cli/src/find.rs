//! `find` and `classify` command handlers.
//!
//! `find` builds every service client from config, resolves the home address,
//! runs the pipeline, and prints the result. `classify` never touches the
//! network or service config.

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use carefind_clients::{
    Geocoder, RadiusClient, RegistryClient, RequestGate, RetryPolicy, RoutingClient,
};
use carefind_core::{
    join_terms, load_symptom_table, parse_symptoms, AppConfig, CareTier, RankedCandidate,
    SymptomTerm,
};
use carefind_pipeline::{CareFinder, DiscoveryConfig, Recommendation};

use crate::intake::{self, HomeInput};

/// How to present a recommendation.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Output {
    pub alternatives: usize,
    pub json: bool,
}

/// Run the full recommendation for one user.
///
/// # Errors
///
/// Returns an error if an API key is missing, the symptoms or address are
/// invalid, a client cannot be built, or the pipeline fails.
pub(crate) async fn run_find(
    config: &AppConfig,
    raw_symptoms: &str,
    home: HomeInput,
    output: Output,
) -> anyhow::Result<()> {
    let terms = parse_symptoms(raw_symptoms)?;
    let symptoms = load_symptom_table(config.symptoms_path.as_deref())?;

    let access_token = config.require_mapbox_access_token()?;
    let zip_key = config.require_zipcodeapi_key()?;

    let finder = build_finder(config, symptoms, access_token, zip_key)?;
    let address = intake::resolve_home(home, &config.service_area, finder.geocoder()).await?;

    if !output.json {
        println!("{}", classification_message(&terms, finder.classify(&terms)));
    }

    let recommendation = finder.recommend(&terms, &address).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        println!("{}", recommendation_message(&recommendation));
        let runners_up = alternatives_message(&recommendation, output.alternatives);
        if !runners_up.is_empty() {
            println!("\n{runners_up}");
        }
    }
    Ok(())
}

/// Classify a symptom list and render the advice sentence.
///
/// Needs no service config, only the optional symptoms file.
///
/// # Errors
///
/// Returns an error if no symptom is given or the symptoms file is invalid.
pub(crate) fn run_classify(
    raw_symptoms: &str,
    symptoms_file: Option<&Path>,
) -> anyhow::Result<String> {
    let terms = parse_symptoms(raw_symptoms)?;
    let table = load_symptom_table(symptoms_file)?;
    let tier = table.classify(&terms);
    tracing::debug!(care_tier = %tier, symptoms = terms.len(), "classified");
    Ok(classification_message(&terms, tier))
}

fn build_finder(
    config: &AppConfig,
    symptoms: carefind_core::SymptomTable,
    access_token: &str,
    zip_key: &str,
) -> anyhow::Result<CareFinder> {
    let registry = RegistryClient::with_base_url(
        &config.registry_base_url,
        config.service_area.clone(),
        config.registry_result_limit,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow!("failed to build registry client: {e}"))?;

    let radius = RadiusClient::with_base_url(
        &config.radius_base_url,
        zip_key,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow!("failed to build zip radius client: {e}"))?;

    // One gate per process: every geocoder call in this run shares it.
    let gate = Arc::new(RequestGate::from_millis(config.geocoder_min_delay_ms));
    let retry = RetryPolicy {
        max_retries: config.geocoder_max_retries,
        backoff_base_ms: config.geocoder_retry_backoff_base_ms,
    };
    let geocoder = Geocoder::with_base_url(
        &config.geocoder_base_url,
        config.geocoder_timeout_secs,
        &config.user_agent,
        gate,
        retry,
    )
    .map_err(|e| anyhow!("failed to build geocoder: {e}"))?;

    let routing = RoutingClient::with_base_url(
        &config.routing_base_url,
        access_token,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow!("failed to build routing client: {e}"))?;

    Ok(CareFinder::new(
        registry,
        radius,
        geocoder,
        routing,
        symptoms,
        DiscoveryConfig::from_app_config(config),
    ))
}

pub(crate) fn classification_message(terms: &[SymptomTerm], tier: CareTier) -> String {
    format!(
        "Based on these symptom(s) of {}, we recommend you go to {tier}.",
        join_terms(terms)
    )
}

pub(crate) fn recommendation_message(recommendation: &Recommendation) -> String {
    let Some(best) = recommendation.best() else {
        return format!(
            "No {} could be found near {}.",
            recommendation.care_tier, recommendation.origin_address
        );
    };
    format!(
        "The nearest {} to {} is {}, located {} away.\nIt is approximately a {} drive.\nThe address is {}",
        recommendation.care_tier,
        recommendation.origin_address,
        best.candidate.organization_name,
        best.distance_label(),
        best.duration_label(),
        best.candidate.address,
    )
}

pub(crate) fn alternatives_message(recommendation: &Recommendation, count: usize) -> String {
    let lines: Vec<String> = recommendation
        .ranked
        .iter()
        .skip(1)
        .take(count)
        .enumerate()
        .map(|(i, ranked)| alternative_line(i + 2, ranked))
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("Other options:\n{}", lines.join("\n"))
}

fn alternative_line(position: usize, ranked: &RankedCandidate) -> String {
    let phone = ranked
        .candidate
        .phone
        .as_deref()
        .map(|p| format!(", tel. {p}"))
        .unwrap_or_default();
    format!(
        "  {position}. {} ({}, about {}) at {}{phone}",
        ranked.candidate.organization_name,
        ranked.distance_label(),
        ranked.duration_label(),
        ranked.candidate.address,
    )
}
