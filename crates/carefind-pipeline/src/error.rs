use carefind_clients::ClientError;
use carefind_core::CareTier;
use thiserror::Error;

/// Fatal outcomes of a recommendation run.
///
/// Transport variants name the service that failed. Per-candidate geocode
/// misses never appear here; they only shrink the candidate set.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("provider registry request failed")]
    Registry(#[source] ClientError),

    #[error("zip radius lookup failed")]
    Radius(#[source] ClientError),

    #[error("geocoding service failed")]
    Geocoder(#[source] ClientError),

    #[error("routing service failed")]
    Routing(#[source] ClientError),

    #[error("no matching {care_tier} facility found near {postal_code}")]
    NotFound {
        care_tier: CareTier,
        postal_code: String,
    },

    #[error("{care_tier} facilities were listed near you, but none could be located on the map")]
    NoCandidates { care_tier: CareTier },

    #[error("could not locate the address \"{address}\"")]
    OriginNotGeocoded { address: String },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn transport_error_names_service_once_and_keeps_source() {
        let err = PipelineError::Routing(ClientError::Api {
            service: "routing",
            message: "NotAuthorized (HTTP 401): Invalid Token".to_string(),
        });
        assert_eq!(err.to_string(), "routing service failed");
        let source = err.source().expect("client error is the source");
        assert!(source.to_string().contains("Invalid Token"), "got {source}");
    }
}
