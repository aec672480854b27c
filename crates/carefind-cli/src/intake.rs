//! Home address intake.
//!
//! Accepts either a street plus postal code, a single line shaped like
//! `"350 5th Ave, New York, NY 10118"` (a comma before the ZIP is allowed),
//! or any other free text, which is
//! resolved through the geocoder. City and state always come from the
//! service area.

use std::sync::LazyLock;

use carefind_clients::Geocoder;
use carefind_core::{Address, ServiceArea};
use regex::Regex;

static ADDRESS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<street>[^,]+?)\s*,\s*(?P<city>[^,]+?)\s*,\s*(?P<state>[A-Za-z]{2})\s*,?\s*(?P<zip>\d{5})(?:-\d{4})?\s*$",
    )
    .expect("valid address regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HomeInput {
    Structured { street: String, zip: String },
    FreeText(String),
}

/// Parses `"street, city, ST 12345"`.
///
/// Returns `Ok(None)` when the text is not in that shape, and an error when
/// it is but names a city or state outside the service area.
pub(crate) fn parse_address_line(
    line: &str,
    area: &ServiceArea,
) -> anyhow::Result<Option<Address>> {
    let Some(caps) = ADDRESS_LINE_RE.captures(line) else {
        return Ok(None);
    };

    let city = &caps["city"];
    let state = &caps["state"];
    if !area.contains_city(city) || !state.eq_ignore_ascii_case(&area.state) {
        anyhow::bail!(
            "only {}, {} addresses are supported (got {city}, {state})",
            area.city,
            area.state
        );
    }

    let address = Address::in_area(&caps["street"], &caps["zip"], area)?;
    Ok(Some(address))
}

/// Turns the user's input into a structured address inside `area`.
///
/// # Errors
///
/// Returns an error if the input is malformed, outside the service area, or
/// the geocoder cannot resolve free text to a street and postal code.
pub(crate) async fn resolve_home(
    input: HomeInput,
    area: &ServiceArea,
    geocoder: &Geocoder,
) -> anyhow::Result<Address> {
    match input {
        HomeInput::Structured { street, zip } => Ok(Address::in_area(&street, &zip, area)?),
        HomeInput::FreeText(text) => {
            if let Some(address) = parse_address_line(&text, area)? {
                return Ok(address);
            }

            let query = format!("{text}, {}, {}", area.city, area.state);
            let resolved = geocoder
                .resolve(&query)
                .await
                .map_err(|e| anyhow::anyhow!("address lookup failed: {e}"))?
                .ok_or_else(|| anyhow::anyhow!("could not find an address matching \"{text}\""))?;

            let street = resolved.street();
            let postcode = resolved.postcode.as_deref().ok_or_else(|| {
                anyhow::anyhow!("\"{text}\" resolved to {street}, which has no postal code")
            })?;
            let address = Address::in_area(&street, postcode, area)?;
            tracing::info!(input = %text, resolved = %address, "resolved free-text address");
            Ok(address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_street_city_state_zip() {
        let address = parse_address_line("350 5th Ave, New York, NY 10118", &ServiceArea::default())
            .unwrap()
            .expect("line should match");
        assert_eq!(address.street, "350 5th Ave");
        assert_eq!(address.city, "New York");
        assert_eq!(address.state, "NY");
        assert_eq!(address.postal_code, "10118");
    }

    #[test]
    fn accepts_zip_plus_four_and_lowercase_city() {
        let address = parse_address_line("1 Main St, new york, ny 10001-1234", &ServiceArea::default())
            .unwrap()
            .expect("line should match");
        assert_eq!(address.postal_code, "10001");
        assert_eq!(address.city, "New York");
    }

    #[test]
    fn accepts_comma_before_zip() {
        let area = ServiceArea::default();
        let original = Address::in_area("350 5th Ave", "10118", &area).unwrap();
        let reparsed = parse_address_line(&original.to_string(), &area)
            .unwrap()
            .expect("display form should match");
        assert_eq!(reparsed, original);
    }

    #[test]
    fn free_text_is_not_a_structured_line() {
        let parsed = parse_address_line("empire state building", &ServiceArea::default()).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn other_city_is_rejected() {
        let err = parse_address_line("1 Main St, Boston, MA 02108", &ServiceArea::default())
            .unwrap_err();
        assert!(err.to_string().contains("only New York, NY"), "got {err}");
    }
}
