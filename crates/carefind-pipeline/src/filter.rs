//! FILTER and DEDUP stages: turning raw registry results into candidates.

use std::collections::HashSet;

use chrono::NaiveDate;

use carefind_clients::{ProviderAddress, ProviderResult};
use carefind_core::types::normalize_postal_code;
use carefind_core::{Address, Candidate, CareTier, ServiceArea};

const LOCATION_PURPOSE: &str = "LOCATION";

/// Keeps the results that describe a physical site in the service area whose
/// primary taxonomy matches `tier`.
///
/// When `nearby` is given, the site's postal code must also be in that set
/// (used for citywide queries during radius expansion).
#[must_use]
pub fn accept_results(
    results: &[ProviderResult],
    tier: CareTier,
    area: &ServiceArea,
    nearby: Option<&HashSet<String>>,
) -> Vec<Candidate> {
    results
        .iter()
        .filter_map(|result| accept_result(result, tier, area, nearby))
        .collect()
}

fn accept_result(
    result: &ProviderResult,
    tier: CareTier,
    area: &ServiceArea,
    nearby: Option<&HashSet<String>>,
) -> Option<Candidate> {
    let name = result
        .basic
        .organization_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())?;

    let Some(site) = result
        .addresses
        .iter()
        .find(|a| is_physical_site_in_scope(a, area, nearby))
    else {
        tracing::trace!(organization = name, "no physical address in scope");
        return None;
    };

    if !primary_taxonomy_matches(result, tier) {
        tracing::trace!(organization = name, "primary taxonomy does not match care tier");
        return None;
    }

    let last_updated = result
        .basic
        .last_updated
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());
    let Some(last_updated) = last_updated else {
        tracing::warn!(
            organization = name,
            raw = ?result.basic.last_updated,
            "skipping registry result with unreadable last_updated"
        );
        return None;
    };

    let address = match Address::new(&site.address_1, &site.city, &site.state, &site.postal_code) {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!(organization = name, error = %e, "skipping registry result with bad address");
            return None;
        }
    };

    let phone = site
        .telephone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned);

    Some(Candidate {
        care_tier: tier,
        organization_name: name.to_owned(),
        address,
        phone,
        last_updated,
        geo: None,
    })
}

fn is_physical_site_in_scope(
    address: &ProviderAddress,
    area: &ServiceArea,
    nearby: Option<&HashSet<String>>,
) -> bool {
    if !address.address_purpose.eq_ignore_ascii_case(LOCATION_PURPOSE)
        || !area.contains_city(&address.city)
    {
        return false;
    }
    match nearby {
        None => true,
        Some(codes) => normalize_postal_code(&address.postal_code)
            .is_some_and(|code| codes.contains(&code)),
    }
}

/// The organization's primary taxonomy must name the tier; secondary
/// taxonomies never qualify a result.
fn primary_taxonomy_matches(result: &ProviderResult, tier: CareTier) -> bool {
    let wanted = tier.registry_description().to_lowercase();
    result
        .taxonomies
        .iter()
        .find(|t| t.primary)
        .is_some_and(|t| t.desc.to_lowercase().contains(&wanted))
}

/// Sorts by `last_updated` (newest first) and drops later candidates that
/// share a street address and phone number with an earlier one.
///
/// The sort is stable, so equal dates keep registry order. Idempotent.
#[must_use]
pub fn dedup_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    candidates.retain(|c| {
        let (street, phone) = c.dedup_key();
        seen.insert((street.to_owned(), phone.map(str::to_owned)))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use carefind_clients::{ProviderBasic, ProviderTaxonomy};

    use super::*;

    fn site(purpose: &str, street: &str, city: &str, zip: &str, phone: Option<&str>) -> ProviderAddress {
        ProviderAddress {
            address_purpose: purpose.to_owned(),
            address_1: street.to_owned(),
            city: city.to_owned(),
            state: "NY".to_owned(),
            postal_code: zip.to_owned(),
            telephone_number: phone.map(str::to_owned),
        }
    }

    fn result(
        name: &str,
        updated: &str,
        addresses: Vec<ProviderAddress>,
        taxonomies: Vec<(&str, bool)>,
    ) -> ProviderResult {
        ProviderResult {
            basic: ProviderBasic {
                organization_name: Some(name.to_owned()),
                last_updated: Some(updated.to_owned()),
            },
            addresses,
            taxonomies: taxonomies
                .into_iter()
                .map(|(desc, primary)| ProviderTaxonomy {
                    desc: desc.to_owned(),
                    primary,
                })
                .collect(),
        }
    }

    fn urgent_care(name: &str, street: &str, zip: &str, phone: Option<&str>, updated: &str) -> ProviderResult {
        result(
            name,
            updated,
            vec![site("LOCATION", street, "NEW YORK", zip, phone)],
            vec![("Clinic/Center, Urgent Care", true)],
        )
    }

    fn candidate(name: &str, street: &str, phone: Option<&str>, updated: (i32, u32, u32)) -> Candidate {
        Candidate {
            care_tier: CareTier::UrgentCare,
            organization_name: name.to_owned(),
            address: Address::new(street, "NEW YORK", "NY", "10001").unwrap(),
            phone: phone.map(str::to_owned),
            last_updated: NaiveDate::from_ymd_opt(updated.0, updated.1, updated.2).unwrap(),
            geo: None,
        }
    }

    #[test]
    fn accepts_location_address_with_matching_primary_taxonomy() {
        let results = vec![urgent_care("CITY MD", "85 5TH AVE", "100033019", Some("212-555-0100"), "2024-06-12")];
        let accepted = accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None);

        assert_eq!(accepted.len(), 1);
        let c = &accepted[0];
        assert_eq!(c.organization_name, "CITY MD");
        assert_eq!(c.address.street, "85 5TH AVE");
        assert_eq!(c.address.postal_code, "10003");
        assert_eq!(c.phone.as_deref(), Some("212-555-0100"));
        assert_eq!(c.last_updated, NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());
        assert!(c.geo.is_none());
    }

    #[test]
    fn mailing_address_is_skipped_in_favor_of_location() {
        let results = vec![result(
            "CITY MD",
            "2024-01-01",
            vec![
                site("MAILING", "PO BOX 9", "NEW YORK", "10001", None),
                site("LOCATION", "1 MAIN ST", "NEW YORK", "10002", None),
            ],
            vec![("Urgent Care", true)],
        )];
        let accepted = accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None);
        assert_eq!(accepted[0].address.street, "1 MAIN ST");
    }

    #[test]
    fn mailing_only_result_is_rejected() {
        let results = vec![result(
            "CITY MD",
            "2024-01-01",
            vec![site("MAILING", "PO BOX 9", "NEW YORK", "10001", None)],
            vec![("Urgent Care", true)],
        )];
        assert!(accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None).is_empty());
    }

    #[test]
    fn location_outside_service_city_is_rejected() {
        let results = vec![result(
            "JERSEY CARE",
            "2024-01-01",
            vec![site("LOCATION", "1 RIVER RD", "HOBOKEN", "07030", None)],
            vec![("Urgent Care", true)],
        )];
        assert!(accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None).is_empty());
    }

    #[test]
    fn secondary_taxonomy_match_does_not_qualify() {
        let results = vec![result(
            "FAMILY PRACTICE",
            "2024-01-01",
            vec![site("LOCATION", "1 MAIN ST", "NEW YORK", "10001", None)],
            vec![("Family Medicine", true), ("Clinic/Center, Urgent Care", false)],
        )];
        assert!(accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None).is_empty());
    }

    #[test]
    fn emergency_room_matches_emergency_medicine_taxonomy() {
        let results = vec![result(
            "BELLEVUE ED GROUP",
            "2024-01-01",
            vec![site("LOCATION", "462 1ST AVE", "NEW YORK", "10016", None)],
            vec![("Emergency Medicine", true)],
        )];
        let accepted = accept_results(&results, CareTier::EmergencyRoom, &ServiceArea::default(), None);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].care_tier, CareTier::EmergencyRoom);
    }

    #[test]
    fn nearby_set_restricts_postal_codes() {
        let results = vec![
            urgent_care("NEAR", "1 MAIN ST", "100180000", None, "2024-01-01"),
            urgent_care("FAR", "2 MAIN ST", "10038", None, "2024-01-01"),
        ];
        let nearby: HashSet<String> = ["10001", "10018"].iter().map(|s| (*s).to_owned()).collect();
        let accepted = accept_results(
            &results,
            CareTier::UrgentCare,
            &ServiceArea::default(),
            Some(&nearby),
        );
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].organization_name, "NEAR");
    }

    #[test]
    fn unreadable_last_updated_is_rejected() {
        let results = vec![urgent_care("CITY MD", "1 MAIN ST", "10001", None, "last tuesday")];
        assert!(accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None).is_empty());
    }

    #[test]
    fn missing_organization_name_is_rejected() {
        let mut r = urgent_care("x", "1 MAIN ST", "10001", None, "2024-01-01");
        r.basic.organization_name = None;
        assert!(accept_results(&[r], CareTier::UrgentCare, &ServiceArea::default(), None).is_empty());
    }

    #[test]
    fn blank_phone_becomes_none() {
        let results = vec![urgent_care("CITY MD", "1 MAIN ST", "10001", Some("  "), "2024-01-01")];
        let accepted = accept_results(&results, CareTier::UrgentCare, &ServiceArea::default(), None);
        assert!(accepted[0].phone.is_none());
    }

    #[test]
    fn dedup_keeps_most_recent_duplicate() {
        let older = candidate("OLD NAME", "1 MAIN ST", Some("212-555-0100"), (2022, 1, 1));
        let newer = candidate("NEW NAME", "1 MAIN ST", Some("212-555-0100"), (2024, 6, 12));
        let deduped = dedup_candidates(vec![older, newer]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].organization_name, "NEW NAME");
    }

    #[test]
    fn dedup_treats_different_phone_as_distinct() {
        let a = candidate("A", "1 MAIN ST", Some("212-555-0100"), (2024, 1, 1));
        let b = candidate("B", "1 MAIN ST", Some("212-555-0199"), (2024, 1, 1));
        let c = candidate("C", "1 MAIN ST", None, (2024, 1, 1));
        assert_eq!(dedup_candidates(vec![a, b, c]).len(), 3);
    }

    #[test]
    fn dedup_orders_newest_first() {
        let a = candidate("A", "1 MAIN ST", None, (2021, 1, 1));
        let b = candidate("B", "2 MAIN ST", None, (2024, 1, 1));
        let c = candidate("C", "3 MAIN ST", None, (2023, 1, 1));
        let names: Vec<String> = dedup_candidates(vec![a, b, c])
            .into_iter()
            .map(|c| c.organization_name)
            .collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let input = vec![
            candidate("A", "1 MAIN ST", Some("1"), (2021, 1, 1)),
            candidate("B", "1 MAIN ST", Some("1"), (2024, 1, 1)),
            candidate("C", "2 MAIN ST", None, (2023, 1, 1)),
            candidate("D", "2 MAIN ST", None, (2023, 1, 1)),
            candidate("E", "3 MAIN ST", Some("3"), (2020, 5, 5)),
        ];
        let once = dedup_candidates(input);
        let twice = dedup_candidates(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
