//! Place-of-publication cleanup.
//!
//! The directory prints US places as `"Anniston, AL USA"`, with an odd mix of
//! postal and AP-style state abbreviations. The paper id reliably starts with
//! the postal code (`"AL_AS"`), so the state is taken from there instead of
//! from the place string itself.
//!
//! Normalization is best effort: when the state can't be resolved the raw
//! string is kept, and callers can tell which path was taken from the
//! [`Normalized`] variant.

use crate::models::PaperListing;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static REPEATED_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(" {2,}").expect("valid regex"));

/// Postal abbreviation to full state (or territory) name.
static STATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("AL", "Alabama"),
        ("AK", "Alaska"),
        ("AZ", "Arizona"),
        ("AR", "Arkansas"),
        ("CA", "California"),
        ("CO", "Colorado"),
        ("CT", "Connecticut"),
        ("DE", "Delaware"),
        ("DC", "District of Columbia"),
        ("FL", "Florida"),
        ("GA", "Georgia"),
        ("HI", "Hawaii"),
        ("ID", "Idaho"),
        ("IL", "Illinois"),
        ("IN", "Indiana"),
        ("IA", "Iowa"),
        ("KS", "Kansas"),
        ("KY", "Kentucky"),
        ("LA", "Louisiana"),
        ("ME", "Maine"),
        ("MD", "Maryland"),
        ("MA", "Massachusetts"),
        ("MI", "Michigan"),
        ("MN", "Minnesota"),
        ("MS", "Mississippi"),
        ("MO", "Missouri"),
        ("MT", "Montana"),
        ("NE", "Nebraska"),
        ("NV", "Nevada"),
        ("NH", "New Hampshire"),
        ("NJ", "New Jersey"),
        ("NM", "New Mexico"),
        ("NY", "New York"),
        ("NC", "North Carolina"),
        ("ND", "North Dakota"),
        ("OH", "Ohio"),
        ("OK", "Oklahoma"),
        ("OR", "Oregon"),
        ("PA", "Pennsylvania"),
        ("RI", "Rhode Island"),
        ("SC", "South Carolina"),
        ("SD", "South Dakota"),
        ("TN", "Tennessee"),
        ("TX", "Texas"),
        ("UT", "Utah"),
        ("VT", "Vermont"),
        ("VA", "Virginia"),
        ("WA", "Washington"),
        ("WV", "West Virginia"),
        ("WI", "Wisconsin"),
        ("WY", "Wyoming"),
        ("AS", "American Samoa"),
        ("GU", "Guam"),
        ("MP", "Northern Mariana Islands"),
        ("PR", "Puerto Rico"),
        ("VI", "U.S. Virgin Islands"),
    ]
    .into_iter()
    .collect()
});

/// Outcome of [`normalize_place`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// A US place whose state abbreviation was replaced by the full name.
    Expanded(String),
    /// Spacing and the `", USA"` suffix were tidied; nothing else matched.
    Cleaned(String),
    /// The state couldn't be resolved, so the raw string is kept as scraped.
    Fallback(String),
}

impl Normalized {
    pub fn into_place(self) -> String {
        match self {
            Normalized::Expanded(s) | Normalized::Cleaned(s) | Normalized::Fallback(s) => s,
        }
    }
}

/// Normalize a raw place string for the paper with directory id `id`.
///
/// Repeated spaces collapse to one, a comma is inserted before a trailing
/// `USA`, and a `"City, XX, USA"` place gets its middle part replaced with the
/// state named by the id prefix (everything before the first `_`).
///
/// # Examples
///
/// ```ignore
/// let place = normalize_place("AL_AS", "Anniston, AL USA").into_place();
/// assert_eq!(place, "Anniston, Alabama, USA");
/// ```
pub fn normalize_place(id: &str, raw: &str) -> Normalized {
    let mut place = REPEATED_SPACES
        .replace_all(raw, " ")
        .trim_matches(' ')
        .to_string();
    if place.ends_with(" USA") && !place.ends_with(", USA") {
        place.insert(place.len() - " USA".len(), ',');
    }

    let mut parts: Vec<&str> = place.split(", ").collect();
    if parts.len() == 3 && parts[2] == "USA" {
        let abbrev = id.split('_').next().unwrap_or(id);
        return match STATES.get(abbrev) {
            Some(state) => {
                parts[1] = *state;
                Normalized::Expanded(parts.join(", "))
            }
            None => Normalized::Fallback(raw.to_string()),
        };
    }
    Normalized::Cleaned(place)
}

/// Normalize the place of every paper in the listing, in place.
pub fn normalize_listings(papers: &mut [PaperListing]) {
    for paper in papers.iter_mut() {
        let normalized = normalize_place(&paper.id, &paper.place);
        if let Normalized::Fallback(_) = normalized {
            debug!(id = %paper.id, place = %paper.place, "Kept raw place string");
        }
        paper.place = normalized.into_place();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_state_from_id_prefix() {
        assert_eq!(
            normalize_place("AL_AS", "Anniston, AL USA"),
            Normalized::Expanded("Anniston, Alabama, USA".to_string())
        );
    }

    #[test]
    fn test_id_prefix_wins_over_printed_abbreviation() {
        // AP style "Calif." in the place, postal code in the id
        assert_eq!(
            normalize_place("CA_LAT", "Los Angeles, Calif. USA").into_place(),
            "Los Angeles, California, USA"
        );
    }

    #[test]
    fn test_collapses_repeated_spaces() {
        assert_eq!(
            normalize_place("NY_NYT", "  New York,   NY    USA ").into_place(),
            "New York, New York, USA"
        );
    }

    #[test]
    fn test_non_usa_place_is_cleaned_only() {
        assert_eq!(
            normalize_place("UK_TG", "London,  England"),
            Normalized::Cleaned("London, England".to_string())
        );
    }

    #[test]
    fn test_two_part_usa_place_gets_comma_only() {
        assert_eq!(
            normalize_place("DC_WP", "Washington USA"),
            Normalized::Cleaned("Washington, USA".to_string())
        );
    }

    #[test]
    fn test_unknown_prefix_keeps_raw_string() {
        assert_eq!(
            normalize_place("ZZ_ABC", "Somewhere,  ZZ USA"),
            Normalized::Fallback("Somewhere,  ZZ USA".to_string())
        );
    }

    #[test]
    fn test_id_without_underscore_uses_whole_id() {
        assert_eq!(
            normalize_place("TX", "Austin, TX USA").into_place(),
            "Austin, Texas, USA"
        );
        assert!(matches!(
            normalize_place("TXAS", "Austin, TX USA"),
            Normalized::Fallback(_)
        ));
    }

    #[test]
    fn test_normalizing_twice_is_a_no_op() {
        let inputs = [
            ("AL_AS", "Anniston, AL USA"),
            ("UK_TG", "London, England"),
            ("DC_WP", "Washington USA"),
            ("NY_NYT", "New  York, NY  USA"),
        ];
        for (id, raw) in inputs {
            let once = normalize_place(id, raw).into_place();
            let twice = normalize_place(id, &once).into_place();
            assert_eq!(once, twice, "{id}: {raw}");
        }
    }

    #[test]
    fn test_normalize_listings() {
        let mut papers = vec![
            PaperListing {
                id: "AK_ADN".to_string(),
                name: "Anchorage Daily News".to_string(),
                place: "Anchorage, AK USA".to_string(),
            },
            PaperListing {
                id: "BRA_OG".to_string(),
                name: "O Globo".to_string(),
                place: "Rio de Janeiro,  Brazil".to_string(),
            },
        ];
        normalize_listings(&mut papers);
        assert_eq!(papers[0].place, "Anchorage, Alaska, USA");
        assert_eq!(papers[1].place, "Rio de Janeiro, Brazil");
    }
}
