//! Country → continent fallback table.
//!
//! The store's own `countries` table is authoritative. This table is consulted
//! only for country codes the store does not know, keyed by ISO 3166-1
//! alpha-2 code.

use std::collections::HashMap;

use crate::person::Country;

/// Continent reported when neither the store nor the table knows a country.
pub const UNKNOWN: &str = "UNKNOWN";

const AFRICA: &str = "Africa";
const ASIA: &str = "Asia";
const EUROPE: &str = "Europe";
const NORTH_AMERICA: &str = "North America";
const OCEANIA: &str = "Oceania";
const SOUTH_AMERICA: &str = "South America";

/// Sorted by ISO code for binary search.
static ISO2_CONTINENTS: &[(&str, &str)] = &[
  ("AD", EUROPE), ("AE", ASIA), ("AF", ASIA), ("AG", NORTH_AMERICA),
  ("AL", EUROPE), ("AM", ASIA), ("AO", AFRICA), ("AR", SOUTH_AMERICA),
  ("AS", OCEANIA), ("AT", EUROPE), ("AU", OCEANIA), ("AZ", ASIA),
  ("BA", EUROPE), ("BB", NORTH_AMERICA), ("BD", ASIA), ("BE", EUROPE),
  ("BF", AFRICA), ("BG", EUROPE), ("BH", ASIA), ("BI", AFRICA),
  ("BJ", AFRICA), ("BM", NORTH_AMERICA), ("BN", ASIA), ("BO", SOUTH_AMERICA),
  ("BR", SOUTH_AMERICA), ("BS", NORTH_AMERICA), ("BT", ASIA), ("BW", AFRICA),
  ("BY", EUROPE), ("BZ", NORTH_AMERICA), ("CA", NORTH_AMERICA), ("CD", AFRICA),
  ("CF", AFRICA), ("CG", AFRICA), ("CH", EUROPE), ("CI", AFRICA),
  ("CK", OCEANIA), ("CL", SOUTH_AMERICA), ("CM", AFRICA), ("CN", ASIA),
  ("CO", SOUTH_AMERICA), ("CR", NORTH_AMERICA), ("CU", NORTH_AMERICA), ("CV", AFRICA),
  ("CY", ASIA), ("CZ", EUROPE), ("DE", EUROPE), ("DJ", AFRICA),
  ("DK", EUROPE), ("DM", NORTH_AMERICA), ("DO", NORTH_AMERICA), ("DZ", AFRICA),
  ("EC", SOUTH_AMERICA), ("EE", EUROPE), ("EG", AFRICA), ("EH", AFRICA),
  ("ER", AFRICA), ("ES", EUROPE), ("ET", AFRICA), ("FI", EUROPE),
  ("FJ", OCEANIA), ("FM", OCEANIA), ("FR", EUROPE), ("GA", AFRICA),
  ("GB", EUROPE), ("GD", NORTH_AMERICA), ("GE", ASIA), ("GH", AFRICA),
  ("GL", NORTH_AMERICA), ("GM", AFRICA), ("GN", AFRICA), ("GQ", AFRICA),
  ("GR", EUROPE), ("GT", NORTH_AMERICA), ("GU", OCEANIA), ("GW", AFRICA),
  ("GY", SOUTH_AMERICA), ("HK", ASIA), ("HN", NORTH_AMERICA), ("HR", EUROPE),
  ("HT", NORTH_AMERICA), ("HU", EUROPE), ("ID", ASIA), ("IE", EUROPE),
  ("IL", ASIA), ("IN", ASIA), ("IQ", ASIA), ("IR", ASIA),
  ("IS", EUROPE), ("IT", EUROPE), ("JM", NORTH_AMERICA), ("JO", ASIA),
  ("JP", ASIA), ("KE", AFRICA), ("KG", ASIA), ("KH", ASIA),
  ("KI", OCEANIA), ("KM", AFRICA), ("KN", NORTH_AMERICA), ("KP", ASIA),
  ("KR", ASIA), ("KW", ASIA), ("KY", NORTH_AMERICA), ("KZ", ASIA),
  ("LA", ASIA), ("LB", ASIA), ("LC", NORTH_AMERICA), ("LI", EUROPE),
  ("LK", ASIA), ("LR", AFRICA), ("LS", AFRICA), ("LT", EUROPE),
  ("LU", EUROPE), ("LV", EUROPE), ("LY", AFRICA), ("MA", AFRICA),
  ("MC", EUROPE), ("MD", EUROPE), ("ME", EUROPE), ("MG", AFRICA),
  ("MH", OCEANIA), ("MK", EUROPE), ("ML", AFRICA), ("MM", ASIA),
  ("MN", ASIA), ("MO", ASIA), ("MP", OCEANIA), ("MR", AFRICA),
  ("MT", EUROPE), ("MU", AFRICA), ("MV", ASIA), ("MW", AFRICA),
  ("MX", NORTH_AMERICA), ("MY", ASIA), ("MZ", AFRICA), ("NA", AFRICA),
  ("NC", OCEANIA), ("NE", AFRICA), ("NG", AFRICA), ("NI", NORTH_AMERICA),
  ("NL", EUROPE), ("NO", EUROPE), ("NP", ASIA), ("NR", OCEANIA),
  ("NZ", OCEANIA), ("OM", ASIA), ("PA", NORTH_AMERICA), ("PE", SOUTH_AMERICA),
  ("PF", OCEANIA), ("PG", OCEANIA), ("PH", ASIA), ("PK", ASIA),
  ("PL", EUROPE), ("PR", NORTH_AMERICA), ("PS", ASIA), ("PT", EUROPE),
  ("PW", OCEANIA), ("PY", SOUTH_AMERICA), ("QA", ASIA), ("RE", AFRICA),
  ("RO", EUROPE), ("RS", EUROPE), ("RU", EUROPE), ("RW", AFRICA),
  ("SA", ASIA), ("SB", OCEANIA), ("SC", AFRICA), ("SD", AFRICA),
  ("SE", EUROPE), ("SG", ASIA), ("SI", EUROPE), ("SK", EUROPE),
  ("SL", AFRICA), ("SM", EUROPE), ("SN", AFRICA), ("SO", AFRICA),
  ("SR", SOUTH_AMERICA), ("SS", AFRICA), ("ST", AFRICA), ("SV", NORTH_AMERICA),
  ("SY", ASIA), ("SZ", AFRICA), ("TD", AFRICA), ("TG", AFRICA),
  ("TH", ASIA), ("TJ", ASIA), ("TM", ASIA), ("TN", AFRICA),
  ("TO", OCEANIA), ("TR", ASIA), ("TT", NORTH_AMERICA), ("TV", OCEANIA),
  ("TW", ASIA), ("TZ", AFRICA), ("UA", EUROPE), ("UG", AFRICA),
  ("US", NORTH_AMERICA), ("UY", SOUTH_AMERICA), ("UZ", ASIA), ("VA", EUROPE),
  ("VC", NORTH_AMERICA), ("VE", SOUTH_AMERICA), ("VN", ASIA), ("VU", OCEANIA),
  ("WS", OCEANIA), ("XK", EUROPE), ("YE", ASIA), ("YT", AFRICA),
  ("ZA", AFRICA), ("ZM", AFRICA), ("ZW", AFRICA),
];

/// Look up the continent of an ISO-2 country code.
pub fn for_iso2(code: &str) -> Option<&'static str> {
  let code = code.to_ascii_uppercase();
  ISO2_CONTINENTS
    .binary_search_by(|(iso, _)| (*iso).cmp(code.as_str()))
    .ok()
    .map(|idx| ISO2_CONTINENTS[idx].1)
}

/// Strip the leading underscore the public export puts on continent ids
/// (`_Asia` → `Asia`).
pub fn normalize(continent_id: &str) -> &str {
  continent_id.strip_prefix('_').unwrap_or(continent_id)
}

/// Resolve the continent of `country_id`, preferring the store's mapping in
/// `countries` and falling back to the ISO-2 table.
pub fn resolve(
  country_id: Option<&str>,
  countries: &HashMap<String, Country>,
) -> String {
  let Some(id) = country_id.filter(|id| !id.is_empty()) else {
    return UNKNOWN.to_owned();
  };
  if let Some(country) = countries.get(id)
    && !country.continent_id.is_empty()
  {
    return normalize(&country.continent_id).to_owned();
  }
  let iso2 = countries
    .get(id)
    .and_then(|c| c.iso2.as_deref())
    .unwrap_or(id);
  for_iso2(iso2).unwrap_or(UNKNOWN).to_owned()
}
