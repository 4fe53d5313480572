//! Free-text location to UK region classification.

use crate::models::Region;
use serde::{Deserialize, Serialize};

/// What to do with a location that matches no known pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnclassifiedPolicy {
    /// Count it in the unclassified bucket.
    #[default]
    Explicit,
    /// Count it as England (legacy dashboard behaviour).
    AssumeEngland,
}

/// A substring pattern mapped to a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPattern {
    pub pattern: String,
    pub region: Region,
}

impl RegionPattern {
    pub fn new(pattern: &str, region: Region) -> Self {
        Self {
            pattern: pattern.trim().to_lowercase(),
            region,
        }
    }
}

/// City table, first match wins. Qualifiers for towns whose names exist in
/// more than one nation (Bangor, Newcastle, Newport) lead the table, and
/// "londonderry" must come before "london".
const DEFAULT_CITIES: &[(&str, Region)] = &[
    ("northern ireland", Region::NorthernIreland),
    ("county down", Region::NorthernIreland),
    ("co. down", Region::NorthernIreland),
    ("isle of wight", Region::England),
    ("londonderry", Region::NorthernIreland),
    ("derry", Region::NorthernIreland),
    ("belfast", Region::NorthernIreland),
    ("lisburn", Region::NorthernIreland),
    ("newry", Region::NorthernIreland),
    ("edinburgh", Region::Scotland),
    ("glasgow", Region::Scotland),
    ("aberdeen", Region::Scotland),
    ("dundee", Region::Scotland),
    ("inverness", Region::Scotland),
    ("stirling", Region::Scotland),
    ("cardiff", Region::Wales),
    ("swansea", Region::Wales),
    ("newport", Region::Wales),
    ("wrexham", Region::Wales),
    ("bangor", Region::Wales),
    ("london", Region::England),
    ("manchester", Region::England),
    ("birmingham", Region::England),
    ("leeds", Region::England),
    ("liverpool", Region::England),
    ("bristol", Region::England),
    ("sheffield", Region::England),
    ("newcastle", Region::England),
    ("nottingham", Region::England),
    ("leicester", Region::England),
    ("coventry", Region::England),
    ("cambridge", Region::England),
    ("oxford", Region::England),
    ("reading", Region::England),
    ("brighton", Region::England),
    ("southampton", Region::England),
    ("milton keynes", Region::England),
];

/// Broader region and county names tried when no city matches.
const DEFAULT_FALLBACKS: &[(&str, Region)] = &[
    ("antrim", Region::NorthernIreland),
    ("scotland", Region::Scotland),
    ("highlands", Region::Scotland),
    ("wales", Region::Wales),
    ("england", Region::England),
    ("yorkshire", Region::England),
    ("midlands", Region::England),
    ("lancashire", Region::England),
];

/// Default city table.
pub fn default_cities() -> Vec<RegionPattern> {
    DEFAULT_CITIES
        .iter()
        .map(|(pattern, region)| RegionPattern::new(pattern, *region))
        .collect()
}

/// Default fallback patterns.
pub fn default_fallbacks() -> Vec<RegionPattern> {
    DEFAULT_FALLBACKS
        .iter()
        .map(|(pattern, region)| RegionPattern::new(pattern, *region))
        .collect()
}

/// Classifies locations by ordered substring tables.
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    cities: Vec<RegionPattern>,
    fallbacks: Vec<RegionPattern>,
    policy: UnclassifiedPolicy,
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self::new(
            default_cities(),
            default_fallbacks(),
            UnclassifiedPolicy::default(),
        )
    }
}

impl RegionClassifier {
    pub fn new(
        cities: Vec<RegionPattern>,
        fallbacks: Vec<RegionPattern>,
        policy: UnclassifiedPolicy,
    ) -> Self {
        let normalize = |patterns: Vec<RegionPattern>| -> Vec<RegionPattern> {
            patterns
                .into_iter()
                .filter(|p| !p.pattern.trim().is_empty())
                .map(|p| RegionPattern::new(&p.pattern, p.region))
                .collect()
        };

        Self {
            cities: normalize(cities),
            fallbacks: normalize(fallbacks),
            policy,
        }
    }

    /// Classify a location. `None` means unclassified.
    pub fn classify(&self, location: &str) -> Option<Region> {
        let location = location.to_lowercase();

        let matched = self
            .cities
            .iter()
            .chain(self.fallbacks.iter())
            .find(|p| location.contains(&p.pattern))
            .map(|p| p.region);

        match (matched, self.policy) {
            (Some(region), _) => Some(region),
            (None, UnclassifiedPolicy::AssumeEngland) => Some(Region::England),
            (None, UnclassifiedPolicy::Explicit) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_matches() {
        let classifier = RegionClassifier::default();
        assert_eq!(classifier.classify("London, UK"), Some(Region::England));
        assert_eq!(classifier.classify("EDINBURGH"), Some(Region::Scotland));
        assert_eq!(classifier.classify("Cardiff Bay"), Some(Region::Wales));
        assert_eq!(classifier.classify("Belfast, NI"), Some(Region::NorthernIreland));
    }

    #[test]
    fn test_londonderry_is_not_london() {
        let classifier = RegionClassifier::default();
        assert_eq!(
            classifier.classify("Londonderry"),
            Some(Region::NorthernIreland)
        );
    }

    #[test]
    fn test_towns_shared_between_nations() {
        let classifier = RegionClassifier::default();
        assert_eq!(
            classifier.classify("Bangor, County Down"),
            Some(Region::NorthernIreland)
        );
        assert_eq!(
            classifier.classify("Bangor, Northern Ireland"),
            Some(Region::NorthernIreland)
        );
        assert_eq!(
            classifier.classify("Newcastle, County Down, Northern Ireland"),
            Some(Region::NorthernIreland)
        );
        assert_eq!(
            classifier.classify("Newport, Isle of Wight, England"),
            Some(Region::England)
        );

        // Unqualified names keep their usual reading
        assert_eq!(classifier.classify("Bangor, Gwynedd"), Some(Region::Wales));
        assert_eq!(classifier.classify("Newport, Wales"), Some(Region::Wales));
        assert_eq!(
            classifier.classify("Newcastle upon Tyne"),
            Some(Region::England)
        );
    }

    #[test]
    fn test_patterns_are_trimmed() {
        let classifier = RegionClassifier::new(
            vec![RegionPattern {
                pattern: " Leeds ".to_string(),
                region: Region::England,
            }],
            Vec::new(),
            UnclassifiedPolicy::Explicit,
        );
        assert_eq!(classifier.classify("Leeds, UK"), Some(Region::England));
    }

    #[test]
    fn test_fallback_patterns() {
        let classifier = RegionClassifier::default();
        assert_eq!(
            classifier.classify("Remote, Scotland"),
            Some(Region::Scotland)
        );
        assert_eq!(classifier.classify("West Yorkshire"), Some(Region::England));
        assert_eq!(
            classifier.classify("County Antrim, Northern Ireland"),
            Some(Region::NorthernIreland)
        );
    }

    #[test]
    fn test_city_wins_over_fallback() {
        let classifier = RegionClassifier::default();
        // "wales" would match as a fallback, but the city table goes first
        assert_eq!(
            classifier.classify("Manchester, near Wales"),
            Some(Region::England)
        );
    }

    #[test]
    fn test_unclassified_policies() {
        let explicit = RegionClassifier::default();
        assert_eq!(explicit.classify("Remote"), None);
        assert_eq!(explicit.classify(""), None);

        let legacy = RegionClassifier::new(
            default_cities(),
            default_fallbacks(),
            UnclassifiedPolicy::AssumeEngland,
        );
        assert_eq!(legacy.classify("Remote"), Some(Region::England));
    }

    #[test]
    fn test_custom_patterns_are_lowercased() {
        let classifier = RegionClassifier::new(
            vec![RegionPattern {
                pattern: "St Andrews".to_string(),
                region: Region::Scotland,
            }],
            Vec::new(),
            UnclassifiedPolicy::Explicit,
        );
        assert_eq!(classifier.classify("st andrews"), Some(Region::Scotland));
        assert_eq!(classifier.classify("London"), None);
    }
}
