//! Data models for skill demand analysis.
//!
//! This module contains the core data structures used throughout
//! the application for representing job records, queries, and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A UK nation used for regional breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "ENG")]
    England,
    #[serde(rename = "SCT")]
    Scotland,
    #[serde(rename = "WLS")]
    Wales,
    #[serde(rename = "NIR")]
    NorthernIreland,
}

impl Region {
    /// All regions in display order.
    pub const ALL: [Region; 4] = [
        Region::England,
        Region::Scotland,
        Region::Wales,
        Region::NorthernIreland,
    ];

    /// Returns the short region code used by map views.
    pub fn code(&self) -> &'static str {
        match self {
            Region::England => "ENG",
            Region::Scotland => "SCT",
            Region::Wales => "WLS",
            Region::NorthernIreland => "NIR",
        }
    }

    /// Returns the human-readable region name.
    pub fn name(&self) -> &'static str {
        match self {
            Region::England => "England",
            Region::Scotland => "Scotland",
            Region::Wales => "Wales",
            Region::NorthernIreland => "Northern Ireland",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Education level mentioned in a job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "Bachelor's")]
    Bachelors,
    #[serde(rename = "Master's")]
    Masters,
    #[serde(rename = "PhD")]
    Phd,
}

impl EducationLevel {
    /// All levels in display order.
    pub const ALL: [EducationLevel; 3] = [
        EducationLevel::Bachelors,
        EducationLevel::Masters,
        EducationLevel::Phd,
    ];

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Masters => "Master's",
            EducationLevel::Phd => "PhD",
        }
    }

    /// Lower-case terms whose presence marks this level.
    pub fn terms(&self) -> &'static [&'static str] {
        match self {
            EducationLevel::Bachelors => &["bachelor"],
            EducationLevel::Masters => &["master"],
            EducationLevel::Phd => &["phd", "doctorate"],
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Job role searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SoftwareEngineer,
    DataScientist,
    DataEngineer,
    DevopsEngineer,
    FrontendDeveloper,
    BackendDeveloper,
}

impl Role {
    /// Every configured role, queried when the filter is "all".
    pub const ALL: [Role; 6] = [
        Role::SoftwareEngineer,
        Role::DataScientist,
        Role::DataEngineer,
        Role::DevopsEngineer,
        Role::FrontendDeveloper,
        Role::BackendDeveloper,
    ];

    /// Returns the free-text form used in search queries.
    pub fn query_text(&self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "software engineer",
            Role::DataScientist => "data scientist",
            Role::DataEngineer => "data engineer",
            Role::DevopsEngineer => "devops engineer",
            Role::FrontendDeveloper => "frontend developer",
            Role::BackendDeveloper => "backend developer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query_text())
    }
}

/// Which roles to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    All,
    Only(Role),
}

impl RoleFilter {
    /// Resolve the filter to the list of roles to query.
    pub fn roles(&self) -> Vec<Role> {
        match self {
            RoleFilter::All => Role::ALL.to_vec(),
            RoleFilter::Only(role) => vec![*role],
        }
    }
}

/// Which region to scope the search to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFilter {
    All,
    Only(Region),
}

impl RegionFilter {
    /// Returns the location text appended to queries.
    pub fn query_text(&self) -> &'static str {
        match self {
            RegionFilter::All => "UK",
            RegionFilter::Only(region) => region.name(),
        }
    }
}

/// A single page request against the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub role: Role,
    pub region: RegionFilter,
    /// Page number (1-indexed).
    pub page: u32,
}

impl SearchQuery {
    /// Returns the free-text query, e.g. `software engineer in UK`.
    pub fn text(&self) -> String {
        format!("{} in {}", self.role.query_text(), self.region.query_text())
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" (page {})", self.text(), self.page)
    }
}

const DESCRIPTION_FIELDS: &[&str] = &["job_description", "description", "snippet"];
const TITLE_FIELDS: &[&str] = &["job_title", "title"];
const LOCATION_FIELDS: &[&str] = &["job_location", "location"];
const LOCATION_PART_FIELDS: &[&str] = &["job_city", "job_state", "job_country"];

/// A job posting normalized at ingestion.
///
/// Sources name their fields differently; each field is resolved once
/// from an ordered list of candidate keys. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub description: String,
    pub title: String,
    pub location: String,
}

impl JobRecord {
    /// Creates a record from already-resolved fields.
    #[allow(dead_code)] // Used by in-memory sources
    pub fn new(
        description: impl Into<String>,
        title: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            title: title.into(),
            location: location.into(),
        }
    }

    /// Resolve a raw JSON record from the search API.
    pub fn from_value(value: &Value) -> Self {
        let location = first_string(value, LOCATION_FIELDS).unwrap_or_else(|| {
            LOCATION_PART_FIELDS
                .iter()
                .filter_map(|key| non_empty_str(value, key))
                .collect::<Vec<_>>()
                .join(", ")
        });

        Self {
            description: first_string(value, DESCRIPTION_FIELDS).unwrap_or_default(),
            title: first_string(value, TITLE_FIELDS).unwrap_or_default(),
            location,
        }
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| non_empty_str(value, key))
        .map(String::from)
}

/// A ranked skill with its job count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    /// Number of jobs mentioning the skill.
    pub count: usize,
    /// Share of counted jobs, 0-100 with two decimals.
    pub percentage: f64,
}

/// Count and share of an education level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationShare {
    pub level: EducationLevel,
    pub count: usize,
    pub percentage: f64,
}

/// Count and share of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShare {
    pub region: Region,
    pub count: usize,
    pub percentage: f64,
}

/// Count and share without a label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub count: usize,
    pub percentage: f64,
}

/// Summary produced by one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Top skills by descending count.
    pub top_skills: Vec<SkillCount>,
    /// Jobs that survived the blacklist.
    pub job_count: usize,
    /// Records returned by the source.
    pub fetched_count: usize,
    /// Records dropped by the blacklist.
    pub excluded_count: usize,
    pub education: Vec<EducationShare>,
    pub regions: Vec<RegionShare>,
    /// Jobs whose location matched no region.
    pub unclassified: Tally,
}

impl AggregationResult {
    /// The zero-valued result: no skills, every counter at zero.
    pub fn empty() -> Self {
        Self {
            top_skills: Vec::new(),
            job_count: 0,
            fetched_count: 0,
            excluded_count: 0,
            education: EducationLevel::ALL
                .iter()
                .map(|&level| EducationShare {
                    level,
                    count: 0,
                    percentage: 0.0,
                })
                .collect(),
            regions: Region::ALL
                .iter()
                .map(|&region| RegionShare {
                    region,
                    count: 0,
                    percentage: 0.0,
                })
                .collect(),
            unclassified: Tally::default(),
        }
    }

    /// Returns the share for a region.
    #[allow(dead_code)] // Lookup helper
    pub fn region(&self, region: Region) -> Option<&RegionShare> {
        self.regions.iter().find(|r| r.region == region)
    }

    /// Returns the share for an education level.
    #[allow(dead_code)] // Lookup helper
    pub fn education_level(&self, level: EducationLevel) -> Option<&EducationShare> {
        self.education.iter().find(|e| e.level == level)
    }
}

impl Default for AggregationResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Outcome of an aggregation run.
///
/// A failed run still carries the zero-valued result so views can render,
/// but callers can tell "no matching jobs" apart from "the fetch failed".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AggregationOutcome {
    Success {
        result: AggregationResult,
        /// Pages that timed out and contributed no records.
        skipped_pages: usize,
    },
    Failed {
        result: AggregationResult,
        reason: String,
    },
}

impl AggregationOutcome {
    /// Builds a failed outcome with the zero-valued result.
    pub fn failed(reason: impl Into<String>) -> Self {
        AggregationOutcome::Failed {
            result: AggregationResult::empty(),
            reason: reason.into(),
        }
    }

    /// Returns the result regardless of status.
    pub fn result(&self) -> &AggregationResult {
        match self {
            AggregationOutcome::Success { result, .. } => result,
            AggregationOutcome::Failed { result, .. } => result,
        }
    }

    #[allow(dead_code)] // Status check for callers that don't need the reason
    pub fn is_success(&self) -> bool {
        matches!(self, AggregationOutcome::Success { .. })
    }
}

/// A labelled value for bar and doughnut charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Series consumed by dashboard views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Top skills as percentage of counted jobs.
    pub bar: Vec<ChartPoint>,
    /// Education level percentages.
    pub doughnut: Vec<ChartPoint>,
    /// Region code to percentage, for the choropleth map.
    pub map: BTreeMap<String, f64>,
}

impl ChartData {
    /// Derive chart series from a result.
    pub fn from_result(result: &AggregationResult) -> Self {
        Self {
            bar: result
                .top_skills
                .iter()
                .map(|s| ChartPoint {
                    label: s.skill.clone(),
                    value: s.percentage,
                })
                .collect(),
            doughnut: result
                .education
                .iter()
                .map(|e| ChartPoint {
                    label: e.level.label().to_string(),
                    value: e.percentage,
                })
                .collect(),
            map: result
                .regions
                .iter()
                .map(|r| (r.region.code().to_string(), r.percentage))
                .collect(),
        }
    }
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Date and time of the run.
    pub generated_at: DateTime<Utc>,
    /// Roles queried.
    pub roles: Vec<String>,
    /// Location used in queries.
    pub region: String,
    /// Pages requested per role.
    pub pages: u32,
    /// Total page requests issued.
    pub requests: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete skill demand report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub outcome: AggregationOutcome,
    pub charts: ChartData,
}

impl Report {
    /// Creates a report, deriving chart series from the outcome.
    pub fn new(metadata: ReportMetadata, outcome: AggregationOutcome) -> Self {
        let charts = ChartData::from_result(outcome.result());
        Self {
            metadata,
            outcome,
            charts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_region_codes() {
        let codes: Vec<_> = Region::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec!["ENG", "SCT", "WLS", "NIR"]);
        assert_eq!(Region::NorthernIreland.to_string(), "Northern Ireland");
    }

    #[test]
    fn test_region_serializes_as_code() {
        let json = serde_json::to_string(&Region::Scotland).unwrap();
        assert_eq!(json, "\"SCT\"");
    }

    #[test]
    fn test_education_terms() {
        assert_eq!(EducationLevel::Phd.terms(), &["phd", "doctorate"]);
        assert_eq!(EducationLevel::Masters.label(), "Master's");
    }

    #[test]
    fn test_search_query_text() {
        let query = SearchQuery {
            role: Role::DataScientist,
            region: RegionFilter::Only(Region::Wales),
            page: 2,
        };
        assert_eq!(query.text(), "data scientist in Wales");

        let query = SearchQuery {
            region: RegionFilter::All,
            ..query
        };
        assert_eq!(query.text(), "data scientist in UK");
    }

    #[test]
    fn test_role_filter_all() {
        assert_eq!(RoleFilter::All.roles().len(), Role::ALL.len());
        assert_eq!(
            RoleFilter::Only(Role::DevopsEngineer).roles(),
            vec![Role::DevopsEngineer]
        );
    }

    #[test]
    fn test_job_record_field_priority() {
        let value = json!({
            "job_description": "Primary",
            "description": "Secondary",
            "title": "Engineer",
            "job_location": "Leeds, UK",
            "location": "Elsewhere"
        });

        let record = JobRecord::from_value(&value);
        assert_eq!(record.description, "Primary");
        assert_eq!(record.title, "Engineer");
        assert_eq!(record.location, "Leeds, UK");
    }

    #[test]
    fn test_job_record_missing_and_non_string_fields() {
        let value = json!({
            "job_description": null,
            "description": 42,
            "snippet": "Fallback snippet"
        });

        let record = JobRecord::from_value(&value);
        assert_eq!(record.description, "Fallback snippet");
        assert_eq!(record.title, "");
        assert_eq!(record.location, "");
    }

    #[test]
    fn test_job_record_location_from_parts() {
        let value = json!({
            "job_city": "Glasgow",
            "job_state": "",
            "job_country": "GB"
        });

        let record = JobRecord::from_value(&value);
        assert_eq!(record.location, "Glasgow, GB");
    }

    #[test]
    fn test_empty_result_is_zeroed() {
        let result = AggregationResult::empty();
        assert!(result.top_skills.is_empty());
        assert_eq!(result.job_count, 0);
        assert_eq!(result.regions.len(), 4);
        assert!(result.regions.iter().all(|r| r.count == 0 && r.percentage == 0.0));
        assert_eq!(result.education.len(), 3);
        assert_eq!(result.unclassified.count, 0);
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = AggregationOutcome::failed("boom");
        assert!(!outcome.is_success());
        assert_eq!(outcome.result(), &AggregationResult::empty());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
    }

    #[test]
    fn test_chart_data_from_result() {
        let mut result = AggregationResult::empty();
        result.top_skills.push(SkillCount {
            skill: "Python".to_string(),
            count: 3,
            percentage: 75.0,
        });
        result.regions[1].percentage = 25.0;

        let charts = ChartData::from_result(&result);

        assert_eq!(charts.bar[0].label, "Python");
        assert_eq!(charts.bar[0].value, 75.0);
        assert_eq!(charts.doughnut.len(), 3);
        assert_eq!(charts.doughnut[0].label, "Bachelor's");
        assert_eq!(charts.map.len(), 4);
        assert_eq!(charts.map["SCT"], 25.0);
        assert_eq!(charts.map["ENG"], 0.0);
    }
}
