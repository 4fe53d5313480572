//! Skill, education and region aggregation.
//!
//! This module fetches job pages from a [`JobSource`], filters them by
//! blacklist, and reduces them to ranked skills and percentage breakdowns.

use crate::analysis::vocabulary::Vocabulary;
use crate::error::FetchError;
use crate::models::{
    AggregationOutcome, AggregationResult, EducationLevel, EducationShare, JobRecord, Region,
    RegionFilter, RegionShare, RoleFilter, SearchQuery, SkillCount, Tally,
};
use crate::source::JobSource;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum pages per role accepted in one run.
pub const MAX_PAGES: u32 = 50;

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    /// Pages per role (1-indexed, inclusive).
    pub pages: u32,
    pub roles: RoleFilter,
    pub region: RegionFilter,
}

impl AggregationRequest {
    /// Expand into one query per role and page, roles outermost.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.roles
            .roles()
            .into_iter()
            .flat_map(|role| {
                (1..=self.pages).map(move |page| SearchQuery {
                    role,
                    region: self.region,
                    page,
                })
            })
            .collect()
    }
}

/// Tuning for an aggregation run.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// Number of skills kept in the ranking.
    pub top_n: usize,
    /// Page requests in flight at once.
    pub concurrency: usize,
    /// Upper bound for a single page request.
    pub request_timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            concurrency: 4,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Records gathered from every page, plus pages that timed out.
#[derive(Debug, Default)]
struct FetchedBatch {
    records: Vec<JobRecord>,
    skipped_pages: usize,
}

/// Turns job listings into an [`AggregationResult`].
pub struct Aggregator {
    vocabulary: Vocabulary,
    settings: AggregatorSettings,
    progress: Option<ProgressBar>,
}

impl Aggregator {
    pub fn new(vocabulary: Vocabulary, settings: AggregatorSettings) -> Self {
        Self {
            vocabulary,
            settings,
            progress: None,
        }
    }

    /// Report page completion on a progress bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fetch every page and aggregate. Never returns an error: failures
    /// become [`AggregationOutcome::Failed`] with the zero-valued result.
    pub async fn run(
        &self,
        source: &dyn JobSource,
        request: &AggregationRequest,
    ) -> AggregationOutcome {
        let queries = request.queries();
        info!(
            "Fetching {} page(s) across {} role(s)",
            queries.len(),
            request.roles.roles().len()
        );

        let batch = match self.fetch_all(source, queries).await {
            Ok(batch) => batch,
            Err(e) => {
                error!("Failed to fetch job listings: {}", e);
                return AggregationOutcome::failed(e.to_string());
            }
        };

        let result = self.aggregate(&batch.records);
        info!(
            "Counted {} of {} fetched jobs ({} excluded)",
            result.job_count, result.fetched_count, result.excluded_count
        );

        AggregationOutcome::Success {
            result,
            skipped_pages: batch.skipped_pages,
        }
    }

    /// Fetch all queries with bounded concurrency, keeping request order.
    async fn fetch_all(
        &self,
        source: &dyn JobSource,
        queries: Vec<SearchQuery>,
    ) -> Result<FetchedBatch, FetchError> {
        let total = queries.len();
        let timeout = self.settings.request_timeout;

        let responses: Vec<(SearchQuery, Result<Vec<JobRecord>, FetchError>)> =
            stream::iter(queries)
                .map(|query| async move {
                    let result = match tokio::time::timeout(timeout, source.fetch_page(&query))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::Timeout {
                            seconds: timeout.as_secs(),
                        }),
                    };
                    if let Some(ref pb) = self.progress {
                        pb.inc(1);
                    }
                    (query, result)
                })
                .buffered(self.settings.concurrency.max(1))
                .collect()
                .await;

        if let Some(ref pb) = self.progress {
            pb.finish_and_clear();
        }

        let mut batch = FetchedBatch::default();
        for (query, result) in responses {
            match result {
                Ok(records) => {
                    debug!("{}: {} records", query, records.len());
                    batch.records.extend(records);
                }
                Err(e) if e.is_timeout() => {
                    warn!("Skipping {}: {}", query, e);
                    batch.skipped_pages += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if total > 0 && batch.skipped_pages == total {
            return Err(FetchError::Timeout {
                seconds: timeout.as_secs(),
            });
        }

        Ok(batch)
    }

    /// Reduce records to counts, ranking and percentages.
    pub fn aggregate(&self, records: &[JobRecord]) -> AggregationResult {
        let kept: Vec<&JobRecord> = records
            .iter()
            .filter(|record| !self.vocabulary.is_blacklisted(record))
            .collect();
        let job_count = kept.len();

        let skills = self.vocabulary.skills();
        let mut skill_counts = vec![0usize; skills.len()];
        let mut education_counts = vec![0usize; EducationLevel::ALL.len()];
        let mut region_counts: BTreeMap<Region, usize> =
            Region::ALL.iter().map(|&r| (r, 0)).collect();
        let mut unclassified = 0usize;

        for record in &kept {
            let description = record.description.to_lowercase();

            for (count, skill) in skill_counts.iter_mut().zip(skills) {
                if skill.is_mentioned_in(&description) {
                    *count += 1;
                }
            }

            for (count, level) in education_counts.iter_mut().zip(EducationLevel::ALL) {
                if level.terms().iter().any(|term| description.contains(term)) {
                    *count += 1;
                }
            }

            match self.vocabulary.regions().classify(&record.location) {
                Some(region) => *region_counts.entry(region).or_default() += 1,
                None => unclassified += 1,
            }
        }

        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();

        AggregationResult {
            top_skills: rank_skills(&names, &skill_counts, self.settings.top_n, job_count),
            job_count,
            fetched_count: records.len(),
            excluded_count: records.len() - job_count,
            education: EducationLevel::ALL
                .iter()
                .zip(education_counts)
                .map(|(&level, count)| EducationShare {
                    level,
                    count,
                    percentage: percentage(count, job_count),
                })
                .collect(),
            regions: Region::ALL
                .iter()
                .map(|&region| {
                    let count = region_counts.get(&region).copied().unwrap_or(0);
                    RegionShare {
                        region,
                        count,
                        percentage: percentage(count, job_count),
                    }
                })
                .collect(),
            unclassified: Tally {
                count: unclassified,
                percentage: percentage(unclassified, job_count),
            },
        }
    }
}

/// Rank skills by descending count and keep the first `top_n`.
///
/// The sort is stable, so equal counts keep vocabulary order.
pub fn rank_skills(
    names: &[&str],
    counts: &[usize],
    top_n: usize,
    job_count: usize,
) -> Vec<SkillCount> {
    let mut ranked: Vec<(&str, usize)> = names
        .iter()
        .copied()
        .zip(counts.iter().copied())
        .collect();
    ranked.sort_by_key(|(_, count)| Reverse(*count));
    ranked.truncate(top_n);

    ranked
        .into_iter()
        .map(|(skill, count)| SkillCount {
            skill: skill.to_string(),
            count,
            percentage: percentage(count, job_count),
        })
        .collect()
}

/// `100 * count / max(1, total)`, rounded to two decimal places.
pub fn percentage(count: usize, total: usize) -> f64 {
    let raw = 100.0 * count as f64 / total.max(1) as f64;
    (raw * 100.0).round() / 100.0
}
