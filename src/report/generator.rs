//! Markdown and JSON report generation.
//!
//! This module renders an aggregation outcome as a Markdown report or
//! as JSON including the chart series dashboard views consume.

use crate::models::{
    AggregationOutcome, AggregationResult, EducationShare, Report, ReportMetadata, SkillCount,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# SkillScope Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_status_section(&report.outcome));

    let result = report.outcome.result();
    output.push_str(&generate_skills_section(&result.top_skills, result.job_count));
    output.push_str(&generate_education_section(&result.education, result.job_count));
    output.push_str(&generate_regions_section(result));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Roles:** {}\n", metadata.roles.join(", ")));
    section.push_str(&format!("- **Location:** {}\n", metadata.region));
    section.push_str(&format!("- **Pages per Role:** {}\n", metadata.pages));
    section.push_str(&format!("- **Requests:** {}\n", metadata.requests));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the run status section.
fn generate_status_section(outcome: &AggregationOutcome) -> String {
    let mut section = String::new();

    section.push_str("## Status\n\n");

    match outcome {
        AggregationOutcome::Success {
            result,
            skipped_pages,
        } => {
            section.push_str(&format!(
                "Counted **{}** jobs out of {} fetched ({} excluded by keyword).\n",
                result.job_count, result.fetched_count, result.excluded_count
            ));
            if *skipped_pages > 0 {
                section.push_str(&format!(
                    "\n> **Note:** {} page request(s) timed out and were skipped.\n",
                    skipped_pages
                ));
            }
        }
        AggregationOutcome::Failed { reason, .. } => {
            section.push_str("> **Fetch failed.** No data was counted.\n>\n");
            section.push_str(&format!("> {}\n", reason));
        }
    }
    section.push('\n');

    section
}

/// Generate the top skills table.
fn generate_skills_section(skills: &[SkillCount], job_count: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Top {} Skills Based on {} Jobs\n\n",
        skills.len(),
        job_count
    ));

    if skills.is_empty() {
        section.push_str("No skills to rank.\n\n");
        return section;
    }

    section.push_str("| Rank | Skill | Jobs | Share |\n");
    section.push_str("|:---:|:---|:---:|:---:|\n");
    for (i, skill) in skills.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {:.2}% |\n",
            i + 1,
            skill.skill,
            skill.count,
            skill.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the education level table.
fn generate_education_section(education: &[EducationShare], job_count: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Level of Education Based on {} Jobs\n\n",
        job_count
    ));
    section.push_str("| Level | Jobs | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for share in education {
        section.push_str(&format!(
            "| {} | {} | {:.2}% |\n",
            share.level, share.count, share.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the regional distribution table.
fn generate_regions_section(result: &AggregationResult) -> String {
    let mut section = String::new();

    section.push_str("## Regional Distribution\n\n");
    section.push_str("| Code | Region | Jobs | Share |\n");
    section.push_str("|:---:|:---|:---:|:---:|\n");
    for share in &result.regions {
        section.push_str(&format!(
            "| {} | {} | {} | {:.2}% |\n",
            share.region.code(),
            share.region,
            share.count,
            share.percentage
        ));
    }
    section.push_str(&format!(
        "| - | Unclassified | {} | {:.2}% |\n",
        result.unclassified.count, result.unclassified.percentage
    ));
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by SkillScope*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
