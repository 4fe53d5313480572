//! Fixed lookup tables used by the aggregator.
//!
//! The tables are plain data built once at startup (from defaults or the
//! config file) and handed to the aggregator; nothing mutates them later.

use crate::analysis::regions::RegionClassifier;
use crate::models::JobRecord;

/// Skills counted by default, in tie-break order.
pub const DEFAULT_SKILLS: &[&str] = &[
    "JavaScript",
    "Python",
    "Java",
    "C++",
    "C#",
    "Go",
    "AWS",
    "React",
    "TypeScript",
    "Ruby",
    "SQL",
    "Docker",
    "Kubernetes",
    "Azure",
];

/// Keywords that mark a posting as out of scope.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "marketing",
    "sales",
    "recruiter",
    "accountant",
    "human resources",
];

/// A skill name with its lower-cased search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    needle: String,
}

impl Skill {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            needle: name.to_lowercase(),
        }
    }

    /// Whether a lower-cased description mentions this skill.
    pub fn is_mentioned_in(&self, lowered: &str) -> bool {
        lowered.contains(&self.needle)
    }
}

/// Skill vocabulary, blacklist and region tables.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    skills: Vec<Skill>,
    blacklist: Vec<String>,
    regions: RegionClassifier,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(
            DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            RegionClassifier::default(),
        )
    }
}

impl Vocabulary {
    /// Build a vocabulary. Blank skills and names that repeat an earlier
    /// one (ignoring case) are dropped.
    pub fn new(skills: Vec<String>, blacklist: Vec<String>, regions: RegionClassifier) -> Self {
        let mut unique: Vec<Skill> = Vec::with_capacity(skills.len());
        for name in skills {
            let name = name.trim();
            let skill = Skill::new(name);
            if name.is_empty() || unique.iter().any(|s| s.needle == skill.needle) {
                continue;
            }
            unique.push(skill);
        }

        Self {
            skills: unique,
            blacklist: blacklist
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            regions,
        }
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn regions(&self) -> &RegionClassifier {
        &self.regions
    }

    /// Whether the record's title or description hits the blacklist.
    pub fn is_blacklisted(&self, record: &JobRecord) -> bool {
        let title = record.title.to_lowercase();
        let description = record.description.to_lowercase();

        self.blacklist
            .iter()
            .any(|keyword| title.contains(keyword) || description.contains(keyword))
    }
}
