//! Engine configuration: synonym tables, gazetteers, confidence policy,
//! and the extraction time budget. Loaded once at startup (defaults,
//! optional JSON file, env overrides) and shared immutably across
//! concurrent requests. Hot reload swaps a whole snapshot atomically.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::SectionKind;

/// One row of the section synonym table. Declaration order is the
/// tie-break when two phrases of equal length match the same line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub kind: SectionKind,
    pub phrases: Vec<String>,
}

/// Confidence assigned to each kind of evidence. The relative priority of
/// an explicit skills-section match versus a gazetteer hit is policy, not
/// code: swap the two numbers and the assembler inverts the preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub email: f32,
    pub phone: f32,
    pub name_header: f32,
    pub name_ambiguous: f32,
    pub skills_section: f32,
    pub skills_gazetteer: f32,
    pub link: f32,
    pub link_bare: f32,
    /// Multiplier applied to findings from the whole-document fallback
    /// pass over `Other` sections.
    pub fallback_scale: f32,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            email: 0.95,
            phone: 0.85,
            name_header: 0.9,
            name_ambiguous: 0.55,
            skills_section: 0.9,
            skills_gazetteer: 0.6,
            link: 0.9,
            link_bare: 0.75,
            fallback_scale: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub synonyms: Vec<SynonymEntry>,
    /// Known skill terms for the whole-document fallback scan. Display
    /// casing is taken from this list, not from the document.
    pub gazetteer: Vec<String>,
    pub degree_keywords: Vec<String>,
    pub institution_keywords: Vec<String>,
    pub title_keywords: Vec<String>,
    /// Legal/company suffixes that make a header line look like an
    /// organization rather than a personal name.
    pub company_suffixes: Vec<String>,
    pub confidence: ConfidencePolicy,
    /// Fields below this confidence are omitted from the assembled record.
    pub min_confidence: f32,
    /// Extraction time budget per request. Families that miss it
    /// contribute nothing and the report is flagged truncated.
    pub timeout_ms: u64,
    /// Run extractor families concurrently. Sequential execution yields
    /// identical output.
    pub parallel: bool,
    /// Fault injection: artificial stall before each family runs. Used to
    /// exercise the timeout path; zero in production.
    pub stall_ms: u64,

    #[serde(skip)]
    pub(crate) gazetteer_cache: OnceCell<Option<GazetteerMatcher>>,
}

/// Compiled gazetteer: one alternation regex plus a lowercase-to-display
/// lookup for canonical casing.
#[derive(Debug, Clone)]
pub struct GazetteerMatcher {
    pub regex: Regex,
    pub display: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synonyms: default_synonyms(),
            gazetteer: default_gazetteer(),
            degree_keywords: str_vec(&[
                "bachelor", "master", "phd", "ph.d", "doctorate", "diploma", "b.tech", "m.tech",
                "b.e", "m.e", "b.sc", "m.sc", "bsc", "msc", "mba", "b.a", "m.a", "associate",
            ]),
            institution_keywords: str_vec(&[
                "university", "college", "institute", "institution", "school", "academy",
                "polytechnic",
            ]),
            title_keywords: str_vec(&[
                "engineer", "developer", "manager", "analyst", "designer", "consultant",
                "architect", "scientist", "intern", "lead", "director", "administrator",
                "specialist", "officer",
            ]),
            company_suffixes: str_vec(&[
                "inc", "inc.", "llc", "ltd", "ltd.", "corp", "corp.", "corporation",
                "technologies", "solutions", "systems", "labs", "gmbh", "company",
            ]),
            confidence: ConfidencePolicy::default(),
            min_confidence: 0.35,
            timeout_ms: 2_000,
            parallel: true,
            stall_ms: 0,
            gazetteer_cache: OnceCell::new(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration: defaults, then the optional JSON file, then
    /// environment overrides (`.env` consulted first).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config file {}", p.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", p.display()))?
            }
            None => Self::default(),
        };

        if let Ok(v) = std::env::var("ENGINE_TIMEOUT_MS") {
            config.timeout_ms = v.parse().context("ENGINE_TIMEOUT_MS must be an integer")?;
        }
        if let Ok(v) = std::env::var("ENGINE_MIN_CONFIDENCE") {
            config.min_confidence = v
                .parse()
                .context("ENGINE_MIN_CONFIDENCE must be a float in [0,1]")?;
        }
        if let Ok(v) = std::env::var("ENGINE_SEQUENTIAL") {
            config.parallel = !matches!(v.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Compiled gazetteer matcher, built once per snapshot. `None` when
    /// the gazetteer is empty.
    pub fn gazetteer_matcher(&self) -> Option<&GazetteerMatcher> {
        self.gazetteer_cache
            .get_or_init(|| compile_gazetteer(&self.gazetteer))
            .as_ref()
    }
}

/// Hands out immutable config snapshots. `swap` replaces the whole
/// snapshot, so a reader never observes a partially updated table.
#[derive(Debug)]
pub struct ConfigHandle {
    inner: RwLock<Arc<EngineConfig>>,
}

impl ConfigHandle {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: RwLock::new(Arc::new(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<EngineConfig> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn swap(&self, config: EngineConfig) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(config);
    }
}

fn compile_gazetteer(terms: &[String]) -> Option<GazetteerMatcher> {
    if terms.is_empty() {
        return None;
    }
    // Longer terms first so "machine learning" wins over "machine".
    let mut sorted: Vec<&String> = terms.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));

    let alternatives: Vec<String> = sorted
        .iter()
        .map(|t| {
            let escaped = regex::escape(t);
            // Word boundaries only where the term edge is a word char;
            // "c++" has none on the right.
            let lead = if t.starts_with(|c: char| c.is_alphanumeric()) {
                r"\b"
            } else {
                ""
            };
            let trail = if t.ends_with(|c: char| c.is_alphanumeric()) {
                r"\b"
            } else {
                ""
            };
            format!("{lead}{escaped}{trail}")
        })
        .collect();

    let pattern = format!("(?i)(?:{})", alternatives.join("|"));
    let regex = Regex::new(&pattern).ok()?;
    let display = terms
        .iter()
        .map(|t| (t.to_lowercase(), t.clone()))
        .collect();
    Some(GazetteerMatcher { regex, display })
}

fn default_synonyms() -> Vec<SynonymEntry> {
    vec![
        SynonymEntry {
            kind: SectionKind::Contact,
            phrases: str_vec(&["contact information", "personal information", "contact"]),
        },
        SynonymEntry {
            kind: SectionKind::Education,
            phrases: str_vec(&["education", "academic background", "academics", "qualifications"]),
        },
        SynonymEntry {
            kind: SectionKind::Experience,
            phrases: str_vec(&[
                "professional experience",
                "work experience",
                "work history",
                "employment history",
                "employment",
                "experience",
                "projects",
            ]),
        },
        SynonymEntry {
            kind: SectionKind::Skills,
            phrases: str_vec(&["technical skills", "core competencies", "skills", "technologies"]),
        },
        SynonymEntry {
            kind: SectionKind::Certifications,
            phrases: str_vec(&[
                "certifications",
                "certificates",
                "licenses",
                "training",
                "internships",
            ]),
        },
        SynonymEntry {
            kind: SectionKind::Links,
            phrases: str_vec(&["links", "profiles", "social links", "online presence"]),
        },
    ]
}

fn default_gazetteer() -> Vec<String> {
    str_vec(&[
        "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Go", "Rust", "Ruby", "PHP",
        "Swift", "Kotlin", "Scala", "SQL", "HTML", "CSS", "React", "Angular", "Vue", "Node.js",
        "Django", "Flask", "Spring", "Kubernetes", "Docker", "Terraform", "AWS", "Azure", "GCP",
        "Linux", "Git", "Jenkins", "PostgreSQL", "MySQL", "MongoDB", "Redis", "Kafka", "GraphQL",
        "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Pandas", "NumPy", "Spark",
        "Hadoop", "Tableau",
    ])
}

fn str_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
