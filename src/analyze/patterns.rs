// src/analyze/patterns.rs
// =============================================================================
// This module classifies response content by the sensitive data it exposes.
//
// How it works:
// - A fixed table of (regex, category label) pairs is grouped under four
//   severity tiers: Critical, High, Medium, Low
// - Every header is rendered as "name: value" and tested against every pattern
// - The body is tested against every pattern; every match is recorded
// - Info has no patterns of its own, it's what a response gets when nothing
//   matched (decided by the caller, not here)
//
// The table is compiled once at startup and shared read-only between all
// probes through an Arc.
// =============================================================================

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity tiers, declared lowest first so the derived `Ord` gives
/// `Info < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Every tier, lowest first
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Reduces a set of tiers to the highest one, or `Info` when empty.
    pub fn max_of<I: IntoIterator<Item = Severity>>(tiers: I) -> Severity {
        tiers.into_iter().max().unwrap_or(Severity::Info)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Critical | Severity::High => "🔴",
            Severity::Medium => "🟡",
            Severity::Low => "🔵",
            Severity::Info => "ℹ️",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
        };
        f.pad(name)
    }
}

/// Where in the response a pattern matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Header,
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Header => f.pad("header"),
            Location::Body => f.pad("body"),
        }
    }
}

/// A single pattern match against response headers or body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Category label from the pattern table (e.g. "API Key")
    #[serde(rename = "type")]
    pub category: String,
    pub severity: Severity,
    /// For headers this is the header value, for the body the matched text
    #[serde(rename = "match")]
    pub matched: String,
    pub location: Location,
}

/// Findings grouped by tier. BTreeMap keeps the tiers ordered so callers can
/// walk them highest first with `.iter().rev()`.
pub type FindingsByTier = BTreeMap<Severity, Vec<Finding>>;

// The built-in pattern table.
// Each entry: (tier, [(case-insensitive regex, category label), ...])
const PATTERN_TABLE: &[(Severity, &[(&str, &str)])] = &[
    (
        Severity::Critical,
        &[
            (r"\b(password|passwd|pwd|credential)\b", "Sensitive Credential"),
            (r"\b(api[_-]?key|token|secret|auth)\b", "API Key"),
            (r"\bSQL syntax error|unclosed quotation\b", "SQL Error"),
            (r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b", "Credit Card"),
            (r"\b(ssh-rsa|BEGIN RSA PRIVATE KEY)\b", "SSH Key"),
        ],
    ),
    (
        Severity::High,
        &[
            (r"\b(admin|root|superuser|sysadmin)\b", "Admin Account"),
            (r"\b(login|signin|authentication)\b", "Auth Endpoint"),
            (r"\b(ssn|social security number)\b", "PII Data"),
            (r"\b(aws_access_key_id|aws_secret_access_key)\b", "AWS Credentials"),
        ],
    ),
    (
        Severity::Medium,
        &[
            (r"\b(config|settings|env|configuration)\b", "Config File"),
            (r"\b(backup|archive|dump|sql)\b", "Backup File"),
            (r"\b(internal|confidential|restricted)\b", "Internal Doc"),
        ],
    ),
    (
        Severity::Low,
        &[
            (r"\b(server|version|os|platform)\b", "Server Info"),
            (r"\b(php|asp|jsp|nodejs)\b", "Tech Stack"),
            (r"\b(jquery|bootstrap|react)\b", "Client Library"),
        ],
    ),
];

/// One compiled entry of the pattern table
struct Pattern {
    regex: Regex,
    category: String,
}

/// Compiled, read-only pattern table
pub struct PatternMatcher {
    tiers: Vec<(Severity, Vec<Pattern>)>,
}

impl PatternMatcher {
    /// Compiles the built-in table. Called once at startup.
    pub fn builtin() -> Result<Self, regex::Error> {
        Self::from_table(PATTERN_TABLE)
    }

    /// Compiles an arbitrary table. Every pattern is case-insensitive.
    pub fn from_table(table: &[(Severity, &[(&str, &str)])]) -> Result<Self, regex::Error> {
        let mut tiers = Vec::with_capacity(table.len());

        for (severity, entries) in table {
            let mut patterns = Vec::with_capacity(entries.len());
            for (source, category) in entries.iter() {
                let regex = RegexBuilder::new(source).case_insensitive(true).build()?;
                patterns.push(Pattern {
                    regex,
                    category: category.to_string(),
                });
            }
            tiers.push((*severity, patterns));
        }

        Ok(Self { tiers })
    }

    /// Number of compiled patterns across all tiers
    pub fn len(&self) -> usize {
        self.tiers.iter().map(|(_, patterns)| patterns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scans headers and body text against every pattern in every tier.
    ///
    /// Header findings come first (in header order), then body findings.
    /// A header that matches yields its value as the match text, a body
    /// match yields the exact matched substring. Tiers with no findings are
    /// absent from the map.
    pub fn scan(&self, body: &str, headers: &[(String, String)]) -> FindingsByTier {
        let mut findings = FindingsByTier::new();

        for (name, value) in headers {
            let line = format!("{}: {}", name, value);
            for (severity, patterns) in &self.tiers {
                for pattern in patterns {
                    if pattern.regex.is_match(&line) {
                        findings.entry(*severity).or_default().push(Finding {
                            category: pattern.category.clone(),
                            severity: *severity,
                            matched: value.clone(),
                            location: Location::Header,
                        });
                    }
                }
            }
        }

        for (severity, patterns) in &self.tiers {
            for pattern in patterns {
                for m in pattern.regex.find_iter(body) {
                    findings.entry(*severity).or_default().push(Finding {
                        category: pattern.category.clone(),
                        severity: *severity,
                        matched: m.as_str().to_string(),
                        location: Location::Body,
                    });
                }
            }
        }

        findings
    }
}
