//! Consistency checks over a decoded feed
//!
//! The feed encodes "actively exploited" twice: as `true` entries in the CVE map
//! and as the `ActivelyExploitedCVEs` list. It also publishes a unique-CVE count
//! next to the map. Decoding accepts whatever upstream sends; this module reports
//! where those encodings disagree without rejecting the document.

use super::release::{Cves, ReleaseDetails};
use std::collections::BTreeSet;

/// One disagreement between a release's CVE map and its exploited list
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CveMismatch {
    /// Listed as exploited but absent from the map or mapped to `false`
    ListedNotFlagged(String),
    /// Mapped to `true` but missing from the exploited list
    FlaggedNotListed(String),
}

impl CveMismatch {
    /// The CVE identifier concerned
    pub fn cve(&self) -> &str {
        match self {
            CveMismatch::ListedNotFlagged(cve) | CveMismatch::FlaggedNotListed(cve) => cve,
        }
    }
}

impl std::fmt::Display for CveMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CveMismatch::ListedNotFlagged(cve) => {
                write!(f, "{cve} is listed as actively exploited but not flagged in CVEs")
            }
            CveMismatch::FlaggedNotListed(cve) => {
                write!(f, "{cve} is flagged in CVEs but missing from ActivelyExploitedCVEs")
            }
        }
    }
}

/// Compare a CVE map against an exploited list, in CVE order
pub fn exploited_cve_mismatches(cves: &Cves, exploited: &[String]) -> Vec<CveMismatch> {
    let listed: BTreeSet<&str> = exploited.iter().map(String::as_str).collect();
    let flagged: BTreeSet<&str> = cves
        .iter()
        .filter(|(_, exploited)| **exploited)
        .map(|(cve, _)| cve.as_str())
        .collect();

    let mut mismatches: Vec<CveMismatch> = listed
        .difference(&flagged)
        .map(|cve| CveMismatch::ListedNotFlagged((*cve).to_string()))
        .chain(
            flagged
                .difference(&listed)
                .map(|cve| CveMismatch::FlaggedNotListed((*cve).to_string())),
        )
        .collect();
    mismatches.sort_by(|a, b| a.cve().cmp(b.cve()));
    mismatches
}

/// Which release record inside an OS version family a finding refers to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReleaseRef {
    /// The family's `Latest` record
    Latest,
    /// A `SecurityReleases` entry, by index and product version
    Security {
        /// Position in `SecurityReleases`
        index: usize,
        /// The entry's product version
        product_version: String,
    },
}

/// What was found to be inconsistent
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Issue {
    /// CVE map and exploited list disagree
    ExploitedCve(CveMismatch),
    /// Published unique count differs from the number of distinct map keys
    UniqueCveCount {
        /// `UniqueCVEsCount` as published
        declared: i64,
        /// Distinct keys in the CVE map
        distinct: usize,
    },
}

/// One audit result, located by OS version family and release
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    /// The family's `OSVersion` label
    pub os_version: String,
    /// The release record concerned
    pub release: ReleaseRef,
    /// The inconsistency
    pub issue: Issue,
}

impl Finding {
    /// Findings that contradict the exploited-CVE invariant, as opposed to the
    /// advisory unique-count comparison
    pub fn is_cve_mismatch(&self) -> bool {
        matches!(self.issue, Issue::ExploitedCve(_))
    }
}

/// All findings for one feed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Findings in document order
    pub findings: Vec<Finding>,
}

impl AuditReport {
    /// No findings of any kind
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings about the exploited-CVE invariant only
    pub fn cve_mismatches(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_cve_mismatch())
    }

    /// Findings about the advisory unique-CVE count only
    pub fn count_mismatches(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_cve_mismatch())
    }

    pub(crate) fn check_release<R: ReleaseDetails>(
        &mut self,
        os_version: &str,
        release: ReleaseRef,
        details: &R,
    ) {
        for mismatch in details.cve_mismatches() {
            self.findings.push(Finding {
                os_version: os_version.to_string(),
                release: release.clone(),
                issue: Issue::ExploitedCve(mismatch),
            });
        }

        let distinct = details.cves().len();
        if usize::try_from(details.unique_cves_count()).ok() != Some(distinct) {
            self.findings.push(Finding {
                os_version: os_version.to_string(),
                release,
                issue: Issue::UniqueCveCount {
                    declared: details.unique_cves_count(),
                    distinct,
                },
            });
        }
    }
}
