//! Free-text WHOIS response classification.
//!
//! WHOIS registries don't share a vocabulary, so classification is phrase
//! matching against lists that live in [`Phrases`] and can be extended from
//! the configuration file. The lists are heuristic: an unusual registry
//! phrasing can still be misread, and fixing that means adding a phrase.

use crate::expiry::extract_expiry;
use crate::types::Verdict;
use serde::{Deserialize, Serialize};

const RATE_LIMIT_PHRASES: &[&str] = &[
    "limit exceeded",
    "exceeded port 43",
    "quota exceeded",
    "try again later",
    "too many requests",
    "please wait",
    "please try again",
    "temporarily unavailable",
];

const AVAILABLE_PHRASES: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "status: free",
    "not registered",
    "available",
];

const EXPIRY_LABELS: &[&str] = &[
    "expiry date",
    "expiration date",
    "registry expiry date",
    "expiration time",
    "paid-till",
    "renewal date",
    "expire date",
    "expires on",
    "valid until",
];

/// Phrase lists used by the classifier and the expiry extractor.
///
/// All entries are stored lowercase; matching lowercases the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrases {
    /// Phrases meaning the registry throttled us
    pub rate_limit: Vec<String>,

    /// Phrases meaning the domain is not registered
    pub available: Vec<String>,

    /// Field labels that introduce an expiry date
    pub expiry_labels: Vec<String>,
}

impl Default for Phrases {
    fn default() -> Self {
        Self {
            rate_limit: to_owned_list(RATE_LIMIT_PHRASES),
            available: to_owned_list(AVAILABLE_PHRASES),
            expiry_labels: to_owned_list(EXPIRY_LABELS),
        }
    }
}

impl Phrases {
    /// Append extra phrases, skipping blanks and duplicates.
    pub fn extend(
        &mut self,
        rate_limit: &[String],
        available: &[String],
        expiry_labels: &[String],
    ) {
        merge_into(&mut self.rate_limit, rate_limit);
        merge_into(&mut self.available, available);
        merge_into(&mut self.expiry_labels, expiry_labels);
    }

    fn is_rate_limited(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.rate_limit)
    }

    fn is_available(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.available)
    }
}

/// Maps raw WHOIS text to a [`Verdict`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    phrases: Phrases,
}

impl Classifier {
    pub fn new(phrases: Phrases) -> Self {
        Self { phrases }
    }

    pub fn phrases(&self) -> &Phrases {
        &self.phrases
    }

    /// Classify one lookup response.
    ///
    /// Check order is fixed: empty, then rate limit, then availability, and
    /// anything else is taken. Rate-limit notices are often wrapped in an
    /// otherwise generic body, so they must win over availability phrases.
    pub fn classify(&self, raw: &str) -> Verdict {
        let text = normalize(raw);
        if text.trim().is_empty() {
            return Verdict::Empty;
        }

        let lower = text.to_lowercase();

        if self.phrases.is_rate_limited(&lower) {
            return Verdict::RateLimited;
        }

        if self.phrases.is_available(&lower) {
            return Verdict::Available;
        }

        Verdict::Taken {
            expiry: extract_expiry(&text, &self.phrases.expiry_labels),
        }
    }
}

/// Classify with the built-in phrase lists.
pub fn classify(raw: &str) -> Verdict {
    Classifier::default().classify(raw)
}

/// Strip carriage returns from a raw response.
pub fn normalize(raw: &str) -> String {
    raw.replace('\r', "")
}

fn contains_any(text_lower: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| text_lower.contains(phrase.as_str()))
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn merge_into(target: &mut Vec<String>, extra: &[String]) {
    for phrase in extra {
        let phrase = phrase.trim().to_lowercase();
        if !phrase.is_empty() && !target.contains(&phrase) {
            target.push(phrase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_TAKEN: &str = "   Domain Name: EXAMPLE.COM\r\n   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r\n   Registrar WHOIS Server: whois.iana.org\r\n   Updated Date: 2024-08-14T07:01:34Z\r\n   Creation Date: 1995-08-14T04:00:00Z\r\n   Registry Expiry Date: 2026-03-15T04:00:00Z\r\n   Registrar: RESERVED-Internet Assigned Numbers Authority\r\n";

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(classify(""), Verdict::Empty);
        assert_eq!(classify("   \n\t  "), Verdict::Empty);
        assert_eq!(classify("\r\n\r\n"), Verdict::Empty);
    }

    #[test]
    fn test_rate_limit_case_insensitive() {
        assert_eq!(classify("TRY AGAIN LATER"), Verdict::RateLimited);
        assert_eq!(classify("try again later"), Verdict::RateLimited);
        assert_eq!(
            classify("%% Query rate exceeded Port 43 limit\n"),
            Verdict::RateLimited
        );
        assert_eq!(
            classify("WHOIS LIMIT EXCEEDED - SEE WWW.PIR.ORG/WHOIS FOR DETAILS"),
            Verdict::RateLimited
        );
    }

    #[test]
    fn test_rate_limit_wins_over_available() {
        let text = "No match for domain \"ACME.COM\".\nToo many requests, please try again.";
        assert_eq!(classify(text), Verdict::RateLimited);
    }

    #[test]
    fn test_available_phrases() {
        assert_eq!(classify("No match for domain"), Verdict::Available);
        assert_eq!(
            classify("No match for domain \"ACMEWIDGETS.COM\".\r\n>>> Last update of whois database"),
            Verdict::Available
        );
        assert_eq!(classify("%% NOT FOUND"), Verdict::Available);
        assert_eq!(classify("Status: free"), Verdict::Available);
        assert_eq!(classify("No entries found for the selected source(s)."), Verdict::Available);
    }

    #[test]
    fn test_taken_with_expiry() {
        assert_eq!(
            classify("Domain Name: ACME.IO\nRegistry Expiry Date: 2026-03-15\n"),
            Verdict::Taken {
                expiry: Some("2026-03-15".to_string())
            }
        );
        assert_eq!(
            classify(VERISIGN_TAKEN),
            Verdict::Taken {
                expiry: Some("2026-03-15".to_string())
            }
        );
    }

    #[test]
    fn test_unrecognized_block_is_taken_without_expiry() {
        let text = "domain: acme.xyz\nregistrar: Some Registrar Ltd\nnserver: ns1.acme.xyz\n";
        assert_eq!(classify(text), Verdict::Taken { expiry: None });
    }

    #[test]
    fn test_expiry_label_without_date_is_taken_without_expiry() {
        let text = "Domain Name: ACME.ORG\nRegistry Expiry Date: unknown\n";
        assert_eq!(classify(text), Verdict::Taken { expiry: None });
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = Classifier::default();
        for text in [VERISIGN_TAKEN, "No match", "", "quota exceeded"] {
            assert_eq!(classifier.classify(text), classifier.classify(text));
        }
    }

    #[test]
    fn test_extended_phrases() {
        let mut phrases = Phrases::default();
        phrases.extend(
            &["Slow Down".to_string()],
            &["Object does not exist".to_string(), "  ".to_string()],
            &[],
        );
        assert!(phrases.rate_limit.contains(&"slow down".to_string()));
        assert!(!phrases.available.contains(&"".to_string()));

        let classifier = Classifier::new(phrases);
        assert_eq!(classifier.classify("please SLOW DOWN"), Verdict::RateLimited);
        assert_eq!(
            classifier.classify("The queried object does not exist"),
            Verdict::Available
        );
    }

    #[test]
    fn test_extend_skips_duplicates() {
        let mut phrases = Phrases::default();
        let before = phrases.available.len();
        phrases.extend(&[], &["NO MATCH".to_string()], &[]);
        assert_eq!(phrases.available.len(), before);
    }
}
