//! Pattern-based masking of sensitive substrings.
//!
//! Rules run in a fixed order over the whole text. Every placeholder is
//! shaped so that no rule matches it again, which keeps `mask` idempotent.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use pagelens_protocols::SensitiveCategory;
use regex::{Captures, Regex};

/// Value placeholder for key/value secrets and masked form fields.
pub const REDACTED: &str = "[REDACTED]";

struct Rule {
    category: SensitiveCategory,
    pattern: &'static str,
    /// `None` leaves the match untouched.
    replace: fn(&Captures<'_>) -> Option<String>,
}

const RULES: &[Rule] = &[
    Rule {
        category: SensitiveCategory::Email,
        pattern: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        replace: |_| Some("[EMAIL_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::Jwt,
        pattern: r"\beyJ[A-Za-z0-9_-]+\.eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
        replace: |_| Some("[JWT_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::CloudResource,
        pattern: r"\barn:aws[A-Za-z-]*:[A-Za-z0-9-]+:[A-Za-z0-9-]*:\d{0,12}:[A-Za-z0-9_/.:+=@-]+",
        replace: |_| Some("[AWS_ARN_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::CloudResource,
        pattern: r"\bprojects/[a-z][a-z0-9-]{4,28}[a-z0-9]\b",
        replace: |_| Some("projects/[GCP_PROJECT_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::CloudResource,
        pattern: r"/subscriptions/[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        replace: |_| Some("/subscriptions/[AZURE_SUBSCRIPTION_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::CreditCard,
        pattern: r"\b\d{4}[ -]?\d{4}[ -]?\d{4}[ -]?\d{1,4}\b",
        replace: |_| Some("[CARD_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::Ssn,
        pattern: r"\b\d{3}-\d{2}-\d{4}\b",
        replace: |_| Some("[SSN_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::Phone,
        pattern: r"(?:\+\d{1,3}[-. ]?)?(?:\(\d{3}\)|\b\d{3})[-. ]?\d{3}[-. ]?\d{4}\b",
        replace: |_| Some("[PHONE_REDACTED]".to_string()),
    },
    Rule {
        category: SensitiveCategory::ApiKey,
        pattern: r#"(?i)\b(api[_-]?key|apikey|access[_-]?token|auth[_-]?token|refresh[_-]?token|client[_-]?secret|secret[_-]?key|secret|password|passwd|pwd|private[_-]?key|account[_-]?id|token)(\s*["']?\s*[:=]\s*["']?)([^\s"'&,;<>\[\]]+)"#,
        replace: |caps| Some(format!("{}{}{REDACTED}", &caps[1], &caps[2])),
    },
    Rule {
        category: SensitiveCategory::ApiKey,
        pattern: r"(?i)\b(bearer)\s+[A-Za-z0-9._~+/-]+=*",
        replace: |caps| Some(format!("{} {REDACTED}", &caps[1])),
    },
    Rule {
        category: SensitiveCategory::InternalIp,
        pattern: r"\b(?:10\.\d{1,3}\.\d{1,3}\.\d{1,3}|172\.(?:1[6-9]|2\d|3[01])\.\d{1,3}\.\d{1,3}|192\.168\.\d{1,3}\.\d{1,3})\b",
        replace: |caps| {
            let valid = caps[0].split('.').all(|o| o.parse::<u16>().is_ok_and(|n| n <= 255));
            valid.then(|| "[INTERNAL_IP]".to_string())
        },
    },
    Rule {
        category: SensitiveCategory::HexSecret,
        pattern: r"#?\b[0-9a-fA-F]{40,}\b",
        // Colour codes and anchors keep their leading `#`.
        replace: |caps| (!caps[0].starts_with('#')).then(|| "[HEX_REDACTED]".to_string()),
    },
];

static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| Regex::new(rule.pattern).expect("redaction pattern is valid"))
        .collect()
});

static SCRIPT_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(<script\b[^>]*>).*?(</script\s*>)").expect("script pattern is valid")
});

static STYLE_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(<style\b[^>]*>).*?(</style\s*>)").expect("style pattern is valid")
});

static INPUT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<input\b[^>]*>").expect("input pattern is valid"));

static VALUE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(\svalue\s*=\s*)("[^"]*"|'[^']*'|[^\s>]+)"#).expect("value pattern is valid")
});

static NAMED_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s(type|name|id|autocomplete)\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("attribute pattern is valid")
});

static SENSITIVE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(pass(word|wd|code)?|pwd|secret|token|api[_\s-]?key|ssn|social[_\s-]?security|credit[_\s-]?card|card[_\s-]?number|cc[_\s-]?num|cvv|cvc|iban|account[_\s-]?number|routing)",
    )
    .expect("sensitive name pattern is valid")
});

/// Masked text plus the categories that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    pub categories: BTreeSet<SensitiveCategory>,
}

impl Redaction {
    pub fn changed(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Best-effort sensitive data filter.
pub struct Redactor;

impl Redactor {
    /// Mask every sensitive substring of `text`.
    pub fn mask(text: &str) -> String {
        Self::redact(text).text
    }

    /// Mask `text` and report which categories fired.
    pub fn redact(text: &str) -> Redaction {
        let mut categories = BTreeSet::new();
        let mut current = text.to_string();
        // Every rule runs on the output of the previous one; a rule's
        // replacement can expose a match that the raw text hid.
        for (rule, pattern) in RULES.iter().zip(COMPILED.iter()) {
            if !pattern.is_match(&current) {
                continue;
            }
            let mut fired = false;
            let next = pattern.replace_all(&current, |caps: &Captures<'_>| {
                match (rule.replace)(caps) {
                    Some(replacement) => {
                        fired = true;
                        replacement
                    }
                    None => caps[0].to_string(),
                }
            });
            let next = next.into_owned();
            if fired {
                categories.insert(rule.category);
            }
            current = next;
        }

        Redaction {
            text: current,
            categories,
        }
    }

    /// Categories present in `text`, without masking it.
    pub fn detect_types(text: &str) -> BTreeSet<SensitiveCategory> {
        Self::redact(text).categories
    }

    /// HTML variant: empties script and style bodies, masks the `value` of
    /// password or sensitively named inputs, then applies [`Redactor::mask`].
    pub fn mask_html(html: &str) -> String {
        Self::redact_html(html).text
    }

    /// [`Redactor::mask_html`] plus the categories that fired on the markup.
    pub fn redact_html(html: &str) -> Redaction {
        let stripped = SCRIPT_BODY.replace_all(html, "$1$2");
        let stripped = STYLE_BODY.replace_all(&stripped, "$1$2");
        let inputs = INPUT_TAG.replace_all(&stripped, |caps: &Captures<'_>| {
            let tag = &caps[0];
            if Self::input_tag_is_sensitive(tag) {
                VALUE_ATTR
                    .replace_all(tag, format!("${{1}}\"{REDACTED}\"").as_str())
                    .into_owned()
            } else {
                tag.to_string()
            }
        });
        Self::redact(&inputs)
    }

    /// Whether a field name, id or label suggests a secret value.
    pub fn is_sensitive_name(name: &str) -> bool {
        SENSITIVE_NAME.is_match(name)
    }

    fn input_tag_is_sensitive(tag: &str) -> bool {
        NAMED_ATTR.captures_iter(tag).any(|caps| {
            let value = caps[2].trim_matches(|c| c == '"' || c == '\'');
            if caps[1].eq_ignore_ascii_case("type") {
                value.eq_ignore_ascii_case("password")
            } else {
                Self::is_sensitive_name(value)
            }
        })
    }
}

#[cfg(test)]
#[path = "redactor_tests.rs"]
mod tests;
