//! Built-in platform signatures.

use once_cell::sync::Lazy;
use pagelens_protocols::PlatformType;
use regex::Regex;

pub const HOSTNAME_WEIGHT: u32 = 50;
pub const URL_WEIGHT: u32 = 30;
pub const SELECTOR_WEIGHT: u32 = 20;

/// What identifies one platform.
pub struct PlatformSignature {
    pub platform: PlatformType,
    /// Matched against the host exactly or as a parent domain.
    pub hostnames: &'static [&'static str],
    /// Matched against the full href.
    pub url_patterns: &'static [&'static str],
    /// Presence of any matching element counts.
    pub selectors: &'static [&'static str],
}

/// Checked in order; on a tied score the earlier entry wins.
pub static SIGNATURES: &[PlatformSignature] = &[
    PlatformSignature {
        platform: PlatformType::Github,
        hostnames: &["github.com", "github.dev"],
        url_patterns: &[r"^https?://(?:[^/]+\.)?github\.(?:com|dev)/"],
        selectors: &[
            "meta[property=\"og:site_name\"][content=GitHub]",
            ".AppHeader",
            "[data-turbo-body]",
        ],
    },
    PlatformSignature {
        platform: PlatformType::Gitlab,
        hostnames: &["gitlab.com"],
        url_patterns: &[r"/-/(?:merge_requests|issues|pipelines|jobs|tree|blob)\b"],
        selectors: &["meta[content=GitLab]", ".gl-breadcrumbs", "[data-qa-selector]"],
    },
    PlatformSignature {
        platform: PlatformType::Jira,
        hostnames: &["atlassian.net", "jira.com"],
        url_patterns: &[r"/browse/[A-Z][A-Z0-9]+-\d+", r"/jira/"],
        selectors: &["meta[name=application-name][content=JIRA]", "#jira-frontend", "#jira"],
    },
    PlatformSignature {
        platform: PlatformType::Confluence,
        hostnames: &["atlassian.net"],
        url_patterns: &[r"/wiki/", r"/display/[^/]+/"],
        selectors: &["meta[name=confluence-request-time]", "#com-atlassian-confluence"],
    },
    PlatformSignature {
        platform: PlatformType::AwsConsole,
        hostnames: &["console.aws.amazon.com", "aws.amazon.com"],
        url_patterns: &[r"console\.aws\.amazon\.com"],
        selectors: &["#awsc-nav-header", "[data-testid=awsc-nav-header]"],
    },
    PlatformSignature {
        platform: PlatformType::GcpConsole,
        hostnames: &["console.cloud.google.com"],
        url_patterns: &[r"console\.cloud\.google\.com"],
        selectors: &["pan-shell", "cfc-platform-bar"],
    },
    PlatformSignature {
        platform: PlatformType::AzurePortal,
        hostnames: &["portal.azure.com"],
        url_patterns: &[r"portal\.azure\.com"],
        selectors: &[".fxs-portal", "#web-container"],
    },
    PlatformSignature {
        platform: PlatformType::Vercel,
        hostnames: &["vercel.com"],
        url_patterns: &[r"vercel\.com/[^/]+/[^/]+/deployments"],
        selectors: &["[data-geist-theme]"],
    },
    PlatformSignature {
        platform: PlatformType::Netlify,
        hostnames: &["app.netlify.com"],
        url_patterns: &[r"app\.netlify\.com/sites/"],
        selectors: &["#netlify-app"],
    },
    PlatformSignature {
        platform: PlatformType::StackOverflow,
        hostnames: &["stackoverflow.com", "stackexchange.com", "serverfault.com", "superuser.com"],
        url_patterns: &[r"/questions/\d+"],
        selectors: &[".s-topbar", "#question-header"],
    },
    PlatformSignature {
        platform: PlatformType::Slack,
        hostnames: &["app.slack.com", "slack.com"],
        url_patterns: &[r"app\.slack\.com/client/"],
        selectors: &[".p-client", "[data-qa=message_pane]"],
    },
    PlatformSignature {
        platform: PlatformType::Notion,
        hostnames: &["notion.so", "notion.site"],
        url_patterns: &[r"notion\.(?:so|site)/"],
        selectors: &[".notion-app-inner", "#notion-app"],
    },
    PlatformSignature {
        platform: PlatformType::GoogleWorkspace,
        hostnames: &[
            "docs.google.com",
            "mail.google.com",
            "drive.google.com",
            "calendar.google.com",
            "meet.google.com",
        ],
        url_patterns: &[r"docs\.google\.com/(?:document|spreadsheets|presentation|forms)/"],
        selectors: &["#docs-editor", "#drive_main_page"],
    },
    PlatformSignature {
        platform: PlatformType::Salesforce,
        hostnames: &["lightning.force.com", "salesforce.com"],
        url_patterns: &[r"/lightning/(?:r|o|page)/"],
        selectors: &[".slds-global-header", "one-app-nav-bar"],
    },
    PlatformSignature {
        platform: PlatformType::Linear,
        hostnames: &["linear.app"],
        url_patterns: &[r"linear\.app/[^/]+/(?:issue|project|team)/"],
        selectors: &["[data-linear-app]"],
    },
];

/// URL regexes per signature, compiled once.
pub static URL_REGEXES: Lazy<Vec<Vec<Regex>>> = Lazy::new(|| {
    SIGNATURES
        .iter()
        .map(|sig| {
            sig.url_patterns
                .iter()
                .map(|p| Regex::new(p).expect("platform url pattern is valid"))
                .collect()
        })
        .collect()
});

/// Host equals `entry` or is a subdomain of it.
pub fn host_matches(host: &str, entry: &str) -> bool {
    host == entry
        || host
            .strip_suffix(entry)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
