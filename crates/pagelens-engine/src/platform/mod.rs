//! Platform detection by weighted signature matching.
//!
//! Each signature scores hostname (+50), URL pattern (+30) and selector
//! presence (+20), counting the first match per category only. The best
//! score wins and maps to a confidence of `min(score / 100, 1)`.

mod products;
mod signatures;

use pagelens_protocols::{PageInspector, PlatformDetection};
use tracing::debug;
use url::Url;

pub use products::detect_product;
pub use signatures::{PlatformSignature, SIGNATURES};
use signatures::{HOSTNAME_WEIGHT, SELECTOR_WEIGHT, URL_REGEXES, URL_WEIGHT, host_matches};

/// Classifies the site being viewed.
pub struct PlatformDetector;

impl PlatformDetector {
    pub fn detect(page: &dyn PageInspector) -> PlatformDetection {
        let href = page.location().href;
        let parsed = Url::parse(&href).ok();
        let host = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let mut best: Option<(usize, u32, Vec<String>)> = None;
        for (idx, signature) in SIGNATURES.iter().enumerate() {
            let (score, indicators) = Self::score_signature(page, idx, signature, &host, &href);
            // Strictly greater keeps the earlier signature on ties.
            if score > 0 && best.as_ref().is_none_or(|(_, top, _)| score > *top) {
                best = Some((idx, score, indicators));
            }
        }

        let Some((idx, score, indicators)) = best else {
            debug!(href = %href, "No platform signature matched");
            return PlatformDetection::generic();
        };

        let platform = SIGNATURES[idx].platform;
        let product_url = match &parsed {
            Some(url) => format!(
                "{}{}{}",
                host,
                url.path(),
                url.fragment().map(|f| format!("#{f}")).unwrap_or_default()
            ),
            None => href.clone(),
        };
        let detection = PlatformDetection {
            platform,
            confidence: (f64::from(score) / 100.0).min(1.0),
            indicators,
            specific_product: detect_product(platform, &product_url),
        };
        debug!(
            platform = %detection.platform,
            confidence = detection.confidence,
            "Platform detected"
        );
        detection
    }

    fn score_signature(
        page: &dyn PageInspector,
        idx: usize,
        signature: &PlatformSignature,
        host: &str,
        href: &str,
    ) -> (u32, Vec<String>) {
        let mut score = 0;
        let mut indicators = Vec::new();

        if let Some(entry) = signature.hostnames.iter().find(|e| host_matches(host, e)) {
            score += HOSTNAME_WEIGHT;
            indicators.push(format!("hostname:{entry}"));
        }

        if let Some(pattern) = URL_REGEXES[idx].iter().find(|re| re.is_match(href)) {
            score += URL_WEIGHT;
            indicators.push(format!("url:{}", pattern.as_str()));
        }

        let present = signature.selectors.iter().find(|selector| {
            page.query_first(selector)
                .inspect_err(|e| debug!(error = %e, "Platform selector rejected"))
                .ok()
                .flatten()
                .is_some()
        });
        if let Some(selector) = present {
            score += SELECTOR_WEIGHT;
            indicators.push(format!("selector:{selector}"));
        }

        (score, indicators)
    }
}
