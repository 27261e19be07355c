//! Comment-link verification for peer reviews.
//!
//! A review must point at the reviewer's own comment on the reviewed
//! platform; the author handle baked into the post URL is the proof.

use crate::error::{ReviewError, Result};
use engage_types::Platform;
use url::Url;

/// Check that `link` is a well-formed post URL on `platform` whose
/// author handle matches `handle` (case-insensitive, leading `@`
/// ignored).
pub fn verify_comment_link(platform: Platform, link: &str, handle: &str) -> Result<()> {
    let url = Url::parse(link).map_err(|e| ReviewError::InvalidLink(format!("{link}: {e}")))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ReviewError::InvalidLink(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ReviewError::InvalidLink("missing host".to_string()))?;
    let link_platform = platform_of_host(host)
        .ok_or_else(|| ReviewError::InvalidLink(format!("unrecognized host {host}")))?;
    if link_platform != platform {
        return Err(ReviewError::PlatformMismatch {
            expected: platform,
            found: link_platform,
        });
    }

    let author = link_author(link_platform, &url)?;
    let expected = handle.trim_start_matches('@');
    if !author.eq_ignore_ascii_case(expected) {
        return Err(ReviewError::HandleMismatch {
            expected: expected.to_string(),
            found: author,
        });
    }

    Ok(())
}

fn platform_of_host(host: &str) -> Option<Platform> {
    match host.trim_start_matches("www.") {
        "x.com" | "twitter.com" => Some(Platform::Twitter),
        "instagram.com" => Some(Platform::Instagram),
        "tiktok.com" => Some(Platform::Tiktok),
        _ => None,
    }
}

fn numeric(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Extract the author handle from the platform's post-URL shape.
fn link_author(platform: Platform, url: &Url) -> Result<String> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    match platform {
        // x.com/{handle}/status/{id}
        Platform::Twitter => match segments.as_slice() {
            [handle, "status", id] if numeric(id) => Ok((*handle).to_string()),
            _ => Err(ReviewError::InvalidLink(format!(
                "expected /handle/status/id, got {}",
                url.path()
            ))),
        },
        // instagram.com/{handle}/p/{shortcode} or /{handle}/reel/{shortcode}
        Platform::Instagram => match segments.as_slice() {
            [handle, kind, _code] if *kind == "p" || *kind == "reel" => Ok((*handle).to_string()),
            _ => Err(ReviewError::InvalidLink(format!(
                "expected /handle/p/shortcode, got {}",
                url.path()
            ))),
        },
        // tiktok.com/@{handle}/video/{id}
        Platform::Tiktok => match segments.as_slice() {
            [handle, "video", id] if handle.starts_with('@') && numeric(id) => {
                Ok(handle.trim_start_matches('@').to_string())
            }
            _ => Err(ReviewError::InvalidLink(format!(
                "expected /@handle/video/id, got {}",
                url.path()
            ))),
        },
        _ => Err(ReviewError::InvalidLink(format!(
            "no comment link format for {platform}"
        ))),
    }
}
