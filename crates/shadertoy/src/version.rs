//! Turns the driver's `GL_SHADING_LANGUAGE_VERSION` string into the value of a
//! `#version` directive so the templates in `template` can target whatever
//! dialect the context actually exposes.
//!
//! Types:
//!
//! - `Profile` distinguishes desktop GLSL from GLSL ES.
//! - `ShadingLanguageVersion` is the parsed, normalized version (minor is always
//!   two digits, so `3.1` becomes `3` / `10`).
//! - `VersionDirective` holds the directive value (`"310 es"`, `"100"`) or
//!   nothing when detection failed.
//! - `VersionError` reports directives whose leading number cannot be parsed.
//!
//! Functions:
//!
//! - `ShadingLanguageVersion::parse` matches the driver string.
//! - `resolve_directive` is the logging entry point used at renderer start-up.
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

/// Embedded-profile version 1.00 never carries the `es` qualifier.
const UNQUALIFIED_ES_VERSION: u32 = 100;

fn version_regex() -> &'static Regex {
    static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();
    VERSION_REGEX.get_or_init(|| {
        Regex::new(r"(?:GLSL\s*)?(ES)?\s*(\d+)\.(\d+)").expect("GLSL version pattern is valid")
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("GLSL version directive '{0}' does not start with a number")]
    NonNumeric(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Desktop,
    EmbeddedEs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingLanguageVersion {
    profile: Profile,
    major: u32,
    minor: u32,
}

impl ShadingLanguageVersion {
    /// Extracts the first `[GLSL] [ES] <major>.<minor>` occurrence.
    ///
    /// Returns `None` for empty or unrecognised strings and for majors too large
    /// to form a directive number; callers fall back to a directive-less legacy
    /// shader in that case.
    pub fn parse(reported: &str) -> Option<Self> {
        let captures = version_regex().captures(reported)?;
        let profile = if captures.get(1).is_some() {
            Profile::EmbeddedEs
        } else {
            Profile::Desktop
        };
        let major: u32 = captures.get(2)?.as_str().parse().ok()?;
        let minor = normalize_minor(captures.get(3)?.as_str())?;
        // The directive number must fit in a u32.
        major.checked_mul(100)?.checked_add(minor)?;
        Some(Self {
            profile,
            major,
            minor,
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor version scaled to two digits (`3.1` reports `10`).
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Numeric directive value, e.g. `310` for GLSL ES 3.10.
    pub fn number(&self) -> u32 {
        self.major * 100 + self.minor
    }

    pub fn directive(&self) -> VersionDirective {
        let number = self.number();
        let qualified = self.profile == Profile::EmbeddedEs && number != UNQUALIFIED_ES_VERSION;
        let value = if qualified {
            format!("{}{:02} es", self.major, self.minor)
        } else {
            format!("{}{:02}", self.major, self.minor)
        };
        VersionDirective(value)
    }
}

/// Pads a single digit on the right (`"1"` -> `10`, `"0"` -> `00`) and keeps
/// only the first two digits of longer groups.
fn normalize_minor(digits: &str) -> Option<u32> {
    let normalized = match digits.len() {
        0 => return None,
        1 => format!("{digits}0"),
        _ => digits[..2].to_string(),
    };
    normalized.parse().ok()
}

/// The text following `#version`, or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionDirective(String);

impl VersionDirective {
    pub fn none() -> Self {
        Self::default()
    }

    /// Accepts a user-supplied directive such as `"300 es"` or `"#version 100"`.
    ///
    /// The value is kept verbatim; it is only checked once the template family
    /// is chosen, so a malformed override surfaces as [`VersionError`].
    pub fn from_override(raw: &str) -> Self {
        let trimmed = raw.trim();
        let value = trimmed
            .strip_prefix("#version")
            .map(str::trim)
            .unwrap_or(trimmed);
        Self(value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full directive line, empty when no version was detected.
    pub fn line(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("#version {}", self.0)
        }
    }

    /// Leading integer of the directive, `None` when there is no directive.
    ///
    /// Mirrors `strtol`: optional leading whitespace and sign, then digits.
    pub fn number(&self) -> Result<Option<i64>, VersionError> {
        if self.0.is_empty() {
            return Ok(None);
        }
        let rest = self.0.trim_start();
        let (negative, rest) = match rest.as_bytes().first() {
            Some(b'-') => (true, &rest[1..]),
            Some(b'+') => (false, &rest[1..]),
            _ => (false, rest),
        };
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(VersionError::NonNumeric(self.0.clone()));
        }
        let value: i64 = rest[..digits_len]
            .parse()
            .map_err(|_| VersionError::NonNumeric(self.0.clone()))?;
        Ok(Some(if negative { -value } else { value }))
    }
}

impl fmt::Display for VersionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the directive for a driver-reported version string, logging the
/// outcome. Unrecognised strings produce an empty directive.
pub fn resolve_directive(reported: &str) -> VersionDirective {
    if reported.trim().is_empty() {
        warn!("driver reported an empty GL_SHADING_LANGUAGE_VERSION; omitting #version");
        return VersionDirective::none();
    }
    match ShadingLanguageVersion::parse(reported) {
        Some(version) => {
            let directive = version.directive();
            info!(reported, directive = %directive, "detected GLSL version");
            directive
        }
        None => {
            warn!(reported, "cannot match GLSL version; omitting #version");
            VersionDirective::none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive_for(reported: &str) -> String {
        resolve_directive(reported).as_str().to_string()
    }

    #[test]
    fn desktop_versions_have_no_qualifier() {
        assert_eq!(directive_for("1.00"), "100");
        assert_eq!(directive_for("4.30"), "430");
        assert_eq!(directive_for("4.60 NVIDIA"), "460");
    }

    #[test]
    fn es_100_is_never_qualified() {
        assert_eq!(directive_for("ES 1.00"), "100");
        assert_eq!(directive_for("OpenGL ES GLSL ES 1.0.16"), "100");
    }

    #[test]
    fn es_versions_keep_qualifier() {
        assert_eq!(directive_for("ES 3.10"), "310 es");
        assert_eq!(directive_for("OpenGL ES GLSL ES 3.20 Mesa 23.1.4"), "320 es");
    }

    #[test]
    fn single_digit_minor_is_scaled() {
        let version = ShadingLanguageVersion::parse("GLSL ES 3.1").unwrap();
        assert_eq!(version.minor(), 10);
        assert_eq!(version.directive().as_str(), "310 es");

        let zero = ShadingLanguageVersion::parse("1.0").unwrap();
        assert_eq!(zero.minor(), 0);
        assert_eq!(zero.directive().as_str(), "100");
    }

    #[test]
    fn long_minor_is_truncated() {
        let version = ShadingLanguageVersion::parse("4.605").unwrap();
        assert_eq!(version.number(), 460);
    }

    #[test]
    fn unrecognised_strings_yield_empty_directive() {
        assert!(resolve_directive("").is_empty());
        assert!(resolve_directive("   ").is_empty());
        assert!(resolve_directive("no version here").is_empty());
        assert_eq!(resolve_directive("garbage").line(), "");
    }

    #[test]
    fn oversized_major_yields_empty_directive() {
        assert!(ShadingLanguageVersion::parse("GLSL 50000000.00").is_none());
        assert!(resolve_directive("GLSL 50000000.00").is_empty());
        assert!(resolve_directive("ES 99999999999.10").is_empty());
        assert_eq!(directive_for("GLSL 42949672.95"), "4294967295");
    }

    #[test]
    fn directive_line_includes_keyword() {
        assert_eq!(resolve_directive("ES 3.00").line(), "#version 300 es");
    }

    #[test]
    fn override_strips_keyword() {
        let directive = VersionDirective::from_override("  #version 300 es ");
        assert_eq!(directive.as_str(), "300 es");
        assert_eq!(directive.number(), Ok(Some(300)));
    }

    #[test]
    fn non_numeric_override_is_an_error() {
        let directive = VersionDirective::from_override("es 300");
        assert_eq!(
            directive.number(),
            Err(VersionError::NonNumeric("es 300".into()))
        );
    }

    #[test]
    fn empty_directive_has_no_number() {
        assert_eq!(VersionDirective::none().number(), Ok(None));
    }
}
