// ChiloDisco - core/age.rs
//
// Recency staircase: maps the age of a line (or file) in seconds to a hue,
// a glow strength and a bucket. The breakpoints are fixed steps, never
// interpolated; every age lands in exactly one bucket.

/// Text glow drawn around recent lines (CSS `text-shadow` in the markup).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Inner blur radius in px. The outer ring uses twice this.
    pub blur: u8,
    /// Inner glow opacity, 0.0-1.0.
    pub alpha: f32,
}

impl Glow {
    /// Fully transparent glow.
    pub const NONE: Glow = Glow {
        blur: 0,
        alpha: 0.0,
    };

    /// True when this glow draws nothing.
    pub fn is_none(&self) -> bool {
        self.blur == 0
    }

    /// Opacity of the outer glow ring, clamped to 0.0-1.0.
    pub fn outer_alpha(&self) -> f32 {
        (self.alpha * crate::util::constants::GLOW_OUTER_ALPHA_FACTOR).clamp(0.0, 1.0)
    }
}

/// Discrete recency classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBucket {
    UpTo2s,
    UpTo5s,
    UpTo10s,
    UpTo20s,
    UpTo40s,
    UpTo60s,
    UpTo90s,
    Older,
}

/// One step of the staircase: inclusive upper age bound and its styling.
struct Step {
    max_age: f64,
    hue: u16,
    glow: Glow,
    bucket: AgeBucket,
}

const fn step(max_age: f64, hue: u16, blur: u8, alpha: f32, bucket: AgeBucket) -> Step {
    Step {
        max_age,
        hue,
        glow: Glow { blur, alpha },
        bucket,
    }
}

const STAIRCASE: [Step; 7] = [
    step(2.0, 140, 12, 0.9, AgeBucket::UpTo2s),
    step(5.0, 105, 10, 0.8, AgeBucket::UpTo5s),
    step(10.0, 80, 8, 0.7, AgeBucket::UpTo10s),
    step(20.0, 60, 6, 0.6, AgeBucket::UpTo20s),
    step(40.0, 40, 4, 0.45, AgeBucket::UpTo40s),
    step(60.0, 25, 3, 0.35, AgeBucket::UpTo60s),
    step(90.0, 12, 2, 0.25, AgeBucket::UpTo90s),
];

/// Hue of anything older than the last breakpoint.
const OLDEST_HUE: u16 = 0;

fn find_step(age_secs: f64) -> Option<&'static Step> {
    // NaN compares false against every bound and falls through to "older".
    STAIRCASE.iter().find(|s| age_secs <= s.max_age)
}

/// Hue (0-140) for an age in seconds.
pub fn hue_for_age(age_secs: f64) -> u16 {
    find_step(age_secs).map_or(OLDEST_HUE, |s| s.hue)
}

/// Glow for an age in seconds. Older than 90 s glows not at all.
pub fn glow_for_age(age_secs: f64) -> Glow {
    find_step(age_secs).map_or(Glow::NONE, |s| s.glow)
}

/// Bucket for an age in seconds.
pub fn bucket_for_age(age_secs: f64) -> AgeBucket {
    find_step(age_secs).map_or(AgeBucket::Older, |s| s.bucket)
}

/// Age to use when a timestamp may be missing.
pub fn age_or_unknown(age_secs: Option<f64>) -> f64 {
    age_secs.unwrap_or(crate::util::constants::UNKNOWN_AGE_SECS)
}
