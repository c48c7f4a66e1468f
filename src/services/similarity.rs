use crate::models::CatalogEntry;

/// Proximity center used when the source has no usable duration
pub const DEFAULT_CENTER_MINUTES: f64 = 20.0;
/// Proximity half-width used when the source has no usable duration
pub const DEFAULT_HALF_WIDTH_MINUTES: f64 = 5.0;
/// Weight of duration proximity relative to title similarity
pub const PROXIMITY_BOOST: f64 = 10.0;

/// Duration window a candidate is scored against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub center: f64,
    pub half_width: f64,
}

impl Proximity {
    /// Window around a source duration: a quarter of it on either side
    pub fn around(minutes: Option<f64>) -> Self {
        match minutes {
            Some(m) => Self {
                center: m,
                half_width: m / 4.0,
            },
            None => Self {
                center: DEFAULT_CENTER_MINUTES,
                half_width: DEFAULT_HALF_WIDTH_MINUTES,
            },
        }
    }

    /// Decays from 1.0 at the center to 0.5 at one half-width away
    ///
    /// Candidates without a numeric duration score 0.
    pub fn score(&self, minutes: Option<f64>) -> f64 {
        match minutes {
            Some(m) => self.half_width / (self.half_width + (m - self.center).abs()),
            None => 0.0,
        }
    }
}

/// Normalized whole-title form used for duplicate detection
pub fn work_keyword(work: &str) -> String {
    work.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when two titles name the same work
pub fn same_work(a: &str, b: &str) -> bool {
    work_keyword(a) == work_keyword(b)
}

/// Normalized Levenshtein similarity of two titles, in `0.0..=1.0`
///
/// Titles are compared in their `work_keyword` form, so case and spacing do
/// not count as edits. An empty title is similar to nothing.
pub fn work_similarity(a: &str, b: &str) -> f64 {
    let a = work_keyword(a);
    let b = work_keyword(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a, &b)
}

/// Relevance of `candidate` to a source work under a duration window
pub fn relevance(source_work: &str, window: &Proximity, candidate: &CatalogEntry) -> f64 {
    work_similarity(source_work, &candidate.work)
        + PROXIMITY_BOOST * window.score(candidate.minutes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_without_duration() {
        let window = Proximity::around(None);
        assert_eq!(window.center, 20.0);
        assert_eq!(window.half_width, 5.0);
    }

    #[test]
    fn test_window_is_quarter_of_duration() {
        let window = Proximity::around(Some(40.0));
        assert_eq!(window.center, 40.0);
        assert_eq!(window.half_width, 10.0);
    }

    #[test]
    fn test_proximity_score_decay() {
        let window = Proximity::around(Some(40.0));
        assert_eq!(window.score(Some(40.0)), 1.0);
        assert_eq!(window.score(Some(50.0)), 0.5);
        assert_eq!(window.score(Some(30.0)), 0.5);
        assert!(window.score(Some(80.0)) < window.score(Some(45.0)));
        assert_eq!(window.score(None), 0.0);
    }

    #[test]
    fn test_same_work_ignores_case_and_spacing() {
        assert!(same_work("Symphony No. 4 in E minor", "symphony  no. 4 in E Minor "));
        assert!(!same_work("Symphony No. 4", "Symphony No. 3"));
    }

    #[test]
    fn test_work_similarity_bounds() {
        assert_eq!(work_similarity("Piano Sonata", "piano  sonata"), 1.0);
        assert!(work_similarity("Piano Sonata", "Requiem") < 0.5);
        assert_eq!(work_similarity("", ""), 0.0);
        assert_eq!(work_similarity("Requiem", ""), 0.0);
        let partial = work_similarity("Piano Sonata No. 8", "Piano Sonata No. 14");
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn test_work_similarity_tolerates_spelling_variants() {
        let variant = work_similarity("Goldberg Variations", "Goldberg-Variationen");
        assert!(variant > 0.8, "got {}", variant);
        assert!(variant > work_similarity("Goldberg Variations", "Diabelli Variations"));
    }
}
