use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

pub fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Truncates `label` to `max_chars`, marking the cut with an ellipsis.
pub fn short_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let mut short = label
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    short.push('…');
    short
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use fuzzy_matcher::skim::SkimMatcherV2;

    use super::{fuzzy_match_score, short_label};

    #[test]
    fn fuzzy_matching_ignores_case() {
        let matcher = SkimMatcherV2::default();
        assert!(fuzzy_match_score(&matcher, "FlyingDream", "fly").is_some());
        assert!(fuzzy_match_score(&matcher, "Ocean", "xyz").is_none());
    }

    #[test]
    fn short_labels_keep_their_length_budget() {
        assert_eq!(short_label("Alice", 10), "Alice");
        assert_eq!(short_label("Extraordinary", 6), "Extra…");
        assert_eq!(short_label("Ünïcödé names", 4).chars().count(), 4);
    }
}
