use crate::engine::error::ParseError;

/// The rest of the first line that starts with `marker`, trimmed.
///
/// Leading whitespace on the line is ignored.
pub(crate) fn after_prefix<'a>(raw: &'a str, marker: &'static str) -> Result<&'a str, ParseError> {
    raw.lines()
        .find_map(|line| line.trim_start().strip_prefix(marker))
        .map(str::trim)
        .ok_or(ParseError::MissingMarker(marker))
}

/// The text following `marker` on the first line that contains it, trimmed.
pub(crate) fn after_marker<'a>(raw: &'a str, marker: &'static str) -> Result<&'a str, ParseError> {
    raw.lines()
        .find_map(|line| line.split_once(marker).map(|(_, rest)| rest))
        .map(str::trim)
        .ok_or(ParseError::MissingMarker(marker))
}

/// Everything before the first `terminator`, or the whole text when it is absent.
pub(crate) fn before<'a>(text: &'a str, terminator: &str) -> &'a str {
    text.split_once(terminator)
        .map_or(text, |(head, _)| head)
        .trim()
}

pub(crate) fn number(marker: &'static str, text: &str) -> Result<f64, ParseError> {
    let text = text.trim();
    text.parse().map_err(|_| ParseError::InvalidNumber {
        marker,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "header\n  Minimum Free Energy: -3.20\nMFE: -1.5 kcal/mol\n";

    #[test]
    fn after_prefix_tolerates_indentation() {
        assert_eq!(after_prefix(OUTPUT, "Minimum Free Energy:").unwrap(), "-3.20");
    }

    #[test]
    fn after_prefix_reports_missing_marker() {
        assert!(matches!(
            after_prefix(OUTPUT, "Codon Adaptation Index:"),
            Err(ParseError::MissingMarker("Codon Adaptation Index:"))
        ));
    }

    #[test]
    fn after_marker_matches_anywhere_on_the_line() {
        assert_eq!(after_marker(OUTPUT, "MFE:").unwrap(), "-1.5 kcal/mol");
    }

    #[test]
    fn before_strips_units_and_trailers() {
        assert_eq!(before("-1.5 kcal/mol", " kcal/mol"), "-1.5");
        assert_eq!(before("AUGC.size=4", ".size"), "AUGC");
        assert_eq!(before(" -2.0 ", " kcal/mol"), "-2.0");
    }

    #[test]
    fn number_reports_offending_text() {
        assert_eq!(number("MFE:", " -7.25 ").unwrap(), -7.25);
        match number("MFE:", "n/a") {
            Err(ParseError::InvalidNumber { marker, value }) => {
                assert_eq!(marker, "MFE:");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }
}
