//! Name-fragment lookup over reference records.

use crate::EtfRecord;

/// Returns the first record whose name contains `fragment`.
///
/// Matching is a case-sensitive substring test with no normalization.
/// Records with a blank name never match, and an empty fragment matches
/// nothing. When several records match, collection order decides.
pub fn find_record<'a>(records: &'a [EtfRecord], fragment: &str) -> Option<&'a EtfRecord> {
    if fragment.is_empty() {
        return None;
    }

    records
        .iter()
        .filter(|record| !record.name.trim().is_empty())
        .find(|record| record.name.contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EtfCode;

    fn record(name: &str, code: &str) -> EtfRecord {
        EtfRecord::new(name, EtfCode::parse(code).expect("valid code"))
    }

    #[test]
    fn returns_first_match_in_collection_order() {
        let records = vec![record("Alpha ETF", "000001"), record("Alpha ETF Plus", "000002")];

        let found = find_record(&records, "Alpha").expect("should match");
        assert_eq!(found.name, "Alpha ETF");
    }

    #[test]
    fn match_is_case_sensitive() {
        let records = vec![record("KODEX 200", "069500")];

        assert!(find_record(&records, "kodex").is_none());
        assert!(find_record(&records, "KODEX").is_some());
    }

    #[test]
    fn blank_names_are_skipped() {
        let records = vec![record("  ", "000001"), record("TIGER 200", "102110")];

        let found = find_record(&records, " ").expect("should match the named record");
        assert_eq!(found.code.as_str(), "102110");
    }

    #[test]
    fn empty_fragment_matches_nothing() {
        let records = vec![record("KODEX 200", "069500")];
        assert!(find_record(&records, "").is_none());
    }
}
