//! SPF and DMARC record extraction
//!
//! Picks the authentication record out of a domain's raw TXT answers. The
//! first answer carrying the version tag wins; later duplicates are ignored.

/// Version tag opening an SPF record
pub const SPF_VERSION_TAG: &str = "v=spf1";

/// Version tag opening a DMARC record
pub const DMARC_VERSION_TAG: &str = "v=DMARC1";

/// Return the first SPF record among `records`.
///
/// Matching is a case-sensitive prefix test on `v=spf1`, optionally preceded
/// by the double quote resolvers use to wrap TXT data. The record is returned
/// exactly as received, quote included.
pub fn extract_spf(records: &[String]) -> Option<&str> {
    first_tagged(records, SPF_VERSION_TAG)
}

/// Return the first DMARC record among `records`, matched like [`extract_spf`]
/// on `v=DMARC1`.
pub fn extract_dmarc(records: &[String]) -> Option<&str> {
    first_tagged(records, DMARC_VERSION_TAG)
}

fn first_tagged<'a>(records: &'a [String], tag: &str) -> Option<&'a str> {
    records.iter().map(String::as_str).find(|record| {
        let unquoted = record.strip_prefix('"').unwrap_or(record);
        unquoted.starts_with(tag)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_spf(&[]), None);
        assert_eq!(extract_dmarc(&[]), None);
    }

    #[test]
    fn test_no_matching_record() {
        let txt = records(&[
            "google-site-verification=abc",
            "\"MS=ms12345\"",
            "spf1 -all",
        ]);
        assert_eq!(extract_spf(&txt), None);
        assert_eq!(extract_dmarc(&txt), None);
    }

    #[test]
    fn test_quoted_spf_record_is_kept_verbatim() {
        let txt = records(&["foo", "\"v=spf1 include:_spf.google.com ~all\""]);
        assert_eq!(
            extract_spf(&txt),
            Some("\"v=spf1 include:_spf.google.com ~all\"")
        );
    }

    #[test]
    fn test_first_match_wins() {
        let txt = records(&["v=spf1 -all", "v=spf1 include:other.example ~all"]);
        assert_eq!(extract_spf(&txt), Some("v=spf1 -all"));

        let dmarc = records(&["\"v=DMARC1; p=reject\"", "v=DMARC1; p=none"]);
        assert_eq!(extract_dmarc(&dmarc), Some("\"v=DMARC1; p=reject\""));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        assert_eq!(extract_spf(&records(&["V=SPF1 -all"])), None);
        assert_eq!(extract_dmarc(&records(&["v=dmarc1; p=none"])), None);
        assert_eq!(
            extract_dmarc(&records(&["v=DMARC1; p=quarantine"])),
            Some("v=DMARC1; p=quarantine")
        );
    }

    #[test]
    fn test_tag_must_open_the_record() {
        assert_eq!(extract_spf(&records(&[" v=spf1 -all"])), None);
        assert_eq!(extract_spf(&records(&["\"\"v=spf1 -all"])), None);
    }
}
