use quick_xml::escape::{escape, partial_escape};
use sha2::{Digest, Sha256};

/// Stable cache key of an original fragment text
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Collapse whitespace runs into single spaces and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape text so it can be embedded as markup content.
///
/// Only `&`, `<` and `>` are escaped; quotes are left as they are.
pub fn escape_xml(text: &str) -> String {
    partial_escape(text).into_owned()
}

/// Escape a value for use inside a double or single quoted attribute
pub fn escape_attribute(value: &str) -> String {
    escape(value).into_owned()
}

/// Format duration in seconds to a human-readable string
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / (24 * 60 * 60);
    let hours = (seconds % (24 * 60 * 60)) / (60 * 60);
    let minutes = (seconds % (60 * 60)) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint("Alice"), fingerprint("Alice"));
        assert_ne!(fingerprint("Alice"), fingerprint("alice"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Hello \n\t world  "), "Hello world");
        assert_eq!(normalize_whitespace("\n \t"), "");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_xml("\"quoted\" 'text'"), "\"quoted\" 'text'");
        assert_eq!(escape_xml("already &amp; escaped"), "already &amp;amp; escaped");
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute("#666666"), "#666666");
        assert_eq!(
            escape_attribute("red\" onclick='x' <b>&"),
            "red&quot; onclick=&apos;x&apos; &lt;b&gt;&amp;"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(65), "1m 5s");
        assert_eq!(format_duration(3661), "1h 1m");
        assert_eq!(format_duration(90000), "1d 1h");
    }
}
