//! Tag builders for location events.
//!
//! This module constructs the raw `[name, value]` tag arrays carried by
//! location records:
//! - `g` tag: geohash of the position
//! - `d` tag: addressable-event identifier (NIP-33)
//! - `expiration` tag: NIP-40 automatic expiration
//! - `p` tag: recipient of an encrypted record
//! - `accuracy` tag: reported accuracy radius in metres

use nostr::PublicKey;

/// Builder for location event tags.
///
/// # Example
///
/// ```
/// use sentinel_core::nostr::TagBuilder;
///
/// assert_eq!(TagBuilder::d_tag("phone"), vec!["d", "phone"]);
/// assert_eq!(TagBuilder::expiration_tag(1_700_003_600), vec!["expiration", "1700003600"]);
/// ```
pub struct TagBuilder;

impl TagBuilder {
    /// Builds the `g` tag for a geohash.
    #[must_use]
    pub fn geohash_tag(geohash: &str) -> Vec<String> {
        vec!["g".to_string(), geohash.to_string()]
    }

    /// Builds the `d` tag for addressable events.
    ///
    /// Publishing a new event with the same kind, author and `d` value
    /// replaces the previous one on relays.
    #[must_use]
    pub fn d_tag(identifier: &str) -> Vec<String> {
        vec!["d".to_string(), identifier.to_string()]
    }

    /// Builds the `expiration` tag from a unix timestamp in seconds.
    #[must_use]
    pub fn expiration_tag(expires_at: u64) -> Vec<String> {
        vec!["expiration".to_string(), expires_at.to_string()]
    }

    /// Builds the `p` tag naming the recipient of an encrypted record.
    #[must_use]
    pub fn p_tag(recipient: &PublicKey) -> Vec<String> {
        vec!["p".to_string(), recipient.to_hex()]
    }

    /// Builds the `accuracy` tag.
    ///
    /// Whole numbers render without a fractional part (`5.0` becomes `"5"`).
    #[must_use]
    pub fn accuracy_tag(accuracy: f64) -> Vec<String> {
        vec!["accuracy".to_string(), accuracy.to_string()]
    }
}

/// Returns the value of the first tag named `name`.
pub(crate) fn find_tag_value<'a>(tags: &'a [Vec<String>], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|t| t.first().is_some_and(|n| n == name))
        .and_then(|t| t.get(1))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::Keys;

    #[test]
    fn geohash_tag_format() {
        let tag = TagBuilder::geohash_tag("ud9wrx0f");
        assert_eq!(tag, vec!["g", "ud9wrx0f"]);
    }

    #[test]
    fn d_tag_format() {
        let tag = TagBuilder::d_tag("phone1");
        assert_eq!(tag.len(), 2);
        assert_eq!(tag[0], "d");
        assert_eq!(tag[1], "phone1");
    }

    #[test]
    fn expiration_tag_is_unix_seconds() {
        let tag = TagBuilder::expiration_tag(1_700_003_600);
        assert_eq!(tag[0], "expiration");
        assert_eq!(tag[1].parse::<u64>().unwrap(), 1_700_003_600);
    }

    #[test]
    fn p_tag_uses_hex() {
        let keys = Keys::generate();
        let tag = TagBuilder::p_tag(&keys.public_key());
        assert_eq!(tag[0], "p");
        assert_eq!(tag[1], keys.public_key().to_hex());
        assert_eq!(tag[1].len(), 64);
    }

    #[test]
    fn accuracy_tag_whole_number() {
        assert_eq!(TagBuilder::accuracy_tag(5.0), vec!["accuracy", "5"]);
    }

    #[test]
    fn accuracy_tag_fraction() {
        assert_eq!(TagBuilder::accuracy_tag(12.5), vec!["accuracy", "12.5"]);
    }

    #[test]
    fn d_tag_empty_identifier() {
        let tag = TagBuilder::d_tag("");
        assert_eq!(tag, vec!["d", ""]);
    }

    #[test]
    fn find_tag_value_returns_first_match() {
        let tags = vec![
            TagBuilder::d_tag("first"),
            TagBuilder::d_tag("second"),
            TagBuilder::geohash_tag("u4pr"),
        ];
        assert_eq!(find_tag_value(&tags, "d"), Some("first"));
        assert_eq!(find_tag_value(&tags, "g"), Some("u4pr"));
        assert_eq!(find_tag_value(&tags, "p"), None);
    }

    #[test]
    fn find_tag_value_ignores_nameless_tags() {
        let tags = vec![vec![], vec!["g".to_string()]];
        assert_eq!(find_tag_value(&tags, "g"), None);
    }
}
