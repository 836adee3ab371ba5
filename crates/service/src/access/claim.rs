use std::fmt;

/// Opaque username a request is made on behalf of. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessClaim(String);

impl AccessClaim {
    /// `None` for blank input; surrounding whitespace is dropped.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn username(&self) -> &str { &self.0 }
}

impl fmt::Display for AccessClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_no_claim() {
        assert!(AccessClaim::new("").is_none());
        assert!(AccessClaim::new("   ").is_none());
        assert_eq!(AccessClaim::new(" alice ").unwrap().username(), "alice");
    }
}
