//! REST endpoint URLs

/// Builds endpoint URLs under an API base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// `base` must end with a slash
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn channel(&self, channel_id: &str) -> String {
        format!("{}channels/{channel_id}", self.base)
    }

    #[must_use]
    pub fn channel_messages(&self, channel_id: &str) -> String {
        format!("{}/messages", self.channel(channel_id))
    }

    #[must_use]
    pub fn channel_message(&self, channel_id: &str, message_id: &str) -> String {
        format!("{}/{message_id}", self.channel_messages(channel_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let endpoints = Endpoints::new("https://www.guilded.gg/api/v1/");
        assert_eq!(endpoints.channel("c1"), "https://www.guilded.gg/api/v1/channels/c1");
        assert_eq!(
            endpoints.channel_messages("c1"),
            "https://www.guilded.gg/api/v1/channels/c1/messages"
        );
        assert_eq!(
            endpoints.channel_message("c1", "m1"),
            "https://www.guilded.gg/api/v1/channels/c1/messages/m1"
        );
    }
}
