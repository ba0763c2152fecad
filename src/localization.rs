use serde_json::Value;

/// A nested message table, e.g. `{"roll": {"MESSAGE": "roll %{DICE}"}}`.
///
/// Lookups never fail hard: a missing key is logged and reported as absent.
#[derive(Debug, Clone, Default)]
pub struct Localization {
    messages: Value,
}

impl Localization {
    pub fn new(messages: Value) -> Self {
        Self { messages }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Looks up a dot-separated key such as `"roll.MESSAGE"`.
    pub fn localize(&self, key: &str) -> Option<String> {
        let found = key
            .split('.')
            .try_fold(&self.messages, |node, part| node.get(part))
            .and_then(|node| match node {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        if found.is_none() {
            log::warn!("No key for localization: {}", key);
        }
        found
    }
}
