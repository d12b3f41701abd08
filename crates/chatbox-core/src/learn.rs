/// A fact the user wants the backend to remember, entered as `key: value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnFact {
    pub key: String,
    pub value: String,
}

impl LearnFact {
    /// Split on the first `:` and trim both halves.
    ///
    /// Returns `None` when the input has no separator. Either half may still
    /// be empty; see [`LearnFact::is_complete`].
    pub fn parse(input: &str) -> Option<Self> {
        let (key, value) = input.split_once(':')?;
        Some(Self {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        })
    }

    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }

    /// Wire form sent to `/learn`
    pub fn to_input(&self) -> String {
        format!("{}: {}", self.key, self.value)
    }
}
