//! Round-robin endpoint rotation.

/// Ordered probe endpoints plus the index of the one currently in use.
///
/// The index only moves on failure, so a reachable endpoint keeps being
/// probed until it stops answering.
#[derive(Debug, Clone)]
pub struct EndpointRotator {
    endpoints: Vec<String>,
    index: usize,
}

impl EndpointRotator {
    /// Returns `None` for an empty endpoint list.
    pub fn new(endpoints: Vec<String>) -> Option<Self> {
        if endpoints.is_empty() {
            return None;
        }
        Some(Self { endpoints, index: 0 })
    }

    pub fn current(&self) -> &str {
        &self.endpoints[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Move to the next endpoint, wrapping at the end of the list.
    pub fn advance(&mut self) -> &str {
        self.index = (self.index + 1) % self.endpoints.len();
        self.current()
    }
}
