//! Token accounting shared by every executor of one crew run

use crew_llm::TokenUsage;
use std::sync::{Mutex, PoisonError};

/// Accumulates token usage across agents and delegated work
#[derive(Debug, Default)]
pub struct UsageMeter {
    total: Mutex<TokenUsage>,
}

impl UsageMeter {
    /// Add the usage of one completion
    pub fn record(&self, usage: TokenUsage) {
        *self.total.lock().unwrap_or_else(PoisonError::into_inner) += usage;
    }

    /// Usage recorded so far
    pub fn total(&self) -> TokenUsage {
        *self.total.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let meter = UsageMeter::default();
        meter.record(TokenUsage {
            input_tokens: 100,
            output_tokens: 20,
        });
        meter.record(TokenUsage {
            input_tokens: 50,
            output_tokens: 5,
        });

        assert_eq!(meter.total().total(), 175);
    }
}
