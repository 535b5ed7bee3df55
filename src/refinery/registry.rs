// * Field Extraction Registry
// * Each field owns a static, ordered chain of named strategies. The resolver walks the
// * chain until one yields a value; an exhausted chain degrades to "unknown".

use tracing::debug;

use crate::ops::telemetry;
use crate::refinery::page::PageView;

/// What a single strategy made of the page
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Found(T),
    /// The layout this strategy targets is not on the page
    NotApplicable,
    /// A node matched but its content failed a plausibility check
    Rejected(&'static str),
}

impl<T> From<Option<T>> for Probe<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Probe::NotApplicable, Probe::Found)
    }
}

/// A named, pure extraction step
pub struct Strategy<T: 'static> {
    pub name: &'static str,
    pub run: fn(&PageView<'_>) -> Probe<T>,
}

pub struct FieldChain<T: 'static> {
    pub field: &'static str,
    pub strategies: &'static [Strategy<T>],
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Found { value: T, strategy: &'static str },
    Unknown,
}

impl<T> Resolved<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Resolved::Found { value, .. } => Some(value),
            Resolved::Unknown => None,
        }
    }

    pub fn strategy(&self) -> Option<&'static str> {
        match self {
            Resolved::Found { strategy, .. } => Some(strategy),
            Resolved::Unknown => None,
        }
    }
}

impl Resolved<String> {
    pub fn or_unknown(self) -> String {
        self.into_option()
            .unwrap_or_else(|| crate::config::constants::UNKNOWN.to_string())
    }
}

impl<T> FieldChain<T> {
    pub fn resolve(&self, page: &PageView<'_>) -> Resolved<T> {
        for strategy in self.strategies {
            match (strategy.run)(page) {
                Probe::Found(value) => {
                    debug!(field = self.field, strategy = strategy.name, "Field resolved");
                    return Resolved::Found {
                        value,
                        strategy: strategy.name,
                    };
                }
                Probe::Rejected(reason) => {
                    debug!(
                        field = self.field,
                        strategy = strategy.name,
                        reason,
                        "Strategy match rejected"
                    );
                }
                Probe::NotApplicable => {}
            }
        }

        debug!(field = self.field, "No strategy matched, field degraded");
        telemetry::record_field_degraded(self.field);
        Resolved::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinery::structured_data::StructuredData;

    fn never(_: &PageView<'_>) -> Probe<String> {
        Probe::NotApplicable
    }

    fn implausible(_: &PageView<'_>) -> Probe<String> {
        Probe::Rejected("currency symbol")
    }

    fn constant(_: &PageView<'_>) -> Probe<String> {
        Probe::Found("value".to_string())
    }

    static CHAIN: FieldChain<String> = FieldChain {
        field: "test",
        strategies: &[
            Strategy { name: "never", run: never },
            Strategy { name: "implausible", run: implausible },
            Strategy { name: "constant", run: constant },
        ],
    };

    static EMPTY_CHAIN: FieldChain<String> = FieldChain {
        field: "test_empty",
        strategies: &[
            Strategy { name: "never", run: never },
            Strategy { name: "implausible", run: implausible },
        ],
    };

    #[test]
    fn test_resolver_skips_rejected_matches() {
        let data = StructuredData::empty();
        let view = PageView::from_parts("<html></html>", &data);

        let resolved = CHAIN.resolve(&view);
        assert_eq!(resolved.strategy(), Some("constant"));
        assert_eq!(resolved.or_unknown(), "value");
    }

    #[test]
    fn test_exhausted_chain_is_sentinel() {
        let data = StructuredData::empty();
        let view = PageView::from_parts("<html></html>", &data);

        assert_eq!(EMPTY_CHAIN.resolve(&view), Resolved::Unknown);
        assert_eq!(EMPTY_CHAIN.resolve(&view).or_unknown(), "NA");
    }
}
