use thiserror::Error;

/// Construction-time validation failures. A menu is never built partially.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("menu must contain at least one item")]
    NoItems,
    #[error("invalid item type at index {index}: expected a label or a record, found {found}")]
    InvalidItemType { index: usize, found: String },
    #[error("invalid item name at index {index}: record has no label")]
    InvalidItemName { index: usize },
    #[error("invalid width at index {index}: {width} is not a positive angle")]
    InvalidWidth { index: usize, width: f64 },
    #[error("width too large at index {index}: {width} must be less than 2*PI")]
    WidthTooLarge { index: usize, width: f64 },
    #[error("layout over-constrained: explicit widths claim {claimed} of 2*PI radians")]
    LayoutOverConstrained { claimed: f64 },
    #[error("layout incomplete: explicit widths cover only {claimed} of 2*PI radians")]
    LayoutIncomplete { claimed: f64 },
}
