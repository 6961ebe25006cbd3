use crate::error::{LedgerError, Result};

// ---------------------------------------------------------------------------
// Layout families: one enum variant per statement format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutFamily {
    UberWeeklyV1,
}

impl LayoutFamily {
    pub fn key(&self) -> &'static str {
        match self {
            Self::UberWeeklyV1 => "uber_weekly_v1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UberWeeklyV1 => "Uber weekly payment statement",
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Self::UberWeeklyV1 => 1,
        }
    }

    /// Horizontal band `[min_x, max_x)` holding the transaction amount on the
    /// first line of a block, if the format has one.
    pub fn amount_column(&self) -> Option<(f64, f64)> {
        match self {
            Self::UberWeeklyV1 => Some((420.0, 500.0)),
        }
    }

    pub fn in_amount_column(&self, x: f64) -> bool {
        self.amount_column()
            .is_some_and(|(min_x, max_x)| x >= min_x && x < max_x)
    }
}

const ALL_LAYOUTS: &[LayoutFamily] = &[LayoutFamily::UberWeeklyV1];

pub fn get_by_key(key: &str) -> Option<LayoutFamily> {
    ALL_LAYOUTS.iter().find(|l| l.key() == key).copied()
}

pub fn resolve(key: &str) -> Result<LayoutFamily> {
    get_by_key(key).ok_or_else(|| LedgerError::UnknownLayout(key.to_string()))
}

pub fn all() -> &'static [LayoutFamily] {
    ALL_LAYOUTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_key() {
        assert_eq!(get_by_key("uber_weekly_v1"), Some(LayoutFamily::UberWeeklyV1));
        assert_eq!(get_by_key("lyft_weekly"), None);
    }

    #[test]
    fn test_resolve_unknown_is_error() {
        assert!(matches!(resolve("nope"), Err(LedgerError::UnknownLayout(k)) if k == "nope"));
    }

    #[test]
    fn test_amount_column_bounds() {
        let layout = LayoutFamily::UberWeeklyV1;
        assert!(layout.in_amount_column(420.0));
        assert!(layout.in_amount_column(460.0));
        assert!(!layout.in_amount_column(500.0));
        assert!(!layout.in_amount_column(40.0));
    }
}
