use crate::*;

/// Static declaration for a concrete table type.
///
/// Implementors name their table and list its columns as constants;
/// [`Schema::descriptor`] turns that into a validated [`Descriptor`], so a
/// type with an empty name or no columns fails at construction, not on
/// first use.
///
/// ```
/// use sqlforge::*;
///
/// struct Prices;
/// impl Schema for Prices {
///     fn name() -> &'static str {
///         "prices"
///     }
///     fn columns() -> &'static [(&'static str, &'static str)] {
///         &[("ticker", "TEXT"), ("day", "TEXT"), ("close", "REAL")]
///     }
///     fn primary() -> &'static [&'static str] {
///         &["ticker", "day"]
///     }
/// }
///
/// assert_eq!(Prices::descriptor().unwrap().primary().unwrap().len(), 2);
/// ```
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `(column, sql_type)` pairs in declared order.
    fn columns() -> &'static [(&'static str, &'static str)];
    /// Returns primary-key columns in declared order; empty for none.
    fn primary() -> &'static [&'static str] {
        &[]
    }
    /// Builds and validates the descriptor.
    fn descriptor() -> Result<Descriptor> {
        Descriptor::new(
            Self::name(),
            Self::columns().iter().copied(),
            Self::primary().iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Events;
    impl Schema for Events {
        fn name() -> &'static str {
            "events"
        }
        fn columns() -> &'static [(&'static str, &'static str)] {
            &[("kind", "TEXT"), ("at", "TEXT")]
        }
    }

    struct Undeclared;
    impl Schema for Undeclared {
        fn name() -> &'static str {
            "undeclared"
        }
        fn columns() -> &'static [(&'static str, &'static str)] {
            &[]
        }
    }

    #[test]
    fn defaults_to_no_key() {
        let d = Events::descriptor().unwrap();
        assert_eq!(d.name(), "events");
        assert_eq!(d.primary(), None);
    }

    #[test]
    fn empty_columns_fail_construction() {
        assert!(matches!(Undeclared::descriptor(), Err(Error::Config(_))));
    }
}
