/// Builds a [`Row`](crate::Row) from anything implementing `ToString`.
///
/// ```rust
/// use csv_width::row;
///
/// let header = row!["id", "name", "email"];
/// assert_eq!(header.len(), 3);
///
/// let data = row![1, "Alice"];
/// assert_eq!(data, vec!["1".to_string(), "Alice".to_string()]);
///
/// assert!(row![].is_empty());
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };

    ($($field:expr),+ $(,)?) => {{
        let row: $crate::Row = vec![$(::std::string::ToString::to_string(&$field)),+];
        row
    }};
}
