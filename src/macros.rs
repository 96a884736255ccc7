/// Builds a [`Schema`](crate::Schema) for a struct whose fields map one-to-one onto the
/// line.
///
/// Each `field: Kind` pair binds the struct field of that name to a wire field of type
/// [`FieldType::Kind`](crate::FieldType). The struct must implement `Default` and
/// [`Record`](crate::Record); each bound field must convert into a
/// [`FieldValue`](crate::FieldValue) and back. Numeric fields that can be absent on the
/// wire should be `Option`s.
///
/// The macro expands to the [`SchemaBuilder::build`](crate::SchemaBuilder::build) call, so
/// it evaluates to a `Result`.
///
/// ```rust
/// use bsv_codec::{bsv_schema, Record};
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Trade {
///     version: String,
///     symbol: String,
///     size: Option<i64>,
///     tags: Vec<String>,
/// }
///
/// impl Record for Trade {
///     fn version(&self) -> &str {
///         &self.version
///     }
///     fn set_version(&mut self, version: &str) {
///         self.version = version.to_string();
///     }
/// }
///
/// let schema = bsv_schema!(Trade, "05", '2', 't', {
///     symbol: String,
///     size: Long,
///     tags: List,
/// })
/// .unwrap();
/// assert_eq!(schema.full_version(), "05.2.t");
/// assert_eq!(schema.fields().len(), 3);
/// ```
#[macro_export]
macro_rules! bsv_schema {
    (
        $record:ty, $major:expr, $minor:expr, $variant:expr,
        { $($field:ident : $kind:ident),+ $(,)? }
    ) => {
        $crate::Schema::<$record>::builder(
            $major,
            $minor,
            $variant,
            <$record as ::std::default::Default>::default,
        )
            $(
                .field(
                    stringify!($field),
                    $crate::FieldType::$kind,
                    |record: &$record| $crate::FieldValue::from(record.$field.clone()),
                    |record: &mut $record, value: $crate::FieldValue| {
                        record.$field = ::std::convert::TryFrom::try_from(value)?;
                        ::std::result::Result::Ok(())
                    },
                )
            )+
            .build()
    };
}
