/// Matches a string against names that map to every variant of an enum
///
/// The arms are checked at compile time with `assert_enum_variants!`, so adding a
/// variant without giving it a name is a build error.
///
/// ```rust
/// use ghsearch::exhaustive_match;
///
/// #[derive(Debug, PartialEq)]
/// enum Move { Up, Down }
///
/// fn parse(name: &str) -> Option<Move> {
///     exhaustive_match! {
///         name => Option<Move>;
///         {
///             "up" => Some(Up),
///             "down" => Some(Down),
///         }
///         default _ => None
///     }
/// }
///
/// assert_eq!(parse("up"), Some(Move::Up));
/// assert_eq!(parse("left"), None);
/// ```
#[macro_export]
macro_rules! exhaustive_match {
    (
        $expr:expr => Option<$return_ty:ty>;
        {
            $($pattern:pat => Some($variant:ident $($rest:tt)*)),+ $(,)?
        }
        default $default_pattern:pat => $default:expr
    ) => {{
        use $return_ty::*;
        ::assert_enum_variants::assert_enum_variants!($return_ty, { $($variant),+ });

        match $expr {
            $($pattern => Some($variant $($rest)*),)+
            $default_pattern => $default
        }
    }};
}
