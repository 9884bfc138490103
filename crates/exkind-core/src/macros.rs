//! Construction shorthands

/// Build an exception of `kind` from any mix of arguments
///
/// ```
/// use exkind_core::{define_labeled, exception};
///
/// let errors = define_labeled("db");
/// let conflict = errors.kind("Conflict");
/// let e = exception!(conflict, "row", 42);
/// assert_eq!(e.message(), "[db] Conflict: row 42");
/// ```
#[macro_export]
macro_rules! exception {
    ($kind:expr) => {
        $kind.new_empty()
    };
    ($kind:expr, $($arg:expr),+ $(,)?) => {
        $kind.new_exception([$($crate::Arg::from($arg)),+])
    };
}

/// Return early with an exception of `kind`
///
/// ```
/// use exkind_core::{define, throw, Exception};
///
/// fn check(n: i64) -> Result<i64, Exception> {
///     let errors = define();
///     if n < 0 {
///         throw!(errors.kind("Negative"), "got", n);
///     }
///     Ok(n)
/// }
///
/// assert_eq!(check(-1).unwrap_err().message(), "Negative: got -1");
/// ```
#[macro_export]
macro_rules! throw {
    ($($tt:tt)+) => {
        return Err($crate::exception!($($tt)+).into())
    };
}
