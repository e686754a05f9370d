//! Outcome model: the (value, error) pair returned by every guarded call.
//!
//! Unlike `Result`, both halves may be present at once: a finalizer can
//! substitute a value while an earlier failure is still reported.

use super::errors::Error;

/// Result of a guarded invocation.
///
/// - `value` is `None` when the call failed and nothing supplied a substitute,
///   or when a handler/finalizer deliberately returned nothing.
/// - `error` is `None` when the call succeeded or a handler absorbed the panic.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: Option<T>,
    pub error: Option<Error>,
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// Neither a value nor an error.
    pub fn empty() -> Self {
        Self {
            value: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<Error>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (Option<T>, Option<Error>) {
        (self.value, self.error)
    }

    /// Collapse into a `Result`; an error wins over any substituted value.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: self.value.map(f),
            error: self.error,
        }
    }

    /// Fold a finalizer's outcome into this one.
    ///
    /// A finalizer value replaces ours; a finalizer error is only adopted when
    /// we have none.
    pub(crate) fn merge_finally(self, finalizer: Outcome<T>) -> Outcome<T> {
        Outcome {
            value: finalizer.value.or(self.value),
            error: self.error.or(finalizer.error),
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A handler that returns nothing absorbs the panic without a value.
impl<T> From<()> for Outcome<T> {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        Self { value, error: None }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T>
where
    E: Into<Error>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn prior(value: Option<&str>, error: Option<&str>) -> Outcome<String> {
        Outcome {
            value: value.map(str::to_string),
            error: error.map(Error::panic),
        }
    }

    #[rstest]
    #[case::finalizer_value_replaces(Some("a"), None, Some("f"), None, Some("f"), None)]
    #[case::finalizer_empty_keeps_value(Some("a"), None, None, None, Some("a"), None)]
    #[case::finalizer_error_adopted(Some("a"), None, None, Some("fe"), Some("a"), Some("fe"))]
    #[case::prior_error_kept(None, Some("e"), None, Some("fe"), None, Some("e"))]
    #[case::value_substituted_error_kept(None, Some("e"), Some("f"), None, Some("f"), Some("e"))]
    fn merge_finally_precedence(
        #[case] value: Option<&str>,
        #[case] error: Option<&str>,
        #[case] fin_value: Option<&str>,
        #[case] fin_error: Option<&str>,
        #[case] want_value: Option<&str>,
        #[case] want_error: Option<&str>,
    ) {
        let merged = prior(value, error).merge_finally(prior(fin_value, fin_error));
        assert_eq!(merged.value.as_deref(), want_value);
        assert_eq!(merged.error.map(|e| e.to_string()).as_deref(), want_error);
    }

    #[test]
    fn conversions_from_handler_returns() {
        let unit: Outcome<i32> = ().into();
        assert!(unit.value.is_none() && unit.error.is_none());

        let some: Outcome<i32> = Some(3).into();
        assert_eq!(some.value, Some(3));

        let err: Outcome<i32> = Err::<i32, _>("nope").into();
        assert_eq!(err.error.unwrap().to_string(), "nope");
    }

    #[test]
    fn into_result_prefers_error() {
        let outcome = Outcome::failure("bad").with_value(1);
        assert_eq!(outcome.value(), Some(&1));
        assert!(outcome.into_result().is_err());
        assert_eq!(Outcome::success(2).into_result().unwrap(), Some(2));
    }

    #[test]
    fn map_keeps_error() {
        let mapped = Outcome::failure("bad").with_value(2).map(|v| v * 10);
        assert_eq!(mapped.value, Some(20));
        assert!(!mapped.is_success());
    }
}
