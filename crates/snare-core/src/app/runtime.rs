//! Evaluator - guarded invocation and finalizer composition.
//!
//! A run goes through three steps:
//! 1. the target runs under `catch_unwind`;
//! 2. a panic is classified and dispatched to the handler for its exact type,
//!    and the handler itself runs under the same guard and registry;
//! 3. the finalizer, if any, runs under the guard and its outcome is merged.

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{debug, trace};

use super::builder::{Action, EvaluatorBuilder};
use crate::domain::{Captured, Outcome, TypeKey};
use crate::typed::Registry;

/// A configured try/catch/finally context.
///
/// The configuration is fixed at construction; every [`run`](Self::run) gets
/// its own interception. There is no state shared between runs.
pub struct Evaluator<T> {
    registry: Registry<T>,
}

impl<T> Evaluator<T> {
    /// Apply `actions` in order to a fresh registry.
    pub fn new(actions: impl IntoIterator<Item = Action<T>>) -> Self {
        let mut registry = Registry::new();
        for action in actions {
            action.apply(&mut registry);
        }
        Self { registry }
    }

    pub fn builder() -> EvaluatorBuilder<T> {
        EvaluatorBuilder::new()
    }

    pub(crate) fn from_registry(registry: Registry<T>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry<T> {
        &self.registry
    }

    /// Run `target` with this configuration.
    pub fn run<F>(&self, target: F) -> Outcome<T>
    where
        F: FnOnce() -> T,
    {
        let mut active = Vec::new();
        let outcome = self.guard(|| Outcome::success(target()), &mut active);
        self.finish(outcome, &mut active)
    }

    /// Run `f`, turning a panic into a dispatched or converted outcome.
    ///
    /// `active` holds the handlers currently running in this dispatch chain;
    /// a panic routed to one of them is reported instead of re-entering it.
    fn guard<F>(&self, f: F, active: &mut Vec<TypeKey>) -> Outcome<T>
    where
        F: FnOnce() -> Outcome<T>,
    {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(outcome) => {
                trace!("guarded call returned normally");
                outcome
            }
            Err(payload) => self.intercept(Captured::from_panic(payload), active),
        }
    }

    /// Dispatch `captured` to the handler for its exact type.
    ///
    /// A `&'static str` message with no `&'static str` handler goes to the
    /// `String` handler instead. A handler that is already in `active` is not
    /// entered again: a panic of its own type raised from inside it is
    /// reported as an error, even if a second call would have returned.
    fn intercept(&self, captured: Captured, active: &mut Vec<TypeKey>) -> Outcome<T> {
        let captured = if self.registry.handles(&captured.key()) {
            captured
        } else {
            captured.into_owned_message()
        };
        let key = captured.key();
        let handler = match self.registry.get(&key) {
            Some(handler) if !active.contains(&key) => handler,
            Some(_) => {
                debug!("handler for {key:?} is already running; reporting {captured:?}");
                return Outcome::failure(captured.into_error());
            }
            None => {
                debug!("no handler for {key:?}; reporting {captured:?}");
                return Outcome::failure(captured.into_error());
            }
        };

        debug!("dispatching {key:?} to catch handler");
        active.push(key);
        let outcome = self.guard(|| handler.handle_dyn(captured), active);
        active.pop();
        outcome
    }

    fn finish(&self, outcome: Outcome<T>, active: &mut Vec<TypeKey>) -> Outcome<T> {
        let Some(finalizer) = self.registry.finalizer() else {
            return outcome;
        };
        debug!("running finalizer");
        let current = outcome.value.as_ref();
        let finished = self.guard(|| finalizer.finish(current), active);
        outcome.merge_finally(finished)
    }
}

impl<T> Default for Evaluator<T> {
    fn default() -> Self {
        Self::from_registry(Registry::new())
    }
}

impl<T> std::fmt::Debug for Evaluator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, ErrorKind, OPAQUE_PAYLOAD, raise};
    use crate::{catch, finally};
    use rstest::rstest;
    use std::cell::{Cell, RefCell};
    use std::panic::panic_any;
    use std::rc::Rc;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("quota exceeded for {0}")]
    struct QuotaExceeded(String);

    #[derive(Debug)]
    struct Retry(u32);

    #[test]
    fn success_passes_through() {
        let evaluator = Evaluator::<i32>::new([]);
        let outcome = evaluator.run(|| 10);
        assert_eq!(outcome.value, Some(10));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn unmatched_panic_becomes_error_with_message() {
        let outcome = Evaluator::<i32>::default().run(|| panic!("help!"));
        assert!(outcome.value.is_none());
        let err = outcome.error.unwrap();
        assert_eq!(err.kind(), ErrorKind::Panic);
        assert_eq!(err.to_string(), "help!");
    }

    #[test]
    fn unmatched_raised_error_is_passed_through() {
        let outcome = Evaluator::<i32>::default().run(|| raise(QuotaExceeded("alice".into())));
        let err = outcome.error.unwrap();
        assert_eq!(
            err.downcast_ref::<QuotaExceeded>(),
            Some(&QuotaExceeded("alice".into()))
        );
    }

    #[test]
    fn handler_receives_captured_value_unchanged() {
        let seen = Rc::new(Cell::new(0));
        let sink = seen.clone();
        let evaluator = Evaluator::<String>::new([catch(move |r: Retry| {
            sink.set(r.0);
            Some(format!("retry in {}", r.0))
        })]);

        let outcome = evaluator.run(|| panic_any(Retry(3)));
        assert_eq!(seen.get(), 3);
        assert_eq!(outcome.value.as_deref(), Some("retry in 3"));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn dispatch_is_by_exact_type() {
        let evaluator = Evaluator::<&'static str>::new([
            catch(|_: i32| Some("i32")),
            catch(|_: i64| Some("i64")),
        ]);
        assert_eq!(evaluator.run(|| panic_any(1_i64)).value, Some("i64"));
        assert_eq!(evaluator.run(|| panic_any(1_i32)).value, Some("i32"));

        let unmatched = evaluator.run(|| panic_any(1_u32));
        assert_eq!(unmatched.error.unwrap().to_string(), "1");
    }

    #[test]
    fn raised_error_dispatches_to_its_handler() {
        let evaluator = Evaluator::<String>::new([catch(|e: QuotaExceeded| Some(e.0))]);
        let outcome = evaluator.run(|| raise(QuotaExceeded("bob".into())));
        assert_eq!(outcome.value.as_deref(), Some("bob"));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn last_registration_wins() {
        let evaluator = Evaluator::<i32>::new([
            catch(|_: String| Some(1)),
            catch(|_: String| Some(2)),
        ]);
        assert_eq!(evaluator.run(|| panic!("x")).value, Some(2));
    }

    #[rstest]
    #[case::no_params(catch(|| Some(1)))]
    #[case::two_params(catch(|_: String, _: String| Some(1)))]
    #[case::three_params(catch(|_: String, _: u8, _: u8| Some(1)))]
    fn invalid_catch_is_ignored(#[case] invalid: Action<i32>) {
        let evaluator = Evaluator::<i32>::new([catch(|_: String| Some(7)), invalid]);
        assert_eq!(evaluator.registry().len(), 1);
        assert_eq!(evaluator.run(|| panic!("x")).value, Some(7));
        assert_eq!(evaluator.run(|| 3).value, Some(3));
    }

    #[test]
    fn handler_error_takes_precedence() {
        let evaluator = Evaluator::<i32>::new([catch(|s: String| {
            Err::<i32, Error>(Error::panic(format!("handled: {s}")))
        })]);
        let outcome = evaluator.run(|| panic!("boom"));
        assert!(outcome.value.is_none());
        assert_eq!(outcome.error.unwrap().to_string(), "handled: boom");
    }

    #[test]
    fn handler_panic_is_dispatched_to_another_handler() {
        let evaluator = Evaluator::<String>::new([
            catch(|n: i32| -> Option<String> { panic!("code {n}") }),
            catch(|s: String| Some(format!("recovered: {s}"))),
        ]);
        let outcome = evaluator.run(|| panic_any(42_i32));
        assert_eq!(outcome.value.as_deref(), Some("recovered: code 42"));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn handler_panic_without_handler_becomes_error() {
        let evaluator =
            Evaluator::<String>::new([catch(|n: i32| -> Option<String> { panic_any(vec![n]) })]);
        let outcome = evaluator.run(|| panic_any(1_i32));
        assert!(outcome.value.is_none());
        assert_eq!(outcome.error.unwrap().to_string(), OPAQUE_PAYLOAD);
    }

    #[test]
    fn handler_re_raising_its_own_type_does_not_recurse() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let evaluator = Evaluator::<i32>::new([catch(move |s: String| -> Option<i32> {
            counter.set(counter.get() + 1);
            panic!("again: {s}")
        })]);
        let outcome = evaluator.run(|| panic!("first"));
        assert_eq!(calls.get(), 1);
        assert_eq!(outcome.error.unwrap().to_string(), "again: first");
    }

    #[test]
    fn handler_is_not_re_entered_even_if_it_would_recover() {
        let evaluator = Evaluator::<String>::new([catch(|s: String| -> Option<String> {
            if s == "first" {
                panic!("{}", String::from("second"))
            }
            Some(s)
        })]);
        let outcome = evaluator.run(|| panic!("first"));
        assert!(outcome.value.is_none());
        assert_eq!(outcome.error.unwrap().to_string(), "second");
    }

    #[test]
    fn literal_message_reaches_str_handler() {
        let evaluator = Evaluator::<i32>::new([catch(|msg: &'static str| Some(msg.len() as i32))]);
        let outcome = evaluator.run(|| panic!("lit"));
        assert_eq!(outcome.value, Some(3));
        assert!(outcome.error.is_none());

        let formatted = evaluator.run(|| panic!("{}", String::from("lit")));
        assert!(formatted.value.is_none());
        assert_eq!(formatted.error.unwrap().to_string(), "lit");
    }

    #[test]
    fn str_handler_wins_over_string_handler_for_literals() {
        let evaluator = Evaluator::<&'static str>::new([
            catch(|_: &'static str| Some("str")),
            catch(|_: String| Some("string")),
        ]);
        assert_eq!(evaluator.run(|| panic!("lit")).value, Some("str"));
        assert_eq!(evaluator.run(|| panic!("{}", String::from("fmt"))).value, Some("string"));
    }

    #[test]
    fn literal_message_falls_back_to_string_handler() {
        let evaluator = Evaluator::<String>::new([catch(|s: String| Some(s))]);
        assert_eq!(evaluator.run(|| panic!("lit")).value.as_deref(), Some("lit"));
    }

    #[rstest]
    #[case::succeeded(false, false)]
    #[case::caught(true, true)]
    #[case::uncaught(true, false)]
    fn finalizer_runs_exactly_once(#[case] panics: bool, #[case] handled: bool) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (handler_log, final_log) = (log.clone(), log.clone());

        let mut actions = vec![finally(move || final_log.borrow_mut().push("finally"))];
        if handled {
            actions.push(catch(move |_: String| {
                handler_log.borrow_mut().push("catch");
                Some(0)
            }));
        }
        let evaluator = Evaluator::<i32>::new(actions);
        let body_log = log.clone();
        evaluator.run(move || {
            body_log.borrow_mut().push("body");
            if panics {
                panic!("x");
            }
            1
        });

        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| **e == "finally").count(), 1);
        assert_eq!(log.last(), Some(&"finally"));
    }

    #[test]
    fn finalizer_sees_current_value() {
        let evaluator = Evaluator::<i32>::new([finally(|cur: Option<&i32>| cur.map(|v| v * 2))]);
        assert_eq!(evaluator.run(|| 21).value, Some(42));

        let failed = evaluator.run(|| panic!("gone"));
        assert!(failed.value.is_none());
        assert_eq!(failed.error.unwrap().to_string(), "gone");
    }

    #[test]
    fn finalizer_value_never_hides_error() {
        let evaluator = Evaluator::<String>::new([finally(|| Some("Finally".to_string()))]);
        let outcome = evaluator.run(|| panic!("help!"));
        assert_eq!(outcome.value.as_deref(), Some("Finally"));
        assert_eq!(outcome.error.unwrap().to_string(), "help!");
    }

    #[test]
    fn finalizer_error_adopted_only_without_prior_error() {
        let evaluator = Evaluator::<i32>::new([finally(|| -> Option<i32> { panic!("cleanup failed") })]);

        let ok = evaluator.run(|| 5);
        assert_eq!(ok.value, Some(5));
        assert_eq!(ok.error.unwrap().to_string(), "cleanup failed");

        let failed = evaluator.run(|| panic!("original"));
        assert_eq!(failed.error.unwrap().to_string(), "original");
    }

    #[test]
    fn finalizer_panic_can_be_caught() {
        let evaluator = Evaluator::<i32>::new([
            catch(|_: u8| Some(-1)),
            finally(|| -> Option<i32> { panic_any(9_u8) }),
        ]);
        let outcome = evaluator.run(|| 5);
        assert_eq!(outcome.value, Some(-1));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn evaluator_is_reusable() {
        let evaluator = Evaluator::<String>::new([catch(|s: String| Some(s))]);
        for i in 0..3 {
            let outcome = evaluator.run(move || panic!("run {i}"));
            assert_eq!(outcome.value, Some(format!("run {i}")));
        }
    }
}
