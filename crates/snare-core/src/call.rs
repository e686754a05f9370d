//! Calling closures with their arguments packed in a tuple.
//!
//! [`Apply`] lets one generic entry point ([`apply`](crate::apply)) accept
//! closures of any arity, and [`bind`] fixes every argument up front to
//! produce the zero-argument target an [`Evaluator`](crate::Evaluator) runs.
//! Arity and argument types are checked by the compiler.

/// A callable that can be invoked with its arguments as a tuple.
pub trait Apply<Args> {
    type Output;

    fn apply(self, args: Args) -> Self::Output;
}

macro_rules! impl_apply {
    ($($arg:ident),*) => {
        impl<F, R, $($arg),*> Apply<($($arg,)*)> for F
        where
            F: FnOnce($($arg),*) -> R,
        {
            type Output = R;

            #[allow(non_snake_case)]
            fn apply(self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

impl_apply!();
impl_apply!(A);
impl_apply!(A, B);
impl_apply!(A, B, C);
impl_apply!(A, B, C, D);
impl_apply!(A, B, C, D, E);
impl_apply!(A, B, C, D, E, G);

/// Fix all of `f`'s arguments.
///
/// ```
/// let add = snare::bind(|a: i32, b: i32| a + b, (2, 3));
/// assert_eq!(add(), 5);
/// ```
pub fn bind<F, Args>(f: F, args: Args) -> impl FnOnce() -> F::Output
where
    F: Apply<Args>,
{
    move || f.apply(args)
}
