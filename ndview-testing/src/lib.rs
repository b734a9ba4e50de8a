//! Internal testing utilities for the ndview crates.

use std::fmt::Debug;
use std::panic::{catch_unwind, RefUnwindSafe, UnwindSafe};

/// Run table-driven tests.
///
/// A table-driven test declares a `Case` struct deriving `Debug`, builds a
/// collection of cases and passes a test function to
/// [`test_each`](TestCases::test_each):
///
/// ```
/// use ndview_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///     size: usize,
///     step: usize,
///     expected: usize,
/// }
///
/// let cases = [
///     Case { size: 6, step: 2, expected: 3 },
///     Case { size: 7, step: 2, expected: 4 },
/// ];
///
/// cases.test_each(|case| {
///     assert_eq!(case.size.div_ceil(case.step), case.expected);
/// });
/// ```
///
/// Every case is run even if an earlier one fails. Afterwards the test
/// panics if any case failed, listing the debug representation of each
/// failing case.
///
/// Cases and values captured by the test function must be unwind safe. Wrap
/// them in [`AssertUnwindSafe`](std::panic::AssertUnwindSafe) if they are
/// not.
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Call `test` with a clone of each case.
    ///
    /// Use this when the test function needs to own the case.
    fn test_each_clone(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe;
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<String> = self
            .into_iter()
            .filter(|case| catch_unwind(|| test(case)).is_err())
            .map(|case| format!("{:?}", case))
            .collect();
        report(&failures);
    }

    fn test_each_clone(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<String> = self
            .into_iter()
            .filter(|case| {
                let owned = case.clone();
                catch_unwind(move || test(owned)).is_err()
            })
            .map(|case| format!("{:?}", case))
            .collect();
        report(&failures);
    }
}

fn report(failures: &[String]) {
    assert!(
        failures.is_empty(),
        "{} test cases failed: [{}]",
        failures.len(),
        failures.join(", ")
    );
}
