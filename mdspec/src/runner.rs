//! Runs a single example against the caller's conversion function.

use mdspec_schema::TestCase;

use crate::error::{BoxError, TestFailure};

/// A Markdown-to-HTML conversion function under test.
///
/// Implemented for every `Fn(&str) -> Result<String, E>` whose error
/// converts into [`BoxError`]. The checker may call it from several
/// threads at once, hence the `Sync` bound.
pub trait Converter: Sync {
    fn convert(&self, markdown: &str) -> Result<String, BoxError>;
}

impl<F, E> Converter for F
where
    F: Fn(&str) -> Result<String, E> + Sync,
    E: Into<BoxError>,
{
    fn convert(&self, markdown: &str) -> Result<String, BoxError> {
        self(markdown).map_err(Into::into)
    }
}

/// Outcome of one example.
#[derive(Debug)]
pub enum Verdict {
    Pass,
    Fail(TestFailure),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn into_result(self) -> Result<(), TestFailure> {
        match self {
            Verdict::Pass => Ok(()),
            Verdict::Fail(failure) => Err(failure),
        }
    }
}

/// Run one example. Output must equal the expected HTML exactly; no
/// whitespace or case normalization is applied.
pub fn run_case<C: Converter + ?Sized>(case: &TestCase, converter: &C) -> Verdict {
    match converter.convert(&case.markdown) {
        Err(source) => Verdict::Fail(TestFailure::FunctionError {
            id: case.id(),
            markdown: case.markdown.clone(),
            expected: case.html.clone(),
            source,
        }),
        Ok(actual) if actual == case.html => Verdict::Pass,
        Ok(actual) => Verdict::Fail(TestFailure::Mismatch {
            id: case.id(),
            markdown: case.markdown.clone(),
            expected: case.html.clone(),
            actual,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs_case() -> TestCase {
        TestCase::new(
            1,
            "Tabs",
            "\tfoo\tbaz\t\tbim\n",
            "<pre><code>foo\tbaz\t\tbim\n</code></pre>\n",
        )
    }

    #[test]
    fn test_run_case_pass() {
        let convert = |_: &str| -> Result<String, String> {
            Ok("<pre><code>foo\tbaz\t\tbim\n</code></pre>\n".to_string())
        };
        assert!(run_case(&tabs_case(), &convert).is_pass());
    }

    #[test]
    fn test_run_case_mismatch() {
        let convert = |_: &str| -> Result<String, String> { Ok("<p>bad HTML</p>".to_string()) };

        match run_case(&tabs_case(), &convert) {
            Verdict::Fail(TestFailure::Mismatch {
                id,
                markdown,
                expected,
                actual,
            }) => {
                assert_eq!(id, "1_Tabs");
                assert_eq!(markdown, "\tfoo\tbaz\t\tbim\n");
                assert_eq!(expected, "<pre><code>foo\tbaz\t\tbim\n</code></pre>\n");
                assert_eq!(actual, "<p>bad HTML</p>");
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_run_case_no_whitespace_normalization() {
        // Missing trailing newline is a mismatch.
        let convert = |_: &str| -> Result<String, String> {
            Ok("<pre><code>foo\tbaz\t\tbim\n</code></pre>".to_string())
        };
        assert!(!run_case(&tabs_case(), &convert).is_pass());
    }

    #[test]
    fn test_run_case_function_error() {
        let convert = |_: &str| -> Result<String, String> { Err("something went wrong".to_string()) };

        let failure = run_case(&tabs_case(), &convert).into_result().unwrap_err();
        assert!(matches!(failure, TestFailure::FunctionError { .. }));
        let message = failure.to_string();
        assert!(message.contains("the given function failed to parse markdown"));
        assert!(message.contains("something went wrong"));
        assert!(message.contains("1_Tabs"));
    }

    #[test]
    fn test_run_case_passes_markdown_through() {
        let convert = |md: &str| -> Result<String, String> { Ok(md.to_string()) };
        let case = TestCase::new(9, "Echo", "<b>\n", "<b>\n");
        assert!(run_case(&case, &convert).into_result().is_ok());
    }

    struct Uppercase;

    impl Converter for Uppercase {
        fn convert(&self, markdown: &str) -> Result<String, BoxError> {
            Ok(markdown.to_uppercase())
        }
    }

    #[test]
    fn test_run_case_custom_converter() {
        let case = TestCase::new(2, "Case", "abc", "ABC");
        assert!(run_case(&case, &Uppercase).is_pass());

        let dyn_converter: &dyn Converter = &Uppercase;
        assert!(run_case(&case, dyn_converter).is_pass());
    }
}
