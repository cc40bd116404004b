#![forbid(unsafe_code)]

//! Message formatting hook
//!
//! Every message produced by the built-in checkers is a template plus an
//! ordered list of arguments. A [`MessageFormatter`] turns the pair into the
//! final text, which lets callers translate or restyle messages without
//! touching the checkers.

/// Message templates used by the built-in checkers
///
/// `%s` marks a positional argument.
pub mod templates {
    pub const REQUIRED: &str = "%s is required";
    pub const ROOT_NOT_STRUCTURED: &str = "the value to validate must be an object or an array";
    pub const NOT_NUMBER: &str = "should be a number";
    pub const NOT_INTEGER: &str = "should be an integer";
    pub const NOT_STRING: &str = "should be a string";
    pub const NOT_BOOLEAN: &str = "should be a boolean";
    pub const NOT_OBJECT: &str = "should be an object";
    pub const NOT_ARRAY: &str = "should be an array";
    pub const NOT_EMAIL: &str = "should be an email";
    pub const NOT_URL: &str = "should be a url";
    pub const EMPTY: &str = "should not be empty";
    pub const SMALLER_THAN: &str = "should be smaller than %s";
    pub const BIGGER_THAN: &str = "should be bigger than %s";
    pub const LENGTH_SMALLER_THAN: &str = "length should be smaller than %s";
    pub const LENGTH_BIGGER_THAN: &str = "length should be bigger than %s";
    pub const MATCH: &str = "should match %s";
    pub const ONE_OF: &str = "should be one of %s";
    pub const EQUAL_TO: &str = "should equal to %s";
    pub const OUT_OF_BOUNDS: &str = "fields outside the rule set are not allowed: %s";
}

/// Strategy turning a message template and its arguments into final text
pub trait MessageFormatter: Send + Sync {
    /// Formats `template`, substituting `args` in order
    fn format(&self, template: &str, args: &[String]) -> String;
}

/// Default formatter with `printf`-like `%s` substitution
///
/// Each `%s` consumes the next argument, `%%` produces a literal `%`, and
/// arguments left over after the template is exhausted are appended
/// separated by spaces. A `%s` with no argument left stays as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFormatter;

impl MessageFormatter for SimpleFormatter {
    fn format(&self, template: &str, args: &[String]) -> String {
        let mut output = String::with_capacity(template.len());
        let mut args = args.iter();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                output.push(c);
                continue;
            }
            match chars.peek() {
                Some('s') => {
                    chars.next();
                    match args.next() {
                        Some(arg) => output.push_str(arg),
                        None => output.push_str("%s"),
                    }
                }
                Some('%') => {
                    chars.next();
                    output.push('%');
                }
                _ => output.push('%'),
            }
        }

        for arg in args {
            output.push(' ');
            output.push_str(arg);
        }

        output
    }
}

impl<F> MessageFormatter for F
where
    F: Fn(&str, &[String]) -> String + Send + Sync,
{
    fn format(&self, template: &str, args: &[String]) -> String {
        self(template, args)
    }
}
