//! Argument expansion port.
//!
//! The host hands raw argument nodes (unexpanded template fragments) to the
//! dispatcher. Turning a node into text is the host's job; the dispatcher
//! only decides when, calling [`ArgumentExpander::expand`] exactly once per
//! node, left to right, after the target function has been found.

/// Capability that expands one raw host node to its final text.
pub trait ArgumentExpander<N: ?Sized> {
    fn expand(&self, node: &N) -> String;
}

/// Expander for hosts whose arguments are already plain text.
///
/// Returns every node unchanged. Used by the CLI and by tests that run the
/// engine without a templating host.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralExpander;

impl<S: AsRef<str> + ?Sized> ArgumentExpander<S> for LiteralExpander {
    fn expand(&self, node: &S) -> String {
        node.as_ref().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_expander_is_identity() {
        let expander = LiteralExpander;
        assert_eq!(expander.expand("{{x}}"), "{{x}}");
        assert_eq!(expander.expand(&String::from(" padded ")), " padded ");
    }
}
