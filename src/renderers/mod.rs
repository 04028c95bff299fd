pub mod html;

/// Controls the markup around the whole code block.
///
/// `start` and `end` are called once with `code = true` around the code and, when line numbers
/// are in a table, once more with `code = false` around the line numbers column.
/// `class_attr` is either empty or a full ` class="..."` attribute with a leading space.
pub trait PreWrapper: Send + Sync {
    fn start(&self, code: bool, class_attr: &str) -> String;

    fn end(&self, code: bool) -> String;
}

/// `<pre><code>` around code, a bare `<pre>` around line numbers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPreWrapper;

impl PreWrapper for DefaultPreWrapper {
    fn start(&self, code: bool, class_attr: &str) -> String {
        if code {
            format!("<pre{class_attr}><code>")
        } else {
            format!("<pre{class_attr}>")
        }
    }

    fn end(&self, code: bool) -> String {
        if code {
            "</code></pre>".to_string()
        } else {
            "</pre>".to_string()
        }
    }
}

/// No wrapping at all
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoPreWrapper;

impl PreWrapper for NoPreWrapper {
    fn start(&self, _code: bool, _class_attr: &str) -> String {
        String::new()
    }

    fn end(&self, _code: bool) -> String {
        String::new()
    }
}

/// A single inline `<code>` element, for snippets inside a paragraph
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InlineCodeWrapper;

impl PreWrapper for InlineCodeWrapper {
    fn start(&self, code: bool, class_attr: &str) -> String {
        if code {
            format!("<code{class_attr}>")
        } else {
            String::new()
        }
    }

    fn end(&self, code: bool) -> String {
        if code {
            "</code>".to_string()
        } else {
            String::new()
        }
    }
}

/// A wrapper made of two closures
pub struct FnPreWrapper<S, E> {
    start: S,
    end: E,
}

impl<S, E> FnPreWrapper<S, E>
where
    S: Fn(bool, &str) -> String + Send + Sync,
    E: Fn(bool) -> String + Send + Sync,
{
    pub fn new(start: S, end: E) -> Self {
        Self { start, end }
    }
}

impl<S, E> PreWrapper for FnPreWrapper<S, E>
where
    S: Fn(bool, &str) -> String + Send + Sync,
    E: Fn(bool) -> String + Send + Sync,
{
    fn start(&self, code: bool, class_attr: &str) -> String {
        (self.start)(code, class_attr)
    }

    fn end(&self, code: bool) -> String {
        (self.end)(code)
    }
}
