use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use crate::cache::{ClassCache, DEFAULT_CAPACITY};
use crate::classes::ClassMapping;
use crate::error::{Error, HighlightResult};
use crate::options::{HighlightCursor, Options};
use crate::renderers::{DefaultPreWrapper, InlineCodeWrapper, NoPreWrapper, PreWrapper};
use crate::themes::Theme;
use crate::tokens::{Token, TokenType, Tokenizer, split_into_lines};

/// Renders tokens to HTML styled with Tailwind utility classes.
///
/// Every category gets the classes of the light theme plus `dark:` variants from the dark theme,
/// so the output follows whatever dark mode strategy the page uses. The classes of a theme pair
/// are computed once and cached in the formatter.
pub struct TailwindFormatter {
    options: Options,
    dark_theme: Option<Arc<Theme>>,
    pre_wrapper: Box<dyn PreWrapper>,
    cache: ClassCache,
}

impl fmt::Debug for TailwindFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TailwindFormatter")
            .field("options", &self.options)
            .field("dark_theme", &self.dark_theme.as_ref().map(|t| &t.name))
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Default for TailwindFormatter {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl TailwindFormatter {
    pub fn new(options: Options) -> Self {
        let pre_wrapper: Box<dyn PreWrapper> = if options.inline_code {
            Box::new(InlineCodeWrapper)
        } else if options.prevent_surrounding_pre {
            Box::new(NoPreWrapper)
        } else {
            Box::new(DefaultPreWrapper)
        };
        let cache = ClassCache::new(options.class_generator(), DEFAULT_CAPACITY);

        Self {
            options,
            dark_theme: None,
            pre_wrapper,
            cache,
        }
    }

    /// The theme used for the `dark:` variants when none is given at render time.
    pub fn with_dark_theme(mut self, theme: Arc<Theme>) -> Self {
        self.dark_theme = Some(theme);
        self
    }

    /// Replaces the markup around the code block, whatever the options say.
    pub fn with_pre_wrapper(mut self, wrapper: impl PreWrapper + 'static) -> Self {
        self.pre_wrapper = Box::new(wrapper);
        self
    }

    /// How many theme pairs to keep class mappings for. Clears the cache.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ClassCache::new(self.options.class_generator(), capacity);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn cache(&self) -> &ClassCache {
        &self.cache
    }

    /// The classes used for each category with that light theme and the configured dark theme.
    pub fn class_mapping(&self, light: &Arc<Theme>) -> Arc<ClassMapping> {
        self.cache.get(light, self.dark_theme.as_ref())
    }

    /// Tokenizes `source` and renders it.
    ///
    /// A tokenizer failure is returned as [`Error::Tokenize`] before anything is written.
    pub fn highlight<W: Write, T: Tokenizer>(
        &self,
        w: &mut W,
        tokenizer: &T,
        source: &str,
        light: &Arc<Theme>,
    ) -> HighlightResult<()> {
        let tokens = tokenizer
            .tokenize(source)
            .map_err(|err| Error::Tokenize(Box::new(err)))?;
        self.format(w, light, &tokens)
    }

    /// Renders the tokens with the configured dark theme, if any.
    pub fn format<W: Write>(
        &self,
        w: &mut W,
        light: &Arc<Theme>,
        tokens: &[Token],
    ) -> HighlightResult<()> {
        self.format_with_dark(w, light, self.dark_theme.as_ref(), tokens)
    }

    /// Renders the tokens. Without a dark theme, the light one is used for dark mode as well.
    ///
    /// A failing writer aborts the render: what was written before stays written.
    pub fn format_with_dark<W: Write>(
        &self,
        w: &mut W,
        light: &Arc<Theme>,
        dark: Option<&Arc<Theme>>,
        tokens: &[Token],
    ) -> HighlightResult<()> {
        #[cfg(feature = "debug")]
        log::debug!(
            "rendering {} tokens with themes ({}, {})",
            tokens.len(),
            light.name,
            dark.unwrap_or(light).name
        );
        let classes = self.cache.get(light, dark);
        self.write_html(w, &classes, tokens)
    }

    pub fn format_to_string(
        &self,
        light: &Arc<Theme>,
        tokens: &[Token],
    ) -> HighlightResult<String> {
        let mut buf = Vec::new();
        self.format(&mut buf, light, tokens)?;
        String::from_utf8(buf)
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    fn write_html<W: Write>(
        &self,
        w: &mut W,
        classes: &ClassMapping,
        tokens: &[Token],
    ) -> HighlightResult<()> {
        let options = &self.options;
        let attr = |tt: TokenType| ClassAttr(classes.get(tt));

        if options.standalone {
            w.write_all(b"<html>\n")?;
            writeln!(w, "<body{}>", attr(TokenType::Background))?;
        }

        let wrap_in_table = options.wrap_in_table();
        let lines = split_into_lines(tokens);
        let line_digits = options.line_number_width(lines.len());
        let pre_wrapper_attr = attr(TokenType::PreWrapper).to_string();

        if wrap_in_table {
            // Line numbers get their own <td> so they are not part of a copy/paste of the code
            writeln!(w, "<div{}>", attr(TokenType::PreWrapper))?;
            write!(w, "<table{}><tr>", attr(TokenType::LineTable))?;
            writeln!(w, "<td{}>", attr(TokenType::LineTableTD))?;
            w.write_all(self.pre_wrapper.start(false, &pre_wrapper_attr).as_bytes())?;

            let mut cursor = HighlightCursor::new(&options.highlight_lines);
            for index in 0..lines.len() {
                let line = options.base_line_number.saturating_add(index);
                let highlight = cursor.is_highlighted(line);
                if highlight {
                    write!(w, "<span{}>", attr(TokenType::LineHighlight))?;
                }
                write!(
                    w,
                    "<span{}{}>{}\n</span>",
                    attr(TokenType::LineNumbersTable),
                    self.line_id_attribute(line),
                    self.line_title(classes, line_digits, line)
                )?;
                if highlight {
                    w.write_all(b"</span>")?;
                }
            }

            w.write_all(self.pre_wrapper.end(false).as_bytes())?;
            w.write_all(b"</td>\n")?;
            let code_cell = join_classes(
                classes.get(TokenType::LineTableTD),
                &self.cache.generator().prefixed("w-full"),
            );
            writeln!(w, "<td{}>", ClassAttr(&code_cell))?;
        }

        w.write_all(self.pre_wrapper.start(true, &pre_wrapper_attr).as_bytes())?;

        let line_spans = options.emits_line_spans();
        let mut cursor = HighlightCursor::new(&options.highlight_lines);
        for (index, fragments) in lines.iter().enumerate() {
            let line = options.base_line_number.saturating_add(index);

            if line_spans {
                if cursor.is_highlighted(line) {
                    let line_classes = join_classes(
                        classes.get(TokenType::Line),
                        classes.get(TokenType::LineHighlight),
                    );
                    write!(w, "<span{}>", ClassAttr(&line_classes))?;
                } else {
                    write!(w, "<span{}>", attr(TokenType::Line))?;
                }

                if options.line_numbers && !wrap_in_table {
                    write!(
                        w,
                        "<span{}{}>{}</span>",
                        attr(TokenType::LineNumbers),
                        self.line_id_attribute(line),
                        self.line_title(classes, line_digits, line)
                    )?;
                }

                write!(w, "<span{}>", attr(TokenType::CodeLine))?;
            }

            for fragment in fragments {
                let text = HtmlEscaped(fragment.text);
                let token_attr = attr(fragment.token_type);
                if token_attr.is_empty() {
                    write!(w, "{text}")?;
                } else {
                    write!(w, "<span{token_attr}>{text}</span>")?;
                }
            }

            if line_spans {
                // End of CodeLine then Line
                w.write_all(b"</span></span>")?;
            }
        }

        w.write_all(self.pre_wrapper.end(true).as_bytes())?;

        if wrap_in_table {
            w.write_all(b"</td></tr></table>\n")?;
            w.write_all(b"</div>\n")?;
        }

        if options.standalone {
            w.write_all(b"\n</body>\n")?;
            w.write_all(b"</html>\n")?;
        }

        Ok(())
    }

    fn line_id(&self, line: usize) -> String {
        format!("{}{line}", self.options.line_numbers_id_prefix)
    }

    fn line_id_attribute(&self, line: usize) -> String {
        if !self.options.linkable_line_numbers {
            return String::new();
        }
        format!(r#" id="{}""#, self.line_id(line))
    }

    /// The right-aligned line number, as a link to itself if numbers are linkable
    fn line_title(&self, classes: &ClassMapping, digits: usize, line: usize) -> String {
        let title = format!("{line:>digits$}");
        if !self.options.linkable_line_numbers {
            return title;
        }
        format!(
            r##"<a{} href="#{}">{title}</a>"##,
            ClassAttr(classes.get(TokenType::LineLink)),
            self.line_id(line)
        )
    }
}

fn join_classes(a: &str, b: &str) -> String {
    let (a, b) = (a.trim(), b.trim());
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}

/// A ` class="..."` attribute, or nothing at all if there are no classes
#[derive(Clone, Copy)]
struct ClassAttr<'a>(&'a str);

impl ClassAttr<'_> {
    fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ClassAttr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classes = self.0.trim();
        if classes.is_empty() {
            return Ok(());
        }
        write!(f, r#" class="{classes}""#)
    }
}

// From syntect
pub(crate) struct HtmlEscaped<'a>(pub &'a str);
impl fmt::Display for HtmlEscaped<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Because the internet is always right, turns out there's not that many
        // characters to escape: http://stackoverflow.com/questions/7381974
        let Self(s) = *self;
        let pile_o_bits = s;
        let mut last = 0;
        for (i, ch) in s.bytes().enumerate() {
            let escaped = match ch {
                b'>' => "&gt;",
                b'<' => "&lt;",
                b'&' => "&amp;",
                b'\'' => "&#39;",
                b'"' => "&quot;",
                _ => continue,
            };
            fmt.write_str(&pile_o_bits[last..i])?;
            fmt.write_str(escaped)?;
            last = i + 1;
        }

        if last < s.len() {
            fmt.write_str(&pile_o_bits[last..])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::FnPreWrapper;

    const BG: &str = "text-[#24292e] bg-[#ffffff] dark:text-[#c9d1d9] dark:bg-[#0d1117]";
    const KW: &str = "text-[#d73a49] font-bold dark:text-[#ff7b72] dark:font-normal";
    const LN: &str =
        "whitespace-pre select-none mr-[0.4em] px-[0.4em] text-[#999999] dark:text-[#6e7681]";
    const LNT: &str = "whitespace-pre select-none mr-[0.4em] px-[0.4em]";
    const HL: &str = "bg-[#fffbdd] dark:bg-[#2d333b]";

    fn light() -> Arc<Theme> {
        Theme::builder("github")
            .parse_entry(TokenType::Background, "bg:#ffffff #24292e")
            .unwrap()
            .parse_entry(TokenType::Keyword, "bold #d73a49")
            .unwrap()
            .parse_entry(TokenType::LiteralString, "#032f62")
            .unwrap()
            .parse_entry(TokenType::LineNumbers, "#999999")
            .unwrap()
            .parse_entry(TokenType::LineHighlight, "bg:#fffbdd")
            .unwrap()
            .build_arc()
    }

    fn dark() -> Arc<Theme> {
        Theme::builder("github-dark")
            .parse_entry(TokenType::Background, "bg:#0d1117 #c9d1d9")
            .unwrap()
            .parse_entry(TokenType::Keyword, "#ff7b72")
            .unwrap()
            .parse_entry(TokenType::LiteralString, "#a5d6ff")
            .unwrap()
            .parse_entry(TokenType::LineNumbers, "#6e7681")
            .unwrap()
            .parse_entry(TokenType::LineHighlight, "bg:#2d333b")
            .unwrap()
            .build_arc()
    }

    fn render(options: Options, tokens: &[Token]) -> String {
        TailwindFormatter::new(options)
            .with_dark_theme(dark())
            .format_to_string(&light(), tokens)
            .unwrap()
    }

    fn tok(tt: TokenType, value: &str) -> Token {
        Token::new(tt, value)
    }

    #[test]
    fn renders_a_single_line() {
        let tokens = vec![
            tok(TokenType::Keyword, "let"),
            tok(TokenType::Text, " "),
            tok(TokenType::Name, "x"),
            tok(TokenType::Operator, " = "),
            tok(TokenType::LiteralStringDouble, "\"<a&b>\""),
        ];
        let html = render(Options::default(), &tokens);
        insta::assert_snapshot!(html, @r##"<pre class="text-[#24292e] bg-[#ffffff] dark:text-[#c9d1d9] dark:bg-[#0d1117]"><code><span class="flex"><span><span class="text-[#d73a49] font-bold dark:text-[#ff7b72] dark:font-normal">let</span> x = <span class="text-[#032f62] dark:text-[#a5d6ff]">&quot;&lt;a&amp;b&gt;&quot;</span></span></span></code></pre>"##);
    }

    #[test]
    fn escapes_regardless_of_category() {
        for tt in [TokenType::Text, TokenType::Keyword, TokenType::CommentSingle] {
            let html = render(Options::default(), &[tok(tt, "<a&b>")]);
            assert!(html.contains("&lt;a&amp;b&gt;"), "{html}");
            assert!(!html.contains("<a&b>"));
        }
        assert_eq!(HtmlEscaped("it's").to_string(), "it&#39;s");
    }

    #[test]
    fn line_numbers_near_the_end_of_the_range() {
        let last = usize::MAX.to_string();
        for in_table in [false, true] {
            let options = Options::default()
                .line_numbers(true)
                .line_numbers_in_table(in_table)
                .base_line_number(usize::MAX);
            let html = render(options, &[tok(TokenType::Text, "x\ny")]);
            assert_eq!(html.matches(last.as_str()).count(), 2, "{html}");
        }
    }

    #[test]
    fn inline_line_numbers_with_links_and_highlight() {
        let options = Options::default()
            .line_numbers(true)
            .linkable_line_numbers(true, "L")
            .base_line_number(9)
            .highlight_lines(vec![10..=10]);
        let tokens = vec![
            tok(TokenType::Keyword, "fn"),
            tok(TokenType::Text, "\n"),
            tok(TokenType::Text, "x"),
        ];
        let html = render(options, &tokens);

        let link = "outline-none no-underline text-[inherit]";
        let expected = format!(
            concat!(
                r#"<pre class="grid {bg}"><code>"#,
                r##"<span class="flex"><span class="{ln}" id="L9"><a class="{link}" href="#L9"> 9</a></span>"##,
                r#"<span><span class="{kw}">fn</span>"#,
                "\n",
                r#"</span></span>"#,
                r##"<span class="flex {hl}"><span class="{ln}" id="L10"><a class="{link}" href="#L10">10</a></span>"##,
                r#"<span>x</span></span>"#,
                r#"</code></pre>"#,
            ),
            bg = BG,
            ln = LN,
            link = link,
            kw = KW,
            hl = HL,
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn line_numbers_in_table() {
        let options = Options::default()
            .line_numbers(true)
            .line_numbers_in_table(true)
            .highlight_lines(vec![2..=2]);
        let tokens = vec![tok(TokenType::Text, "a\nb")];
        let html = render(options, &tokens);

        let expected = format!(
            concat!(
                "<div class=\"grid {bg}\">\n",
                "<table class=\"border-separate border-spacing-0 p-0 m-0 border-0\"><tr>",
                "<td class=\"align-top p-0 m-0 border-0\">\n",
                "<pre class=\"grid {bg}\">",
                "<span class=\"{lnt}\">1\n</span>",
                "<span class=\"{hl}\"><span class=\"{lnt}\">2\n</span></span>",
                "</pre></td>\n",
                "<td class=\"align-top p-0 m-0 border-0 w-full\">\n",
                "<pre class=\"grid {bg}\"><code>",
                "<span class=\"flex\"><span>a\n</span></span>",
                "<span class=\"flex {hl}\"><span>b</span></span>",
                "</code></pre>",
                "</td></tr></table>\n",
                "</div>\n",
            ),
            bg = BG,
            lnt = LNT,
            hl = HL,
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn standalone_without_pre() {
        let options = Options::default()
            .standalone(true)
            .prevent_surrounding_pre(true)
            .line_numbers(true);
        let html = render(options, &[tok(TokenType::Keyword, "if")]);
        assert_eq!(
            html,
            format!(
                "<html>\n<body class=\"{BG}\">\n<span class=\"{KW}\">if</span>\n</body>\n</html>\n"
            )
        );
    }

    #[test]
    fn inline_code() {
        let html = render(
            Options::default().inline_code(true),
            &[tok(TokenType::Keyword, "if"), tok(TokenType::Text, " x")],
        );
        assert_eq!(
            html,
            format!("<code class=\"{BG}\"><span class=\"{KW}\">if</span> x</code>")
        );
    }

    #[test]
    fn custom_wrapper_wins_over_options() {
        let formatter = TailwindFormatter::new(Options::default().inline_code(true))
            .with_dark_theme(dark())
            .with_pre_wrapper(FnPreWrapper::new(
                |_, attr: &str| format!("<figure{attr}>"),
                |_| "</figure>".to_string(),
            ));
        let html = formatter
            .format_to_string(&light(), &[tok(TokenType::Text, "x")])
            .unwrap();
        assert_eq!(html, format!("<figure class=\"{BG}\">x</figure>"));
    }

    #[test]
    fn one_line_span_per_line() {
        let source = "a\nb\n\nc\n";
        let html = render(Options::default(), &[tok(TokenType::Text, source)]);
        assert_eq!(html.matches(r#"<span class="flex">"#).count(), 4);
    }

    #[test]
    fn prefix_and_tab_width() {
        let options = Options::default().class_prefix("tw-").tab_width(4);
        let html = render(options, &[tok(TokenType::Keyword, "if")]);
        let background = "tw-text-[#24292e] tw-bg-[#ffffff] dark:tw-text-[#c9d1d9] \
                          dark:tw-bg-[#0d1117] tw-[tab-size:4]";
        let keyword = "tw-text-[#d73a49] tw-font-bold dark:tw-text-[#ff7b72] dark:tw-font-normal";
        assert!(
            html.starts_with(&format!(
                r#"<pre class="{background}"><code><span class="tw-flex">"#
            )),
            "{html}"
        );
        assert!(html.contains(&format!(r#"<span class="{keyword}">if</span>"#)));
    }

    #[test]
    fn no_dark_theme_uses_light_for_both() {
        let formatter = TailwindFormatter::default();
        let html = formatter
            .format_to_string(&light(), &[tok(TokenType::Keyword, "if")])
            .unwrap();
        assert!(html.contains(
            "text-[#d73a49] font-bold dark:text-[#d73a49] dark:font-bold"
        ));
        assert!(!html.contains("dark:font-normal"));
    }

    #[test]
    fn renders_reuse_cached_classes() {
        let formatter = TailwindFormatter::default().with_dark_theme(dark());
        let light = light();
        let tokens = [tok(TokenType::Keyword, "if")];
        let a = formatter.format_to_string(&light, &tokens).unwrap();
        let b = formatter.format_to_string(&light, &tokens).unwrap();
        assert_eq!(a, b);
        assert_eq!(formatter.cache().computed(), 1);

        let other_dark = dark();
        formatter
            .format_with_dark(&mut Vec::new(), &light, Some(&other_dark), &tokens)
            .unwrap();
        assert_eq!(formatter.cache().computed(), 2);
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            render(Options::default(), &[]),
            format!("<pre class=\"{BG}\"><code></code></pre>")
        );
    }

    struct FailingWriter {
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_abort_the_render() {
        let formatter = TailwindFormatter::default();
        let mut w = FailingWriter { budget: 20 };
        let res = formatter.format(&mut w, &light(), &[tok(TokenType::Text, "a\nb\nc\n")]);
        match res {
            Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("unterminated string")
        }
    }

    impl std::error::Error for Broken {}

    struct BrokenTokenizer;

    impl Tokenizer for BrokenTokenizer {
        type Error = Broken;

        fn tokenize(&self, _source: &str) -> Result<Vec<Token>, Self::Error> {
            Err(Broken)
        }
    }

    #[test]
    fn tokenizer_errors_are_passed_through() {
        let mut out = Vec::new();
        let res =
            TailwindFormatter::default().highlight(&mut out, &BrokenTokenizer, "\"", &light());
        let err = res.unwrap_err();
        assert!(matches!(err, Error::Tokenize(_)));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<Broken>().is_some());
        assert!(out.is_empty());
    }
}
