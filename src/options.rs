use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::classes::{ClassGenerator, DEFAULT_TAB_WIDTH};
use crate::error::HighlightResult;

/// The options we can set for rendering a code snippet.
///
/// Options are resolved once when building a [`TailwindFormatter`](crate::TailwindFormatter)
/// and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Wrap the output in a minimal `<html><body>` document
    pub(crate) standalone: bool,
    /// Prepended to every generated utility class, eg `tw-`
    pub(crate) class_prefix: String,
    /// Emits a `[tab-size:n]` class unless this is 0 or 8
    pub(crate) tab_width: usize,
    /// No `<pre>` around the code and no per-line spans
    pub(crate) prevent_surrounding_pre: bool,
    /// Wraps the code in a `<code>` element, without per-line spans
    pub(crate) inline_code: bool,
    pub(crate) wrap_long_lines: bool,
    pub(crate) line_numbers: bool,
    /// Puts line numbers in their own table column so they are not copied with the code
    pub(crate) line_numbers_in_table: bool,
    pub(crate) linkable_line_numbers: bool,
    pub(crate) line_numbers_id_prefix: String,
    /// Which lines to highlight, by line number. Kept sorted by start.
    pub(crate) highlight_lines: Vec<RangeInclusive<usize>>,
    /// Number of the first line
    pub(crate) base_line_number: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            standalone: false,
            class_prefix: String::new(),
            tab_width: DEFAULT_TAB_WIDTH,
            prevent_surrounding_pre: false,
            inline_code: false,
            wrap_long_lines: false,
            line_numbers: false,
            line_numbers_in_table: false,
            linkable_line_numbers: false,
            line_numbers_id_prefix: String::new(),
            highlight_lines: Vec::new(),
            base_line_number: 1,
        }
    }
}

impl Options {
    /// Parses options from JSON. Missing fields get their default value.
    pub fn from_json(json: &str) -> HighlightResult<Self> {
        let mut options: Options = serde_json::from_str(json)?;
        sort_ranges(&mut options.highlight_lines);
        Ok(options)
    }

    pub fn standalone(mut self, value: bool) -> Self {
        self.standalone = value;
        self
    }

    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }

    pub fn prevent_surrounding_pre(mut self, value: bool) -> Self {
        self.prevent_surrounding_pre = value;
        self
    }

    pub fn inline_code(mut self, value: bool) -> Self {
        self.inline_code = value;
        self
    }

    pub fn wrap_long_lines(mut self, value: bool) -> Self {
        self.wrap_long_lines = value;
        self
    }

    pub fn line_numbers(mut self, value: bool) -> Self {
        self.line_numbers = value;
        self
    }

    /// Only has an effect with `line_numbers`.
    pub fn line_numbers_in_table(mut self, value: bool) -> Self {
        self.line_numbers_in_table = value;
        self
    }

    /// Gives every line number an `id` made of `id_prefix` and the number, and makes it a link
    /// to itself.
    pub fn linkable_line_numbers(mut self, value: bool, id_prefix: impl Into<String>) -> Self {
        self.linkable_line_numbers = value;
        self.line_numbers_id_prefix = id_prefix.into();
        self
    }

    /// Lines to highlight, inclusive and by line number (so relative to `base_line_number`).
    pub fn highlight_lines(mut self, ranges: Vec<RangeInclusive<usize>>) -> Self {
        self.highlight_lines = ranges;
        sort_ranges(&mut self.highlight_lines);
        self
    }

    pub fn base_line_number(mut self, number: usize) -> Self {
        self.base_line_number = number;
        self
    }

    pub fn highlighted_lines(&self) -> &[RangeInclusive<usize>] {
        &self.highlight_lines
    }

    /// Whether lines are wrapped in their own spans
    pub(crate) fn emits_line_spans(&self) -> bool {
        !(self.prevent_surrounding_pre || self.inline_code)
    }

    pub(crate) fn wrap_in_table(&self) -> bool {
        self.line_numbers && self.line_numbers_in_table
    }

    /// Number of characters needed to print the largest line number
    pub(crate) fn line_number_width(&self, line_count: usize) -> usize {
        let last = self
            .base_line_number
            .saturating_add(line_count.saturating_sub(1));
        last.to_string().len()
    }

    pub(crate) fn class_generator(&self) -> ClassGenerator {
        ClassGenerator {
            prefix: self.class_prefix.clone(),
            tab_width: self.tab_width,
            wrap_long_lines: self.wrap_long_lines,
            has_highlighted_lines: !self.highlight_lines.is_empty(),
        }
    }
}

fn sort_ranges(ranges: &mut [RangeInclusive<usize>]) {
    ranges.sort_by_key(|r| *r.start());
}

/// Walks the sorted highlight ranges alongside the lines.
///
/// Lines must be asked for in increasing order: ranges that ended before the current line are
/// skipped for good, so going through all lines is linear in lines + ranges.
#[derive(Debug, Clone)]
pub(crate) struct HighlightCursor<'a> {
    ranges: &'a [RangeInclusive<usize>],
    index: usize,
}

impl<'a> HighlightCursor<'a> {
    pub(crate) fn new(ranges: &'a [RangeInclusive<usize>]) -> Self {
        Self { ranges, index: 0 }
    }

    pub(crate) fn is_highlighted(&mut self, line: usize) -> bool {
        while self.index < self.ranges.len() && line > *self.ranges[self.index].end() {
            self.index += 1;
        }
        self.ranges
            .get(self.index)
            .is_some_and(|range| range.contains(&line))
    }
}
