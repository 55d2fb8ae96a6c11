//! Byte ranges of parsed syntax and minimal text edits.
//!
//! Spans come from `proc-macro2` with `span-locations` enabled, so every
//! token parsed by [`syn::parse_str`] carries a line and a character column.
//! [`SourceMap`] turns those into byte offsets of the original text and
//! [`EditSet`] splices replacements into it, leaving every other byte alone.

use proc_macro2::{LineColumn, Span, TokenStream, TokenTree};
use quote::ToTokens;
use std::ops::Range;

/// Line index of a source text.
#[derive(Debug)]
pub struct SourceMap<'a> {
    src: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    /// Indexes the line starts of `src`.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(src.match_indices('\n').map(|(i, _)| i + 1));
        Self { src, line_starts }
    }

    /// Byte offset of a 1-based line and 0-based character column.
    #[must_use]
    pub fn offset(&self, at: LineColumn) -> usize {
        let Some(&start) = at.line.checked_sub(1).and_then(|l| self.line_starts.get(l)) else {
            return self.src.len();
        };
        self.src[start..]
            .char_indices()
            .nth(at.column)
            .map_or(self.src.len(), |(i, _)| start + i)
    }

    /// Byte range covered by a span.
    #[must_use]
    pub fn span_range(&self, span: Span) -> Range<usize> {
        self.offset(span.start())..self.offset(span.end())
    }

    /// Byte range covered by a syntax node, from its first to its last token.
    #[must_use]
    pub fn range_of<T: ToTokens + ?Sized>(&self, node: &T) -> Option<Range<usize>> {
        let tokens = node.to_token_stream();
        let (first, last) = token_bounds(tokens)?;
        Some(self.offset(first.start())..self.offset(last.end()))
    }

    /// Source text of a syntax node.
    #[must_use]
    pub fn text_of<T: ToTokens + ?Sized>(&self, node: &T) -> Option<&'a str> {
        self.range_of(node).map(|r| &self.src[r])
    }

    /// The indexed text.
    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.src
    }
}

fn token_bounds(tokens: TokenStream) -> Option<(Span, Span)> {
    let mut iter = tokens.into_iter();
    let first = iter.next()?;
    let last = iter.last().unwrap_or_else(|| first.clone());
    Some((span_of(&first), span_of(&last)))
}

fn span_of(token: &TokenTree) -> Span {
    match token {
        TokenTree::Group(g) => g.span(),
        other => other.span(),
    }
}

/// One replacement of a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Replaced byte range
    pub range: Range<usize>,
    /// Replacement text
    pub replacement: String,
}

/// Pending edits against one source text.
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a replacement of `range`.
    pub fn replace(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.edits.push(Edit {
            range,
            replacement: replacement.into(),
        });
    }

    /// Queues an insertion at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(offset..offset, text);
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of queued edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Applies the edits to `src`.
    ///
    /// An edit nested inside a larger one is dropped, since the outer
    /// replacement already rewrites that text. Partially overlapping edits
    /// keep the first one.
    #[must_use]
    pub fn apply(mut self, src: &str) -> String {
        self.edits.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });

        let mut kept: Vec<Edit> = Vec::with_capacity(self.edits.len());
        for edit in self.edits {
            if edit.range.end > src.len() || edit.range.start > edit.range.end {
                continue;
            }
            if kept.last().is_some_and(|prev| edit.range.start < prev.range.end) {
                continue;
            }
            kept.push(edit);
        }

        let mut out = String::with_capacity(src.len());
        let mut cursor = 0;
        for edit in kept {
            out.push_str(&src[cursor..edit.range.start]);
            out.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        out.push_str(&src[cursor..]);
        out
    }
}
