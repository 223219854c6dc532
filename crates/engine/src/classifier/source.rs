// CodeViz - Algorithm Playground Core
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Line-oriented view of a source text
//!
//! The classifier never parses programs. It works on significant lines
//! (blank and comment lines removed) and recovers loop structure from
//! indentation, or from braces when a loop header opens a block.

use regex::Regex;
use std::{ops::Range, sync::OnceLock};

/// Columns a tab counts for when measuring indentation
const TAB_WIDTH: usize = 4;

/// A significant line of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number in the original text
    pub number: usize,
    /// Indentation width in columns
    pub indent: usize,
    /// Line content without surrounding whitespace
    pub text: &'a str,
}

impl SourceLine<'_> {
    /// Lines made only of braces and delimiters, e.g. `}` or `};`
    pub fn is_structural(&self) -> bool {
        self.text.chars().all(|c| matches!(c, '{' | '}' | '(' | ')' | ';'))
    }

    fn brace_delta(&self) -> isize {
        self.text.chars().fold(0, |depth, c| match c {
            '{' => depth + 1,
            '}' => depth - 1,
            _ => depth,
        })
    }
}

/// A loop found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopInfo {
    /// Index of the header in [`SourceView::lines`]
    pub header: usize,
    /// Indices of the body lines in [`SourceView::lines`]
    pub body: Range<usize>,
    /// Number of loops enclosing this one
    pub depth: usize,
    /// `while v > 0` loop that halves `v` in its body
    pub halving: bool,
}

struct LoopPatterns {
    header: Regex,
    halving_header: Regex,
    /// `v = v / 2`, `v = v >> 1` or `v = int(v / 2)`
    halving_assign: Regex,
    /// `v /= 2`, `v //= 2` or `v >>= 1`
    halving_compound: Regex,
}

fn loop_patterns() -> &'static LoopPatterns {
    static PATTERNS: OnceLock<LoopPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LoopPatterns {
        header: Regex::new(r"^(?:for|foreach|while)\b|^do\s*(?:\{|$)").unwrap(),
        halving_header: Regex::new(r"^while\s*\(?\s*([A-Za-z_]\w*)\s*>\s*0\b").unwrap(),
        halving_assign: Regex::new(
            r"\b([A-Za-z_]\w*)\s*=\s*(?:[\w.]+\s*\(\s*)?([A-Za-z_]\w*)\s*(?://?\s*2|>>\s*1)\b",
        )
        .unwrap(),
        halving_compound: Regex::new(r"\b([A-Za-z_]\w*)\s*(?://?=\s*2|>>=\s*1)\b").unwrap(),
    })
}

/// Multi-line comment or docstring the scanner is currently inside
#[derive(Debug, Clone, Copy, Default)]
enum CommentBlock {
    #[default]
    None,
    /// `/* ... */`
    Block,
    /// Python docstring opened by `"""` or `'''`
    Docstring(&'static str),
}

impl CommentBlock {
    /// Code carried by `text`, or `None` when the line is blank or commented out
    fn code<'a>(&mut self, text: &'a str) -> Option<&'a str> {
        let text = match *self {
            Self::None => text,
            Self::Block => {
                let (_, rest) = text.split_once("*/")?;
                *self = Self::None;
                rest.trim()
            }
            Self::Docstring(quote) => {
                let (_, rest) = text.split_once(quote)?;
                *self = Self::None;
                rest.trim()
            }
        };

        if let Some(rest) = text.strip_prefix("/*") {
            if !rest.contains("*/") {
                *self = Self::Block;
            }
            return None;
        }
        for quote in [r#"""""#, "'''"] {
            if let Some(rest) = text.strip_prefix(quote) {
                if !rest.contains(quote) {
                    *self = Self::Docstring(quote);
                }
                return None;
            }
        }

        (!text.is_empty() && !is_comment(text)).then_some(text)
    }
}

/// Preprocessed source text shared by all classifier rules
#[derive(Debug, Clone)]
pub struct SourceView<'a> {
    lines: Vec<SourceLine<'a>>,
    loops: Vec<LoopInfo>,
}

impl<'a> SourceView<'a> {
    /// Split `source` into significant lines and locate its loops
    pub fn new(source: &'a str) -> Self {
        let mut comment = CommentBlock::default();
        let lines: Vec<_> = source
            .lines()
            .enumerate()
            .filter_map(|(idx, raw)| {
                let text = comment.code(raw.trim())?;
                Some(SourceLine { number: idx + 1, indent: indentation(raw), text })
            })
            .collect();

        let mut loops: Vec<_> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| loop_patterns().header.is_match(line.text))
            .map(|(header, _)| LoopInfo {
                header,
                body: body_range(&lines, header),
                depth: 0,
                halving: false,
            })
            .collect();

        let headers: Vec<_> = loops.iter().map(|l| l.header).collect();
        for info in &mut loops {
            info.depth = loops_enclosing(&lines, &headers, info.header);
            info.halving = is_halving(&lines, info);
        }

        Self { lines, loops }
    }

    /// Significant lines in source order
    pub fn lines(&self) -> &[SourceLine<'a>] {
        &self.lines
    }

    /// Lines that carry code, i.e. not only braces
    pub fn code_lines(&self) -> impl Iterator<Item = &SourceLine<'a>> {
        self.lines.iter().filter(|line| !line.is_structural())
    }

    /// Loops in header order
    pub fn loops(&self) -> &[LoopInfo] {
        &self.loops
    }

    /// Body lines of a loop
    pub fn body(&self, info: &LoopInfo) -> &[SourceLine<'a>] {
        &self.lines[info.body.clone()]
    }

    /// Some loop header sits inside another loop's body
    pub fn has_nested_loop(&self) -> bool {
        self.loops.iter().any(|l| l.depth > 0)
    }

    /// Some loop is not a halving loop
    pub fn has_plain_loop(&self) -> bool {
        self.loops.iter().any(|l| !l.halving)
    }

    /// Some loop is a halving loop
    pub fn has_halving_loop(&self) -> bool {
        self.loops.iter().any(|l| l.halving)
    }
}

fn is_comment(text: &str) -> bool {
    ["#", "//", "*"].iter().any(|prefix| text.starts_with(prefix))
}

fn indentation(raw: &str) -> usize {
    raw.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Braces decide the body when the header (or the line after it) opens a
/// block; otherwise the body runs until the next code line indented no
/// deeper than the header.
fn body_range(lines: &[SourceLine<'_>], header: usize) -> Range<usize> {
    let start = header + 1;
    let head = &lines[header];
    let opens_block = head.brace_delta() > 0
        || lines.get(start).is_some_and(|next| next.text.starts_with('{'));

    if opens_block {
        let mut depth = head.brace_delta();
        let mut opened = depth > 0;
        let mut end = start;
        while end < lines.len() {
            depth += lines[end].brace_delta();
            end += 1;
            opened |= depth > 0;
            if opened && depth <= 0 {
                break;
            }
        }
        return start..end;
    }

    let end = lines[start..]
        .iter()
        .position(|line| line.indent <= head.indent && !line.is_structural())
        .map_or(lines.len(), |offset| start + offset);
    start..end
}

fn loops_enclosing(lines: &[SourceLine<'_>], headers: &[usize], target: usize) -> usize {
    headers
        .iter()
        .filter(|&&other| other != target && body_range(lines, other).contains(&target))
        .count()
}

fn is_halving(lines: &[SourceLine<'_>], info: &LoopInfo) -> bool {
    let patterns = loop_patterns();
    let Some(caps) = patterns.halving_header.captures(lines[info.header].text) else {
        return false;
    };
    let var = &caps[1];

    lines[info.body.clone()].iter().any(|line| {
        patterns.halving_assign.captures_iter(line.text).any(|c| &c[1] == var && &c[2] == var)
            || patterns.halving_compound.captures_iter(line.text).any(|c| &c[1] == var)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines_are_dropped() {
        let view = SourceView::new("# header\n\nx = 1\n// note\n  * doc\ny = 2\n");
        let texts: Vec<_> = view.lines().iter().map(|l| l.text).collect();
        assert_eq!(texts, ["x = 1", "y = 2"]);
        assert_eq!(view.lines()[1].number, 6);
    }

    #[test]
    fn test_block_comments_and_docstrings_are_dropped() {
        let view = SourceView::new("/*\n for each value we print it\n*/\nprint(x)");
        assert_eq!(view.lines().len(), 1);
        assert_eq!(view.lines()[0].number, 4);
        assert!(view.loops().is_empty());

        let src = "def f(items):\n    \"\"\"\n    for every item\n    \"\"\"\n    return items";
        let view = SourceView::new(src);
        let texts: Vec<_> = view.lines().iter().map(|l| l.text).collect();
        assert_eq!(texts, ["def f(items):", "return items"]);

        let view = SourceView::new("'''while n > 0'''\n/* for */ \nx = 1");
        assert_eq!(view.lines().len(), 1);
        assert!(view.loops().is_empty());
    }

    #[test]
    fn test_code_after_block_comment_end() {
        let view = SourceView::new("/* header\n   more */ for (;;) {\n}");
        assert_eq!(view.lines()[0].text, "for (;;) {");
        assert_eq!(view.loops().len(), 1);
    }

    #[test]
    fn test_indentation_counts_tabs() {
        let view = SourceView::new("\tx = 1\n  y = 2");
        assert_eq!(view.lines()[0].indent, TAB_WIDTH);
        assert_eq!(view.lines()[1].indent, 2);
    }

    #[test]
    fn test_python_nested_loops_by_indentation() {
        let src = "for i in range(n):\n    print(i)\n    for j in range(n):\n        print(j)\nprint('done')";
        let view = SourceView::new(src);
        assert_eq!(view.loops().len(), 2);
        assert_eq!(view.loops()[0].body, 1..4);
        assert_eq!(view.loops()[1].depth, 1);
        assert!(view.has_nested_loop());
    }

    #[test]
    fn test_sibling_loops_are_not_nested() {
        let src = "for i in range(n):\n    a(i)\nfor j in range(n):\n    b(j)";
        let view = SourceView::new(src);
        assert_eq!(view.loops().len(), 2);
        assert!(!view.has_nested_loop());
        assert!(view.has_plain_loop());
    }

    #[test]
    fn test_brace_bodies_without_indentation() {
        let src = "for (int i = 0; i < n; i++) {\nfor (int j = 0; j < n; j++) {\nsum++;\n}\n}\nreturn sum;";
        let view = SourceView::new(src);
        assert_eq!(view.loops()[0].body, 1..5);
        assert!(view.has_nested_loop());
    }

    #[test]
    fn test_brace_on_next_line() {
        let src = "for (int i = 0; i < n; i++)\n{\n    sum += i;\n}\nfor (int j = 0; j < n; j++)\n{\n}";
        let view = SourceView::new(src);
        assert_eq!(view.loops().len(), 2);
        assert!(!view.has_nested_loop());
    }

    #[test]
    fn test_halving_loop_variants() {
        for body in ["n = n / 2", "n //= 2", "n /= 2;", "n = n >> 1;", "n >>= 1;", "n = int(n / 2)"] {
            let src = format!("while n > 0:\n    steps += 1\n    {body}");
            let view = SourceView::new(&src);
            assert!(view.has_halving_loop(), "{body}");
            assert!(!view.has_plain_loop(), "{body}");
        }
    }

    #[test]
    fn test_halving_requires_same_variable() {
        let view = SourceView::new("while (n > 0) {\n    m = m / 2;\n    n--;\n}");
        assert!(!view.has_halving_loop());
        assert!(view.has_plain_loop());
    }

    #[test]
    fn test_do_while_header() {
        let view = SourceView::new("do {\n    i++;\n} while (i < n);");
        assert_eq!(view.loops().len(), 1);
    }
}
