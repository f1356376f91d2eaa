//! Character-grid layout for a rendered code block

use super::style_property;
use crate::themes::Rgb;
use scraper::{ElementRef, Node, Selector};

/// Width of one character cell, CSS px
pub const CELL_WIDTH: u32 = 8;
/// Height of one text row, CSS px
pub const CELL_HEIGHT: u32 = 16;
/// Padding around the text on every side, CSS px
pub const PADDING: u32 = 16;

const DEFAULT_TAB_SIZE: usize = 8;
const DEFAULT_BACKGROUND: Rgb = Rgb(255, 255, 255);
const DEFAULT_FOREGROUND: Rgb = Rgb(0, 0, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A run of same-coloured text on one row
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub rect: Rect,
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub runs: Vec<TextRun>,
}

/// Lay out a code block element.
///
/// Rows come from `span.line` descendants; an element without them is laid
/// out from its plain text. Tabs expand to the block's `tab-size`.
pub fn layout_block(node: ElementRef<'_>) -> BlockLayout {
    let box_style = node.value().attr("style").unwrap_or_default();
    let tab_size = style_property(box_style, "tab-size")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_TAB_SIZE);

    let pre_sel = Selector::parse("pre").unwrap();
    let pre_style = node
        .select(&pre_sel)
        .next()
        .and_then(|p| p.value().attr("style"))
        .unwrap_or_default();
    let background = color_property(pre_style, "background")
        .or_else(|| color_property(box_style, "background"))
        .unwrap_or(DEFAULT_BACKGROUND);
    let foreground = color_property(pre_style, "color")
        .or_else(|| color_property(box_style, "color"))
        .unwrap_or(DEFAULT_FOREGROUND);

    let line_sel = Selector::parse("span.line").unwrap();
    let mut rows: Vec<Vec<(String, Rgb)>> = node
        .select(&line_sel)
        .map(|line| {
            line.children()
                .filter_map(|child| match child.value() {
                    Node::Text(t) => Some((t.to_string(), foreground)),
                    Node::Element(el) => {
                        let color = el
                            .attr("style")
                            .and_then(|s| color_property(s, "color"))
                            .unwrap_or(foreground);
                        ElementRef::wrap(child).map(|e| (e.text().collect::<String>(), color))
                    }
                    _ => None,
                })
                .collect()
        })
        .collect();
    if rows.is_empty() {
        let text = node.text().collect::<String>();
        rows = text.lines().map(|l| vec![(l.to_string(), foreground)]).collect();
    }

    let mut runs = Vec::new();
    let mut max_cols = 0usize;
    for (row, segments) in rows.iter().enumerate() {
        let mut col = 0usize;
        for (text, color) in segments {
            let start = col;
            let mut expanded = String::with_capacity(text.len());
            for c in text.chars() {
                match c {
                    '\t' => {
                        let next = (col / tab_size + 1) * tab_size;
                        expanded.extend(std::iter::repeat(' ').take(next - col));
                        col = next;
                    }
                    '\n' | '\r' => {}
                    _ => {
                        expanded.push(c);
                        col += 1;
                    }
                }
            }
            if col > start {
                runs.push(TextRun {
                    rect: Rect {
                        x: (PADDING + start as u32 * CELL_WIDTH) as i32,
                        y: (PADDING + row as u32 * CELL_HEIGHT) as i32,
                        width: (col - start) as u32 * CELL_WIDTH,
                        height: CELL_HEIGHT,
                    },
                    text: expanded,
                    color: *color,
                });
            }
        }
        max_cols = max_cols.max(col);
    }

    BlockLayout {
        width: PADDING * 2 + max_cols as u32 * CELL_WIDTH,
        height: PADDING * 2 + rows.len().max(1) as u32 * CELL_HEIGHT,
        background,
        runs,
    }
}

// `transparent` and non-hex values are treated as unset
fn color_property(style: &str, name: &str) -> Option<Rgb> {
    style_property(style, name).and_then(Rgb::parse_hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn layout(html: &str) -> BlockLayout {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse(".code-box").unwrap();
        layout_block(doc.select(&sel).next().unwrap())
    }

    #[test]
    fn lays_out_rows_and_colors() {
        let l = layout(
            "<div class=\"code-box\" style=\"tab-size: 4\"><pre style=\"background: #102030; color: #ffffff\"><code>\
             <span class=\"line\"><span style=\"color: #ff0000\">let</span> x</span>\n\
             <span class=\"line\">ab</span>\n</code></pre></div>",
        );
        assert_eq!(l.background, Rgb(0x10, 0x20, 0x30));
        assert_eq!(l.runs.len(), 3);
        assert_eq!(l.runs[0].color, Rgb(255, 0, 0));
        assert_eq!(l.runs[1].text, " x");
        assert_eq!(l.runs[1].color, Rgb(255, 255, 255));
        assert_eq!(l.runs[1].rect.x, (PADDING + 3 * CELL_WIDTH) as i32);
        assert_eq!(l.runs[2].rect.y, (PADDING + CELL_HEIGHT) as i32);
        assert_eq!(l.width, PADDING * 2 + 5 * CELL_WIDTH);
        assert_eq!(l.height, PADDING * 2 + 2 * CELL_HEIGHT);
    }

    #[test]
    fn tabs_expand_to_tab_stops() {
        let l = layout("<div class=\"code-box\" style=\"tab-size: 4\"><pre><span class=\"line\">a\tb</span></pre></div>");
        assert_eq!(l.runs[0].text, "a   b");
        assert_eq!(l.background, DEFAULT_BACKGROUND);
    }

    #[test]
    fn plain_markup_falls_back_to_text() {
        let l = layout("<div class=\"code-box\">one\ntwo three</div>");
        assert_eq!(l.runs.len(), 2);
        assert_eq!(l.width, PADDING * 2 + 9 * CELL_WIDTH);
    }

    #[test]
    fn empty_block_still_has_a_row() {
        let l = layout("<div class=\"code-box\"></div>");
        assert!(l.runs.is_empty());
        assert_eq!(l.height, PADDING * 2 + CELL_HEIGHT);
    }
}
