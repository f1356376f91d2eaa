//! Display list for a laid-out code block

use super::layout::BlockLayout;
use crate::themes::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        rgba: (u8, u8, u8, u8),
    },
}

fn opaque(c: Rgb) -> (u8, u8, u8, u8) {
    (c.0, c.1, c.2, 255)
}

/// Background first, then text runs in document order.
pub fn build_display_list(layout: &BlockLayout) -> Vec<PaintCommand> {
    let mut cmds = Vec::with_capacity(layout.runs.len() + 1);
    cmds.push(PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: layout.width,
        height: layout.height,
        rgba: opaque(layout.background),
    });
    for run in &layout.runs {
        cmds.push(PaintCommand::Text {
            x: run.rect.x,
            y: run.rect.y,
            text: run.text.clone(),
            rgba: opaque(run.color),
        });
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::{Rect, TextRun};

    #[test]
    fn background_is_painted_first() {
        let layout = BlockLayout {
            width: 40,
            height: 48,
            background: Rgb(1, 2, 3),
            runs: vec![TextRun {
                rect: Rect { x: 16, y: 16, width: 8, height: 16 },
                text: "x".into(),
                color: Rgb(9, 9, 9),
            }],
        };
        let cmds = build_display_list(&layout);
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            PaintCommand::SolidRect { width, rgba, .. } => {
                assert_eq!(*width, 40);
                assert_eq!(*rgba, (1, 2, 3, 255));
            }
            _ => panic!("unexpected"),
        }
        assert!(matches!(&cmds[1], PaintCommand::Text { text, .. } if text == "x"));
    }
}
