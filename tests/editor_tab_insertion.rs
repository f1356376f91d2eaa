use codesnap::{Editor, Key, KeyOutcome, TabSize};

#[test]
fn tab_inserts_configured_width_at_caret() {
    for (tab, width) in [(TabSize::Two, 2), (TabSize::Four, 4), (TabSize::Six, 6)] {
        let mut text = String::from("fn main() {\n}");
        let p = 12;
        let mut ed = Editor::new();
        ed.set_caret(&text, p);

        let outcome = ed.key_down(Key::Tab, &mut text, tab);

        assert_eq!(outcome, KeyOutcome::Handled);
        assert_eq!(&text[p..p + width], tab.as_str());
        assert_eq!(text.len(), "fn main() {\n}".len() + width);
        assert_eq!(ed.caret(), p + width);
        assert!(ed.is_focused());
    }
}

#[test]
fn repeated_tabs_accumulate() {
    let mut text = String::new();
    let mut ed = Editor::new();
    ed.key_down(Key::Tab, &mut text, TabSize::Four);
    ed.key_down(Key::Tab, &mut text, TabSize::Four);
    assert_eq!(text, " ".repeat(8));
    assert_eq!(ed.caret(), 8);
}

#[test]
fn caret_past_end_appends() {
    let mut text = String::from("x");
    let mut ed = Editor::new();
    ed.set_caret(&text, 99);
    ed.key_down(Key::Tab, &mut text, TabSize::Two);
    assert_eq!(text, "x  ");
    assert_eq!(ed.caret(), 3);
}
