//! End-to-end tests: document in, laid-out render tree out.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use krb_runtime::{
    AdjustContext, AdjustError, Alignment, Direction, DocumentBuilder, DrawCommand, DrawList,
    Edges, ElementId, ElementSpec, ElementType, EventType, GeometryPatch, HandlerRegistry,
    PropertyDecl, PropValue, Rect, RenderTree, Rgba, Session, SessionOptions, TemplateWriter,
};

// =============================================================================
// Log capture
// =============================================================================

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with warnings routed into a buffer.
fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (out, logs)
}

// =============================================================================
// Helpers
// =============================================================================

fn options(width: i32, height: i32) -> SessionOptions {
    SessionOptions::default().viewport(width, height)
}

fn id(index: usize) -> ElementId {
    ElementId(index as u32)
}

/// Element types and text of a subtree, ignoring ids.
fn shape(tree: &RenderTree<'_>, id: ElementId) -> String {
    let element = tree.get(id).unwrap();
    let children: Vec<String> = tree.children(id).iter().map(|&c| shape(tree, c)).collect();
    format!(
        "{:?}<{}>[{}]",
        element.element_type(),
        element.text.as_deref().unwrap_or(""),
        children.join(",")
    )
}

fn card_template() -> TemplateWriter {
    let mut t = TemplateWriter::new();
    let root = t.push(ElementSpec::container().background(Rgba::GRAY).padding(4), None);
    t.push(ElementSpec::label("$title"), Some(root));
    t.push(ElementSpec::container().slot(), Some(root));
    t
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_space_between_row() {
    let mut b = DocumentBuilder::new();
    let app = b.push(
        ElementSpec::app().direction(Direction::Row).align(Alignment::SpaceBetween),
        None,
    );
    let a = b.push(ElementSpec::container().size(100, 50), Some(app));
    let c = b.push(ElementSpec::container().size(50, 50), Some(app));
    let d = b.push(ElementSpec::container().size(150, 50), Some(app));
    let doc = b.build();

    let mut session = Session::load(&doc, HandlerRegistry::new(), options(700, 500)).unwrap();
    session.frame();

    let xs: Vec<i32> = [a, c, d].iter().map(|&i| session.get(id(i)).unwrap().rect.x).collect();
    assert_eq!(xs, vec![0, 300, 550]);
    assert_eq!(session.get(id(app)).unwrap().rect, Rect::new(0, 0, 700, 500));
}

#[test]
fn test_every_element_has_visible_size() {
    let mut b = DocumentBuilder::new();
    b.component("Card", vec![PropertyDecl::new("title", PropValue::None)], &card_template());
    let app = b.push(ElementSpec::app().direction(Direction::Column), None);
    b.push(ElementSpec::container(), Some(app));
    b.push(ElementSpec::label(""), Some(app));
    b.push(ElementSpec::container().hidden(), Some(app));
    b.push(ElementSpec::new(ElementType::Image).image("missing.png"), Some(app));
    b.push(ElementSpec::instance("Card"), Some(app));
    b.push(ElementSpec::instance("Ghost"), Some(app));
    let doc = b.build();

    let mut session = Session::load(&doc, HandlerRegistry::new(), options(320, 240)).unwrap();
    session.frame();
    for element in session.tree().elements() {
        assert!(element.rect.width >= 1, "{} has width {}", element.id, element.rect.width);
        assert!(element.rect.height >= 1, "{} has height {}", element.id, element.rect.height);
    }
}

// =============================================================================
// Styles
// =============================================================================

#[test]
fn test_border_color_alone_draws_one_unit_border() {
    let mut b = DocumentBuilder::new();
    let app = b.push(ElementSpec::app(), None);
    let boxed = b.push(ElementSpec::container().size(40, 40).border_color(Rgba::RED), Some(app));
    let doc = b.build();

    let session = Session::load(&doc, HandlerRegistry::new(), options(100, 100)).unwrap();
    let visual = &session.get(id(boxed)).unwrap().visual;
    assert_eq!(visual.border, Edges::uniform(1));
    assert_eq!(visual.border_color, Some(Rgba::RED));
}

#[test]
fn test_text_color_inherits_from_nearest_explicit_ancestor() {
    let mut b = DocumentBuilder::new();
    let app = b.push(ElementSpec::app().foreground(Rgba::RED), None);
    let plain = b.push(ElementSpec::container(), Some(app));
    let inherited = b.push(ElementSpec::label("a"), Some(plain));
    let blue = b.push(ElementSpec::container().foreground(Rgba::BLUE), Some(app));
    let nested = b.push(ElementSpec::label("b"), Some(blue));
    let own = b.push(ElementSpec::label("c").foreground(Rgba::GREEN), Some(blue));
    let doc = b.build();

    let session = Session::load(&doc, HandlerRegistry::new(), options(100, 100)).unwrap();
    let color = |i| session.get(id(i)).unwrap().text_style.color;
    assert_eq!(color(inherited), Rgba::RED);
    assert_eq!(color(nested), Rgba::BLUE);
    assert_eq!(color(own), Rgba::GREEN);
}

// =============================================================================
// Components
// =============================================================================

#[test]
fn test_unregistered_component_warns_and_stays_empty() {
    let mut b = DocumentBuilder::new();
    let app = b.push(ElementSpec::app(), None);
    let ghost = b.push(ElementSpec::instance("Ghost"), Some(app));
    b.push(ElementSpec::label("usage"), Some(ghost));
    let doc = b.build();

    let (session, logs) =
        capture_warnings(|| Session::load(&doc, HandlerRegistry::new(), options(100, 100)).unwrap());
    assert!(session.children(id(ghost)).is_empty());
    assert!(logs.contains("Ghost"), "logs: {logs}");
    assert!(logs.contains("WARN"), "logs: {logs}");
}

#[test]
fn test_sibling_instances_are_identical_but_distinct() {
    let mut b = DocumentBuilder::new();
    b.component("Card", vec![PropertyDecl::new("title", PropValue::None)], &card_template());
    let app = b.push(ElementSpec::app(), None);
    let first = b.push(ElementSpec::instance("Card").custom_str("title", "Hello"), Some(app));
    let second = b.push(ElementSpec::instance("Card").custom_str("title", "Hello"), Some(app));
    let doc = b.build();

    let session = Session::load(&doc, HandlerRegistry::new(), options(200, 200)).unwrap();
    let tree = session.tree();
    assert_eq!(shape(&tree, id(first)), shape(&tree, id(second)));
    assert!(shape(&tree, id(first)).contains("Hello"));

    let ours = session.arena().descendants(id(first));
    let theirs = session.arena().descendants(id(second));
    assert_eq!(ours.len(), theirs.len());
    assert!(ours.iter().all(|i| !theirs.contains(i)));
}

#[test]
fn test_reexpand_keeps_usage_children() {
    let mut b = DocumentBuilder::new();
    b.component("Card", vec![], &card_template());
    let app = b.push(ElementSpec::app(), None);
    let card = b.push(ElementSpec::instance("Card"), Some(app));
    let body = b.push(ElementSpec::label("body"), Some(card));
    let doc = b.build();

    let mut session = Session::load(&doc, HandlerRegistry::new(), options(200, 200)).unwrap();
    let before = session.children(id(card)).to_vec();
    let after = session.reexpand(id(card)).unwrap();
    assert_ne!(before, after);
    assert!(session.get(before[0]).is_none());
    let slot = session.tree().parent(id(body)).unwrap();
    assert!(session.get(slot).unwrap().slot);
    assert!(session.is_dirty());
}

// =============================================================================
// Adjustment
// =============================================================================

#[test]
fn test_tab_bar_docks_to_bottom() {
    let mut bar = TemplateWriter::new();
    let row = bar.push(ElementSpec::container().size(400, 40).background(Rgba::GRAY), None);
    bar.push(ElementSpec::button("Home"), Some(row));

    let mut b = DocumentBuilder::new();
    b.component("TabBar", vec![PropertyDecl::new("position", PropValue::None)], &bar);
    let app = b.push(ElementSpec::app().direction(Direction::Column), None);
    let tabs = b.push(ElementSpec::instance("TabBar").custom_str("position", "bottom"), Some(app));
    let content = b.push(ElementSpec::container().grow(), Some(app));
    let doc = b.build();

    let mut session =
        Session::load(&doc, HandlerRegistry::with_builtin_handlers(), options(400, 300)).unwrap();
    let stats = session.frame();
    assert_eq!(stats.adjusted, 1);
    assert_eq!(stats.adjust_failures, 0);

    assert_eq!(session.get(id(tabs)).unwrap().rect, Rect::new(0, 260, 400, 40));
    assert_eq!(session.get(id(content)).unwrap().rect, Rect::new(0, 0, 400, 260));
    let bar_root = session.children(id(tabs))[0];
    assert_eq!(session.get(bar_root).unwrap().rect.y, 260);
}

#[test]
fn test_tab_bar_rejects_unknown_position() {
    let mut bar = TemplateWriter::new();
    bar.push(ElementSpec::container().size(100, 20), None);

    let mut b = DocumentBuilder::new();
    b.component("TabBar", vec![], &bar);
    let app = b.push(ElementSpec::app().direction(Direction::Column), None);
    b.push(ElementSpec::instance("TabBar").custom_str("position", "middle"), Some(app));
    let doc = b.build();

    let mut session =
        Session::load(&doc, HandlerRegistry::with_builtin_handlers(), options(100, 100)).unwrap();
    let (stats, logs) = capture_warnings(|| session.frame());
    assert_eq!(stats.adjust_failures, 1);
    assert!(logs.contains("middle"), "logs: {logs}");
}

fn shove_then_fail(
    target: ElementId,
    _ctx: &AdjustContext<'_>,
    patch: &mut GeometryPatch,
) -> Result<(), AdjustError> {
    patch.set_rect(target, Rect::new(5, 5, 10, 10));
    Err(AdjustError::Other("gave up halfway".into()))
}

#[test]
fn test_failed_adjuster_patch_still_applies() {
    let mut panel = TemplateWriter::new();
    panel.push(ElementSpec::container().size(30, 30), None);

    let mut b = DocumentBuilder::new();
    b.component("Panel", vec![], &panel);
    let app = b.push(ElementSpec::app(), None);
    let inst = b.push(ElementSpec::instance("Panel"), Some(app));
    let doc = b.build();

    let mut registry = HandlerRegistry::new();
    registry.register_adjuster("Panel", shove_then_fail);
    let mut session = Session::load(&doc, registry, options(100, 100)).unwrap();

    let (stats, logs) = capture_warnings(|| session.frame());
    assert_eq!(stats.adjusted, 1);
    assert_eq!(stats.adjust_failures, 1);
    assert!(logs.contains("gave up halfway"), "logs: {logs}");
    assert_eq!(session.get(id(inst)).unwrap().rect, Rect::new(5, 5, 10, 10));
}

// =============================================================================
// Input and output
// =============================================================================

#[test]
fn test_click_invokes_bound_callback() {
    let mut b = DocumentBuilder::new();
    let app = b.push(ElementSpec::app(), None);
    let save = b.push(ElementSpec::button("Save").size(80, 30).on(EventType::Click, "save"), Some(app));
    let doc = b.build();

    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    let mut registry = HandlerRegistry::new();
    registry.register_callback("save", move || counter.set(counter.get() + 1));

    let mut session = Session::load(&doc, registry, options(200, 100)).unwrap();
    session.frame();

    assert_eq!(session.hit_test(10, 10), Some(id(save)));
    assert_eq!(session.hit_test(150, 50), Some(id(app)));
    assert_eq!(session.hit_test(250, 50), None);

    assert!(session.click(10, 10));
    assert!(!session.click(150, 50));
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_paint_visits_background_then_text() {
    let mut b = DocumentBuilder::new();
    let app = b.push(ElementSpec::app().background(Rgba::BLUE), None);
    b.push(ElementSpec::label("Hi").foreground(Rgba::WHITE), Some(app));
    let doc = b.build();

    let mut session = Session::load(&doc, HandlerRegistry::new(), options(100, 50)).unwrap();
    session.frame();
    let mut list = DrawList::new();
    assert_eq!(session.paint(&mut list), 2);
    assert!(matches!(list.commands[0], DrawCommand::Fill { color: Rgba::BLUE, .. }));
    assert!(matches!(
        &list.commands[1],
        DrawCommand::Text { text, color: Rgba::WHITE, .. } if text == "Hi"
    ));
}
