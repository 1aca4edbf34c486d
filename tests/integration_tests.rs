//! Integration tests for the Vireo browser shell
//!
//! These tests drive the shell through its public surface and check that
//! tab bookkeeping, page subscriptions and object lifetimes stay consistent.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vireo::engine::WebView;
use vireo::shell::{PageSignals, relocate};
use vireo::toolkit::{Handle, HandlerId, Label, Object, ObjectId, RefCounted, Runtime, Widget};
use vireo::{Browser, LastTabPolicy, ShellConfig};

fn keep_one() -> ShellConfig {
    ShellConfig {
        last_tab_policy: LastTabPolicy::KeepOne,
        ..ShellConfig::default()
    }
}

fn uris(browser: &Browser) -> Vec<String> {
    browser
        .tabs()
        .iter()
        .map(|tab| tab.view().uri().unwrap_or_default())
        .collect()
}

fn page_handlers(browser: &Browser) -> Vec<(ObjectId, HandlerId)> {
    browser
        .page()
        .signals()
        .map(|signals| {
            signals
                .connections()
                .iter()
                .map(|c| (c.object(), c.handler()))
                .collect()
        })
        .unwrap_or_default()
}

fn live_page_signals(browser: &Browser) -> usize {
    browser
        .page()
        .signals()
        .map(|signals| signals.live_count(browser.runtime()))
        .unwrap_or(0)
}

fn session(rt: &Runtime) -> Browser {
    Browser::new(
        rt,
        ShellConfig::default(),
        &["https://a.example/", "https://b.example/", "https://c.example/", "https://d.example/"],
    )
}

#[test]
fn test_browser_initializes() {
    let rt = Runtime::new();
    let browser = session(&rt);
    assert_eq!(browser.tabs().len(), 4);
    assert_eq!(browser.active_index(), Some(0));
    assert_eq!(live_page_signals(&browser), PageSignals::COUNT);
}

#[test]
fn test_remove_before_active_keeps_active_tab() {
    let rt = Runtime::new();
    let mut browser = Browser::new(
        &rt,
        ShellConfig::default(),
        &["https://a.example/", "https://b.example/", "https://c.example/"],
    );
    browser.switch_tab(1).unwrap();
    let shown = browser.page().active().unwrap().view().id();

    browser.close_tab(0).unwrap();

    assert_eq!(browser.active_index(), Some(0));
    assert_eq!(browser.page().active().unwrap().view().id(), shown);
    assert_eq!(uris(&browser), vec!["https://b.example/", "https://c.example/"]);
    assert_eq!(live_page_signals(&browser), PageSignals::COUNT);
}

#[test]
fn test_reorder_moves_shown_tab_to_end() {
    let rt = Runtime::new();
    let mut browser = session(&rt);
    browser.switch_tab(1).unwrap();

    browser.move_active_tab(3).unwrap();

    assert_eq!(
        uris(&browser),
        vec!["https://a.example/", "https://c.example/", "https://d.example/", "https://b.example/"]
    );
    assert_eq!(browser.active_index(), Some(3));
    let notebook = browser.chrome().unwrap().notebook().clone();
    let shown = browser.page().active().unwrap().view().id();
    assert_eq!(notebook.page_num(shown), Some(3));
}

#[test]
fn test_switch_replaces_page_signals() {
    let rt = Runtime::new();
    let mut browser = session(&rt);
    browser.switch_tab(0).unwrap();
    let before = page_handlers(&browser);
    let handlers = rt.total_handlers();
    assert_eq!(before.len(), PageSignals::COUNT);

    browser.switch_tab(1).unwrap();

    for (object, handler) in before {
        assert!(!rt.is_connected(object, handler));
    }
    assert_eq!(live_page_signals(&browser), PageSignals::COUNT);
    assert_eq!(rt.total_handlers(), handlers);
}

#[test]
fn test_hidden_tab_loads_do_not_touch_chrome() {
    let rt = Runtime::new();
    let mut browser = session(&rt);
    let entry = browser.chrome().unwrap().entry().clone();
    let hidden = browser.tabs().get(2).unwrap().view().clone();

    hidden.load_uri("https://elsewhere.example/");
    browser.pump();

    assert_eq!(entry.text().as_deref(), Some("https://a.example/"));
}

#[test]
fn test_close_releases_every_object() {
    let rt = Runtime::new();
    let mut browser = session(&rt);
    browser.new_tab().unwrap();
    browser.navigate("rust-lang.org").unwrap();
    assert!(rt.live_objects() > 0);

    browser.close();
    browser.close();

    assert!(browser.is_closed());
    assert_eq!(rt.live_objects(), 0);
    assert_eq!(rt.total_handlers(), 0);
}

#[test]
fn test_handle_release_is_idempotent() {
    let rt = Runtime::new();
    let mut label: Handle<Label, RefCounted> = Handle::adopt(Label::create(&rt, "x"));
    let id = label.id();
    rt.add_ref(id);

    label.release();
    label.release();
    drop(label);

    assert_eq!(rt.ref_count(id), Some(1));
    rt.unref(id);
    assert!(!rt.is_alive(id));
}

#[test]
fn test_never_claimed_view_is_finalized() {
    let rt = Runtime::new();
    let view = WebView::create(&rt);
    let id = view.id();
    assert_eq!(rt.is_floating(id), Some(true));

    drop(view);

    assert!(!rt.is_alive(id));
    assert_eq!(rt.live_objects(), 0);
}

#[test]
fn test_closed_window_ends_session() {
    let rt = Runtime::new();
    let mut browser = session(&rt);
    browser.chrome().unwrap().window().destroy();
    browser.pump();

    assert!(browser.is_closed());
    assert_eq!(rt.live_objects(), 0);
}

#[derive(Debug, Clone)]
enum Op {
    Open,
    Close(usize),
    Switch(usize),
    Move(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Open),
        (0usize..8).prop_map(Op::Close),
        (0usize..8).prop_map(Op::Switch),
        (0usize..8).prop_map(Op::Move),
    ]
}

proptest! {
    #[test]
    fn test_keep_one_never_empties(ops in prop::collection::vec(op(), 1..40)) {
        let rt = Runtime::new();
        let mut browser = Browser::new(&rt, keep_one(), &["https://start.example/"]);

        for op in ops {
            let len = browser.tabs().len();
            let _ = match op {
                Op::Open => browser.new_tab().map(|_| ()),
                Op::Close(i) => browser.close_tab(i % len),
                Op::Switch(i) => browser.switch_tab(i % len),
                Op::Move(i) => browser.move_active_tab(i % len),
            };

            prop_assert!(!browser.tabs().is_empty());
            let active = browser.active_index();
            prop_assert!(active.is_some_and(|i| i < browser.tabs().len()));
            prop_assert_eq!(live_page_signals(&browser), PageSignals::COUNT);
            let shown = browser.page().active().map(|p| p.view().id());
            let at_active = active.and_then(|i| browser.tabs().get(i)).map(|t| t.view().id());
            prop_assert_eq!(shown, at_active);
        }

        browser.close();
        prop_assert_eq!(rt.live_objects(), 0);
    }

    #[test]
    fn test_relocate_only_shifts_affected_range(len in 1usize..20, a in 0usize..20, b in 0usize..20) {
        let old = a % len;
        let new = b % len;
        let mut items: Vec<usize> = (0..len).collect();

        let moved = relocate(&mut items, old, new);

        prop_assert_eq!(moved, old != new);
        prop_assert_eq!(items[new], old);
        let (lo, hi) = (old.min(new), old.max(new));
        for i in (0..lo).chain(hi + 1..len) {
            prop_assert_eq!(items[i], i);
        }
        let others: Vec<usize> = items.iter().copied().filter(|&x| x != old).collect();
        let expected: Vec<usize> = (0..len).filter(|&x| x != old).collect();
        prop_assert_eq!(others, expected);
    }
}
