#![forbid(unsafe_code)]

//! End-to-end modal stacking scenarios over the in-memory backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use velum_core::testing::MockDom;
use velum_core::{DomBackend, NodeId, UiRuntime};
use velum_modal::{CloseRequest, Modal, ModalConfig, ModalContent, ModalManager, style};

struct Fixture {
    dom: Rc<MockDom>,
    manager: Rc<ModalManager>,
    backdrop: NodeId,
}

fn fixture() -> Fixture {
    let dom = MockDom::new();
    let runtime = UiRuntime::new(dom.clone());
    let manager = ModalManager::new(runtime);
    let backdrop = dom.create_element(None);
    manager.set_blur_target(backdrop);
    Fixture {
        dom,
        manager,
        backdrop,
    }
}

fn open_modal(f: &Fixture, config: ModalConfig) -> Rc<Modal> {
    let root = f.dom.create_element(None);
    let body = f.dom.create_element(Some(root));
    let modal = Modal::build(&f.manager, root, body, Box::new(()), config);
    modal.open();
    f.dom.run_deferred();
    modal
}

#[test]
fn lifo_stack_assigns_increasing_levels() {
    let f = fixture();
    let d1 = open_modal(&f, ModalConfig::new());
    let d2 = open_modal(&f, ModalConfig::new());
    let d3 = open_modal(&f, ModalConfig::new());

    assert_eq!(d1.level(), 0);
    assert_eq!(d2.level(), 1);
    assert_eq!(d3.level(), 2);
    assert!(!f.dom.has_class(d1.root(), style::TIERS[0]));
    assert!(f.dom.has_class(d2.root(), style::TIERS[0]));
    assert!(f.dom.has_class(d3.root(), style::TIERS[1]));
    assert_eq!(f.manager.open_modals(), vec![d1.id(), d2.id(), d3.id()]);

    d3.close();
    assert!(f.dom.has_class(f.backdrop, style::BLUR));
    d2.close();
    assert!(f.dom.has_class(f.backdrop, style::BLUR));
    d1.close();
    assert!(!f.dom.has_class(f.backdrop, style::BLUR));
    assert_eq!(f.manager.depth(), 0);
}

#[test]
fn levels_are_not_recomputed_on_non_lifo_close() {
    let f = fixture();
    let m1 = open_modal(&f, ModalConfig::new());
    assert_eq!(m1.level(), 0);
    assert!(f.dom.has_class(f.backdrop, style::BLUR));

    let m2 = open_modal(&f, ModalConfig::new());
    assert_eq!(m2.level(), 1);

    m1.close();
    // m2 keeps its level; the next open reuses the freed depth.
    let m3 = open_modal(&f, ModalConfig::new());
    assert_eq!(m2.level(), 1);
    assert_eq!(m3.level(), 1);

    m2.close();
    assert!(f.dom.has_class(f.backdrop, style::BLUR));
    m3.close();
    assert!(!f.dom.has_class(f.backdrop, style::BLUR));
}

#[test]
fn deep_stacks_clamp_to_the_last_tier() {
    let f = fixture();
    let modals: Vec<_> = (0..8).map(|_| open_modal(&f, ModalConfig::new())).collect();
    assert_eq!(modals[7].level(), 7);
    assert!(f.dom.has_class(modals[6].root(), style::TIERS[5]));
    assert!(f.dom.has_class(modals[7].root(), style::TIERS[5]));
}

struct Vetoing;

impl ModalContent for Vetoing {
    fn on_close_requested(&mut self, _request: CloseRequest) {}
}

#[test]
fn vetoed_close_leaves_stack_and_backdrop_untouched() {
    let f = fixture();
    let root = f.dom.create_element(None);
    let body = f.dom.create_element(Some(root));
    let modal = Modal::build(&f.manager, root, body, Box::new(Vetoing), ModalConfig::new());
    modal.open();
    f.dom.run_deferred();

    let before = f.manager.open_modals();
    modal.close();
    assert!(modal.is_open());
    assert_eq!(f.manager.open_modals(), before);
    assert!(f.dom.has_class(f.backdrop, style::BLUR));
    assert!(f.dom.has_class(modal.root(), style::SHOW));
}

#[test]
fn global_handlers_observe_every_transition() {
    let f = fixture();
    let log = Rc::new(RefCell::new(Vec::new()));
    let opens = Rc::clone(&log);
    f.manager.add_open_handler(move |stack, id| {
        opens.borrow_mut().push(("open", stack.len(), id));
    });
    let closes = Rc::clone(&log);
    f.manager.add_close_handler(move |stack, id| {
        closes.borrow_mut().push(("close", stack.len(), id));
    });

    let m1 = open_modal(&f, ModalConfig::new());
    let m2 = open_modal(&f, ModalConfig::new());
    m2.close();
    m1.close();

    let log = log.borrow();
    assert_eq!(
        *log,
        vec![
            ("open", 0, m1.id()),
            ("open", 1, m2.id()),
            ("close", 1, m2.id()),
            ("close", 0, m1.id()),
        ]
    );
}

#[test]
fn failing_global_handler_does_not_disturb_the_close() {
    let f = fixture();
    f.manager.add_close_handler(|_, _| panic!("handler failure"));
    let reached = Rc::new(Cell::new(false));
    let flag = Rc::clone(&reached);
    f.manager.add_close_handler(move |_, _| flag.set(true));

    let modal = open_modal(&f, ModalConfig::new());
    modal.close();
    assert!(!modal.is_open());
    assert!(reached.get());
    assert!(!f.dom.has_class(f.backdrop, style::BLUR));
}

proptest! {
    #[test]
    fn backdrop_and_stack_track_arbitrary_open_close_sequences(
        ops in prop::collection::vec((0usize..3, any::<bool>()), 0..40),
    ) {
        let f = fixture();
        let modals: Vec<Rc<Modal>> = (0..3)
            .map(|_| {
                let root = f.dom.create_element(None);
                let body = f.dom.create_element(Some(root));
                Modal::build(&f.manager, root, body, Box::new(()), ModalConfig::new())
            })
            .collect();

        let mut model: Vec<usize> = Vec::new();
        for (index, open) in ops {
            if open {
                modals[index].open();
                f.dom.run_deferred();
                if !model.contains(&index) {
                    model.push(index);
                }
            } else {
                modals[index].close();
                model.retain(|entry| *entry != index);
            }
        }

        let expected: Vec<_> = model.iter().map(|entry| modals[*entry].id()).collect();
        prop_assert_eq!(f.manager.open_modals(), expected);
        prop_assert_eq!(
            f.dom.has_class(f.backdrop, style::BLUR),
            !model.is_empty()
        );
    }
}

#[test]
fn reopening_moves_a_modal_to_the_top() {
    let f = fixture();
    let m1 = open_modal(&f, ModalConfig::new());
    let m2 = open_modal(&f, ModalConfig::new());

    m1.close();
    m1.open();
    assert_eq!(m1.level(), 1);
    assert_eq!(f.manager.open_modals(), vec![m2.id(), m1.id()]);
    assert!(f.dom.has_class(m1.root(), style::TIERS[0]));
}
