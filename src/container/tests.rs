use std::{cell::Cell, rc::Rc};

use super::*;
use crate::{
    element::Capabilities,
    input::{
        Axis, AxisEvent, AxisSource, ButtonEvent, ButtonEventKind, ButtonState, KeyState, KeyboardEvent,
        Keysym, Modifiers, PointerMotionEvent, BTN_LEFT, BTN_RIGHT,
    },
    testing::{init_logging, FakeElement, FakeParent},
    utils::{signaling::Signaler, Point},
};

fn fake_at(x: i32, y: i32, w: i32, h: i32) -> (Element, Rc<FakeElement>) {
    let (element, fake) = FakeElement::create(Rectangle::from_size((w, h)));
    element.set_position(Point::new(x, y));
    (element, fake)
}

fn visible_container() -> Container {
    let container = Container::new(DefaultContainer);
    container.element().set_visible(true);
    container
}

fn motion(x: f64, y: f64) -> PointerMotionEvent {
    PointerMotionEvent::new(x, y, 0)
}

fn left(kind: ButtonEventKind) -> ButtonEvent {
    ButtonEvent::new(BTN_LEFT, kind, 0)
}

fn counter<S: 'static>(signaler: &Signaler<S>) -> (Rc<Cell<u32>>, SignalToken) {
    let count = Rc::new(Cell::new(0));
    let token = signaler.register({
        let count = count.clone();
        move |_| count.set(count.get() + 1)
    });
    (count, token)
}

fn assert_focus_is_visible_child(container: &Container) {
    if let Some(focus) = container.pointer_focus() {
        assert!(container.contains(&focus), "pointer focus {} is not a child", focus.id());
        assert!(focus.is_visible(), "pointer focus {} is hidden", focus.id());
    }
}

#[test]
fn children_are_ordered_topmost_first() {
    init_logging();
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, _) = fake_at(0, 0, 1, 1);
    let (b, _) = fake_at(0, 0, 1, 1);
    let (c, _) = fake_at(0, 0, 1, 1);

    root.add_child(&a);
    root.add_child(&b);
    root.add_child_above(None, &c);
    assert_eq!(root.children(), vec![b.clone(), a.clone(), c.clone()]);
    assert_eq!(a.parent().as_ref(), Some(root));

    let tree = root.scene_tree().expect("root container has a tree");
    let nodes = |elements: &[&Element]| -> Vec<SceneNode> {
        elements.iter().filter_map(|e| e.visual_node()).collect()
    };
    assert_eq!(tree.children(), nodes(&[&c, &a, &b]));

    let (d, _) = fake_at(0, 0, 1, 1);
    root.add_child_above(Some(&a), &d);
    assert_eq!(root.children(), vec![b.clone(), d.clone(), a.clone(), c.clone()]);
    assert_eq!(tree.children(), nodes(&[&c, &a, &d, &b]));

    root.raise_to_top(&c);
    assert_eq!(root.children()[0], c);
    assert!(c.visual_node().map_or(false, |node| node.is_topmost()));

    for element in [&a, &b, &c, &d] {
        root.remove_child(element);
        assert!(element.parent().is_none());
        assert!(element.visual_node().is_none());
        element.destroy();
    }
    assert!(root.children().is_empty());
}

#[test]
fn scene_tree_attaches_existing_children_bottom_first() {
    let parent = FakeParent::new();
    let container = visible_container();
    let (a, _) = fake_at(0, 0, 1, 1);
    let (b, _) = fake_at(0, 0, 1, 1);
    container.add_child(&a);
    container.add_child(&b);
    assert!(container.scene_tree().is_none());
    assert!(a.visual_node().is_none());

    parent.container().add_child(container.element());
    let tree = container.scene_tree().expect("attached container has a tree");
    assert_eq!(container.element().visual_node(), Some(tree.clone()));
    let expected: Vec<SceneNode> = [&a, &b].iter().filter_map(|e| e.visual_node()).collect();
    assert_eq!(expected.len(), 2);
    assert_eq!(tree.children(), expected);

    // detaching releases the children's nodes, attaching again recreates them
    parent.container().remove_child(container.element());
    assert!(container.scene_tree().is_none());
    assert!(!tree.is_alive());
    assert!(a.visual_node().is_none());
    assert!(b.visual_node().is_none());

    parent.container().add_child(container.element());
    assert!(a.visual_node().map_or(false, |node| node.is_alive()));

    parent.container().remove_child(container.element());
    container.destroy();
}

#[test]
fn bounding_box_covers_visible_children() {
    let container = visible_container();
    assert_eq!(container.bounding_box(), Rectangle::zero());

    let (a, _) = fake_at(0, 0, 10, 10);
    let (b, _) = fake_at(20, 5, 5, 5);
    container.add_child(&a);
    container.add_child(&b);
    assert_eq!(container.bounding_box(), Rectangle::from_loc_and_size((0, 0), (25, 10)));
    assert_eq!(container.element().dimensions(), container.bounding_box());

    b.set_visible(false);
    assert_eq!(container.bounding_box(), Rectangle::from_loc_and_size((0, 0), (10, 10)));
    a.set_visible(false);
    assert_eq!(container.bounding_box(), Rectangle::zero());

    container.destroy();
}

#[test]
fn pointer_area_is_union_of_children_areas() {
    let container = visible_container();
    let (a, fake) = fake_at(5, 5, 10, 10);
    fake.pointer_area.set(Some(Rectangle::from_loc_and_size((-2, -2), (14, 14))));
    container.add_child(&a);
    assert_eq!(
        container.element().pointer_area(),
        Rectangle::from_loc_and_size((3, 3), (14, 14))
    );
    container.destroy();
}

#[test]
fn topmost_child_wins_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake_a) = fake_at(0, 0, 10, 10);
    let (b, fake_b) = fake_at(0, 0, 10, 10);
    root.add_child(&a);
    root.add_child(&b);

    assert!(root.element().pointer_motion(&motion(5.0, 5.0)));
    assert_eq!(root.pointer_focus(), Some(b.clone()));
    assert!(b.pointer_inside());
    assert_eq!(fake_a.motion_count.get(), 0);

    root.raise_to_top(&a);
    assert_eq!(root.pointer_focus(), Some(a.clone()));
    assert!(a.pointer_inside());
    assert!(!b.pointer_inside());
    assert_eq!(fake_a.last_motion.get(), Some(motion(5.0, 5.0)));
    assert!(fake_b.blur_count.get() >= 1);
}

#[test]
fn motion_is_translated_into_child_space() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake) = fake_at(100, 50, 10, 10);
    root.add_child(&a);

    assert!(!root.element().pointer_motion(&motion(5.0, 5.0)));
    assert!(root.pointer_focus().is_none());
    assert!(!root.element().pointer_inside());

    assert!(root.element().pointer_motion(&motion(101.0, 52.0)));
    assert_eq!(fake.last_motion.get(), Some(motion(1.0, 2.0)));
    assert!(root.element().pointer_inside());
}

#[test]
fn invisible_children_do_not_get_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, _) = fake_at(0, 0, 10, 10);
    let (b, _) = fake_at(0, 0, 10, 10);
    root.add_child(&b);
    root.add_child(&a);
    a.set_visible(false);

    root.element().pointer_motion(&motion(1.0, 1.0));
    assert_eq!(root.pointer_focus(), Some(b.clone()));

    a.set_visible(true);
    assert_eq!(root.pointer_focus(), Some(a.clone()));
    assert!(!b.pointer_inside());

    b.set_visible(false);
    a.set_visible(false);
    assert!(root.pointer_focus().is_none());
    assert!(!a.pointer_inside());
    assert!(!root.element().pointer_inside());
}

#[test]
fn moving_a_child_recomputes_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (background, _) = fake_at(0, 0, 100, 100);
    let (a, _) = fake_at(0, 0, 10, 10);
    root.add_child(&background);
    root.add_child(&a);
    let (left_count, _token) = counter(a.pointer_leave_signal());

    root.element().pointer_motion(&motion(5.0, 5.0));
    assert_eq!(root.pointer_focus(), Some(a.clone()));

    a.set_position(Point::new(20, 0));
    assert_eq!(root.pointer_focus(), Some(background.clone()));
    assert_eq!(left_count.get(), 1);

    a.set_position(Point::new(0, 0));
    assert_eq!(root.pointer_focus(), Some(a.clone()));
}

#[test]
fn click_requires_release_on_pressed_child() {
    init_logging();
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake_a) = fake_at(0, 0, 1, 1);
    let (b, fake_b) = fake_at(10, 10, 10, 10);
    root.add_child(&a);
    root.add_child_above(None, &b);

    root.element().pointer_motion(&motion(0.0, 0.0));
    assert_eq!(root.pointer_focus(), Some(a.clone()));

    assert!(root.element().pointer_button(&left(ButtonEventKind::Down)));
    assert_eq!(fake_a.last_button.get(), Some(left(ButtonEventKind::Down)));
    assert_eq!(root.left_button_down(), Some(a.clone()));

    root.element().pointer_motion(&motion(10.0, 10.0));
    assert_eq!(root.pointer_focus(), Some(b.clone()));

    assert!(root.element().pointer_button(&left(ButtonEventKind::Up)));
    assert_eq!(fake_a.last_button.get(), Some(left(ButtonEventKind::Up)));
    assert_eq!(fake_b.button_count.get(), 0);

    assert!(!root.element().pointer_button(&left(ButtonEventKind::Click)));
    assert_eq!(fake_a.button_count.get(), 2);
    assert_eq!(fake_b.button_count.get(), 0);
}

#[test]
fn click_on_same_child_is_delivered() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake) = fake_at(0, 0, 10, 10);
    root.add_child(&a);
    root.element().pointer_motion(&motion(2.0, 2.0));

    assert!(root.pointer_button_raw(BTN_LEFT, ButtonState::Pressed, 1));
    assert!(root.pointer_button_raw(BTN_LEFT, ButtonState::Released, 2));
    assert_eq!(fake.button_count.get(), 3);
    assert_eq!(fake.last_button.get(), Some(ButtonEvent::new(BTN_LEFT, ButtonEventKind::Click, 2)));
}

#[test]
fn rejected_press_clears_pressed_child() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake) = fake_at(0, 0, 10, 10);
    root.add_child(&a);
    root.element().pointer_motion(&motion(2.0, 2.0));

    assert!(root.element().pointer_button(&left(ButtonEventKind::Down)));
    assert_eq!(root.left_button_down(), Some(a.clone()));
    fake.accept_buttons.set(false);
    assert!(!root.element().pointer_button(&left(ButtonEventKind::Down)));
    assert!(root.left_button_down().is_none());
    assert!(!root.element().pointer_button(&left(ButtonEventKind::Up)));
}

#[test]
fn other_buttons_and_axis_follow_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake) = fake_at(0, 0, 10, 10);
    root.add_child(&a);

    let right = ButtonEvent::new(BTN_RIGHT, ButtonEventKind::Down, 0);
    let axis = AxisEvent {
        source: AxisSource::Wheel,
        orientation: Axis::Vertical,
        delta: 15.0,
        delta_discrete: 120,
        time_msec: 0,
    };
    assert!(!root.element().pointer_button(&right));
    assert!(!root.element().pointer_axis(&axis));

    root.element().pointer_motion(&motion(2.0, 2.0));
    assert!(root.element().pointer_button(&right));
    assert!(root.element().pointer_axis(&axis));
    assert_eq!(fake.last_button.get(), Some(right));
    assert_eq!(fake.last_axis.get(), Some(axis));
    assert!(root.left_button_down().is_none());
}

#[test]
fn nested_containers_enter_and_leave() {
    init_logging();
    let parent = FakeParent::new();
    let p = parent.container();
    let c = visible_container();
    c.element().set_position(Point::new(10, 0));
    let (e, fake) = fake_at(0, 20, 10, 10);
    c.add_child(&e);
    p.add_child(c.element());

    let (p_enter, _t1) = counter(p.element().pointer_enter_signal());
    let (c_enter, _t2) = counter(c.element().pointer_enter_signal());
    let (e_enter, _t3) = counter(e.pointer_enter_signal());
    let (p_leave, _t4) = counter(p.element().pointer_leave_signal());
    let (c_leave, _t5) = counter(c.element().pointer_leave_signal());
    let (e_leave, _t6) = counter(e.pointer_leave_signal());

    assert!(p.element().pointer_motion(&motion(11.0, 22.0)));
    assert_eq!(fake.last_motion.get(), Some(motion(1.0, 2.0)));
    for element in [p.element(), c.element(), &e] {
        assert!(element.pointer_inside());
    }
    assert_eq!((p_enter.get(), c_enter.get(), e_enter.get()), (1, 1, 1));

    p.element().pointer_motion(&motion(12.0, 23.0));
    assert_eq!((p_enter.get(), c_enter.get(), e_enter.get()), (1, 1, 1));

    p.element().pointer_blur();
    for element in [p.element(), c.element(), &e] {
        assert!(!element.pointer_inside());
    }
    assert_eq!((p_leave.get(), c_leave.get(), e_leave.get()), (1, 1, 1));
    assert!(p.pointer_focus().is_none());
    assert!(c.pointer_focus().is_none());
}

#[test]
fn grab_routes_all_pointer_events_to_holder() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake_a) = fake_at(0, 0, 10, 10);
    let (b, fake_b) = fake_at(20, 0, 10, 10);
    root.add_child(&a);
    root.add_child(&b);

    root.element().pointer_motion(&motion(5.0, 5.0));
    root.pointer_grab(&a);
    assert_eq!(root.pointer_grab_holder(), Some(a.clone()));
    fake_a.reset();
    fake_b.reset();

    root.element().pointer_motion(&motion(25.0, 5.0));
    assert_eq!(fake_a.last_motion.get(), Some(motion(25.0, 5.0)));
    assert_eq!(fake_b.motion_count.get(), 0);

    assert!(root.element().pointer_button(&left(ButtonEventKind::Down)));
    assert_eq!(fake_a.button_count.get(), 1);
    let axis = AxisEvent {
        source: AxisSource::Finger,
        orientation: Axis::Horizontal,
        delta: 1.5,
        delta_discrete: 0,
        time_msec: 0,
    };
    assert!(root.element().pointer_axis(&axis));
    assert_eq!(fake_a.axis_count.get(), 1);
    assert_eq!(fake_b.button_count.get() + fake_b.axis_count.get(), 0);

    // another child taking the grab cancels the holder exactly once
    root.pointer_grab(&b);
    assert_eq!(fake_a.grab_cancel_count.get(), 1);
    assert_eq!(fake_b.grab_cancel_count.get(), 0);
    assert_eq!(root.pointer_grab_holder(), Some(b.clone()));

    // only the holder can release
    root.pointer_grab_release(&a);
    assert_eq!(root.pointer_grab_holder(), Some(b.clone()));

    root.pointer_grab_release(&b);
    assert!(root.pointer_grab_holder().is_none());
    assert_eq!(root.pointer_focus(), Some(b.clone()));
    assert_eq!(fake_b.last_motion.get(), Some(motion(5.0, 5.0)));
    assert_eq!(fake_a.grab_cancel_count.get(), 1);
}

#[test]
fn grab_blurs_other_focus_child() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, _) = fake_at(0, 0, 10, 10);
    let (b, _) = fake_at(20, 0, 10, 10);
    root.add_child(&a);
    root.add_child(&b);

    root.element().pointer_motion(&motion(5.0, 5.0));
    assert!(a.pointer_inside());
    root.pointer_grab(&b);
    assert!(!a.pointer_inside());
    assert!(root.pointer_focus().is_none());
}

#[test]
fn grab_propagates_through_ancestors() {
    let parent = FakeParent::new();
    let p = parent.container();
    let c = visible_container();
    let (e, fake_e) = fake_at(0, 0, 10, 10);
    let (d, _) = fake_at(50, 50, 10, 10);
    c.add_child(&e);
    p.add_child(c.element());
    p.add_child(&d);
    fake_e.reset();

    c.pointer_grab(&e);
    assert_eq!(c.pointer_grab_holder(), Some(e.clone()));
    assert_eq!(p.pointer_grab_holder(), Some(c.element().clone()));

    p.element().pointer_motion(&motion(55.0, 55.0));
    assert_eq!(fake_e.last_motion.get(), Some(motion(55.0, 55.0)));
    assert!(p.pointer_focus().map_or(true, |focus| focus != d));

    // a sibling of the holding container takes over the grab
    p.pointer_grab(&d);
    assert_eq!(fake_e.grab_cancel_count.get(), 1);
    assert!(c.pointer_grab_holder().is_none());
    assert_eq!(p.pointer_grab_holder(), Some(d.clone()));

    p.pointer_grab_release(&d);
    assert_eq!(p.pointer_focus(), Some(d.clone()));
}

#[test]
fn nested_release_reaches_root() {
    let parent = FakeParent::new();
    let p = parent.container();
    let c = visible_container();
    let (e, _) = fake_at(0, 0, 10, 10);
    c.add_child(&e);
    p.add_child(c.element());

    p.element().pointer_motion(&motion(1.0, 1.0));
    c.pointer_grab(&e);
    c.pointer_grab_release(&e);
    assert!(c.pointer_grab_holder().is_none());
    assert!(p.pointer_grab_holder().is_none());
    assert_eq!(p.pointer_focus(), Some(c.element().clone()));
    assert_eq!(c.pointer_focus(), Some(e.clone()));
}

#[test]
fn removing_the_grab_holder_refocuses_root() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, fake_a) = fake_at(0, 0, 10, 10);
    let (b, _) = fake_at(20, 0, 10, 10);
    root.add_child(&a);
    root.add_child(&b);
    fake_a.reset();

    root.element().pointer_motion(&motion(5.0, 5.0));
    root.pointer_grab(&a);
    assert!(!root.element().pointer_motion(&motion(25.0, 5.0)));
    assert!(!root.element().pointer_inside());

    root.remove_child(&a);
    assert_eq!(fake_a.grab_cancel_count.get(), 1);
    assert!(root.pointer_grab_holder().is_none());
    assert_eq!(root.pointer_focus(), Some(b.clone()));
    assert!(b.pointer_inside());
    assert!(root.element().pointer_inside());
    a.destroy();
}

#[test]
fn layout_change_outside_root_assigns_no_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, _) = fake_at(0, 0, 10, 10);
    root.add_child(&a);
    root.element().pointer_motion(&motion(1.0, 1.0));
    assert!(!root.element().pointer_motion(&motion(50.0, 50.0)));

    let (b, fake_b) = fake_at(40, 40, 20, 20);
    root.add_child(&b);
    assert!(root.pointer_focus().is_none());
    assert_eq!(fake_b.motion_count.get(), 0);
    assert!(!b.pointer_inside());
}

#[test]
fn enter_handler_removing_the_child_denies_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (a, _) = fake_at(0, 0, 10, 10);
    root.add_child(&a);
    let (leaves, _leave_token) = counter(a.pointer_leave_signal());
    let _token = a.pointer_enter_signal().register({
        let root = root.clone();
        let a = a.downgrade();
        move |_| {
            if let Some(a) = a.upgrade() {
                if root.contains(&a) {
                    root.remove_child(&a);
                }
            }
        }
    });

    assert!(!root.element().pointer_motion(&motion(1.0, 1.0)));
    assert!(root.pointer_focus().is_none());
    assert!(a.parent().is_none());
    assert!(!a.pointer_inside());
    assert_eq!(leaves.get(), 1);

    // buttons must not reach the detached element
    assert!(!root.element().pointer_button(&left(ButtonEventKind::Down)));
    a.destroy();
}

#[test]
fn enter_handler_hiding_the_child_denies_focus() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (background, _) = fake_at(0, 0, 100, 100);
    let (a, _) = fake_at(0, 0, 10, 10);
    root.add_child(&background);
    root.add_child(&a);
    let _token = a.pointer_enter_signal().register({
        let a = a.downgrade();
        move |_| {
            if let Some(a) = a.upgrade() {
                a.set_visible(false);
            }
        }
    });

    assert!(root.element().pointer_motion(&motion(1.0, 1.0)));
    assert!(!a.is_visible());
    assert!(!a.pointer_inside());
    assert_eq!(root.pointer_focus(), Some(background.clone()));
    assert!(background.pointer_inside());
    assert_focus_is_visible_child(&root);
}

#[test]
fn enter_handler_adding_a_cover_hands_focus_over() {
    let parent = FakeParent::new();
    let root = parent.container();
    let (background, _) = fake_at(0, 0, 100, 100);
    let (a, _) = fake_at(0, 0, 10, 10);
    let (cover, _) = fake_at(0, 0, 10, 10);
    root.add_child(&background);
    root.add_child(&a);

    // the root is inside, so adding a child replays the motion
    assert!(root.element().pointer_motion(&motion(50.0, 50.0)));
    assert_eq!(root.pointer_focus(), Some(background.clone()));

    let pending = Rc::new(Cell::new(Some(cover.clone())));
    let _token = a.pointer_enter_signal().register({
        let root = root.clone();
        let pending = pending.clone();
        move |_| {
            if let Some(cover) = pending.take() {
                root.add_child(&cover);
            }
        }
    });

    assert!(root.element().pointer_motion(&motion(1.0, 1.0)));
    assert_eq!(root.children().first(), Some(&cover));
    assert_eq!(root.pointer_focus(), Some(cover.clone()));
    assert!(cover.pointer_inside());
    assert!(!a.pointer_inside());
    assert!(!background.pointer_inside());
    assert_focus_is_visible_child(&root);
}

#[test]
fn keyboard_focus_forms_a_chain() {
    let parent = FakeParent::new();
    let p = parent.container();
    let c = visible_container();
    let (e1, fake_e1) = fake_at(0, 0, 10, 10);
    let (e2, fake_e2) = fake_at(0, 0, 10, 10);
    let (d, fake_d) = fake_at(0, 0, 10, 10);
    c.add_child(&e1);
    c.add_child(&e2);
    p.add_child(c.element());
    p.add_child(&d);

    c.set_keyboard_focus(&e1, true);
    assert_eq!(c.keyboard_focus(), Some(e1.clone()));
    assert_eq!(p.keyboard_focus(), Some(c.element().clone()));

    let key = KeyboardEvent {
        keycode: 30,
        state: KeyState::Pressed,
        modifiers: Modifiers::empty(),
        time_msec: 0,
    };
    assert!(p.element().keyboard_event(&key));
    assert_eq!(fake_e1.last_keyboard_event.get(), Some(key));
    let keysym = Keysym::from(0x61);
    assert!(p.element().keyboard_sym(keysym, KeyState::Pressed, Modifiers::SHIFT));
    assert_eq!(fake_e1.last_keysym.get(), Some(keysym));
    assert_eq!(fake_e2.keyboard_event_count.get(), 0);

    // focus moving elsewhere blurs the whole old chain
    p.set_keyboard_focus(&d, true);
    assert_eq!(fake_e1.keyboard_blur_count.get(), 1);
    assert!(c.keyboard_focus().is_none());
    assert_eq!(p.keyboard_focus(), Some(d.clone()));

    // disabling for a non-holder does not disturb the holder
    c.set_keyboard_focus(&e2, false);
    p.set_keyboard_focus(c.element(), false);
    assert_eq!(p.keyboard_focus(), Some(d.clone()));

    c.set_keyboard_focus(&e2, true);
    assert_eq!(fake_d.keyboard_blur_count.get(), 1);
    assert_eq!(p.keyboard_focus(), Some(c.element().clone()));

    c.set_keyboard_focus(&e2, false);
    assert!(c.keyboard_focus().is_none());
    assert!(p.keyboard_focus().is_none());
    assert!(!p.element().keyboard_event(&key));
    assert_eq!(fake_e2.keyboard_blur_count.get(), 0);
}

#[test]
fn removal_clears_every_role() {
    init_logging();
    let parent = FakeParent::new();
    let p = parent.container();
    let c = visible_container();
    let (e, fake) = fake_at(0, 0, 10, 10);
    c.add_child(&e);
    p.add_child(c.element());
    fake.reset();

    p.element().pointer_motion(&motion(1.0, 1.0));
    p.element().pointer_button(&left(ButtonEventKind::Down));
    c.set_keyboard_focus(&e, true);
    c.pointer_grab(&e);
    assert_eq!(c.pointer_focus(), Some(e.clone()));
    assert_eq!(c.left_button_down(), Some(e.clone()));
    assert_eq!(p.keyboard_focus(), Some(c.element().clone()));
    assert_eq!(p.pointer_grab_holder(), Some(c.element().clone()));

    c.remove_child(&e);
    assert!(c.pointer_focus().is_none());
    assert!(c.pointer_grab_holder().is_none());
    assert!(c.left_button_down().is_none());
    assert!(c.keyboard_focus().is_none());
    assert!(p.pointer_grab_holder().is_none());
    assert!(p.keyboard_focus().is_none());
    assert!(p.pointer_focus().is_none());

    assert!(!e.pointer_inside());
    assert_eq!(fake.grab_cancel_count.get(), 1);
    assert!(e.parent().is_none());
    e.destroy();
}

#[test]
fn destroy_reaps_remaining_children() {
    let container = visible_container();
    let (a, fake_a) = fake_at(0, 0, 1, 1);
    let nested = visible_container();
    let (b, fake_b) = fake_at(0, 0, 1, 1);
    nested.add_child(&b);
    container.add_child(&a);
    container.add_child(nested.element());

    container.destroy();
    assert!(fake_a.destroyed.get());
    assert!(fake_b.destroyed.get());
    assert!(container.children().is_empty());
    assert!(nested.children().is_empty());
    assert!(a.parent().is_none());
}

#[test]
fn root_container_owns_its_tree() {
    let scene = crate::scene::Scene::new();
    let root = Container::new_attached(DefaultContainer, scene.root()).expect("live scene root");
    let tree = root.scene_tree().expect("root container has a tree");
    assert_eq!(tree.parent().as_ref(), Some(scene.root()));
    assert!(root.element().is_visible());

    root.destroy();
    assert!(!tree.is_alive());
    assert!(root.scene_tree().is_none());
}

#[test]
fn root_below_destroyed_node_fails() {
    let scene = crate::scene::Scene::new();
    let node = SceneNode::new_tree(scene.root()).expect("live scene root");
    node.destroy();
    assert_eq!(
        Container::new_attached(DefaultContainer, &node).err(),
        Some(SceneError::Destroyed)
    );
}

#[derive(Default)]
struct Column {
    updates: Cell<u32>,
}

impl ElementImpl for Column {
    fn create_visual_node(&self, element: &Element, parent: &SceneNode) -> SceneNode {
        Container::of(element).create_scene_tree(parent)
    }

    fn dimensions(&self, element: &Element) -> Rectangle<i32> {
        Container::of(element).bounding_box()
    }
}

impl ContainerImpl for Column {
    fn update_layout(&self, container: &Container) -> bool {
        self.updates.set(self.updates.get() + 1);
        let mut changed = false;
        let mut y = 0;
        for child in container.children().iter().rev() {
            let position = Point::new(0, y);
            changed |= child.position() != position;
            child.set_position(position);
            // no nested update from within the hook
            child.set_visible(true);
            y += child.dimensions().size.h;
        }
        changed
    }
}

#[test]
fn layout_hook_is_not_reentered() {
    let parent = FakeParent::new();
    let column = Container::new(Column::default());
    column.element().set_visible(true);
    parent.container().add_child(column.element());
    let imp = column.element().downcast_impl::<Column>().expect("column implementation");
    let updates = imp.updates.get();

    let (a, _) = FakeElement::create(Rectangle::from_size((10, 10)));
    let (b, _) = FakeElement::create(Rectangle::from_size((10, 5)));
    column.add_child(&a);
    column.add_child(&b);
    assert_eq!(imp.updates.get(), updates + 2);
    assert_eq!(a.position(), Point::new(0, 0));
    assert_eq!(b.position(), Point::new(0, 10));

    parent
        .container()
        .element()
        .pointer_motion(&motion(1.0, 12.0));
    assert_eq!(column.pointer_focus(), Some(b.clone()));

    a.set_visible(false);
    assert_eq!(imp.updates.get(), updates + 3);
    assert!(a.is_visible());
}

struct Plain;

impl ElementImpl for Plain {
    fn create_visual_node(&self, _element: &Element, parent: &SceneNode) -> SceneNode {
        SceneNode::new_buffer(parent, (1, 1).into()).expect("live parent")
    }

    fn dimensions(&self, _element: &Element) -> Rectangle<i32> {
        Rectangle::from_size((1, 1))
    }
}

#[test]
#[should_panic(expected = "cannot have its grab cancelled")]
fn grab_requires_cancel_capability() {
    let container = visible_container();
    let element = Element::new(Plain);
    assert_eq!(element.capabilities(), Capabilities::empty());
    container.add_child(&element);
    container.pointer_grab(&element);
}

#[test]
#[should_panic(expected = "is not its parent")]
fn removing_a_stranger_is_fatal() {
    let container = visible_container();
    let (element, _) = fake_at(0, 0, 1, 1);
    container.remove_child(&element);
}

#[test]
#[should_panic(expected = "held by another container")]
fn adding_twice_is_fatal() {
    let first = visible_container();
    let second = visible_container();
    let (element, _) = fake_at(0, 0, 1, 1);
    first.add_child(&element);
    second.add_child(&element);
}
