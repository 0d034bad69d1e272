//! Coverage for the structural properties in spec.md §3/§9: re-parenting,
//! aliasing across two parents, and private-field exclusion.

use graphwatch::container::TrackedVec;
use graphwatch::{Change, Reactive, Record, Tracked};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Record, Clone)]
struct Player {
    name: String,
    score: i32,
}

#[derive(Record)]
struct Team {
    roster: TrackedVec<Tracked<Player>>,
}

#[derive(Record)]
struct Secret {
    visible: i32,
    _hidden: i32,
}

fn counter(target: &dyn graphwatch::Node) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let c2 = count.clone();
    graphwatch::receiver(target, "*", false, move |_: &Change| *c2.borrow_mut() += 1).unwrap();
    count
}

#[test]
fn reparenting_a_child_bubbles_to_the_new_parent_not_the_old() {
    let a = Rc::new(Tracked::new(Team {
        roster: TrackedVec::new(),
    }))
    .reactive();
    let b = Rc::new(Tracked::new(Team {
        roster: TrackedVec::new(),
    }))
    .reactive();

    let player = Tracked::new(Player {
        name: "Ada".into(),
        score: 0,
    });
    a.roster().push(player.clone());

    let count_a = counter(a.as_ref());
    let count_b = counter(b.as_ref());

    player.set_score(1);
    assert_eq!(*count_a.borrow(), 1);
    assert_eq!(*count_b.borrow(), 0);

    // Re-parent: move the player out of a's roster and into b's. Both
    // structural edits are themselves changes that bubble to their own
    // container (remove to a, push to b) — reset the counters afterward so
    // the next assertion isolates the field write we actually care about.
    a.roster().remove(0);
    b.roster().push(player.clone());
    *count_a.borrow_mut() = 0;
    *count_b.borrow_mut() = 0;

    player.set_score(2);
    assert_eq!(*count_a.borrow(), 0, "old parent must not see further bubbles");
    assert_eq!(*count_b.borrow(), 1, "new parent must see the bubble");
}

#[test]
fn a_child_aliased_under_two_parents_bubbles_to_both() {
    let a = Rc::new(Tracked::new(Team {
        roster: TrackedVec::new(),
    }))
    .reactive();
    let b = Rc::new(Tracked::new(Team {
        roster: TrackedVec::new(),
    }))
    .reactive();

    let player = Tracked::new(Player {
        name: "Ada".into(),
        score: 0,
    });
    a.roster().push(player.clone());
    b.roster().push(player.clone());

    let count_a = counter(a.as_ref());
    let count_b = counter(b.as_ref());

    player.set_score(7);
    assert_eq!(*count_a.borrow(), 1);
    assert_eq!(*count_b.borrow(), 1);
}

#[test]
fn private_fields_are_excluded_from_activation_and_dispatch() {
    let secret = Rc::new(Tracked::new(Secret {
        visible: 0,
        _hidden: 0,
    }))
    .reactive();

    let count = counter(secret.as_ref());
    secret.set_visible(5);
    assert_eq!(*count.borrow(), 1);

    // `_hidden` has no generated accessor at all: the derive macro never
    // emits one for a leading-underscore field, so there is nothing to call
    // and nothing for the activation engine to descend into.
}
