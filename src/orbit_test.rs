#![allow(clippy::float_cmp)]

use std::f64::consts::PI;

use super::*;
use crate::post::Post;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn make_post(angle: f64, radius: f64, speed: f64) -> Post {
    let mut post = Post::new("p".into(), String::new(), 0.0, 0.0, angle);
    post.orbit_radius = radius;
    post.orbit_speed = speed;
    post
}

// --- step: angle advance ---

#[test]
fn single_tick_advances_angle_by_speed() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let post = make_post(1.0, 100.0, 0.25);
    let id = post.id;
    store.insert(post);

    step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    assert!(approx_eq(store.get(&id).unwrap().orbit_angle, 1.25));
}

#[test]
fn n_ticks_accumulate_angle_mod_tau() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let post = make_post(0.0, 100.0, 1.0);
    let id = post.id;
    store.insert(post);

    for _ in 0..10 {
        step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    }
    let expected = (10.0 * 1.0_f64).rem_euclid(TAU);
    assert!(approx_eq(store.get(&id).unwrap().orbit_angle, expected));
}

#[test]
fn angle_stays_normalized() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let post = make_post(TAU - 0.05, 10.0, 0.1);
    let id = post.id;
    store.insert(post);

    step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    let angle = store.get(&id).unwrap().orbit_angle;
    assert!((0.0..TAU).contains(&angle));
    assert!(approx_eq(angle, 0.05));
}

// --- step: position ---

#[test]
fn position_lies_on_orbit_circle() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let center = Point::new(400.0, 300.0);
    let post = make_post(0.3, 120.0, 0.05);
    let id = post.id;
    store.insert(post);

    for _ in 0..7 {
        step(&mut store, &mut bodies, center);
    }
    let post = store.get(&id).unwrap();
    assert!(approx_eq(post.x, center.x + 120.0 * post.orbit_angle.cos()));
    assert!(approx_eq(post.y, center.y + 120.0 * post.orbit_angle.sin()));
}

#[test]
fn worked_example_two_posts_one_tick() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let center = Point::new(400.0, 300.0);

    let a = make_post(0.0, 100.0, 0.1);
    let b = make_post(PI, 50.0, 0.2);
    let (id_a, id_b) = (a.id, b.id);
    store.insert(a);
    store.insert(b);

    step(&mut store, &mut bodies, center);

    let a = store.get(&id_a).unwrap();
    assert!(approx_eq(a.x, 400.0 + 100.0 * 0.1_f64.cos()));
    assert!(approx_eq(a.y, 300.0 + 100.0 * 0.1_f64.sin()));

    let b = store.get(&id_b).unwrap();
    assert!(approx_eq(b.x, 400.0 + 50.0 * (PI + 0.2).cos()));
    assert!(approx_eq(b.y, 300.0 + 50.0 * (PI + 0.2).sin()));
}

// --- pinning ---

#[test]
fn pinned_post_is_skipped() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let mut post = make_post(1.0, 100.0, 0.5);
    post.pinned = true;
    post.x = 12.0;
    post.y = 34.0;
    let id = post.id;
    store.insert(post);

    for _ in 0..5 {
        step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    }
    let post = store.get(&id).unwrap();
    assert_eq!(post.orbit_angle, 1.0);
    assert_eq!(post.x, 12.0);
    assert_eq!(post.y, 34.0);
}

#[test]
fn unpinning_resumes_motion() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let mut post = make_post(1.0, 100.0, 0.5);
    post.pinned = true;
    let id = post.id;
    store.insert(post);

    step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    store.get_mut(&id).unwrap().pinned = false;
    step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    assert!(approx_eq(store.get(&id).unwrap().orbit_angle, 1.5));
}

#[test]
fn step_never_touches_text_or_editing() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let mut post = make_post(0.0, 100.0, 0.1);
    post.title = "title".into();
    post.content = "content".into();
    post.editing = true;
    let id = post.id;
    store.insert(post);

    step(&mut store, &mut bodies, Point::new(0.0, 0.0));
    let post = store.get(&id).unwrap();
    assert_eq!(post.title, "title");
    assert_eq!(post.content, "content");
    assert!(post.editing);
}

// --- body mirror ---

#[test]
fn step_mirrors_position_into_existing_body() {
    let mut store = PostStore::new();
    let mut bodies = BodyTable::new();
    let post = make_post(0.0, 100.0, 0.1);
    let id = post.id;
    bodies.insert(id, post.x, post.y);
    store.insert(post);

    step(&mut store, &mut bodies, Point::new(400.0, 300.0));
    let post = store.get(&id).unwrap();
    let body = bodies.get(&id).unwrap();
    assert_eq!(body.x, post.x);
    assert_eq!(body.y, post.y);
}

#[test]
fn mirror_ignores_posts_without_body() {
    let mut bodies = BodyTable::new();
    let id = uuid::Uuid::new_v4();
    bodies.mirror(&id, 1.0, 2.0);
    assert!(bodies.get(&id).is_none());
    assert!(bodies.is_empty());
}

#[test]
fn body_table_insert_remove() {
    let mut bodies = BodyTable::new();
    let id = uuid::Uuid::new_v4();
    bodies.insert(id, 1.0, 2.0);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies.get(&id), Some(&OrbitBody { x: 1.0, y: 2.0 }));
    assert!(bodies.remove(&id).is_some());
    assert!(bodies.is_empty());
}

// --- angle source ---

#[test]
fn seeded_angle_source_is_reproducible() {
    let mut a = AngleSource::from_seed(7);
    let mut b = AngleSource::from_seed(7);
    for _ in 0..16 {
        assert_eq!(a.next_angle(), b.next_angle());
    }
}

#[test]
fn different_seeds_diverge() {
    let mut a = AngleSource::from_seed(1);
    let mut b = AngleSource::from_seed(2);
    let same = (0..16).all(|_| a.next_angle() == b.next_angle());
    assert!(!same);
}

#[test]
fn angles_fall_in_unit_circle_range() {
    let mut source = AngleSource::from_seed(42);
    for _ in 0..256 {
        let angle = source.next_angle();
        assert!((0.0..TAU).contains(&angle));
    }
}
