use super::*;
use crate::foundation::core::Coord;
use crate::position::reference::ReferenceDims;
use crate::scene::capability::Positionable;
use crate::scene::names::NAME_SEPARATOR;
use serde_json::json;

fn attrs(v: serde_json::Value) -> AttrMap {
    v.as_object().cloned().unwrap_or_default()
}

fn scene_with_pad() -> (Scene, String) {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let pad = scene
        .make_pad(&attrs(json!({ "name": "board", "width": 400, "height": 200 })))
        .unwrap();
    (scene, pad)
}

#[test]
fn make_pad_builds_display_and_base_cells() {
    let (scene, pad) = scene_with_pad();
    assert_eq!(pad, "board");
    assert_eq!(scene.current_pad(), Some("board"));

    let p = scene.pad("board").unwrap();
    assert_eq!((p.display(), p.base(), p.current()), ("board", "board_base", "board_base"));

    let display = scene.cell("board").unwrap();
    assert!(!display.compiled && !display.shown);
    assert_eq!((display.actual_width, display.actual_height), (400.0, 200.0));

    let base = scene.cell("board_base").unwrap();
    assert_eq!(base.compile_order, 9.0);
    assert_eq!(base.role, ReferenceRole::BaseOf("board".to_owned()));
    assert_eq!((base.actual_width, base.actual_height), (400.0, 200.0));

    assert!(scene.group("board").is_some());
    assert!(scene.group("board_base").is_some());
    assert_eq!(
        scene.tracker_owner("board_base"),
        Some(&TrackerOwner::Cell("board_base".to_owned()))
    );
}

#[test]
fn make_pad_rejects_empty_dimensions() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let err = scene.make_pad(&attrs(json!({ "width": 0 }))).unwrap_err();
    assert!(matches!(err, ScrawlError::Validation(_)));
    assert!(scene.pad_names().is_empty());
}

#[test]
fn scene_rejects_an_invalid_config() {
    let config = SceneConfig {
        default_pad_width: -1.0,
        ..SceneConfig::default()
    };
    assert!(matches!(Scene::new(config), Err(ScrawlError::Validation(_))));
}

#[test]
fn colliding_names_get_a_tag() {
    let (mut scene, _) = scene_with_pad();
    let a = scene.make_block(&attrs(json!({ "name": "box" }))).unwrap();
    let b = scene.make_block(&attrs(json!({ "name": "box" }))).unwrap();
    assert_eq!(a, "box");
    assert!(b.starts_with(&format!("box{NAME_SEPARATOR}")));
    assert!(scene.is_registered(Namespace::Entity, &b));
}

#[test]
fn entities_default_to_the_current_cell_group() {
    let (mut scene, _) = scene_with_pad();
    let e = scene.make_block(&attrs(json!({ "name": "box" }))).unwrap();
    assert_eq!(scene.entity(&e).unwrap().group(), "board_base");
    assert_eq!(scene.group("board_base").unwrap().entities(), ["box"]);
    assert_eq!(
        scene.tracker_owner("box"),
        Some(&TrackerOwner::Entity("box".to_owned()))
    );
}

#[test]
fn make_entity_validates_method_and_group() {
    let (mut scene, _) = scene_with_pad();
    let err = scene
        .make_block(&attrs(json!({ "method": "sparkle" })))
        .unwrap_err();
    assert!(matches!(err, ScrawlError::Validation(_)));
    let err = scene
        .make_block(&attrs(json!({ "group": "nowhere" })))
        .unwrap_err();
    assert!(matches!(err, ScrawlError::Registry(_)));
    assert_eq!(scene.entity_names().count(), 0);
}

#[test]
fn changing_the_group_moves_membership() {
    let (mut scene, _) = scene_with_pad();
    let g = scene
        .make_group(&attrs(json!({ "name": "top", "cell": "board_base" })))
        .unwrap();
    let e = scene.make_block(&attrs(json!({ "name": "box" }))).unwrap();
    scene.set_entity(&e, &attrs(json!({ "group": g }))).unwrap();
    assert!(scene.group("board_base").unwrap().entities().is_empty());
    assert_eq!(scene.group("top").unwrap().entities(), ["box"]);
    assert!(scene.cell("board_base").unwrap().groups.contains(&"top".to_owned()));
}

#[test]
fn block_percent_sizes_follow_the_cell() {
    let (mut scene, _) = scene_with_pad();
    let e = scene
        .make_block(&attrs(json!({ "name": "bar", "width": "50%", "height": 10 })))
        .unwrap();
    let EntityKind::Block(b) = scene.entity(&e).unwrap().kind() else {
        panic!("not a block");
    };
    assert_eq!(b.local_width(), 200.0);
}

#[test]
fn make_group_checks_cell_and_members() {
    let (mut scene, _) = scene_with_pad();
    let err = scene.make_group(&attrs(json!({ "cell": "ghost" }))).unwrap_err();
    assert!(matches!(err, ScrawlError::Registry(_)));
    let err = scene
        .make_group(&attrs(json!({ "entities": ["ghost"] })))
        .unwrap_err();
    assert!(matches!(err, ScrawlError::Registry(_)));
}

#[test]
fn deleting_an_entity_scrubs_every_reference() {
    let (mut scene, _) = scene_with_pad();
    let leader = scene.make_block(&attrs(json!({ "name": "leader" }))).unwrap();
    let follower = scene
        .make_block(&attrs(json!({ "name": "follower", "pivot": "leader" })))
        .unwrap();
    let extra = scene.make_group(&attrs(json!({ "name": "extra" }))).unwrap();
    scene.add_entities_to_group(&extra, &[&leader]).unwrap();

    scene.delete_entity(&leader).unwrap();
    assert!(scene.entity("leader").is_none());
    assert!(!scene.group("extra").unwrap().contains("leader"));
    assert!(!scene.group("board_base").unwrap().contains("leader"));
    assert_eq!(scene.entity(&follower).unwrap().position().pivot(), None);
    assert!(scene.tracker("leader").is_none());
    assert!(!scene.is_registered(Namespace::Entity, "leader"));

    let again = scene.make_block(&attrs(json!({ "name": "leader" }))).unwrap();
    assert_eq!(again, "leader");
}

#[test]
fn unknown_names_are_registry_errors() {
    let (mut scene, _) = scene_with_pad();
    assert!(matches!(
        scene.set_entity("ghost", &AttrMap::new()),
        Err(ScrawlError::Registry(_))
    ));
    assert!(matches!(scene.delete_cell("ghost"), Err(ScrawlError::Registry(_))));
    assert!(matches!(scene.set_current_pad("ghost"), Err(ScrawlError::Registry(_))));
    assert!(matches!(
        scene.add_entities_to_group("board", &["ghost"]),
        Err(ScrawlError::Registry(_))
    ));
}

#[test]
fn clone_entity_copies_attributes_under_a_new_name() {
    let (mut scene, _) = scene_with_pad();
    let src = scene
        .make_wheel(&attrs(json!({
            "name": "dot",
            "radius": 12,
            "fillStyle": "red",
            "start": { "x": 10, "y": 20 },
        })))
        .unwrap();
    let twin = scene
        .clone_entity(&src, &attrs(json!({ "name": "twin", "startY": 80 })))
        .unwrap();
    assert_eq!(twin, "twin");
    let t = scene.entity("twin").unwrap();
    assert_eq!(t.tracker().fill_style, "red");
    assert_eq!(t.position().start(), Coord::px(10.0, 80.0));
    assert_eq!(t.get("radius"), Some(json!(12.0)));
    assert_eq!(t.group(), "board_base");
    assert_eq!(scene.group("board_base").unwrap().entities(), ["dot", "twin"]);
}

#[test]
fn clone_cell_folds_paste_coordinates() {
    let (mut scene, _) = scene_with_pad();
    let c = scene
        .make_cell(&attrs(json!({ "name": "scratch", "width": 50, "height": 40 })))
        .unwrap();
    scene
        .set_cell(&c, &attrs(json!({ "pasteX": 7, "backgroundColor": "blue" })))
        .unwrap();
    let copy = scene
        .clone_cell(&c, &attrs(json!({ "name": "copy", "pasteY": 3 })))
        .unwrap();
    let cell = scene.cell(&copy).unwrap();
    assert_eq!(cell.position.start(), Coord::px(7.0, 3.0));
    assert_eq!(cell.background_color, "blue");
    assert_eq!(cell.role, ReferenceRole::Standalone);
}

#[test]
fn new_pad_cells_resolve_against_the_pad() {
    let (mut scene, pad) = scene_with_pad();
    let c = scene
        .add_new_cell(&pad, &attrs(json!({ "name": "half", "width": "50%", "height": "25%" })))
        .unwrap();
    let cell = scene.cell(&c).unwrap();
    assert_eq!((cell.actual_width, cell.actual_height), (200.0, 50.0));
    assert_eq!(cell.role, ReferenceRole::WorkingSurfaceOf("board".to_owned()));
    assert!(scene.pad(&pad).unwrap().contains("half"));
}

#[test]
fn resizing_the_pad_resizes_its_cells() {
    let (mut scene, pad) = scene_with_pad();
    let c = scene
        .add_new_cell(&pad, &attrs(json!({ "name": "half", "width": "50%" })))
        .unwrap();
    scene.set_pad(&pad, &attrs(json!({ "width": 600 }))).unwrap();
    assert_eq!(scene.cell("board").unwrap().actual_width, 600.0);
    assert_eq!(scene.cell("board_base").unwrap().actual_width, 600.0);
    assert_eq!(scene.cell(&c).unwrap().actual_width, 300.0);
    assert!(scene.cell("board").unwrap().dimensions_dirty);
}

#[test]
fn order_changes_flag_the_pad_for_resorting() {
    let (mut scene, pad) = scene_with_pad();
    let c = scene.add_new_cell(&pad, &attrs(json!({ "name": "hud" }))).unwrap();
    if let Some(p) = scene.pads.get_mut(&pad) {
        p.resort_compile = false;
        p.resort_show = false;
    }
    scene.set_cell_delta(&c, &attrs(json!({ "showOrder": 2 }))).unwrap();
    let p = scene.pad(&pad).unwrap();
    assert!(p.resort_show);
    assert!(!p.resort_compile);
}

#[test]
fn deleting_the_current_cell_falls_back_to_base() {
    let (mut scene, pad) = scene_with_pad();
    let c = scene.add_new_cell(&pad, &attrs(json!({ "name": "hud" }))).unwrap();
    scene.set_pad(&pad, &attrs(json!({ "current": "hud" }))).unwrap();
    scene.make_block(&attrs(json!({ "name": "marker" }))).unwrap();
    assert_eq!(scene.entity("marker").unwrap().group(), "hud");

    scene.delete_cell(&c).unwrap();
    assert_eq!(scene.pad(&pad).unwrap().current(), "board_base");
    assert!(scene.group("hud").is_none());
    assert_eq!(scene.entity("marker").unwrap().group(), "");
}

#[test]
fn deleting_a_pad_removes_its_cells() {
    let (mut scene, pad) = scene_with_pad();
    scene.delete_pad(&pad).unwrap();
    assert!(scene.pad(&pad).is_none());
    assert!(scene.cell("board").is_none());
    assert!(scene.cell("board_base").is_none());
    assert!(scene.group("board_base").is_none());
    assert_eq!(scene.current_pad(), None);
}

#[test]
fn update_entities_by_maps_x_and_y_to_start() {
    let (mut scene, _) = scene_with_pad();
    for name in ["a", "b"] {
        scene
            .make_block(&attrs(json!({ "name": name, "start": { "x": 10, "y": 10 } })))
            .unwrap();
    }
    scene
        .update_entities_by("board_base", &attrs(json!({ "x": 5, "y": -2 })))
        .unwrap();
    for name in ["a", "b"] {
        assert_eq!(
            scene.entity(name).unwrap().position().start(),
            Coord::px(15.0, 8.0)
        );
    }
    scene
        .set_entities_to("board_base", &attrs(json!({ "fillStyle": "green" })))
        .unwrap();
    assert_eq!(scene.entity("b").unwrap().tracker().fill_style, "green");
}

#[test]
fn group_deltas_reuse_pooled_maps() {
    let (mut scene, _) = scene_with_pad();
    scene
        .make_block(&attrs(json!({ "name": "a", "start": { "x": 0, "y": 0 } })))
        .unwrap();
    for _ in 0..3 {
        scene
            .update_entities_by("board_base", &attrs(json!({ "x": 1 })))
            .unwrap();
    }
    assert_eq!(scene.entity("a").unwrap().position().start(), Coord::px(3.0, 0.0));
    let st = scene.pools().maps.stats();
    assert_eq!((st.allocated, st.reused, st.retained), (1, 2, 1));

    assert!(scene.update_entities_by("nobody", &attrs(json!({ "x": 1 }))).is_err());
    assert_eq!(scene.pools().maps.stats().retained, 1);
}

#[test]
fn removing_members_clears_their_primary_group() {
    let (mut scene, _) = scene_with_pad();
    scene.make_block(&attrs(json!({ "name": "a" }))).unwrap();
    scene.remove_entities_from_group("board_base", &["a", "ghost"]).unwrap();
    assert!(scene.group("board_base").unwrap().entities().is_empty());
    assert_eq!(scene.entity("a").unwrap().group(), "");
}

#[test]
fn named_points_belong_to_shapes() {
    let (mut scene, _) = scene_with_pad();
    let block = scene.make_block(&attrs(json!({ "name": "b" }))).unwrap();
    assert!(matches!(
        scene.add_point(&block, None, Vec2::ZERO),
        Err(ScrawlError::Validation(_))
    ));

    let shape = scene
        .make_shape(&attrs(json!({
            "name": "track",
            "d": "M0 0 L100 0",
            "isLine": true,
            "start": { "x": 20, "y": 30 },
            "scale": 2,
        })))
        .unwrap();
    if let Some(e) = scene.entities.get_mut(&shape) {
        e.refresh_start(Some(ReferenceDims::new(400.0, 200.0, false)));
        e.refresh_handle();
    }
    let p = scene.add_point(&shape, Some("mid"), Vec2::new(50.0, 0.0)).unwrap();
    assert_eq!(scene.point(&p).map(NamedPoint::entity), Some("track"));
    assert_eq!(scene.point_position(&p), Some(Vec2::new(120.0, 30.0)));

    scene.delete_entity(&shape).unwrap();
    assert!(scene.point("mid").is_none());
}

#[test]
fn pointer_followers_are_listed_by_index() {
    let (mut scene, _) = scene_with_pad();
    scene
        .make_block(&attrs(json!({ "name": "a", "pivot": "mouse" })))
        .unwrap();
    scene
        .make_block(&attrs(json!({ "name": "b", "pivot": "mouse", "mouseIndex": "touch1" })))
        .unwrap();
    scene.make_block(&attrs(json!({ "name": "c" }))).unwrap();
    assert_eq!(
        scene.get_entities_by_mouse_index("board_base", "mouse").unwrap(),
        ["a"]
    );
    assert_eq!(
        scene.get_entities_by_mouse_index("board_base", "touch1").unwrap(),
        ["b"]
    );
}

#[test]
fn designs_clone_and_delete() {
    let (mut scene, _) = scene_with_pad();
    let d = scene.make_design(DesignKind::Linear, &attrs(json!({ "name": "sky" })));
    let copy = scene.clone_design(&d, &attrs(json!({ "name": "sea" }))).unwrap();
    assert_eq!(scene.design(&copy).map(Design::kind), Some(DesignKind::Linear));
    scene.delete_design(&d).unwrap();
    assert!(scene.design("sky").is_none());
    assert!(matches!(scene.set_design("sky", &AttrMap::new()), Err(ScrawlError::Registry(_))));
}

#[test]
fn a_second_pad_becomes_current() {
    let (mut scene, _) = scene_with_pad();
    let other = scene.make_pad(&AttrMap::new()).unwrap();
    assert_eq!(scene.current_pad(), Some(other.as_str()));
    assert_eq!(scene.cell(&other).unwrap().actual_width, 300.0);
    scene.set_current_pad("board").unwrap();
    assert_eq!(scene.current_pad(), Some("board"));
    assert_eq!(scene.pad_names(), ["board".to_owned(), other]);
}
