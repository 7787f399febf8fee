use iso_engine::world::{GridPoint, PixelPoint, TileKey};
use iso_engine::{InputAction, InputSnapshot, PanSignal, Scene, SceneWorld};

use super::{build_scene, IsoWorldScene};
use crate::app::config::GameConfig;

const WINDOW: (u32, u32) = (800, 600);

fn flat_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.world.min_height = 1.0;
    config.world.max_height = 1.0;
    config.world.pit_chance = 0.0;
    config.world.height_jitter_range = 0;
    config.render.actor_wiggle_px = 0.0;
    config
}

fn frame() -> InputSnapshot {
    InputSnapshot::empty().with_window_size(WINDOW)
}

/// A loaded scene after its first frame: view fitted, player spawned.
fn started_scene(config: GameConfig) -> (IsoWorldScene, SceneWorld) {
    let mut scene = IsoWorldScene::new(config).expect("scene");
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    scene.update(&frame(), &mut world);
    (scene, world)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn first_frame_fits_view_and_spawns_player_on_the_centre_tile() {
    let (scene, world) = started_scene(flat_config());

    let transform = world.transform();
    assert!(transform.scale() > 1.0);
    let centre = transform.to_pixel(GridPoint::new(4.5, 4.5));
    assert_close(centre.x, 400.0);
    assert_close(centre.y, 300.0);

    let player = world.player().expect("player");
    assert_eq!(player.position, GridPoint::new(5.0, 5.0));
    assert_close(scene.actor().z(), -transform.scale());
    assert_eq!(world.voxel_count(), scene.layout().len());
}

#[test]
fn zero_sized_window_defers_fit_and_spawn() {
    let mut scene = IsoWorldScene::new(flat_config()).expect("scene");
    let mut world = SceneWorld::default();
    scene.load(&mut world);

    scene.update(&InputSnapshot::empty(), &mut world);
    assert_close(world.transform().scale(), 1.0);
    assert!(world.player().is_none());

    scene.update(&frame(), &mut world);
    assert!(world.player().is_some());
}

#[test]
fn holding_move_right_walks_exactly_one_tile_in_five_ticks() {
    let (mut scene, mut world) = started_scene(flat_config());
    let held = frame().with_action_down(InputAction::MoveRight, true);

    for _ in 0..5 {
        scene.update(&held, &mut world);
    }

    let position = scene.actor().position();
    assert_close(position.x, 6.0);
    assert_close(position.y, 5.0);
    assert!(scene.actor().is_on_tile());
}

#[test]
fn step_press_finishes_a_single_tile() {
    let (mut scene, mut world) = started_scene(flat_config());

    scene.update(
        &frame().with_action_pressed(InputAction::StepUp),
        &mut world,
    );
    for _ in 0..10 {
        scene.update(&frame(), &mut world);
    }

    let position = scene.actor().position();
    assert_close(position.x, 5.0);
    assert_close(position.y, 6.0);
    assert!(scene.actor().is_on_tile());
}

#[test]
fn click_places_player_on_the_tile_under_the_pointer() {
    let (mut scene, mut world) = started_scene(flat_config());
    let pointer = world.transform().to_pixel(GridPoint::new(2.0, 3.0));

    scene.update(&frame().with_place_actor_at(Some(pointer)), &mut world);

    assert_eq!(scene.actor().position(), GridPoint::new(2.0, 3.0));
    assert_eq!(scene.actor().tile_origin(), TileKey::new(2, 3));
    assert_close(scene.actor().z(), -world.transform().scale());
}

#[test]
fn click_outside_the_grid_leaves_the_player_in_place() {
    let (mut scene, mut world) = started_scene(flat_config());
    world.transform_mut().apply_zoom_steps(100);
    let pointer = world.transform().to_pixel(GridPoint::new(-40.0, 3.0));

    scene.update(&frame().with_place_actor_at(Some(pointer)), &mut world);
    assert_eq!(scene.actor().tile_origin(), TileKey::new(5, 5));

    let held = frame().with_action_down(InputAction::MoveRight, true);
    for _ in 0..5 {
        scene.update(&held, &mut world);
    }
    assert_close(scene.actor().position().x, 6.0);
}

#[test]
fn cursor_tile_is_only_set_inside_the_grid() {
    let (mut scene, mut world) = started_scene(flat_config());

    let inside = world.transform().to_pixel(GridPoint::new(7.0, 1.0));
    scene.update(&frame().with_cursor_position_px(Some(inside)), &mut world);
    assert_eq!(world.cursor_tile(), Some(TileKey::new(7, 1)));

    let outside = world.transform().to_pixel(GridPoint::new(-3.0, -3.0));
    scene.update(&frame().with_cursor_position_px(Some(outside)), &mut world);
    assert_eq!(world.cursor_tile(), None);
}

#[test]
fn zoom_steps_scale_the_view_and_reset_restores_the_fit() {
    let (mut scene, mut world) = started_scene(flat_config());
    let fitted = world.transform().scale();

    scene.update(&frame().with_zoom_delta_steps(2), &mut world);
    assert_close(world.transform().scale(), fitted * 1.1 * 1.1);

    scene.update(
        &frame().with_action_pressed(InputAction::ResetView),
        &mut world,
    );
    assert_close(world.transform().scale(), fitted);
}

#[test]
fn middle_drag_pans_the_view() {
    let (mut scene, mut world) = started_scene(flat_config());
    let origin = world.transform().to_pixel(GridPoint::new(0.0, 0.0));
    let grab = PixelPoint::new(100.0, 100.0);

    scene.update(
        &frame()
            .with_pan_signal(Some(PanSignal::Start(grab)))
            .with_cursor_position_px(Some(grab)),
        &mut world,
    );
    scene.update(
        &frame().with_cursor_position_px(Some(PixelPoint::new(130.0, 90.0))),
        &mut world,
    );
    scene.update(
        &frame()
            .with_pan_signal(Some(PanSignal::Stop))
            .with_cursor_position_px(Some(PixelPoint::new(130.0, 90.0))),
        &mut world,
    );
    scene.update(
        &frame().with_cursor_position_px(Some(PixelPoint::new(500.0, 500.0))),
        &mut world,
    );

    let moved = world.transform().to_pixel(GridPoint::new(0.0, 0.0));
    assert_close(moved.x, origin.x + 30.0);
    assert_close(moved.y, origin.y - 10.0);
    assert!(!world.transform().is_panning());
}

#[test]
fn reshuffle_keeps_the_layout_and_voxel_count() {
    let (mut scene, mut world) = started_scene(GameConfig::default());
    let layout = scene.layout().clone();

    scene.update(
        &frame().with_action_pressed(InputAction::Reshuffle),
        &mut world,
    );

    assert_eq!(scene.layout(), &layout);
    assert_eq!(world.voxel_count(), layout.len());
}

#[test]
fn levitating_lifts_the_player_off_the_floor() {
    let (mut scene, mut world) = started_scene(flat_config());
    let floor = scene.actor().z();

    scene.update(
        &frame().with_action_down(InputAction::Levitate, true),
        &mut world,
    );

    assert!(scene.actor().z() < floor);
    assert!(world.player().expect("player").z < floor);
}

#[test]
fn debug_title_reports_player_and_pointer() {
    let (mut scene, mut world) = started_scene(flat_config());
    let title = scene.debug_title(&world).expect("title");
    assert!(title.starts_with("Iso World"));
    assert!(title.contains("pointer -"));
    assert!(title.contains("player (5.00, 5.00)"));

    let pointer = world.transform().to_pixel(GridPoint::new(1.25, 2.5));
    scene.update(&frame().with_cursor_position_px(Some(pointer)), &mut world);
    let title = scene.debug_title(&world).expect("title");
    assert!(title.contains("pointer (1.25, 2.50)"));
}

#[test]
fn unload_clears_the_shared_world() {
    let (mut scene, mut world) = started_scene(flat_config());
    scene.unload(&mut world);

    assert_eq!(world.voxel_count(), 0);
    assert!(world.player().is_none());
    assert!(world.draw_sequence().items.is_empty());
}

#[test]
fn default_config_builds_a_scene() {
    let mut scene = build_scene(GameConfig::default()).expect("scene");
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    scene.update(&frame(), &mut world);

    assert!(world.voxel_count() > 0);
    assert!(world.player().is_some());
    assert!(!world.draw_sequence().items.is_empty());
}
