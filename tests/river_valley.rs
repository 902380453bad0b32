use std::path::PathBuf;

use hexhold::{
    engine::{Engine, EngineSettings},
    game::PlacementRejection,
    scenario::ScenarioLoader,
    snapshot::load_snapshot,
    Game, GameEvent, ResourceType, Scenario, TilePos, TileType,
};
use tempfile::tempdir;

fn load(file: &str) -> Scenario {
    let loader = ScenarioLoader::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios"));
    loader.load(file).expect("scenario should load")
}

fn settings(scenario: &Scenario, dir: PathBuf, interval: u64) -> EngineSettings {
    EngineSettings {
        scenario_name: scenario.name.clone(),
        snapshot_interval_ticks: interval,
        snapshot_dir: dir,
        tick_seconds: scenario.tick_seconds,
    }
}

#[test]
fn scenario_placements_are_applied() {
    let scenario = load("river_valley.yaml");
    let mut game = scenario.build_game().expect("game builds");

    let placed: Vec<(&str, TilePos)> = game
        .buildings()
        .iter()
        .map(|placed| (placed.category.as_str(), placed.pos))
        .collect();
    assert_eq!(
        placed,
        vec![
            ("woodcutter", TilePos::new(3, 0)),
            ("sawmill", TilePos::new(3, 2)),
            ("fishery", TilePos::new(2, 3)),
            ("cottage", TilePos::new(4, 4)),
            ("potato_farm", TilePos::new(5, 4)),
        ]
    );
    assert_eq!(game.available_money(), 740);
    assert_eq!(game.available_resource(ResourceType::Plank), 1);
    assert_eq!(game.grid().tile_at(5, 0).tile_type(), TileType::Stone);
    assert!(game.grid().tile_at(5, 0).is_vacant());
    assert_eq!(game.drain_events().len(), 5);

    let distillery = scenario.category("distillery").expect("in catalog");
    let outcome = game
        .try_place_building(TilePos::new(5, 0), distillery)
        .expect("inside the map");
    assert_eq!(
        outcome,
        hexhold::PlacementOutcome::Rejected(PlacementRejection::InsufficientPlanks)
    );
}

#[test]
fn production_chain_runs_for_twelve_ticks() {
    let scenario = load("river_valley.yaml");
    let mut game = scenario.build_game().expect("game builds");
    game.drain_events();
    let temp = tempdir().expect("tempdir");
    let mut engine = Engine::new(settings(&scenario, temp.path().to_path_buf(), 0)).expect("engine");

    let summary = engine.run(&mut game, 12).expect("run succeeds");

    assert_eq!(summary.ticks, 12);
    assert_eq!(summary.economy_ticks, 1);
    // wood is sawn into planks as soon as it arrives
    assert_eq!(game.available_resource(ResourceType::Wood), 0);
    assert_eq!(game.available_resource(ResourceType::Plank), 2);
    assert_eq!(game.available_resource(ResourceType::Fish), 2);
    assert_eq!(game.available_resource(ResourceType::Potato), 2);
    // 4 residents a tick, one economy tick of +25 income and -10 upkeep
    assert_eq!(game.available_money(), 740 + 48 + 25 - 10);

    let produced: Vec<GameEvent> = game.drain_events();
    assert_eq!(produced.len(), 7);
    assert!(produced
        .iter()
        .all(|event| matches!(event, GameEvent::ResourceProduced { .. })));
}

#[test]
fn commute_maps_cover_the_valley() {
    let scenario = load("river_valley.yaml");
    let game = scenario.build_game().expect("game builds");

    for placed in game.buildings() {
        let map = game.commute_map(placed.id).expect("built at placement");
        assert_eq!(map.origin(), placed.pos);
        assert_eq!(map.reachable_count(), game.grid().tile_count());
        for other in game.buildings() {
            let path = map.path_to(other.pos).expect("reachable");
            assert_eq!(path.first(), Some(&placed.pos));
            assert_eq!(path.last(), Some(&other.pos));
        }
    }
}

#[test]
fn snapshots_follow_the_interval() {
    let scenario = load("river_valley.yaml");
    let mut game = scenario.build_game().expect("game builds");
    let temp = tempdir().expect("tempdir");
    let mut engine =
        Engine::new(settings(&scenario, temp.path().to_path_buf(), 30)).expect("engine");

    let summary = engine.run(&mut game, 60).expect("run succeeds");
    assert_eq!(summary.snapshots.len(), 2);

    let dir = temp.path().join("river_valley");
    assert!(dir.join("tick_000030.json").exists());
    let last = load_snapshot(dir.join("tick_000060.json")).expect("snapshot loads");
    assert_eq!(last.tick, 60);
    assert_eq!(last.money, game.available_money());
    assert_eq!(last.buildings.len(), 5);
    assert_eq!(
        last.resource(ResourceType::Plank),
        Some(game.available_resource(ResourceType::Plank))
    );
}

#[test]
fn procedural_scenario_is_deterministic() {
    let scenario = load("highlands.yaml");
    let first: Game = scenario.build_game().expect("game builds");
    let second: Game = scenario.build_game().expect("game builds");

    assert_eq!(first.grid().tile_count(), 24 * 16);
    let types = |game: &Game| {
        game.grid()
            .tiles()
            .iter()
            .map(|tile| tile.tile_type())
            .collect::<Vec<_>>()
    };
    assert_eq!(types(&first), types(&second));
    assert_eq!(scenario.ticks(None), 60);
    assert_eq!(scenario.logging.level, "warn");
}
