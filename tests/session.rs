use elemental::board::Element;
use elemental::engine::GameEngine;
use elemental::levels::LevelCatalog;
use elemental::store::{HighScoreStore, JsonFileStore};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;

const CATALOG: &str = r#"{
  "levels": [
    { "id": 1, "name": "Pair", "rows": 1, "cols": 2, "layout": ["earth", "water"] },
    { "id": 2, "name": "Sampled", "rows": 3, "cols": 3, "palette": ["earth", "water", "fire", "air"] }
  ]
}"#;

#[test]
fn test_high_score_survives_sessions() {
    let path = std::env::temp_dir().join(format!("elemental-session-{}.json", std::process::id()));
    let _ = fs::remove_file(&path);

    let catalog = LevelCatalog::from_json(CATALOG).unwrap();
    let level = catalog.first().unwrap().clone();
    let mut rng = SmallRng::seed_from_u64(3);

    let store = JsonFileStore::open(&path).unwrap();
    let mut engine = GameEngine::new(level.clone(), Box::new(store), &mut rng).unwrap();
    assert_eq!(engine.high_score(), 0);

    let update = engine.tap(0, 0).unwrap();
    assert!(update.entered_game_over);
    assert_eq!(engine.board().count(Element::Clay), 2);
    assert_eq!(engine.score(), 1);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.load(1), 1);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("highScore_level_1"));

    let engine = GameEngine::new(level, Box::new(reopened), &mut rng).unwrap();
    assert_eq!(engine.high_score(), 1);
    assert_eq!(engine.score(), 0);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_catalog_navigation_and_sampled_level() {
    let catalog = LevelCatalog::from_json(CATALOG).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.next(1).map(|l| l.id), Some(2));
    assert!(catalog.next(2).is_none());
    assert_eq!(catalog.previous(2).map(|l| l.id), Some(1));

    let sampled = catalog.get(2).unwrap();
    assert!(sampled.offers_new_game());
    assert!(!catalog.get(1).unwrap().offers_new_game());

    let engine = GameEngine::new(
        sampled.clone(),
        Box::new(elemental::MemoryStore::new()),
        &mut SmallRng::seed_from_u64(11),
    )
    .unwrap();
    let palette = [Element::Earth, Element::Water, Element::Fire, Element::Air];
    for p in engine.board().positions() {
        assert!(palette.contains(&engine.board().element(p)));
    }
}

#[test]
fn test_catalog_rejects_bad_layout() {
    let bad = r#"{ "levels": [ { "id": 1, "rows": 2, "cols": 2, "layout": ["earth"] } ] }"#;
    assert!(matches!(
        LevelCatalog::from_json(bad),
        Err(elemental::EngineError::InvalidConfiguration(_))
    ));
}
