mod helpers;

use helpers::rec;
use pantry::ledger::{ListKind, RemoveOutcome};
use pantry::pantry::Pantry;
use tempfile::TempDir;

#[test]
fn lists_are_independent_files() {
    let tmp = TempDir::new().unwrap();
    let mut pantry = Pantry::open(tmp.path()).unwrap();

    pantry.add(ListKind::Fridge, rec("jajka", 6.0, Some("szt"), None)).unwrap();
    pantry
        .add(ListKind::ShoppingList, rec("jajka", 10.0, Some("szt"), None))
        .unwrap();

    assert_eq!(pantry.fridge().quantity_of("jajka", Some("szt")), Some(6.0));
    assert_eq!(pantry.shopping_list().quantity_of("jajka", Some("szt")), Some(10.0));
    assert!(tmp.path().join("fridge.json").is_file());
    assert!(tmp.path().join("shopping_list.json").is_file());
}

#[test]
fn read_picks_up_changes_made_by_another_session() {
    let tmp = TempDir::new().unwrap();
    let mut first = Pantry::open(tmp.path()).unwrap();
    let mut second = Pantry::open(tmp.path()).unwrap();

    second.add(ListKind::Fridge, rec("ser", 1.0, None, None)).unwrap();

    assert!(first.fridge().records().is_empty());
    let records = first.read(ListKind::Fridge).unwrap();
    assert_eq!(records, [rec("ser", 1.0, None, Some("Inne"))]);
}

#[test]
fn last_writer_wins_across_sessions() {
    let tmp = TempDir::new().unwrap();
    let mut first = Pantry::open(tmp.path()).unwrap();
    let mut second = Pantry::open(tmp.path()).unwrap();

    first.add(ListKind::Fridge, rec("ser", 1.0, None, None)).unwrap();
    second.add(ListKind::Fridge, rec("chleb", 1.0, None, None)).unwrap();

    let mut third = Pantry::open(tmp.path()).unwrap();
    let names: Vec<String> = third
        .read(ListKind::Fridge)
        .unwrap()
        .into_iter()
        .map(|r| r.ingredient)
        .collect();
    assert_eq!(names, ["chleb"]);
}

#[test]
fn shopping_after_buying() {
    let tmp = TempDir::new().unwrap();
    let mut pantry = Pantry::open(tmp.path()).unwrap();
    pantry
        .add(ListKind::ShoppingList, rec("pomidory", 2.0, Some("kg"), Some("Warzywa")))
        .unwrap();

    let outcome = pantry
        .remove(ListKind::ShoppingList, &rec("pomidory", 2.0, Some("kg"), None))
        .unwrap();
    pantry
        .add(ListKind::Fridge, rec("pomidory", 2.0, Some("kg"), Some("Warzywa")))
        .unwrap();

    assert_eq!(outcome, RemoveOutcome::Removed);
    assert!(pantry.read(ListKind::ShoppingList).unwrap().is_empty());
    assert_eq!(pantry.read(ListKind::Fridge).unwrap().len(), 1);
}
