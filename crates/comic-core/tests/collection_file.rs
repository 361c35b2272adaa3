//! Collection file tests
//!
//! Saving and reloading through real files and JSON text

use comic_core::{
    build_export_document, load_str, normalize_record, sort_default, Action, AppSettings,
    AppState, DocumentFormat, Field, GradeCode, Outcome, Record, ViewState, Viewport,
    MAIN_TABLE_ID,
};
use std::fs;
use tempfile::tempdir;

fn comic(title: &str, issue: &str, month: Option<&str>) -> Record {
    normalize_record(Record {
        title: title.to_string(),
        publisher: "Marvel".to_string(),
        volume: "1".to_string(),
        issue: issue.to_string(),
        month: month.map(str::to_string),
        year: "1963".to_string(),
        quantity: 2,
        value: "15".to_string(),
        condition: GradeCode::Vg,
        comic_type: Some("Annual".to_string()),
        writer: vec!["Stan Lee".to_string()],
        artist: vec!["Steve Ditko".to_string(), "Jack Kirby".to_string()],
        comments: Some("cover detached".to_string()),
        ..Default::default()
    })
}

fn sample_view() -> ViewState {
    let mut view = ViewState::default();
    view.set_filter(Field::Publisher, "marvel");
    view.set_filter(Field::Artist, "ditko");
    view.use_or_filtering = true;
    view.toggle_sort(Viewport::Default, MAIN_TABLE_ID, Field::Year);
    view.toggle_sort(Viewport::Desktop, MAIN_TABLE_ID, Field::Title);
    view.toggle_sort(Viewport::Desktop, MAIN_TABLE_ID, Field::Title);
    view.set_column_visible(Viewport::Mobile, Field::Value, true);
    view
}

/// Export then load gives back the same records and view state
#[test]
fn test_export_import_round_trip() {
    let records = sort_default(vec![
        comic("The Amazing Spider-Man", "1", Some("3")),
        comic("Fantastic Four", "12", None),
        comic("Fantastic Four", "2", Some("1")),
    ]);
    let view = sample_view();

    let json = build_export_document(&records, &view, Some(&AppSettings::default()))
        .to_json()
        .expect("serialize export");
    let loaded = load_str(&json, &ViewState::default()).expect("load export");

    assert_eq!(loaded.format, DocumentFormat::Versioned);
    assert_eq!(loaded.records, records);
    assert_eq!(loaded.view_state, Some(view));
    assert!(loaded.settings.is_some());
}

/// Save through the controller and load the file into a fresh state
#[test]
fn test_save_and_load_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("spidey.json");

    let mut state = AppState::new();
    state.dispatch(Action::AddRecord(comic("Amazing Fantasy", "15", Some("8")))).unwrap();
    state.dispatch(Action::AddRecord(comic("Tales of Suspense", "39", Some("3")))).unwrap();
    state
        .dispatch(Action::SetFilter {
            field: Field::Title,
            pattern: "amazing".to_string(),
        })
        .unwrap();
    state.save_to_file(&path).expect("save collection");

    let mut reloaded = AppState::new();
    let outcome = reloaded.load_from_file(&path).expect("load collection");

    assert_eq!(outcome, Outcome::Loaded { count: 2 });
    assert_eq!(reloaded.file_name.as_deref(), Some("spidey.json"));
    assert_eq!(reloaded.records, state.records);
    assert_eq!(reloaded.view, state.view);
    assert_eq!(reloaded.visible_rows(MAIN_TABLE_ID).len(), 1);
}

/// Export never applies the active filter
#[test]
fn test_saved_file_holds_full_collection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("all.json");

    let mut state = AppState::new();
    for issue in ["1", "2", "3"] {
        state.dispatch(Action::AddRecord(comic("X-Men", issue, None))).unwrap();
    }
    state
        .dispatch(Action::SetFilter {
            field: Field::Issue,
            pattern: "^2$".to_string(),
        })
        .unwrap();
    state.save_to_file(&path).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["comics"].as_array().unwrap().len(), 3);
    assert_eq!(raw["version"], "2.0");
    assert_eq!(raw["filters"]["issue"], "^2$");
}

/// A bare array of partial records loads, normalized and sorted, with no view state
#[test]
fn test_legacy_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"[
            {"title": "X", "issue": "3", "value": "2.5", "month": "7", "writer": "not a list"},
            {"title": "The Avengers", "issue": "1", "condition": "??"}
        ]"#,
    )
    .unwrap();

    let mut state = AppState::new();
    state.dispatch(Action::SetOrFiltering(true)).unwrap();
    state.load_from_file(&path).unwrap();

    assert_eq!(state.records.len(), 2);
    assert_eq!(state.records[0].title, "The Avengers");
    assert_eq!(state.records[0].condition, GradeCode::Nm);
    let x = &state.records[1];
    assert_eq!(x.value, "2.50");
    assert_eq!(x.month.as_deref(), Some("07"));
    assert!(x.writer.is_empty());
    assert_eq!(x.quantity, 1);
    // legacy files carry no view state, so the prior one is kept
    assert!(state.view.use_or_filtering);
}

/// Missing files are reported with their path
#[test]
fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nope.json");

    let mut state = AppState::new();
    let err = state.load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
    assert!(state.file_name.is_none());
}

/// Batch edit the loaded collection, save, and read the edit back
#[test]
fn test_edit_then_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("edit.json");

    let mut state = AppState::new();
    state.dispatch(Action::AddRecord(comic("Hulk", "1", Some("5")))).unwrap();
    state.dispatch(Action::AddRecord(comic("Hulk", "2", Some("7")))).unwrap();
    state.dispatch(Action::AddRecord(comic("Thor", "1", None))).unwrap();
    state.save_to_file(&path).unwrap();

    let mut state = AppState::new();
    state.load_from_file(&path).unwrap();
    state
        .dispatch(Action::SetFilter {
            field: Field::Title,
            pattern: "hulk".to_string(),
        })
        .unwrap();
    state
        .dispatch(Action::ToggleSelectAll {
            table_id: MAIN_TABLE_ID.to_string(),
        })
        .unwrap();
    state.dispatch(Action::BeginBatchEdit).unwrap();

    let mut form = match &state.edit {
        comic_core::EditSession::Batch(form) => form.clone(),
        other => panic!("unexpected session {:?}", other),
    };
    form.set(Field::Comments, comic_core::FieldValue::Text("CGC".to_string()));
    let outcome = state
        .dispatch(Action::SaveBatch {
            form,
            append_comments: true,
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Updated { count: 2 });
    state.save_to_file(&path).unwrap();

    let mut reloaded = AppState::new();
    reloaded.load_from_file(&path).unwrap();
    let comments: Vec<Option<&str>> = reloaded
        .records
        .iter()
        .map(|r| r.comments.as_deref())
        .collect();
    assert_eq!(
        comments,
        vec![
            Some("cover detached CGC"),
            Some("cover detached CGC"),
            Some("cover detached")
        ]
    );
}
