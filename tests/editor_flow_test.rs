use servicemap::export::{self, ExportFormat};
use servicemap::filters::{FilterIndex, LabelIndex, OwnerIndex};
use servicemap::graph::{dependencies, services, Element, ShapeClass};
use servicemap::history::{
    DetailPanel, GraphSurface, HistorySession, RestoreContext, StatusSink,
};
use servicemap::keymap::KeyEvent;
use servicemap::parser;
use servicemap::store::{ElementStore, MemoryStore};

const SAMPLE_CSV: &str = "\
id,name,labels,tier,owner,verified,depends_on
api,API Gateway,edge;platform,1,team-a,true,user-db;order-topic
user-db,User Storage,data,2,team-b,,
order-topic,Orders,messaging,3,team-a,1,
web,Web Frontend,edge,,team-c,false,api";

#[derive(Default)]
struct FakeCanvas {
    elements: Vec<Element>,
    selection_clears: usize,
    dimming_clears: usize,
}

impl GraphSurface for FakeCanvas {
    fn remove_all(&mut self) {
        self.elements.clear();
    }
    fn insert_elements(&mut self, elements: &[Element]) {
        self.elements.extend_from_slice(elements);
    }
    fn clear_selection(&mut self) {
        self.selection_clears += 1;
    }
    fn clear_dimming(&mut self) {
        self.dimming_clears += 1;
    }
}

#[derive(Default)]
struct FakePanel {
    hidden: bool,
}

impl DetailPanel for FakePanel {
    fn hide(&mut self) {
        self.hidden = true;
    }
}

#[derive(Default)]
struct StatusLog {
    messages: Vec<String>,
}

impl StatusSink for StatusLog {
    fn status(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

struct Editor {
    canvas: FakeCanvas,
    labels: LabelIndex,
    owners: OwnerIndex,
    panel: FakePanel,
    store: MemoryStore,
    status: StatusLog,
}

impl Editor {
    fn new() -> Self {
        Self {
            canvas: FakeCanvas::default(),
            labels: LabelIndex::new(),
            owners: OwnerIndex::new(),
            panel: FakePanel::default(),
            store: MemoryStore::new(),
            status: StatusLog::default(),
        }
    }

    fn ctx(&mut self) -> RestoreContext<'_> {
        RestoreContext {
            surface: &mut self.canvas,
            label_index: &mut self.labels,
            owner_index: &mut self.owners,
            panel: &mut self.panel,
            store: &mut self.store,
            status: &mut self.status,
        }
    }
}

#[test]
fn test_ingest_seeds_history_and_undo_round_trips() {
    let outcome = parser::parse(SAMPLE_CSV);
    assert!(outcome.is_ok());
    assert_eq!(outcome.skipped_count, 0);

    let nodes = services(&outcome.elements);
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[0].shape_class, ShapeClass::None);
    assert_eq!(nodes[1].shape_class, ShapeClass::Database);
    assert_eq!(nodes[2].shape_class, ShapeClass::Queue);
    assert_eq!(dependencies(&outcome.elements).len(), 3);

    let mut editor = Editor::new();
    let mut session = HistorySession::new();
    session.initialize(&outcome.elements);

    // Simulate an edit: the user deletes the web frontend node and its edge.
    let edited: Vec<Element> = outcome
        .elements
        .iter()
        .filter(|e| e.id() != "web" && e.id() != "web->api")
        .cloned()
        .collect();
    assert!(session.record(&edited));

    assert!(session.undo(&mut editor.ctx()));
    assert_eq!(editor.canvas.elements, outcome.elements);
    assert_eq!(editor.status.messages, vec!["Undo applied"]);

    // The restored node set drives the filter indices.
    let labels: Vec<&str> = editor.labels.values().collect();
    assert_eq!(labels, vec!["edge", "platform", "data", "messaging"]);
    let owners: Vec<&str> = editor.owners.values().collect();
    assert_eq!(owners, vec!["team-a", "team-b", "team-c"]);

    // Write-through bypasses snapshot recording.
    assert_eq!(editor.store.save_count(), 1);
    assert!(editor.store.last_options().unwrap().skip_history);
    assert_eq!(editor.store.load().unwrap(), Some(outcome.elements.clone()));

    assert!(session.redo(&mut editor.ctx()));
    assert_eq!(editor.canvas.elements, edited);
    assert!(editor.panel.hidden);
}

#[test]
fn test_keyboard_driven_undo_redo() {
    let outcome = parser::parse(SAMPLE_CSV);
    let mut editor = Editor::new();
    let mut session = HistorySession::new();
    session.initialize(&outcome.elements);

    let edited = vec![outcome.elements[0].clone()];
    session.record(&edited);

    let ctrl_z = KeyEvent {
        key: "z".to_string(),
        ctrl: true,
        ..KeyEvent::default()
    };
    assert!(session.handle_key(&ctrl_z, &mut editor.ctx()).is_some());
    assert_eq!(editor.canvas.elements, outcome.elements);

    let ctrl_y = KeyEvent {
        key: "y".to_string(),
        ctrl: true,
        ..KeyEvent::default()
    };
    assert!(session.handle_key(&ctrl_y, &mut editor.ctx()).is_some());
    assert_eq!(editor.canvas.elements, edited);

    // Typing in a text field never triggers history.
    let in_input = KeyEvent {
        key: "z".to_string(),
        ctrl: true,
        editable_target: true,
        ..KeyEvent::default()
    };
    let before = editor.canvas.elements.clone();
    assert!(session.handle_key(&in_input, &mut editor.ctx()).is_none());
    assert_eq!(editor.canvas.elements, before);
}

#[test]
fn test_csv_export_round_trips_through_parse() {
    let outcome = parser::parse(SAMPLE_CSV);
    let rendered = export::render(&outcome.elements, ExportFormat::Csv).unwrap();
    let reparsed = parser::parse(&rendered);

    assert!(reparsed.is_ok());
    assert_eq!(reparsed.elements, outcome.elements);
}

#[test]
fn test_json_export_contains_full_collection() {
    let outcome = parser::parse(SAMPLE_CSV);
    let rendered = export::render(&outcome.elements, ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["services"].as_array().unwrap().len(), 4);
    assert_eq!(value["dependencies"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_async_parse_matches_sync_parse() {
    let sync_outcome = parser::parse(SAMPLE_CSV);
    let async_outcome = parser::parse_async(SAMPLE_CSV.to_string()).await;
    assert_eq!(async_outcome.elements, sync_outcome.elements);
    assert_eq!(async_outcome.error_kind, None);
}
