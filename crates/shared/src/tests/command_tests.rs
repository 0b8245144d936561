use super::*;
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Add,
    TextUpdate(String),
    Delete,
    List,
    Save(String),
}

#[derive(Default)]
struct RecordingReceiver {
    calls: RefCell<Vec<Call>>,
}

impl RecordingReceiver {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl CommandReceiver for RecordingReceiver {
    fn on_add(&self) {
        self.calls.borrow_mut().push(Call::Add);
    }

    fn on_text_update(&self, text: String) {
        self.calls.borrow_mut().push(Call::TextUpdate(text));
    }

    fn on_delete(&self) {
        self.calls.borrow_mut().push(Call::Delete);
    }

    fn on_list(&self) {
        self.calls.borrow_mut().push(Call::List);
    }

    fn on_save(&self, text: String) {
        self.calls.borrow_mut().push(Call::Save(text));
    }
}

#[test]
fn each_command_invokes_exactly_its_operation() {
    let cases = vec![
        (Command::Add, Call::Add),
        (
            Command::TextUpdate("draft".to_string()),
            Call::TextUpdate("draft".to_string()),
        ),
        (Command::Delete, Call::Delete),
        (Command::List, Call::List),
        (Command::Save("Room".to_string()), Call::Save("Room".to_string())),
    ];

    for (command, expected) in cases {
        let receiver = RecordingReceiver::default();
        dispatch(command, &receiver);
        assert_eq!(receiver.calls(), vec![expected]);
    }
}

#[test]
fn process_command_routes_through_dispatch_in_order() {
    let receiver = RecordingReceiver::default();
    receiver.process_command(Command::Save("Kotlin".to_string()));
    receiver.process_command(Command::List);
    receiver.process_command(Command::TextUpdate(String::new()));

    assert_eq!(
        receiver.calls(),
        vec![
            Call::Save("Kotlin".to_string()),
            Call::List,
            Call::TextUpdate(String::new()),
        ]
    );
}

#[test]
fn dispatch_accepts_trait_objects() {
    let receiver = RecordingReceiver::default();
    let dyn_receiver: &dyn CommandReceiver = &receiver;
    dispatch(Command::Delete, dyn_receiver);
    assert_eq!(receiver.calls(), vec![Call::Delete]);
}

#[test]
fn command_names_are_stable_log_fields() {
    assert_eq!(Command::Add.name(), "add");
    assert_eq!(Command::TextUpdate("x".into()).name(), "text_update");
    assert_eq!(Command::Delete.name(), "delete");
    assert_eq!(Command::List.name(), "list");
    assert_eq!(Command::Save("x".into()).name(), "save");
}

#[test]
fn commands_use_snake_case_tag_on_the_wire() {
    let json = serde_json::to_value(Command::Save("Compose".to_string())).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({ "command": "save", "text": "Compose" })
    );

    let parsed: Command =
        serde_json::from_value(serde_json::json!({ "command": "add" })).expect("deserialize");
    assert_eq!(parsed, Command::Add);
}
