use bugzap_core::{update, AppState, Msg};

#[test]
fn tick_changes_nothing() {
    let mut state = AppState::new();
    let (mut next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert!(!next.consume_dirty());
}

#[test]
fn cancel_and_save_without_anything_to_act_on_are_noops() {
    for msg in [Msg::CancelClicked, Msg::SaveClicked] {
        let (mut next, effects) = update(AppState::new(), msg);

        assert_eq!(next, AppState::new());
        assert!(effects.is_empty());
        assert!(!next.consume_dirty());
    }
}
