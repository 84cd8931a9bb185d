// 検索セッション（ロード・クエリ・選択）の統合テスト

use fzprompt::{
    Answer, CandidateId, CandidateSource, Choice, EngineError, LoaderState, SearchConfig,
    SearchController, SearchEvent, SessionAnswers,
};
use std::time::Duration;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fruits() -> SearchController<String> {
    init_logger();
    let mut controller = SearchController::new(SearchConfig::default());
    controller.set_candidates(CandidateSource::from_static([
        "apple", "apricot", "banana", "cherry",
    ]));
    controller
}

fn ranked_names(controller: &SearchController<String>) -> Vec<String> {
    controller
        .current_ranked_list()
        .ids()
        .map(|id| controller.store().get(id).unwrap().value.clone())
        .collect()
}

#[test]
fn test_selection_survives_filtering() {
    let mut controller = fruits();
    let banana = CandidateId::Index(2);
    assert!(controller.toggle(&banana));

    controller.update_query("ap");
    assert!(!controller.current_ranked_list().contains(&banana));
    assert!(controller.is_selected(&banana));

    controller.update_query("");
    assert!(controller.is_selected(&banana));
    assert_eq!(controller.selected(), vec!["banana".to_string()]);
}

#[test]
fn test_set_all_applies_to_visible_only() {
    let mut controller = fruits();
    controller.update_query("ap");
    controller.set_all(true);
    controller.update_query("");
    assert_eq!(
        controller.selected(),
        vec!["apple".to_string(), "apricot".to_string()]
    );

    controller.invert_all();
    assert_eq!(
        controller.selected(),
        vec!["banana".to_string(), "cherry".to_string()]
    );
    assert_eq!(controller.info().selected, 2);
}

#[test]
fn test_toggle_highlighted_follows_cursor() {
    let mut controller = fruits();
    controller.update_query("a");
    controller.move_cursor(1);
    let highlighted = controller.highlighted().unwrap().id.clone();
    assert!(controller.toggle_highlighted());
    assert!(controller.is_selected(&highlighted));
}

#[test]
fn test_multiselect_answer_keeps_store_order() {
    let mut controller = SearchController::new(SearchConfig {
        multiselect: true,
        ..SearchConfig::default()
    });
    controller.set_candidates(CandidateSource::Static(vec![
        Choice::new("one", 1).into(),
        Choice::new("two", 2).into(),
        Choice::new("three", 3).into(),
    ]));
    controller.toggle(&CandidateId::Index(2));
    controller.toggle(&CandidateId::Index(0));
    assert_eq!(controller.answer(), Answer::Multiple(vec![1, 3]));
}

#[test]
fn test_async_source_without_runtime_fails() {
    let mut controller = SearchController::<String>::new(SearchConfig::default());
    let state = controller.set_candidates(CandidateSource::from_async(|| async {
        Ok(vec!["never".into()])
    }));
    assert!(matches!(
        state.error().map(|err| err.as_ref()),
        Some(EngineError::InvalidCandidateSource(_))
    ));
    assert!(controller.current_ranked_list().is_empty());
}

#[test]
fn test_duplicate_keys_fail_the_load() {
    let mut controller = SearchController::new(SearchConfig::default());
    let state = controller.set_candidates(CandidateSource::Static(vec![
        Choice::new("a", 1).key("same").into(),
        Choice::new("b", 2).key("same").into(),
    ]));
    assert!(matches!(
        state.error().map(|err| err.as_ref()),
        Some(EngineError::InvalidCandidateSource(_))
    ));
    assert!(controller.store().is_empty());
}

#[test]
fn test_debounced_query_ranks_on_poll() {
    let mut controller = SearchController::new(SearchConfig {
        debounce: true,
        ..SearchConfig::default()
    });
    let names: Vec<String> = (0..100).map(|i| format!("item{}", i)).collect();
    controller.set_candidates(CandidateSource::from_static(names));
    assert_eq!(controller.info().matched, 100);

    assert_eq!(controller.time_until_ready(), None);

    controller.update_query("item99");
    assert_eq!(controller.info().matched, 100);
    let wait = controller.time_until_ready().unwrap();
    assert!(wait <= Duration::from_millis(100));

    std::thread::sleep(wait + Duration::from_millis(50));
    controller.poll();
    assert_eq!(controller.info().matched, 1);
    assert_eq!(controller.current_ranked_list().query, "item99");
    assert_eq!(controller.time_until_ready(), None);
}

#[test]
fn test_new_candidates_drop_pending_query() {
    let mut controller = SearchController::new(SearchConfig {
        debounce: true,
        ..SearchConfig::default()
    });
    let names: Vec<String> = (0..100).map(|i| format!("item{}", i)).collect();
    controller.set_candidates(CandidateSource::from_static(names));

    controller.update_query("item9");
    assert!(controller.time_until_ready().is_some());
    controller.set_candidates(CandidateSource::from_static(["item9", "other"]));
    assert_eq!(controller.time_until_ready(), None);
    assert_eq!(controller.info().matched, 1);
}

#[tokio::test]
async fn test_edits_during_loading_are_ranked_once_ready() {
    let mut controller = SearchController::<String>::new(SearchConfig::default());
    let state = controller.set_candidates(CandidateSource::from_async(|| async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(vec!["apple".into(), "banana".into(), "apricot".into()])
    }));
    assert!(state.is_loading());

    controller.update_query("ap");
    assert!(controller.current_ranked_list().is_empty());
    assert!(!controller.toggle_highlighted());

    let state = controller.wait_until_loaded().await;
    assert!(state.is_ready());
    assert_eq!(ranked_names(&controller), vec!["apple", "apricot"]);
}

#[tokio::test]
async fn test_subscribers_see_loader_and_results() {
    init_logger();
    let mut controller = SearchController::<String>::new(SearchConfig::default());
    let mut events = controller.subscribe();
    controller.set_candidates(CandidateSource::from_async(|| async {
        Ok(vec!["a".into(), "b".into()])
    }));
    controller.wait_until_loaded().await;
    controller.update_query("b");

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen[0], SearchEvent::Loader(LoaderState::Loading)));
    assert!(matches!(&seen[1], SearchEvent::Results(list) if list.is_empty()));
    assert!(matches!(seen[2], SearchEvent::Loader(LoaderState::Ready)));
    assert!(matches!(&seen[3], SearchEvent::Results(list) if list.len() == 2));
    assert!(matches!(&seen[4], SearchEvent::Results(list) if list.len() == 1 && list.query == "b"));
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_failing_producer_reports_load_failure() {
    init_logger();
    let mut controller = SearchController::<String>::new(SearchConfig::default());
    controller.set_candidates(CandidateSource::from_async(|| async {
        Err(anyhow::anyhow!("backend unavailable"))
    }));
    let state = controller.wait_until_loaded().await;

    let err = state.error().unwrap();
    assert!(matches!(err.as_ref(), EngineError::CandidateLoadFailure { .. }));
    assert!(err.to_string().contains("backend unavailable"));
    assert!(controller.current_ranked_list().is_empty());
}

#[tokio::test]
async fn test_deferred_source_reads_answers_and_reloads() {
    let mut answers = SessionAnswers::new();
    answers.insert("kind".to_string(), serde_json::json!("fruit"));

    let mut controller =
        SearchController::<String>::new(SearchConfig::default()).with_answers(answers);
    controller.set_candidates(CandidateSource::deferred(|answers: &SessionAnswers| {
        let kind = answers
            .get("kind")
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_string();
        async move {
            let names: Vec<&str> = match kind.as_str() {
                "fruit" => vec!["apple", "banana"],
                _ => vec!["carrot"],
            };
            Ok(names.into_iter().map(Into::into).collect())
        }
    }));
    controller.wait_until_loaded().await;
    assert_eq!(ranked_names(&controller), vec!["apple", "banana"]);

    let mut answers = SessionAnswers::new();
    answers.insert("kind".to_string(), serde_json::json!("vegetable"));
    controller.set_answers(answers);
    assert!(controller.reload().is_loading());
    controller.wait_until_loaded().await;
    assert_eq!(ranked_names(&controller), vec!["carrot"]);

    // Identities are not reused by the new cycle
    assert_eq!(
        controller.store().iter().next().unwrap().id,
        CandidateId::Index(2)
    );
}

#[tokio::test]
async fn test_abort_stops_pending_load() {
    let mut controller = SearchController::<String>::new(SearchConfig::default());
    controller.set_candidates(CandidateSource::from_async(|| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec!["late".into()])
    }));
    assert!(controller.loader_state().is_loading());

    controller.abort();
    assert_eq!(controller.loader_state(), LoaderState::Unloaded);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(controller.poll(), LoaderState::Unloaded);
    assert!(controller.store().is_empty());
}

#[tokio::test]
async fn test_reload_resets_selection_to_new_cycle() {
    let mut controller = SearchController::<String>::new(SearchConfig {
        multiselect: true,
        ..SearchConfig::default()
    });
    controller.set_candidates(CandidateSource::deferred(|_: &SessionAnswers| async {
        Ok(vec![
            Choice::from("a").into(),
            Choice::from("b").enabled(true).into(),
        ])
    }));
    controller.wait_until_loaded().await;
    controller.set_all(true);
    assert_eq!(controller.info().selected, 2);

    controller.reload();
    controller.wait_until_loaded().await;

    assert_eq!(controller.info().selected, controller.selected().len());
    assert_eq!(controller.selected(), vec!["b".to_string()]);
    assert!(controller
        .selected_ids()
        .iter()
        .all(|id| controller.store().contains(id)));
    assert_eq!(controller.answer(), Answer::Multiple(vec!["b".to_string()]));
}
