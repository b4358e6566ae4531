//! Tests for the orchestrator module.

use std::time::Duration;

use super::*;
use crate::dom::VirtualDocument;
use crate::engine::{EngineCall, HeadlessEngineFactory};
use crate::models::{ButtonAction, Side, StepDescriptor, TourDefinition};
use crate::routes::RouteRule;
use crate::storage::fallback::tests::BrokenStorage;
use crate::storage::{FallbackStorage, MemoryStorage, Scope, Storage};
use crate::waiter::WaitPolicy;

struct Harness {
    document: Arc<VirtualDocument>,
    engines: Arc<HeadlessEngineFactory>,
    durable: Arc<MemoryStorage>,
    session: Arc<MemoryStorage>,
    orchestrator: Orchestrator,
}

impl Harness {
    async fn new() -> Self {
        Self::with(OrchestratorBuilder::new()).await
    }

    async fn with(builder: OrchestratorBuilder) -> Self {
        let document = Arc::new(VirtualDocument::new());
        let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let orchestrator = builder
            .with_storages(durable.clone(), session.clone())
            .build(document.clone(), engines.clone())
            .await
            .expect("Failed to build orchestrator");
        Self {
            document,
            engines,
            durable,
            session,
            orchestrator,
        }
    }

    fn step(&self) -> Option<&str> {
        match self.orchestrator.state() {
            OrchestratorState::Active {
                step_id: Some(step_id),
                ..
            } => Some(step_id.as_str()),
            _ => None,
        }
    }

    fn press(&mut self, text: &str) {
        let session = self.orchestrator.session().expect("No active tour");
        assert!(session.press(text), "No button '{text}'");
        self.orchestrator.settle();
    }

    fn insert(&mut self, selector: &str) {
        self.document.insert(selector).unwrap();
        self.orchestrator.settle();
    }

    fn click(&mut self, selector: &str) -> bool {
        let dispatched = self
            .document
            .dispatch(&Selector::parse(selector).unwrap(), "click");
        self.orchestrator.settle();
        dispatched
    }

    fn stored_step(&self, key: &str) -> Option<String> {
        self.session.get_item(key).unwrap()
    }
}

fn letters_tour() -> TourDefinition {
    let header = Selector::parse("h1").unwrap();
    TourDefinition::new(
        "lettersTour",
        ["s1", "s2", "s3", "s4"]
            .iter()
            .map(|id| {
                StepDescriptor::new(*id, "Step", "Text", header.clone(), Side::Bottom)
                    .with_button("Next", ButtonAction::Next)
            })
            .collect(),
    )
}

fn letters_builder() -> OrchestratorBuilder {
    OrchestratorBuilder::new()
        .with_catalog(TourCatalog::new(vec![letters_tour()]).unwrap())
        .with_routes(RouteTable::new(vec![RouteRule::prefix("/letters", "lettersTour")]))
}

#[tokio::test]
async fn test_first_visit_stores_first_step() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/dashboard");

    assert_eq!(h.step(), Some("dashboard1"));
    assert_eq!(h.stored_step("dashboardTourStep").as_deref(), Some("dashboard1"));
    assert_eq!(h.engines.created(), 1);

    let calls = h.engines.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], EngineCall::AddStep("dashboard1".into()));
    assert_eq!(calls[5], EngineCall::Start);
}

#[tokio::test]
async fn test_dashboard_walkthrough_completes() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/dashboard");

    h.press("Next");
    assert_eq!(
        h.orchestrator.waiting_for().map(Selector::as_str),
        Some("form[name=\"daterange\"]")
    );
    assert_eq!(h.step(), Some("dashboard1"));

    h.insert("form[name=\"daterange\"]");
    assert_eq!(h.step(), Some("dashboard2"));
    assert!(h.orchestrator.waiting_for().is_none());

    h.press("Next");
    h.press("Next");
    h.press("Next");
    assert_eq!(h.step(), Some("dashboard5"));
    assert_eq!(h.stored_step("dashboardTourStep").as_deref(), Some("dashboard5"));

    h.press("Go to Configuration");
    assert_eq!(
        h.orchestrator.state(),
        &OrchestratorState::Finished("dashboardTour".into())
    );
    assert_eq!(
        h.durable.get_item("dashboardTourCompleted").unwrap().as_deref(),
        Some("true")
    );
    assert_eq!(h.stored_step("dashboardTourStep"), None);
    assert!(h.orchestrator.session().is_none());
}

#[tokio::test]
async fn test_completed_tour_is_skipped() {
    let mut h = Harness::new().await;
    h.durable.set_item("contactsTourCompleted", "true").unwrap();

    h.orchestrator.load_page("/s/contacts");

    assert_eq!(
        h.orchestrator.state(),
        &OrchestratorState::CompletedSkip("contactsTour".into())
    );
    assert!(h.orchestrator.session().is_none());
    assert_eq!(h.engines.created(), 0);
    assert!(h.engines.calls().is_empty());
    assert!(h.session.keys().unwrap().is_empty());
}

#[tokio::test]
async fn test_completion_survives_page_loads() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/tags");
    h.orchestrator.session().unwrap().handle().complete();
    h.orchestrator.settle();
    assert_eq!(h.orchestrator.state(), &OrchestratorState::Finished("tagsTour".into()));

    h.orchestrator.load_page("/s/tags/new");
    assert_eq!(
        h.orchestrator.state(),
        &OrchestratorState::CompletedSkip("tagsTour".into())
    );
    assert_eq!(h.engines.created(), 1);
}

#[tokio::test]
async fn test_resumes_at_stored_step() {
    let mut h = Harness::with(letters_builder()).await;
    h.orchestrator
        .progress()
        .set_resume_step(&"lettersTour".into(), &"s3".into());

    h.orchestrator.load_page("/letters");

    assert_eq!(h.step(), Some("s3"));
    let calls = h.engines.calls();
    assert_eq!(calls.last(), Some(&EngineCall::Show("s3".into())));
    assert!(!calls.contains(&EngineCall::Start));
}

#[tokio::test]
async fn test_resume_across_page_loads() {
    let mut h = Harness::with(letters_builder()).await;
    h.orchestrator.load_page("/letters");
    h.press("Next");
    assert_eq!(h.step(), Some("s2"));

    h.orchestrator.load_page("/letters/edit");
    assert_eq!(h.step(), Some("s2"));
    assert_eq!(h.engines.created(), 2);
}

#[tokio::test]
async fn test_stale_resume_step_starts_over() {
    let mut h = Harness::new().await;
    h.session.set_item("contactsTourStep", "contacts-step9").unwrap();

    h.orchestrator.load_page("/s/contacts");

    assert_eq!(h.step(), Some("contacts-step1"));
    assert_eq!(h.engines.calls().last(), Some(&EngineCall::Start));
}

#[tokio::test]
async fn test_unmapped_path_is_idle() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/login");

    assert_eq!(h.orchestrator.state(), &OrchestratorState::Idle);
    assert_eq!(h.engines.created(), 0);
}

#[tokio::test]
async fn test_reset_shortcut_restarts_from_first_step() {
    let mut h = Harness::new().await;
    h.document.insert("form[name=\"daterange\"]").unwrap();
    h.orchestrator.load_page("/s/dashboard");
    h.press("Next");
    h.press("Next");
    assert_eq!(h.step(), Some("dashboard3"));
    h.durable.set_item("formsTourCompleted", "true").unwrap();

    h.orchestrator.handle_key(KeyEvent::new("r").ctrl().alt());

    assert_eq!(h.step(), Some("dashboard1"));
    assert_eq!(h.stored_step("dashboardTourStep").as_deref(), Some("dashboard1"));
    assert_eq!(h.durable.get_item("formsTourCompleted").unwrap(), None);
    assert_eq!(h.durable.get_item("dashboardTourCompleted").unwrap(), None);
    assert_eq!(h.engines.created(), 2);
    assert!(h.engines.calls().contains(&EngineCall::Complete));
}

#[tokio::test]
async fn test_other_keys_are_ignored() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/dashboard");
    h.orchestrator.handle_key(KeyEvent::new("r").ctrl());
    h.orchestrator.handle_key(KeyEvent::new("x").ctrl().alt());
    assert_eq!(h.engines.created(), 1);
}

#[tokio::test]
async fn test_reset_after_completion_runs_tour_again() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/forms");
    h.orchestrator.session().unwrap().handle().complete();
    h.orchestrator.settle();
    assert!(h.orchestrator.progress().is_completed(&"formsTour".into()));

    h.orchestrator.reset();

    assert_eq!(h.step(), Some("forms1"));
    assert!(!h.orchestrator.progress().is_completed(&"formsTour".into()));
}

#[tokio::test]
async fn test_reset_on_unmapped_page_only_clears_progress() {
    let mut h = Harness::new().await;
    h.durable.set_item("tagsTourCompleted", "true").unwrap();
    h.orchestrator.load_page("/s/login");

    h.orchestrator.reset();

    assert_eq!(h.orchestrator.state(), &OrchestratorState::Idle);
    assert!(h.durable.keys().unwrap().is_empty());
}

#[tokio::test]
async fn test_trigger_advances_once() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/segments");
    h.press("Next");
    assert_eq!(h.step(), Some("segments2"));
    assert_eq!(h.document.listener_count(), 1);

    h.document.insert("a#new").unwrap();
    h.document.insert("#leadlist_name").unwrap();
    assert!(h.click("a#new"));
    assert_eq!(h.step(), Some("segments3"));
    assert_eq!(h.stored_step("segmentsTourStep").as_deref(), Some("segments3"));

    assert!(h.click("a#new"));
    assert_eq!(h.step(), Some("segments3"));
}

#[tokio::test]
async fn test_trigger_waits_for_next_step_element() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/segments");
    h.press("Next");
    h.document.insert("a#new").unwrap();

    h.click("a#new");
    assert_eq!(h.step(), Some("segments2"));
    assert_eq!(
        h.orchestrator.waiting_for().map(Selector::as_str),
        Some("#leadlist_name")
    );

    h.insert("form #leadlist_name");
    assert_eq!(h.step(), Some("segments3"));
}

#[tokio::test]
async fn test_leaving_a_step_disarms_its_trigger() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/segments");
    h.press("Next");
    assert_eq!(h.document.listener_count(), 1);

    h.orchestrator.session().unwrap().handle().show("segments1");
    h.orchestrator.settle();
    assert_eq!(h.step(), Some("segments1"));
    assert_eq!(h.document.listener_count(), 0);

    h.document.insert("a#new").unwrap();
    h.click("a#new");
    assert_eq!(h.step(), Some("segments1"));
}

#[tokio::test]
async fn test_stale_trigger_is_ignored() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/segments");
    h.press("Next");
    h.document.insert("a#new").unwrap();
    h.document.insert("#leadlist_name").unwrap();

    // Both arrive before the orchestrator gets to run.
    h.orchestrator.session().unwrap().handle().show("segments4");
    h.document
        .dispatch(&Selector::parse("a#new").unwrap(), "click");
    h.orchestrator.settle();

    assert_eq!(h.step(), Some("segments4"));
}

#[tokio::test]
async fn test_follow_without_completion_clicks_and_advances() {
    let mut h = Harness::new().await;
    let clicked = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let seen = Arc::clone(&clicked);
    h.document.insert("a#mautic_config_index").unwrap();
    h.document.listen_once(
        &Selector::parse("a#mautic_config_index").unwrap(),
        "click",
        Box::new(move |_: &Element| seen.store(true, std::sync::atomic::Ordering::SeqCst)),
    );

    h.orchestrator.load_page("/s/config");
    assert_eq!(h.step(), Some("config1"));
    h.press("Go to Configuration");

    assert!(clicked.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(h.step(), Some("config1"));
    assert!(h.orchestrator.waiting_for().is_some());

    h.insert("a[href=\"#trackingconfig\"]");
    assert_eq!(h.step(), Some("config2"));
    assert!(!h.orchestrator.progress().is_completed(&"configTour".into()));
}

#[tokio::test]
async fn test_wait_timeout_abandons_step() {
    let mut h = Harness::with(
        OrchestratorBuilder::new().with_wait_policy(WaitPolicy::Timeout(Duration::from_millis(5))),
    )
    .await;
    h.orchestrator.load_page("/s/config");
    h.press("Go to Configuration");
    assert!(h.orchestrator.waiting_for().is_some());
    assert_eq!(h.document.observer_count(), 1);

    std::thread::sleep(Duration::from_millis(20));
    h.orchestrator.settle();

    assert!(h.orchestrator.waiting_for().is_none());
    assert_eq!(h.document.observer_count(), 0);
    assert_eq!(h.step(), Some("config1"));

    h.insert("a[href=\"#trackingconfig\"]");
    assert_eq!(h.step(), Some("config1"));
}

#[tokio::test]
async fn test_timed_out_trigger_wait_leaves_step_stuck() {
    let mut h = Harness::with(
        OrchestratorBuilder::new().with_wait_policy(WaitPolicy::Timeout(Duration::from_millis(5))),
    )
    .await;
    h.orchestrator.load_page("/s/segments");
    h.press("Next");
    h.document.insert("a#new").unwrap();
    assert_eq!(h.document.listener_count(), 1);

    assert!(h.click("a#new"));
    assert_eq!(h.document.listener_count(), 0);
    assert!(h.orchestrator.waiting_for().is_some());

    std::thread::sleep(Duration::from_millis(20));
    h.orchestrator.settle();

    assert!(h.orchestrator.waiting_for().is_none());
    assert_eq!(h.step(), Some("segments2"));
    assert!(h.orchestrator.session().unwrap().current_step().unwrap().buttons.is_empty());

    h.document.insert("#leadlist_name").unwrap();
    h.click("a#new");
    assert_eq!(h.step(), Some("segments2"));

    h.orchestrator.load_page("/s/segments");
    assert_eq!(h.step(), Some("segments2"));
    assert_eq!(h.document.listener_count(), 1);
}

#[tokio::test]
async fn test_indefinite_wait_stays_pending() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/config");
    h.press("Go to Configuration");

    std::thread::sleep(Duration::from_millis(20));
    h.insert("div.unrelated");

    assert_eq!(
        h.orchestrator.waiting_for().map(Selector::as_str),
        Some("a[href=\"#trackingconfig\"]")
    );
    assert_eq!(h.step(), Some("config1"));
}

#[tokio::test]
async fn test_run_until_wakes_on_element() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/config");
    h.press("Go to Configuration");

    let document = h.document.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        document.insert("a[href=\"#trackingconfig\"]").unwrap();
    });
    h.orchestrator
        .run_until(tokio::time::sleep(Duration::from_millis(100)))
        .await;

    assert_eq!(h.step(), Some("config2"));
}

#[tokio::test]
async fn test_run_until_processes_handle_commands() {
    let mut h = Harness::with(letters_builder()).await;
    h.orchestrator.load_page("/letters");
    let handle = h.orchestrator.session().unwrap().handle();

    handle.next();
    handle.next();
    h.orchestrator
        .run_until(tokio::time::sleep(Duration::from_millis(20)))
        .await;

    assert_eq!(h.step(), Some("s3"));
}

#[tokio::test]
async fn test_next_on_last_step_completes() {
    let mut h = Harness::with(letters_builder()).await;
    h.orchestrator.load_page("/letters");
    h.orchestrator.session().unwrap().handle().show("s4");
    h.orchestrator.settle();

    h.press("Next");

    assert_eq!(
        h.orchestrator.state(),
        &OrchestratorState::Finished("lettersTour".into())
    );
    assert!(h.orchestrator.progress().is_completed(&"lettersTour".into()));
}

#[tokio::test]
async fn test_handles_from_ended_activation_are_ignored() {
    let mut h = Harness::with(letters_builder()).await;
    h.orchestrator.load_page("/letters");
    let old = h.orchestrator.session().unwrap().handle();

    h.orchestrator.load_page("/letters");
    old.complete();
    h.orchestrator.settle();

    assert_eq!(h.step(), Some("s1"));
    assert!(!h.orchestrator.progress().is_completed(&"lettersTour".into()));
}

#[tokio::test]
async fn test_unload_releases_page_resources() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/segments");
    h.press("Next");
    h.document.insert("a#new").unwrap();
    h.click("a#new");
    assert_eq!(h.document.listener_count(), 0);
    assert_eq!(h.document.observer_count(), 1);

    h.orchestrator.unload();

    assert_eq!(h.orchestrator.state(), &OrchestratorState::Idle);
    assert_eq!(h.document.observer_count(), 0);
    assert_eq!(h.stored_step("segmentsTourStep").as_deref(), Some("segments2"));
}

#[tokio::test]
async fn test_press_unknown_button() {
    let mut h = Harness::new().await;
    h.orchestrator.load_page("/s/contacts");
    let session = h.orchestrator.session().unwrap();
    assert!(!session.press("Finish"));
    assert_eq!(session.current_step().unwrap().id, "contacts-step1");
}

#[tokio::test]
async fn test_runs_without_working_storage() {
    let document = Arc::new(VirtualDocument::new());
    let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
    let durable: Arc<dyn Storage> = Arc::new(BrokenStorage);
    let session: Arc<dyn Storage> = Arc::new(FallbackStorage::new(
        Box::new(BrokenStorage),
        Scope::Session,
    ));
    let mut orchestrator = OrchestratorBuilder::new()
        .with_storages(durable, session)
        .build(document, engines)
        .await
        .unwrap();

    orchestrator.load_page("/s/dashboard");

    assert!(matches!(orchestrator.state(), OrchestratorState::Active { .. }));
    assert_eq!(
        orchestrator
            .progress()
            .get_resume_step(&"dashboardTour".into()),
        Some("dashboard1".into())
    );
}

#[tokio::test]
async fn test_dangling_route_fails_build() {
    let document = Arc::new(VirtualDocument::new());
    let engines = Arc::new(HeadlessEngineFactory::new(document.clone()));
    let result = OrchestratorBuilder::new()
        .with_memory_storage()
        .with_routes(RouteTable::new(vec![RouteRule::exact("/s/widgets", "widgetsTour")]))
        .build(document, engines)
        .await;
    assert!(result.is_err());
}
