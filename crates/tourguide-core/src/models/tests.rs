#[cfg(test)]
mod model_tests {
    use crate::{
        dom::{Selector, VirtualDocument},
        models::{
            Anchor, ButtonAction, ProgressRecord, Side, StepDescriptor, StepId, TourDefinition,
            TourId, TourStatus,
        },
    };

    fn selector(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    fn create_test_tour() -> TourDefinition {
        TourDefinition::new(
            "segmentsTour",
            vec![
                StepDescriptor::new(
                    "segments1",
                    "Contact segments",
                    "Segments categorize contacts.",
                    selector("h1.page-header-title"),
                    Side::Right,
                )
                .with_button("Next", ButtonAction::Next),
                StepDescriptor::new(
                    "segments2",
                    "Create a new segment",
                    "Click New.",
                    selector("a#new"),
                    Side::Bottom,
                )
                .with_advance_on(selector("a#new"), "click"),
                StepDescriptor::new(
                    "segments3",
                    "Segment name",
                    "Name it.",
                    selector("#leadlist_name"),
                    Side::Right,
                )
                .with_ready_wait(selector("#leadlist_name"))
                .with_button("Finish", ButtonAction::Complete),
            ],
        )
    }

    #[test]
    fn test_tour_navigation() {
        let tour = create_test_tour();
        assert_eq!(tour.len(), 3);
        assert_eq!(tour.first_step().unwrap().id, "segments1");
        assert_eq!(
            tour.next_after(&StepId::from("segments1")).unwrap().id,
            "segments2"
        );
        assert!(tour.next_after(&StepId::from("segments3")).is_none());
        assert!(tour.next_after(&StepId::from("segments99")).is_none());
        assert_eq!(tour.position(&StepId::from("segments3")), Some(2));
        assert!(!tour.contains(&StepId::from("dashboard1")));
    }

    #[test]
    fn test_empty_tour() {
        let tour = TourDefinition::new("unknownTour", vec![]);
        assert!(tour.is_empty());
        assert!(tour.first_step().is_none());
    }

    #[test]
    fn test_button_lookup_ignores_case() {
        let tour = create_test_tour();
        let step = tour.first_step().unwrap();
        assert_eq!(step.button("next").unwrap().action, ButtonAction::Next);
        assert!(step.button("Finish").is_none());
    }

    #[test]
    fn test_step_selectors() {
        let tour = create_test_tour();
        let rendered: Vec<String> = tour.steps[2]
            .selectors()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["#leadlist_name", "#leadlist_name"]);
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("LEFT".parse::<Side>().unwrap(), Side::Left);
        assert_eq!(Side::Top.as_str(), "top");
        assert!("middle".parse::<Side>().is_err());
    }

    #[test]
    fn test_anchor_resolution() {
        let document = VirtualDocument::new();
        let by_selector = Anchor::from(selector("#anonymousLeadButton"));
        let by_resolver =
            Anchor::resolver(|doc| doc.query_selector(&Selector::parse("#anonymousLeadButton").ok()?));

        assert!(by_selector.resolve(&document).is_none());
        assert!(by_resolver.resolve(&document).is_none());

        document.insert("button#anonymousLeadButton").unwrap();
        assert_eq!(by_selector.resolve(&document).unwrap().tag(), "button");
        assert_eq!(by_resolver.resolve(&document).unwrap().tag(), "button");
        assert!(by_resolver.selector().is_none());
    }

    #[test]
    fn test_step_deserialization() {
        let json = r##"{
            "id": "config2",
            "title": "Tracking Settings",
            "text": "Click here to find your tracking settings",
            "anchor": "a[href=\"#trackingconfig\"]",
            "side": "right",
            "buttons": [
                { "text": "Next", "action": "next" },
                { "text": "Go", "action": "follow", "selector": "a#mautic_config_index", "complete": true }
            ],
            "advance_on": { "selector": "a[href=\"#trackingconfig\"]", "event": "click" },
            "ready_wait": "#trackingconfig pre"
        }"##;

        let step: StepDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(step.id, "config2");
        assert_eq!(step.side, Side::Right);
        assert_eq!(step.buttons.len(), 2);
        assert_eq!(
            step.buttons[1].action,
            ButtonAction::Follow {
                selector: selector("a#mautic_config_index"),
                complete: true,
            }
        );
        assert_eq!(step.advance_on.unwrap().event, "click");
        assert_eq!(step.ready_wait.unwrap().as_str(), "#trackingconfig pre");
    }

    #[test]
    fn test_step_deserialization_rejects_bad_selector() {
        let json = r#"{ "id": "x", "title": "t", "text": "t", "anchor": "a > b" }"#;
        assert!(serde_json::from_str::<StepDescriptor>(json).is_err());
    }

    #[test]
    fn test_progress_status() {
        let mut record = ProgressRecord {
            tour_id: TourId::from("tagsTour"),
            last_shown_step: None,
            completed: false,
        };
        assert_eq!(record.status(), TourStatus::NotStarted);

        record.last_shown_step = Some(StepId::from("tags1"));
        assert_eq!(record.status(), TourStatus::InProgress);

        record.completed = true;
        assert_eq!(record.status(), TourStatus::Completed);
        assert_eq!(record.status().as_str(), "completed");
    }
}
