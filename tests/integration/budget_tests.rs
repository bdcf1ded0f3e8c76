//! Budget enforcement integration tests
//!
//! Thresholds are announced once per window, hard limits reject, and
//! allow-lists always apply.

#[cfg(test)]
mod tests {
    use ai_usage_tracker::core::budget::{
        BudgetEvent, ChannelNotifier, LimitType, StaticBudgetProvider, ThresholdStage,
    };
    use ai_usage_tracker::{
        BudgetConfig, BudgetEnforcer, BudgetError, BudgetLimits, InMemoryUsageStore, Trackable,
    };
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Fixture {
        enforcer: BudgetEnforcer,
        store: Arc<InMemoryUsageStore>,
        events: mpsc::UnboundedReceiver<BudgetEvent>,
        now: DateTime<Utc>,
    }

    impl Fixture {
        fn new(budgets: Vec<BudgetConfig>) -> Self {
            let now = DateTime::parse_from_rfc3339("2026-10-15T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc);
            let store = Arc::new(InMemoryUsageStore::new());
            let (notifier, events) = ChannelNotifier::new();
            let enforcer = BudgetEnforcer::builder(
                Arc::new(StaticBudgetProvider::new(budgets)),
                store.clone(),
            )
            .notifier(Arc::new(notifier))
            .thresholds(80.0, 95.0)
            .clock(Arc::new(move || now))
            .build();
            Self {
                enforcer,
                store,
                events,
                now,
            }
        }

        fn spend(&self, subject: &Trackable, cents: f64) {
            self.store.add(subject, self.now, cents, 0);
        }

        fn events(&mut self) -> Vec<BudgetEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                events.push(event);
            }
            events
        }
    }

    fn team() -> Trackable {
        Trackable::new("team", "core")
    }

    fn daily(cents: f64) -> BudgetLimits {
        BudgetLimits {
            daily_limit: Some(cents),
            ..Default::default()
        }
    }

    // ==================== Threshold Tests ====================

    /// Test that the warning stage fires once and a hard limit then rejects
    #[tokio::test]
    async fn test_warning_once_then_hard_rejection() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(1000.0)).hard()]);
        let subject = team();

        fixture.spend(&subject, 800.0);
        let status = fixture.enforcer.check(&subject, None, None).await.unwrap();
        assert!(status.allowed);
        assert_eq!(status.max_utilization, 80.0);

        let events = fixture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, ThresholdStage::Warning);
        assert_eq!(events[0].limit_type, LimitType::daily_cost());
        assert_eq!(events[0].usage, 800.0);
        assert!(events[0].hard_limit);

        // Still at 80%: no repeat
        fixture.enforcer.check(&subject, None, None).await.unwrap();
        assert!(fixture.events().is_empty());

        fixture.spend(&subject, 200.0);
        let err = fixture.enforcer.check(&subject, None, None).await.unwrap_err();
        match err {
            BudgetError::LimitExceeded {
                limit_type,
                limit,
                usage,
                overage,
                percentage,
                ..
            } => {
                assert_eq!(limit_type, LimitType::daily_cost());
                assert_eq!(limit, 1000.0);
                assert_eq!(usage, 1000.0);
                assert_eq!(overage, 0.0);
                assert_eq!(percentage, 100.0);
            }
            other => panic!("unexpected error: {}", other),
        }

        let events = fixture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, ThresholdStage::Exceeded);
    }

    /// Test that each stage fires exactly once as usage climbs
    #[tokio::test]
    async fn test_each_stage_fires_once() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(1000.0))]);
        let subject = team();
        let mut stages = Vec::new();

        for cents in [500.0, 300.0, 50.0, 120.0, 10.0, 100.0, 100.0] {
            fixture.spend(&subject, cents);
            fixture.enforcer.check(&subject, None, None).await.unwrap();
            fixture.enforcer.check(&subject, None, None).await.unwrap();
            stages.extend(fixture.events().into_iter().map(|e| e.stage));
        }

        assert_eq!(
            stages,
            vec![
                ThresholdStage::Warning,
                ThresholdStage::Critical,
                ThresholdStage::Exceeded
            ]
        );
    }

    /// Test that jumping straight past every stage announces only the highest
    #[tokio::test]
    async fn test_skipped_stages_not_announced() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(1000.0))]);
        let subject = team();

        fixture.spend(&subject, 1500.0);
        fixture.enforcer.check(&subject, None, None).await.unwrap();
        let events = fixture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, ThresholdStage::Exceeded);
        assert_eq!(events[0].percentage, 150.0);

        fixture.enforcer.check(&subject, None, None).await.unwrap();
        assert!(fixture.events().is_empty());
    }

    /// Test that subjects are announced independently
    #[tokio::test]
    async fn test_stages_tracked_per_subject() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(100.0))]);
        let core = team();
        let infra = Trackable::new("team", "infra");

        fixture.spend(&core, 90.0);
        fixture.spend(&infra, 90.0);
        fixture.enforcer.check(&core, None, None).await.unwrap();
        fixture.enforcer.check(&infra, None, None).await.unwrap();

        let subjects: Vec<Trackable> = fixture.events().into_iter().map(|e| e.subject).collect();
        assert_eq!(subjects, vec![core, infra]);
    }

    /// Test per-budget thresholds over the enforcer defaults
    #[tokio::test]
    async fn test_budget_thresholds_override_defaults() {
        let mut fixture = Fixture::new(vec![BudgetConfig::for_type("team")
            .with_limits(daily(1000.0))
            .with_thresholds(50.0, 70.0)]);
        let subject = team();

        fixture.spend(&subject, 600.0);
        fixture.enforcer.check(&subject, None, None).await.unwrap();
        let events = fixture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, ThresholdStage::Warning);
    }

    /// Test that usage outside the window is ignored
    #[tokio::test]
    async fn test_previous_day_usage_ignored() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(100.0)).hard()]);
        let subject = team();

        fixture
            .store
            .add(&subject, fixture.now - Duration::days(1), 500.0, 0);
        let status = fixture.enforcer.check(&subject, None, None).await.unwrap();
        assert!(status.allowed);
        assert_eq!(status.usage.daily.cost, 0.0);
        assert!(fixture.events().is_empty());
    }

    // ==================== Soft Limit Tests ====================

    /// Test that a soft limit notifies but never rejects
    #[tokio::test]
    async fn test_soft_limit_allows() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(100.0))]);
        let subject = team();

        fixture.spend(&subject, 250.0);
        let status = fixture.enforcer.check(&subject, None, None).await.unwrap();
        assert!(status.allowed);
        assert!(status.violation.is_none());
        assert!(status.worst_exceeded().is_some());
        assert_eq!(fixture.events().len(), 1);
    }

    /// Test token and request limits alongside cost
    #[tokio::test]
    async fn test_token_limit_rejects() {
        let fixture = Fixture::new(vec![BudgetConfig::for_type("team")
            .with_limits(BudgetLimits {
                daily_token_limit: Some(10_000),
                ..Default::default()
            })
            .hard()]);
        let subject = team();

        fixture.store.add(&subject, fixture.now, 0.0, 12_000);
        let err = fixture.enforcer.check(&subject, None, None).await.unwrap_err();
        assert_eq!(err.limit_type().map(|t| t.to_string()), Some("daily_tokens".to_string()));
        assert_eq!(err.subject(), &subject);
    }

    // ==================== Allow-list Tests ====================

    /// Test provider and model allow-lists, including prefix patterns
    #[tokio::test]
    async fn test_allow_lists_reject() {
        let fixture = Fixture::new(vec![BudgetConfig::for_type("team")
            .allow_providers(["openai"])
            .allow_models(["gpt-4o*"])]);
        let subject = team();

        assert!(fixture
            .enforcer
            .check(&subject, Some("OpenAI"), Some("gpt-4o-mini"))
            .await
            .is_ok());
        assert!(matches!(
            fixture
                .enforcer
                .check(&subject, Some("anthropic"), Some("gpt-4o"))
                .await,
            Err(BudgetError::ProviderNotAllowed { .. })
        ));
        assert!(matches!(
            fixture
                .enforcer
                .check(&subject, Some("openai"), Some("o3"))
                .await,
            Err(BudgetError::ModelNotAllowed { .. })
        ));
    }

    /// Test that status reports allow-list rejections without raising
    #[tokio::test]
    async fn test_status_reflects_allow_lists() {
        let mut fixture = Fixture::new(vec![BudgetConfig::for_type("team")
            .with_limits(daily(1000.0))
            .allow_providers(["openai"])
            .allow_models(["gpt-4o*"])]);
        let subject = team();

        let status = fixture.enforcer.status(&subject, Some("anthropic"), None).await;
        assert!(!status.allowed);
        assert!(matches!(
            status.violation,
            Some(BudgetError::ProviderNotAllowed { .. })
        ));
        assert!(fixture
            .enforcer
            .check(&subject, Some("anthropic"), None)
            .await
            .is_err());

        let status = fixture.enforcer.status(&subject, Some("openai"), Some("o3")).await;
        assert!(!status.allowed);
        assert!(matches!(
            status.violation,
            Some(BudgetError::ModelNotAllowed { .. })
        ));

        let status = fixture
            .enforcer
            .status(&subject, Some("openai"), Some("gpt-4o-mini"))
            .await;
        assert!(status.allowed);
        assert!(status.violation.is_none());
        assert!(fixture.events().is_empty());
    }

    // ==================== Concurrency Tests ====================

    /// Test that concurrent checks for one subject announce a stage once
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_checks_fire_once() {
        let store = Arc::new(InMemoryUsageStore::new());
        let (notifier, mut events) = ChannelNotifier::new();
        let enforcer = Arc::new(
            BudgetEnforcer::builder(
                Arc::new(StaticBudgetProvider::new(vec![
                    BudgetConfig::for_type("team").with_limits(daily(1000.0)),
                ])),
                store.clone(),
            )
            .notifier(Arc::new(notifier))
            .thresholds(80.0, 95.0)
            .build(),
        );
        let subject = team();
        store.add(&subject, Utc::now(), 850.0, 0);

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let enforcer = enforcer.clone();
                let subject = subject.clone();
                tokio::spawn(async move { enforcer.check(&subject, None, None).await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap().allowed);
        }

        let mut stages = Vec::new();
        while let Ok(event) = events.try_recv() {
            stages.push(event.stage);
        }
        assert_eq!(stages, vec![ThresholdStage::Warning]);
    }

    // ==================== Lookup Tests ====================

    /// Test that subjects without a budget, and disabled enforcement, are unlimited
    #[tokio::test]
    async fn test_unbudgeted_subjects_unlimited() {
        let fixture = Fixture::new(vec![
            BudgetConfig::for_subject(&team()).with_limits(daily(1.0)).hard(),
        ]);
        let other = Trackable::new("team", "infra");
        fixture.spend(&other, 1_000.0);

        let status = fixture.enforcer.check(&other, None, None).await.unwrap();
        assert!(status.limits.is_empty());

        let disabled = BudgetEnforcer::builder(
            Arc::new(StaticBudgetProvider::new(vec![
                BudgetConfig::for_type("team").with_limits(daily(1.0)).hard(),
            ])),
            fixture.store.clone(),
        )
        .enabled(false)
        .build();
        assert!(disabled.check(&other, None, None).await.is_ok());
        assert!(disabled.status(&other, None, None).await.limits.is_empty());
    }

    /// Test that status reports without announcing
    #[tokio::test]
    async fn test_status_does_not_notify() {
        let mut fixture =
            Fixture::new(vec![BudgetConfig::for_type("team").with_limits(daily(100.0))]);
        let subject = team();
        fixture.spend(&subject, 85.0);

        let status = fixture.enforcer.status(&subject, None, None).await;
        let daily = status.limit(LimitType::daily_cost()).unwrap();
        assert_eq!(daily.stage, Some(ThresholdStage::Warning));
        assert!(fixture.events().is_empty());
        assert_eq!(fixture.enforcer.fired_count(), 0);
    }
}
