// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end service tests.
//!
//! `TestHarness` assembles every service over a temp SQLite database with a
//! [`MockClock`], a [`RecordingNotifier`] and [`Faults`] in front of the
//! repositories.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nostalgic_core::{ContentFilter, NostalgicError, Repositories, Result, VisitorHash};
use nostalgic_services::{Calendar, ServiceContext, ServicePolicy, Services};
use nostalgic_storage::{Database, SqliteRepositories};

use crate::clock::MockClock;
use crate::faults::Faults;
use crate::notifier::RecordingNotifier;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    start: Option<DateTime<Utc>>,
    policy: ServicePolicy,
    calendar: Calendar,
    filter: Option<Arc<dyn ContentFilter>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            start: None,
            policy: ServicePolicy::default(),
            calendar: Calendar::utc(),
            filter: None,
        }
    }

    /// Start the mock clock at `instant` instead of [`MockClock::fixed`].
    pub fn starting_at(mut self, instant: DateTime<Utc>) -> Self {
        self.start = Some(instant);
        self
    }

    pub fn with_policy(mut self, policy: ServicePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn ContentFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Build the harness over a fresh database file.
    pub async fn build(self) -> Result<TestHarness> {
        let temp_dir = tempfile::TempDir::new().map_err(NostalgicError::storage)?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::open(&db_path.to_string_lossy()).await?);
        let storage = Arc::new(SqliteRepositories::new(db.clone())).repositories();

        let faults = Arc::new(Faults::new());
        let clock = Arc::new(match self.start {
            Some(start) => MockClock::new(start),
            None => MockClock::fixed(),
        });
        let notifier = Arc::new(RecordingNotifier::new());

        let mut ctx = ServiceContext::new(faults.wrap(storage.clone()))
            .with_clock(clock.clone())
            .with_notifier(notifier.clone())
            .with_calendar(self.calendar)
            .with_policy(self.policy);
        if let Some(filter) = self.filter {
            ctx = ctx.with_filter(filter);
        }
        let ctx = Arc::new(ctx);

        Ok(TestHarness {
            services: Services::new(ctx.clone()),
            ctx,
            storage,
            clock,
            notifier,
            faults,
            db,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete service stack over temp storage.
pub struct TestHarness {
    pub services: Services,
    pub ctx: Arc<ServiceContext>,
    /// Repositories without fault injection, for direct assertions.
    pub storage: Repositories,
    pub clock: Arc<MockClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub faults: Arc<Faults>,
    pub db: Arc<Database>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with every default.
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// A stable visitor fingerprint derived from `name`.
    pub fn visitor(name: &str) -> VisitorHash {
        VisitorHash(format!("v-{name}"))
    }
}
