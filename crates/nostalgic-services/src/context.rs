// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nostalgic_core::traits::{AllowAll, NoopNotifier};
use nostalgic_core::{Clock, ContentFilter, Repositories, SystemClock, WebhookNotifier};

use crate::calendar::Calendar;
use crate::policy::ServicePolicy;

/// Everything a service needs, constructed once and shared by reference.
///
/// Defaults to the system clock, no webhooks, no content filtering, the UTC
/// calendar and the default limits; the `with_*` methods swap pieces out.
#[derive(Clone)]
pub struct ServiceContext {
    pub repos: Repositories,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn WebhookNotifier>,
    pub filter: Arc<dyn ContentFilter>,
    pub calendar: Calendar,
    pub policy: ServicePolicy,
}

impl ServiceContext {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(NoopNotifier),
            filter: Arc::new(AllowAll),
            calendar: Calendar::utc(),
            policy: ServicePolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn WebhookNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn ContentFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_policy(mut self, policy: ServicePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
