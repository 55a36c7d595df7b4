//! Mock [`GameSource`] implementation for testing.
//!
//! Only compiled in test mode or with the `mock` feature. Records every call
//! so tests can assert how often (and with what keys) the external source
//! was actually hit — the caching layer's main observable property.

#![cfg(any(test, feature = "mock"))]

use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::{SourceError, SourceResult};
use crate::traits::GameSource;
use crate::types::{ArchiveMonth, GameRecord, ProfileSummary};

type ArchiveListFn = dyn Fn(&str) -> SourceResult<Vec<ArchiveMonth>> + Send;
type MonthFn = dyn Fn(&str, i32, u32) -> SourceResult<Vec<GameRecord>> + Send;
type ProfileFn = dyn Fn(&str) -> SourceResult<ProfileSummary> + Send;

#[derive(Default)]
struct MockResponses {
    archive_list: Option<Box<ArchiveListFn>>,
    month: Option<Box<MonthFn>>,
    profile: Option<Box<ProfileFn>>,
}

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchArchiveList {
        username: String,
    },
    FetchMonth {
        username: String,
        year: i32,
        month: u32,
    },
    FetchProfile {
        username: String,
    },
}

/// Spy implementation of [`GameSource`].
pub struct MockGameSource {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockGameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGameSource {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the `fetch_archive_list` response.
    pub fn with_archive_list_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> SourceResult<Vec<ArchiveMonth>> + Send + 'static,
    {
        self.responses.lock().unwrap().archive_list = Some(Box::new(f));
        self
    }

    /// Configure the `fetch_month` response.
    pub fn with_month_response<F>(self, f: F) -> Self
    where
        F: Fn(&str, i32, u32) -> SourceResult<Vec<GameRecord>> + Send + 'static,
    {
        self.responses.lock().unwrap().month = Some(Box::new(f));
        self
    }

    /// Configure the `fetch_profile` response.
    pub fn with_profile_response<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> SourceResult<ProfileSummary> + Send + 'static,
    {
        self.responses.lock().unwrap().profile = Some(Box::new(f));
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// How many times `fetch_month` has been invoked.
    pub fn month_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockCall::FetchMonth { .. }))
            .count()
    }

    /// How many times `fetch_profile` has been invoked.
    pub fn profile_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockCall::FetchProfile { .. }))
            .count()
    }
}

impl GameSource for MockGameSource {
    fn fetch_archive_list(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<ArchiveMonth>, SourceError>> + Send {
        self.call_log.lock().unwrap().push(MockCall::FetchArchiveList {
            username: username.to_string(),
        });
        let result = match &self.responses.lock().unwrap().archive_list {
            Some(f) => f(username),
            None => Err(SourceError::NotConfigured("fetch_archive_list".into())),
        };
        async move { result }
    }

    fn fetch_month(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> impl Future<Output = Result<Vec<GameRecord>, SourceError>> + Send {
        self.call_log.lock().unwrap().push(MockCall::FetchMonth {
            username: username.to_string(),
            year,
            month,
        });
        let result = match &self.responses.lock().unwrap().month {
            Some(f) => f(username, year, month),
            None => Err(SourceError::NotConfigured("fetch_month".into())),
        };
        async move { result }
    }

    fn fetch_profile(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<ProfileSummary, SourceError>> + Send {
        self.call_log.lock().unwrap().push(MockCall::FetchProfile {
            username: username.to_string(),
        });
        let result = match &self.responses.lock().unwrap().profile {
            Some(f) => f(username),
            None => Err(SourceError::NotConfigured("fetch_profile".into())),
        };
        async move { result }
    }
}
