//! Lockstep E2E Matching
//!
//! This crate checks what a web application shows, through its API or its
//! browser UI, against the tester's mental model:
//! - Snapshots a mental-model collection into expected and unexpected items
//! - Narrows, maps and filters those expectations before comparing
//! - Polls live sources until they catch up or a wait window closes
//! - Reports missing and reappearing items in a stable, sorted message
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Scenario                                                   │
//! │    ├── MentalModel   (expected state, shared by drivers)    │
//! │    ├── TestData      (fixture inputs + defaults)            │
//! │    └── expect(key) -> Matcher                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Matcher                                                    │
//! │    ├── only / expecting_nothing / mapped_by / filtered_by   │
//! │    ├── using(accessor)                                      │
//! │    └── matches(Actual) -> bool + failure_message()          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Actual                                                     │
//! │    ├── Items(Vec<Value>)      compared once                 │
//! │    └── Source(&mut Observe)   polled under RetryPolicy      │
//! │          ├── Probe     (closures, e.g. page objects)        │
//! │          └── ApiDriver (HTTP collections)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod diff;
pub mod error;
pub mod matcher;
pub mod observe;
pub mod scenario;
pub mod telemetry;

pub use api::ApiDriver;
pub use config::{ApiConfig, HarnessConfig, RetryPolicy};
pub use error::{E2eError, E2eResult};
pub use matcher::{MatchOutcome, Matcher};
pub use observe::{Actual, Observe, Probe};
pub use scenario::Scenario;

pub use lockstep_common::{Collection, MentalModel, TestData, Value};
