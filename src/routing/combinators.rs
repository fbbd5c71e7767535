//! Handler combinators: race (first to settle) and all (wait for every one).
//!
//! # Design Decisions
//! - Racers run as spawned tasks; the losers' join handles are dropped, so
//!   they keep running to completion and their results are discarded
//! - The race settles on the first handler to finish, success or failure
//! - Aggregation is all-or-nothing: one failure fails the aggregate
//! - Empty handler lists fail fast with `NoResponders` instead of hanging

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::{select_all, try_join_all};
use serde_json::{Map, Value};

use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::observability::metrics;
use crate::routing::errors::{RouteError, RouteResult};
use crate::routing::handlers::RouteHandler;

/// Handler shared between the route table and combinators.
pub type SharedHandler = Arc<dyn RouteHandler>;

/// Run `fut` under an optional deadline.
pub async fn with_deadline<F>(deadline: Option<Duration>, fut: F) -> RouteResult<Reply>
where
    F: Future<Output = RouteResult<Reply>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
            let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            Err(RouteError::Timeout(ms))
        }),
        None => fut.await,
    }
}

/// First-to-settle combinator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Racer;

impl Racer {
    /// Start every handler and settle with whichever finishes first.
    pub async fn race(ctx: &RequestContext, handlers: &[SharedHandler]) -> RouteResult<Reply> {
        if handlers.is_empty() {
            return Err(RouteError::NoResponders);
        }

        let tasks: Vec<_> = handlers
            .iter()
            .map(|handler| {
                let handler = Arc::clone(handler);
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    let result = handler.handle(&ctx).await;
                    (handler.name().to_string(), result)
                })
            })
            .collect();

        // Dropping the remaining handles detaches those tasks.
        let (first, _, _abandoned) = select_all(tasks).await;
        let (winner, result) = first.map_err(|e| RouteError::Task(e.to_string()))?;

        match &result {
            Ok(_) => ctx.log().push(format!("Race won by {}", winner)),
            Err(e) => ctx.log().push(format!("Race settled by failing {}: {}", winner, e)),
        }
        metrics::record_race_winner(&winner, result.is_ok());
        result
    }
}

/// Wait-for-all combinator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator;

impl Aggregator {
    /// Run every handler and collect their bodies into one JSON object keyed
    /// by handler name. Bodies that are not JSON are kept as JSON strings.
    pub async fn all(ctx: &RequestContext, handlers: &[SharedHandler]) -> RouteResult<Reply> {
        if handlers.is_empty() {
            return Err(RouteError::NoResponders);
        }

        let replies = try_join_all(handlers.iter().map(|h| h.handle(ctx))).await?;

        let mut collected = Map::new();
        let mut log = Vec::new();
        for (index, (handler, reply)) in handlers.iter().zip(replies).enumerate() {
            let mut label = handler.name().to_string();
            let mut suffix = index;
            while collected.contains_key(&label) {
                label = format!("{}#{}", handler.name(), suffix);
                suffix += 1;
            }
            log.extend(reply.log_lines().iter().cloned());
            collected.insert(label, decode_body(&reply));
        }
        ctx.log().push(format!("Aggregated {} responses", collected.len()));

        let mut reply = Reply::json(&Value::Object(collected))?;
        for line in log {
            reply.log_line(line);
        }
        Ok(reply)
    }
}

fn decode_body(reply: &Reply) -> Value {
    serde_json::from_slice(reply.body()).unwrap_or_else(|_| Value::String(reply.body_text()))
}

/// Route handler racing a fixed handler set.
pub struct RaceHandler {
    handlers: Vec<SharedHandler>,
    deadline: Option<Duration>,
}

impl RaceHandler {
    pub fn new(handlers: Vec<SharedHandler>) -> Self {
        Self {
            handlers,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

#[async_trait]
impl RouteHandler for RaceHandler {
    fn name(&self) -> &str {
        "race"
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        with_deadline(self.deadline, Racer::race(ctx, &self.handlers)).await
    }
}

/// Route handler aggregating a fixed handler set.
pub struct AllHandler {
    handlers: Vec<SharedHandler>,
    deadline: Option<Duration>,
}

impl AllHandler {
    pub fn new(handlers: Vec<SharedHandler>) -> Self {
        Self {
            handlers,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

#[async_trait]
impl RouteHandler for AllHandler {
    fn name(&self) -> &str {
        "all"
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        with_deadline(self.deadline, Aggregator::all(ctx, &self.handlers)).await
    }
}
