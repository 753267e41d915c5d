//! The receive loop.
//!
//! [`ChimeRuntime`] owns the configuration and the features. On start it
//! builds the router, then feeds every event the transport produces into
//! [`Router::handle_event`], each on its own task:
//!
//! ```text
//!  transport ──events──▶ run loop ──spawn──▶ handle_event ──failures──▶ RuntimeErrorSink
//!                            ▲                                                │
//!                            └──────────────── Event::Error ◀─────────────────┘
//! ```
//!
//! ```rust,ignore
//! use chime_runtime::ChimeRuntime;
//!
//! let runtime = ChimeRuntime::load()?.feature(General);
//! runtime.run(bot, events).await?;
//! ```

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;

use async_trait::async_trait;
use chime_core::{
    BoxedBot, BoxedErrorSink, ErrorReport, ErrorSink, Event, EventContext, EventName, Feature,
    HandlerError, Router, RouterBuilder, TracingErrorSink,
};
use futures::{Stream, StreamExt};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::{ChimeConfig, ConfigLoader};
use crate::error::RuntimeResult;

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events received from the transport. Error events are not counted.
    pub events: u64,
    /// Messages that resolved to a command.
    pub commands_parsed: u64,
}

/// Forwards failures back into the loop as `error` events.
///
/// Failures raised while handling an `error` event are only logged, so a
/// broken error handler cannot feed itself.
struct RuntimeErrorSink {
    tx: mpsc::UnboundedSender<ErrorReport>,
}

#[async_trait]
impl ErrorSink for RuntimeErrorSink {
    async fn report(&self, report: ErrorReport) {
        if raised_by_error_event(report.origin()) {
            return TracingErrorSink.report(report).await;
        }
        if let Err(mpsc::error::SendError(report)) = self.tx.send(report) {
            TracingErrorSink.report(report).await;
        }
    }
}

/// `error` for the built-in, `error/<feature>` for an extension.
fn raised_by_error_event(origin: &str) -> bool {
    origin
        .strip_prefix(EventName::ERROR.as_str())
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Logs reports still queued once no task is left to handle them.
async fn log_leftover_reports(reports: &mut mpsc::UnboundedReceiver<ErrorReport>) -> usize {
    let mut logged = 0;
    while let Ok(report) = reports.try_recv() {
        TracingErrorSink.report(report).await;
        logged += 1;
    }
    logged
}

/// Configuration plus features, ready to run against a transport.
pub struct ChimeRuntime {
    config: ChimeConfig,
    features: Vec<Box<dyn Feature>>,
}

impl ChimeRuntime {
    /// Creates a runtime from an already loaded configuration.
    pub fn new(config: ChimeConfig) -> Self {
        Self {
            config,
            features: Vec::new(),
        }
    }

    /// Loads configuration from the default locations.
    pub fn load() -> RuntimeResult<Self> {
        Ok(Self::new(ConfigLoader::new().load()?))
    }

    /// The configuration in use.
    pub fn config(&self) -> &ChimeConfig {
        &self.config
    }

    /// Adds a feature. Features register in the order they are added.
    pub fn feature(mut self, feature: impl Feature + 'static) -> Self {
        self.features.push(Box::new(feature));
        self
    }

    /// Registers every feature, then the configured aliases, and freezes.
    pub fn build_router(&self, sink: BoxedErrorSink) -> RuntimeResult<Arc<Router>> {
        let presence = self.config.client.presence().map(str::to_string);

        let mut builder = RouterBuilder::new()
            .prefix(self.config.commands.prefix.clone())
            .reply_limits(self.config.reply)
            .error_sink(sink)
            .builtin(EventName::READY, move |ctx: EventContext| {
                let presence = presence.clone();
                async move {
                    ctx.bot().set_presence(presence.as_deref()).await?;
                    info!(user = %ctx.bot().user_id(), presence = ?presence, "Connected");
                    Ok::<(), HandlerError>(())
                }
            })
            .builtin(EventName::ERROR, |ctx: EventContext| async move {
                if let Event::Error(report) = &ctx.event {
                    error!(origin = %report.origin(), "Unhandled error:\n{}", report.chain());
                }
                Ok::<(), HandlerError>(())
            });

        for (name, section) in &self.config.features {
            builder = builder.feature_config(name.clone(), section.clone());
        }
        for feature in &self.features {
            builder.register_feature(feature.as_ref())?;
        }
        for (base, extra) in &self.config.aliases {
            builder = builder.add_aliases(base, extra.iter().cloned())?;
        }
        Ok(builder.build())
    }

    /// Runs until Ctrl-C or until `events` ends.
    pub async fn run<S>(self, bot: BoxedBot, events: S) -> RuntimeResult<RunSummary>
    where
        S: Stream<Item = Event> + Send,
    {
        self.run_until(bot, events, async {
            if let Err(e) = signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl-C");
        })
        .await
    }

    /// Runs until `shutdown` resolves or until `events` ends.
    ///
    /// Stops taking new events, then waits for every in-flight event,
    /// including error events raised on the way.
    pub async fn run_until<S, F>(
        self,
        bot: BoxedBot,
        events: S,
        shutdown: F,
    ) -> RuntimeResult<RunSummary>
    where
        S: Stream<Item = Event> + Send,
        F: Future<Output = ()>,
    {
        let (tx, mut reports) = mpsc::unbounded_channel();
        let router = self.build_router(Arc::new(RuntimeErrorSink { tx }))?;
        info!(
            features = router.features().len(),
            commands = router.commands().len(),
            patterns = router.patterns().len(),
            prefix = %router.prefix(),
            "Chime runtime started"
        );

        let tracker = TaskTracker::new();
        let mut events = pin!(events);
        let mut shutdown = pin!(shutdown);
        let mut received = 0u64;

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                Some(report) = reports.recv() => {
                    spawn_event(&tracker, &router, &bot, Event::Error(Arc::new(report)));
                }
                next = events.next() => match next {
                    Some(event) => {
                        received += 1;
                        spawn_event(&tracker, &router, &bot, event);
                    }
                    None => {
                        info!("Event stream ended");
                        break;
                    }
                },
            }
        }

        tracker.close();
        debug!(in_flight = tracker.len(), "Waiting for in-flight events");
        loop {
            tokio::select! {
                biased;
                Some(report) = reports.recv() => {
                    spawn_event(&tracker, &router, &bot, Event::Error(Arc::new(report)));
                }
                () = tracker.wait() => break,
            }
        }
        // A task may report and finish between the last poll of `reports`
        // and `wait()` resolving.
        let late = log_leftover_reports(&mut reports).await;
        if late > 0 {
            warn!(late, "Failures reported after the last error event");
        }

        let summary = RunSummary {
            events: received,
            commands_parsed: router.commands_parsed(),
        };
        info!(
            events = summary.events,
            commands = summary.commands_parsed,
            "Chime runtime stopped"
        );
        Ok(summary)
    }
}

fn spawn_event(tracker: &TaskTracker, router: &Arc<Router>, bot: &BoxedBot, event: Event) {
    let router = Arc::clone(router);
    let bot = Arc::clone(bot);
    tracker.spawn(async move {
        let name = event.name();
        if let Err(error) = router.handle_event(&bot, event).await {
            warn!(event = %name, "Built-in handler failed");
            router
                .error_sink()
                .report(ErrorReport::new(name.to_string(), error))
                .await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::testing::{RecordingBot, message_from};
    use chime_core::{CommandContext, CommandDecl, Registrar, RegistrationError, RegistrationResult};
    use futures::stream;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    struct Greeter {
        errors_seen: Arc<AtomicUsize>,
    }

    impl Feature for Greeter {
        fn name(&self) -> &str {
            "greeter"
        }

        fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
            let greeting = reg
                .config()
                .and_then(|c| c["greeting"].as_str())
                .unwrap_or("hi")
                .to_string();
            reg.command(
                CommandDecl::new("greet", move |ctx: CommandContext| {
                    let greeting = greeting.clone();
                    async move {
                        ctx.reply(&greeting).await?;
                        Ok::<(), HandlerError>(())
                    }
                })
                .doc("!greet\nsays hello."),
            )?;
            reg.command(
                CommandDecl::new("fail", |_ctx: CommandContext| async move {
                    Err::<(), HandlerError>("lookup failed".into())
                })
                .doc("!fail\nalways fails."),
            )?;
            let errors_seen = Arc::clone(&self.errors_seen);
            reg.event(EventName::ERROR, move |ctx: EventContext| {
                let errors_seen = Arc::clone(&errors_seen);
                async move {
                    if let Event::Error(report) = &ctx.event {
                        assert_eq!(report.origin(), "message");
                        errors_seen.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok::<(), HandlerError>(())
                }
            })?;
            Ok(())
        }
    }

    fn runtime(config: ChimeConfig) -> (ChimeRuntime, Arc<AtomicUsize>) {
        let errors_seen = Arc::new(AtomicUsize::new(0));
        let runtime = ChimeRuntime::new(config).feature(Greeter {
            errors_seen: Arc::clone(&errors_seen),
        });
        (runtime, errors_seen)
    }

    fn msg(content: &str) -> Event {
        Event::Message(Arc::new(message_from("alice", content)))
    }

    #[tokio::test]
    async fn test_runs_until_stream_ends() {
        let mut config = ChimeConfig::default();
        config.client.game = Some("with regexes".into());
        config.commands.prefix = "?".into();
        config.aliases.insert("greet".into(), vec!["hello".into()]);
        config
            .features
            .insert("greeter".into(), json!({ "greeting": "howdy" }));
        let (runtime, errors_seen) = runtime(config);

        let bot = Arc::new(RecordingBot::new("self"));
        let events = stream::iter(vec![Event::Ready, msg("?greet"), msg("?hello"), msg("!greet")]);
        let summary = assert_ok!(
            runtime
                .run_until(bot.clone(), events, std::future::pending())
                .await
        );

        assert_eq!(summary.events, 4);
        assert_eq!(summary.commands_parsed, 2);
        assert_eq!(bot.presence().as_deref(), Some("with regexes"));
        assert_eq!(bot.sent_texts(), vec!["howdy", "howdy"]);
        assert_eq!(errors_seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_become_error_events() {
        let (runtime, errors_seen) = runtime(ChimeConfig::default());
        let bot = Arc::new(RecordingBot::new("self"));
        let events = stream::iter(vec![msg("!fail"), msg("!fail")]);

        let summary = assert_ok!(
            runtime
                .run_until(bot.clone(), events, std::future::pending())
                .await
        );
        assert_eq!(summary.events, 2);
        assert_eq!(errors_seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let (runtime, _) = runtime(ChimeConfig::default());
        let bot = Arc::new(RecordingBot::new("self"));
        let summary = assert_ok!(
            runtime
                .run_until(bot, stream::pending::<Event>(), async {})
                .await
        );
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_alias_for_unknown_command_is_rejected() {
        let mut config = ChimeConfig::default();
        config.aliases.insert("nope".into(), vec!["n".into()]);
        let (runtime, _) = runtime(config);

        let err = assert_err!(runtime.build_router(Arc::new(TracingErrorSink)));
        assert!(matches!(
            err,
            crate::RuntimeError::Registration(RegistrationError::UnknownBaseAlias(_))
        ));
    }

    #[tokio::test]
    async fn test_error_sink_logs_error_origins() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = RuntimeErrorSink { tx };
        sink.report(ErrorReport::new("error/greeter", "boom".into())).await;
        sink.report(ErrorReport::new("ready/greeter", "boom".into())).await;

        let forwarded = assert_ok!(rx.try_recv());
        assert_eq!(forwarded.origin(), "ready/greeter");
        assert_err!(rx.try_recv());
    }

    #[tokio::test]
    async fn test_error_sink_forwards_events_named_like_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = RuntimeErrorSink { tx };
        sink.report(ErrorReport::new("errorlog/audit", "boom".into())).await;
        sink.report(ErrorReport::new("errors", "boom".into())).await;
        sink.report(ErrorReport::new("error", "boom".into())).await;

        assert_eq!(assert_ok!(rx.try_recv()).origin(), "errorlog/audit");
        assert_eq!(assert_ok!(rx.try_recv()).origin(), "errors");
        assert_err!(rx.try_recv());
    }

    #[tokio::test]
    async fn test_leftover_reports_are_logged() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert_ok!(tx.send(ErrorReport::new("message", "late".into())));
        assert_ok!(tx.send(ErrorReport::new("ready/greeter", "later".into())));

        assert_eq!(log_leftover_reports(&mut rx).await, 2);
        assert_eq!(log_leftover_reports(&mut rx).await, 0);
        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_raised_by_error_event() {
        assert!(raised_by_error_event("error"));
        assert!(raised_by_error_event("error/greeter"));
        assert!(!raised_by_error_event("errorlog/audit"));
        assert!(!raised_by_error_event("message"));
    }
}
