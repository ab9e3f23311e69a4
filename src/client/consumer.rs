//! Client-side consumer of the generation stream.
//!
//! One consumer drives one recipe view. It opens the stream through a
//! [`GenerationTransport`], decodes frames as bytes arrive and reveals the
//! text through a typewriter, publishing [`DisplayState`] and
//! [`ConsumerPhase`] on watch channels.
//!
//! Every request gets an epoch. Cancelling or starting a new request advances
//! the epoch under the session lock, and every state mutation re-checks its
//! epoch under that same lock, so late data from an abandoned request never
//! reaches the display.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::display::{ConsumerPhase, DisplayState};
use super::transport::{ByteStream, GenerationTransport, TransportError};
use crate::domain::ingredient::{normalize_ingredient, MIN_INGREDIENTS};
use crate::domain::recipe::{extract_title, FrameDecoder, StreamEvent, UNTITLED_RECIPE};

/// Consumer policy.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Delay between revealed characters.
    pub char_delay: Duration,
    /// Cursor toggle period while typing.
    pub cursor_blink: Duration,
    /// Start generating as soon as the list reaches `min_ingredients`.
    pub auto_generate: bool,
    pub min_ingredients: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(15),
            cursor_blink: Duration::from_millis(530),
            auto_generate: false,
            min_ingredients: MIN_INGREDIENTS,
        }
    }
}

/// Why a generation ended without a recipe. Cancellation is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsumerError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u32,
        message: String,
    },

    #[error("request rejected: {0}")]
    Rejected(String),

    /// The server reported a failure in an `error` event.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("transport failed: {0}")]
    Transport(String),
}

impl ConsumerError {
    /// Text for the person waiting on the recipe.
    pub fn user_message(&self) -> String {
        match self {
            ConsumerError::RateLimited {
                retry_after_secs,
                message,
            } if message.to_ascii_lowercase().contains("try again") => message.clone(),
            ConsumerError::RateLimited {
                retry_after_secs,
                message,
            } => format!("{} Try again in {} seconds.", message, retry_after_secs),
            ConsumerError::Rejected(message) | ConsumerError::Generation(message) => {
                message.clone()
            }
            ConsumerError::Transport(_) => {
                "The connection was interrupted before your recipe finished. Please try again."
                    .to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConsumerError::Transport(_) | ConsumerError::Generation(_)
        )
    }
}

impl From<TransportError> for ConsumerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::RateLimited {
                retry_after_secs,
                message,
            } => ConsumerError::RateLimited {
                retry_after_secs,
                message,
            },
            TransportError::Rejected { message, .. } => ConsumerError::Rejected(message),
            TransportError::Network(detail) => ConsumerError::Transport(detail),
        }
    }
}

/// A finished recipe, ready for a save action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRecipe {
    pub full_text: String,
    pub title: String,
    pub ingredients: Vec<String>,
}

#[derive(Default)]
struct Session {
    epoch: u64,
    ingredients: Vec<String>,
    /// Sorted ingredient set of the request in flight.
    in_flight: Option<Vec<String>>,
    reader: Option<JoinHandle<()>>,
    blink: Option<JoinHandle<()>>,
    completed: Option<CompletedRecipe>,
    last_error: Option<ConsumerError>,
}

struct Inner {
    transport: Arc<dyn GenerationTransport>,
    config: ConsumerConfig,
    session: Mutex<Session>,
    display: watch::Sender<DisplayState>,
    phase: watch::Sender<ConsumerPhase>,
}

enum Outcome {
    Completed(String),
    Failed(ConsumerError),
    Superseded,
}

/// Streams, renders and single-flights recipe generations.
///
/// Must be created and used inside a tokio runtime. Dropping it cancels any
/// generation in flight.
pub struct RecipeStreamConsumer {
    inner: Arc<Inner>,
}

impl RecipeStreamConsumer {
    pub fn new(transport: Arc<dyn GenerationTransport>, config: ConsumerConfig) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        let (phase, _) = watch::channel(ConsumerPhase::Idle);
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                session: Mutex::new(Session::default()),
                display,
                phase,
            }),
        }
    }

    pub fn display(&self) -> DisplayState {
        self.inner.display.borrow().clone()
    }

    pub fn phase(&self) -> ConsumerPhase {
        *self.inner.phase.borrow()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplayState> {
        self.inner.display.subscribe()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ConsumerPhase> {
        self.inner.phase.subscribe()
    }

    /// The last finished recipe, cleared when a new request starts.
    pub fn completed(&self) -> Option<CompletedRecipe> {
        self.inner.session().completed.clone()
    }

    pub fn last_error(&self) -> Option<ConsumerError> {
        self.inner.session().last_error.clone()
    }

    /// Current ingredients, normalized and de-duplicated.
    pub fn ingredients(&self) -> Vec<String> {
        self.inner.session().ingredients.clone()
    }

    /// Replaces the ingredient list.
    ///
    /// A different set cancels the generation in flight. With `auto_generate`
    /// a large enough set starts a new one.
    pub fn set_ingredients<I, S>(&self, ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = normalize_list(ingredients);
        let mut session = self.inner.session();
        if set_key(&session.ingredients) == set_key(&list) {
            session.ingredients = list;
            return;
        }
        session.ingredients = list;

        if session.in_flight.is_some() {
            tracing::debug!("Ingredients changed, cancelling generation in flight");
            self.inner.cancel_locked(&mut session);
        }
        if self.inner.config.auto_generate
            && session.ingredients.len() >= self.inner.config.min_ingredients
        {
            Inner::start_locked(&self.inner, &mut session);
        }
    }

    /// Starts generating for the current ingredients.
    ///
    /// Returns false when the same set is already in flight or the list is
    /// too short.
    pub fn generate(&self) -> bool {
        let mut session = self.inner.session();
        Inner::start_locked(&self.inner, &mut session)
    }

    /// Aborts the generation in flight. Calling it again is a no-op.
    pub fn cancel(&self) {
        let mut session = self.inner.session();
        self.inner.cancel_locked(&mut session);
    }
}

impl Drop for RecipeStreamConsumer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under the session lock if `epoch` is still current.
    fn if_current<R>(&self, epoch: u64, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut session = self.session();
        if session.epoch == epoch {
            Some(f(&mut session))
        } else {
            None
        }
    }

    fn start_locked(inner: &Arc<Inner>, session: &mut Session) -> bool {
        if session.ingredients.len() < inner.config.min_ingredients {
            tracing::debug!(
                count = session.ingredients.len(),
                "Not enough ingredients to generate"
            );
            return false;
        }

        let key = set_key(&session.ingredients);
        if session.in_flight.as_ref() == Some(&key) {
            tracing::debug!("Generation already in flight for these ingredients");
            return false;
        }
        if session.in_flight.is_some() {
            inner.cancel_locked(session);
        }

        session.epoch += 1;
        let epoch = session.epoch;
        session.in_flight = Some(key);
        session.completed = None;
        session.last_error = None;
        inner.display.send_replace(DisplayState::default());
        inner.phase.send_replace(ConsumerPhase::Requesting);

        let ingredients = session.ingredients.clone();
        session.reader = Some(tokio::spawn(Inner::run(Arc::clone(inner), epoch, ingredients)));
        true
    }

    fn cancel_locked(&self, session: &mut Session) {
        if session.in_flight.is_none() {
            return;
        }
        session.epoch += 1;
        session.in_flight = None;
        if let Some(reader) = session.reader.take() {
            reader.abort();
        }
        if let Some(blink) = session.blink.take() {
            blink.abort();
        }
        self.display.send_modify(DisplayState::stop_typing);
        self.phase.send_replace(ConsumerPhase::Cancelled);
        tracing::debug!("Generation cancelled");
    }

    /// Ends the current request; the reader handle is detached, not aborted,
    /// because the reader itself is the caller.
    fn settle(&self, session: &mut Session, phase: ConsumerPhase) {
        session.in_flight = None;
        session.reader.take();
        if let Some(blink) = session.blink.take() {
            blink.abort();
        }
        self.display.send_modify(DisplayState::stop_typing);
        self.phase.send_replace(phase);
    }

    async fn run(inner: Arc<Inner>, epoch: u64, ingredients: Vec<String>) {
        let stream = match inner.transport.open(&ingredients).await {
            Ok(stream) => stream,
            Err(e) => {
                inner.fail(epoch, e.into());
                return;
            }
        };

        let started = inner.if_current(epoch, |session| {
            inner.phase.send_replace(ConsumerPhase::Streaming);
            inner.display.send_modify(|d| {
                d.is_typing = true;
                d.cursor_visible = true;
            });
            session.blink = Some(tokio::spawn(Inner::blink(Arc::clone(&inner), epoch)));
        });
        if started.is_none() {
            return;
        }

        match inner.consume(epoch, stream).await {
            Outcome::Completed(full_text) => inner.finish(epoch, full_text, ingredients),
            Outcome::Failed(error) => inner.fail(epoch, error),
            Outcome::Superseded => {}
        }
    }

    /// Reads frames and reveals text until the recipe is fully shown.
    async fn consume(&self, epoch: u64, mut stream: ByteStream) -> Outcome {
        let mut decoder = FrameDecoder::new();
        let delay = self.config.char_delay;
        let mut ticker = interval_at(Instant::now() + delay, delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut final_text: Option<String> = None;

        loop {
            tokio::select! {
                piece = stream.next(), if final_text.is_none() => {
                    let (events, eof) = match piece {
                        Some(Ok(bytes)) => (decoder.push(&bytes), false),
                        Some(Err(e)) => return Outcome::Failed(e.into()),
                        None => (decoder.finish().into_iter().collect(), true),
                    };

                    for event in events {
                        match event {
                            StreamEvent::Chunk { content } => {
                                let applied = self.if_current(epoch, |_| {
                                    self.display.send_modify(|d| d.full_text.push_str(&content));
                                });
                                if applied.is_none() {
                                    return Outcome::Superseded;
                                }
                            }
                            StreamEvent::Complete { content } => {
                                let applied = self.if_current(epoch, |_| {
                                    self.display.send_modify(|d| d.replace_text(content.clone()));
                                    self.phase.send_replace(ConsumerPhase::Typewriting);
                                });
                                if applied.is_none() {
                                    return Outcome::Superseded;
                                }
                                final_text = Some(content);
                                break;
                            }
                            StreamEvent::Error { message } => {
                                return Outcome::Failed(ConsumerError::Generation(message));
                            }
                        }
                    }

                    if eof && final_text.is_none() {
                        return Outcome::Failed(ConsumerError::Transport(
                            "stream ended before the recipe was complete".to_string(),
                        ));
                    }
                }
                _ = ticker.tick() => {
                    let revealed = self.if_current(epoch, |_| {
                        let mut more = false;
                        self.display.send_modify(|d| more = d.reveal_next());
                        more
                    });
                    match revealed {
                        None => return Outcome::Superseded,
                        Some(false) => {
                            if let Some(text) = final_text.take() {
                                return Outcome::Completed(text);
                            }
                        }
                        Some(true) => {}
                    }
                }
            }
        }
    }

    async fn blink(inner: Arc<Inner>, epoch: u64) {
        let period = inner.config.cursor_blink;
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let alive = inner.if_current(epoch, |_| {
                inner.display.send_modify(|d| {
                    if d.is_typing {
                        d.cursor_visible = !d.cursor_visible;
                    }
                });
            });
            if alive.is_none() {
                return;
            }
        }
    }

    fn finish(&self, epoch: u64, full_text: String, ingredients: Vec<String>) {
        self.if_current(epoch, |session| {
            let title = extract_title(&full_text).unwrap_or_else(|| UNTITLED_RECIPE.to_string());
            tracing::info!(title = %title, chars = full_text.chars().count(), "Recipe complete");
            session.completed = Some(CompletedRecipe {
                full_text,
                title,
                ingredients,
            });
            self.settle(session, ConsumerPhase::Done);
        });
    }

    fn fail(&self, epoch: u64, error: ConsumerError) {
        self.if_current(epoch, |session| {
            tracing::warn!(error = %error, "Generation failed");
            session.last_error = Some(error);
            self.settle(session, ConsumerPhase::Errored);
        });
    }
}

fn normalize_list<I, S>(ingredients: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut list: Vec<String> = Vec::new();
    for raw in ingredients {
        let normalized = normalize_ingredient(raw.as_ref());
        if !normalized.is_empty() && !list.contains(&normalized) {
            list.push(normalized);
        }
    }
    list
}

fn set_key(ingredients: &[String]) -> Vec<String> {
    let mut key = ingredients.to_vec();
    key.sort();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::MockGenerationTransport;
    use crate::domain::recipe::StreamFrame;
    use bytes::Bytes;
    use tokio::sync::mpsc;

    fn frame(event: StreamEvent) -> Bytes {
        Bytes::from(StreamFrame::new(event).to_sse_frame())
    }

    fn pantry() -> [&'static str; 3] {
        ["tomato", "basil", "olive oil"]
    }

    async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, pred: F) -> T
    where
        T: Clone,
        F: Fn(&T) -> bool,
    {
        let wait = async {
            loop {
                {
                    let current = rx.borrow_and_update();
                    if pred(&current) {
                        return current.clone();
                    }
                }
                rx.changed().await.unwrap();
            }
        };
        tokio::time::timeout(Duration::from_secs(60), wait)
            .await
            .expect("condition not reached")
    }

    fn consumer(transport: Arc<MockGenerationTransport>) -> RecipeStreamConsumer {
        let consumer = RecipeStreamConsumer::new(transport, ConsumerConfig::default());
        consumer.set_ingredients(pantry());
        consumer
    }

    #[tokio::test(start_paused = true)]
    async fn types_out_the_full_recipe() {
        let full = "# Tomato Soup\n## Instructions\n1. Simmer.";
        let transport = Arc::new(MockGenerationTransport::new().with_body([
            frame(StreamEvent::chunk("# Tomato Soup\n")),
            frame(StreamEvent::chunk("## Instructions\n1. Simmer.")),
            frame(StreamEvent::complete(full)),
        ]));
        let consumer = consumer(transport);
        let mut phase = consumer.subscribe_phase();

        assert!(consumer.generate());
        wait_for(&mut phase, |p| *p == ConsumerPhase::Done).await;

        let display = consumer.display();
        assert_eq!(display.full_text, full);
        assert_eq!(display.displayed_prefix, full);
        assert!(!display.is_typing);
        assert!(!display.cursor_visible);

        let completed = consumer.completed().unwrap();
        assert_eq!(completed.title, "Tomato Soup");
        assert_eq!(completed.ingredients, vec!["tomato", "basil", "olive oil"]);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_split_across_reads_are_reassembled() {
        let text = "Crème brûlée";
        let mut body = frame(StreamEvent::chunk(text)).to_vec();
        body.extend_from_slice(&frame(StreamEvent::complete(text)));
        let pieces: Vec<Bytes> = body.chunks(5).map(Bytes::copy_from_slice).collect();

        let consumer = consumer(Arc::new(MockGenerationTransport::new().with_body(pieces)));
        let mut phase = consumer.subscribe_phase();

        consumer.generate();
        wait_for(&mut phase, |p| *p == ConsumerPhase::Done).await;
        assert_eq!(consumer.display().displayed_prefix, text);
    }

    #[tokio::test(start_paused = true)]
    async fn same_set_is_single_flight() {
        let (_tx, rx) = mpsc::channel(8);
        let transport = Arc::new(MockGenerationTransport::new().with_live_stream(rx));
        let consumer = consumer(transport.clone());
        let mut phase = consumer.subscribe_phase();

        assert!(consumer.generate());
        wait_for(&mut phase, |p| *p == ConsumerPhase::Streaming).await;

        consumer.set_ingredients(["Basil", "tomato ", "olive oil"]);
        assert!(!consumer.generate());
        assert_eq!(transport.call_count(), 1);
        assert_eq!(consumer.phase(), ConsumerPhase::Streaming);
    }

    #[tokio::test(start_paused = true)]
    async fn late_chunk_after_cancel_is_ignored() {
        let (tx, rx) = mpsc::channel(8);
        let consumer = consumer(Arc::new(MockGenerationTransport::new().with_live_stream(rx)));
        let mut display = consumer.subscribe_display();

        consumer.generate();
        tx.send(Ok(frame(StreamEvent::chunk("Recipe")))).await.unwrap();
        wait_for(&mut display, |d| d.full_text == "Recipe").await;

        consumer.cancel();
        let before = consumer.display();
        let _ = tx.send(Ok(frame(StreamEvent::chunk(" Title")))).await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(consumer.display(), before);
        assert_eq!(consumer.phase(), ConsumerPhase::Cancelled);
        assert!(consumer.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let consumer = consumer(Arc::new(MockGenerationTransport::new()));
        consumer.cancel();
        consumer.cancel();
        assert_eq!(consumer.phase(), ConsumerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn ingredient_change_cancels_and_allows_restart() {
        let (_tx, rx) = mpsc::channel(8);
        let transport = Arc::new(
            MockGenerationTransport::new()
                .with_live_stream(rx)
                .with_body([frame(StreamEvent::complete("# Pesto"))]),
        );
        let consumer = consumer(transport.clone());
        let mut phase = consumer.subscribe_phase();

        consumer.generate();
        wait_for(&mut phase, |p| *p == ConsumerPhase::Streaming).await;

        consumer.set_ingredients(["basil", "pine nuts", "parmesan"]);
        assert_eq!(consumer.phase(), ConsumerPhase::Cancelled);

        assert!(consumer.generate());
        wait_for(&mut phase, |p| *p == ConsumerPhase::Done).await;
        assert_eq!(transport.call_count(), 2);
        assert_eq!(consumer.completed().unwrap().title, "Pesto");
    }

    #[tokio::test(start_paused = true)]
    async fn eof_without_terminal_is_transport_error() {
        let transport = Arc::new(
            MockGenerationTransport::new().with_body([frame(StreamEvent::chunk("# Half"))]),
        );
        let consumer = consumer(transport);
        let mut phase = consumer.subscribe_phase();

        consumer.generate();
        wait_for(&mut phase, |p| *p == ConsumerPhase::Errored).await;

        let error = consumer.last_error().unwrap();
        assert!(matches!(error, ConsumerError::Transport(_)));
        assert!(error.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn error_event_surfaces_server_message() {
        let transport = Arc::new(MockGenerationTransport::new().with_body([
            frame(StreamEvent::chunk("# Soup")),
            frame(StreamEvent::error("The recipe service is busy right now.")),
        ]));
        let consumer = consumer(transport);
        let mut phase = consumer.subscribe_phase();

        consumer.generate();
        wait_for(&mut phase, |p| *p == ConsumerPhase::Errored).await;

        assert_eq!(
            consumer.last_error().unwrap().user_message(),
            "The recipe service is busy right now."
        );
        assert!(!consumer.display().is_typing);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_shows_retry_after() {
        let transport = Arc::new(MockGenerationTransport::new().with_rejection(
            TransportError::RateLimited {
                retry_after_secs: 42,
                message: "Recipe limit reached.".to_string(),
            },
        ));
        let consumer = consumer(transport);
        let mut phase = consumer.subscribe_phase();

        consumer.generate();
        wait_for(&mut phase, |p| *p == ConsumerPhase::Errored).await;

        let message = consumer.last_error().unwrap().user_message();
        assert_eq!(message, "Recipe limit reached. Try again in 42 seconds.");
    }

    #[test]
    fn server_retry_hint_is_not_repeated() {
        let error = ConsumerError::RateLimited {
            retry_after_secs: 42,
            message: "Rate limit exceeded. Please try again in 42 seconds.".to_string(),
        };
        assert_eq!(
            error.user_message(),
            "Rate limit exceeded. Please try again in 42 seconds."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn auto_generate_waits_for_enough_ingredients() {
        let transport = Arc::new(MockGenerationTransport::new().with_body([frame(
            StreamEvent::complete("# Salad"),
        )]));
        let consumer = RecipeStreamConsumer::new(
            transport.clone(),
            ConsumerConfig {
                auto_generate: true,
                ..ConsumerConfig::default()
            },
        );
        let mut phase = consumer.subscribe_phase();

        consumer.set_ingredients(["tomato", "basil"]);
        assert_eq!(consumer.phase(), ConsumerPhase::Idle);

        consumer.set_ingredients(pantry());
        wait_for(&mut phase, |p| *p == ConsumerPhase::Done).await;
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn too_few_ingredients_do_not_start() {
        let transport = Arc::new(MockGenerationTransport::new());
        let consumer = RecipeStreamConsumer::new(transport.clone(), ConsumerConfig::default());
        consumer.set_ingredients(["tomato"]);

        assert!(!consumer.generate());
        assert_eq!(consumer.phase(), ConsumerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_the_stream() {
        let (tx, rx) = mpsc::channel::<Result<Bytes, TransportError>>(8);
        let consumer = consumer(Arc::new(MockGenerationTransport::new().with_live_stream(rx)));
        let mut phase = consumer.subscribe_phase();

        consumer.generate();
        wait_for(&mut phase, |p| *p == ConsumerPhase::Streaming).await;
        drop(consumer);

        tokio::time::timeout(Duration::from_secs(5), tx.closed())
            .await
            .expect("stream not released");
    }
}
