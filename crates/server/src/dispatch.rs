//! Intent dispatch: the decision table between canned content, direct
//! catalog answers, and the bounded generative path.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use storebot_agent::{BoundedInvoker, InferenceRequest, BUSY_REPLY};
use storebot_core::config::StoreConfig;
use storebot_core::{
    find_products, parse_price_window, ContentCache, ContentError, ContentSource, ProductRecord,
};
use storebot_db::{CatalogStore, RepositoryError};

use crate::canned::{self, FulfillmentMessage};

/// Closed set of intent kinds the chat platform can send. Anything
/// unrecognized lands on the explicit default branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    AboutWebsite,
    Sale,
    Trending,
    NewArrivals,
    Helpline,
    LlmQuery,
    Fallback,
}

impl Intent {
    /// Display names match the intent configuration on the chat platform.
    pub fn from_display_name(name: &str) -> Self {
        match name {
            "About Website" => Self::AboutWebsite,
            "Sale" => Self::Sale,
            "Trending" => Self::Trending,
            "New Arrivals" => Self::NewArrivals,
            "helpline" => Self::Helpline,
            "LLMQueryIntent" => Self::LlmQuery,
            _ => Self::Fallback,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Rich(Vec<FulfillmentMessage>),
}

#[derive(Debug, Error)]
enum DispatchError {
    #[error(transparent)]
    Catalog(#[from] RepositoryError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Products handed to the generative path on the dedicated LLM intent.
const LLM_PRODUCT_WINDOW: usize = 50;
/// Arbitrary catalog prefix used when the matcher comes back empty.
const FALLBACK_PRODUCT_WINDOW: usize = 20;
/// Cap on the price-window fast path.
const FAST_PATH_LIMIT: u32 = 5;
/// A trimmed provider answer shorter than this is treated as no answer.
const MIN_ANSWER_CHARS: usize = 5;

pub struct Dispatcher {
    catalog: Arc<dyn CatalogStore>,
    source: Arc<dyn ContentSource>,
    cache: ContentCache,
    invoker: BoundedInvoker,
    store: StoreConfig,
    llm_budget: Duration,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        source: Arc<dyn ContentSource>,
        invoker: BoundedInvoker,
        store: StoreConfig,
        llm_budget: Duration,
    ) -> Self {
        Self { catalog, source, cache: ContentCache::new(), invoker, store, llm_budget }
    }

    /// Last line of defense: every failure inside intent handling collapses
    /// into the apology string here. The apology path does no I/O and no
    /// parsing, so it cannot itself fail.
    pub async fn handle(&self, intent: Intent, query: &str) -> Reply {
        info!(event_name = "dispatch.received", intent = ?intent, "handling classified query");
        match self.try_handle(intent, query).await {
            Ok(reply) => reply,
            Err(dispatch_error) => {
                error!(
                    event_name = "dispatch.apology_fallback",
                    intent = ?intent,
                    error = %dispatch_error,
                    "intent handling failed; returning apology reply"
                );
                Reply::Text(apology_reply(&self.store.site_url))
            }
        }
    }

    async fn try_handle(&self, intent: Intent, query: &str) -> Result<Reply, DispatchError> {
        match intent {
            Intent::AboutWebsite => Ok(Reply::Rich(canned::about_website(&self.store))),
            Intent::Sale => Ok(Reply::Rich(canned::sale(&self.store))),
            Intent::Trending => Ok(Reply::Rich(canned::trending(&self.store))),
            Intent::NewArrivals => Ok(Reply::Rich(canned::new_arrivals(&self.store))),
            Intent::Helpline => Ok(Reply::Rich(canned::helpline(&self.store))),
            Intent::LlmQuery => self.llm_reply(query).await,
            Intent::Fallback => self.smart_reply(query).await,
        }
    }

    /// Dedicated generative intent: full content bundle, hard budget, and a
    /// second-level canned message when the answer is busy, empty or too
    /// short to be useful.
    async fn llm_reply(&self, query: &str) -> Result<Reply, DispatchError> {
        let snapshot = self.cache.snapshot(self.source.as_ref()).await?;
        let products: Vec<ProductRecord> =
            snapshot.products.iter().take(LLM_PRODUCT_WINDOW).cloned().collect();

        let answer = self
            .invoker
            .invoke_with_timeout(
                InferenceRequest {
                    query: query.to_string(),
                    site_excerpt: snapshot.site_excerpt.clone(),
                    brands: snapshot.brands.iter().cloned().collect(),
                    products,
                },
                self.llm_budget,
            )
            .await;

        if answer == BUSY_REPLY || answer.trim().chars().count() < MIN_ANSWER_CHARS {
            return Ok(Reply::Text(no_answer_reply(&self.store.site_url)));
        }
        Ok(Reply::Text(answer))
    }

    /// Default branch: price-window fast path straight from the store,
    /// otherwise fuzzy candidates (or a plain catalog prefix) into the
    /// bounded generative call.
    async fn smart_reply(&self, query: &str) -> Result<Reply, DispatchError> {
        if let Some(window) = parse_price_window(query) {
            let picks = self
                .catalog
                .find_in_price_range(window.low, window.high, FAST_PATH_LIMIT)
                .await?;
            if !picks.is_empty() {
                info!(
                    event_name = "dispatch.price_fast_path",
                    picks = picks.len(),
                    "answered from the catalog without inference"
                );
                return Ok(Reply::Text(format_price_picks(
                    &picks,
                    &self.store.currency_prefix,
                )));
            }
        }

        let snapshot = self.cache.snapshot(self.source.as_ref()).await?;
        let mut products = find_products(query, &snapshot.products);
        if products.is_empty() {
            products = snapshot.products.iter().take(FALLBACK_PRODUCT_WINDOW).cloned().collect();
        }

        let answer = self
            .invoker
            .invoke_with_timeout(
                InferenceRequest {
                    query: query.to_string(),
                    site_excerpt: snapshot.site_excerpt.clone(),
                    brands: snapshot.brands.iter().cloned().collect(),
                    products,
                },
                self.llm_budget,
            )
            .await;

        Ok(Reply::Text(answer))
    }
}

fn format_price_picks(picks: &[ProductRecord], currency_prefix: &str) -> String {
    let lines: Vec<String> = picks
        .iter()
        .map(|pick| format!("{} - {} {}", pick.title, currency_prefix, pick.price))
        .collect();
    format!("Here is what we have in that range:\n{}", lines.join("\n"))
}

fn no_answer_reply(site_url: &str) -> String {
    format!(
        "Sorry! I couldn't find a good answer for that, but you can check our \
         best picks at {site_url}"
    )
}

fn apology_reply(site_url: &str) -> String {
    format!(
        "Sorry, something went wrong on our side. You can always browse \
         {site_url} directly."
    )
}
