//! Record embedding.
//!
//! One pipeline serves every credential source: the provider is chosen when
//! the pipeline is built, and the token cache sits between it and the client.

use tracing::debug;

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::pipeline::token_cache::{Clock, SystemClock, TokenCache};
use crate::traits::{credentials::CredentialProvider, embedder::EmbeddingClient};
use crate::types::record::CourseRecord;

/// Text sent to the embedding provider for a record.
///
/// Title, description and (when present) prerequisites, space-separated.
pub fn embedding_text(record: &CourseRecord) -> String {
    let mut text = format!("{} {}", record.title(), record.description());
    if !record.prerequisites().is_empty() {
        text.push(' ');
        text.push_str(record.prerequisites());
    }
    text
}

/// Embeds records through an authenticated embedding client.
pub struct EmbeddingPipeline<P, C> {
    tokens: TokenCache<P>,
    client: C,
    clock: Box<dyn Clock>,
}

impl<P: CredentialProvider, C: EmbeddingClient> EmbeddingPipeline<P, C> {
    pub fn new(provider: P, client: C) -> Self {
        Self::with_token_cache(TokenCache::new(provider), client)
    }

    pub fn with_token_cache(tokens: TokenCache<P>, client: C) -> Self {
        Self {
            tokens,
            client,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used for token expiry checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Embed one record. Does not retry.
    pub async fn embed(&self, record: &CourseRecord) -> EmbeddingResult<Vec<f32>> {
        self.embed_text(&embedding_text(record)).await
    }

    /// Embed arbitrary text. Does not retry.
    pub async fn embed_text(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let token = self.tokens.get_token(self.clock.now()).await?;
        let vector = self.client.predict(token.expose(), text).await?;

        if vector.is_empty() {
            return Err(EmbeddingError::Malformed("empty embedding".to_string()));
        }

        debug!(dimension = vector.len(), "Embedded text");
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::AccessToken;
    use crate::traits::credentials::MockCredentialProvider;
    use crate::traits::embedder::MockEmbeddingClient;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn provider(times: usize) -> MockCredentialProvider {
        let mut provider = MockCredentialProvider::new();
        let mut issued = 0;
        provider.expect_refresh().times(times).returning(move || {
            issued += 1;
            Ok(AccessToken::new(
                format!("token-{}", issued),
                start() + Duration::hours(issued),
            ))
        });
        provider
    }

    #[test]
    fn test_embedding_text() {
        let plain = CourseRecord::new("CSCI 0150", "Intro", "Objects first.").unwrap();
        assert_eq!(embedding_text(&plain), "Intro Objects first.");

        let with_prereq = plain.clone().with_prerequisites("None");
        assert_eq!(embedding_text(&with_prereq), "Intro Objects first. None");
    }

    #[tokio::test]
    async fn test_embed_sends_blob_with_token() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_predict()
            .withf(|token, text| token == "token-1" && text == "Graphics Pixels. CSCI 0160")
            .times(1)
            .returning(|_, _| Ok(vec![0.1, 0.2, 0.3]));

        let pipeline = EmbeddingPipeline::new(provider(1), client);
        let record = CourseRecord::new("CSCI 1230", "Graphics", "Pixels.")
            .unwrap()
            .with_prerequisites("CSCI 0160");

        let vector = pipeline.embed(&record).await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_token_refreshed_after_expiry() {
        let mut client = MockEmbeddingClient::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        client.expect_predict().times(3).returning(move |token, _| {
            recorded.lock().unwrap().push(token.to_string());
            Ok(vec![1.0])
        });

        let clock = ManualClock(Arc::new(Mutex::new(start())));
        let pipeline = EmbeddingPipeline::new(provider(2), client).with_clock(clock.clone());

        pipeline.embed_text("a").await.unwrap();
        clock.advance(Duration::minutes(30));
        pipeline.embed_text("b").await.unwrap();
        clock.advance(Duration::minutes(26));
        pipeline.embed_text("c").await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["token-1", "token-1", "token-2"]);
    }

    #[tokio::test]
    async fn test_provider_error_surfaces() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_predict()
            .times(1)
            .returning(|_, _| Err(EmbeddingError::Provider("503 Service Unavailable".into())));

        let pipeline = EmbeddingPipeline::new(provider(1), client);
        let err = pipeline.embed_text("x").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_vector_is_malformed() {
        let mut client = MockEmbeddingClient::new();
        client.expect_predict().returning(|_, _| Ok(Vec::new()));

        let pipeline = EmbeddingPipeline::new(provider(1), client);
        let err = pipeline.embed_text("x").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }
}
