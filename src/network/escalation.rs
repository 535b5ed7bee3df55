use crate::config::settings::FetchSettings;
use crate::engine::rate_limiter::RequestPacer;
use crate::network::client::FastClient;
use crate::network::errors::NetworkError;
use crate::network::identity::IdentityProfile;
use crate::network::Fetcher;
use crate::ops::telemetry;
use std::time::{Duration, Instant};

// * The Ladder Levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchTier {
    Primary,
    Alternate,
    Proxied,
}

impl FetchTier {
    pub fn label(&self) -> &'static str {
        match self {
            FetchTier::Primary => "primary",
            FetchTier::Alternate => "alternate",
            FetchTier::Proxied => "proxied",
        }
    }
}

// * Walks the tiers in order, escalating only on transient failures.
pub struct EscalatingFetcher {
    tiers: Vec<(FetchTier, FastClient)>,
    pacer: RequestPacer,
    escalation_delay: Duration,
}

impl EscalatingFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, NetworkError> {
        let mut tiers = vec![
            (
                FetchTier::Primary,
                FastClient::new(&IdentityProfile::desktop_chrome(), None, settings.timeout)?,
            ),
            (
                FetchTier::Alternate,
                FastClient::new(&IdentityProfile::desktop_firefox(), None, settings.timeout)?,
            ),
        ];

        if let Some(proxy) = settings.proxy_url.as_deref() {
            tiers.push((
                FetchTier::Proxied,
                FastClient::new(&IdentityProfile::desktop_chrome(), Some(proxy), settings.timeout)?,
            ));
        }

        Ok(Self {
            tiers,
            pacer: RequestPacer::new(settings.requests_per_second),
            escalation_delay: settings.escalation_delay,
        })
    }

    pub fn tiers(&self) -> Vec<FetchTier> {
        self.tiers.iter().map(|(tier, _)| *tier).collect()
    }

    fn should_escalate(&self, err: &NetworkError) -> bool {
        err.is_transient()
    }
}

impl Fetcher for EscalatingFetcher {
    async fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        let mut last_error = NetworkError::InvalidUrl(url.to_string());

        for (idx, (tier, client)) in self.tiers.iter().enumerate() {
            if idx > 0 {
                telemetry::record_escalation(tier.label());
                tokio::time::sleep(self.escalation_delay).await;
            }
            self.pacer.wait().await;

            let started = Instant::now();
            let result = client.fetch(url).await;
            telemetry::record_fetch_duration(tier.label(), started.elapsed().as_secs_f64());

            match result {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if !self.should_escalate(&e) {
                        return Err(e);
                    }
                    tracing::warn!(
                        url,
                        tier = ?tier,
                        profile = client.profile(),
                        error = %e,
                        "Transient fetch failure, escalating"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
