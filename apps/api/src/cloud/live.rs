//! Live word clouds: one slide's answers, stats channel and box pool.
//!
//! # Update flow
//! A stats change (a tallied answer or an inbound stats event) is published on
//! a `watch` channel and laid out twice: immediately, and again after
//! `settle_delay` once boxes would have finished their size transitions. The
//! delayed pass reads the channel when it fires, so a pass scheduled for an
//! older update still lays out the newest stats. Last pass wins.
//!
//! # Locking
//! Stats are sent on the channel while the tally lock is held, so the channel
//! never goes back to an older tally. A pass reads the channel only after it
//! holds the surface lock; whichever pass runs last sees the newest stats.
//! Passes are CPU-bound and run via `tokio::task::spawn_blocking`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cloud::tally::TermTally;
use crate::errors::AppError;
use crate::layout::{
    BoxPool, Container, Gaps, LayoutOutcome, RenderedTerm, SkipReason, TextBoxPool, TypeScale,
    WordCloudPacker,
};
use crate::models::stats::{Stats, StatsUpdate};

/// Per-cloud layout settings, fixed at creation.
#[derive(Debug, Clone, Copy)]
pub struct CloudSettings {
    pub container: Container,
    pub gaps: Gaps,
    pub scale: TypeScale,
    pub settle_delay: Duration,
    pub max_term_chars: usize,
    /// Distinct terms the tally accepts before refusing new ones.
    pub max_terms: usize,
}

/// Result of feeding an inbound stats event to a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied,
    /// The event was for a slide this cloud is not rendering.
    IgnoredOtherSlide { expected: usize, received: usize },
}

/// Point-in-time view of a cloud for the rendering surface.
#[derive(Debug, Clone, Serialize)]
pub struct CloudSnapshot {
    pub cloud_id: Uuid,
    pub slide_index: usize,
    pub created_at: DateTime<Utc>,
    pub container: Container,
    /// Incremented on every layout pass, skipped passes included.
    pub generation: u64,
    pub laid_out_at: Option<DateTime<Utc>>,
    pub stats: Stats,
    pub outcome: Option<LayoutOutcome>,
    pub terms: Vec<RenderedTerm>,
}

struct Surface {
    pool: TextBoxPool,
    generation: u64,
    last_outcome: Option<LayoutOutcome>,
    laid_out_at: Option<DateTime<Utc>>,
}

pub struct LiveCloud {
    pub id: Uuid,
    pub slide_index: usize,
    pub created_at: DateTime<Utc>,
    settings: CloudSettings,
    packer: WordCloudPacker,
    tally: Mutex<TermTally>,
    stats_tx: watch::Sender<Stats>,
    surface: Mutex<Surface>,
}

impl LiveCloud {
    pub fn new(slide_index: usize, settings: CloudSettings, packer: WordCloudPacker) -> Arc<Self> {
        let (stats_tx, _) = watch::channel(Stats::default());
        Arc::new(LiveCloud {
            id: Uuid::new_v4(),
            slide_index,
            created_at: Utc::now(),
            settings,
            packer,
            tally: Mutex::new(TermTally::new(settings.max_term_chars, settings.max_terms)),
            stats_tx,
            surface: Mutex::new(Surface {
                pool: TextBoxPool::new(settings.scale),
                generation: 0,
                last_outcome: None,
                laid_out_at: None,
            }),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Stats> {
        self.stats_tx.subscribe()
    }

    pub fn current_stats(&self) -> Stats {
        self.stats_tx.borrow().clone()
    }

    /// Tallies one participant answer, publishes the new stats and waits for
    /// the immediate layout pass.
    pub async fn submit_answer(self: &Arc<Self>, text: &str) -> Result<Stats, AppError> {
        let stats = {
            let mut tally = lock(&self.tally);
            let slot = tally
                .insert(text)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            debug!(cloud_id = %self.id, slot, terms = tally.len(), "Answer tallied");
            let stats = tally.stats();
            self.stats_tx.send_replace(stats.clone());
            stats
        };
        self.after_publish().await?;
        Ok(stats)
    }

    /// Applies a "new stats for slide S" event. Events for other slides are ignored.
    pub async fn apply_update(
        self: &Arc<Self>,
        update: StatsUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        if update.slide_index != self.slide_index {
            debug!(
                cloud_id = %self.id,
                expected = self.slide_index,
                received = update.slide_index,
                "Ignoring stats update for another slide"
            );
            return Ok(UpdateOutcome::IgnoredOtherSlide {
                expected: self.slide_index,
                received: update.slide_index,
            });
        }
        {
            let _tally = lock(&self.tally);
            self.stats_tx.send_replace(update.into());
        }
        self.after_publish().await?;
        Ok(UpdateOutcome::Applied)
    }

    async fn after_publish(self: &Arc<Self>) -> Result<LayoutOutcome, AppError> {
        self.schedule_settled_relayout();
        self.relayout_blocking().await
    }

    /// Runs `relayout` on the blocking pool.
    pub async fn relayout_blocking(self: &Arc<Self>) -> Result<LayoutOutcome, AppError> {
        let cloud = Arc::clone(self);
        tokio::task::spawn_blocking(move || cloud.relayout())
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in cloud layout: {e}"))
            })
    }

    /// Lays out whatever stats are current once the surface is free.
    pub fn relayout(&self) -> LayoutOutcome {
        let mut surface = lock(&self.surface);
        let stats = self.current_stats();

        let outcome = self.packer.layout(
            self.settings.container,
            &stats,
            self.settings.gaps,
            &mut surface.pool,
        );
        // The packer leaves boxes alone for an empty term list; a cloud whose
        // terms were all withdrawn must still stop showing the old ones.
        if let LayoutOutcome::Skipped {
            reason: SkipReason::NoTerms,
        } = outcome
        {
            surface.pool.hide_from(0);
        }

        surface.generation += 1;
        surface.laid_out_at = Some(Utc::now());
        surface.last_outcome = Some(outcome.clone());
        outcome
    }

    fn schedule_settled_relayout(self: &Arc<Self>) {
        let cloud: Weak<LiveCloud> = Arc::downgrade(self);
        let delay = self.settings.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Dropped clouds are not laid out again.
            let Some(cloud) = cloud.upgrade() else {
                return;
            };
            if let Err(e) = cloud.relayout_blocking().await {
                warn!(cloud_id = %cloud.id, error = %e, "Settled layout pass failed");
            }
        });
    }

    pub fn snapshot(&self) -> CloudSnapshot {
        let stats = self.current_stats();
        let surface = lock(&self.surface);
        CloudSnapshot {
            cloud_id: self.id,
            slide_index: self.slide_index,
            created_at: self.created_at,
            container: self.settings.container,
            generation: surface.generation,
            laid_out_at: surface.laid_out_at,
            stats,
            outcome: surface.last_outcome.clone(),
            terms: surface.pool.rendered(),
        }
    }
}

impl Drop for LiveCloud {
    fn drop(&mut self) {
        info!(cloud_id = %self.id, "Live cloud dropped");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
