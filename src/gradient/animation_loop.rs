use super::animator::{AnimatorMessage, GradientAnimator, PointerEvent};
use super::frame::GradientFrame;
use crate::mood::HslColor;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Task owning a [`GradientAnimator`] and ticking it at a fixed rate.
///
/// Pointer and colour updates reach the animator only through messages,
/// drained at the start of every tick, so the loop is the sole owner of
/// offset and velocity. Every tick hands the new frame to the sink.
pub struct AnimationLoop<S> {
    animator: GradientAnimator,
    receiver: mpsc::UnboundedReceiver<AnimatorMessage>,
    refresh_interval: Duration,
    sink: S,
    cancel: CancellationToken,
}

impl<S> AnimationLoop<S>
where
    S: FnMut(GradientFrame) + Send + 'static,
{
    pub fn spawn(
        animator: GradientAnimator,
        refresh_interval: Duration,
        sink: S,
    ) -> AnimationHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let animation_loop = Self {
            animator,
            receiver,
            refresh_interval,
            sink,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(animation_loop.run());
        AnimationHandle {
            sender,
            cancel,
            task: Some(task),
        }
    }

    async fn run(mut self) -> GradientAnimator {
        info!(
            "Starting gradient animation every {:?}",
            self.refresh_interval
        );
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Gradient animation cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    while let Ok(message) = self.receiver.try_recv() {
                        self.animator.apply(message);
                    }
                    self.animator.tick();
                    (self.sink)(self.animator.frame());
                }
            }
        }
        self.animator
    }
}

/// Control side of a running [`AnimationLoop`]. Dropping it stops the loop.
pub struct AnimationHandle {
    sender: mpsc::UnboundedSender<AnimatorMessage>,
    cancel: CancellationToken,
    task: Option<JoinHandle<GradientAnimator>>,
}

impl AnimationHandle {
    /// Queue a message for the next tick. Returns `false` if the loop is gone.
    pub fn send(&self, message: AnimatorMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    pub fn pointer(&self, event: PointerEvent) -> bool {
        self.send(AnimatorMessage::Pointer(event))
    }

    pub fn set_colors(&self, colors: Vec<HslColor>) -> bool {
        self.send(AnimatorMessage::SetColors(colors))
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the loop and wait for it to exit. No frame is produced after
    /// this returns. Yields the final animator state.
    pub async fn unmount(mut self) -> Option<GradientAnimator> {
        self.cancel.cancel();
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
