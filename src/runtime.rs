//! Owns an [`EquationElement`] on a dedicated thread so gestures arriving
//! from any thread are applied one at a time.

use crate::config::EngineConfig;
use crate::element::{ElementCommand, ElementEvent, EquationElement, EquationSnapshot};
use crate::host::{Collaborators, ElementRef};
use anyhow::{Context, Result, anyhow};
use mathsense_core::MathContent;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Longest the loop blocks when no timer is pending.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

enum Message {
    Command {
        command: ElementCommand,
        reply: Option<Sender<ElementEvent>>,
    },
    Shutdown,
}

/// Cheap, cloneable access to a running equation from any thread.
#[derive(Clone)]
pub struct EquationHandle {
    element: ElementRef,
    sender: Sender<Message>,
}

impl std::fmt::Debug for EquationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquationHandle")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

impl EquationHandle {
    pub fn element_ref(&self) -> ElementRef {
        self.element
    }

    /// Applies a command on the owning thread and waits for its outcome.
    pub fn request(&self, command: ElementCommand) -> Result<ElementEvent> {
        let action = command.action();
        let (reply, response) = mpsc::channel();
        self.sender
            .send(Message::Command {
                command,
                reply: Some(reply),
            })
            .map_err(|_| anyhow!("Equation runtime is not running"))
            .with_context(|| format!("Sending {action}"))?;
        response
            .recv()
            .with_context(|| format!("Equation runtime stopped before replying to {action}"))
    }

    /// Queues a command without waiting.
    pub fn send(&self, command: ElementCommand) -> Result<()> {
        let action = command.action();
        self.sender
            .send(Message::Command {
                command,
                reply: None,
            })
            .map_err(|_| anyhow!("Equation runtime is not running"))
            .with_context(|| format!("Sending {action}"))
    }

    pub fn activate(&self) -> Result<bool> {
        Ok(self.request(ElementCommand::Activate)?.consumed)
    }

    pub fn rotor_next(&self) -> Result<bool> {
        Ok(self.request(ElementCommand::RotorNext)?.consumed)
    }

    pub fn rotor_previous(&self) -> Result<bool> {
        Ok(self.request(ElementCommand::RotorPrevious)?.consumed)
    }

    pub fn escape(&self) -> Result<bool> {
        Ok(self.request(ElementCommand::Escape)?.consumed)
    }

    pub fn snapshot(&self) -> Result<EquationSnapshot> {
        Ok(self.request(ElementCommand::GetSnapshot)?.snapshot)
    }

    pub fn update_content(&self, content: MathContent) -> Result<bool> {
        Ok(self
            .request(ElementCommand::UpdateContent { content })?
            .consumed)
    }

    /// Asks the loop to stop after the commands already queued; pending
    /// timers are cancelled on the way out.
    pub fn shutdown(&self) {
        if self.sender.send(Message::Shutdown).is_err() {
            debug!(element = self.element.0, "Equation runtime already stopped");
        }
    }
}

/// The owning thread. Dropping it stops the loop and unmounts the element.
#[derive(Debug)]
pub struct EquationRuntime {
    handle: EquationHandle,
    worker: Option<JoinHandle<()>>,
}

impl EquationRuntime {
    pub fn spawn(
        element: ElementRef,
        content: &MathContent,
        config: EngineConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let mounted = EquationElement::mount(element, content, config, collaborators);
        let (sender, receiver) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name(format!("mathsense-equation-{}", element.0))
            .spawn(move || run_loop(mounted, receiver))
            .context("Spawning equation runtime thread")?;
        info!(element = element.0, "Equation runtime started");
        Ok(Self {
            handle: EquationHandle { element, sender },
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> EquationHandle {
        self.handle.clone()
    }

    /// Stops the loop and waits for the element to unmount.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        self.handle.shutdown();
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        worker
            .join()
            .map_err(|_| anyhow!("Equation runtime thread panicked"))?;
        info!(element = self.handle.element.0, "Equation runtime stopped");
        Ok(())
    }
}

impl Drop for EquationRuntime {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!("Equation runtime shutdown failed: {err:#}");
        }
    }
}

fn run_loop(mut element: EquationElement, receiver: Receiver<Message>) {
    let mut last_tick = Instant::now();
    loop {
        let wait = element
            .time_until_next_timer()
            .map_or(IDLE_POLL_INTERVAL, |due| due.min(IDLE_POLL_INTERVAL));
        let message = receiver.recv_timeout(wait);

        let now = Instant::now();
        element.advance(now.saturating_duration_since(last_tick));
        last_tick = now;

        match message {
            Ok(Message::Command { command, reply }) => {
                let event = element.apply_command(command);
                if let Some(reply) = reply {
                    if reply.send(event).is_err() {
                        debug!("Caller stopped waiting for equation reply");
                    }
                }
            }
            Ok(Message::Shutdown) => {
                debug!("Equation runtime shutting down");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("All equation handles dropped");
                break;
            }
        }
    }
    element.unmount();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;
    use crate::navigation::NavigationMode;
    use std::sync::Arc;

    fn three_terms() -> MathContent {
        MathContent::default()
            .with_latex(r"a+b=c")
            .with_spoken_fallback("term one, term two, term three")
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            pre_dispatch_delay_ms: 5,
            min_read_secs: 0.01,
            read_secs_per_char: 0.0,
            children_changed_delay_ms: 5,
            ..EngineConfig::default()
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn gestures_are_applied_on_the_owning_thread() {
        let host = Arc::new(RecordingHost::default());
        let runtime = EquationRuntime::spawn(
            ElementRef(9),
            &three_terms(),
            fast_config(),
            host.collaborators(),
        )
        .expect("runtime spawns");
        let handle = runtime.handle();

        assert!(!handle.escape().expect("runtime running"));
        assert!(handle.activate().expect("runtime running"));

        let remote = handle.clone();
        std::thread::spawn(move || {
            remote.rotor_next().expect("runtime running");
            remote.rotor_next().expect("runtime running");
        })
        .join()
        .expect("gesture thread finishes");

        let snapshot = handle.snapshot().expect("runtime running");
        assert_eq!(snapshot.mode, NavigationMode::MathMode);
        assert_eq!(snapshot.current_part_index, 2);
        assert!(wait_for(|| host.spoken().iter().any(|t| t == "term three. 3 of 3")));
        assert!(wait_for(|| host.children_changed() == 1));
        runtime.shutdown().expect("clean shutdown");
    }

    #[test]
    fn fire_and_forget_commands_are_applied_in_order() {
        let host = Arc::new(RecordingHost::default());
        let runtime = EquationRuntime::spawn(
            ElementRef(3),
            &three_terms(),
            fast_config(),
            host.collaborators(),
        )
        .expect("runtime spawns");
        let handle = runtime.handle();
        handle.send(ElementCommand::Activate).expect("runtime running");
        handle.send(ElementCommand::RotorNext).expect("runtime running");
        assert_eq!(
            handle.snapshot().expect("runtime running").label,
            "Part 2 of 3: term two"
        );
    }

    #[test]
    fn handles_fail_after_shutdown() {
        let runtime = EquationRuntime::spawn(
            ElementRef(4),
            &three_terms(),
            fast_config(),
            Collaborators::default(),
        )
        .expect("runtime spawns");
        let handle = runtime.handle();
        runtime.shutdown().expect("clean shutdown");
        assert!(handle.activate().is_err());
        assert!(handle.send(ElementCommand::Escape).is_err());
    }

    #[test]
    fn dropping_the_runtime_cancels_pending_announcements() {
        let host = Arc::new(RecordingHost::default());
        let config = EngineConfig {
            pre_dispatch_delay_ms: 1_000,
            ..EngineConfig::default()
        };
        let runtime =
            EquationRuntime::spawn(ElementRef(5), &three_terms(), config, host.collaborators())
                .expect("runtime spawns");
        runtime.handle().activate().expect("runtime running");
        drop(runtime);
        std::thread::sleep(Duration::from_millis(50));
        assert!(host.spoken().is_empty());
    }

    #[test]
    fn content_updates_go_through_the_owner() {
        let runtime = EquationRuntime::spawn(
            ElementRef(6),
            &three_terms(),
            fast_config(),
            Collaborators::default(),
        )
        .expect("runtime spawns");
        let handle = runtime.handle();
        assert!(!handle.update_content(three_terms()).expect("runtime running"));
        assert!(
            handle
                .update_content(MathContent::default().with_latex("x"))
                .expect("runtime running")
        );
        let snapshot = handle.snapshot().expect("runtime running");
        assert!(!snapshot.substantial);
        assert_eq!(snapshot.label, "x");
    }

    #[test]
    fn shutdown_from_any_handle_stops_the_loop() {
        let runtime = EquationRuntime::spawn(
            ElementRef(7),
            &three_terms(),
            fast_config(),
            Collaborators::default(),
        )
        .expect("runtime spawns");
        let first = runtime.handle();
        let second = runtime.handle();
        assert!(first.activate().expect("runtime running"));
        first.shutdown();
        assert!(second.activate().is_err());
        assert!(second.snapshot().is_err());
        runtime.shutdown().expect("clean shutdown");
    }
}
