use std::sync::atomic::AtomicUsize;

use async_trait::async_trait;
use engine::Engine;

use super::*;
use crate::backend::Backend;

/// Boots a real engine after yielding once, counting launches.
#[derive(Default)]
struct CountingLauncher {
    launches: AtomicUsize,
}

#[async_trait]
impl Launcher for CountingLauncher {
    async fn launch(&self, options: EngineOptions) -> Result<Box<dyn Backend>, BridgeError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(Box::new(Engine::boot(options).map_err(BridgeError::from)?))
    }
}

/// Fails the first `failures` launches, then succeeds.
struct FlakyLauncher {
    failures: usize,
    launches: AtomicUsize,
}

#[async_trait]
impl Launcher for FlakyLauncher {
    async fn launch(&self, options: EngineOptions) -> Result<Box<dyn Backend>, BridgeError> {
        let n = self.launches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if n < self.failures {
            return Err(BridgeError::EngineInit(format!("launch {n} failed")));
        }
        Ok(Box::new(Engine::boot(options).map_err(BridgeError::from)?))
    }
}

/// Never finishes within any reasonable timeout.
struct StuckLauncher;

#[async_trait]
impl Launcher for StuckLauncher {
    async fn launch(&self, _options: EngineOptions) -> Result<Box<dyn Backend>, BridgeError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(BridgeError::EngineInit("unreachable".into()))
    }
}

fn lifecycle(launcher: Arc<dyn Launcher>) -> Lifecycle {
    Lifecycle::new(launcher, EngineOptions::default(), None)
}

#[tokio::test]
async fn starts_not_ready() {
    let lc = lifecycle(Arc::new(CountingLauncher::default()));
    assert!(!lc.is_ready());
    assert_eq!(lc.handle().unwrap_err(), BridgeError::NotInitialized);
    assert_eq!(lc.attempts(), 0);
}

#[tokio::test]
async fn initialize_makes_ready() {
    let lc = lifecycle(Arc::new(CountingLauncher::default()));
    lc.initialize().await.unwrap();
    assert!(lc.is_ready());
    assert!(lc.handle().is_ok());
}

#[tokio::test]
async fn concurrent_initialize_launches_once() {
    let launcher = Arc::new(CountingLauncher::default());
    let lc = lifecycle(launcher.clone());
    let (a, b, c) = tokio::join!(lc.initialize(), lc.initialize(), lc.initialize());
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    assert!(lc.is_ready());
}

#[tokio::test]
async fn concurrent_initialize_across_tasks_launches_once() {
    let launcher = Arc::new(CountingLauncher::default());
    let lc = Arc::new(lifecycle(launcher.clone()));
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let lc = Arc::clone(&lc);
            tokio::spawn(async move { lc.initialize().await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_initialize_is_idempotent() {
    let launcher = Arc::new(CountingLauncher::default());
    let lc = lifecycle(launcher.clone());
    lc.initialize().await.unwrap();
    let first = Arc::as_ptr(lc.handle().unwrap());
    lc.initialize().await.unwrap();
    assert_eq!(Arc::as_ptr(lc.handle().unwrap()), first);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn joined_callers_share_a_failure_then_retry_succeeds() {
    let launcher = Arc::new(FlakyLauncher { failures: 1, launches: AtomicUsize::new(0) });
    let lc = lifecycle(launcher.clone());

    let (a, b) = tokio::join!(lc.initialize(), lc.initialize());
    assert_eq!(a, Err(BridgeError::EngineInit("launch 0 failed".into())));
    assert_eq!(a, b);
    assert!(!lc.is_ready());

    lc.initialize().await.unwrap();
    assert!(lc.is_ready());
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    assert_eq!(lc.attempts(), 2);
}

#[tokio::test]
async fn invalid_options_fail_initialization() {
    let options = EngineOptions { width: 0, ..EngineOptions::default() };
    let lc = Lifecycle::new(Arc::new(crate::backend::EngineLauncher), options, None);
    let err = lc.initialize().await.unwrap_err();
    assert!(matches!(err, BridgeError::EngineInit(_)));
    assert!(!lc.is_ready());
}

#[tokio::test(start_paused = true)]
async fn startup_timeout_is_an_init_error() {
    let lc = Lifecycle::new(Arc::new(StuckLauncher), EngineOptions::default(), Some(Duration::from_millis(50)));
    let err = lc.initialize().await.unwrap_err();
    assert!(matches!(err, BridgeError::EngineInit(msg) if msg.contains("did not start")));
    assert!(!lc.is_ready());
}
